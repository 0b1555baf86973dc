//! The line-oriented command interpreter (component C8): reads one command
//! per line, dispatches to the matching `Map` operation, and reports
//! rejected lines with `ERROR <line>` on stderr (spec.md §4.8, §6).

use std::io::{BufRead, Write};

use crate::map::Map;

fn parse_u32(s: &str) -> Option<u32> {
    s.parse().ok()
}

fn parse_i32(s: &str) -> Option<i32> {
    let v: i32 = s.parse().ok()?;
    if v == 0 {
        None
    } else {
        Some(v)
    }
}

/// Parses and executes a single non-blank, non-comment line. Returns `false`
/// if the line is malformed or the underlying operation was rejected.
fn run_line(map: &mut Map, line: &str, out: &mut impl Write) -> bool {
    let fields: Vec<&str> = line.split(';').collect();

    match fields[0] {
        "addRoad" => {
            if fields.len() != 5 {
                return false;
            }
            let (length, year) = match (parse_u32(fields[3]), parse_i32(fields[4])) {
                (Some(l), Some(y)) => (l, y),
                _ => return false,
            };
            map.add_road(fields[1], fields[2], length, year)
        }
        "repairRoad" => {
            if fields.len() != 4 {
                return false;
            }
            let year = match parse_i32(fields[3]) {
                Some(y) => y,
                None => return false,
            };
            map.repair_road(fields[1], fields[2], year)
        }
        "getRouteDescription" => {
            if fields.len() != 2 {
                return false;
            }
            let id = match parse_u32(fields[1]) {
                Some(id) => id,
                None => return false,
            };
            let description = map.get_route_description(id);
            writeln!(out, "{}", description).expect("stdout write failed");
            true
        }
        "newRoute" => {
            if fields.len() != 4 {
                return false;
            }
            let id = match parse_u32(fields[1]) {
                Some(id) => id,
                None => return false,
            };
            map.new_route(id, fields[2], fields[3])
        }
        "extendRoute" => {
            if fields.len() != 3 {
                return false;
            }
            let id = match parse_u32(fields[1]) {
                Some(id) => id,
                None => return false,
            };
            map.extend_route(id, fields[2])
        }
        "removeRoad" => {
            if fields.len() != 3 {
                return false;
            }
            map.remove_road(fields[1], fields[2])
        }
        "removeRoute" => {
            if fields.len() != 2 {
                return false;
            }
            let id = match parse_u32(fields[1]) {
                Some(id) => id,
                None => return false,
            };
            map.remove_route(id)
        }
        _ => run_create_route_line(map, &fields),
    }
}

/// The bare `id;c0;len0;year0;c1;len1;year1;...;cn` form (spec.md §4.8).
fn run_create_route_line(map: &mut Map, fields: &[&str]) -> bool {
    if fields.len() < 6 || !(fields.len() - 2).is_multiple_of(3) {
        return false;
    }
    let id = match parse_u32(fields[0]) {
        Some(id) => id,
        None => return false,
    };

    let legs = (fields.len() - 2) / 3;
    let mut cities = Vec::with_capacity(legs + 1);
    let mut lengths = Vec::with_capacity(legs);
    let mut years = Vec::with_capacity(legs);
    cities.push(fields[1].to_string());
    let mut i = 2;
    for _ in 0..legs {
        let length = match parse_u32(fields[i]) {
            Some(l) => l,
            None => return false,
        };
        let year = match parse_i32(fields[i + 1]) {
            Some(y) => y,
            None => return false,
        };
        let city = fields[i + 2].to_string();
        lengths.push(length);
        years.push(year);
        cities.push(city);
        i += 3;
    }

    map.create_route(id, &cities, &lengths, &years)
}

/// Reads commands from `input` until EOF, writing route descriptions to
/// `out` and `ERROR <n>` lines (1-based) to `err` for every rejected line.
pub fn run(input: impl BufRead, mut out: impl Write, mut err: impl Write) {
    let mut map = Map::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.expect("input read failed");
        let line_no = index + 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if !run_line(&mut map, trimmed, &mut out) {
            writeln!(err, "ERROR {}", line_no).expect("stderr write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_str(input: &str) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        run(input.as_bytes(), &mut out, &mut err);
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn builds_a_route_and_describes_it() {
        let (out, err) = run_str(
            "addRoad;A;B;5;2000\n\
             addRoad;B;C;5;2000\n\
             newRoute;1;A;C\n\
             getRouteDescription;1\n",
        );
        assert_eq!(err, "");
        assert_eq!(out, "1;A;5;2000;B;5;2000;C\n");
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let (out, err) = run_str(
            "addRoad;A;B;5;2000\n\
             addRoad;A;B\n\
             getRouteDescription;1\n",
        );
        assert_eq!(err, "ERROR 2\n");
        assert_eq!(out, "\n");
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let (out, err) = run_str("\n# a comment\naddRoad;A;B;5;2000\n");
        assert_eq!(out, "");
        assert_eq!(err, "");
    }

    #[test]
    fn bare_create_route_form() {
        let (out, err) = run_str("9;A;5;2000;B;7;2001;C\ngetRouteDescription;9\n");
        assert_eq!(err, "");
        assert_eq!(out, "9;A;5;2000;B;7;2001;C\n");
    }
}
