//! The route-search engine (component C5) — two-key shortest path with a
//! uniqueness verdict. Pure with respect to the graph: never mutates it.

use std::cmp::Reverse;
use std::collections::HashSet;

use priority_queue::PriorityQueue;

use crate::graph::{CityId, Graph, SegmentId};

/// Two-key path cost: total length ascending, then worst (oldest) repair
/// year descending — a newer worst segment along the path wins ties
/// (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Distance {
    pub length: u64,
    pub worst_year: i32,
}

impl Distance {
    /// Unreachable. The subtracted slack keeps `add` from overflowing when
    /// one more segment (length up to `u32::MAX`) is folded in.
    pub const WORST: Distance = Distance {
        length: u64::MAX - u32::MAX as u64,
        worst_year: i32::MIN,
    };

    /// Distance from a city to itself.
    pub const BASE: Distance = Distance {
        length: 0,
        worst_year: i32::MAX,
    };

    pub fn add_segment(self, length: u32, last_repaired: i32) -> Distance {
        Distance {
            length: self.length + length as u64,
            worst_year: self.worst_year.min(last_repaired),
        }
    }

    pub fn combine(self, other: Distance) -> Distance {
        Distance {
            length: self.length + other.length,
            worst_year: self.worst_year.min(other.worst_year),
        }
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.length
            .cmp(&other.length)
            .then_with(|| other.worst_year.cmp(&self.worst_year))
    }
}

/// The four-way answer spec.md §4.5 requires.
pub enum SearchOutcome {
    /// Invalid arguments (e.g. an endpoint outside the graph).
    Error,
    None,
    Ambiguous(Distance),
    Unique(Distance, Vec<SegmentId>),
}

/// Finds the best `from -> to` path, never stepping through a city that is
/// an endpoint of a segment in `forbidden` (except `from`/`to` themselves),
/// and never using a blocked segment. `segments` is ordered `from -> to`.
pub fn search(graph: &Graph, from: CityId, to: CityId, forbidden: &[SegmentId]) -> SearchOutcome {
    let city_count = graph.city_count();
    if from.0 as usize >= city_count || to.0 as usize >= city_count {
        return SearchOutcome::Error;
    }

    let mut blocked_cities = vec![false; city_count];
    for &seg in forbidden {
        let s = graph.segment(seg);
        blocked_cities[s.e1.0 as usize] = true;
        blocked_cities[s.e2.0 as usize] = true;
    }
    blocked_cities[from.0 as usize] = false;
    blocked_cities[to.0 as usize] = false;

    // Phase 1: distances, searched backwards from `to` so phase 2 walks
    // `from -> to` in the caller's expected order.
    log::trace!("phase 1: distances from {:?} over {} cities, {} forbidden", to, city_count, forbidden.len());
    let mut dist = vec![Distance::WORST; city_count];
    dist[to.0 as usize] = Distance::BASE;
    let mut heap = PriorityQueue::new();
    heap.push(to, Reverse(Distance::BASE));

    while let Some((city, Reverse(d))) = heap.pop() {
        if blocked_cities[city.0 as usize] || d > dist[city.0 as usize] {
            continue;
        }
        dist[city.0 as usize] = d;
        if city == from {
            break;
        }

        for &seg in &graph.city(city).segments {
            let state = &graph.segment(seg).state;
            if !state.is_usable() {
                continue;
            }
            let other = match graph.other_end(seg, city) {
                Some(c) => c,
                None => continue,
            };
            let nd = d.add_segment(state.length(), state.last_repaired());
            if nd < dist[other.0 as usize] {
                dist[other.0 as usize] = nd;
                heap.push(other, Reverse(nd));
            }
        }
    }

    for (id, blocked) in blocked_cities.iter().enumerate() {
        if *blocked {
            dist[id] = Distance::WORST;
        }
    }

    // Phase 2: reconstruction with a local uniqueness test.
    log::trace!("phase 2: reconstructing {:?} -> {:?}, cost {:?}", from, to, dist[from.0 as usize]);
    let mut path = Vec::new();
    let mut position = from;
    let mut current_cost = Distance::BASE;
    let end_cost = dist[from.0 as usize];
    let mut visited: HashSet<CityId> = HashSet::new();
    visited.insert(from);

    while position != to {
        let mut candidate: Option<(SegmentId, CityId, Distance)> = None;
        for &seg in &graph.city(position).segments {
            let state = &graph.segment(seg).state;
            if !state.is_usable() {
                continue;
            }
            let other = match graph.other_end(seg, position) {
                Some(c) => c,
                None => continue,
            };
            let nd = dist[other.0 as usize]
                .add_segment(state.length(), state.last_repaired())
                .combine(current_cost);
            if nd == end_cost {
                if candidate.is_some() {
                    return SearchOutcome::Ambiguous(end_cost);
                }
                let next_cost = current_cost.add_segment(state.length(), state.last_repaired());
                candidate = Some((seg, other, next_cost));
            }
        }
        match candidate {
            None => return SearchOutcome::None,
            Some((seg, next_position, next_cost)) => {
                path.push(seg);
                position = next_position;
                current_cost = next_cost;
                visited.insert(position);
            }
        }
    }

    SearchOutcome::Unique(end_cost, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn same_city_is_base_distance() {
        let mut g = Graph::new();
        let a = g.create_city("A");
        match search(&g, a, a, &[]) {
            SearchOutcome::Unique(d, segs) => {
                assert_eq!(d, Distance::BASE);
                assert!(segs.is_empty());
            }
            _ => panic!("expected Unique"),
        }
    }

    #[test]
    fn simple_shortest_path() {
        let mut g = Graph::new();
        let a = g.create_city("A");
        let b = g.create_city("B");
        let c = g.create_city("C");
        g.create_segment(a, b, 5, 2000);
        g.create_segment(b, c, 5, 2000);
        g.create_segment(a, c, 100, 2000);
        match search(&g, a, c, &[]) {
            SearchOutcome::Unique(d, segs) => {
                assert_eq!(d.length, 10);
                assert_eq!(segs.len(), 2);
            }
            _ => panic!("expected Unique"),
        }
    }

    #[test]
    fn tie_on_length_prefers_newer_worst_year() {
        let mut g = Graph::new();
        let a = g.create_city("A");
        let b = g.create_city("B");
        let c = g.create_city("C");
        let d = g.create_city("D");
        g.create_segment(a, b, 5, 1990);
        g.create_segment(b, c, 5, 1990);
        g.create_segment(a, d, 5, 2005);
        g.create_segment(d, c, 5, 2005);
        match search(&g, a, c, &[]) {
            SearchOutcome::Unique(dist, segs) => {
                assert_eq!(dist.length, 10);
                assert_eq!(dist.worst_year, 2005);
                assert_eq!(segs.len(), 2);
            }
            _ => panic!("expected Unique"),
        }
    }

    #[test]
    fn ambiguous_when_two_equal_paths() {
        let mut g = Graph::new();
        let a = g.create_city("A");
        let b = g.create_city("B");
        let c = g.create_city("C");
        let d = g.create_city("D");
        g.create_segment(a, b, 5, 2000);
        g.create_segment(b, c, 5, 2000);
        g.create_segment(a, d, 5, 2000);
        g.create_segment(d, c, 5, 2000);
        match search(&g, a, c, &[]) {
            SearchOutcome::Ambiguous(_) => {}
            _ => panic!("expected Ambiguous"),
        }
    }

    #[test]
    fn forbidden_interior_city_is_avoided() {
        let mut g = Graph::new();
        let a = g.create_city("A");
        let b = g.create_city("B");
        let c = g.create_city("C");
        let seg_ab = g.create_segment(a, b, 5, 2000);
        let seg_bc = g.create_segment(b, c, 5, 2000);
        g.create_segment(a, c, 100, 2000);
        match search(&g, a, c, &[seg_ab, seg_bc]) {
            SearchOutcome::Unique(d, segs) => {
                assert_eq!(d.length, 100);
                assert_eq!(segs.len(), 1);
            }
            _ => panic!("expected Unique via the long way"),
        }
    }
}
