//! The route object (component C6): an ordered walk between two endpoints.

use crate::graph::{CityId, Graph, SegmentId};

#[derive(Clone, Debug)]
pub struct Route {
    pub end1: CityId,
    pub end2: CityId,
    /// Segments in order from `end1` to `end2`. A route references segments
    /// by id only; it does not own them (spec.md §3).
    pub roads: Vec<SegmentId>,
}

impl Route {
    pub fn new(end1: CityId, end2: CityId, roads: Vec<SegmentId>) -> Self {
        Route { end1, end2, roads }
    }

    pub fn contains(&self, seg: SegmentId) -> bool {
        self.roads.contains(&seg)
    }

    /// Walks the route from `end1`, stopping early at a blocked segment.
    /// Returns `1` if `a` is reached before `b`, `2` if `b` first, `0` if
    /// neither (or `a == b`) — spec.md §4.6 `orient`.
    pub fn orient(&self, graph: &Graph, a: CityId, b: CityId) -> u8 {
        if a == b {
            return 0;
        }
        let mut position = self.end1;
        for &seg in &self.roads {
            if position == a {
                return 1;
            }
            if position == b {
                return 2;
            }
            match graph.other_end(seg, position) {
                Some(next) => position = next,
                None => break,
            }
        }
        if position == a {
            1
        } else if position == b {
            2
        } else {
            0
        }
    }

    /// `id;name0;len0;year0;name1;len1;year1;...;nameN` (spec.md §4.6, §6).
    pub fn describe(&self, graph: &Graph, route_id: u32) -> String {
        let mut out = String::new();
        out.push_str(&route_id.to_string());
        let mut position = self.end1;
        for &seg in &self.roads {
            out.push(';');
            out.push_str(&graph.city(position).name);
            let state = &graph.segment(seg).state;
            out.push(';');
            out.push_str(&state.length().to_string());
            out.push(';');
            out.push_str(&state.last_repaired().to_string());
            position = graph
                .other_end(seg, position)
                .expect("complete route references only live segments");
        }
        out.push(';');
        out.push_str(&graph.city(position).name);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, SegmentState};

    fn build() -> (Graph, Route) {
        let mut g = Graph::new();
        let a = g.create_city("A");
        let b = g.create_city("B");
        let c = g.create_city("C");
        let s1 = g.create_segment(a, b, 5, 2000);
        let s2 = g.create_segment(b, c, 5, 2000);
        (g, Route::new(a, c, vec![s1, s2]))
    }

    #[test]
    fn describe_matches_grammar() {
        let (g, route) = build();
        assert_eq!(route.describe(&g, 7), "7;A;5;2000;B;5;2000;C");
    }

    #[test]
    fn orient_finds_first_city() {
        let (g, route) = build();
        let b = g.lookup("B").unwrap();
        let a = g.lookup("A").unwrap();
        let c = g.lookup("C").unwrap();
        assert_eq!(route.orient(&g, a, c), 1);
        assert_eq!(route.orient(&g, c, a), 2);
        assert_eq!(route.orient(&g, b, c), 1);
        assert_eq!(route.orient(&g, a, a), 0);
    }

    #[test]
    fn orient_stops_at_a_blocked_segment() {
        let (mut g, route) = build();
        let s1 = route.roads[0];
        g.segment_mut(s1).state = SegmentState::Blocked {
            length: 5,
            last_repaired: 2000,
        };
        let a = g.lookup("A").unwrap();
        let b = g.lookup("B").unwrap();
        let c = g.lookup("C").unwrap();
        // Walking from end1 (A) can't cross the blocked A-B segment, so
        // neither B nor C is reached and orient reports neither.
        assert_eq!(route.orient(&g, b, c), 0);
        assert_eq!(route.orient(&g, a, c), 1);
    }
}
