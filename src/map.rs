//! The transactional façade (component C7): `addRoad`, `repairRoad`,
//! `getRoadStatus`, `newRoute`, `createRoute`, `extendRoute`, `removeRoad`,
//! `removeRoute`, `getRouteDescription`. Every public operation here is
//! all-or-nothing: on any failure the map's observable state is identical
//! to the state before the call (spec.md §4.7, §8 invariant 4).

use crate::error::{MapError, MapResult};
use crate::graph::{CityId, Graph, SegmentId, SegmentState};
use crate::route::Route;
use crate::route_search::{search, SearchOutcome};
use crate::seq;

pub const MIN_ROUTE_ID: u32 = 1;
pub const MAX_ROUTE_ID: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadStatus {
    Illegal,
    Addable,
    Repairable,
    Exact,
}

pub struct Map {
    graph: Graph,
    routes: Vec<Option<Route>>,
}

/// A name is valid if non-empty, free of control bytes (0..=31), and free
/// of `;` (spec.md §3, §6).
fn check_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| !(0..=31).contains(&b) && b != b';')
}

fn check_route_id(id: u32) -> bool {
    (MIN_ROUTE_ID..=MAX_ROUTE_ID).contains(&id)
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            graph: Graph::new(),
            routes: (0..=MAX_ROUTE_ID).map(|_| None).collect(),
        }
    }

    fn route_slot(&self, id: u32) -> Option<&Route> {
        self.routes.get(id as usize).and_then(|r| r.as_ref())
    }

    fn check_two_distinct_names(n1: &str, n2: &str) -> MapResult<()> {
        if !check_name(n1) || !check_name(n2) {
            return Err(MapError::InvalidArgument("malformed city name"));
        }
        if n1 == n2 {
            return Err(MapError::InvalidArgument("a segment needs two distinct cities"));
        }
        Ok(())
    }

    fn find_segment_by_name(&self, n1: &str, n2: &str) -> Option<(CityId, CityId, SegmentId)> {
        let c1 = self.graph.lookup(n1)?;
        let c2 = self.graph.lookup(n2)?;
        let seg = self.graph.find_segment(c1, c2)?;
        Some((c1, c2, seg))
    }

    fn try_add_road(&mut self, n1: &str, n2: &str, length: u32, year: i32) -> MapResult<()> {
        if length == 0 || year == 0 {
            return Err(MapError::InvalidArgument("length and year must be non-zero"));
        }
        Self::check_two_distinct_names(n1, n2)?;

        let c1 = self.graph.lookup(n1).unwrap_or_else(|| self.graph.create_city(n1));
        let c2 = self.graph.lookup(n2).unwrap_or_else(|| self.graph.create_city(n2));
        if self.graph.find_segment(c1, c2).is_some() {
            return Err(MapError::Conflict("a segment already joins these cities"));
        }
        self.graph.create_segment(c1, c2, length, year);
        Ok(())
    }

    /// `addRoad(name1, name2, length, year) -> bool` (spec.md §4.7, §6).
    pub fn add_road(&mut self, n1: &str, n2: &str, length: u32, year: i32) -> bool {
        match self.try_add_road(n1, n2, length, year) {
            Ok(()) => {
                log::info!("addRoad {} {} {} {}", n1, n2, length, year);
                true
            }
            Err(e) => {
                log::debug!("addRoad {} {} rejected: {}", n1, n2, e);
                false
            }
        }
    }

    fn try_repair_road(&mut self, n1: &str, n2: &str, year: i32) -> MapResult<()> {
        if year == 0 {
            return Err(MapError::InvalidArgument("year must be non-zero"));
        }
        Self::check_two_distinct_names(n1, n2)?;
        let (_, _, seg) = self
            .find_segment_by_name(n1, n2)
            .ok_or(MapError::NotFound("no such segment"))?;
        let state = self.graph.segment(seg).state;
        if state.last_repaired() > year {
            return Err(MapError::Conflict("repair year predates the stored one"));
        }
        self.graph.segment_mut(seg).state = SegmentState::Live {
            length: state.length(),
            last_repaired: year,
        };
        Ok(())
    }

    /// `repairRoad(name1, name2, year) -> bool` (spec.md §4.7, §6).
    pub fn repair_road(&mut self, n1: &str, n2: &str, year: i32) -> bool {
        match self.try_repair_road(n1, n2, year) {
            Ok(()) => {
                log::info!("repairRoad {} {} {}", n1, n2, year);
                true
            }
            Err(e) => {
                log::debug!("repairRoad {} {} rejected: {}", n1, n2, e);
                false
            }
        }
    }

    /// `getRoadStatus(name1, name2, length, year) -> RoadStatus` (spec.md
    /// §4.7, §6).
    pub fn get_road_status(&self, n1: &str, n2: &str, length: u32, year: i32) -> RoadStatus {
        if length == 0 || year == 0 || !check_name(n1) || !check_name(n2) || n1 == n2 {
            return RoadStatus::Illegal;
        }
        let seg = match self.find_segment_by_name(n1, n2) {
            Some((_, _, seg)) => seg,
            None => return RoadStatus::Addable,
        };
        let state = self.graph.segment(seg).state;
        if state.length() != length {
            return RoadStatus::Illegal;
        }
        if state.last_repaired() < year {
            RoadStatus::Repairable
        } else if state.last_repaired() == year {
            RoadStatus::Exact
        } else {
            RoadStatus::Illegal
        }
    }

    fn try_new_route(&mut self, id: u32, n1: &str, n2: &str) -> MapResult<()> {
        if !check_route_id(id) {
            return Err(MapError::InvalidArgument("route id out of range"));
        }
        if self.route_slot(id).is_some() {
            return Err(MapError::Conflict("route id already in use"));
        }
        Self::check_two_distinct_names(n1, n2)?;
        let c1 = self.graph.lookup(n1).ok_or(MapError::NotFound("unknown city"))?;
        let c2 = self.graph.lookup(n2).ok_or(MapError::NotFound("unknown city"))?;
        match search(&self.graph, c1, c2, &[]) {
            SearchOutcome::Unique(_, segs) => {
                self.routes[id as usize] = Some(Route::new(c1, c2, segs));
                Ok(())
            }
            SearchOutcome::None => Err(MapError::Conflict("no path between the cities")),
            SearchOutcome::Ambiguous(_) => Err(MapError::Ambiguous("path is not unique")),
            SearchOutcome::Error => Err(MapError::InvalidArgument("search failed")),
        }
    }

    /// `newRoute(id, name1, name2) -> bool` (spec.md §4.7, §6).
    pub fn new_route(&mut self, id: u32, n1: &str, n2: &str) -> bool {
        match self.try_new_route(id, n1, n2) {
            Ok(()) => {
                log::info!("newRoute {} {} {}", id, n1, n2);
                true
            }
            Err(e) => {
                log::debug!("newRoute {} rejected: {}", id, e);
                false
            }
        }
    }

    /// `createRoute(id, cities, lengths, years) -> bool`. `cities` lists the
    /// `n+1` cities of the route in order; `lengths[i]`/`years[i]` describe
    /// the segment between `cities[i]` and `cities[i+1]` (spec.md §4.7,
    /// §4.8's `id;c0;len0;year0;...;cn` grammar).
    fn try_create_route(
        &mut self,
        id: u32,
        cities: &[String],
        lengths: &[u32],
        years: &[i32],
    ) -> MapResult<()> {
        if !check_route_id(id) {
            return Err(MapError::InvalidArgument("route id out of range"));
        }
        if self.route_slot(id).is_some() {
            return Err(MapError::Conflict("route id already in use"));
        }
        if cities.len() < 2 || lengths.len() != cities.len() - 1 || years.len() != cities.len() - 1 {
            return Err(MapError::InvalidArgument("route needs at least two cities"));
        }
        if !cities.iter().all(|n| check_name(n)) {
            return Err(MapError::InvalidArgument("malformed city name"));
        }
        {
            let mut seen = std::collections::HashSet::new();
            if !cities.iter().all(|n| seen.insert(n.as_str())) {
                return Err(MapError::InvalidArgument("duplicate city in route"));
            }
        }

        let statuses: Vec<RoadStatus> = (0..lengths.len())
            .map(|i| self.get_road_status(&cities[i], &cities[i + 1], lengths[i], years[i]))
            .collect();
        if statuses.contains(&RoadStatus::Illegal) {
            return Err(MapError::Conflict("a leg of the route is impossible"));
        }

        for (i, status) in statuses.into_iter().enumerate() {
            let ok = match status {
                RoadStatus::Addable => self.add_road(&cities[i], &cities[i + 1], lengths[i], years[i]),
                RoadStatus::Repairable => self.repair_road(&cities[i], &cities[i + 1], years[i]),
                RoadStatus::Exact => true,
                RoadStatus::Illegal => unreachable!(),
            };
            if !ok {
                return Err(MapError::Conflict("a leg's mutation failed"));
            }
        }

        let mut segs = Vec::with_capacity(lengths.len());
        for i in 0..lengths.len() {
            let (_, _, seg) = self
                .find_segment_by_name(&cities[i], &cities[i + 1])
                .expect("leg was just committed");
            segs.push(seg);
        }
        let end1 = self.graph.lookup(&cities[0]).expect("city exists after commit");
        let end2 = self
            .graph
            .lookup(&cities[cities.len() - 1])
            .expect("city exists after commit");
        self.routes[id as usize] = Some(Route::new(end1, end2, segs));
        Ok(())
    }

    pub fn create_route(&mut self, id: u32, cities: &[String], lengths: &[u32], years: &[i32]) -> bool {
        match self.try_create_route(id, cities, lengths, years) {
            Ok(()) => {
                log::info!("createRoute {} ({} cities)", id, cities.len());
                true
            }
            Err(e) => {
                log::debug!("createRoute {} rejected: {}", id, e);
                false
            }
        }
    }

    fn route_cities(&self, route: &Route) -> Vec<CityId> {
        let mut cities = vec![route.end1];
        let mut position = route.end1;
        for &seg in &route.roads {
            position = self
                .graph
                .other_end(seg, position)
                .expect("complete route references only live segments");
            cities.push(position);
        }
        cities
    }

    fn try_extend_route(&mut self, id: u32, name: &str) -> MapResult<()> {
        if !check_route_id(id) || !check_name(name) {
            return Err(MapError::InvalidArgument("invalid route id or city name"));
        }
        let city = self.graph.lookup(name).ok_or(MapError::NotFound("unknown city"))?;
        let route = self.route_slot(id).ok_or(MapError::NotFound("no such route"))?.clone();
        if self.route_cities(&route).contains(&city) {
            return Err(MapError::Conflict("city is already on the route"));
        }

        let to_end1 = search(&self.graph, city, route.end1, &route.roads);
        let to_end2 = search(&self.graph, route.end2, city, &route.roads);

        enum Side {
            End1(Vec<SegmentId>),
            End2(Vec<SegmentId>),
        }

        let side = match (to_end1, to_end2) {
            (SearchOutcome::Error, _) | (_, SearchOutcome::Error) => {
                return Err(MapError::InvalidArgument("search failed"))
            }
            (SearchOutcome::None, SearchOutcome::None) => {
                return Err(MapError::Conflict("city is unreachable from either end"))
            }
            (SearchOutcome::Unique(_, path), SearchOutcome::None) => Side::End1(path),
            (SearchOutcome::None, SearchOutcome::Unique(_, path)) => Side::End2(path),
            (SearchOutcome::Unique(d1, p1), SearchOutcome::Unique(d2, p2)) => {
                if d1 < d2 {
                    Side::End1(p1)
                } else if d2 < d1 {
                    Side::End2(p2)
                } else {
                    return Err(MapError::Conflict("both ends tie for best extension"));
                }
            }
            (SearchOutcome::Unique(d1, p1), SearchOutcome::Ambiguous(d2)) => {
                if d1 < d2 {
                    Side::End1(p1)
                } else {
                    return Err(MapError::Ambiguous("the other end is ambiguous and no better"));
                }
            }
            (SearchOutcome::Ambiguous(d1), SearchOutcome::Unique(d2, p2)) => {
                if d2 < d1 {
                    Side::End2(p2)
                } else {
                    return Err(MapError::Ambiguous("the other end is ambiguous and no better"));
                }
            }
            (SearchOutcome::Ambiguous(_), SearchOutcome::Ambiguous(_))
            | (SearchOutcome::Ambiguous(_), SearchOutcome::None)
            | (SearchOutcome::None, SearchOutcome::Ambiguous(_)) => {
                return Err(MapError::Ambiguous("extension is ambiguous"))
            }
        };

        let route_mut = self.routes[id as usize].as_mut().unwrap();
        match side {
            Side::End1(mut path) => {
                path.append(&mut route_mut.roads);
                route_mut.roads = path;
                route_mut.end1 = city;
            }
            Side::End2(path) => {
                route_mut.roads.extend(path);
                route_mut.end2 = city;
            }
        }
        Ok(())
    }

    /// `extendRoute(id, name) -> bool` (spec.md §4.7, §6).
    pub fn extend_route(&mut self, id: u32, name: &str) -> bool {
        match self.try_extend_route(id, name) {
            Ok(()) => {
                log::info!("extendRoute {} {}", id, name);
                true
            }
            Err(e) => {
                log::debug!("extendRoute {} {} rejected: {}", id, name, e);
                false
            }
        }
    }

    fn try_remove_road(&mut self, n1: &str, n2: &str) -> MapResult<()> {
        Self::check_two_distinct_names(n1, n2)?;
        let (c1, c2, seg) = self
            .find_segment_by_name(n1, n2)
            .ok_or(MapError::NotFound("no such segment"))?;

        let saved = self.graph.segment(seg).state;
        self.graph.segment_mut(seg).state = SegmentState::Blocked {
            length: saved.length(),
            last_repaired: saved.last_repaired(),
        };

        let mut patches: Vec<(u32, Vec<SegmentId>)> = Vec::new();
        let mut failure: Option<MapError> = None;
        for id in MIN_ROUTE_ID..=MAX_ROUTE_ID {
            let route = match self.route_slot(id) {
                Some(r) if r.contains(seg) => r.clone(),
                _ => continue,
            };
            let orientation = route.orient(&self.graph, c1, c2);
            let (from, to) = if orientation == 1 { (c1, c2) } else { (c2, c1) };
            match search(&self.graph, from, to, &route.roads) {
                SearchOutcome::Unique(_, replacement) => {
                    if !seq::prepare_replace(&route.roads, seg) {
                        failure = Some(MapError::Conflict("replacement path could not be spliced in"));
                        break;
                    }
                    patches.push((id, replacement));
                }
                SearchOutcome::Ambiguous(_) => {
                    failure = Some(MapError::Ambiguous("replacement path is not unique"));
                    break;
                }
                SearchOutcome::None | SearchOutcome::Error => {
                    failure = Some(MapError::Conflict("a route using this segment has no alternative"));
                    break;
                }
            }
        }

        if let Some(err) = failure {
            let saved = self.graph.segment(seg).state;
            self.graph.segment_mut(seg).state = SegmentState::Live {
                length: saved.length(),
                last_repaired: saved.last_repaired(),
            };
            return Err(err);
        }

        for (id, replacement) in patches {
            let route = self.routes[id as usize].as_mut().unwrap();
            seq::commit_replace(&mut route.roads, seg, replacement);
        }
        self.graph.free_segment(seg);
        Ok(())
    }

    /// `removeRoad(name1, name2) -> bool` (spec.md §4.7, §6, §9).
    pub fn remove_road(&mut self, n1: &str, n2: &str) -> bool {
        match self.try_remove_road(n1, n2) {
            Ok(()) => {
                log::info!("removeRoad {} {}", n1, n2);
                true
            }
            Err(e) => {
                log::debug!("removeRoad {} {} rejected: {}", n1, n2, e);
                false
            }
        }
    }

    /// `removeRoute(id) -> bool` (spec.md §4.7, §6).
    pub fn remove_route(&mut self, id: u32) -> bool {
        if !check_route_id(id) || self.route_slot(id).is_none() {
            log::debug!("removeRoute {} rejected: no such route", id);
            return false;
        }
        self.routes[id as usize] = None;
        log::info!("removeRoute {}", id);
        true
    }

    /// `getRouteDescription(id) -> String`, empty when the slot is absent
    /// (spec.md §4.7, §6).
    pub fn get_route_description(&self, id: u32) -> String {
        if !check_route_id(id) {
            return String::new();
        }
        match self.route_slot(id) {
            Some(route) => route.describe(&self.graph, id),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn invariant_5_exact_and_illegal_status() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert_eq!(map.get_road_status("A", "B", 5, 2000), RoadStatus::Exact);
        assert_eq!(map.get_road_status("A", "B", 6, 2000), RoadStatus::Illegal);
    }

    #[test]
    fn invariant_6_repair_idempotent_and_monotonic() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.repair_road("A", "B", 2005));
        assert!(map.repair_road("A", "B", 2005));
        assert!(!map.repair_road("A", "B", 1999));
        assert_eq!(map.get_road_status("A", "B", 5, 2005), RoadStatus::Exact);
    }

    #[test]
    fn boundary_route_ids() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 1, 1));
        assert!(!map.new_route(0, "A", "B"));
        assert!(!map.new_route(1000, "A", "B"));
        assert!(map.new_route(1, "A", "B"));
        assert!(map.new_route(999, "A", "B"));
    }

    #[test]
    fn boundary_zero_length_and_year_rejected() {
        let mut map = Map::new();
        assert!(!map.add_road("A", "B", 0, 2000));
        assert!(!map.add_road("A", "B", 5, 0));
        assert_eq!(map.get_road_status("A", "B", 0, 2000), RoadStatus::Illegal);
        assert_eq!(map.get_road_status("A", "B", 5, 0), RoadStatus::Illegal);
    }

    #[test]
    fn s1_simple_shortest_path() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.add_road("B", "C", 5, 2000));
        assert!(map.add_road("A", "C", 100, 2000));
        assert!(map.new_route(7, "A", "C"));
        assert_eq!(map.get_route_description(7), "7;A;5;2000;B;5;2000;C");
    }

    #[test]
    fn s2_tie_on_length_year_tiebreak() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 1990));
        assert!(map.add_road("B", "C", 5, 1990));
        assert!(map.add_road("A", "D", 5, 2005));
        assert!(map.add_road("D", "C", 5, 2005));
        assert!(map.new_route(1, "A", "C"));
        assert_eq!(map.get_route_description(1), "1;A;5;2005;D;5;2005;C");
    }

    #[test]
    fn s3_ambiguous_route_rejected() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.add_road("B", "C", 5, 2000));
        assert!(map.add_road("A", "D", 5, 2000));
        assert!(map.add_road("D", "C", 5, 2000));
        assert!(!map.new_route(2, "A", "C"));
        assert_eq!(map.get_route_description(2), "");
    }

    #[test]
    fn ambiguous_path_is_its_own_error_kind() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.add_road("B", "C", 5, 2000));
        assert!(map.add_road("A", "D", 5, 2000));
        assert!(map.add_road("D", "C", 5, 2000));
        assert!(matches!(
            map.try_new_route(2, "A", "C"),
            Err(MapError::Ambiguous(_))
        ));
    }

    #[test]
    fn s4_remove_road_patches_route() {
        let mut map = Map::new();
        let cities = vec![s("A"), s("B"), s("C"), s("D")];
        assert!(map.create_route(7, &cities, &[5, 5, 5], &[2000, 2000, 2000]));
        // A bypass between B and C, not touching the route's other cities.
        assert!(map.add_road("B", "X", 3, 2000));
        assert!(map.add_road("X", "C", 3, 2000));

        assert!(map.remove_road("B", "C"));
        assert_eq!(
            map.get_route_description(7),
            "7;A;5;2000;B;3;2000;X;3;2000;C;5;2000;D"
        );
    }

    #[test]
    fn s5_remove_road_unresolvable_leaves_segment() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.add_road("B", "C", 5, 2000));
        assert!(map.new_route(7, "A", "C"));
        assert!(!map.remove_road("B", "C"));
        assert_eq!(map.get_road_status("B", "C", 5, 2000), RoadStatus::Exact);
        assert_eq!(map.get_route_description(7), "7;A;5;2000;B;5;2000;C");
    }

    #[test]
    fn s6_extend_route_tiebreak_between_ends() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.add_road("B", "C", 5, 2000));
        assert!(map.add_road("A", "C", 100, 2000));
        assert!(map.new_route(7, "A", "C"));
        assert!(map.add_road("C", "D", 1, 2010));
        assert!(map.extend_route(7, "D"));
        assert_eq!(
            map.get_route_description(7),
            "7;A;5;2000;B;5;2000;C;1;2010;D"
        );
    }

    #[test]
    fn create_route_round_trip() {
        let mut map = Map::new();
        let cities = vec![s("A"), s("B"), s("C")];
        assert!(map.create_route(3, &cities, &[5, 7], &[2000, 2001]));
        assert_eq!(map.get_route_description(3), "3;A;5;2000;B;7;2001;C");
    }

    #[test]
    fn create_route_rejects_illegal_leg() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        let cities = vec![s("A"), s("B"), s("C")];
        assert!(!map.create_route(4, &cities, &[6, 7], &[2000, 2001]));
        assert_eq!(map.get_route_description(4), "");
    }

    #[test]
    fn remove_route_frees_the_slot_but_not_segments() {
        let mut map = Map::new();
        assert!(map.add_road("A", "B", 5, 2000));
        assert!(map.new_route(1, "A", "B"));
        assert!(map.remove_route(1));
        assert_eq!(map.get_route_description(1), "");
        assert_eq!(map.get_road_status("A", "B", 5, 2000), RoadStatus::Exact);
        assert!(!map.remove_route(1));
    }
}
