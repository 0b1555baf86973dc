//! The road graph: cities, segments, and the name→city lookup (components C2/C4).

use std::collections::HashMap;

/// Dense, never-reused index into the city arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(pub u32);

/// Index into the segment arena. May be freed and left as a `None` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u32);

#[derive(Clone, Debug)]
pub struct City {
    pub name: String,
    /// Neighbour list: segments incident to this city, in insertion order.
    pub segments: Vec<SegmentId>,
}

/// A segment's state. `Blocked` is the transient state `removeRoad` puts a
/// segment in while hunting for replacement paths (spec.md §3, §4.7): the
/// search engine must treat it as unusable but its length/year are kept
/// around so a failed `removeRoad` can restore them exactly.
#[derive(Clone, Copy, Debug)]
pub enum SegmentState {
    Live { length: u32, last_repaired: i32 },
    Blocked { length: u32, last_repaired: i32 },
}

impl SegmentState {
    pub fn length(&self) -> u32 {
        match *self {
            SegmentState::Live { length, .. } => length,
            SegmentState::Blocked { length, .. } => length,
        }
    }

    pub fn last_repaired(&self) -> i32 {
        match *self {
            SegmentState::Live { last_repaired, .. } => last_repaired,
            SegmentState::Blocked { last_repaired, .. } => last_repaired,
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, SegmentState::Live { .. })
    }
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub e1: CityId,
    pub e2: CityId,
    pub state: SegmentState,
}

/// Name→city lookup. Keys are owned copies of the city name (C2).
pub type NameMap = HashMap<String, CityId>;

/// Cities and segments live in parallel arenas; routes and neighbour lists
/// reference them by index rather than by pointer (spec.md §9).
#[derive(Default)]
pub struct Graph {
    pub names: NameMap,
    cities: Vec<City>,
    segments: Vec<Option<Segment>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(&self, id: CityId) -> &City {
        &self.cities[id.0 as usize]
    }

    pub fn city_mut(&mut self, id: CityId) -> &mut City {
        &mut self.cities[id.0 as usize]
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn lookup(&self, name: &str) -> Option<CityId> {
        self.names.get(name).copied()
    }

    /// Creates a city with the given name. Does not check the name's
    /// validity or uniqueness; the caller (`map`) does that.
    pub fn create_city(&mut self, name: &str) -> CityId {
        let id = CityId(self.cities.len() as u32);
        self.cities.push(City {
            name: name.to_string(),
            segments: Vec::new(),
        });
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        self.segments[id.0 as usize].as_ref().expect("dangling SegmentId")
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> &mut Segment {
        self.segments[id.0 as usize].as_mut().expect("dangling SegmentId")
    }

    /// Creates a live segment between `c1` and `c2` and links it into both
    /// neighbour lists. Does not check that no segment already exists
    /// between them; the caller does that (spec.md §4.7 `addRoad`).
    pub fn create_segment(&mut self, c1: CityId, c2: CityId, length: u32, year: i32) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(Some(Segment {
            e1: c1,
            e2: c2,
            state: SegmentState::Live {
                length,
                last_repaired: year,
            },
        }));
        self.city_mut(c1).segments.push(id);
        if c1 != c2 {
            self.city_mut(c2).segments.push(id);
        }
        id
    }

    /// Unlinks and frees a segment. Must only be called once every route has
    /// stopped referencing it (spec.md §4.7 `removeRoad`'s commit phase).
    pub fn free_segment(&mut self, id: SegmentId) {
        let seg = self.segment(id).clone();
        self.city_mut(seg.e1).segments.retain(|&s| s != id);
        if seg.e1 != seg.e2 {
            self.city_mut(seg.e2).segments.retain(|&s| s != id);
        }
        self.segments[id.0 as usize] = None;
    }

    /// Scans the neighbour list of the smaller-degree endpoint (spec.md
    /// §4.4 `findRoad`).
    pub fn find_segment(&self, c1: CityId, c2: CityId) -> Option<SegmentId> {
        let (from, to) = if self.city(c1).segments.len() <= self.city(c2).segments.len() {
            (c1, c2)
        } else {
            (c2, c1)
        };
        self.city(from)
            .segments
            .iter()
            .copied()
            .find(|&s| self.other_end(s, from) == Some(to))
    }

    /// The opposite endpoint of `seg` from `end`, or `None` if `end` is not
    /// an endpoint or the segment is blocked (spec.md §4.4).
    pub fn other_end(&self, seg: SegmentId, end: CityId) -> Option<CityId> {
        let s = self.segment(seg);
        if !s.state.is_usable() {
            return None;
        }
        if s.e1 == end {
            Some(s.e2)
        } else if s.e2 == end {
            Some(s.e1)
        } else {
            None
        }
    }
}
