//! Two-phase splice-replace (component C1's `prepare`/`commit` split).
//!
//! Safe Rust's `Vec` cannot fail to grow the way a C `realloc` can, so the
//! split no longer guards against allocation failure. It is kept anyway
//! because `removeRoad` (spec.md §4.7) must verify that *every* route
//! referencing a removed segment can be patched before mutating *any* of
//! them — `prepare` is the all-routes-checked gate, `commit` is the bulk
//! mutation that must then be infallible.

use crate::graph::SegmentId;

/// Checks that `target` occurs in `roads`. The actual commit always finds
/// it again (by construction, nothing else touches `roads` between the two
/// calls within one `removeRoad`), so this is the whole prepare phase.
pub fn prepare_replace(roads: &[SegmentId], target: SegmentId) -> bool {
    roads.contains(&target)
}

/// Replaces the last occurrence of `target` in `roads` with the elements of
/// `part`, in order. Panics if `target` is absent — callers must have
/// called `prepare_replace` first.
pub fn commit_replace(roads: &mut Vec<SegmentId>, target: SegmentId, part: Vec<SegmentId>) {
    let index = roads
        .iter()
        .rposition(|&s| s == target)
        .expect("commit_replace called without a successful prepare_replace");
    roads.splice(index..=index, part);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_last_occurrence_with_parts_in_order() {
        let mut roads = vec![SegmentId(1), SegmentId(2), SegmentId(1)];
        assert!(prepare_replace(&roads, SegmentId(1)));
        commit_replace(&mut roads, SegmentId(1), vec![SegmentId(9), SegmentId(10)]);
        assert_eq!(roads, vec![SegmentId(1), SegmentId(2), SegmentId(9), SegmentId(10)]);
    }

    #[test]
    fn prepare_fails_when_absent() {
        let roads = vec![SegmentId(2)];
        assert!(!prepare_replace(&roads, SegmentId(1)));
    }
}
