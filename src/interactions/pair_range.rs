//! Pair-range predicates (§4.3).
//!
//! Grounded in `examples/original_source/src/dynamics/ranges/{1RAll,1RNone,2RRing}.cpp`
//! and `2RList.hpp`: each C++ `CRxxx`/`C2Rxxx` class becomes one variant here
//! instead of a class hierarchy, per Design Notes §9.

use crate::particle::ParticleId;
use std::collections::HashSet;

/// An inclusive particle-ID interval, as used by `Chain`/`Ring`/`ChainEnds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IdRange {
    pub start: u32,
    pub end: u32,
}

impl IdRange {
    pub fn new(start: u32, end: u32) -> Self {
        IdRange { start, end }
    }

    fn contains(&self, id: ParticleId) -> bool {
        id.0 >= self.start && id.0 <= self.end
    }
}

/// Predicate over an unordered particle-ID pair (§4.3).
///
/// `RNone` is the supplemented variant from
/// `examples/original_source/dynamo/dynamics/ranges/1RNone.hpp`: a pair-range
/// that matches nothing, used to explicitly disable the bulk potential for a
/// species that is entirely described by bonded Interactions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum PairRange {
    /// Every pair matches.
    All,
    /// Both IDs must fall in `range`.
    Single(IdRange),
    /// One ID in `first`, the other in `second` (either order).
    Pair(IdRange, IdRange),
    /// Consecutive IDs within `range` are bonded: `(i, i+1)`.
    Chain(IdRange),
    /// As `Chain`, plus the wraparound bond `(range.end, range.start)`.
    Ring(IdRange),
    /// The first and last atom of every chain of length `chain_len` within
    /// `range`, paired as `(first, last)` of each chain.
    ChainEnds(IdRange, u32),
    /// An explicit, unordered set of pairs.
    List(HashSet<(ParticleId, ParticleId)>),
    /// Matches nothing.
    None,
}

fn normalize(a: ParticleId, b: ParticleId) -> (ParticleId, ParticleId) {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

impl PairRange {
    pub fn matches(&self, a: ParticleId, b: ParticleId) -> bool {
        match self {
            PairRange::All => true,
            PairRange::Single(r) => r.contains(a) && r.contains(b),
            PairRange::Pair(first, second) => {
                (first.contains(a) && second.contains(b)) || (first.contains(b) && second.contains(a))
            }
            PairRange::Chain(r) => {
                let (lo, hi) = normalize(a, b);
                r.contains(lo) && r.contains(hi) && hi.0 - lo.0 == 1
            }
            PairRange::Ring(r) => {
                let (lo, hi) = normalize(a, b);
                if !(r.contains(lo) && r.contains(hi)) {
                    return false;
                }
                hi.0 - lo.0 == 1 || (lo.0 == r.start && hi.0 == r.end)
            }
            PairRange::ChainEnds(r, chain_len) => {
                if *chain_len == 0 {
                    return false;
                }
                let (lo, hi) = normalize(a, b);
                if !(r.contains(lo) && r.contains(hi)) {
                    return false;
                }
                let offset = lo.0 - r.start;
                let chain_start = r.start + (offset / chain_len) * chain_len;
                let chain_end = (chain_start + chain_len - 1).min(r.end);
                lo.0 == chain_start && hi.0 == chain_end && chain_start != chain_end
            }
            PairRange::List(pairs) => {
                let key = normalize(a, b);
                pairs.contains(&key)
            }
            PairRange::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u32) -> ParticleId {
        ParticleId(n)
    }

    #[test]
    fn all_matches_everything() {
        assert!(PairRange::All.matches(pid(0), pid(99)));
    }

    #[test]
    fn none_matches_nothing() {
        assert!(!PairRange::None.matches(pid(0), pid(1)));
    }

    #[test]
    fn chain_matches_only_consecutive_ids() {
        let r = PairRange::Chain(IdRange::new(0, 9));
        assert!(r.matches(pid(3), pid(4)));
        assert!(r.matches(pid(4), pid(3)));
        assert!(!r.matches(pid(3), pid(5)));
    }

    #[test]
    fn ring_adds_wraparound_bond() {
        let r = PairRange::Ring(IdRange::new(0, 9));
        assert!(r.matches(pid(9), pid(0)));
        assert!(r.matches(pid(0), pid(1)));
        assert!(!r.matches(pid(0), pid(8)));
    }

    #[test]
    fn chain_ends_pairs_first_and_last_of_each_subchain() {
        let r = PairRange::ChainEnds(IdRange::new(0, 9), 5);
        assert!(r.matches(pid(0), pid(4)));
        assert!(r.matches(pid(5), pid(9)));
        assert!(!r.matches(pid(0), pid(5)));
        assert!(!r.matches(pid(1), pid(4)));
    }

    #[test]
    fn list_matches_exact_pairs_regardless_of_order() {
        let mut set = HashSet::new();
        set.insert((pid(2), pid(7)));
        let r = PairRange::List(set);
        assert!(r.matches(pid(7), pid(2)));
        assert!(!r.matches(pid(2), pid(8)));
    }

    #[test]
    fn pair_matches_one_in_each_range_either_order() {
        let r = PairRange::Pair(IdRange::new(0, 1), IdRange::new(10, 11));
        assert!(r.matches(pid(0), pid(10)));
        assert!(r.matches(pid(11), pid(1)));
        assert!(!r.matches(pid(0), pid(1)));
    }
}
