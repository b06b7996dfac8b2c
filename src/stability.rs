//! The stability oracle: classifies matchings against the weak, strong and
//! super stability predicates by searching for blocking pairs directly
//! against the caller's original preference lists (not the GS-reduced
//! ones — a matching's stability class depends on every acceptable
//! partner, not just the ones that survive GS reduction).

use crate::agent::{L, R};
use crate::matching::Matching;
use crate::pref::PrefList;

/// How badly a pair `(l, r)` violates stability, strongest first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum BlockingStatus {
    NotBlocking = -1,
    /// Both sides would weakly prefer each other to their current partner
    /// (or being unmatched) — violates super-stability only.
    Super = 0,
    /// One side strictly prefers, the other weakly prefers — violates
    /// strong and super stability.
    Strong = 1,
    /// Both sides strictly prefer each other — violates all three.
    Weak = 2,
}

/// Dense `R -> L` inverse of a matching, built once and reused across the
/// O(pairs) blocking-pair search — a dense array indexed directly by `r`
/// rather than `Matching::inverse`'s sparse map, since this is read once per
/// acceptable pair in `worst_blocking_status`'s hot loop.
pub fn r_partner_table(matching: &Matching, num_r: usize) -> Vec<Option<L>> {
    let inverse = matching.inverse();
    (0..num_r).map(|idx| inverse.get(&R::from(idx)).copied()).collect()
}

fn weakly_prefers<O: PartialEq + Copy>(prefs: &PrefList<O>, candidate: O, current: Option<O>) -> bool {
    let Some(cand_rank) = prefs.rank(candidate) else {
        return false;
    };
    match current.and_then(|c| prefs.rank(c)) {
        Some(cur_rank) => cand_rank <= cur_rank,
        None => true,
    }
}

fn strictly_prefers<O: PartialEq + Copy>(prefs: &PrefList<O>, candidate: O, current: Option<O>) -> bool {
    let Some(cand_rank) = prefs.rank(candidate) else {
        return false;
    };
    match current.and_then(|c| prefs.rank(c)) {
        Some(cur_rank) => cand_rank < cur_rank,
        None => true,
    }
}

/// Classifies the pair `(l, r)` against `matching`. `r_partner` is
/// `r_partner_table(matching, num_r)`.
pub fn blocking_status(
    l: L,
    r: R,
    matching: &Matching,
    r_partner: &[Option<L>],
    l_prefs: &[PrefList<R>],
    r_prefs: &[PrefList<L>],
) -> BlockingStatus {
    if matching.get(l) == Some(r) {
        return BlockingStatus::NotBlocking;
    }

    let l_current = matching.get(l);
    let r_current = r_partner[usize::from(r)];

    let l_weak = weakly_prefers(&l_prefs[usize::from(l)], r, l_current);
    let r_weak = weakly_prefers(&r_prefs[usize::from(r)], l, r_current);
    if !(l_weak && r_weak) {
        return BlockingStatus::NotBlocking;
    }

    let l_strict = strictly_prefers(&l_prefs[usize::from(l)], r, l_current);
    let r_strict = strictly_prefers(&r_prefs[usize::from(r)], l, r_current);
    if l_strict && r_strict {
        BlockingStatus::Weak
    } else if l_strict || r_strict {
        BlockingStatus::Strong
    } else {
        BlockingStatus::Super
    }
}

/// The worst blocking status among all acceptable pairs, or `NotBlocking`
/// if `matching` is super-stable.
#[tracing::instrument(level = "debug", skip_all)]
pub fn worst_blocking_status(matching: &Matching, l_prefs: &[PrefList<R>], r_prefs: &[PrefList<L>], num_r: usize) -> BlockingStatus {
    let r_partner = r_partner_table(matching, num_r);
    let mut worst = BlockingStatus::NotBlocking;
    for l_idx in 0..l_prefs.len() {
        let l = L::from(l_idx);
        for r in l_prefs[l_idx].iter_all() {
            let status = blocking_status(l, r, matching, &r_partner, l_prefs, r_prefs);
            if status > worst {
                worst = status;
                if worst == BlockingStatus::Weak {
                    return worst;
                }
            }
        }
    }
    worst
}

pub fn is_super_stable(matching: &Matching, l_prefs: &[PrefList<R>], r_prefs: &[PrefList<L>], num_r: usize) -> bool {
    worst_blocking_status(matching, l_prefs, r_prefs, num_r) == BlockingStatus::NotBlocking
}

pub fn is_strongly_stable(matching: &Matching, l_prefs: &[PrefList<R>], r_prefs: &[PrefList<L>], num_r: usize) -> bool {
    worst_blocking_status(matching, l_prefs, r_prefs, num_r) < BlockingStatus::Strong
}

pub fn is_weakly_stable(matching: &Matching, l_prefs: &[PrefList<R>], r_prefs: &[PrefList<L>], num_r: usize) -> bool {
    worst_blocking_status(matching, l_prefs, r_prefs, num_r) < BlockingStatus::Weak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(i: u32) -> L {
        L::new(i)
    }
    fn r(i: u32) -> R {
        R::new(i)
    }

    #[test]
    fn unique_stable_matching_has_no_blocking_pair() {
        let l_prefs = vec![PrefList::new(vec![vec![r(0)]]), PrefList::new(vec![vec![r(1)]])];
        let r_prefs = vec![PrefList::new(vec![vec![l(0)]]), PrefList::new(vec![vec![l(1)]])];
        let mut m = Matching::unmatched(2);
        m.set(l(0), Some(r(0)));
        m.set(l(1), Some(r(1)));
        assert!(is_super_stable(&m, &l_prefs, &r_prefs, 2));
        assert!(is_strongly_stable(&m, &l_prefs, &r_prefs, 2));
        assert!(is_weakly_stable(&m, &l_prefs, &r_prefs, 2));
    }

    #[test]
    fn swapped_matching_is_weakly_blocked() {
        // l0 is matched to r1 and l1 to r0, but neither side ranks its
        // current partner at all: both prefer the swap outright, so (l0,
        // r0) is a weak-blocking pair against this (invalid as a
        // super-stable candidate) matching.
        let l_prefs = vec![PrefList::new(vec![vec![r(0)]]), PrefList::new(vec![vec![r(1)]])];
        let r_prefs = vec![PrefList::new(vec![vec![l(0)]]), PrefList::new(vec![vec![l(1)]])];
        let mut m = Matching::unmatched(2);
        m.set(l(0), Some(r(1)));
        m.set(l(1), Some(r(0)));
        assert_eq!(worst_blocking_status(&m, &l_prefs, &r_prefs, 2), BlockingStatus::Weak);
        assert!(!is_weakly_stable(&m, &l_prefs, &r_prefs, 2));
    }

    #[test]
    fn tied_matching_is_super_blocked_but_not_strongly() {
        let l_prefs = vec![PrefList::new(vec![vec![r(0), r(1)]]); 2];
        let r_prefs = vec![PrefList::new(vec![vec![l(0), l(1)]]); 2];
        let mut m = Matching::unmatched(2);
        m.set(l(0), Some(r(0)));
        m.set(l(1), Some(r(1)));
        // l0 and r1 are indifferent between their current partner and each other.
        assert!(!is_super_stable(&m, &l_prefs, &r_prefs, 2));
        assert!(is_strongly_stable(&m, &l_prefs, &r_prefs, 2));
        assert!(is_weakly_stable(&m, &l_prefs, &r_prefs, 2));
    }
}
