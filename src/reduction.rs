//! Extreme matchings and the symmetric GS-list reduction.
//!
//! Runs the GS-list engine ([`crate::gs`]) in both orientations and
//! intersects the two reductions tier-wise, producing the canonical
//! "GS-list" used by rotation finding, together with the `L`-optimal and
//! `R`-optimal super-stable matchings.

use crate::agent::{L, R};
use crate::gs::{self, GsOutcome};
use crate::matching::Matching;
use crate::pref::PrefList;

pub struct Reduction {
    /// Symmetric reduced lists, indexed by `L`.
    pub l_gslist: Vec<PrefList<R>>,
    /// Symmetric reduced lists, indexed by `R`.
    pub r_gslist: Vec<PrefList<L>>,
    pub l_optimal: Matching,
    pub r_optimal: Matching,
}

/// Intersects `a` with `b` tier-wise, keeping only entries of `a` whose
/// tier also survives (is ranked at all) in `b`. Mirrors `set_extreme_SMs`
/// in the reference implementation this crate's algorithm is grounded on.
fn intersect<Other: PartialEq + Copy>(a: &PrefList<Other>, b: &PrefList<Other>) -> PrefList<Other> {
    let tiers: Vec<Vec<Other>> = a
        .iter_tiers()
        .filter_map(|tier| {
            let kept: Vec<Other> = tier.iter().copied().filter(|&x| b.rank(x).is_some()).collect();
            if kept.is_empty() {
                None
            } else {
                Some(kept)
            }
        })
        .collect();
    PrefList::new(tiers)
}

/// Builds the symmetric reduction, or `None` if no super-stable matching
/// exists (either orientation of GS is infeasible).
#[tracing::instrument(level = "debug", skip_all)]
pub fn build(l_prefs: &[PrefList<R>], r_prefs: &[PrefList<L>]) -> Option<Reduction> {
    let l_proposing = match gs::run::<L, R>(l_prefs, r_prefs) {
        GsOutcome::Infeasible => {
            tracing::debug!("L-proposing GS run is infeasible");
            return None;
        }
        GsOutcome::Reduced(r) => r,
    };
    let r_proposing = match gs::run::<R, L>(r_prefs, l_prefs) {
        GsOutcome::Infeasible => {
            tracing::debug!("R-proposing GS run is infeasible");
            return None;
        }
        GsOutcome::Reduced(r) => r,
    };

    let num_l = l_prefs.len();
    let num_r = r_prefs.len();

    let l_gslist: Vec<PrefList<R>> = (0..num_l)
        .map(|i| intersect(&l_proposing.proposer_lists[i], &r_proposing.proposee_lists[i]))
        .collect();
    let r_gslist: Vec<PrefList<L>> = (0..num_r)
        .map(|i| intersect(&r_proposing.proposer_lists[i], &l_proposing.proposee_lists[i]))
        .collect();

    let mut l_optimal = Matching::unmatched(num_l);
    for (l_idx, partner) in l_proposing.matching.into_iter().enumerate() {
        l_optimal.set(L::from(l_idx), partner);
    }

    let mut r_optimal = Matching::unmatched(num_l);
    for (r_idx, partner) in r_proposing.matching.into_iter().enumerate() {
        if let Some(l) = partner {
            r_optimal.set(l, Some(R::from(r_idx)));
        }
    }

    Some(Reduction {
        l_gslist,
        r_gslist,
        l_optimal,
        r_optimal,
    })
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
    fn trivial_unique() {
        // l0 <-> r0, l1 <-> r1, strict, no ties.
        let l_prefs = vec![PrefList::new(vec![vec![r(0)]]), PrefList::new(vec![vec![r(1)]])];
        let r_prefs = vec![PrefList::new(vec![vec![l(0)]]), PrefList::new(vec![vec![l(1)]])];
        let red = build(&l_prefs, &r_prefs).expect("feasible");
        assert_eq!(red.l_optimal.get(l(0)), Some(r(0)));
        assert_eq!(red.l_optimal.get(l(1)), Some(r(1)));
        assert_eq!(red.l_optimal, red.r_optimal);
    }

    #[test]
    fn full_tie_two_agents_is_infeasible() {
        // every agent is indifferent between both partners on the other side,
        // so any matching admits a super-blocking pair with the partner left
        // over: no super-stable matching exists.
        let l_prefs = vec![PrefList::new(vec![vec![r(0), r(1)]]); 2];
        let r_prefs = vec![PrefList::new(vec![vec![l(0), l(1)]]); 2];
        assert!(build(&l_prefs, &r_prefs).is_none());
    }
}
