//! The public entry point: builds an instance from raw preference tables
//! and answers every query the rest of the crate computes.

use crate::agent::{L, R};
use crate::edge::EdgeTable;
use crate::enumerate;
use crate::error::{BuildError, Side};
use crate::matching::Matching;
use crate::poset::RotationPoset;
use crate::pref::PrefList;
use crate::reduction::{self, Reduction};
use crate::rotation::finder;
use crate::rotation::Rotation;
use crate::stability::{self, BlockingStatus};
use std::cell::RefCell;

fn build_pref_lists<Other: Copy + PartialEq + From<usize>>(raw: &[Vec<Vec<usize>>], num_other: usize, side: Side) -> Result<Vec<PrefList<Other>>, BuildError> {
    let mut lists = Vec::with_capacity(raw.len());
    for (agent, tiers) in raw.iter().enumerate() {
        let mut seen = std::collections::HashSet::new();
        for (tier_idx, tier) in tiers.iter().enumerate() {
            if tier.is_empty() {
                return Err(BuildError::EmptyTier { side, agent, tier: tier_idx });
            }
            for &referenced in tier {
                if referenced >= num_other {
                    return Err(BuildError::OutOfRange { side, agent, referenced });
                }
                if !seen.insert(referenced) {
                    return Err(BuildError::DuplicateRanking { side, agent, referenced });
                }
            }
        }
        let owned: Vec<Vec<Other>> = tiers.iter().map(|tier| tier.iter().map(|&i| Other::from(i)).collect()).collect();
        lists.push(PrefList::new(owned));
    }
    Ok(lists)
}

/// A built super-stable-matching instance. Construction runs the GS-list
/// reduction eagerly (cheap, and needed to answer [`Instance::feasible`]);
/// rotations and the rotation poset are computed lazily on first use and
/// cached for the instance's lifetime.
pub struct Instance {
    l_prefs: Vec<PrefList<R>>,
    r_prefs: Vec<PrefList<L>>,
    reduction: Option<Reduction>,
    edge_table: EdgeTable,
    rotations: RefCell<Option<Vec<Rotation>>>,
    poset: RefCell<Option<RotationPoset>>,
}

impl Instance {
    /// Builds an instance from `l_prefs`/`r_prefs`: outer index is the
    /// agent, inner `Vec<Vec<usize>>` is that agent's preference list as
    /// an ordered sequence of tiers (ties), each tier an unordered set of
    /// acceptable partner indices on the other side.
    #[tracing::instrument(level = "debug", skip(l_prefs_raw, r_prefs_raw))]
    pub fn build(l_prefs_raw: Vec<Vec<Vec<usize>>>, r_prefs_raw: Vec<Vec<Vec<usize>>>) -> Result<Instance, BuildError> {
        let num_l = l_prefs_raw.len();
        let num_r = r_prefs_raw.len();

        let l_prefs: Vec<PrefList<R>> = build_pref_lists(&l_prefs_raw, num_r, Side::L)?;
        let r_prefs: Vec<PrefList<L>> = build_pref_lists(&r_prefs_raw, num_l, Side::R)?;

        let reduction = reduction::build(&l_prefs, &r_prefs);
        let edge_table = match &reduction {
            Some(red) => EdgeTable::build(&red.l_gslist, &red.r_gslist),
            None => EdgeTable::build(&[], &[]),
        };

        tracing::debug!(num_l, num_r, feasible = reduction.is_some(), "built instance");

        Ok(Instance {
            l_prefs,
            r_prefs,
            reduction,
            edge_table,
            rotations: RefCell::new(None),
            poset: RefCell::new(None),
        })
    }

    pub fn num_l(&self) -> usize {
        self.l_prefs.len()
    }

    pub fn num_r(&self) -> usize {
        self.r_prefs.len()
    }

    /// Whether any super-stable matching exists.
    pub fn feasible(&self) -> bool {
        self.reduction.is_some()
    }

    pub fn l_optimal(&self) -> Option<Vec<Option<usize>>> {
        self.reduction.as_ref().map(|r| r.l_optimal.clone().into_raw())
    }

    pub fn r_optimal(&self) -> Option<Vec<Option<usize>>> {
        self.reduction.as_ref().map(|r| r.r_optimal.clone().into_raw())
    }

    fn ensure_rotations(&self) {
        if self.rotations.borrow().is_some() {
            return;
        }
        let Some(red) = &self.reduction else {
            self.rotations.replace(Some(Vec::new()));
            return;
        };
        let found = finder::find_all(&self.l_prefs, &self.r_prefs, &self.edge_table, &red.l_optimal, &red.r_optimal);
        self.rotations.replace(Some(found));
    }

    fn ensure_poset(&self) {
        self.ensure_rotations();
        if self.poset.borrow().is_some() {
            return;
        }
        let Some(red) = &self.reduction else {
            return;
        };
        let rotations = self.rotations.borrow();
        let rotations = rotations.as_ref().unwrap();
        let poset = RotationPoset::build(rotations, &red.l_gslist, &red.r_gslist);
        self.poset.replace(Some(poset));
    }

    /// Every rotation between the `L`-optimal and `R`-optimal matchings, as
    /// `(l, r)` pairs representing each man's pre-rotation partner.
    pub fn rotations(&self) -> Vec<Vec<(usize, usize)>> {
        self.ensure_rotations();
        self.rotations
            .borrow()
            .as_ref()
            .map(|rs| rs.iter().map(|r| r.pairs.iter().map(|&(l, r)| (usize::from(l), usize::from(r))).collect()).collect())
            .unwrap_or_default()
    }

    /// The rotation poset's edges as `(before, after)` rotation index
    /// pairs: `before` must be eliminated for `after` to be exposed.
    pub fn rotation_poset(&self) -> Vec<(usize, usize)> {
        self.ensure_poset();
        let poset = self.poset.borrow();
        match poset.as_ref() {
            Some(p) => (0..p.num_rotations()).flat_map(|i| p.successors(i).map(move |j| (i, j))).collect(),
            None => Vec::new(),
        }
    }

    /// Every super-stable matching of the instance.
    pub fn all_matchings(&self) -> Vec<Vec<Option<usize>>> {
        self.ensure_poset();
        let Some(red) = &self.reduction else {
            return Vec::new();
        };
        let rotations = self.rotations.borrow();
        let rotations = rotations.as_ref().unwrap();
        let poset = self.poset.borrow();
        let poset = poset.as_ref().unwrap();
        enumerate::all_matchings(rotations, poset, &red.l_optimal).into_iter().map(Matching::into_raw).collect()
    }

    pub fn count_matchings(&self) -> usize {
        self.ensure_poset();
        match self.poset.borrow().as_ref() {
            Some(p) => enumerate::count_matchings(p),
            None => 0,
        }
    }

    pub fn is_super_stable(&self, matching: &[Option<usize>]) -> bool {
        let m = Matching::from_raw(matching.to_vec());
        stability::is_super_stable(&m, &self.l_prefs, &self.r_prefs, self.num_r())
    }

    pub fn is_strongly_stable(&self, matching: &[Option<usize>]) -> bool {
        let m = Matching::from_raw(matching.to_vec());
        stability::is_strongly_stable(&m, &self.l_prefs, &self.r_prefs, self.num_r())
    }

    pub fn is_weakly_stable(&self, matching: &[Option<usize>]) -> bool {
        let m = Matching::from_raw(matching.to_vec());
        stability::is_weakly_stable(&m, &self.l_prefs, &self.r_prefs, self.num_r())
    }

    /// The worst blocking-status classification of `(l, r)` against
    /// `matching`.
    pub fn blocking_status(&self, matching: &[Option<usize>], l: usize, r: usize) -> BlockingStatus {
        let m = Matching::from_raw(matching.to_vec());
        let r_partner = stability::r_partner_table(&m, self.num_r());
        stability::blocking_status(L::from(l), R::from(r), &m, &r_partner, &self.l_prefs, &self.r_prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_two_agent_instance_is_feasible_and_unique() {
        let l_prefs = vec![vec![vec![0]], vec![vec![1]]];
        let r_prefs = vec![vec![vec![0]], vec![vec![1]]];
        let instance = Instance::build(l_prefs, r_prefs).expect("valid instance");
        assert!(instance.feasible());
        assert_eq!(instance.l_optimal(), Some(vec![Some(0), Some(1)]));
        assert_eq!(instance.r_optimal(), instance.l_optimal());
        assert_eq!(instance.count_matchings(), 1);
        assert!(instance.rotations().is_empty());
    }

    #[test]
    fn out_of_range_partner_is_rejected() {
        let l_prefs = vec![vec![vec![5]]];
        let r_prefs = vec![vec![vec![0]]];
        let err = Instance::build(l_prefs, r_prefs).unwrap_err();
        assert!(matches!(err, BuildError::OutOfRange { side: Side::L, agent: 0, referenced: 5 }));
    }

    #[test]
    fn fully_tied_two_by_two_is_infeasible() {
        let l_prefs = vec![vec![vec![0, 1]], vec![vec![0, 1]]];
        let r_prefs = vec![vec![vec![0, 1]], vec![vec![0, 1]]];
        let instance = Instance::build(l_prefs, r_prefs).expect("valid instance");
        assert!(!instance.feasible());
        assert_eq!(instance.l_optimal(), None);
        assert_eq!(instance.count_matchings(), 0);
    }
}
