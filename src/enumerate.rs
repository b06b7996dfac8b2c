//! Enumerates every super-stable matching of an instance from its rotation
//! poset: one matching per antichain, built by eliminating the antichain's
//! full down-closure from the `L`-optimal matching.

use crate::matching::Matching;
use crate::poset::RotationPoset;
use crate::rotation::{apply, Rotation};
use hashbrown::HashSet;

#[tracing::instrument(level = "debug", skip_all)]
pub fn all_matchings(rotations: &[Rotation], poset: &RotationPoset, l_optimal: &Matching) -> Vec<Matching> {
    let topo = poset.topological_order();
    let antichains = poset.all_antichains();

    antichains
        .into_iter()
        .map(|antichain| {
            let mut needed: HashSet<usize> = HashSet::new();
            for r in antichain {
                needed.extend(poset.closure(r));
            }
            let mut matching = l_optimal.clone();
            for &idx in &topo {
                if needed.contains(&idx) {
                    matching = apply::eliminate(&matching, &rotations[idx]);
                }
            }
            matching
        })
        .collect()
}

pub fn count_matchings(poset: &RotationPoset) -> usize {
    poset.all_antichains().len()
}
