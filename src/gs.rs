//! The extended Gale–Shapley procedure with ties (Manlove's `SUPER2`).
//!
//! Produces the proposer-optimal super-stable matching together with the
//! reduced ("GS-list") preference lists, or detects that no super-stable
//! matching exists. Operates on owned copies of both sides' preference
//! lists — the caller's lists are untouched.

use crate::pref::PrefList;
use std::fmt::Debug;
use std::hash::Hash;

/// Anything usable as an agent id inside the GS engine: convertible to and
/// from a dense index, comparable, and orderable (used only to pick a
/// deterministic free agent each round — any fair rule gives the same
/// result, see the distilled specification's design notes).
pub trait AgentLike: Copy + Eq + Ord + Hash + Debug + From<usize> + Into<usize> {}
impl<T: Copy + Eq + Ord + Hash + Debug + From<usize> + Into<usize>> AgentLike for T {}

/// Outcome of running the GS-list engine in one orientation.
pub enum GsOutcome<P, Q> {
    /// No super-stable matching exists in the instance (some proposee that
    /// was proposed to at least once ends the procedure unmatched).
    Infeasible,
    Reduced(GsReduction<P, Q>),
}

pub struct GsReduction<P, Q> {
    /// Proposer-optimal reduced lists, indexed by proposer.
    pub proposer_lists: Vec<PrefList<Q>>,
    /// Proposer-optimal reduced lists, indexed by proposee.
    pub proposee_lists: Vec<PrefList<P>>,
    /// The proposer-optimal matching: proposer -> proposee.
    pub matching: Vec<Option<Q>>,
    pub unmatched_proposers: Vec<P>,
    pub unmatched_proposees: Vec<Q>,
}

/// Runs the extended Gale–Shapley procedure with `proposer_prefs` (indexed
/// by proposer) proposing into `proposee_prefs` (indexed by proposee).
#[tracing::instrument(level = "debug", skip_all)]
pub fn run<P: AgentLike, Q: AgentLike>(
    proposer_prefs_in: &[PrefList<Q>],
    proposee_prefs_in: &[PrefList<P>],
) -> GsOutcome<P, Q> {
    let mut proposer_prefs: Vec<PrefList<Q>> = proposer_prefs_in.to_vec();
    let mut proposee_prefs: Vec<PrefList<P>> = proposee_prefs_in.to_vec();

    let mut engaged: Vec<Vec<Q>> = vec![Vec::new(); proposer_prefs.len()];
    let mut proposed_to = vec![false; proposee_prefs.len()];

    let mut free: Vec<P> = (0..proposer_prefs.len())
        .map(P::from)
        .filter(|&p| !proposer_prefs[p.into()].is_empty())
        .collect();

    let mut iteration = 0u64;
    while let Some(&p) = free.iter().min() {
        iteration += 1;
        tracing::trace!(iteration, proposer = ?p, "proposal round");

        let top_tier: Vec<Q> = proposer_prefs[p.into()].top_tier().expect("free proposer has a list").to_vec();
        for q in top_tier {
            proposed_to[q.into()] = true;

            // reject every proposer q ranks strictly below p
            if let Some(p_rank) = proposee_prefs[q.into()].rank(p) {
                let rejects: Vec<P> = proposee_prefs[q.into()]
                    .iter_tiers()
                    .skip(p_rank + 1)
                    .flatten()
                    .copied()
                    .collect();
                for reject in rejects {
                    proposer_prefs[reject.into()].remove(q);
                    proposee_prefs[q.into()].remove(reject);
                    engaged[reject.into()].retain(|&x| x != q);
                }
            }

            engaged[p.into()].push(q);
        }
        free.retain(|&x| x != p);

        // identify proposees now engaged to two or more proposers
        let mut engagement_count = vec![0u32; proposee_prefs.len()];
        for list in &engaged {
            for &q in list {
                engagement_count[q.into()] += 1;
            }
        }
        let multiply_engaged: Vec<Q> = (0..proposee_prefs.len())
            .map(Q::from)
            .filter(|&q| engagement_count[q.into()] > 1)
            .collect();

        for q in multiply_engaged {
            for p2_idx in 0..engaged.len() {
                if engaged[p2_idx].contains(&q) {
                    engaged[p2_idx].retain(|&x| x != q);
                    if engaged[p2_idx].is_empty() {
                        free.push(P::from(p2_idx));
                    }
                }
            }
            // drop the bottom tier of q's list: those proposers can never
            // reach q in a super-stable matching once q has two suitors.
            let num_tiers = proposee_prefs[q.into()].num_tiers();
            if num_tiers > 0 {
                let bottom: Vec<P> = proposee_prefs[q.into()].tier(num_tiers - 1).to_vec();
                for man in bottom {
                    proposer_prefs[man.into()].remove(q);
                }
                proposee_prefs[q.into()].pop_bottom_tier();
            }
        }

        // cleanup: free proposers with no engagement and a non-empty list rejoin
        for p_idx in 0..proposer_prefs.len() {
            let p_id = P::from(p_idx);
            let has_list = !proposer_prefs[p_idx].is_empty();
            let is_engaged = !engaged[p_idx].is_empty();
            let in_free = free.contains(&p_id);
            if !is_engaged && has_list && !in_free {
                free.push(p_id);
            }
            if !has_list && in_free {
                free.retain(|&x| x != p_id);
            }
        }
    }

    let matching: Vec<Option<Q>> = engaged.iter().map(|e| e.first().copied()).collect();
    let unmatched_proposers: Vec<P> = (0..proposer_prefs.len())
        .map(P::from)
        .filter(|&p| engaged[p.into()].is_empty())
        .collect();
    let unmatched_proposees: Vec<Q> = (0..proposee_prefs.len())
        .map(Q::from)
        .filter(|&q| !matching.iter().any(|m| *m == Some(q)))
        .collect();

    for &q in &unmatched_proposees {
        if proposed_to[q.into()] {
            tracing::debug!(proposee = ?q, "proposee proposed-to but unmatched: instance is infeasible");
            return GsOutcome::Infeasible;
        }
    }

    GsOutcome::Reduced(GsReduction {
        proposer_lists: proposer_prefs,
        proposee_lists: proposee_prefs,
        matching,
        unmatched_proposers,
        unmatched_proposees,
    })
}
