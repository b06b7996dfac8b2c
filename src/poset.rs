//! Builds the rotation poset: the partial order among rotations induced by
//! which ones must be eliminated before another becomes exposed. Grounded
//! directly on the Type-1/Type-2 labelling scheme used to derive rotation
//! digraph edges in the reference algorithm this crate implements.

use crate::agent::{L, R};
use crate::pref::PrefList;
use crate::rotation::graph::AdjGraph;
use crate::rotation::Rotation;
use hashbrown::HashSet;
use std::collections::VecDeque;

pub struct RotationPoset {
    num_rotations: usize,
    edges: Vec<(usize, usize)>,
    succ: AdjGraph<usize>,
}

impl RotationPoset {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(rotations: &[Rotation], l_gslist: &[PrefList<R>], r_gslist: &[PrefList<L>]) -> Self {
        let num_rotations = rotations.len();

        // type1_labels[l][tier][pos] / type2_labels[l][tier][pos] mirror the
        // shape of l_gslist[l], each cell holding the rotation index (if
        // any) that labels that (l, r) GS-list slot.
        let mut type1: Vec<Vec<Vec<Option<usize>>>> = l_gslist.iter().map(|list| list.iter_tiers().map(|t| vec![None; t.len()]).collect()).collect();
        let mut type2 = type1.clone();

        for (i, rotation) in rotations.iter().enumerate() {
            for &(l, r) in &rotation.pairs {
                let tier = l_gslist[usize::from(l)].rank(r).expect("rotation edge is in the GS-list");
                let pos = l_gslist[usize::from(l)].tier(tier).iter().position(|&x| x == r).unwrap();
                type1[usize::from(l)][tier][pos] = Some(i);
            }
        }

        for (i, rotation) in rotations.iter().enumerate() {
            let k = rotation.pairs.len();
            for j in 0..k {
                let (old_man, woman) = rotation.pairs[j];
                let (new_man, _) = rotation.pairs[(j + k - 1) % k];
                let old_rank = r_gslist[usize::from(woman)].rank(old_man).expect("rotation edge is in the GS-list");
                let new_rank = r_gslist[usize::from(woman)].rank(new_man).expect("rotation edge is in the GS-list");
                for rank in (new_rank + 1)..old_rank {
                    for &man in r_gslist[usize::from(woman)].tier(rank) {
                        let tier = l_gslist[usize::from(man)].rank(woman).expect("skipped man ranks the woman");
                        let pos = l_gslist[usize::from(man)].tier(tier).iter().position(|&x| x == woman).unwrap();
                        type2[usize::from(man)][tier][pos] = Some(i);
                    }
                }
            }
        }

        let mut edge_set: HashSet<(usize, usize)> = HashSet::new();
        for l_idx in 0..l_gslist.len() {
            let mut p_star: Option<usize> = None;
            for tier in 0..type1[l_idx].len() {
                for pos in 0..type1[l_idx][tier].len() {
                    if let Some(p) = type1[l_idx][tier][pos] {
                        if let Some(prev) = p_star {
                            edge_set.insert((prev, p));
                        }
                        p_star = Some(p);
                    }
                    if let (Some(p2), Some(prev)) = (type2[l_idx][tier][pos], p_star) {
                        if p2 != prev {
                            edge_set.insert((p2, prev));
                        }
                    }
                }
            }
        }

        let mut succ: AdjGraph<usize> = AdjGraph::new();
        for i in 0..num_rotations {
            succ.add_node(i);
        }
        for &(from, to) in &edge_set {
            succ.add_edge(from, to);
        }

        tracing::debug!(num_rotations, num_edges = edge_set.len(), "built rotation poset");

        RotationPoset {
            num_rotations,
            edges: edge_set.into_iter().collect(),
            succ,
        }
    }

    pub fn num_rotations(&self) -> usize {
        self.num_rotations
    }

    pub fn successors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.succ.successors(i)
    }

    fn predecessors(&self, i: usize) -> Vec<usize> {
        self.edges.iter().filter(|&&(_, to)| to == i).map(|&(from, _)| from).collect()
    }

    /// All ancestors of `i`, plus `i` itself.
    pub fn closure(&self, i: usize) -> hashbrown::HashSet<usize> {
        let mut visited = hashbrown::HashSet::new();
        let mut stack = vec![i];
        while let Some(n) = stack.pop() {
            if visited.insert(n) {
                for p in self.predecessors(n) {
                    stack.push(p);
                }
            }
        }
        visited
    }

    /// A topological order over every rotation (Kahn's algorithm).
    pub fn topological_order(&self) -> Vec<usize> {
        let mut indeg = vec![0usize; self.num_rotations];
        for &(_, to) in &self.edges {
            indeg[to] += 1;
        }
        let mut queue: VecDeque<usize> = (0..self.num_rotations).filter(|&n| indeg[n] == 0).collect();
        let mut order = Vec::with_capacity(self.num_rotations);
        while let Some(n) = queue.pop_front() {
            order.push(n);
            for w in self.succ.successors(n).collect::<Vec<_>>() {
                indeg[w] -= 1;
                if indeg[w] == 0 {
                    queue.push_back(w);
                }
            }
        }
        order
    }

    /// Every antichain of the poset (including the empty one), as sets of
    /// rotation indices. Brute-force over `2^num_rotations` subsets —
    /// correct for the modest rotation counts this crate targets; a large
    /// instance with many independent rotations can still make this
    /// expensive, since the number of antichains (and so matchings) is
    /// itself potentially exponential in the rotation count.
    pub fn all_antichains(&self) -> Vec<Vec<usize>> {
        let n = self.num_rotations;
        assert!(n < 63, "antichain enumeration only supports fewer than 63 rotations");
        let comparable = self.comparability_matrix();

        let mut result = Vec::new();
        for mask in 0u64..(1u64 << n) {
            let members: Vec<usize> = (0..n).filter(|&i| mask & (1 << i) != 0).collect();
            let mut ok = true;
            'outer: for (ai, &a) in members.iter().enumerate() {
                for &b in &members[ai + 1..] {
                    if comparable[a][b] {
                        ok = false;
                        break 'outer;
                    }
                }
            }
            if ok {
                result.push(members);
            }
        }
        result
    }

    fn comparability_matrix(&self) -> Vec<Vec<bool>> {
        let n = self.num_rotations;
        let mut reach = vec![vec![false; n]; n];
        for i in 0..n {
            for a in self.closure(i) {
                if a != i {
                    reach[a][i] = true;
                }
            }
        }
        let mut comparable = vec![vec![false; n]; n];
        for a in 0..n {
            for b in 0..n {
                comparable[a][b] = reach[a][b] || reach[b][a];
            }
        }
        comparable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{L as AL, R as AR};

    fn l(i: u32) -> AL {
        AL::new(i)
    }
    fn r(i: u32) -> AR {
        AR::new(i)
    }

    #[test]
    fn single_rotation_has_no_dependency() {
        let l_gslist = vec![PrefList::new(vec![vec![r(0), r(1)]]), PrefList::new(vec![vec![r(0), r(1)]])];
        let r_gslist = vec![PrefList::new(vec![vec![l(0), l(1)]]), PrefList::new(vec![vec![l(0), l(1)]])];
        let rotation = Rotation {
            pairs: vec![(l(0), r(0)), (l(1), r(1))],
            cycle_starts: vec![0],
        };
        let poset = RotationPoset::build(std::slice::from_ref(&rotation), &l_gslist, &r_gslist);
        assert_eq!(poset.num_rotations(), 1);
        let antichains = poset.all_antichains();
        // the empty antichain (man-optimal matching) and {0} (woman-optimal)
        assert_eq!(antichains.len(), 2);
    }
}
