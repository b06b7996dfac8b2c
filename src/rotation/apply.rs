//! Turns an exposed strongly-connected, perfectly-matched subgraph of the
//! candidate digraph into a rotation and applies it to a matching.

use crate::agent::{L, R};
use crate::matching::Matching;

/// A rotation: an ordered sequence of `(man, his pre-rotation partner)`
/// pairs, possibly the concatenation of several disjoint cycles exposed in
/// the same pass — `cycle_starts` marks where each cycle begins.
#[derive(Clone, Debug)]
pub struct Rotation {
    pub pairs: Vec<(L, R)>,
    pub cycle_starts: Vec<usize>,
}

/// Extracts the rotation(s) encoded by `subgraph_edges` (a man-to-woman
/// candidate edge set, one outgoing edge per node, forming a union of
/// disjoint simple cycles) and returns the post-rotation matching.
///
/// `matching` is the matching the rotation is exposed against; it is read,
/// never mutated.
pub fn from_subgraph(subgraph_edges: &[(L, R)], matching: &Matching) -> (Rotation, Matching) {
    let r_partner = matching.inverse();

    let mut remaining: Vec<(L, R)> = subgraph_edges.to_vec();
    let mut new_matching = matching.clone();
    let mut pairs = Vec::new();
    let mut cycle_starts = Vec::new();

    while !remaining.is_empty() {
        let start_idx = remaining
            .iter()
            .enumerate()
            .min_by_key(|(_, &(l, _))| l)
            .map(|(i, _)| i)
            .unwrap();
        let (first_man, first_target) = remaining.remove(start_idx);
        cycle_starts.push(pairs.len());

        pairs.push((first_man, matching.get(first_man).expect("rotation man is matched")));
        new_matching.set(first_man, Some(first_target));

        let mut next_r = first_target;
        let mut current_man = *r_partner.get(&next_r).expect("rotation target is matched in M");

        while current_man != first_man {
            pairs.push((current_man, next_r));
            let idx = remaining
                .iter()
                .position(|&(l, _)| l == current_man)
                .expect("perfect matching guarantees an outgoing edge");
            let (_, target) = remaining.remove(idx);
            next_r = target;
            new_matching.set(current_man, Some(next_r));
            current_man = *r_partner.get(&next_r).expect("rotation target is matched in M");
        }
    }

    (Rotation { pairs, cycle_starts }, new_matching)
}

/// Applies a previously-found rotation to an arbitrary matching in which
/// it is exposed (used when reconstructing a matching from an antichain of
/// rotations — see [`crate::enumerate`]).
pub fn eliminate(matching: &Matching, rotation: &Rotation) -> Matching {
    let mut new_matching = matching.clone();
    let bounds: Vec<(usize, usize)> = {
        let mut starts = rotation.cycle_starts.clone();
        starts.push(rotation.pairs.len());
        starts.windows(2).map(|w| (w[0], w[1])).collect()
    };

    for (start, end) in bounds {
        let cycle = &rotation.pairs[start..end];
        for i in 0..cycle.len() {
            let (man, _) = cycle[i];
            let (_, next_partner) = cycle[(i + 1) % cycle.len()];
            debug_assert_eq!(matching.get(man), Some(cycle[i].1), "rotation not exposed in matching");
            new_matching.set(man, Some(next_partner));
        }
    }
    new_matching
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
    fn two_cycle_rotation() {
        let mut m = Matching::unmatched(2);
        m.set(l(0), Some(r(0)));
        m.set(l(1), Some(r(1)));
        // l0 -> r1, l1 -> r0: a single 2-cycle
        let (rotation, new_m) = from_subgraph(&[(l(0), r(1)), (l(1), r(0))], &m);
        assert_eq!(rotation.cycle_starts, vec![0]);
        assert_eq!(new_m.get(l(0)), Some(r(1)));
        assert_eq!(new_m.get(l(1)), Some(r(0)));

        let replayed = eliminate(&m, &rotation);
        assert_eq!(replayed.get(l(0)), new_m.get(l(0)));
        assert_eq!(replayed.get(l(1)), new_m.get(l(1)));
    }
}
