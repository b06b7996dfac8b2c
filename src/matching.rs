//! A partial bijection between `L` and `R` agents.

use crate::agent::{L, R};

/// An `L`-indexed partial bijection. `⊥` (unmatched) is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matching {
    partner: Vec<Option<R>>,
}

impl Matching {
    pub fn unmatched(num_l: usize) -> Self {
        Matching {
            partner: vec![None; num_l],
        }
    }

    pub fn num_l(&self) -> usize {
        self.partner.len()
    }

    pub fn get(&self, l: L) -> Option<R> {
        self.partner[usize::from(l)]
    }

    pub fn set(&mut self, l: L, r: Option<R>) {
        self.partner[usize::from(l)] = r;
    }

    pub fn iter(&self) -> impl Iterator<Item = (L, Option<R>)> + '_ {
        self.partner.iter().enumerate().map(|(i, r)| (L::from(i), *r))
    }

    /// The `R -> L` inverse. `R` ids not present as a `None` gap are simply
    /// absent from the result (an `R`-indexed array would need to know
    /// `num_r`, which this type doesn't track — callers that need a dense
    /// inverse build one from this with a known size, e.g.
    /// [`crate::stability::r_partner_table`]).
    pub fn inverse(&self) -> hashbrown::HashMap<R, L> {
        self.iter().filter_map(|(l, r)| r.map(|r| (r, l))).collect()
    }

    /// Converts to the public, index-based representation (`-1` = unmatched).
    pub fn into_raw(self) -> Vec<Option<usize>> {
        self.partner.into_iter().map(|r| r.map(usize::from)).collect()
    }

    pub fn from_raw(raw: Vec<Option<usize>>) -> Self {
        Matching {
            partner: raw.into_iter().map(|r| r.map(R::from)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_inverse() {
        let mut m = Matching::unmatched(3);
        m.set(L::new(0), Some(R::new(2)));
        m.set(L::new(1), Some(R::new(0)));
        assert_eq!(m.get(L::new(0)), Some(R::new(2)));
        assert_eq!(m.get(L::new(2)), None);

        let inv = m.inverse();
        assert_eq!(inv.get(&R::new(2)), Some(&L::new(0)));
        assert_eq!(inv.get(&R::new(0)), Some(&L::new(1)));
        assert_eq!(inv.get(&R::new(1)), None);
    }
}
