//! A flat table over the acceptable `(L, R)` pairs that survive GS
//! reduction — the edge set the rotation-finding graphs are built over.

use crate::agent::{L, R};
use crate::pref::PrefList;
use hashbrown::HashMap;

/// Declares a `NonZeroU32`-backed dense index type. `EdgeId` is the only
/// user; the niche-optimized representation keeps `Option<EdgeId>` the same
/// size as `EdgeId` itself.
macro_rules! edge_id_type {
    ($type_name:ident) => {
        #[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        pub struct $type_name(std::num::NonZeroU32);

        impl $type_name {
            pub const fn to_u32(self) -> u32 {
                self.0.get() - 1
            }
            pub const fn from_u32(u: u32) -> Self {
                unsafe { $type_name(std::num::NonZeroU32::new_unchecked(u + 1)) }
            }
        }
        impl From<usize> for $type_name {
            fn from(u: usize) -> Self {
                Self::from_u32(u as u32)
            }
        }
        impl From<$type_name> for usize {
            fn from(v: $type_name) -> Self {
                (v.0.get() - 1) as usize
            }
        }
    };
}

edge_id_type!(EdgeId);

impl std::fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EdgeId({})", self.to_u32())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub l: L,
    pub r: R,
    /// `l`'s GS-list tier rank of `r`.
    pub l_rank: usize,
    /// `r`'s GS-list tier rank of `l`.
    pub r_rank: usize,
}

/// All edges of the symmetric GS-list, with an id assigned to each and a
/// reverse lookup from endpoints back to the id.
pub struct EdgeTable {
    edges: Vec<Edge>,
    index: HashMap<(L, R), EdgeId>,
}

impl EdgeTable {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(l_gslist: &[PrefList<R>], r_gslist: &[PrefList<L>]) -> Self {
        let mut edges = Vec::new();
        let mut index = HashMap::new();
        for (l_idx, list) in l_gslist.iter().enumerate() {
            let l = L::from(l_idx);
            for r in list.iter_all() {
                let l_rank = list.rank(r).expect("r is in l's list");
                let r_rank = r_gslist[usize::from(r)].rank(l).expect("GS-lists are symmetric");
                let id = EdgeId::from(edges.len());
                index.insert((l, r), id);
                edges.push(Edge { l, r, l_rank, r_rank });
            }
        }
        tracing::debug!(num_edges = edges.len(), "built edge table");
        EdgeTable { edges, index }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, id: EdgeId) -> Edge {
        self.edges[usize::from(id)]
    }

    pub fn id_of(&self, l: L, r: R) -> Option<EdgeId> {
        self.index.get(&(l, r)).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, Edge)> + '_ {
        self.edges.iter().enumerate().map(|(i, &e)| (EdgeId::from(i), e))
    }
}
