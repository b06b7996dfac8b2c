//! A small directed adjacency-list graph with an iterative (non-recursive)
//! Tarjan SCC pass, generic over the node type so it can back both the
//! edge-elimination digraph (`Gd`, nodes are [`crate::edge::EdgeId`]) and
//! the rotation poset (nodes are rotation indices).

use hashbrown::{HashMap, HashSet};
use std::hash::Hash;

pub struct AdjGraph<N> {
    succ: HashMap<N, HashSet<N>>,
}

struct NodeState {
    index: usize,
    lowlink: usize,
    on_stack: bool,
}

impl<N: Copy + Eq + Hash> AdjGraph<N> {
    pub fn new() -> Self {
        AdjGraph { succ: HashMap::new() }
    }

    pub fn add_node(&mut self, n: N) {
        self.succ.entry(n).or_default();
    }

    pub fn add_edge(&mut self, from: N, to: N) {
        self.succ.entry(from).or_default().insert(to);
        self.succ.entry(to).or_default();
    }

    pub fn remove_edge(&mut self, from: N, to: N) {
        if let Some(s) = self.succ.get_mut(&from) {
            s.remove(&to);
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.succ.keys().copied()
    }

    pub fn successors(&self, n: N) -> impl Iterator<Item = N> + '_ {
        self.succ.get(&n).into_iter().flatten().copied()
    }

    pub fn num_nodes(&self) -> usize {
        self.succ.len()
    }

    /// Strongly connected components, each as a `Vec<N>`. Tarjan's algorithm
    /// emits components in reverse topological order, so a component with
    /// no outgoing edges to any other component (a sink of the
    /// condensation) always appears before the components it would point
    /// into, which is exactly the order the rotation finder scans in.
    ///
    /// Implemented with an explicit work stack rather than recursion: the
    /// digraphs built here have one node per GS-list edge, which can be far
    /// deeper than the default call stack tolerates.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn tarjan_scc(&self) -> Vec<Vec<N>> {
        let nodes: Vec<N> = self.nodes().collect();
        let succ_lists: HashMap<N, Vec<N>> = nodes.iter().map(|&n| (n, self.successors(n).collect())).collect();

        let mut state: HashMap<N, NodeState> = HashMap::new();
        let mut stack: Vec<N> = Vec::new();
        let mut next_index = 0usize;
        let mut components: Vec<Vec<N>> = Vec::new();

        for &start in &nodes {
            if state.contains_key(&start) {
                continue;
            }
            state.insert(
                start,
                NodeState {
                    index: next_index,
                    lowlink: next_index,
                    on_stack: true,
                },
            );
            next_index += 1;
            stack.push(start);
            // work frame: (node, index of the next successor to visit)
            let mut work: Vec<(N, usize)> = vec![(start, 0)];

            while let Some(&(v, idx)) = work.last() {
                let succs = &succ_lists[&v];
                if idx < succs.len() {
                    work.last_mut().unwrap().1 += 1;
                    let w = succs[idx];
                    if !state.contains_key(&w) {
                        state.insert(
                            w,
                            NodeState {
                                index: next_index,
                                lowlink: next_index,
                                on_stack: true,
                            },
                        );
                        next_index += 1;
                        stack.push(w);
                        work.push((w, 0));
                    } else if state[&w].on_stack {
                        let w_index = state[&w].index;
                        let v_low = state[&v].lowlink;
                        state.get_mut(&v).unwrap().lowlink = v_low.min(w_index);
                    }
                } else {
                    work.pop();
                    if state[&v].lowlink == state[&v].index {
                        let mut comp = Vec::new();
                        loop {
                            let w = stack.pop().unwrap();
                            state.get_mut(&w).unwrap().on_stack = false;
                            comp.push(w);
                            if w == v {
                                break;
                            }
                        }
                        components.push(comp);
                    }
                    if let Some(&(parent, _)) = work.last() {
                        let v_low = state[&v].lowlink;
                        let p_low = state[&parent].lowlink;
                        state.get_mut(&parent).unwrap().lowlink = p_low.min(v_low);
                    }
                }
            }
        }

        components
    }

    /// Maps each node to the index of its component in `components`.
    pub fn component_index(components: &[Vec<N>]) -> HashMap<N, usize> {
        let mut map = HashMap::new();
        for (i, comp) in components.iter().enumerate() {
            for &n in comp {
                map.insert(n, i);
            }
        }
        map
    }

    /// Indices of components with no outgoing edge into a *different*
    /// component — the sinks of the condensation.
    pub fn sink_components(&self, components: &[Vec<N>]) -> Vec<usize> {
        let comp_of = Self::component_index(components);
        (0..components.len())
            .filter(|&i| {
                components[i].iter().all(|&n| self.successors(n).all(|w| comp_of[&w] == i))
            })
            .collect()
    }
}

impl<N: Copy + Eq + Hash> Default for AdjGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cycle_is_one_component() {
        let mut g: AdjGraph<u32> = AdjGraph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        let comps = g.tarjan_scc();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].len(), 3);
    }

    #[test]
    fn dag_has_one_component_per_node_with_sink_first() {
        let mut g: AdjGraph<u32> = AdjGraph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let comps = g.tarjan_scc();
        assert_eq!(comps.len(), 3);
        // node 2 has no successors, so its singleton component is a sink
        // and (by Tarjan's emission order) comes out first.
        assert_eq!(comps[0], vec![2]);
        let sinks = g.sink_components(&comps);
        assert_eq!(sinks, vec![0]);
    }
}
