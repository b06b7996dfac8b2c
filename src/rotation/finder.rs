//! Finds every rotation between the `L`-optimal and `R`-optimal
//! super-stable matchings (Gusfield & Irving's rotation-finding procedure).
//!
//! Maintains two digraphs over GS-list edges as the search progresses:
//! `Gd`, whose sink strongly-connected-components identify men who can
//! never again improve, and `Gc`, the growing set of candidate edges a
//! rotation might be built from. Each time `Gc` restricted to a sink
//! component of `Gd` turns out to be a perfect matching, that component
//! exposes a rotation, which is applied and the search continues from the
//! resulting matching.

use crate::agent::{Node, L, R};
use crate::edge::EdgeTable;
use crate::matching::Matching;
use crate::pref::PrefList;
use crate::rotation::apply::{self, Rotation};
use crate::rotation::graph::AdjGraph;

fn remove_dominated_nonblocking_edges(m: &Matching, l_prefs: &[PrefList<R>], r_prefs: &[PrefList<L>], e_prime: &mut Vec<(L, R)>) {
    for (man, partner) in m.iter() {
        let Some(partner) = partner else { continue };
        let current_rank = l_prefs[usize::from(man)].rank(partner);
        if let Some(current_rank) = current_rank {
            e_prime.retain(|&(l, r)| {
                if l != man {
                    return true;
                }
                match l_prefs[usize::from(man)].rank(r) {
                    Some(rank) => rank > current_rank,
                    None => true,
                }
            });
        }

        let woman = partner;
        let current_rank = r_prefs[usize::from(woman)].rank(man);
        if let Some(current_rank) = current_rank {
            e_prime.retain(|&(l, r)| {
                if r != woman {
                    return true;
                }
                match r_prefs[usize::from(woman)].rank(l) {
                    Some(rank) => rank <= current_rank,
                    None => true,
                }
            });
        }
    }
}

/// Drops the lowest-ranked remaining edges of any woman who, between `E'`
/// and `Ec`, has more than one edge tied for her best remaining rank — but
/// only once every currently-stalled man (sink-component-of-`Gd`) has been
/// considered, mirroring the reference algorithm's batching.
fn delete_multiple_engagement_edges(
    l_prefs: &[PrefList<R>],
    num_r: usize,
    e_prime: &mut Vec<(L, R)>,
    ec: &mut Vec<(L, R)>,
    gc: &mut AdjGraph<Node>,
    gd: &AdjGraph<Node>,
    edge_table: &EdgeTable,
) {
    let rank_of = |l: L, r: R| edge_table.get(edge_table.id_of(l, r).expect("E' / Ec edge is in the GS-list"));

    let mut lowest_for_woman: Vec<Option<(usize, u32)>> = vec![None; num_r];
    for &(l, r) in e_prime.iter().chain(ec.iter()) {
        let r_rank = rank_of(l, r).r_rank;
        let idx = usize::from(r);
        lowest_for_woman[idx] = match lowest_for_woman[idx] {
            None => Some((r_rank, 1)),
            Some((best, count)) if best > r_rank => Some((r_rank, 1)),
            Some((best, count)) if best == r_rank => Some((best, count + 1)),
            existing => existing,
        };
    }

    let multiply_engaged: Vec<R> = (0..num_r)
        .map(R::from)
        .filter(|&r| matches!(lowest_for_woman[usize::from(r)], Some((_, c)) if c > 1))
        .collect();

    if multiply_engaged.len() <= 1 {
        return;
    }

    let components = gd.tarjan_scc();
    let comp_of = AdjGraph::component_index(&components);
    let sinks = gd.sink_components(&components);
    let outdeg_zero_men: Vec<L> = (0..l_prefs.len())
        .map(L::from)
        .filter(|&l| sinks.contains(&comp_of[&Node::from(l)]))
        .collect();

    let mut lowest_for_man: Vec<Option<(usize, Vec<(L, R)>)>> = vec![None; l_prefs.len()];
    for &(l, r) in e_prime.iter().chain(ec.iter()) {
        if !outdeg_zero_men.contains(&l) {
            continue;
        }
        let l_rank = rank_of(l, r).l_rank;
        let idx = usize::from(l);
        let next = match &lowest_for_man[idx] {
            None => Some((l_rank, vec![(l, r)])),
            Some((best, _)) if *best > l_rank => Some((l_rank, vec![(l, r)])),
            Some((best, edges)) if *best == l_rank => {
                let mut edges = edges.clone();
                edges.push((l, r));
                Some((l_rank, edges))
            }
            _ => None,
        };
        if let Some(next) = next {
            lowest_for_man[idx] = Some(next);
        }
    }

    let mut to_remove = Vec::new();
    for slot in lowest_for_man.into_iter().flatten() {
        for (l, r) in slot.1 {
            if multiply_engaged.contains(&r) {
                to_remove.push((l, r));
            }
        }
    }

    for edge in to_remove {
        if let Some(pos) = ec.iter().position(|&e| e == edge) {
            ec.remove(pos);
            gc.remove_edge(Node::from(edge.0), Node::from(edge.1));
        } else {
            e_prime.retain(|&e| e != edge);
        }
    }
}

/// Runs the rotation-finding search from the `L`-optimal matching to the
/// `R`-optimal matching, returning every rotation exposed along the way.
#[tracing::instrument(level = "debug", skip_all)]
pub fn find_all(
    l_prefs: &[PrefList<R>],
    r_prefs: &[PrefList<L>],
    edge_table: &EdgeTable,
    l_optimal: &Matching,
    r_optimal: &Matching,
) -> Vec<Rotation> {
    let num_l = l_prefs.len();
    let num_r = r_prefs.len();

    let mut m = l_optimal.clone();
    let mz = r_optimal;
    let mut rotations = Vec::new();

    let matched_pairs: Vec<(L, R)> = m.iter().filter_map(|(l, r)| r.map(|r| (l, r))).collect();

    let mut gd: AdjGraph<Node> = AdjGraph::new();
    for &(l, r) in &matched_pairs {
        gd.add_node(Node::from(l));
        gd.add_node(Node::from(r));
        gd.add_edge(Node::from(r), Node::from(l));
    }

    let mut ed: Vec<(L, R)> = matched_pairs.clone();

    let mut e_prime: Vec<(L, R)> = edge_table.iter().map(|(_, e)| (e.l, e.r)).filter(|pair| !ed.contains(pair)).collect();

    let m_prime: Vec<(L, R)> = matched_pairs.iter().copied().filter(|&(l, r)| mz.get(l) == Some(r)).collect();

    let mut gc: AdjGraph<Node> = AdjGraph::new();
    for &(l, r) in &m_prime {
        gc.add_node(Node::from(l));
        gc.add_node(Node::from(r));
        gc.add_edge(Node::from(l), Node::from(r));
    }
    let mut ec: Vec<(L, R)> = m_prime;

    let all_men: Vec<L> = (0..num_l).map(L::from).filter(|&l| l_optimal.get(l).is_some()).collect();

    let mut guard = 0u64;
    while m != *mz {
        guard += 1;
        if guard > 1_000_000 {
            tracing::warn!("rotation search exceeded its iteration guard; aborting to avoid an infinite loop");
            break;
        }

        remove_dominated_nonblocking_edges(&m, l_prefs, r_prefs, &mut e_prime);

        loop {
            let zero_deg_men: Vec<L> = all_men.iter().copied().filter(|&l| gc.successors(Node::from(l)).count() == 0).collect();
            if zero_deg_men.is_empty() {
                break;
            }

            let components = gd.tarjan_scc();
            let comp_of = AdjGraph::component_index(&components);
            let sinks = gd.sink_components(&components);

            let chosen = zero_deg_men.iter().copied().find(|&man| sinks.contains(&comp_of[&Node::from(man)]));
            let Some(man) = chosen else { break };

            let man_edges: Vec<(L, R)> = e_prime.iter().copied().filter(|&(l, _)| l == man).collect();
            if man_edges.is_empty() {
                break;
            }
            let lowest_rank = man_edges
                .iter()
                .map(|&(l, r)| edge_table.get(edge_table.id_of(l, r).expect("e_prime edge is in the GS-list")).l_rank)
                .min()
                .unwrap();
            let best_edges: Vec<(L, R)> = man_edges
                .into_iter()
                .filter(|&(l, r)| edge_table.get(edge_table.id_of(l, r).unwrap()).l_rank == lowest_rank)
                .collect();

            for &(l, r) in &best_edges {
                ed.push((l, r));
                gd.add_edge(Node::from(l), Node::from(r));
            }

            let components2 = gd.tarjan_scc();
            let comp_of2 = AdjGraph::component_index(&components2);
            let sinks2 = gd.sink_components(&components2);

            if sinks2.contains(&comp_of2[&Node::from(man)]) {
                for &(l, r) in &best_edges {
                    let edge = edge_table.get(edge_table.id_of(l, r).unwrap());
                    let w_partner_man = m.iter().find(|&(_, partner)| partner == Some(r)).map(|(l, _)| l);
                    let m_partner_r = m.get(l);

                    if let (Some(w_partner_man), Some(m_partner_r)) = (w_partner_man, m_partner_r) {
                        let w_partner_edge = edge_table.get(edge_table.id_of(w_partner_man, r).unwrap());
                        let m_partner_edge = edge_table.get(edge_table.id_of(l, m_partner_r).unwrap());

                        if edge.r_rank < w_partner_edge.r_rank && edge.l_rank > m_partner_edge.l_rank {
                            let current_in_edges: Vec<(L, R)> = ec.iter().copied().filter(|&(_, rr)| rr == r).collect();
                            let qualifies = current_in_edges.is_empty() || {
                                let existing = edge_table.get(edge_table.id_of(current_in_edges[0].0, r).unwrap());
                                existing.r_rank > edge.r_rank
                            };
                            if qualifies {
                                ec.push((l, r));
                                gc.add_edge(Node::from(l), Node::from(r));

                                let to_remove: Vec<(L, R)> = ec
                                    .iter()
                                    .copied()
                                    .filter(|&(ll, rr)| rr == r && (ll, rr) != (l, r) && edge_table.get(edge_table.id_of(ll, rr).unwrap()).r_rank > edge.r_rank)
                                    .collect();
                                for goner in to_remove {
                                    ec.retain(|&x| x != goner);
                                    gc.remove_edge(Node::from(goner.0), Node::from(goner.1));
                                }
                            }
                        }
                    }
                    e_prime.retain(|&x| x != (l, r));
                }
            }
        }

        delete_multiple_engagement_edges(l_prefs, num_r, &mut e_prime, &mut ec, &mut gc, &gd, edge_table);

        loop {
            let components = gd.tarjan_scc();
            let sinks = gd.sink_components(&components);
            let valid_components: Vec<&Vec<Node>> = sinks.iter().map(|&i| &components[i]).collect();

            let mut exposed: Option<Vec<(L, R)>> = None;
            for comp in &valid_components {
                let ls: Vec<L> = comp.iter().filter_map(|n| if let Node::L(l) = n { Some(*l) } else { None }).collect();
                let rs: std::collections::HashSet<R> = comp
                    .iter()
                    .filter_map(|n| if let Node::R(r) = n { Some(*r) } else { None })
                    .collect();
                if ls.is_empty() || ls.len() != rs.len() {
                    continue;
                }
                let sub_edges: Vec<(L, R)> = ec.iter().copied().filter(|&(l, r)| ls.contains(&l) && rs.contains(&r)).collect();
                // a perfect matching on this component: exactly one edge per node, covering all of it
                if sub_edges.len() == ls.len() {
                    let mut seen_l = std::collections::HashSet::new();
                    let mut seen_r = std::collections::HashSet::new();
                    if sub_edges.iter().all(|&(l, r)| seen_l.insert(l) && seen_r.insert(r)) {
                        exposed = Some(sub_edges);
                        break;
                    }
                }
            }

            let Some(sub_edges) = exposed else { break };

            let (rotation, new_m) = apply::from_subgraph(&sub_edges, &m);
            tracing::debug!(num_pairs = rotation.pairs.len(), "exposed rotation");
            m = new_m;

            // Gc: drop edges internal to the rotation whose endpoints have
            // since diverged from both M and the edge itself.
            let rotation_ls: std::collections::HashSet<L> = sub_edges.iter().map(|&(l, _)| l).collect();
            let rotation_rs: std::collections::HashSet<R> = sub_edges.iter().map(|&(_, r)| r).collect();
            let to_remove: Vec<(L, R)> = ec
                .iter()
                .copied()
                .filter(|&(l, r)| {
                    if !(rotation_ls.contains(&l) && rotation_rs.contains(&r)) {
                        return false;
                    }
                    m.get(l) != mz.get(l) || m.get(l) != Some(r)
                })
                .collect();
            for goner in to_remove {
                ec.retain(|&x| x != goner);
                gc.remove_edge(Node::from(goner.0), Node::from(goner.1));
            }

            // Gd: flip each now-matched edge to R->L, drop each now-broken one.
            let mut ed_next = Vec::with_capacity(ed.len());
            let mut gd_next: AdjGraph<Node> = AdjGraph::new();
            for n in gd.nodes() {
                gd_next.add_node(n);
            }
            for &(l, r) in &ed {
                if m.get(l) == Some(r) {
                    gd_next.add_edge(Node::from(r), Node::from(l));
                    ed_next.push((l, r));
                }
                // edges where l's partner changed away from r are simply dropped
            }
            gd = gd_next;
            ed = ed_next;

            rotations.push(rotation);
        }
    }

    rotations
}
