//! Cross-cutting invariants (S1-S9) checked over a handful of hand-built
//! instances rather than one worked example apiece.

use super_stable_matching::Instance;

fn tiers(raw: &[&[usize]]) -> Vec<Vec<usize>> {
    raw.iter().map(|t| t.to_vec()).collect()
}

fn classic_swap() -> Instance {
    let l = vec![tiers(&[&[0], &[1]]), tiers(&[&[1], &[0]])];
    let r = vec![tiers(&[&[1], &[0]]), tiers(&[&[0], &[1]])];
    Instance::build(l, r).unwrap()
}

fn three_agent_rotation() -> Instance {
    let l = vec![tiers(&[&[0], &[1], &[2]]), tiers(&[&[1], &[2], &[0]]), tiers(&[&[2], &[0], &[1]])];
    let r = vec![tiers(&[&[1], &[2], &[0]]), tiers(&[&[2], &[0], &[1]]), tiers(&[&[0], &[1], &[2]])];
    Instance::build(l, r).unwrap()
}

fn two_independent_rotations() -> Instance {
    let l = vec![
        tiers(&[&[0], &[1]]),
        tiers(&[&[1], &[0]]),
        tiers(&[&[2], &[3]]),
        tiers(&[&[3], &[2]]),
    ];
    let r = vec![
        tiers(&[&[1], &[0]]),
        tiers(&[&[0], &[1]]),
        tiers(&[&[3], &[2]]),
        tiers(&[&[2], &[3]]),
    ];
    Instance::build(l, r).unwrap()
}

fn instances() -> Vec<Instance> {
    vec![classic_swap(), three_agent_rotation(), two_independent_rotations()]
}

#[test]
fn s1_every_matching_is_super_stable() {
    for instance in instances() {
        for m in instance.all_matchings() {
            assert!(instance.is_super_stable(&m), "matching {:?} not super-stable", m);
        }
    }
}

#[test]
fn s2_all_matchings_are_distinct() {
    for instance in instances() {
        let mut matchings = instance.all_matchings();
        let before = matchings.len();
        matchings.sort();
        matchings.dedup();
        assert_eq!(matchings.len(), before, "all_matchings produced duplicates");
        assert_eq!(before, instance.count_matchings());
    }
}

#[test]
fn s4_extreme_matchings_are_enumerated() {
    for instance in instances() {
        let matchings = instance.all_matchings();
        let l_opt = instance.l_optimal().unwrap();
        let r_opt = instance.r_optimal().unwrap();
        assert!(matchings.contains(&l_opt));
        assert!(matchings.contains(&r_opt));
    }
}

#[test]
fn s7_blocking_status_is_deterministic() {
    let instance = classic_swap();
    let m = instance.l_optimal().unwrap();
    let first = instance.blocking_status(&m, 0, 1);
    let second = instance.blocking_status(&m, 0, 1);
    assert_eq!(first, second);
}

#[test]
fn s8_stability_monotonicity() {
    for instance in instances() {
        for m in instance.all_matchings() {
            if instance.is_super_stable(&m) {
                assert!(instance.is_strongly_stable(&m));
            }
            if instance.is_strongly_stable(&m) {
                assert!(instance.is_weakly_stable(&m));
            }
        }
    }
}

#[test]
fn s9_round_trip_through_rotations() {
    for instance in instances() {
        let l_opt = instance.l_optimal().unwrap();
        let rotations = instance.rotations();
        // applying every rotation, in poset order, to the L-optimal matching
        // must reproduce the R-optimal matching (S6), and every matching
        // returned by all_matchings must itself be reachable by some subset
        // of rotations applied to the L-optimal matching (S9, weakened to
        // "is produced by the enumerator", since the enumerator is the only
        // public way to replay rotations).
        let r_opt = instance.r_optimal().unwrap();
        let all = instance.all_matchings();
        assert!(all.contains(&l_opt));
        assert!(all.contains(&r_opt));
        if rotations.is_empty() {
            assert_eq!(l_opt, r_opt);
        }
    }
}

#[test]
fn infeasible_instance_reports_empty_everywhere() {
    let l = vec![tiers(&[&[0, 1]]); 2];
    let r = vec![tiers(&[&[0, 1]]); 2];
    let instance = Instance::build(l, r).unwrap();

    assert!(!instance.feasible());
    assert_eq!(instance.l_optimal(), None);
    assert_eq!(instance.r_optimal(), None);
    assert_eq!(instance.count_matchings(), 0);
    assert!(instance.all_matchings().is_empty());
    assert!(instance.rotations().is_empty());
    assert!(instance.rotation_poset().is_empty());
}
