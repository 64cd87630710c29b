//! End-to-end tests for whole-chain consistency validation.

mod common;

use depchain::{Chain, DecayMode, Error, FissionYields, Nuclide, Target};

use common::simple_chain;

const TOL: f64 = 1e-4;

#[test]
fn test_validate_flags_bad_fission_yields() {
    // The fixture's yields sum to ~0.03, far from the expected 2.0.
    let chain = simple_chain();

    let err = chain.validate(true, false, TOL).unwrap_err();
    match err {
        Error::InvalidNuclide { name, kind, expected, .. } => {
            assert_eq!(name, "C");
            assert!(kind.contains("fission yield"));
            assert_eq!(expected, 2.0);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!chain.validate(false, false, TOL).unwrap());
    assert!(!chain.validate(false, true, TOL).unwrap());
}

#[test]
fn test_validate_passes_after_fixing_yields() {
    let mut chain = simple_chain();
    chain.get_mut("C").unwrap().yields = Some(FissionYields {
        energies: vec![0.0253],
        data: vec![vec![("A".into(), 1.5), ("B".into(), 0.5)]],
    });

    assert!(chain.validate(true, false, TOL).unwrap());
    assert!(chain.validate(false, true, TOL).unwrap());
}

#[test]
fn test_validate_flags_bad_decay_sum() {
    let mut d = Nuclide::new("D");
    d.half_life = Some(100.0);
    for (target, br) in [("E", 0.5), ("F", 0.6)] {
        d.decay_modes.push(DecayMode {
            kind: "beta-".into(),
            target: Target::Nuclide(target.into()),
            branching_ratio: br,
        });
    }
    let chain = Chain::from_nuclides(vec![d, Nuclide::new("E"), Nuclide::new("F")]);

    let err = chain.validate(true, false, TOL).unwrap_err();
    match err {
        Error::InvalidNuclide { name, kind, actual, .. } => {
            assert_eq!(name, "D");
            assert!(kind.contains("decay mode"));
            assert!((actual - 1.1).abs() < 1e-12);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!chain.validate(false, false, TOL).unwrap());

    // A wide tolerance accepts the same chain.
    assert!(chain.validate(true, false, 0.2).unwrap());
}

#[test]
fn test_validate_flags_bad_reaction_sum() {
    let mut chain = simple_chain();
    chain.get_mut("C").unwrap().yields = Some(FissionYields {
        energies: vec![0.0253],
        data: vec![vec![("A".into(), 1.5), ("B".into(), 0.5)]],
    });
    // Knock one capture branch out of balance.
    chain.get_mut("C").unwrap().reactions[1].branching_ratio = 0.6;

    let err = chain.validate(true, false, TOL).unwrap_err();
    match err {
        Error::InvalidNuclide { name, kind, .. } => {
            assert_eq!(name, "C");
            assert!(kind.contains("(n,gamma)"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_validate_aggregates_across_nuclides() {
    // Two independent violations; the loud non-strict pass reports both
    // and returns the aggregate.
    let mut chain = simple_chain();
    chain.get_mut("A").unwrap().decay_modes[0].branching_ratio = 0.9;

    assert!(!chain.validate(false, false, TOL).unwrap());
    assert!(!chain.validate(false, true, TOL).unwrap());
}

#[test]
fn test_validate_rejects_negative_tolerance() {
    let chain = simple_chain();
    let err = chain.validate(false, false, -1.0).unwrap_err();
    assert!(matches!(err, Error::InvalidTolerance(t) if t == -1.0));
}

#[test]
fn test_validate_empty_chain() {
    let chain = Chain::new();
    assert!(chain.validate(true, false, 0.0).unwrap());
}
