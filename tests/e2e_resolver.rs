//! End-to-end tests for missing-nuclide substitution.

use depchain::{replace_missing, DecayLibrary, DecayRecord, Error};
use proptest::prelude::*;

fn record(name: &str, stable: bool, half_life: f64) -> DecayRecord {
    DecayRecord {
        name: name.to_string(),
        stable,
        half_life,
        decay_energy: 0.0,
        modes: Vec::new(),
    }
}

fn library(records: Vec<DecayRecord>) -> DecayLibrary {
    DecayLibrary::from_records(records).unwrap()
}

/// A mid-mass band with stable floors (Sn) and ceilings (Ba) so every
/// beta walk inside the band terminates.
fn reference_library() -> DecayLibrary {
    let mut records = vec![
        record("H1", true, 0.0),
        record("I127", true, 0.0),
        record("I129", false, 4.9e14),
        record("Xe133", false, 4.5e5),
        record("Cs133", true, 0.0),
        record("Cs137", false, 9.4e8),
        record("Cf251", false, 2.8e10),
    ];
    for a in 128..=140 {
        records.push(record(&format!("Sn{a}"), true, 0.0));
        records.push(record(&format!("Ba{a}"), true, 0.0));
    }
    library(records)
}

#[test]
fn test_neutron_becomes_proton() {
    let lib = reference_library();
    assert_eq!(replace_missing("n1", &lib).unwrap(), "H1");
}

#[test]
fn test_metastable_prefers_ground_state() {
    let lib = reference_library();
    assert_eq!(replace_missing("Xe133_m1", &lib).unwrap(), "Xe133");
    assert_eq!(replace_missing("I129_m2", &lib).unwrap(), "I129");
}

#[test]
fn test_beta_minus_walk_above_longest_lived() {
    // I's longest-lived isotope is lighter than A=135, so the walk climbs
    // in Z at fixed A until it finds data.
    let lib = reference_library();
    assert_eq!(replace_missing("I135", &lib).unwrap(), "Ba135");
}

#[test]
fn test_beta_plus_walk_below_longest_lived() {
    // Xe's longest-lived isotope is heavier than A=130: descend in Z.
    let lib = reference_library();
    assert_eq!(replace_missing("Xe130", &lib).unwrap(), "Sn130");
}

#[test]
fn test_stable_isotope_outranks_longer_half_life() {
    // I127 is stable; the enormous half-life of I129 must not override
    // it. With 127 as the reference mass, I128 walks upward.
    let lib = reference_library();
    assert_eq!(replace_missing("I128", &lib).unwrap(), "Ba128");
}

#[test]
fn test_half_life_scan_without_stable_isotope() {
    let lib = library(vec![
        record("Xe131", false, 1.0e5),
        record("Xe133", false, 4.5e5),
        record("Sn130", true, 0.0),
        record("Ba135", true, 0.0),
    ]);
    // Longest-lived Xe is A=133: below it descend, above it climb.
    assert_eq!(replace_missing("Xe130", &lib).unwrap(), "Sn130");
    assert_eq!(replace_missing("Xe135", &lib).unwrap(), "Ba135");
}

#[test]
fn test_alpha_stepping_for_heavy_nuclides() {
    let lib = reference_library();
    assert_eq!(replace_missing("Fm255", &lib).unwrap(), "Cf251");
    // Two alpha steps from No259.
    assert_eq!(replace_missing("No259", &lib).unwrap(), "Cf251");
}

#[test]
fn test_no_substitute_is_an_error() {
    let lib = library(vec![record("H1", true, 0.0)]);
    let err = replace_missing("U235", &lib).unwrap_err();
    assert!(matches!(err, Error::NoSubstitute(name) if name == "U235"));
}

#[test]
fn test_malformed_name_is_an_error() {
    let lib = reference_library();
    assert!(matches!(
        replace_missing("bogus", &lib),
        Err(Error::BadNuclideName(_))
    ));
}

proptest! {
    /// The substitute is always a library member and the walk is a pure
    /// function of (name, library).
    #[test]
    fn prop_substitute_is_deterministic_and_present(
        element in prop::sample::select(vec!["I", "Xe", "Cs", "Ba"]),
        a in 128u32..=140,
        state in 0u32..=1,
    ) {
        let lib = reference_library();
        let name = if state == 0 {
            format!("{element}{a}")
        } else {
            format!("{element}{a}_m{state}")
        };

        let first = replace_missing(&name, &lib).unwrap();
        let second = replace_missing(&name, &lib).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(lib.contains(&first));
    }

    /// A metastable product whose ground state has data always resolves
    /// to that ground state.
    #[test]
    fn prop_metastable_resolves_to_present_ground(
        element in prop::sample::select(vec!["I", "Xe", "Cs", "Ba"]),
        a in 128u32..=140,
    ) {
        let lib = reference_library();
        let ground = format!("{element}{a}");
        prop_assume!(lib.contains(&ground));

        let resolved = replace_missing(&format!("{ground}_m1"), &lib).unwrap();
        prop_assert_eq!(resolved, ground);
    }
}
