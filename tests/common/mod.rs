//! Shared fixtures for the integration tests.

use depchain::{Chain, DecayMode, FissionYields, Nuclide, ReactionPath, Target};

/// A three-nuclide chain exercising every transition kind:
///
/// - `A` (t½ 23652 s) decays to `B` (0.6) and `C` (0.4), captures to `C`
/// - `B` (t½ 32904 s) decays to `A`, captures to `C`
/// - `C` is stable, fissions (yields for `A` and `B` at 0.0253 eV), and
///   captures to `A` (0.7) / `B` (0.3)
pub fn simple_chain() -> Chain {
    let mut a = Nuclide::new("A");
    a.half_life = Some(23_652.0);
    a.decay_modes.push(DecayMode {
        kind: "beta1".into(),
        target: Target::Nuclide("B".into()),
        branching_ratio: 0.6,
    });
    a.decay_modes.push(DecayMode {
        kind: "beta2".into(),
        target: Target::Nuclide("C".into()),
        branching_ratio: 0.4,
    });
    a.reactions.push(ReactionPath {
        kind: "(n,gamma)".into(),
        target: Target::Nuclide("C".into()),
        q_value: 0.0,
        branching_ratio: 1.0,
    });

    let mut b = Nuclide::new("B");
    b.half_life = Some(32_904.0);
    b.decay_modes.push(DecayMode {
        kind: "beta".into(),
        target: Target::Nuclide("A".into()),
        branching_ratio: 1.0,
    });
    b.reactions.push(ReactionPath {
        kind: "(n,gamma)".into(),
        target: Target::Nuclide("C".into()),
        q_value: 0.0,
        branching_ratio: 1.0,
    });

    let mut c = Nuclide::new("C");
    c.reactions.push(ReactionPath {
        kind: "fission".into(),
        target: Target::Fission,
        q_value: 2.0e8,
        branching_ratio: 1.0,
    });
    c.reactions.push(ReactionPath {
        kind: "(n,gamma)".into(),
        target: Target::Nuclide("A".into()),
        q_value: 0.0,
        branching_ratio: 0.7,
    });
    c.reactions.push(ReactionPath {
        kind: "(n,gamma)".into(),
        target: Target::Nuclide("B".into()),
        q_value: 0.0,
        branching_ratio: 0.3,
    });
    c.yields = Some(FissionYields {
        energies: vec![0.0253],
        data: vec![vec![("A".into(), 0.029_273_7), ("B".into(), 0.002_566_345)]],
    });

    Chain::from_nuclides(vec![a, b, c])
}
