//! Nuclide in the depletion chain.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a transition deposits its product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A nuclide in (or referenced by) the chain, by GND name.
    Nuclide(String),
    /// Total loss: the product leaves the tracked inventory.
    Nothing,
    /// Fission: products come from the parent's yield tables, not a
    /// single daughter.
    Fission,
}

impl Target {
    /// The target's nuclide name, if it names one.
    pub fn nuclide(&self) -> Option<&str> {
        match self {
            Target::Nuclide(name) => Some(name),
            _ => None,
        }
    }

    /// Does this target name the given nuclide?
    pub fn is(&self, name: &str) -> bool {
        self.nuclide() == Some(name)
    }
}

/// A radioactive decay transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayMode {
    /// Comma-joined elementary decay types, e.g. `"beta-"` or `"beta-,alpha"`.
    pub kind: String,
    pub target: Target,
    /// Probability of this path, in (0, 1]. Per parent, decay-mode ratios
    /// sum to exactly 1.0 (the builder back-computes the last entry).
    pub branching_ratio: f64,
}

/// A neutron-induced transmutation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionPath {
    /// Reaction-type label, e.g. `"(n,gamma)"` or `"fission"`.
    pub kind: String,
    pub target: Target,
    /// Reaction Q-value [eV].
    pub q_value: f64,
    pub branching_ratio: f64,
}

/// Independent fission-product yields, tabulated per incident energy.
///
/// `data[i]` is the product list for `energies[i]`, ordered canonically
/// by `(Z, A, state)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FissionYields {
    /// Incident-neutron energies [eV].
    pub energies: Vec<f64>,
    /// Per-energy `(product, yield fraction)` lists.
    pub data: Vec<Vec<(String, f64)>>,
}

impl FissionYields {
    /// The yield table at the lowest tabulated incident energy.
    pub fn lowest_energy(&self) -> Option<&[(String, f64)]> {
        let mut best: Option<(f64, usize)> = None;
        for (i, &e) in self.energies.iter().enumerate() {
            match best {
                Some((lo, _)) if e >= lo => {}
                _ => best = Some((e, i)),
            }
        }
        best.and_then(|(_, i)| self.data.get(i)).map(Vec::as_slice)
    }
}

/// A nuclide: one node of the depletion chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nuclide {
    /// GND-format name, e.g. `Am241` or `Am242_m1`.
    pub name: String,
    /// Half-life [s]. `None` for stable or no-data nuclides.
    pub half_life: Option<f64>,
    /// Total average decay energy [eV].
    pub decay_energy: f64,
    pub decay_modes: SmallVec<[DecayMode; 4]>,
    pub reactions: SmallVec<[ReactionPath; 8]>,
    pub yields: Option<FissionYields>,
}

impl Nuclide {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            half_life: None,
            decay_energy: 0.0,
            decay_modes: SmallVec::new(),
            reactions: SmallVec::new(),
            yields: None,
        }
    }

    /// Decay constant `ln 2 / t½` [1/s], or `None` for stable nuclides.
    pub fn decay_constant(&self) -> Option<f64> {
        self.half_life
            .filter(|t| *t > 0.0)
            .map(|t| std::f64::consts::LN_2 / t)
    }
}
