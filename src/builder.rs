//! Chain construction from parsed nuclear-data records.
//!
//! The builder consumes already-parsed records (decay evaluations,
//! reaction Q-value tables keyed by ENDF MT number, and independent
//! fission-product yields) and assembles a fully populated [`Chain`].
//! Library-format parsing itself lives outside this crate.
//!
//! Missing data never aborts a build: daughters and yield products with no
//! decay data are redirected through [`replace_missing`], fissionable
//! nuclides without yields lose their fission path, and every such event
//! lands in the [`BuildReport`] reconciliation summary.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use hashbrown::HashMap;
use tracing::{info, warn};

use crate::chain::Chain;
use crate::model::{gnd_name, zam, DecayMode, FissionYields, Nuclide, ReactionPath, Target, Zam};
use crate::resolver::replace_missing;
use crate::Result;

/// MT numbers whose presence marks a nuclide as fissionable.
const FISSION_MTS: [u32; 5] = [18, 19, 20, 21, 38];

/// Total-fission MT, whose Q-value is used for the fission path.
const TOTAL_FISSION_MT: u32 = 18;

/// One physical transmutation reaction: the MT ranges that represent it
/// and the `(ΔA, ΔZ)` rule producing its daughter.
struct ReactionRule {
    label: &'static str,
    /// Inclusive MT ranges belonging to this reaction.
    mts: &'static [(u32, u32)],
    delta_a: i64,
    delta_z: i64,
}

impl ReactionRule {
    fn matches(&self, mt: u32) -> bool {
        self.mts.iter().any(|&(lo, hi)| (lo..=hi).contains(&mt))
    }
}

/// The fixed transmutation table: reaction label, MT identifier sets, and
/// daughter displacement.
const REACTION_RULES: [ReactionRule; 6] = [
    ReactionRule { label: "(n,2n)", mts: &[(16, 16), (875, 891)], delta_a: -1, delta_z: 0 },
    ReactionRule { label: "(n,3n)", mts: &[(17, 17)], delta_a: -2, delta_z: 0 },
    ReactionRule { label: "(n,4n)", mts: &[(37, 37)], delta_a: -3, delta_z: 0 },
    ReactionRule { label: "(n,gamma)", mts: &[(102, 102)], delta_a: 1, delta_z: 0 },
    ReactionRule { label: "(n,p)", mts: &[(103, 103), (600, 649)], delta_a: 0, delta_z: -1 },
    ReactionRule { label: "(n,a)", mts: &[(107, 107), (800, 849)], delta_a: -3, delta_z: -2 },
];

// ============================================================================
// Input records
// ============================================================================

/// One decay mode of a parsed decay evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayModeRecord {
    /// Elementary decay types of this mode, e.g. `["beta-"]`.
    pub modes: Vec<String>,
    /// Daughter nuclide name (GND format).
    pub daughter: String,
    /// Nominal branching ratio from the evaluation.
    pub branching_ratio: f64,
}

/// A parsed decay evaluation for one nuclide.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayRecord {
    pub name: String,
    pub stable: bool,
    /// Nominal half-life [s].
    pub half_life: f64,
    /// Total average decay energy [eV].
    pub decay_energy: f64,
    pub modes: Vec<DecayModeRecord>,
}

/// Parsed neutron-reaction data for one nuclide: the set of available MT
/// identifiers, and the Q-values recorded for (a subset of) them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeutronRecord {
    pub available: BTreeSet<u32>,
    /// MT → Q-value [eV].
    pub q_values: BTreeMap<u32, f64>,
}

impl NeutronRecord {
    /// Build from a Q-value table alone, taking its keys as the
    /// available-MT set (the common case: one Q per recorded section).
    pub fn from_q_values(q_values: BTreeMap<u32, f64>) -> Self {
        Self { available: q_values.keys().copied().collect(), q_values }
    }

    /// Q-value of the lowest-numbered MT of `rule` that has one recorded.
    fn q_value_for(&self, rule: &ReactionRule) -> f64 {
        self.q_values
            .iter()
            .find(|(mt, _)| rule.matches(**mt))
            .map(|(_, q)| *q)
            .unwrap_or(0.0)
    }
}

/// Parsed independent fission-product yields for one nuclide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FissionYieldRecord {
    /// Incident-energy grid [eV]; `None` when the source provides no grid
    /// (a single 0 eV point is assumed).
    pub energies: Option<Vec<f64>>,
    /// Per-energy independent yield tables: product name → yield fraction.
    pub independent: Vec<HashMap<String, f64>>,
}

// ============================================================================
// Decay library
// ============================================================================

/// One decay record with its parsed identity, as held by [`DecayLibrary`].
#[derive(Debug, Clone)]
pub struct DecayEntry {
    pub zam: Zam,
    pub record: DecayRecord,
}

/// The set of decay evaluations available for a build, held in canonical
/// `(Z, A, state)` order. The order matters twice over: it is the chain's
/// insertion order, and it makes the missing-nuclide scan deterministic.
#[derive(Debug, Clone, Default)]
pub struct DecayLibrary {
    entries: Vec<DecayEntry>,
    index: HashMap<String, usize>,
}

impl DecayLibrary {
    /// Ingest records, dropping the neutron's own decay data (the free
    /// neutron is not tracked as a chain nuclide) and sorting canonically.
    pub fn from_records(records: impl IntoIterator<Item = DecayRecord>) -> Result<Self> {
        let mut entries = Vec::new();
        for record in records {
            let zam = zam(&record.name)?;
            if zam.z == 0 {
                continue;
            }
            entries.push(DecayEntry { zam, record });
        }
        entries.sort_by_key(|e| e.zam);

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.record.name.clone(), i))
            .collect();
        Ok(Self { entries, index })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DecayRecord> {
        self.index.get(name).map(|&i| &self.entries[i].record)
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &DecayEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Build report
// ============================================================================

/// A decay daughter that had no decay data and was substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingDaughter {
    pub parent: String,
    pub mode: String,
    pub daughter: String,
    pub substitute: String,
}

/// A reaction product with no decay data (kept in the chain's transition,
/// reported so excluded-nuclide references are visible).
#[derive(Debug, Clone, PartialEq)]
pub struct MissingProduct {
    pub parent: String,
    pub reaction: String,
    pub daughter: String,
}

/// Redirected fission yield at one energy point.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectedYield {
    pub parent: String,
    pub energy: f64,
    /// Total yield fraction moved onto substitute products.
    pub total_yield: f64,
}

/// Reconciliation summary of a chain build. Purely informational: nothing
/// in here ever aborts a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub missing_daughters: Vec<MissingDaughter>,
    pub missing_products: Vec<MissingProduct>,
    /// Fissionable nuclides with no yield data; their fission path is
    /// omitted.
    pub missing_yields: Vec<String>,
    pub redirected_yields: Vec<RedirectedYield>,
}

impl BuildReport {
    pub fn is_empty(&self) -> bool {
        self.missing_daughters.is_empty()
            && self.missing_products.is_empty()
            && self.missing_yields.is_empty()
            && self.redirected_yields.is_empty()
    }

    /// Stream the report through `tracing`.
    pub fn emit(&self) {
        if self.is_empty() {
            info!("chain build completed with no missing-data events");
            return;
        }
        for m in &self.missing_daughters {
            warn!(
                "decay daughter without decay data: {} {} {} (substituted {})",
                m.parent, m.mode, m.daughter, m.substitute
            );
        }
        for m in &self.missing_products {
            warn!(
                "reaction product without decay data: {} {} -> {}",
                m.parent, m.reaction, m.daughter
            );
        }
        for parent in &self.missing_yields {
            warn!("fissionable nuclide without fission product yields: {parent}");
        }
        for r in &self.redirected_yields {
            warn!(
                "fission products without decay data: {}, E={} eV (total yield={})",
                r.parent, r.energy, r.total_yield
            );
        }
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.missing_daughters.is_empty() {
            writeln!(f, "The following decay modes have daughters with no decay data:")?;
            for m in &self.missing_daughters {
                writeln!(f, "  {} {} {} -> {}", m.parent, m.mode, m.daughter, m.substitute)?;
            }
        }
        if !self.missing_products.is_empty() {
            writeln!(f, "The following reaction products have no decay data:")?;
            for m in &self.missing_products {
                writeln!(f, "  {} {} -> {}", m.parent, m.reaction, m.daughter)?;
            }
        }
        if !self.missing_yields.is_empty() {
            writeln!(f, "The following fissionable nuclides have no fission product yields:")?;
            for parent in &self.missing_yields {
                writeln!(f, "  {parent}")?;
            }
        }
        if !self.redirected_yields.is_empty() {
            writeln!(f, "The following nuclides have fission products with no decay data:")?;
            for r in &self.redirected_yields {
                writeln!(f, "  {}, E={} eV (total yield={})", r.parent, r.energy, r.total_yield)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// ChainBuilder
// ============================================================================

/// Assembles a [`Chain`] from parsed nuclear-data records.
pub struct ChainBuilder {
    decay: DecayLibrary,
    neutron: HashMap<String, NeutronRecord>,
    yields: HashMap<String, FissionYieldRecord>,
}

impl ChainBuilder {
    pub fn new(
        decay_records: impl IntoIterator<Item = DecayRecord>,
        neutron: HashMap<String, NeutronRecord>,
        yields: HashMap<String, FissionYieldRecord>,
    ) -> Result<Self> {
        Ok(Self {
            decay: DecayLibrary::from_records(decay_records)?,
            neutron,
            yields,
        })
    }

    /// The decay library, in canonical order.
    pub fn decay_library(&self) -> &DecayLibrary {
        &self.decay
    }

    /// Assemble the chain. One nuclide per decay record, inserted in
    /// canonical `(Z, A, state)` order; the index is rebuilt from scratch.
    pub fn build(&self) -> Result<(Chain, BuildReport)> {
        let mut chain = Chain::new();
        let mut report = BuildReport::default();

        for entry in self.decay.iter() {
            let record = &entry.record;
            let mut nuclide = Nuclide::new(&record.name);

            if !record.stable && record.half_life != 0.0 {
                self.populate_decay(entry, &mut nuclide, &mut report)?;
            }

            if let Some(neutron) = self.neutron.get(&record.name) {
                self.populate_reactions(entry, neutron, &mut nuclide, &mut report);
            }

            if let Some(fpy) = self.yields.get(&record.name) {
                nuclide.yields = Some(self.populate_yields(entry, fpy, &mut report)?);
            }

            chain.push(nuclide);
        }

        Ok((chain, report))
    }

    fn populate_decay(
        &self,
        entry: &DecayEntry,
        nuclide: &mut Nuclide,
        report: &mut BuildReport,
    ) -> Result<()> {
        let record = &entry.record;
        nuclide.half_life = Some(record.half_life);
        nuclide.decay_energy = record.decay_energy;

        let n_modes = record.modes.len();
        for (i, mode) in record.modes.iter().enumerate() {
            let kind = mode.modes.join(",");

            let target = if self.decay.contains(&mode.daughter) {
                mode.daughter.clone()
            } else {
                let substitute = replace_missing(&mode.daughter, &self.decay)?;
                report.missing_daughters.push(MissingDaughter {
                    parent: record.name.clone(),
                    mode: kind.clone(),
                    daughter: mode.daughter.clone(),
                    substitute: substitute.clone(),
                });
                substitute
            };

            // The last mode's ratio is back-computed so the sum is exactly
            // one, absorbing rounding in the source evaluation.
            let branching_ratio = if i == n_modes - 1 {
                1.0 - record.modes[..n_modes - 1]
                    .iter()
                    .map(|m| m.branching_ratio)
                    .sum::<f64>()
            } else {
                mode.branching_ratio
            };

            nuclide.decay_modes.push(DecayMode {
                kind,
                target: Target::Nuclide(target),
                branching_ratio,
            });
        }
        Ok(())
    }

    fn populate_reactions(
        &self,
        entry: &DecayEntry,
        neutron: &NeutronRecord,
        nuclide: &mut Nuclide,
        report: &mut BuildReport,
    ) {
        let record = &entry.record;

        for rule in &REACTION_RULES {
            if !neutron.available.iter().any(|&mt| rule.matches(mt)) {
                continue;
            }

            let a = entry.zam.a as i64 + rule.delta_a;
            let z = entry.zam.z as i64 + rule.delta_z;
            let daughter = gnd_name(z.max(0) as u32, a.max(0) as u32, 0);

            if !self.decay.contains(&daughter) {
                report.missing_products.push(MissingProduct {
                    parent: record.name.clone(),
                    reaction: rule.label.to_string(),
                    daughter: daughter.clone(),
                });
            }

            nuclide.reactions.push(ReactionPath {
                kind: rule.label.to_string(),
                target: Target::Nuclide(daughter),
                q_value: neutron.q_value_for(rule),
                branching_ratio: 1.0,
            });
        }

        if FISSION_MTS.iter().any(|mt| neutron.available.contains(mt)) {
            if self.yields.contains_key(&record.name) {
                nuclide.reactions.push(ReactionPath {
                    kind: "fission".to_string(),
                    target: Target::Fission,
                    q_value: neutron
                        .q_values
                        .get(&TOTAL_FISSION_MT)
                        .copied()
                        .unwrap_or(0.0),
                    branching_ratio: 1.0,
                });
            } else {
                report.missing_yields.push(record.name.clone());
            }
        }
    }

    fn populate_yields(
        &self,
        entry: &DecayEntry,
        fpy: &FissionYieldRecord,
        report: &mut BuildReport,
    ) -> Result<FissionYields> {
        let energies = fpy.energies.clone().unwrap_or_else(|| vec![0.0]);
        let mut data = Vec::with_capacity(energies.len());

        for (&energy, table) in energies.iter().zip(&fpy.independent) {
            let mut redirected = 0.0;
            let mut summed: BTreeMap<Zam, (String, f64)> = BTreeMap::new();

            // Scan products in a fixed order so redirections are
            // reproducible.
            let mut products: Vec<(&String, &f64)> = table.iter().collect();
            products.sort_by_key(|(name, _)| name.as_str());

            for (product, &y) in products {
                let name = if self.decay.contains(product) {
                    product.clone()
                } else {
                    redirected += y;
                    replace_missing(product, &self.decay)?
                };
                // Redirections colliding on one target sum their yields.
                let key = zam(&name)?;
                summed.entry(key).or_insert_with(|| (name, 0.0)).1 += y;
            }

            if redirected > 0.0 {
                report.redirected_yields.push(RedirectedYield {
                    parent: entry.record.name.clone(),
                    energy,
                    total_yield: redirected,
                });
            }

            data.push(summed.into_values().collect());
        }

        Ok(FissionYields { energies, data })
    }
}

/// Convenience wrapper: build a chain in one call.
pub fn build_chain(
    decay_records: impl IntoIterator<Item = DecayRecord>,
    neutron: HashMap<String, NeutronRecord>,
    yields: HashMap<String, FissionYieldRecord>,
) -> Result<(Chain, BuildReport)> {
    ChainBuilder::new(decay_records, neutron, yields)?.build()
}
