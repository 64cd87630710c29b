//! The chain container and its consistency-preserving edit operations.
//!
//! A [`Chain`] is an insertion-ordered arena of [`Nuclide`] records, a
//! dense name→position index, and the deduplicated ordered set of
//! reaction-type labels observed across all nuclides. Cross-references
//! between nuclides are plain names; they are resolved lazily at matrix
//! assembly and validation time, so forward references during sorted
//! insertion are legal.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{gnd_name, zam, Nuclide, ReactionPath, Target};
use crate::{Error, Result};

/// Expected sum of independent fission-product yields at one energy:
/// two products per fission.
pub const FISSION_YIELD_SUM: f64 = 2.0;

/// Nested `{parent: {target: branching_ratio}}` mapping used by the
/// branching-ratio editor.
pub type BranchRatios = HashMap<String, HashMap<String, f64>>;

/// Light co-products emitted alongside the primary heavy product of a
/// reaction. Transitions to these targets are never touched by
/// branching-ratio edits.
fn secondary_particles(reaction: &str) -> &'static [&'static str] {
    match reaction {
        "(n,p)" | "(n,np)" | "(n,2np)" | "(n,3np)" => &["H1"],
        "(n,n2p)" | "(n,2p)" => &["H1", "H1"],
        "(n,d)" | "(n,2nd)" | "(n,nd)" => &["H2"],
        "(n,t)" | "(n,nt)" => &["H3"],
        "(n,3He)" | "(n,nHe-3)" => &["He3"],
        "(n,a)" | "(n,na)" | "(n,2na)" | "(n,3na)" => &["He4"],
        "(n,2a)" | "(n,n2a)" | "(n,2n2a)" => &["He4", "He4"],
        "(n,3a)" | "(n,n3a)" => &["He4", "He4", "He4"],
        "(n,nd2a)" => &["H2", "He4"],
        "(n,da)" => &["H2", "He4"],
        "(n,d2a)" => &["H2", "He4", "He4"],
        "(n,nt2a)" | "(n,t2a)" => &["H3", "He4", "He4"],
        "(n,pa)" => &["H1", "He4"],
        "(n,pd)" => &["H1", "H2"],
        "(n,pt)" => &["H1", "H3"],
        _ => &[],
    }
}

// ============================================================================
// ReactionSet
// ============================================================================

/// Insertion-ordered, deduplicated set of reaction-type labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSet {
    labels: Vec<String>,
}

impl ReactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, keeping the first occurrence's position.
    /// Returns true if the label was new.
    pub fn insert(&mut self, label: &str) -> bool {
        if self.contains(label) {
            false
        } else {
            self.labels.push(label.to_string());
            true
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ============================================================================
// Chain
// ============================================================================

/// Full representation of a depletion chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    nuclides: Vec<Nuclide>,
    index: HashMap<String, usize>,
    reactions: ReactionSet,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from an already-ordered nuclide list, rebuilding the
    /// index and reaction-label set from scratch. The given order becomes
    /// the chain's index order.
    pub fn from_nuclides(nuclides: impl IntoIterator<Item = Nuclide>) -> Self {
        let mut chain = Self::new();
        for nuclide in nuclides {
            chain.push(nuclide);
        }
        chain
    }

    /// Append a nuclide, assigning it the next dense index and registering
    /// its reaction-type labels (first occurrence wins).
    pub fn push(&mut self, nuclide: Nuclide) {
        for rx in &nuclide.reactions {
            self.reactions.insert(&rx.kind);
        }
        self.index.insert(nuclide.name.clone(), self.nuclides.len());
        self.nuclides.push(nuclide);
    }

    pub fn len(&self) -> usize {
        self.nuclides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nuclides.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a nuclide in the arena (its matrix row/column).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Nuclide> {
        self.position(name).map(|i| &self.nuclides[i])
    }

    /// Mutable access to a nuclide. Callers must not change `name`;
    /// the index is keyed on it.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Nuclide> {
        let i = self.position(name)?;
        Some(&mut self.nuclides[i])
    }

    /// Nuclides in index order.
    pub fn nuclides(&self) -> &[Nuclide] {
        &self.nuclides
    }

    /// Reaction-type labels tracked by this chain, in first-observed order.
    pub fn reactions(&self) -> &ReactionSet {
        &self.reactions
    }

    // ========================================================================
    // Branching-ratio editor
    // ========================================================================

    /// Branching ratios for one reaction type, restricted to branch points
    /// (transitions whose ratio is not exactly 1.0).
    ///
    /// For the capture reaction on Am241 this looks like
    /// `{"Am241": {"Am242": 0.91, "Am242_m1": 0.09}}`.
    pub fn get_branch_ratios(&self, reaction: &str) -> BranchRatios {
        let mut branches = BranchRatios::new();
        for nuclide in &self.nuclides {
            let mut ratios = HashMap::new();
            for rx in &nuclide.reactions {
                if rx.kind == reaction && rx.branching_ratio != 1.0 {
                    if let Target::Nuclide(target) = &rx.target {
                        ratios.insert(target.clone(), rx.branching_ratio);
                    }
                }
            }
            if !ratios.is_empty() {
                branches.insert(nuclide.name.clone(), ratios);
            }
        }
        branches
    }

    /// Replace the branching ratios of one reaction type on the listed
    /// parents.
    ///
    /// All validation happens before any mutation: a rejected edit leaves
    /// the chain unchanged. Under `strict`, any referential or sum
    /// violation aborts the whole call; otherwise the offending parent is
    /// skipped with a warning. Transitions to secondary particles (the
    /// emitted alpha/proton/... co-products) are never modified.
    ///
    /// The ratios supplied for one parent must sum to at most
    /// `1 + tolerance`; if the parent's ground-state target is among them,
    /// the sum must also reach `1 - tolerance`. A supplied set consisting
    /// only of metastable targets implicitly reserves the remainder for the
    /// ground state, which is synthesized with ratio `1 - sum`.
    ///
    /// Fails with [`Error::ReactionNotInChain`] when no listed parent
    /// carries the reaction at all, regardless of `strict`.
    pub fn set_branch_ratios(
        &mut self,
        branch_ratios: &BranchRatios,
        reaction: &str,
        strict: bool,
        tolerance: f64,
    ) -> Result<()> {
        let tolerance = tolerance.abs();
        let secondary = secondary_particles(reaction);

        // Carried through the validation stage.
        let mut sums: HashMap<&str, f64> = HashMap::new();
        let mut rxn_ix_map: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut grounds: HashMap<&str, String> = HashMap::new();

        let mut missing_parents: Vec<&str> = Vec::new();
        let mut missing_products: Vec<(&str, &str)> = Vec::new();
        let mut missing_reaction: Vec<&str> = Vec::new();
        let mut bad_sums: Vec<(&str, f64)> = Vec::new();

        // Check for validity before manipulation.
        'parents: for (parent, ratios) in branch_ratios {
            if !self.contains(parent) {
                if strict {
                    return Err(Error::UnknownNuclide(parent.clone()));
                }
                missing_parents.push(parent);
                continue;
            }

            for product in ratios.keys() {
                if !self.contains(product) {
                    if strict {
                        return Err(Error::UnknownNuclide(product.clone()));
                    }
                    missing_products.push((parent, product));
                    continue 'parents;
                }
            }

            // The parent must already carry this reaction, not counting
            // secondary-particle transitions.
            let parent_nuc = &self.nuclides[self.index[parent.as_str()]];
            let mut indexes = Vec::new();
            for (ix, rx) in parent_nuc.reactions.iter().enumerate() {
                if rx.kind != reaction {
                    continue;
                }
                if let Target::Nuclide(target) = &rx.target {
                    if secondary.contains(&target.as_str()) {
                        continue;
                    }
                    if !target.contains("_m") {
                        grounds.insert(parent, target.clone());
                    }
                }
                indexes.push(ix);
            }

            if indexes.is_empty() {
                if strict {
                    return Err(Error::MissingReaction {
                        parent: parent.clone(),
                        reaction: reaction.to_string(),
                    });
                }
                missing_reaction.push(parent);
                continue;
            }

            let sum: f64 = ratios.values().sum();
            // A sum below one is fine when no ground-state target is given:
            // the remainder is implicitly reserved for the ground state.
            let ground_given = grounds
                .get(parent.as_str())
                .is_some_and(|g| ratios.contains_key(g));
            if sum >= 1.0 + tolerance || (ground_given && sum <= 1.0 - tolerance) {
                if strict {
                    return Err(Error::BranchSumOutOfTolerance {
                        reaction: reaction.to_string(),
                        parent: parent.clone(),
                        sum,
                        tolerance,
                    });
                }
                bad_sums.push((parent, sum));
            } else {
                rxn_ix_map.insert(parent, indexes);
                sums.insert(parent, sum);
            }
        }

        if rxn_ix_map.is_empty() {
            return Err(Error::ReactionNotInChain(reaction.to_string()));
        }

        if !missing_parents.is_empty() {
            missing_parents.sort_unstable();
            warn!(
                "the following nuclides were not found in the chain: {}",
                missing_parents.join(", ")
            );
        }
        if !missing_reaction.is_empty() {
            missing_reaction.sort_unstable();
            warn!(
                "the following nuclides did not have {} reactions: {}",
                reaction,
                missing_reaction.join(", ")
            );
        }
        if !missing_products.is_empty() {
            missing_products.sort_unstable();
            let tail: Vec<String> = missing_products
                .iter()
                .map(|(parent, product)| format!("{parent} -> {product}"))
                .collect();
            warn!(
                "the following products were not found in the chain and \
                 parents were unmodified: {}",
                tail.join(", ")
            );
        }
        if !bad_sums.is_empty() {
            bad_sums.sort_by(|a, b| a.0.cmp(b.0));
            let tail: Vec<String> = bad_sums
                .iter()
                .map(|(parent, sum)| format!("{parent}: {sum:5.3}"))
                .collect();
            warn!(
                "the following parent nuclides were given {} branch ratios \
                 with a sum outside tolerance of 1 +/- {:5.3e}: {}",
                reaction,
                tolerance,
                tail.join(", ")
            );
        }

        // Insert new paths with the updated ratios.
        for (parent, indexes) in &rxn_ix_map {
            let parent_ix = self.index[*parent];
            let nuclide = &mut self.nuclides[parent_ix];
            let new_ratios = &branch_ratios[*parent];

            // Q value is assumed independent of target state.
            let q_value = nuclide.reactions[indexes[0]].q_value;

            for &ix in indexes.iter().rev() {
                nuclide.reactions.remove(ix);
            }

            let mut targets: Vec<&String> = new_ratios.keys().collect();
            targets.sort_unstable();

            let mut all_meta = true;
            for target in targets {
                all_meta = all_meta && target.contains("_m");
                nuclide.reactions.push(ReactionPath {
                    kind: reaction.to_string(),
                    target: Target::Nuclide(target.clone()),
                    q_value,
                    branching_ratio: new_ratios[target],
                });
            }

            let sum = sums[*parent];
            if all_meta && sum != 1.0 {
                let ground_target = match grounds.get(*parent) {
                    Some(target) => target.clone(),
                    // Capture convention: ground state of the A+1 daughter.
                    None => {
                        let parent_zam = zam(parent)?;
                        gnd_name(parent_zam.z, parent_zam.a + 1, 0)
                    }
                };
                nuclide.reactions.push(ReactionPath {
                    kind: reaction.to_string(),
                    target: Target::Nuclide(ground_target),
                    q_value,
                    branching_ratio: 1.0 - sum,
                });
            }
        }

        Ok(())
    }

    // ========================================================================
    // Whole-chain validation
    // ========================================================================

    /// Search for consistency violations across all nuclides:
    ///
    /// 1. decay-mode branching ratios sum to one,
    /// 2. non-fission reaction ratios per label sum to one,
    /// 3. fission yields per energy sum to [`FISSION_YIELD_SUM`].
    ///
    /// `strict` fails on the first violation. `quiet` (non-strict only)
    /// returns `Ok(false)` at the first violation without warning.
    /// Otherwise every violation is warned and the aggregate returned.
    pub fn validate(&self, strict: bool, quiet: bool, tolerance: f64) -> Result<bool> {
        if tolerance < 0.0 {
            return Err(Error::InvalidTolerance(tolerance));
        }

        let mut order: Vec<usize> = (0..self.nuclides.len()).collect();
        order.sort_by(|&a, &b| self.nuclides[a].name.cmp(&self.nuclides[b].name));

        let mut valid = true;
        for ix in order {
            let status = validate_nuclide(&self.nuclides[ix], strict, quiet, tolerance)?;
            if quiet && !status {
                return Ok(false);
            }
            valid = valid && status;
        }
        Ok(valid)
    }
}

/// Per-nuclide consistency checks backing [`Chain::validate`].
fn validate_nuclide(
    nuclide: &Nuclide,
    strict: bool,
    quiet: bool,
    tolerance: f64,
) -> Result<bool> {
    let mut valid = true;

    let mut check = |kind: &str, expected: f64, actual: f64| -> Result<bool> {
        if (actual - expected).abs() <= tolerance {
            return Ok(true);
        }
        if strict {
            return Err(Error::InvalidNuclide {
                name: nuclide.name.clone(),
                kind: kind.to_string(),
                expected,
                actual,
                tolerance,
            });
        }
        if !quiet {
            warn!(
                "nuclide {}: {} sum {} differs from {} by more than {:e}",
                nuclide.name, kind, actual, expected, tolerance
            );
        }
        Ok(false)
    };

    if !nuclide.decay_modes.is_empty() {
        let sum: f64 = nuclide.decay_modes.iter().map(|m| m.branching_ratio).sum();
        let status = check("decay mode branching ratio", 1.0, sum)?;
        valid = valid && status;
        if quiet && !status {
            return Ok(false);
        }
    }

    // Sum reaction ratios per label, leaving secondary co-products out.
    let mut labels: Vec<&str> = Vec::new();
    for rx in &nuclide.reactions {
        if rx.kind != "fission" && !labels.contains(&rx.kind.as_str()) {
            labels.push(&rx.kind);
        }
    }
    for label in labels {
        let secondary = secondary_particles(label);
        let sum: f64 = nuclide
            .reactions
            .iter()
            .filter(|rx| rx.kind == label)
            .filter(|rx| !rx.target.nuclide().is_some_and(|t| secondary.contains(&t)))
            .map(|rx| rx.branching_ratio)
            .sum();
        let status = check(&format!("{label} branching ratio"), 1.0, sum)?;
        valid = valid && status;
        if quiet && !status {
            return Ok(false);
        }
    }

    if let Some(yields) = &nuclide.yields {
        for (energy, table) in yields.energies.iter().zip(&yields.data) {
            let sum: f64 = table.iter().map(|(_, y)| y).sum();
            let status = check(
                &format!("fission yield (E={energy} eV)"),
                FISSION_YIELD_SUM,
                sum,
            )?;
            valid = valid && status;
            if quiet && !status {
                return Ok(false);
            }
        }
    }

    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_set_dedups_in_order() {
        let mut set = ReactionSet::new();
        assert!(set.insert("(n,gamma)"));
        assert!(set.insert("fission"));
        assert!(!set.insert("(n,gamma)"));
        assert_eq!(set.as_slice(), ["(n,gamma)", "fission"]);
    }

    #[test]
    fn test_push_rebuilds_index_densely() {
        let chain = Chain::from_nuclides(vec![
            Nuclide::new("U235"),
            Nuclide::new("U238"),
            Nuclide::new("Pu239"),
        ]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.position("U235"), Some(0));
        assert_eq!(chain.position("Pu239"), Some(2));
        assert!(chain.contains("U238"));
        assert!(!chain.contains("Am241"));
    }

    #[test]
    fn test_secondary_particles_table() {
        assert_eq!(secondary_particles("(n,a)"), ["He4"]);
        assert_eq!(secondary_particles("(n,t2a)"), ["H3", "He4", "He4"]);
        assert!(secondary_particles("(n,gamma)").is_empty());
    }
}
