//! Depletion-matrix assembly.
//!
//! [`Chain::form_matrix`] converts the chain plus one cell's reaction
//! rates into the sparse operator `M` of the Bateman equations
//! `dN/dt = M·N`. Contributions accumulate in a coordinate map and are
//! finalized into compressed sparse row form. Entries that evaluate to
//! exactly zero are never materialized; downstream solvers rely on the
//! sparsity pattern, so this is a contract, not an optimization.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};

use crate::chain::Chain;
use crate::model::Target;
use crate::{Error, Result};

// ============================================================================
// Per-cell reaction rates
// ============================================================================

/// Reaction rates for one depletable cell: nuclide name → reaction-type
/// label → rate. A nuclide absent from the table contributes decay terms
/// only; an absent reaction contributes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionRates {
    rates: HashMap<String, HashMap<String, f64>>,
}

impl ReactionRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, nuclide: &str, reaction: &str, rate: f64) {
        self.rates
            .entry(nuclide.to_string())
            .or_default()
            .insert(reaction.to_string(), rate);
    }

    /// Rate for a `(nuclide, reaction)` pair; 0.0 when untabulated.
    pub fn get(&self, nuclide: &str, reaction: &str) -> f64 {
        self.rates
            .get(nuclide)
            .and_then(|by_rx| by_rx.get(reaction))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn has_nuclide(&self, nuclide: &str) -> bool {
        self.rates.contains_key(nuclide)
    }
}

// ============================================================================
// CSR matrix
// ============================================================================

/// Square sparse matrix in compressed sparse row format.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Finalize a coordinate map into CSR, dropping exact zeros. The map
    /// is keyed `(row, col)`, so entries arrive row-major and sorted.
    pub fn from_coo(n: usize, coo: &BTreeMap<(usize, usize), f64>) -> Self {
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(coo.len());
        let mut values = Vec::with_capacity(coo.len());

        let mut current_row = 0;
        row_ptr.push(0);
        for (&(row, col), &value) in coo {
            if value == 0.0 {
                continue;
            }
            while current_row < row {
                row_ptr.push(col_idx.len());
                current_row += 1;
            }
            col_idx.push(col);
            values.push(value);
        }
        while current_row < n {
            row_ptr.push(col_idx.len());
            current_row += 1;
        }

        Self { n, row_ptr, col_idx, values }
    }

    /// Matrix dimension (the matrix is `n × n`).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Entry at `(row, col)`; 0.0 for entries outside the pattern.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (cols, vals) = self.row(row);
        match cols.binary_search(&col) {
            Ok(i) => vals[i],
            Err(_) => 0.0,
        }
    }

    /// Is `(row, col)` a stored entry?
    pub fn is_stored(&self, row: usize, col: usize) -> bool {
        self.row(row).0.binary_search(&col).is_ok()
    }

    /// Column indices and values of one row.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        if row + 1 >= self.row_ptr.len() {
            return (&[], &[]);
        }
        let (start, end) = (self.row_ptr[row], self.row_ptr[row + 1]);
        (&self.col_idx[start..end], &self.values[start..end])
    }

    /// Iterate stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n).flat_map(move |r| {
            let (cols, vals) = self.row(r);
            cols.iter().zip(vals).map(move |(&c, &v)| (r, c, v))
        })
    }

    /// Dense copy, row-major. Intended for tests and small chains.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.n]; self.n];
        for (r, c, v) in self.iter() {
            dense[r][c] = v;
        }
        dense
    }
}

// ============================================================================
// Assembly
// ============================================================================

impl Chain {
    /// Form the depletion matrix for one cell.
    ///
    /// Decay terms come from the chain alone; reaction terms from `rates`.
    /// Loss is charged once per distinct reaction-type label even when
    /// competing branches share it; fission gains use the yield table at
    /// the lowest tabulated incident energy (no energy-dependent weighting
    /// at assembly time). The chain is not mutated, so the call can be
    /// repeated per depletable region.
    pub fn form_matrix(&self, rates: &ReactionRates) -> Result<CsrMatrix> {
        let mut coo: BTreeMap<(usize, usize), f64> = BTreeMap::new();

        for (i, nuclide) in self.nuclides().iter().enumerate() {
            if !nuclide.decay_modes.is_empty() {
                let decay_constant = nuclide.decay_constant().unwrap_or(0.0);

                if decay_constant != 0.0 {
                    *coo.entry((i, i)).or_insert(0.0) -= decay_constant;
                }

                for mode in &nuclide.decay_modes {
                    // `Nothing` allows total annihilation for debugging.
                    if let Target::Nuclide(target) = &mode.target {
                        let gain = mode.branching_ratio * decay_constant;
                        if gain != 0.0 {
                            let k = self.lookup(target)?;
                            *coo.entry((k, i)).or_insert(0.0) += gain;
                        }
                    }
                }
            }

            if rates.has_nuclide(&nuclide.name) {
                let mut charged: HashSet<&str> = HashSet::new();

                for rx in &nuclide.reactions {
                    let path_rate = rates.get(&nuclide.name, &rx.kind);

                    // Loss: once per reaction type, not per branch.
                    if charged.insert(rx.kind.as_str()) && path_rate != 0.0 {
                        *coo.entry((i, i)).or_insert(0.0) -= path_rate;
                    }

                    match &rx.target {
                        Target::Nothing => {}
                        Target::Nuclide(target) => {
                            if path_rate != 0.0 {
                                let k = self.lookup(target)?;
                                *coo.entry((k, i)).or_insert(0.0) +=
                                    path_rate * rx.branching_ratio;
                            }
                        }
                        Target::Fission => {
                            let yields = nuclide
                                .yields
                                .as_ref()
                                .and_then(|y| y.lowest_energy())
                                .ok_or_else(|| {
                                    Error::MissingYields(nuclide.name.clone())
                                })?;
                            for (product, y) in yields {
                                let gain = y * path_rate;
                                if gain != 0.0 {
                                    let k = self.lookup(product)?;
                                    *coo.entry((k, i)).or_insert(0.0) += gain;
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(CsrMatrix::from_coo(self.len(), &coo))
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| Error::UnknownNuclide(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coo_drops_exact_zeros() {
        let mut coo = BTreeMap::new();
        coo.insert((0, 0), -1.5);
        coo.insert((0, 1), 0.0);
        coo.insert((1, 0), 1.5);

        let m = CsrMatrix::from_coo(2, &coo);
        assert_eq!(m.nnz(), 2);
        assert!(!m.is_stored(0, 1));
        assert_eq!(m.get(0, 0), -1.5);
        assert_eq!(m.get(1, 0), 1.5);
        assert_eq!(m.get(1, 1), 0.0);
    }

    #[test]
    fn test_from_coo_empty_rows() {
        let mut coo = BTreeMap::new();
        coo.insert((2, 1), 4.0);
        let m = CsrMatrix::from_coo(4, &coo);
        assert_eq!(m.row(0), (&[][..], &[][..]));
        assert_eq!(m.row(2), (&[1][..], &[4.0][..]));
        assert_eq!(m.row(3), (&[][..], &[][..]));
        assert_eq!(m.to_dense()[2][1], 4.0);
    }

    #[test]
    fn test_rates_default_to_zero() {
        let mut rates = ReactionRates::new();
        rates.set("U235", "fission", 0.25);
        assert_eq!(rates.get("U235", "fission"), 0.25);
        assert_eq!(rates.get("U235", "(n,gamma)"), 0.0);
        assert!(!rates.has_nuclide("U238"));
    }
}
