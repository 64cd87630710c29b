//! # depchain: Nuclide Depletion Chains in Rust
//!
//! A depletion chain is a directed graph of nuclear species connected by
//! decay and neutron-reaction pathways. This crate builds a consistent
//! chain from heterogeneous, often-incomplete nuclear-data records,
//! edits it while preserving physical consistency, and converts it plus
//! per-cell reaction rates into the sparse Bateman operator `dN/dt = M·N`.
//!
//! ## Design Principles
//!
//! 1. **Arena + index**: nuclides live in an insertion-ordered arena with
//!    an explicit name→position map; cross-references are plain names,
//!    resolved at assembly/validation time (forward references are legal)
//! 2. **Clean DTOs**: `Nuclide`, `DecayMode`, `ReactionPath` cross all
//!    boundaries
//! 3. **Builder owns nothing**: records in, `(Chain, BuildReport)` out;
//!    missing data is substituted or reported, never fatal
//! 4. **Sparsity is a contract**: the assembled matrix never materializes
//!    exact zeros
//!
//! ## Quick Start
//!
//! ```rust
//! use depchain::{Chain, Nuclide, DecayMode, Target, ReactionRates};
//!
//! # fn example() -> depchain::Result<()> {
//! let mut a = Nuclide::new("A");
//! a.half_life = Some(10.0);
//! a.decay_modes.push(DecayMode {
//!     kind: "beta-".into(),
//!     target: Target::Nuclide("B".into()),
//!     branching_ratio: 1.0,
//! });
//! let chain = Chain::from_nuclides(vec![a, Nuclide::new("B")]);
//!
//! // No reaction rates: decay terms only.
//! let matrix = chain.form_matrix(&ReactionRates::new())?;
//! assert_eq!(matrix.get(0, 0), -matrix.get(1, 0));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod builder;
pub mod chain;
pub mod export;
pub mod matrix;
pub mod model;
pub mod resolver;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    gnd_name, zam, DecayMode, FissionYields, Nuclide, ReactionPath, Target, Zam,
};

// ============================================================================
// Re-exports: Chain container and editor
// ============================================================================

pub use chain::{BranchRatios, Chain, ReactionSet};

// ============================================================================
// Re-exports: Builder
// ============================================================================

pub use builder::{
    build_chain, BuildReport, ChainBuilder, DecayLibrary, DecayModeRecord,
    DecayRecord, FissionYieldRecord, NeutronRecord,
};

// ============================================================================
// Re-exports: Matrix assembly
// ============================================================================

pub use matrix::{CsrMatrix, ReactionRates};

// ============================================================================
// Re-exports: Resolver & persisted-chain adapter
// ============================================================================

pub use export::{read_chain, read_chain_with_fission_q, write_chain};
pub use resolver::replace_missing;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nuclide {0} is not present in the chain")]
    UnknownNuclide(String),

    #[error("nuclide {parent} does not have {reaction} reactions")]
    MissingReaction { parent: String, reaction: String },

    #[error("no {0} reactions found in this chain")]
    ReactionNotInChain(String),

    #[error(
        "sum of {reaction} branching ratios for {parent} ({sum:7.3}) \
         outside tolerance of 1 +/- {tolerance:5.3e}"
    )]
    BranchSumOutOfTolerance {
        reaction: String,
        parent: String,
        sum: f64,
        tolerance: f64,
    },

    #[error("nuclide {name}: {kind} sum {actual} differs from {expected} by more than {tolerance:e}")]
    InvalidNuclide {
        name: String,
        kind: String,
        expected: f64,
        actual: f64,
        tolerance: f64,
    },

    #[error("tolerance must be non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("could not parse nuclide name {0:?}")]
    BadNuclideName(String),

    #[error("no substitute found for missing nuclide {0}")]
    NoSubstitute(String),

    #[error("nuclide {0} carries a fission path but no fission yields")]
    MissingYields(String),

    #[error("persisted-chain error: {0}")]
    Persist(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
