//! # Depletion-Chain Model
//!
//! Clean DTOs that define the nuclide graph. These types cross every
//! boundary: builder, chain, matrix assembly, persisted-chain adapter.
//!
//! Design rule: this module is pure data. No I/O, no state, no lookup
//! tables beyond the element-symbol table the name codec needs.

pub mod names;
pub mod nuclide;

pub use names::{gnd_name, zam, Zam, ATOMIC_SYMBOL};
pub use nuclide::{DecayMode, FissionYields, Nuclide, ReactionPath, Target};
