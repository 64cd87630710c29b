//! Nuclide-name codec.
//!
//! Names follow the GND convention `Symbol + MassNumber [+ _mN]`, e.g.
//! `Am241` or `Am242_m1`. This module decomposes names into their
//! `(Z, A, state)` parts, re-forms names from parts, and defines the
//! canonical ordering used everywhere a chain is sorted.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Element symbols indexed by atomic number. Index 0 is the free neutron.
pub const ATOMIC_SYMBOL: [&str; 119] = [
    "n", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg",
    "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn",
    "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb",
    "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta",
    "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At",
    "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt",
    "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Decomposed nuclide identity: atomic number, mass number, metastable state.
///
/// The derived ordering (`Z`, then `A`, then `state`) is the canonical
/// chain-insertion order and is part of the round-trip contract for
/// persisted chains.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Zam {
    pub z: u32,
    pub a: u32,
    pub state: u32,
}

/// Decompose a GND-format name into its `(Z, A, state)` parts.
pub fn zam(name: &str) -> Result<Zam> {
    let bad = || Error::BadNuclideName(name.to_string());

    let symbol_len = name.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if symbol_len == 0 {
        return Err(bad());
    }
    let (symbol, rest) = name.split_at(symbol_len);
    let z = ATOMIC_SYMBOL
        .iter()
        .position(|s| *s == symbol)
        .ok_or_else(bad)? as u32;

    let (mass, state) = match rest.split_once("_m") {
        Some((mass, state)) => (mass, state.parse::<u32>().map_err(|_| bad())?),
        None => (rest, 0),
    };
    let a = mass.parse::<u32>().map_err(|_| bad())?;

    Ok(Zam { z, a, state })
}

/// Form the GND-format name for `(Z, A, state)`.
pub fn gnd_name(z: u32, a: u32, state: u32) -> String {
    let symbol = ATOMIC_SYMBOL.get(z as usize).copied().unwrap_or("?");
    if state > 0 {
        format!("{symbol}{a}_m{state}")
    } else {
        format!("{symbol}{a}")
    }
}
