//! Missing-nuclide substitution.
//!
//! Nuclear-data libraries are incomplete: a decay daughter or fission
//! product frequently has no decay evaluation of its own. Rather than
//! dropping the transition (and leaking mass from the chain), the builder
//! substitutes a physically motivated nearby nuclide that does have data.
//!
//! This is a documented domain heuristic, not a physical derivation. It is
//! deterministic for a given decay library: candidates are scanned in
//! canonical `(Z, A, state)` order.

use crate::builder::DecayLibrary;
use crate::model::{gnd_name, zam};
use crate::{Error, Result};

/// Highest atomic number at which the beta-direction heuristic is trusted;
/// above it, substitution steps by alpha decay instead.
const MAX_BETA_Z: u32 = 98;

/// Replace a product nuclide that has no decay data with a suitable
/// substitute present in `decay`.
///
/// The walk: a free neutron becomes `H1`; a metastable state first tries
/// its ground state; otherwise the direction of travel is chosen by
/// comparing the missing mass number against the element's longest-lived
/// isotope (β⁻ toward higher Z if the longest-lived isotope is lighter,
/// else β⁺), stepping one unit of Z at fixed A, or by α decay
/// (Z−2, A−4) above Z = 98, until a present nuclide is reached.
pub fn replace_missing(product: &str, decay: &DecayLibrary) -> Result<String> {
    let missing = zam(product)?;
    let (mut z, mut a) = (missing.z, missing.a);

    // Replace neutron with proton.
    if z == 0 && a == 1 {
        return Ok("H1".to_string());
    }

    // Ground states are disproportionately likely to have data.
    let mut candidate = if missing.state > 0 {
        gnd_name(z, a, 0)
    } else {
        product.to_string()
    };

    // Longest-lived isotope of the same element; a stable isotope wins
    // the scan immediately.
    let mut half_life = 0.0;
    let mut mass_longest_lived = None;
    for entry in decay.iter() {
        if entry.zam.z != z {
            continue;
        }
        if entry.record.stable {
            mass_longest_lived = Some(entry.zam.a);
            break;
        }
        if entry.record.half_life > half_life {
            mass_longest_lived = Some(entry.zam.a);
            half_life = entry.record.half_life;
        }
    }

    // If the longest-lived isotope is lighter than the missing product,
    // assume it undergoes beta-. Otherwise assume beta+.
    let beta_minus = mass_longest_lived.is_some_and(|mass| mass < a);

    while !decay.contains(&candidate) {
        if z > MAX_BETA_Z {
            z = z.saturating_sub(2);
            a = a
                .checked_sub(4)
                .ok_or_else(|| Error::NoSubstitute(product.to_string()))?;
        } else if beta_minus {
            z += 1;
            if z as usize >= crate::model::ATOMIC_SYMBOL.len() {
                return Err(Error::NoSubstitute(product.to_string()));
            }
        } else {
            z = z
                .checked_sub(1)
                .ok_or_else(|| Error::NoSubstitute(product.to_string()))?;
        }
        candidate = gnd_name(z, a, 0);
    }

    Ok(candidate)
}
