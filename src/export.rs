//! Persisted-chain adapter: serialize a chain to and from JSON.
//!
//! The persisted form is an ordered list of nuclide records; reading
//! rebuilds the name→position index and the reaction-label set from the
//! document order, so a write/read round trip yields an
//! index-order-identical chain.
//!
//! This is deliberately a thin boundary adapter: the chain's semantics
//! live in [`crate::chain`], and nothing here inspects transition physics
//! beyond the optional fission-Q override hook.

use std::io::{Read, Write};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::model::{Nuclide, Target};
use crate::Result;

/// The on-disk document: nuclides in index order.
#[derive(Debug, Serialize, Deserialize)]
struct ChainDocument {
    nuclides: Vec<Nuclide>,
}

/// Write a chain as a pretty-printed JSON document.
pub fn write_chain<W: Write>(chain: &Chain, writer: W) -> Result<()> {
    let document = ChainDocument {
        nuclides: chain.nuclides().to_vec(),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Read a persisted chain, rebuilding the index and reaction-label set.
pub fn read_chain<R: Read>(reader: R) -> Result<Chain> {
    let document: ChainDocument = serde_json::from_reader(reader)?;
    Ok(Chain::from_nuclides(document.nuclides))
}

/// Read a persisted chain, overriding fission Q-values [eV] for the named
/// nuclides.
pub fn read_chain_with_fission_q<R: Read>(
    reader: R,
    fission_q: &HashMap<String, f64>,
) -> Result<Chain> {
    let document: ChainDocument = serde_json::from_reader(reader)?;
    let nuclides = document.nuclides.into_iter().map(|mut nuclide| {
        if let Some(&q) = fission_q.get(&nuclide.name) {
            for rx in &mut nuclide.reactions {
                if matches!(rx.target, Target::Fission) {
                    rx.q_value = q;
                }
            }
        }
        nuclide
    });
    Ok(Chain::from_nuclides(nuclides))
}
