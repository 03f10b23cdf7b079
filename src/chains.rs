use crate::residues::ResidueExt;
use pdbtbx::*;

/// Sequence helpers for `pdbtbx` chains.
pub trait ChainExt {
    /// One-letter codes of the chain residues in file order; `X` for non amino acids.
    fn pdb_seq(&self) -> Vec<&str>;
}

impl ChainExt for Chain {
    fn pdb_seq(&self) -> Vec<&str> {
        self.residues()
            .map(|res| res.resn().unwrap_or("X"))
            .collect()
    }
}
