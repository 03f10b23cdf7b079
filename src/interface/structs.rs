//! Residue-level results of an interface analysis.

use crate::atoms::Atom;
use crate::classes::AtomClass;
use core::fmt;

/// Identifies a residue within the analysed structure.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct ResidueKey {
    /// Chain identifier
    pub chain: String,
    /// Residue sequence number
    pub resi: isize,
    /// Insertion code, empty when absent
    pub insertion: String,
    /// Three-letter residue name
    pub resn: String,
}

impl ResidueKey {
    /// Key of the residue an atom belongs to.
    pub fn from_atom(atom: &Atom) -> Self {
        Self {
            chain: atom.chain_id.clone(),
            resi: atom.residue_number,
            insertion: atom.insertion_code.clone(),
            resn: atom.residue_name.clone(),
        }
    }

    /// The `chain:RESNAME NUM` token used by the dataset pipeline.
    pub fn token(&self) -> String {
        format!(
            "{chain}:{resn} {resi}{insertion}",
            chain = self.chain,
            resn = self.resn,
            resi = self.resi,
            insertion = self.insertion
        )
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chain {chain}, Residue {resn} {resi}{insertion}",
            chain = self.chain,
            resn = self.resn,
            resi = self.resi,
            insertion = self.insertion
        )
    }
}

/// Contacts between one query residue and one partner residue.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerContact {
    /// The partner residue
    pub residue: ResidueKey,
    /// Number of accepted atom contacts with this partner residue
    pub contact_count: usize,
    /// Shortest accepted contact distance in Å
    pub min_distance: f64,
    /// Classes of the query and partner atoms of the closest contact
    pub closest_classes: (AtomClass, AtomClass),
}

/// A query-chain residue at the interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceResidue {
    /// The query-chain residue
    pub query: ResidueKey,
    /// Partner residue holding the closest accepted contact
    pub partner: ResidueKey,
    /// Accepted atom contacts with any partner atom
    pub contact_count: usize,
    /// Shortest accepted contact distance in Å
    pub min_distance: f64,
    /// Per partner residue breakdown, in first-encountered order
    pub partners: Vec<PartnerContact>,
}

impl InterfaceResidue {
    /// Token of the query residue, e.g. `A:ARG 176`.
    pub fn token(&self) -> String {
        self.query.token()
    }
}

impl fmt::Display for InterfaceResidue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{query}] has {count} contacts, closest {dist:.2} Å with [{partner}]",
            query = self.query,
            count = self.contact_count,
            dist = self.min_distance,
            partner = self.partner
        )
    }
}
