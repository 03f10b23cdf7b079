//! The flat atom table consumed by the interface engine.
//!
//! The table is the boundary between the structure parser and the geometric
//! core: every later stage addresses atoms by their position in the table.

use nalgebra as na;
use pdbtbx::*;
use std::collections::HashSet;
use tracing::debug;

/// A single heavy atom with the annotations needed for contact analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Position in the owning [`AtomTable`]
    pub index: usize,
    /// Serial number from the structure file
    pub serial: usize,
    /// Chain identifier
    pub chain_id: String,
    /// Three-letter residue name
    pub residue_name: String,
    /// Residue sequence number
    pub residue_number: isize,
    /// Residue insertion code, empty when absent
    pub insertion_code: String,
    /// Atom name, e.g. `CA` or `NZ`
    pub atom_name: String,
    /// Upper-case element symbol
    pub element: String,
    /// X coordinate in Å
    pub x: f64,
    /// Y coordinate in Å
    pub y: f64,
    /// Z coordinate in Å
    pub z: f64,
}

impl Atom {
    /// Create an atom that is not yet part of a table.
    ///
    /// The index is assigned when the atom is added to an [`AtomTable`].
    pub fn new(
        chain_id: &str,
        residue_name: &str,
        residue_number: isize,
        atom_name: &str,
        element: &str,
        pos: (f64, f64, f64),
    ) -> Self {
        Self {
            index: 0,
            serial: 0,
            chain_id: chain_id.to_string(),
            residue_name: residue_name.to_uppercase(),
            residue_number,
            insertion_code: String::new(),
            atom_name: atom_name.to_uppercase(),
            element: element.to_uppercase(),
            x: pos.0,
            y: pos.1,
            z: pos.2,
        }
    }

    /// Set the residue insertion code.
    pub fn with_insertion_code(mut self, insertion_code: &str) -> Self {
        self.insertion_code = insertion_code.to_string();
        self
    }

    /// Set the serial number from the structure file.
    pub fn with_serial(mut self, serial: usize) -> Self {
        self.serial = serial;
        self
    }

    /// Atom centre as a vector.
    pub fn pos(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance between the two atom centres.
    pub fn distance(&self, other: &Atom) -> f64 {
        (self.pos() - other.pos()).norm()
    }

    /// Hydrogen or deuterium.
    pub fn is_hydrogen(&self) -> bool {
        matches!(self.element.as_str(), "H" | "D")
    }
}

/// Ordered, read-only collection of atoms for one analysis.
#[derive(Debug, Clone, Default)]
pub struct AtomTable {
    atoms: Vec<Atom>,
}

impl AtomTable {
    /// Build a table from caller-supplied atoms, assigning indices in order.
    pub fn from_atoms(atoms: impl IntoIterator<Item = Atom>) -> Self {
        let atoms = atoms
            .into_iter()
            .enumerate()
            .map(|(index, atom)| Atom { index, ..atom })
            .collect();
        Self { atoms }
    }

    /// Extract the heavy atoms of the selected chains from the first model.
    ///
    /// Atoms are kept in file order. For residues with alternate locations,
    /// atoms without an alternate location are kept together with the first
    /// alternate location encountered.
    pub fn from_pdb(pdb: &PDB, chains: &[String]) -> Self {
        let selected: HashSet<&str> = chains.iter().map(|c| c.as_str()).collect();
        let mut atoms = Vec::new();

        let Some(model) = pdb.models().next() else {
            return Self::default();
        };

        for chain in model.chains().filter(|c| selected.contains(c.id())) {
            for residue in chain.residues() {
                let (resi, insertion) = residue.id();
                let resn = residue.name().unwrap_or("UNK");
                let first_altloc = residue
                    .conformers()
                    .find_map(|conformer| conformer.alternative_location());

                for conformer in residue.conformers().filter(|conformer| {
                    let altloc = conformer.alternative_location();
                    altloc.is_none() || altloc == first_altloc
                }) {
                    for atom in conformer.atoms() {
                        let element = atom
                            .element()
                            .map(|e| e.symbol().to_uppercase())
                            .unwrap_or_else(|| element_from_name(atom.name()));
                        let record = Atom::new(
                            chain.id(),
                            resn,
                            resi,
                            atom.name(),
                            &element,
                            atom.pos(),
                        )
                        .with_insertion_code(insertion.unwrap_or(""))
                        .with_serial(atom.serial_number());

                        if !record.is_hydrogen() {
                            atoms.push(record);
                        }
                    }
                }
            }
        }

        debug!(
            "Extracted {} heavy atoms from chains {:?}",
            atoms.len(),
            chains
        );
        Self::from_atoms(atoms)
    }

    /// All atoms in table order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Atom at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Whether the table holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Check whether at least one atom belongs to the chain.
    pub fn contains_chain(&self, chain_id: &str) -> bool {
        self.atoms.iter().any(|a| a.chain_id == chain_id)
    }

    /// Atom centres in table order.
    pub fn coordinates(&self) -> Vec<na::Vector3<f64>> {
        self.atoms.iter().map(Atom::pos).collect()
    }
}

/// Guess the element from a PDB atom name when the element column is empty.
fn element_from_name(atom_name: &str) -> String {
    atom_name
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::load_model;

    #[test]
    fn indices_follow_insertion_order() {
        let table = AtomTable::from_atoms([
            Atom::new("A", "ALA", 1, "CA", "C", (0.0, 0.0, 0.0)),
            Atom::new("B", "GLY", 7, "N", "N", (1.0, 0.0, 0.0)),
            Atom::new("B", "GLY", 7, "CA", "C", (2.0, 0.0, 0.0)),
        ]);
        let indices: Vec<usize> = table.atoms().iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(table.contains_chain("B"));
        assert!(!table.contains_chain("C"));
        assert!((table.atoms()[0].distance(&table.atoms()[2]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn element_guess_skips_leading_digits() {
        assert_eq!(element_from_name("1HB"), "H");
        assert_eq!(element_from_name("CA"), "C");
        assert_eq!(element_from_name(""), "");
    }

    #[test]
    fn test_from_pdb_selects_chains() {
        let root = env!("CARGO_MANIFEST_DIR");
        let path = format!("{}/{}", root, "test-data/toy_complex.pdb");
        let (pdb, _) = load_model(&path).unwrap();

        let table = AtomTable::from_pdb(&pdb, &["A".to_string(), "H".to_string()]);
        assert!(table.contains_chain("A"));
        assert!(table.contains_chain("H"));
        assert!(!table.contains_chain("L"));
        assert!(table.atoms().iter().all(|a| !a.is_hydrogen()));
        assert!(table
            .atoms()
            .iter()
            .enumerate()
            .all(|(i, a)| a.index == i));
    }
}
