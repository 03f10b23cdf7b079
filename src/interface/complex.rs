//! Neighbour-based interface detection for one atom table.

use super::{compatible, filter_match, inter, ContactRecord, InterfaceResidue};
use crate::atoms::AtomTable;
use crate::classes::{classify_atom, AtomClass};
use crate::config::InterfaceConfig;
use crate::error::InterfaceError;
use crate::neighbors::NeighborSet;
use crate::tessellation::GeometryError;
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{debug, warn};

/// The workhorse struct for finding the interface of one structure
pub struct InterfaceComplex<'a> {
    /// Atoms of the query and partner chains
    pub atoms: &'a AtomTable,
    /// Chain whose residues are reported
    pub query_chain: String,
    /// Chains the query is tested against
    pub partner_chains: HashSet<String>,
    /// Solvent-exclusion radius for the contact test
    pub solvent_radius: f64,
    /// Minimum accepted atom contacts per reported residue
    pub min_contacts: usize,

    /// Class of every atom, by table index
    classes: Vec<AtomClass>,
    /// Candidate contact partners of every atom
    neighbors: NeighborSet,
}

impl<'a> InterfaceComplex<'a> {
    /// Validate `config`, classify the atoms and build the neighbour index.
    pub fn new(atoms: &'a AtomTable, config: &InterfaceConfig) -> Result<Self, InterfaceError> {
        config.validate()?;
        let started = Instant::now();

        // Both sides of the interface must be present
        let query_present = atoms.contains_chain(&config.query_chain);
        let partners_present: Vec<String> = config
            .interact_chains
            .iter()
            .filter(|c| atoms.contains_chain(c))
            .cloned()
            .collect();
        if !query_present || partners_present.is_empty() {
            return Err(InterfaceError::EmptyChainSelection {
                query_chain: config.query_chain.clone(),
                query_present,
                partner_chains: config.interact_chains.clone(),
                partners_present,
            });
        }
        debug!(
            "Query chain {}; partner chains {:?}",
            config.query_chain, partners_present
        );

        if let Some(limit) = config.max_atoms {
            if atoms.len() > limit {
                return Err(InterfaceError::TooManyAtoms {
                    atoms: atoms.len(),
                    limit,
                });
            }
        }

        let classes = classify_atoms(atoms);

        let deadline = config.deadline.map(|d| started + d);
        let neighbors = NeighborSet::build(atoms, config.neighbor_method, deadline).map_err(
            |e| match e {
                GeometryError::DeadlineExceeded => InterfaceError::DeadlineExceeded,
                other => InterfaceError::Geometry(other),
            },
        )?;

        Ok(Self {
            atoms,
            query_chain: config.query_chain.clone(),
            partner_chains: config.interact_chains.iter().cloned().collect(),
            solvent_radius: config.solvent_radius,
            min_contacts: config.min_contacts,
            classes,
            neighbors,
        })
    }

    /// Class of the atom at `index`; `Unknown` for indices outside the table.
    pub fn class_of(&self, index: usize) -> AtomClass {
        self.classes
            .get(index)
            .copied()
            .unwrap_or(AtomClass::Unknown)
    }

    /// Candidate contact partners of every atom.
    pub fn neighbors(&self) -> &NeighborSet {
        &self.neighbors
    }

    /// Determine if a neighbour pair spans the interface in query-to-partner order.
    fn should_compare_atoms(&self, i: usize, j: usize) -> bool {
        match (self.atoms.get(i), self.atoms.get(j)) {
            (Some(a), Some(b)) => {
                a.chain_id == self.query_chain && self.partner_chains.contains(&b.chain_id)
            }
            _ => false,
        }
    }
}

/// Trait for finding interface contacts.
pub trait Interface {
    /// Get all accepted atom contacts from the query chain to the partner chains.
    fn get_atomic_contacts(&self) -> Vec<ContactRecord>;

    /// Get the query residues with at least `min_contacts` accepted contacts.
    fn get_interface_residues(&self) -> Vec<InterfaceResidue>;
}

impl Interface for InterfaceComplex<'_> {
    fn get_atomic_contacts(&self) -> Vec<ContactRecord> {
        // Atoms in table order; each neighbour list is sorted
        let contacts: Vec<ContactRecord> = self
            .neighbors
            .iter()
            .flat_map(|(i, buddies)| buddies.iter().map(move |&j| (i, j)))
            .filter(|&(i, j)| self.should_compare_atoms(i, j))
            .filter_map(|(i, j)| {
                let (a, b) = (self.atoms.get(i)?, self.atoms.get(j)?);
                let (query_class, partner_class) = (self.class_of(i), self.class_of(j));
                if !compatible(query_class, partner_class) {
                    return None;
                }
                let (ad, vd) = inter(a, b, self.solvent_radius);
                (ad < vd).then_some(ContactRecord {
                    query_atom: i,
                    partner_atom: j,
                    distance: ad,
                    reference: vd,
                    query_class,
                    partner_class,
                })
            })
            .collect();

        debug!(
            "Accepted {} atom contacts from chain {}",
            contacts.len(),
            self.query_chain
        );
        contacts
    }

    fn get_interface_residues(&self) -> Vec<InterfaceResidue> {
        let contacts = self.get_atomic_contacts();
        let residues = filter_match(&contacts, self.atoms, self.min_contacts);
        debug!(
            "Found {} interface residues on chain {} (min_contacts = {})",
            residues.len(),
            self.query_chain,
            self.min_contacts
        );
        residues
    }
}

/// Classify every atom, reporting the ones that fit no class.
fn classify_atoms(atoms: &AtomTable) -> Vec<AtomClass> {
    let classes: Vec<AtomClass> = atoms.atoms().iter().map(classify_atom).collect();

    let unknown: BTreeSet<String> = atoms
        .atoms()
        .iter()
        .zip(&classes)
        .filter(|(_, class)| **class == AtomClass::Unknown)
        .map(|(atom, _)| format!("{}:{}", atom.residue_name, atom.atom_name))
        .collect();
    if !unknown.is_empty() {
        let count = classes.iter().filter(|c| **c == AtomClass::Unknown).count();
        warn!(
            "{count} atoms could not be classified and will not form contacts: {:?}",
            unknown
        );
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Atom;
    use crate::neighbors::NeighborMethod;

    /// Chain A residue 1 sits 3.0 Å from chain B residue 1; the other atoms are far away.
    fn toy_pair(query: (&str, &str, &str), partner: (&str, &str, &str)) -> AtomTable {
        AtomTable::from_atoms([
            Atom::new("A", query.0, 1, query.1, query.2, (0.0, 0.0, 0.0)),
            Atom::new("B", partner.0, 1, partner.1, partner.2, (3.0, 0.0, 0.0)),
            Atom::new("A", "ALA", 2, "CB", "C", (-20.0, 1.0, 2.0)),
            Atom::new("A", "ALA", 3, "CB", "C", (-18.0, 19.0, -3.0)),
            Atom::new("A", "ALA", 4, "CB", "C", (-22.0, -4.0, 21.0)),
        ])
    }

    #[test]
    fn single_nonpolar_contact() {
        let atoms = toy_pair(("ALA", "CB", "C"), ("LEU", "CD1", "C"));
        let config = InterfaceConfig::new("A", &["B"]).with_min_contacts(1);
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();

        let contacts = complex.get_atomic_contacts();
        assert_eq!(contacts.len(), 1, "{contacts:?}");
        assert_eq!((contacts[0].query_atom, contacts[0].partner_atom), (0, 1));
        assert!((contacts[0].distance - 3.0).abs() < 1e-9);
        assert_eq!(contacts[0].query_class, AtomClass::Nonpolar);

        let residues = complex.get_interface_residues();
        assert_eq!(residues.len(), 1);
        assert_eq!(residues[0].query.chain, "A");
        assert_eq!(residues[0].query.resi, 1);
        assert_eq!(residues[0].partner.chain, "B");
        assert_eq!(residues[0].contact_count, 1);

        let strict = InterfaceConfig::new("A", &["B"]);
        let complex = InterfaceComplex::new(&atoms, &strict).unwrap();
        assert!(complex.get_interface_residues().is_empty());
    }

    #[test]
    fn like_charges_never_contact() {
        let atoms = toy_pair(("LYS", "NZ", "N"), ("ARG", "NH1", "N"));
        let config = InterfaceConfig::new("A", &["B"]).with_min_contacts(1);
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();
        assert!(complex.get_atomic_contacts().is_empty());
    }

    #[test]
    fn opposite_charges_contact() {
        let atoms = toy_pair(("LYS", "NZ", "N"), ("ASP", "OD1", "O"));
        let config = InterfaceConfig::new("A", &["B"]).with_min_contacts(1);
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();
        assert_eq!(complex.get_atomic_contacts().len(), 1);
    }

    #[test]
    fn distant_neighbors_are_rejected() {
        // Same geometry as toy_pair but the pair is 7 Å apart, beyond Vd = 6.2
        let atoms = AtomTable::from_atoms([
            Atom::new("A", "ALA", 1, "CB", "C", (0.0, 0.0, 0.0)),
            Atom::new("B", "ALA", 1, "CB", "C", (7.0, 0.0, 0.0)),
            Atom::new("A", "ALA", 2, "CB", "C", (-20.0, 1.0, 2.0)),
            Atom::new("A", "ALA", 3, "CB", "C", (-18.0, 19.0, -3.0)),
            Atom::new("A", "ALA", 4, "CB", "C", (-22.0, -4.0, 21.0)),
        ]);
        let config = InterfaceConfig::new("A", &["B"]).with_min_contacts(1);
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();
        assert!(complex.neighbors().of(0).contains(&1));
        assert!(complex.get_atomic_contacts().is_empty());
    }

    #[test]
    fn chains_outside_selection_are_ignored() {
        let mut atoms: Vec<Atom> = toy_pair(("ALA", "CB", "C"), ("ALA", "CB", "C"))
            .atoms()
            .to_vec();
        atoms.push(Atom::new("C", "LEU", 5, "CD1", "C", (0.0, 10.0, 0.0)));
        atoms.push(Atom::new("D", "LEU", 6, "CD2", "C", (3.0, 10.0, 0.0)));
        atoms.push(Atom::new("C", "LEU", 7, "CD1", "C", (1.5, 2.5, 0.5)));
        let atoms = AtomTable::from_atoms(atoms);

        let config = InterfaceConfig::new("A", &["B"]).with_min_contacts(1);
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();
        for contact in complex.get_atomic_contacts() {
            let q = atoms.get(contact.query_atom).unwrap();
            let p = atoms.get(contact.partner_atom).unwrap();
            assert_eq!(q.chain_id, "A");
            assert_eq!(p.chain_id, "B");
        }
        for residue in complex.get_interface_residues() {
            assert_eq!(residue.query.chain, "A");
            assert!(residue.partners.iter().all(|p| p.residue.chain == "B"));
        }
    }

    #[test]
    fn missing_chains_are_a_hard_failure() {
        let atoms = toy_pair(("ALA", "CB", "C"), ("ALA", "CB", "C"));
        let no_partner = InterfaceConfig::new("A", &["H", "L"]);
        assert!(matches!(
            InterfaceComplex::new(&atoms, &no_partner),
            Err(InterfaceError::EmptyChainSelection { query_present: true, .. })
        ));
        let no_query = InterfaceConfig::new("X", &["B"]);
        assert!(matches!(
            InterfaceComplex::new(&atoms, &no_query),
            Err(InterfaceError::EmptyChainSelection { query_present: false, .. })
        ));
    }

    #[test]
    fn degenerate_geometry_gives_no_contacts() {
        let atoms = AtomTable::from_atoms([
            Atom::new("A", "ALA", 1, "CB", "C", (0.0, 0.0, 0.0)),
            Atom::new("B", "ALA", 1, "CB", "C", (3.0, 0.0, 0.0)),
            Atom::new("B", "ALA", 2, "CB", "C", (0.0, 3.0, 0.0)),
        ]);
        let config = InterfaceConfig::new("A", &["B"]).with_min_contacts(1);
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();
        assert!(complex.get_interface_residues().is_empty());
    }

    #[test]
    fn atom_limit() {
        let atoms = toy_pair(("ALA", "CB", "C"), ("ALA", "CB", "C"));
        let config = InterfaceConfig::new("A", &["B"]).with_max_atoms(3);
        assert!(matches!(
            InterfaceComplex::new(&atoms, &config),
            Err(InterfaceError::TooManyAtoms { atoms: 5, limit: 3 })
        ));
    }

    #[test]
    fn cutoff_method_agrees_on_toy_pair() {
        let atoms = toy_pair(("ALA", "CB", "C"), ("LEU", "CD1", "C"));
        let config = InterfaceConfig::new("A", &["B"])
            .with_min_contacts(1)
            .with_neighbor_method(NeighborMethod::Cutoff { radius: 8.0 });
        let complex = InterfaceComplex::new(&atoms, &config).unwrap();
        assert_eq!(complex.get_interface_residues().len(), 1);
    }
}
