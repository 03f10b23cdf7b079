//! Grouping of accepted contacts per query residue.

use super::{ContactRecord, InterfaceResidue, PartnerContact, ResidueKey};
use crate::atoms::AtomTable;
use std::collections::HashMap;
use tracing::trace;

/// Running totals for one query residue.
struct ResidueTally {
    query: ResidueKey,
    contact_count: usize,
    closest: usize,
    partners: Vec<PartnerContact>,
    partner_idx: HashMap<ResidueKey, usize>,
}

impl ResidueTally {
    fn new(query: ResidueKey) -> Self {
        Self {
            query,
            contact_count: 0,
            closest: 0,
            partners: Vec::new(),
            partner_idx: HashMap::new(),
        }
    }

    fn add(&mut self, partner: ResidueKey, contact: &ContactRecord) {
        self.contact_count += 1;
        let classes = (contact.query_class, contact.partner_class);

        let idx = *self.partner_idx.entry(partner.clone()).or_insert_with(|| {
            self.partners.push(PartnerContact {
                residue: partner,
                contact_count: 0,
                min_distance: f64::INFINITY,
                closest_classes: classes,
            });
            self.partners.len() - 1
        });

        let entry = &mut self.partners[idx];
        entry.contact_count += 1;
        if contact.distance < entry.min_distance {
            entry.min_distance = contact.distance;
            entry.closest_classes = classes;
        }
        let min_distance = entry.min_distance;
        if min_distance < self.partners[self.closest].min_distance {
            self.closest = idx;
        }
    }

    fn finish(self) -> InterfaceResidue {
        let closest = self.partners[self.closest].clone();
        InterfaceResidue {
            query: self.query,
            partner: closest.residue,
            contact_count: self.contact_count,
            min_distance: closest.min_distance,
            partners: self.partners,
        }
    }
}

/// Group accepted contacts by query residue and keep the well-supported ones.
///
/// Residues with fewer than `min_contacts` atom contacts are dropped; they
/// usually come from a single stray Voronoi neighbour. Residues are returned
/// in the order their first contact appears in `contacts`.
pub fn filter_match(
    contacts: &[ContactRecord],
    atoms: &AtomTable,
    min_contacts: usize,
) -> Vec<InterfaceResidue> {
    let mut tallies: Vec<ResidueTally> = Vec::new();
    let mut tally_idx: HashMap<ResidueKey, usize> = HashMap::new();

    for contact in contacts {
        let (Some(query_atom), Some(partner_atom)) =
            (atoms.get(contact.query_atom), atoms.get(contact.partner_atom))
        else {
            continue;
        };
        let query = ResidueKey::from_atom(query_atom);
        let idx = *tally_idx.entry(query.clone()).or_insert_with(|| {
            tallies.push(ResidueTally::new(query));
            tallies.len() - 1
        });
        tallies[idx].add(ResidueKey::from_atom(partner_atom), contact);
    }

    tallies
        .into_iter()
        .filter(|tally| {
            let keep = tally.contact_count >= min_contacts;
            trace!(
                "{} has {} contacts: {}",
                tally.query,
                tally.contact_count,
                if keep { "kept" } else { "dropped" }
            );
            keep
        })
        .map(ResidueTally::finish)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Atom;
    use crate::classes::AtomClass;

    fn contact(query_atom: usize, partner_atom: usize, distance: f64) -> ContactRecord {
        ContactRecord {
            query_atom,
            partner_atom,
            distance,
            reference: 6.2,
            query_class: AtomClass::Nonpolar,
            partner_class: AtomClass::Nonpolar,
        }
    }

    fn table() -> AtomTable {
        AtomTable::from_atoms([
            Atom::new("A", "TYR", 10, "CE1", "C", (0.0, 0.0, 0.0)),
            Atom::new("A", "TYR", 10, "CZ", "C", (0.0, 1.0, 0.0)),
            Atom::new("A", "GLY", 11, "CA", "C", (0.0, 2.0, 0.0)),
            Atom::new("H", "LEU", 99, "CD1", "C", (3.0, 0.0, 0.0)),
            Atom::new("L", "VAL", 50, "CG1", "C", (3.0, 1.0, 0.0)),
        ])
    }

    #[test]
    fn counts_and_breakdown() {
        let atoms = table();
        let contacts = vec![
            contact(2, 3, 4.0),
            contact(0, 3, 3.5),
            contact(0, 4, 3.2),
            contact(1, 4, 3.9),
            contact(1, 3, 3.6),
        ];
        let residues = filter_match(&contacts, &atoms, 1);
        assert_eq!(residues.len(), 2);

        // First-encountered order
        assert_eq!(residues[0].query.resi, 11);
        assert_eq!(residues[0].contact_count, 1);

        let tyr = &residues[1];
        assert_eq!(tyr.query.resn, "TYR");
        assert_eq!(tyr.contact_count, 4);
        assert_eq!(tyr.partner.chain, "L");
        assert!((tyr.min_distance - 3.2).abs() < 1e-12);
        assert_eq!(tyr.partners.len(), 2);
        assert_eq!(tyr.partners[0].residue.chain, "H");
        assert_eq!(tyr.partners[0].contact_count, 2);
        assert_eq!(tyr.partners[1].contact_count, 2);
    }

    #[test]
    fn threshold_drops_sparse_residues() {
        let atoms = table();
        let contacts = vec![contact(0, 3, 3.5), contact(2, 3, 4.0), contact(2, 4, 4.1)];
        let residues = filter_match(&contacts, &atoms, 2);
        assert_eq!(residues.len(), 1);
        assert_eq!(residues[0].query.resi, 11);
        assert!(filter_match(&contacts, &atoms, 3).is_empty());
    }
}
