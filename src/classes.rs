//! Coarse chemical classes of protein atoms and their pairing rules.

use crate::atoms::Atom;
use core::fmt;

/// Chemical category of an atom, used to reject chemically implausible contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomClass {
    /// Carbons and sulfurs of side chains
    Nonpolar,
    /// Side chain nitrogens and oxygens that carry no formal charge, including His
    PolarNeutral,
    /// Ionizable groups positively charged at pH 7.0
    PolarPositive,
    /// Ionizable groups negatively charged at pH 7.0
    PolarNegative,
    /// Main-chain atoms
    Backbone,
    /// Atoms the classifier cannot place
    Unknown,
}

impl fmt::Display for AtomClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AtomClass::Nonpolar => "nonpolar",
            AtomClass::PolarNeutral => "polar",
            AtomClass::PolarPositive => "positive",
            AtomClass::PolarNegative => "negative",
            AtomClass::Backbone => "backbone",
            AtomClass::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Classify an atom from its residue name, atom name and element.
///
/// Standard amino acids are looked up by residue and atom name. Everything
/// else falls back to the element.
pub fn classify(res_name: &str, atom_name: &str, element: &str) -> AtomClass {
    if is_backbone(atom_name) {
        return AtomClass::Backbone;
    }
    if is_pos_ionizable(res_name, atom_name) {
        return AtomClass::PolarPositive;
    }
    if is_neg_ionizable(res_name, atom_name) {
        return AtomClass::PolarNegative;
    }
    if is_polar_neutral(res_name, atom_name) {
        return AtomClass::PolarNeutral;
    }
    if is_standard_residue(res_name) {
        // Remaining side chain atoms of standard residues are carbons or Met SD
        return match element {
            "C" | "S" => AtomClass::Nonpolar,
            "N" | "O" => AtomClass::PolarNeutral,
            _ => AtomClass::Unknown,
        };
    }
    match element {
        "C" | "S" | "SE" => AtomClass::Nonpolar,
        "N" | "O" => AtomClass::PolarNeutral,
        _ => AtomClass::Unknown,
    }
}

/// Shorthand for [`classify`] on an [`Atom`].
pub fn classify_atom(atom: &Atom) -> AtomClass {
    classify(&atom.residue_name, &atom.atom_name, &atom.element)
}

/// Pairing rules between two atom classes.
///
/// `Unknown` pairs with nothing, which avoids false-positive contacts from
/// atoms the classifier cannot place. Like charges repel. Every other pair
/// of known classes is compatible. The relation is symmetric.
pub fn compatible(c1: AtomClass, c2: AtomClass) -> bool {
    use AtomClass::*;
    !matches!(
        (c1, c2),
        (Unknown, _)
            | (_, Unknown)
            | (PolarPositive, PolarPositive)
            | (PolarNegative, PolarNegative)
    )
}

fn is_backbone(atom_name: &str) -> bool {
    matches!(atom_name, "N" | "CA" | "C" | "O" | "OXT")
}

/// Check if the atom belongs to a group positively charged at pH 7.0.
///
/// His (pKa ~6) is mostly neutral at pH 7.0 and is classed as polar neutral.
fn is_pos_ionizable(res_name: &str, atom_name: &str) -> bool {
    matches!(
        (res_name, atom_name),
        ("ARG", "NE" | "NH1" | "NH2") | ("LYS", "NZ")
    )
}

/// Check if the atom belongs to a group negatively charged at pH 7.0.
fn is_neg_ionizable(res_name: &str, atom_name: &str) -> bool {
    matches!(
        (res_name, atom_name),
        ("ASP", "OD1" | "OD2") | ("GLU", "OE1" | "OE2")
    )
}

fn is_polar_neutral(res_name: &str, atom_name: &str) -> bool {
    matches!(
        (res_name, atom_name),
        ("SER", "OG")
            | ("THR", "OG1")
            | ("TYR", "OH")
            | ("ASN", "OD1" | "ND2")
            | ("GLN", "OE1" | "NE2")
            | ("HIS", "ND1" | "NE2")
            | ("TRP", "NE1")
            | ("CYS", "SG")
    )
}

fn is_standard_residue(res_name: &str) -> bool {
    matches!(
        res_name,
        "ALA"
            | "ARG"
            | "ASN"
            | "ASP"
            | "CYS"
            | "GLN"
            | "GLU"
            | "GLY"
            | "HIS"
            | "ILE"
            | "LEU"
            | "LYS"
            | "MET"
            | "PHE"
            | "PRO"
            | "SER"
            | "THR"
            | "TRP"
            | "TYR"
            | "VAL"
    )
}
