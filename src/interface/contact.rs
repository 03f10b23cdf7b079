//! The atom-pair contact test.

use crate::atoms::Atom;
use crate::classes::AtomClass;
use pdbtbx::Element;

/// Radius used when neither table knows the element.
const FALLBACK_VDW_RADIUS: f64 = 1.8;

/// An accepted atom-atom contact across the interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    /// Table index of the query-chain atom
    pub query_atom: usize,
    /// Table index of the partner-chain atom
    pub partner_atom: usize,
    /// Centre-to-centre distance (Ad)
    pub distance: f64,
    /// Distance at which the solvent-expanded spheres touch (Vd)
    pub reference: f64,
    /// Class of the query atom
    pub query_class: AtomClass,
    /// Class of the partner atom
    pub partner_class: AtomClass,
}

/// Bondi van der Waals radius of an element in Å.
///
/// Elements outside the common biomolecular set use the radius shipped with
/// `pdbtbx`.
pub fn vdw_radius(element: &str) -> f64 {
    match element {
        "H" | "D" => 1.20,
        "C" => 1.70,
        "N" => 1.55,
        "O" => 1.52,
        "S" => 1.80,
        "SE" => 1.90,
        "P" => 1.80,
        _ => Element::from_symbol(element)
            .and_then(|e| e.atomic_radius().van_der_waals)
            .unwrap_or(FALLBACK_VDW_RADIUS),
    }
}

/// Compute the actual distance `Ad` and the contact distance `Vd` of two atoms.
///
/// `Vd` is the separation at which the two atoms touch once each van der
/// Waals sphere is grown by `solvent_radius`: a gap narrower than one probe
/// diameter cannot hold solvent, so the atoms are packed against each other.
/// Callers only pass Voronoi neighbours, so no third atom sits between them.
pub fn inter(a: &Atom, b: &Atom, solvent_radius: f64) -> (f64, f64) {
    let ad = a.distance(b);
    let vd = vdw_radius(&a.element) + vdw_radius(&b.element) + 2.0 * solvent_radius;
    (ad, vd)
}
