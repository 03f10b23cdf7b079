//! Interface contact detection between a query chain and its partner chains.
//!
//! Candidate atom pairs come from the Voronoi neighbour index. A pair is an
//! accepted contact when the atoms are closer than their solvent-expanded
//! contact distance and their chemical classes are compatible. Accepted
//! contacts are then aggregated per query residue.
pub mod aggregate;
pub mod complex;
pub mod contact;
pub mod structs;

// Re-exports
pub use crate::classes::compatible;
pub use aggregate::filter_match;
pub use complex::*;
pub use contact::{inter, vdw_radius, ContactRecord};
pub use structs::*;

use crate::atoms::AtomTable;
use crate::config::InterfaceConfig;
use crate::error::InterfaceError;
use crate::utils::checked_i32;
use pdbtbx::PDB;
use polars::prelude::*;
use tracing::debug;

/// Find the interface residues of the query chain in a structure.
///
/// Only the query and partner chains are read from the structure; see
/// [`AtomTable::from_pdb`] for how atoms are selected.
///
/// # Arguments
///
/// * `pdb` - Reference to a PDB structure
/// * `config` - Query chain, partner chains and contact settings
///
/// # Errors
///
/// Returns [`InterfaceError::EmptyChainSelection`] when the query chain or all
/// partner chains are absent, and [`InterfaceError::InvalidConfig`] for out of
/// range settings.
///
/// # Example
///
/// ```no_run
/// use epicontacts::{get_interface_residues, load_model, InterfaceConfig};
///
/// let (pdb, _warnings) = load_model("path/to/complex.pdb").unwrap();
/// let config = InterfaceConfig::new("A", &["H", "L"]);
/// for residue in get_interface_residues(&pdb, &config).unwrap() {
///     println!("{}", residue.token());
/// }
/// ```
pub fn get_interface_residues(
    pdb: &PDB,
    config: &InterfaceConfig,
) -> Result<Vec<InterfaceResidue>, InterfaceError> {
    config.validate()?;
    let atoms = AtomTable::from_pdb(pdb, &config.selected_chains());
    let complex = InterfaceComplex::new(&atoms, config)?;
    Ok(complex.get_interface_residues())
}

/// Interface residues as a Polars `DataFrame`.
///
/// Columns: `query_chain`, `query_resn`, `query_resi`, `query_insertion`,
/// `partner_chain`, `partner_resn`, `partner_resi`, `partner_insertion`,
/// `contact_count`, `min_distance`.
pub fn get_interface_df(pdb: &PDB, config: &InterfaceConfig) -> Result<DataFrame, InterfaceError> {
    let residues = get_interface_residues(pdb, config)?;
    let df = residues_to_df(&residues)?;
    debug!("Interface residues\n{}", df);
    Ok(df)
}

/// Accepted atom contacts of the query chain as a Polars `DataFrame`.
///
/// Columns: `distance`, `reference`, then `from_*` and `to_*` chain, residue
/// name, residue number, insertion code, atom name, atom serial and class.
pub fn get_atomic_contacts_df(
    pdb: &PDB,
    config: &InterfaceConfig,
) -> Result<DataFrame, InterfaceError> {
    config.validate()?;
    let atoms = AtomTable::from_pdb(pdb, &config.selected_chains());
    let complex = InterfaceComplex::new(&atoms, config)?;
    let contacts = complex.get_atomic_contacts();
    contacts_to_df(&contacts, &atoms)
}

/// Convert interface residues into a Polars `DataFrame`.
pub(crate) fn residues_to_df(res: &[InterfaceResidue]) -> Result<DataFrame, InterfaceError> {
    let df = df!(
        "query_chain" => res.iter().map(|x| x.query.chain.clone()).collect::<Vec<String>>(),
        "query_resn" => res.iter().map(|x| x.query.resn.clone()).collect::<Vec<String>>(),
        "query_resi" => res.iter().map(|x| checked_i32(x.query.resi)).collect::<Result<Vec<i32>, _>>()?,
        "query_insertion" => res.iter().map(|x| x.query.insertion.clone()).collect::<Vec<String>>(),
        "partner_chain" => res.iter().map(|x| x.partner.chain.clone()).collect::<Vec<String>>(),
        "partner_resn" => res.iter().map(|x| x.partner.resn.clone()).collect::<Vec<String>>(),
        "partner_resi" => res.iter().map(|x| checked_i32(x.partner.resi)).collect::<Result<Vec<i32>, _>>()?,
        "partner_insertion" => res.iter().map(|x| x.partner.insertion.clone()).collect::<Vec<String>>(),
        "contact_count" => res.iter().map(|x| x.contact_count as u32).collect::<Vec<u32>>(),
        "min_distance" => res.iter().map(|x| x.min_distance as f32).collect::<Vec<f32>>(),
    )?;
    Ok(df)
}

/// Convert atom contacts into a Polars `DataFrame`.
pub(crate) fn contacts_to_df(
    res: &[ContactRecord],
    atoms: &AtomTable,
) -> Result<DataFrame, InterfaceError> {
    let pairs: Vec<(&crate::atoms::Atom, &crate::atoms::Atom, &ContactRecord)> = res
        .iter()
        .filter_map(|c| Some((atoms.get(c.query_atom)?, atoms.get(c.partner_atom)?, c)))
        .collect();

    let df = df!(
        "distance" => pairs.iter().map(|x| x.2.distance as f32).collect::<Vec<f32>>(),
        "reference" => pairs.iter().map(|x| x.2.reference as f32).collect::<Vec<f32>>(),
        "from_chain" => pairs.iter().map(|x| x.0.chain_id.clone()).collect::<Vec<String>>(),
        "from_resn" => pairs.iter().map(|x| x.0.residue_name.clone()).collect::<Vec<String>>(),
        "from_resi" => pairs.iter().map(|x| checked_i32(x.0.residue_number)).collect::<Result<Vec<i32>, _>>()?,
        "from_insertion" => pairs.iter().map(|x| x.0.insertion_code.clone()).collect::<Vec<String>>(),
        "from_atomn" => pairs.iter().map(|x| x.0.atom_name.clone()).collect::<Vec<String>>(),
        "from_atomi" => pairs.iter().map(|x| x.0.serial as u32).collect::<Vec<u32>>(),
        "from_class" => pairs.iter().map(|x| x.2.query_class.to_string()).collect::<Vec<String>>(),
        "to_chain" => pairs.iter().map(|x| x.1.chain_id.clone()).collect::<Vec<String>>(),
        "to_resn" => pairs.iter().map(|x| x.1.residue_name.clone()).collect::<Vec<String>>(),
        "to_resi" => pairs.iter().map(|x| checked_i32(x.1.residue_number)).collect::<Result<Vec<i32>, _>>()?,
        "to_insertion" => pairs.iter().map(|x| x.1.insertion_code.clone()).collect::<Vec<String>>(),
        "to_atomn" => pairs.iter().map(|x| x.1.atom_name.clone()).collect::<Vec<String>>(),
        "to_atomi" => pairs.iter().map(|x| x.1.serial as u32).collect::<Vec<u32>>(),
        "to_class" => pairs.iter().map(|x| x.2.partner_class.to_string()).collect::<Vec<String>>(),
    )?;
    Ok(df)
}
