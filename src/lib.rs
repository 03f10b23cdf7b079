#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

//! # Epicontacts Library
//!
//! This library finds the residues of a query chain (typically an antigen)
//! that touch a set of partner chains (typically antibody heavy and light
//! chains) in PDB and mmCIF files.
//!
//! Candidate atom pairs are the neighbours of a 3-D Delaunay tessellation,
//! i.e. atoms whose Voronoi cells share a facet. A pair is a contact when
//! the atoms are closer than their solvent-expanded van der Waals contact
//! distance and their chemical classes can interact. Contacts are grouped
//! per query residue and residues with too few contacts are dropped.
//!
//! Results are plain Rust values, or Polars DataFrames which can be written
//! to various output formats.

mod atoms;
mod batch;
mod chains;
mod classes;
mod config;
mod error;
mod interface;
mod neighbors;
mod residues;
mod sequences;
mod tessellation;
mod utils;

// Re-export key public types
pub use atoms::{Atom, AtomTable};
pub use batch::{get_interface_batch, BatchEntry};
pub use chains::ChainExt;
pub use classes::{classify, classify_atom, AtomClass};
pub use config::{InterfaceConfig, DEFAULT_MIN_CONTACTS, DEFAULT_SOLVENT_RADIUS};
pub use error::InterfaceError;
pub use interface::{
    compatible, filter_match, get_atomic_contacts_df, get_interface_df, get_interface_residues,
    inter, vdw_radius, ContactRecord, Interface, InterfaceComplex, InterfaceResidue,
    PartnerContact, ResidueKey,
};
pub use neighbors::{NeighborMethod, NeighborSet};
pub use residues::ResidueExt;
pub use sequences::{epitope_tokens, get_sequences, highlight_residues, residue_index_map};
pub use tessellation::{Delaunay, GeometryError};
pub use utils::{
    load_model, parse_chain_selection, run_with_threads, write_df_to_file, DataFrameFileType,
};
