//! Error types for interface analysis.

use crate::tessellation::GeometryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the analysis of a single structure.
///
/// Failures local to one atom or one atom pair never surface here; they are
/// absorbed where they happen (the atom is excluded or the pair skipped).
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// The structure file could not be read by the parser.
    #[error("failed to read structure {path}: {details}")]
    StructureRead {
        /// Path of the structure file.
        path: PathBuf,
        /// Parser messages joined together.
        details: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A chain selection string could not be parsed.
    #[error("invalid chain selection: {0}")]
    InvalidChainSelection(String),

    /// The query chain or every partner chain is missing from the atom table.
    #[error(
        "no interface possible: query chain {query_chain} present = {query_present}, partner chains {partner_chains:?} present = {partners_present:?}"
    )]
    EmptyChainSelection {
        /// Configured query chain.
        query_chain: String,
        /// Whether the query chain has any atom.
        query_present: bool,
        /// Configured partner chains.
        partner_chains: Vec<String>,
        /// Partner chains that have at least one atom.
        partners_present: Vec<String>,
    },

    /// The atom table is larger than the configured bound.
    #[error("{atoms} atoms exceed the configured limit of {limit}")]
    TooManyAtoms {
        /// Number of atoms in the table.
        atoms: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The configured deadline passed before the neighbour index was built.
    #[error("analysis deadline exceeded")]
    DeadlineExceeded,

    /// The neighbour index could not be built.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// DataFrame construction or serialisation failed.
    #[error("dataframe error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Writing results failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
