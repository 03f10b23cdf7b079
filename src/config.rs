//! Settings for one interface analysis.

use crate::error::InterfaceError;
use crate::neighbors::NeighborMethod;
use crate::utils::parse_chain_selection;
use std::time::Duration;

/// Minimum number of atom contacts for a residue to count as interface.
pub const DEFAULT_MIN_CONTACTS: usize = 4;
/// Radius of a water probe in Å
pub const DEFAULT_SOLVENT_RADIUS: f64 = 1.4;

/// Chain selection and contact criteria for one analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceConfig {
    /// Chain whose interface residues are reported
    pub query_chain: String,
    /// Chains the query chain is tested against
    pub interact_chains: Vec<String>,
    /// Residues with fewer accepted atom contacts are dropped
    pub min_contacts: usize,
    /// Solvent-exclusion radius added to both atoms in the contact test (Å)
    pub solvent_radius: f64,
    /// How candidate atom pairs are found
    pub neighbor_method: NeighborMethod,
    /// Give up building the neighbour index after this long
    pub deadline: Option<Duration>,
    /// Refuse atom tables larger than this
    pub max_atoms: Option<usize>,
}

impl InterfaceConfig {
    /// Defaults: 4 contacts, 1.4 Å solvent radius, Voronoi neighbours, no limits.
    pub fn new(query_chain: &str, interact_chains: &[&str]) -> Self {
        Self {
            query_chain: query_chain.to_string(),
            interact_chains: interact_chains.iter().map(|c| c.to_string()).collect(),
            min_contacts: DEFAULT_MIN_CONTACTS,
            solvent_radius: DEFAULT_SOLVENT_RADIUS,
            neighbor_method: NeighborMethod::default(),
            deadline: None,
            max_atoms: None,
        }
    }

    /// Build a configuration from a selection such as `A/H,L`.
    ///
    /// See [`parse_chain_selection`] for the accepted format.
    pub fn from_selection(selection: &str) -> Result<Self, InterfaceError> {
        let (query, partners) = parse_chain_selection(selection)?;
        let partners: Vec<&str> = partners.iter().map(String::as_str).collect();
        Ok(Self::new(&query, &partners))
    }

    /// Set the minimum number of contacts per reported residue.
    pub fn with_min_contacts(mut self, min_contacts: usize) -> Self {
        self.min_contacts = min_contacts;
        self
    }

    /// Set the solvent-exclusion radius in Å.
    pub fn with_solvent_radius(mut self, solvent_radius: f64) -> Self {
        self.solvent_radius = solvent_radius;
        self
    }

    /// Choose how candidate atom pairs are found.
    pub fn with_neighbor_method(mut self, method: NeighborMethod) -> Self {
        self.neighbor_method = method;
        self
    }

    /// Abort neighbour index construction after `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Refuse structures with more than `max_atoms` selected atoms.
    pub fn with_max_atoms(mut self, max_atoms: usize) -> Self {
        self.max_atoms = Some(max_atoms);
        self
    }

    /// Query chain followed by the partner chains.
    pub fn selected_chains(&self) -> Vec<String> {
        std::iter::once(self.query_chain.clone())
            .chain(self.interact_chains.iter().cloned())
            .collect()
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), InterfaceError> {
        if self.query_chain.is_empty() {
            return Err(InterfaceError::InvalidConfig(
                "query chain must not be empty".to_string(),
            ));
        }
        if self.interact_chains.is_empty() {
            return Err(InterfaceError::InvalidConfig(
                "at least one interacting chain is required".to_string(),
            ));
        }
        if self.interact_chains.contains(&self.query_chain) {
            return Err(InterfaceError::InvalidConfig(format!(
                "query chain {} is also listed as an interacting chain",
                self.query_chain
            )));
        }
        if self.min_contacts == 0 {
            return Err(InterfaceError::InvalidConfig(
                "min_contacts must be at least 1".to_string(),
            ));
        }
        if !self.solvent_radius.is_finite() || self.solvent_radius < 0.0 {
            return Err(InterfaceError::InvalidConfig(format!(
                "solvent radius must be a non-negative number, got {}",
                self.solvent_radius
            )));
        }
        if let NeighborMethod::Cutoff { radius } = self.neighbor_method {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(InterfaceError::InvalidConfig(format!(
                    "neighbour cutoff must be positive, got {radius}"
                )));
            }
        }
        Ok(())
    }
}
