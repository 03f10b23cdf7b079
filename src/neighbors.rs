//! Candidate contact pairs for every atom.

use crate::atoms::AtomTable;
use crate::tessellation::{Delaunay, GeometryError, DEADLINE_POLL};
use rstar::{primitives::GeomWithData, RTree};
use std::time::Instant;
use tracing::{debug, warn};

/// How candidate neighbours are found.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NeighborMethod {
    /// Atoms whose Voronoi cells share a facet (Delaunay edges).
    #[default]
    Voronoi,
    /// Every atom within `radius` Å, found with an R*-tree.
    Cutoff {
        /// Search radius in Å
        radius: f64,
    },
}

/// Neighbour lists indexed by atom table index.
///
/// Lists are sorted. Consumers must not assume the relation is symmetric.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NeighborSet {
    neighbors: Vec<Vec<usize>>,
}

impl NeighborSet {
    /// Wrap precomputed neighbour lists, removing self references.
    pub fn from_lists(mut neighbors: Vec<Vec<usize>>) -> Self {
        for (i, list) in neighbors.iter_mut().enumerate() {
            list.retain(|&j| j != i);
            list.sort_unstable();
            list.dedup();
        }
        Self { neighbors }
    }

    /// Every atom without neighbours.
    pub fn empty(n_atoms: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); n_atoms],
        }
    }

    /// Build the neighbour lists of all atoms in the table.
    ///
    /// Geometry too degenerate to tessellate is recovered locally: every atom
    /// gets an empty list. Only the deadline aborts, for either method.
    pub fn build(
        atoms: &AtomTable,
        method: NeighborMethod,
        deadline: Option<Instant>,
    ) -> Result<Self, GeometryError> {
        let coords = atoms.coordinates();
        let neighbors = match method {
            NeighborMethod::Voronoi => match Delaunay::build(&coords, deadline) {
                Ok(delaunay) => Self::from_lists(delaunay.neighbors()),
                Err(GeometryError::InsufficientGeometry { usable }) => {
                    warn!(
                        "Only {usable} usable atom positions out of {}; no neighbours assigned",
                        atoms.len()
                    );
                    Self::empty(atoms.len())
                }
                Err(e) => return Err(e),
            },
            NeighborMethod::Cutoff { radius } => cutoff_neighbors(atoms, radius, deadline)?,
        };

        debug!(
            "Built {:?} neighbour index with {} directed pairs",
            method,
            neighbors.pair_count()
        );
        Ok(neighbors)
    }

    /// Neighbours of the atom at `index`; empty for unknown indices.
    pub fn of(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of atoms covered.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the set covers no atoms.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Total number of (atom, neighbour) entries.
    pub fn pair_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum()
    }

    /// Iterate atoms in index order with their neighbour lists.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.neighbors
            .iter()
            .enumerate()
            .map(|(i, list)| (i, list.as_slice()))
    }
}

fn cutoff_neighbors(
    atoms: &AtomTable,
    radius: f64,
    deadline: Option<Instant>,
) -> Result<NeighborSet, GeometryError> {
    let tree = RTree::bulk_load(
        atoms
            .atoms()
            .iter()
            .map(|a| GeomWithData::new([a.x, a.y, a.z], a.index))
            .collect(),
    );
    let max_radius_squared = radius * radius;

    let mut lists = Vec::with_capacity(atoms.len());
    for (i, a) in atoms.atoms().iter().enumerate() {
        if i % DEADLINE_POLL == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(GeometryError::DeadlineExceeded);
        }
        lists.push(
            tree.locate_within_distance([a.x, a.y, a.z], max_radius_squared)
                .map(|x| x.data)
                .filter(|&j| j != a.index)
                .collect(),
        );
    }
    Ok(NeighborSet::from_lists(lists))
}
