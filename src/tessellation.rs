//! Incremental 3-D Delaunay tessellation of atom centres.
//!
//! The Delaunay tessellation is the dual of the Voronoi diagram: two atoms
//! share a Delaunay edge exactly when their Voronoi cells share a facet. The
//! tessellation is built with the Bowyer-Watson algorithm, starting from a
//! super-tetrahedron that encloses every point and inserting points one at a
//! time. Each insertion removes the tetrahedra whose circumsphere contains
//! the new point and re-triangulates the resulting cavity.
//!
//! ## References
//!
//! - Bowyer, A. (1981) Computing Dirichlet tessellations
//! - Watson, D. F. (1981) Computing the n-dimensional Delaunay tessellation
//!   with application to Voronoi polytopes

use nalgebra::Vector3;
use robust::{insphere, orient3d, Coord3D};
use rstar::{primitives::GeomWithData, RTree};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

/// Points closer than this (Å) are treated as the same point.
pub const COINCIDENT_TOL: f64 = 1e-6;
/// Relative tolerance for collinear and coplanar inputs.
const DEGENERACY_TOL: f64 = 1e-9;
/// Distance of the super-tetrahedron vertices in units of the point cloud extent.
const SUPER_SCALE: f64 = 100.0;
/// Number of insertions between deadline checks.
pub(crate) const DEADLINE_POLL: usize = 64;

/// Failures of the tessellation itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Fewer than four distinct, non-coplanar points.
    #[error("need at least 4 non-coplanar points for a 3-D tessellation, found {usable} usable")]
    InsufficientGeometry {
        /// Number of distinct points available.
        usable: usize,
    },
    /// The deadline passed while building the neighbour index.
    #[error("tessellation deadline exceeded")]
    DeadlineExceeded,
}

/// A tetrahedron with positive [`orient3d`] orientation.
#[derive(Debug, Clone)]
struct Tetrahedron {
    vertices: [usize; 4],
    /// `neighbors[k]` shares the face opposite `vertices[k]`
    neighbors: [Option<usize>; 4],
    alive: bool,
}

impl Tetrahedron {
    /// Order `vertices` positively; they must not be coplanar.
    fn new(mut vertices: [usize; 4], points: &[Vector3<f64>]) -> Self {
        if orientation(points, &vertices) < 0.0 {
            vertices.swap(0, 1);
        }
        Self {
            vertices,
            neighbors: [None; 4],
            alive: true,
        }
    }

    /// The three vertices of the face opposite `vertices[k]`.
    fn face(&self, k: usize) -> [usize; 3] {
        [
            self.vertices[(k + 1) % 4],
            self.vertices[(k + 2) % 4],
            self.vertices[(k + 3) % 4],
        ]
    }
}

/// Delaunay tessellation over a set of points.
///
/// Orientation and in-sphere tests use exact adaptive predicates. Points on
/// a common sphere are resolved by symbolic perturbation: the lifted image
/// of point `i` is raised by an infinitesimal that grows with `i`, so every
/// in-sphere test has a definite answer and ties are broken the same way
/// from every tetrahedron.
pub struct Delaunay {
    /// Distinct points followed by the four super vertices
    points: Vec<Vector3<f64>>,
    /// Maps a distinct point back to its input index
    input_index: Vec<usize>,
    n_inputs: usize,
    tetrahedra: Vec<Tetrahedron>,
    free_slots: Vec<usize>,
    last_created: usize,
}

impl Delaunay {
    /// Tessellate `points`, optionally giving up once `deadline` has passed.
    ///
    /// Coincident points are dropped from the tessellation; they end up with
    /// no neighbours.
    pub fn build(points: &[Vector3<f64>], deadline: Option<Instant>) -> Result<Self, GeometryError> {
        let (unique, input_index) = distinct_points(points);
        if unique.len() < 4 || !has_volume(&unique) {
            return Err(GeometryError::InsufficientGeometry {
                usable: unique.len(),
            });
        }

        let n_unique = unique.len();
        let mut working = unique.clone();
        working.extend(super_vertices(&unique));

        let root = Tetrahedron::new(
            [n_unique, n_unique + 1, n_unique + 2, n_unique + 3],
            &working,
        );
        let mut delaunay = Self {
            points: working,
            input_index,
            n_inputs: points.len(),
            tetrahedra: vec![root],
            free_slots: Vec::new(),
            last_created: 0,
        };

        for i in 0..n_unique {
            if i % DEADLINE_POLL == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(GeometryError::DeadlineExceeded);
            }
            delaunay.insert(i);
        }

        debug!(
            "Tessellated {} points into {} tetrahedra",
            n_unique,
            delaunay.tetrahedra.iter().filter(|t| t.alive).count()
        );
        Ok(delaunay)
    }

    /// Delaunay edges per input point, in input indices.
    ///
    /// Lists are sorted and free of duplicates. Edges to the super vertices
    /// are dropped.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let n_unique = self.input_index.len();
        let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.n_inputs];

        for tet in self.tetrahedra.iter().filter(|t| t.alive) {
            for a in 0..4 {
                for b in (a + 1)..4 {
                    let (va, vb) = (tet.vertices[a], tet.vertices[b]);
                    if va >= n_unique || vb >= n_unique {
                        continue;
                    }
                    let (ia, ib) = (self.input_index[va], self.input_index[vb]);
                    adjacency[ia].insert(ib);
                    adjacency[ib].insert(ia);
                }
            }
        }

        adjacency
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect()
    }

    /// Number of tetrahedra with four real vertices.
    pub fn tetrahedron_count(&self) -> usize {
        self.real_tetrahedra().count()
    }

    fn real_tetrahedra(&self) -> impl Iterator<Item = &Tetrahedron> {
        let n_unique = self.input_index.len();
        self.tetrahedra
            .iter()
            .filter(move |t| t.alive && t.vertices.iter().all(|&v| v < n_unique))
    }

    /// Whether `point` lies inside the circumsphere of tetrahedron `t`.
    fn conflicts(&self, t: usize, point: usize) -> bool {
        let v = self.tetrahedra[t].vertices;
        let det = insphere(
            coord(&self.points[v[0]]),
            coord(&self.points[v[1]]),
            coord(&self.points[v[2]]),
            coord(&self.points[v[3]]),
            coord(&self.points[point]),
        );
        if det != 0.0 {
            return det > 0.0;
        }

        // Co-spherical: the most perturbed point decides. Raising `point`
        // moves it outside; raising vertex k pulls `point` inside exactly
        // when `point` is on the same side of the opposite face as vertex k.
        let mut order = [v[0], v[1], v[2], v[3], point];
        order.sort_unstable_by(|a, b| b.cmp(a));
        for q in order {
            if q == point {
                return false;
            }
            let Some(k) = v.iter().position(|&x| x == q) else {
                continue;
            };
            let mut moved = v;
            moved[k] = point;
            let o = orientation(&self.points, &moved);
            if o != 0.0 {
                return o > 0.0;
            }
        }
        false
    }

    fn insert(&mut self, point: usize) {
        let seed = self.locate(point);

        // Grow the cavity from the seed through face-adjacent tetrahedra
        let mut cavity: HashSet<usize> = HashSet::from([seed]);
        let mut stack = vec![seed];
        let mut rejected: HashSet<usize> = HashSet::new();
        while let Some(t) = stack.pop() {
            for n in self.tetrahedra[t].neighbors.into_iter().flatten() {
                if cavity.contains(&n) || rejected.contains(&n) {
                    continue;
                }
                if self.conflicts(n, point) {
                    cavity.insert(n);
                    stack.push(n);
                } else {
                    rejected.insert(n);
                }
            }
        }

        // Faces on the cavity boundary and the tetrahedra across them
        let mut boundary: Vec<([usize; 3], Option<usize>, usize)> = Vec::new();
        let mut ordered: Vec<usize> = cavity.iter().copied().collect();
        ordered.sort_unstable();
        for &t in &ordered {
            let tet = &self.tetrahedra[t];
            for k in 0..4 {
                let outside = tet.neighbors[k];
                if outside.is_some_and(|n| cavity.contains(&n)) {
                    continue;
                }
                boundary.push((tet.face(k), outside, t));
            }
        }
        trace!(
            "Point {point}: cavity of {} tetrahedra, {} boundary faces",
            ordered.len(),
            boundary.len()
        );

        for &t in &ordered {
            self.tetrahedra[t].alive = false;
        }

        // Fill the cavity with a fan of tetrahedra around the new point
        let mut open_faces: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        for (face, outside, old) in boundary {
            let mut tet = Tetrahedron::new([face[0], face[1], face[2], point], &self.points);
            tet.neighbors[3] = outside;
            let base = [tet.vertices[0], tet.vertices[1], tet.vertices[2]];
            let id = self.allocate(tet);

            if let Some(n) = outside {
                if let Some(slot) = self.tetrahedra[n]
                    .neighbors
                    .iter()
                    .position(|x| *x == Some(old))
                {
                    self.tetrahedra[n].neighbors[slot] = Some(id);
                }
            }

            // The face opposite base[i] holds the point and the other two base vertices
            for i in 0..3 {
                let (a, b) = (base[(i + 1) % 3], base[(i + 2) % 3]);
                let key = (a.min(b), a.max(b));
                if let Some((other, other_slot)) = open_faces.remove(&key) {
                    self.tetrahedra[id].neighbors[i] = Some(other);
                    self.tetrahedra[other].neighbors[other_slot] = Some(id);
                } else {
                    open_faces.insert(key, (id, i));
                }
            }
            self.last_created = id;
        }

        // Slots are only reused by later insertions, once nothing points at them
        self.free_slots.extend(ordered);
    }

    fn allocate(&mut self, tet: Tetrahedron) -> usize {
        match self.free_slots.pop() {
            Some(slot) => {
                self.tetrahedra[slot] = tet;
                slot
            }
            None => {
                self.tetrahedra.push(tet);
                self.tetrahedra.len() - 1
            }
        }
    }

    /// Find a live tetrahedron whose circumsphere contains `point`.
    ///
    /// Walks from the most recently created tetrahedron towards the point,
    /// falling back to a linear scan if the walk does not converge.
    fn locate(&self, point: usize) -> usize {
        let at = |v: usize| coord(&self.points[v]);
        let max_steps = self.tetrahedra.len() + 16;
        let mut current = self.last_created;

        for _ in 0..max_steps {
            if self.conflicts(current, point) {
                return current;
            }
            let tet = &self.tetrahedra[current];
            let next = (0..4).find_map(|k| {
                let [a, b, c] = tet.face(k);
                let inner = orient3d(at(a), at(b), at(c), at(tet.vertices[k]));
                let side = orient3d(at(a), at(b), at(c), at(point));
                if inner * side < 0.0 {
                    tet.neighbors[k]
                } else {
                    None
                }
            });
            match next {
                Some(n) => current = n,
                None => break,
            }
        }

        (0..self.tetrahedra.len())
            .find(|&t| self.tetrahedra[t].alive && self.conflicts(t, point))
            .unwrap_or(self.last_created)
    }
}

fn coord(p: &Vector3<f64>) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// Exact orientation of four points; positive for a positively ordered tetrahedron.
fn orientation(points: &[Vector3<f64>], v: &[usize; 4]) -> f64 {
    orient3d(
        coord(&points[v[0]]),
        coord(&points[v[1]]),
        coord(&points[v[2]]),
        coord(&points[v[3]]),
    )
}

/// Drop points that coincide with an earlier point.
///
/// Returns the distinct points and, for each, its index in the input.
fn distinct_points(points: &[Vector3<f64>]) -> (Vec<Vector3<f64>>, Vec<usize>) {
    let mut tree: RTree<GeomWithData<[f64; 3], usize>> = RTree::new();
    let mut unique = Vec::with_capacity(points.len());
    let mut input_index = Vec::with_capacity(points.len());

    for (i, p) in points.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            continue;
        }
        let key = [p.x, p.y, p.z];
        if tree
            .locate_within_distance(key, COINCIDENT_TOL * COINCIDENT_TOL)
            .next()
            .is_some()
        {
            continue;
        }
        tree.insert(GeomWithData::new(key, i));
        unique.push(*p);
        input_index.push(i);
    }

    if unique.len() < points.len() {
        debug!(
            "Dropped {} coincident or non-finite points",
            points.len() - unique.len()
        );
    }
    (unique, input_index)
}

/// Check whether the points span a 3-D volume.
fn has_volume(points: &[Vector3<f64>]) -> bool {
    let extent = bounding_extent(points);
    if extent == 0.0 {
        return false;
    }
    let a = points[0];
    let Some(b) = points
        .iter()
        .find(|p| (*p - a).norm() > DEGENERACY_TOL * extent)
    else {
        return false;
    };
    let ab = b - a;
    let Some(c) = points
        .iter()
        .find(|p| ab.cross(&(*p - a)).norm() > DEGENERACY_TOL * extent * extent)
    else {
        return false;
    };
    let volume_tol = DEGENERACY_TOL * extent * extent * extent;
    points
        .iter()
        .any(|p| orient3d(coord(&a), coord(b), coord(c), coord(p)).abs() > volume_tol)
}

fn bounding_extent(points: &[Vector3<f64>]) -> f64 {
    let (min, max) = bounds(points);
    (max - min).norm()
}

fn bounds(points: &[Vector3<f64>]) -> (Vector3<f64>, Vector3<f64>) {
    points.iter().fold(
        (
            Vector3::repeat(f64::INFINITY),
            Vector3::repeat(f64::NEG_INFINITY),
        ),
        |(min, max), p| (min.inf(p), max.sup(p)),
    )
}

/// Vertices of a regular tetrahedron enclosing the points with a wide margin.
fn super_vertices(points: &[Vector3<f64>]) -> [Vector3<f64>; 4] {
    let (min, max) = bounds(points);
    let center = (min + max) / 2.0;
    let scale = SUPER_SCALE * (bounding_extent(points) + 1.0);
    [
        center + Vector3::new(1.0, 1.0, 1.0) * scale,
        center + Vector3::new(1.0, -1.0, -1.0) * scale,
        center + Vector3::new(-1.0, 1.0, -1.0) * scale,
        center + Vector3::new(-1.0, -1.0, 1.0) * scale,
    ]
}
