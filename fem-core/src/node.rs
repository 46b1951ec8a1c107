//! Mesh nodes.
//!
//! A node is an identifier plus a coordinate vector whose dimension (1, 2 or
//! 3) is fixed at construction. Nodes compare and sort by identifier only.

use crate::error::{Error, Result};
use crate::types::{Point3, MAX_DIM};
use std::cmp::Ordering;

/// A point of the mesh with a stable identifier.
#[derive(Debug, Clone)]
pub struct Node {
    /// Position in the topology input.
    id: usize,
    /// Spatial dimension.
    dim: usize,
    /// Coordinates; components `dim..3` are unused and kept at zero.
    coords: Point3,
    /// Lies on an essential (Dirichlet) boundary.
    essential: bool,
}

impl Node {
    /// Create a placeholder node with every used coordinate set to 1.0.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is not in 1..=3.
    pub fn new(id: usize, dim: usize) -> Self {
        assert!(
            (1..=MAX_DIM).contains(&dim),
            "Node dimension must be 1, 2 or 3, got {}",
            dim
        );
        let mut coords = Point3::zeros();
        for i in 0..dim {
            coords[i] = 1.0;
        }
        Self {
            id,
            dim,
            coords,
            essential: false,
        }
    }

    /// Create a node from a coordinate row; its length sets the dimension.
    pub fn with_coords(id: usize, coords: &[f64]) -> Result<Self> {
        if !(1..=MAX_DIM).contains(&coords.len()) {
            return Err(Error::Config(format!(
                "node {} has {} coordinates, expected 1, 2 or 3",
                id,
                coords.len()
            )));
        }
        let mut node = Self::new(id, coords.len());
        node.coords.as_mut_slice()[..coords.len()].copy_from_slice(coords);
        Ok(node)
    }

    /// Node identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Spatial dimension of this node.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// The `i`-th coordinate component.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.dimension()`.
    #[inline]
    pub fn coordinate(&self, i: usize) -> f64 {
        assert!(i < self.dim, "coordinate index {} out of range for {}D node", i, self.dim);
        self.coords[i]
    }

    /// Mutable access to the `i`-th coordinate component.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.dimension()`.
    #[inline]
    pub fn coordinate_mut(&mut self, i: usize) -> &mut f64 {
        assert!(i < self.dim, "coordinate index {} out of range for {}D node", i, self.dim);
        &mut self.coords[i]
    }

    /// The used coordinate components.
    pub fn coords(&self) -> &[f64] {
        &self.coords.as_slice()[..self.dim]
    }

    /// Coordinates padded to three components.
    pub fn point(&self) -> Point3 {
        self.coords
    }

    /// Whether the node lies on an essential boundary.
    pub fn is_on_essential_boundary(&self) -> bool {
        self.essential
    }

    /// Mark or unmark the node as lying on an essential boundary.
    pub fn set_essential_boundary(&mut self, flag: bool) {
        self.essential = flag;
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
