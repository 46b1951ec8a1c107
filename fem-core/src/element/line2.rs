//! 2-node linear line (Line2) element.
//!
//! - 2 nodes at the segment ends
//! - 1D coordinates
//! - 2-point Gauss-Legendre rule
//!
//! # Shape Functions
//!
//! On the reference segment ξ ∈ [-1, 1]:
//! - N1 = (1 - ξ) / 2
//! - N2 = (1 + ξ) / 2
//!
//! The Jacobian is the half-length of the segment, so for nodes at 0 and L:
//!
//! ```text
//! K = (1/L) [ 1 -1 ]      M = (L/6) [ 2 1 ]
//!           [-1  1 ]                [ 1 2 ]
//! ```

use crate::element::gauss::{gauss_line, GaussPoint};
use crate::element::{Element, LocalMatrices};
use crate::error::Result;
use crate::mesh::ElementType;
use crate::node::Node;
use nalgebra::{DMatrix, DVector};
use std::sync::LazyLock;

static QUADRATURE: LazyLock<Vec<GaussPoint>> = LazyLock::new(|| gauss_line(2));

/// 2-node line element.
#[derive(Debug, Clone)]
pub struct Line2 {
    id: usize,
    nodes: [Node; 2],
    local: LocalMatrices,
}

impl Line2 {
    /// Create a Line2 element with placeholder nodes.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            nodes: std::array::from_fn(|i| Node::new(i, 1)),
            local: LocalMatrices::new(2, 1),
        }
    }

    /// Create a Line2 element at the given node positions and build K and M.
    pub fn from_coords(id: usize, coords: [f64; 2]) -> Result<Self> {
        let mut element = Self::new(id);
        for (i, &x) in coords.iter().enumerate() {
            *element.node_mut(i).coordinate_mut(0) = x;
        }
        element.build()?;
        Ok(element)
    }

    fn shape_functions(xi: f64) -> [f64; 2] {
        [0.5 * (1.0 - xi), 0.5 * (1.0 + xi)]
    }

    fn shape_derivatives() -> [f64; 2] {
        [-0.5, 0.5]
    }
}

impl Element for Line2 {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> ElementType {
        ElementType::Line2
    }

    fn quadrature(&self) -> &[GaussPoint] {
        &QUADRATURE
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn local(&self) -> &LocalMatrices {
        &self.local
    }

    fn local_mut(&mut self) -> &mut LocalMatrices {
        &mut self.local
    }

    fn shape_functions_at(&self, xi: &[f64; 3]) -> DVector<f64> {
        DVector::from_row_slice(&Self::shape_functions(xi[0]))
    }

    fn shape_gradients_at(&self, _xi: &[f64; 3]) -> DMatrix<f64> {
        DMatrix::from_row_slice(1, 2, &Self::shape_derivatives())
    }
}
