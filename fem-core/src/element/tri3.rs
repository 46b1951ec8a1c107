//! 3-node linear triangle (Tri3) element.
//!
//! - 3 corner nodes
//! - 2D coordinates
//! - Constant gradient within the element
//! - 3-point edge-midpoint rule, each point weighted 1/6
//!
//! # Shape Functions
//!
//! On the reference triangle (0,0), (1,0), (0,1):
//! - N1 = 1 - ξ - η
//! - N2 = ξ
//! - N3 = η

use crate::element::gauss::{gauss_tri, GaussPoint};
use crate::element::{Element, LocalMatrices};
use crate::error::Result;
use crate::mesh::ElementType;
use crate::node::Node;
use nalgebra::{DMatrix, DVector};
use std::sync::LazyLock;

static QUADRATURE: LazyLock<Vec<GaussPoint>> = LazyLock::new(|| gauss_tri(3));

/// 3-node linear triangle.
#[derive(Debug, Clone)]
pub struct Tri3 {
    id: usize,
    nodes: [Node; 3],
    local: LocalMatrices,
}

impl Tri3 {
    /// Create a Tri3 element with placeholder nodes.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            nodes: std::array::from_fn(|i| Node::new(i, 2)),
            local: LocalMatrices::new(3, 2),
        }
    }

    /// Create a Tri3 element at the given node positions and build K and M.
    pub fn from_coords(id: usize, coords: [[f64; 2]; 3]) -> Result<Self> {
        let mut element = Self::new(id);
        for (i, c) in coords.iter().enumerate() {
            let node = element.node_mut(i);
            *node.coordinate_mut(0) = c[0];
            *node.coordinate_mut(1) = c[1];
        }
        element.build()?;
        Ok(element)
    }

    fn shape_functions(xi: f64, eta: f64) -> [f64; 3] {
        [1.0 - xi - eta, xi, eta]
    }

    /// Rows: d/dξ, d/dη.
    fn shape_derivatives() -> [f64; 6] {
        [
            -1.0, 1.0, 0.0, // dN/dξ
            -1.0, 0.0, 1.0, // dN/dη
        ]
    }
}

impl Element for Tri3 {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> ElementType {
        ElementType::Tri3
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
        DVector::from_row_slice(&Self::shape_functions(xi[0], xi[1]))
    }

    fn shape_gradients_at(&self, _xi: &[f64; 3]) -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 3, &Self::shape_derivatives())
    }
}
