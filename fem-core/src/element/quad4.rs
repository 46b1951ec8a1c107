//! 4-node bilinear quadrilateral (Quad4) element.
//!
//! - 4 corner nodes, counter-clockwise
//! - 2D coordinates
//! - 2×2 Gauss rule
//!
//! # Node Numbering
//!
//! ```text
//!  4 ------- 3        η
//!  |         |        ^
//!  |         |        |
//!  1 ------- 2        +--> ξ
//! ```
//!
//! # Shape Functions
//!
//! N_i = (1 + ξ ξ_i)(1 + η η_i) / 4 with (ξ_i, η_i) the corner of node i in
//! [-1, 1]². Unlike the simplex kinds the Jacobian varies over a general
//! quadrilateral.

use crate::element::gauss::{gauss_quad, GaussPoint};
use crate::element::{Element, LocalMatrices};
use crate::error::Result;
use crate::mesh::ElementType;
use crate::node::Node;
use nalgebra::{DMatrix, DVector};
use std::sync::LazyLock;

static QUADRATURE: LazyLock<Vec<GaussPoint>> = LazyLock::new(|| gauss_quad(2));

/// Corner positions in the reference square.
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// 4-node bilinear quadrilateral.
#[derive(Debug, Clone)]
pub struct Quad4 {
    id: usize,
    nodes: [Node; 4],
    local: LocalMatrices,
}

impl Quad4 {
    /// Create a Quad4 element with placeholder nodes.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            nodes: std::array::from_fn(|i| Node::new(i, 2)),
            local: LocalMatrices::new(4, 2),
        }
    }

    /// Create a Quad4 element at the given node positions and build K and M.
    pub fn from_coords(id: usize, coords: [[f64; 2]; 4]) -> Result<Self> {
        let mut element = Self::new(id);
        for (i, c) in coords.iter().enumerate() {
            let node = element.node_mut(i);
            *node.coordinate_mut(0) = c[0];
            *node.coordinate_mut(1) = c[1];
        }
        element.build()?;
        Ok(element)
    }

    fn shape_functions(xi: f64, eta: f64) -> [f64; 4] {
        CORNERS.map(|(xi_i, eta_i)| 0.25 * (1.0 + xi * xi_i) * (1.0 + eta * eta_i))
    }

    /// Returns (dN/dξ, dN/dη).
    fn shape_derivatives(xi: f64, eta: f64) -> ([f64; 4], [f64; 4]) {
        (
            CORNERS.map(|(xi_i, eta_i)| 0.25 * xi_i * (1.0 + eta * eta_i)),
            CORNERS.map(|(xi_i, eta_i)| 0.25 * eta_i * (1.0 + xi * xi_i)),
        )
    }
}

impl Element for Quad4 {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> ElementType {
        ElementType::Quad4
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

    fn shape_gradients_at(&self, xi: &[f64; 3]) -> DMatrix<f64> {
        let (dn_dxi, dn_deta) = Self::shape_derivatives(xi[0], xi[1]);
        DMatrix::from_fn(2, 4, |r, i| if r == 0 { dn_dxi[i] } else { dn_deta[i] })
    }
}
