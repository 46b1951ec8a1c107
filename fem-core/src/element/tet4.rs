//! 4-node tetrahedron (Tet4) element.
//!
//! The Tet4 is the simplest 3D element with:
//! - 4 nodes at vertices
//! - Constant gradient within the element
//! - 4-point degree-2 rule (weights 1/24, summing to the reference volume 1/6)
//!
//! # Shape Functions
//!
//! On the reference tetrahedron with parametric coordinates (ξ, η, ζ):
//! - Node 1: (0, 0, 0) -> N1 = 1 - ξ - η - ζ
//! - Node 2: (1, 0, 0) -> N2 = ξ
//! - Node 3: (0, 1, 0) -> N3 = η
//! - Node 4: (0, 0, 1) -> N4 = ζ

use crate::element::gauss::{gauss_tet, GaussPoint};
use crate::element::{Element, LocalMatrices};
use crate::error::Result;
use crate::mesh::ElementType;
use crate::node::Node;
use nalgebra::{DMatrix, DVector};
use std::sync::LazyLock;

static QUADRATURE: LazyLock<Vec<GaussPoint>> = LazyLock::new(|| gauss_tet(4));

/// 4-node linear tetrahedron.
#[derive(Debug, Clone)]
pub struct Tet4 {
    id: usize,
    nodes: [Node; 4],
    local: LocalMatrices,
}

impl Tet4 {
    /// Create a Tet4 element with placeholder nodes.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            nodes: std::array::from_fn(|i| Node::new(i, 3)),
            local: LocalMatrices::new(4, 3),
        }
    }

    /// Create a Tet4 element at the given node positions and build K and M.
    pub fn from_coords(id: usize, coords: [[f64; 3]; 4]) -> Result<Self> {
        let mut element = Self::new(id);
        for (i, c) in coords.iter().enumerate() {
            let node = element.node_mut(i);
            for (a, &x) in c.iter().enumerate() {
                *node.coordinate_mut(a) = x;
            }
        }
        element.build()?;
        Ok(element)
    }

    fn shape_functions(xi: f64, eta: f64, zeta: f64) -> [f64; 4] {
        [1.0 - xi - eta - zeta, xi, eta, zeta]
    }

    /// Rows: d/dξ, d/dη, d/dζ.
    fn shape_derivatives() -> [f64; 12] {
        [
            -1.0, 1.0, 0.0, 0.0, // dN/dξ
            -1.0, 0.0, 1.0, 0.0, // dN/dη
            -1.0, 0.0, 0.0, 1.0, // dN/dζ
        ]
    }
}

impl Element for Tet4 {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> ElementType {
        ElementType::Tet4
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
        DVector::from_row_slice(&Self::shape_functions(xi[0], xi[1], xi[2]))
    }

    fn shape_gradients_at(&self, _xi: &[f64; 3]) -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 4, &Self::shape_derivatives())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetrahedron() -> [[f64; 3]; 4] {
        [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_tet4_node_count() {
        let tet = Tet4::new(0);
        assert_eq!(tet.n_nodes(), 4);
        assert_eq!(tet.dimension(), 3);
        assert_eq!(tet.n_integration_points(), 4);
    }

    #[test]
    fn test_tet4_volume_unit() {
        let tet = Tet4::from_coords(0, unit_tetrahedron()).unwrap();
        assert_relative_eq!(tet.volume().unwrap(), 1.0 / 6.0, epsilon = 1e-14);
    }

    #[test]
    fn test_tet4_volume_scaled() {
        // Scale by 2 in each direction -> volume * 8
        let coords = unit_tetrahedron().map(|p| p.map(|x| 2.0 * x));
        let tet = Tet4::from_coords(0, coords).unwrap();
        assert_relative_eq!(tet.volume().unwrap(), 8.0 / 6.0, epsilon = 1e-14);
    }

    #[test]
    fn test_tet4_unit_jacobian() {
        let mut tet = Tet4::from_coords(0, unit_tetrahedron()).unwrap();
        for ip in 0..tet.n_integration_points() {
            assert_relative_eq!(tet.compute_jacobian(ip).unwrap(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_tet4_unit_stiffness() {
        // K = V Gᵀ G with V = 1/6
        let tet = Tet4::from_coords(0, unit_tetrahedron()).unwrap();
        let expected = [
            [3.0, -1.0, -1.0, -1.0],
            [-1.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0, 1.0],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(tet.k(i, j), expected[i][j] / 6.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_tet4_unit_mass() {
        // M = V/20 (1 + δ_ij) with V = 1/6
        let tet = Tet4::from_coords(0, unit_tetrahedron()).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 / 60.0 } else { 1.0 / 120.0 };
                assert_relative_eq!(tet.m(i, j), expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_tet4_stiffness_scales_linearly() {
        // In 3D the diffusion stiffness scales with element size
        let unit = Tet4::from_coords(0, unit_tetrahedron()).unwrap();
        let coords = unit_tetrahedron().map(|p| p.map(|x| 3.0 * x));
        let big = Tet4::from_coords(0, coords).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(big.k(i, j), 3.0 * unit.k(i, j), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_tet4_positive_diagonal() {
        let tet = Tet4::from_coords(
            0,
            [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.5, 1.0, 0.0],
                [0.5, 0.5, 1.0],
            ],
        )
        .unwrap();
        for i in 0..4 {
            assert!(tet.k(i, i) > 0.0, "K[{},{}] = {} should be positive", i, i, tet.k(i, i));
            assert!(tet.m(i, i) > 0.0);
        }
    }

    #[test]
    fn test_tet4_flat_is_degenerate() {
        let result = Tet4::from_coords(
            0,
            [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
        );
        assert!(result.is_err());
    }
}
