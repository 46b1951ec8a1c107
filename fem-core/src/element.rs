//! Element trait and implementations.
//!
//! The [`Element`] trait defines the contract shared by every element kind:
//! shape functions and their parametric gradients at the kind's integration
//! points, the isoparametric Jacobian, and the local stiffness (`K`) and mass
//! (`M`) matrices of a scalar diffusion operator.
//!
//! Concrete kinds only supply their quadrature rule, shape functions and
//! parametric gradients. Integration is shared:
//!
//! ```text
//! J      = Σ_i x_i ⊗ ∇_ξ N_i
//! ∇_x N  = J⁻ᵀ ∇_ξ N
//! K_ij  += (∇_x N_i · ∇_x N_j) |det J| w
//! M_ij  += N_i N_j |det J| w
//! ```
//!
//! Each element owns copies of its nodes. Geometry is frozen at bind time:
//! later edits to the mesh's canonical node list do not reach the element.
//!
//! # Submodules
//!
//! - [`gauss`] - quadrature rules on the reference cells
//! - [`line2`], [`tri3`], [`quad4`], [`tet4`] - element kinds

use crate::error::{Error, Result};
use crate::mesh::ElementType;
use crate::node::Node;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

pub mod gauss;
pub mod line2;
pub mod quad4;
pub mod tet4;
pub mod tri3;

pub use gauss::{gauss_line, gauss_quad, gauss_tet, gauss_tri, GaussPoint};
pub use line2::Line2;
pub use quad4::Quad4;
pub use tet4::Tet4;
pub use tri3::Tri3;

/// Lifecycle of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementStage {
    /// Created with placeholder nodes.
    Uninitialized,
    /// At least one node was written.
    NodesBound,
    /// `K` and `M` have been computed from the bound geometry.
    GeometryFrozen,
}

/// Per-element state shared by all kinds: Jacobian at the last evaluated
/// integration point and the local matrices.
#[derive(Debug, Clone)]
pub struct LocalMatrices {
    jacobian: DMatrix<f64>,
    jacobian_inv: DMatrix<f64>,
    det_j: f64,
    k: DMatrix<f64>,
    m: DMatrix<f64>,
    stage: ElementStage,
}

impl LocalMatrices {
    /// Zeroed state for an element with `n_nodes` nodes in `dim` dimensions.
    pub fn new(n_nodes: usize, dim: usize) -> Self {
        Self {
            jacobian: DMatrix::zeros(dim, dim),
            jacobian_inv: DMatrix::zeros(dim, dim),
            det_j: 0.0,
            k: DMatrix::zeros(n_nodes, n_nodes),
            m: DMatrix::zeros(n_nodes, n_nodes),
            stage: ElementStage::Uninitialized,
        }
    }
}

/// Isoparametric map evaluated at one parametric point.
struct IsoparametricMap {
    jacobian: DMatrix<f64>,
    inverse: DMatrix<f64>,
    det: f64,
}

impl IsoparametricMap {
    /// `grad` is the D×n matrix of parametric shape gradients.
    fn new(element_id: usize, nodes: &[Node], grad: &DMatrix<f64>) -> Result<Self> {
        let dim = grad.nrows();
        if let Some(node) = nodes.iter().find(|n| n.dimension() != dim) {
            return Err(Error::Element(format!(
                "element {}: node {} is {}D, expected {}D",
                element_id,
                node.id(),
                node.dimension(),
                dim
            )));
        }
        let x = DMatrix::from_fn(dim, nodes.len(), |a, i| nodes[i].coordinate(a));
        let jacobian = x * grad.transpose();
        let det = jacobian.determinant();

        let inverse = match jacobian.clone().try_inverse() {
            Some(inv) if det != 0.0 && det.is_finite() => inv,
            _ => {
                return Err(Error::SingularMatrix(format!(
                    "element {}: degenerate geometry, det(J) = {}",
                    element_id, det
                )))
            }
        };

        Ok(Self {
            jacobian,
            inverse,
            det,
        })
    }
}

/// Local matrices of one element, ready to scatter into a global system.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSystem {
    /// Element identifier.
    pub element_id: usize,
    /// Global identifiers of the bound nodes, in local order.
    pub node_ids: Vec<usize>,
    /// Bound node coordinates, in local order.
    pub coordinates: Vec<Vec<f64>>,
    /// Local stiffness matrix (n×n).
    pub stiffness: DMatrix<f64>,
    /// Local mass matrix (n×n).
    pub mass: DMatrix<f64>,
}

impl LocalSystem {
    /// Stiffness entries in row-major order.
    pub fn stiffness_row_major(&self) -> Vec<f64> {
        self.stiffness.transpose().as_slice().to_vec()
    }

    /// Mass entries in row-major order.
    pub fn mass_row_major(&self) -> Vec<f64> {
        self.mass.transpose().as_slice().to_vec()
    }
}

/// Finite element interface.
///
/// Index arguments (`ip`, `idx`, `i`, `j`) are contract bounds: passing a value
/// outside the element's range panics.
pub trait Element: Send + Sync {
    /// Element identifier.
    fn id(&self) -> usize;

    /// Element kind.
    fn element_type(&self) -> ElementType;

    /// Fixed quadrature rule of this kind.
    fn quadrature(&self) -> &[GaussPoint];

    /// The element's own node copies.
    fn nodes(&self) -> &[Node];

    /// Mutable node copies. Prefer [`Element::node_mut`], which tracks the stage.
    fn nodes_mut(&mut self) -> &mut [Node];

    /// Shared per-element state.
    fn local(&self) -> &LocalMatrices;

    /// Mutable shared per-element state.
    fn local_mut(&mut self) -> &mut LocalMatrices;

    /// Shape function values at parametric coordinates `xi`.
    fn shape_functions_at(&self, xi: &[f64; 3]) -> DVector<f64>;

    /// Parametric shape gradients at `xi`, shape D×n (column i is ∇_ξ N_i).
    fn shape_gradients_at(&self, xi: &[f64; 3]) -> DMatrix<f64>;

    /// Number of nodes.
    fn n_nodes(&self) -> usize {
        self.element_type().n_nodes()
    }

    /// Spatial dimension.
    fn dimension(&self) -> usize {
        self.element_type().dimension()
    }

    /// Number of integration points.
    fn n_integration_points(&self) -> usize {
        self.quadrature().len()
    }

    /// Integration point `ip`.
    fn integration_point(&self, ip: usize) -> &GaussPoint {
        let n_ip = self.n_integration_points();
        assert!(
            ip < n_ip,
            "integration point {} out of range for {} ({} points)",
            ip,
            self.element_type(),
            n_ip
        );
        &self.quadrature()[ip]
    }

    /// Shape function vector N at integration point `ip`.
    fn shape_function(&self, ip: usize) -> DVector<f64> {
        let coords = self.integration_point(ip).coords;
        self.shape_functions_at(&coords)
    }

    /// Parametric shape gradients at integration point `ip` (D×n).
    fn shape_gradient(&self, ip: usize) -> DMatrix<f64> {
        let coords = self.integration_point(ip).coords;
        self.shape_gradients_at(&coords)
    }

    /// Compute the Jacobian at integration point `ip` and store it.
    ///
    /// Returns |det J|, which [`Element::jacobian_det`] exposes afterwards.
    fn compute_jacobian(&mut self, ip: usize) -> Result<f64> {
        let grad = self.shape_gradient(ip);
        let map = IsoparametricMap::new(self.id(), self.nodes(), &grad)?;
        let det = map.det.abs();

        let local = self.local_mut();
        local.jacobian = map.jacobian;
        local.jacobian_inv = map.inverse;
        local.det_j = det;
        Ok(det)
    }

    /// Jacobian matrix from the last [`Element::compute_jacobian`] call.
    fn jacobian(&self) -> &DMatrix<f64> {
        &self.local().jacobian
    }

    /// |det J| from the last [`Element::compute_jacobian`] call.
    fn jacobian_det(&self) -> f64 {
        self.local().det_j
    }

    /// Physical shape gradients ∇_x N at integration point `ip` (D×n).
    fn physical_gradient(&mut self, ip: usize) -> Result<DMatrix<f64>> {
        self.compute_jacobian(ip)?;
        let grad = self.shape_gradient(ip);
        Ok(self.local().jacobian_inv.transpose() * grad)
    }

    /// Compute the stiffness matrix K of the diffusion operator.
    fn build_stiffness(&mut self) -> Result<()> {
        ensure_bound(self)?;
        let n = self.n_nodes();
        let mut k = DMatrix::zeros(n, n);

        for ip in 0..self.n_integration_points() {
            let b = self.physical_gradient(ip)?;
            let factor = self.jacobian_det() * self.integration_point(ip).weight;
            k += b.transpose() * &b * factor;
        }

        self.local_mut().k = k;
        Ok(())
    }

    /// Compute the consistent mass matrix M.
    fn build_mass(&mut self) -> Result<()> {
        ensure_bound(self)?;
        let n = self.n_nodes();
        let mut m = DMatrix::zeros(n, n);

        for ip in 0..self.n_integration_points() {
            let shape = self.shape_function(ip);
            let factor = self.compute_jacobian(ip)? * self.integration_point(ip).weight;
            m += &shape * shape.transpose() * factor;
        }

        self.local_mut().m = m;
        Ok(())
    }

    /// Compute K and M and freeze the geometry.
    ///
    /// Fails if det J changes sign between integration points (a folded element).
    fn build(&mut self) -> Result<()> {
        ensure_bound(self)?;
        let dets = signed_determinants(self)?;
        self.build_stiffness()?;
        self.build_mass()?;

        if dets.first().is_some_and(|&d| d < 0.0) {
            warn!(
                element = self.id(),
                kind = %self.element_type(),
                "negative Jacobian determinant, element nodes are ordered clockwise"
            );
        }
        debug!(element = self.id(), kind = %self.element_type(), "built local matrices");

        self.local_mut().stage = ElementStage::GeometryFrozen;
        Ok(())
    }

    /// Current lifecycle stage.
    fn stage(&self) -> ElementStage {
        self.local().stage
    }

    /// Stiffness entry K(i, j).
    fn k(&self, i: usize, j: usize) -> f64 {
        check_matrix_index(self.n_nodes(), i, j);
        self.local().k[(i, j)]
    }

    /// Mutable stiffness entry K(i, j).
    fn k_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        check_matrix_index(self.n_nodes(), i, j);
        &mut self.local_mut().k[(i, j)]
    }

    /// Mass entry M(i, j).
    fn m(&self, i: usize, j: usize) -> f64 {
        check_matrix_index(self.n_nodes(), i, j);
        self.local().m[(i, j)]
    }

    /// Mutable mass entry M(i, j).
    fn m_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        check_matrix_index(self.n_nodes(), i, j);
        &mut self.local_mut().m[(i, j)]
    }

    /// Local stiffness matrix.
    fn stiffness(&self) -> &DMatrix<f64> {
        &self.local().k
    }

    /// Local mass matrix.
    fn mass(&self) -> &DMatrix<f64> {
        &self.local().m
    }

    /// Node copy at local position `idx`.
    fn node(&self, idx: usize) -> &Node {
        check_node_index(self.element_type(), idx);
        &self.nodes()[idx]
    }

    /// Mutable node copy at local position `idx`.
    ///
    /// Writing geometry does not rebuild K and M; call [`Element::build`].
    fn node_mut(&mut self, idx: usize) -> &mut Node {
        check_node_index(self.element_type(), idx);
        let local = self.local_mut();
        if local.stage == ElementStage::Uninitialized {
            local.stage = ElementStage::NodesBound;
        }
        &mut self.nodes_mut()[idx]
    }

    /// Copy a global node into local position `idx`.
    ///
    /// # Panics
    ///
    /// Panics if the node dimension differs from the element dimension.
    fn bind_node(&mut self, idx: usize, node: &Node) {
        assert_eq!(
            node.dimension(),
            self.dimension(),
            "cannot bind {}D node {} to {} element",
            node.dimension(),
            node.id(),
            self.element_type()
        );
        *self.node_mut(idx) = node.clone();
    }

    /// Length, area or volume of the element: Σ |det J| w.
    fn volume(&self) -> Result<f64> {
        let dets = signed_determinants(self)?;
        Ok(dets
            .iter()
            .zip(self.quadrature())
            .map(|(det, gp)| det.abs() * gp.weight)
            .sum())
    }

    /// Snapshot of the element's outbound payload.
    fn local_system(&self) -> LocalSystem {
        LocalSystem {
            element_id: self.id(),
            node_ids: self.nodes().iter().map(Node::id).collect(),
            coordinates: self.nodes().iter().map(|n| n.coords().to_vec()).collect(),
            stiffness: self.stiffness().clone(),
            mass: self.mass().clone(),
        }
    }
}

fn ensure_bound<E: Element + ?Sized>(element: &E) -> Result<()> {
    if element.stage() == ElementStage::Uninitialized {
        return Err(Error::Element(format!(
            "element {} ({}) has no bound nodes",
            element.id(),
            element.element_type()
        )));
    }
    Ok(())
}

/// Signed det J at every integration point, all of one sign.
fn signed_determinants<E: Element + ?Sized>(element: &E) -> Result<Vec<f64>> {
    let dets = element
        .quadrature()
        .iter()
        .map(|gp| {
            let grad = element.shape_gradients_at(&gp.coords);
            IsoparametricMap::new(element.id(), element.nodes(), &grad).map(|map| map.det)
        })
        .collect::<Result<Vec<_>>>()?;

    let positive = dets.iter().filter(|&&d| d > 0.0).count();
    if positive != 0 && positive != dets.len() {
        return Err(Error::SingularMatrix(format!(
            "element {}: det(J) changes sign inside the element (folded geometry)",
            element.id()
        )));
    }
    Ok(dets)
}

fn check_node_index(element_type: ElementType, idx: usize) {
    assert!(
        idx < element_type.n_nodes(),
        "node index {} out of range for {} ({} nodes)",
        idx,
        element_type,
        element_type.n_nodes()
    );
}

fn check_matrix_index(n: usize, i: usize, j: usize) {
    assert!(
        i < n && j < n,
        "local matrix index ({}, {}) out of range for {}x{} matrix",
        i,
        j,
        n,
        n
    );
}

/// The closed set of element kinds a mesh can hold.
#[derive(Debug, Clone)]
pub enum MeshElement {
    Line2(Line2),
    Tri3(Tri3),
    Quad4(Quad4),
    Tet4(Tet4),
}

macro_rules! dispatch {
    ($self:ident, $e:ident => $body:expr) => {
        match $self {
            MeshElement::Line2($e) => $body,
            MeshElement::Tri3($e) => $body,
            MeshElement::Quad4($e) => $body,
            MeshElement::Tet4($e) => $body,
        }
    };
}

impl Element for MeshElement {
    fn id(&self) -> usize {
        dispatch!(self, e => e.id())
    }

    fn element_type(&self) -> ElementType {
        dispatch!(self, e => e.element_type())
    }

    fn quadrature(&self) -> &[GaussPoint] {
        dispatch!(self, e => e.quadrature())
    }

    fn nodes(&self) -> &[Node] {
        dispatch!(self, e => e.nodes())
    }

    fn nodes_mut(&mut self) -> &mut [Node] {
        dispatch!(self, e => e.nodes_mut())
    }

    fn local(&self) -> &LocalMatrices {
        dispatch!(self, e => e.local())
    }

    fn local_mut(&mut self) -> &mut LocalMatrices {
        dispatch!(self, e => e.local_mut())
    }

    fn shape_functions_at(&self, xi: &[f64; 3]) -> DVector<f64> {
        dispatch!(self, e => e.shape_functions_at(xi))
    }

    fn shape_gradients_at(&self, xi: &[f64; 3]) -> DMatrix<f64> {
        dispatch!(self, e => e.shape_gradients_at(xi))
    }
}

impl From<Line2> for MeshElement {
    fn from(e: Line2) -> Self {
        Self::Line2(e)
    }
}

impl From<Tri3> for MeshElement {
    fn from(e: Tri3) -> Self {
        Self::Tri3(e)
    }
}

impl From<Quad4> for MeshElement {
    fn from(e: Quad4) -> Self {
        Self::Quad4(e)
    }
}

impl From<Tet4> for MeshElement {
    fn from(e: Tet4) -> Self {
        Self::Tet4(e)
    }
}

/// Create an uninitialized element of the given kind.
///
/// The `Null` sentinel never produces an element.
pub fn create_element(element_type: ElementType, id: usize) -> Result<MeshElement> {
    match element_type {
        ElementType::Line2 => Ok(Line2::new(id).into()),
        ElementType::Tri3 => Ok(Tri3::new(id).into()),
        ElementType::Quad4 => Ok(Quad4::new(id).into()),
        ElementType::Tet4 => Ok(Tet4::new(id).into()),
        ElementType::Null => Err(Error::Config(
            "cannot create an element of the null element type".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bound(element_type: ElementType, coords: &[&[f64]]) -> MeshElement {
        let mut element = create_element(element_type, 0).unwrap();
        for (i, c) in coords.iter().enumerate() {
            element.bind_node(i, &Node::with_coords(i, c).unwrap());
        }
        element
    }

    fn skewed_elements() -> Vec<MeshElement> {
        vec![
            bound(ElementType::Line2, &[&[0.3], &[2.1]]),
            bound(ElementType::Tri3, &[&[0.1, 0.2], &[2.0, 0.4], &[0.7, 1.9]]),
            bound(
                ElementType::Quad4,
                &[&[0.0, 0.0], &[2.0, 0.2], &[2.3, 1.5], &[-0.2, 1.1]],
            ),
            bound(
                ElementType::Tet4,
                &[
                    &[0.0, 0.0, 0.0],
                    &[1.2, 0.1, 0.0],
                    &[0.3, 0.9, 0.2],
                    &[0.1, 0.4, 1.3],
                ],
            ),
        ]
    }

    #[test]
    fn test_create_null_element_fails() {
        assert!(matches!(
            create_element(ElementType::Null, 0),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_create_element_matches_kind() {
        for kind in [
            ElementType::Line2,
            ElementType::Tri3,
            ElementType::Quad4,
            ElementType::Tet4,
        ] {
            let element = create_element(kind, 4).unwrap();
            assert_eq!(element.element_type(), kind);
            assert_eq!(element.id(), 4);
            assert_eq!(element.nodes().len(), kind.n_nodes());
            assert_eq!(element.stage(), ElementStage::Uninitialized);
        }
    }

    #[test]
    fn test_build_without_nodes_fails() {
        let mut element = create_element(ElementType::Tri3, 0).unwrap();
        assert!(matches!(element.build(), Err(Error::Element(_))));
    }

    #[test]
    fn test_matrices_symmetric() {
        for mut element in skewed_elements() {
            element.build().unwrap();
            let n = element.n_nodes();
            for i in 0..n {
                for j in 0..n {
                    assert_relative_eq!(element.k(i, j), element.k(j, i), epsilon = 1e-12);
                    assert_relative_eq!(element.m(i, j), element.m(j, i), epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_partition_of_unity() {
        for element in skewed_elements() {
            for ip in 0..element.n_integration_points() {
                assert_relative_eq!(element.shape_function(ip).sum(), 1.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_stiffness_rows_sum_to_zero() {
        for mut element in skewed_elements() {
            element.build().unwrap();
            let k = element.stiffness();
            for i in 0..element.n_nodes() {
                assert_relative_eq!(k.row(i).sum(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_mass_sums_to_volume() {
        for mut element in skewed_elements() {
            element.build().unwrap();
            let volume = element.volume().unwrap();
            assert!(volume > 0.0);
            assert_relative_eq!(element.mass().sum(), volume, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        for mut element in skewed_elements() {
            element.build().unwrap();
            let k = element.stiffness().clone();
            let m = element.mass().clone();
            element.build().unwrap();
            assert_eq!(element.stiffness(), &k);
            assert_eq!(element.mass(), &m);
        }
    }

    #[test]
    fn test_stage_transitions() {
        let mut element = create_element(ElementType::Line2, 0).unwrap();
        assert_eq!(element.stage(), ElementStage::Uninitialized);

        *element.node_mut(0).coordinate_mut(0) = 0.0;
        *element.node_mut(1).coordinate_mut(0) = 2.0;
        assert_eq!(element.stage(), ElementStage::NodesBound);

        element.build().unwrap();
        assert_eq!(element.stage(), ElementStage::GeometryFrozen);

        // Editing geometry does not rebuild or un-freeze.
        let k_before = element.k(0, 0);
        *element.node_mut(1).coordinate_mut(0) = 4.0;
        assert_eq!(element.stage(), ElementStage::GeometryFrozen);
        assert_eq!(element.k(0, 0), k_before);

        element.build().unwrap();
        assert_relative_eq!(element.k(0, 0), 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_degenerate_element_is_singular() {
        let mut element = bound(ElementType::Tri3, &[&[0.0, 0.0], &[1.0, 1.0], &[2.0, 2.0]]);
        assert!(matches!(element.build(), Err(Error::SingularMatrix(_))));
    }

    #[test]
    fn test_wrong_dimension_node_fails_build() {
        let mut element = bound(ElementType::Tri3, &[&[0.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]]);
        *element.node_mut(0) = Node::new(0, 1);
        assert!(matches!(element.build(), Err(Error::Element(_))));
        assert!(matches!(element.volume(), Err(Error::Element(_))));
    }

    #[test]
    fn test_elements_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshElement>();
    }

    #[test]
    fn test_local_system_row_major() {
        let mut element = bound(ElementType::Tri3, &[&[0.0, 0.0], &[2.0, 0.0], &[0.0, 1.0]]);
        element.build().unwrap();
        let system = element.local_system();

        assert_eq!(system.node_ids, vec![0, 1, 2]);
        assert_eq!(system.coordinates[1], vec![2.0, 0.0]);

        let flat = system.stiffness_row_major();
        assert_eq!(flat.len(), 9);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(flat[i * 3 + j], element.k(i, j));
            }
        }
        assert_eq!(system.mass_row_major()[1], element.m(0, 1));
    }

    #[test]
    fn test_k_mut_writes_through() {
        let mut element = create_element(ElementType::Line2, 0).unwrap();
        *element.k_mut(0, 1) = 3.5;
        *element.m_mut(1, 0) = -1.0;
        assert_eq!(element.k(0, 1), 3.5);
        assert_eq!(element.m(1, 0), -1.0);
    }

    #[test]
    #[should_panic(expected = "node index 3 out of range")]
    fn test_node_index_out_of_range() {
        let element = create_element(ElementType::Tri3, 0).unwrap();
        element.node(3);
    }

    #[test]
    #[should_panic(expected = "integration point 2 out of range")]
    fn test_integration_point_out_of_range() {
        let element = create_element(ElementType::Line2, 0).unwrap();
        element.shape_function(2);
    }

    #[test]
    #[should_panic(expected = "local matrix index")]
    fn test_matrix_index_out_of_range() {
        let element = create_element(ElementType::Line2, 0).unwrap();
        element.k(0, 2);
    }

    #[test]
    #[should_panic(expected = "cannot bind 3D node")]
    fn test_bind_node_dimension_mismatch() {
        let mut element = create_element(ElementType::Tri3, 0).unwrap();
        element.bind_node(0, &Node::new(0, 3));
    }
}
