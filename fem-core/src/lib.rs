//! FEM Core - element matrices on single-kind meshes
//!
//! Discretizes a domain into finite elements and computes each element's
//! local stiffness and mass matrices for a scalar diffusion problem:
//! - Line, triangle, quadrilateral and tetrahedron Lagrange elements
//! - Isoparametric mapping with fixed per-kind Gauss quadrature
//! - Mesh ingestion from raw coordinate/connectivity rows
//!
//! # Architecture
//!
//! - [`Element`] trait: shape functions, Jacobian, local `K` and `M`
//! - [`MeshElement`]: the closed set of element kinds
//! - [`Mesh`]: canonical nodes plus elements holding frozen node copies
//! - [`MeshConfig`] / [`Condition`]: element kind and run configuration
//!
//! # Example
//!
//! ```
//! use fem_core::{Element, Mesh, RawTopology};
//!
//! let topology = RawTopology::new(1, vec![vec![0.0], vec![1.0]], vec![vec![0, 1]]);
//! let mesh = Mesh::from_topology("LinLine", &topology).unwrap();
//!
//! let line = &mesh.elements()[0];
//! assert!((line.k(0, 1) + 1.0).abs() < 1e-12);
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod mesh;
pub mod node;
pub mod types;

pub use config::{Condition, MeshConfig};
pub use element::{create_element, Element, ElementStage, LocalSystem, MeshElement};
pub use error::{Error, Result};
pub use mesh::{ElementType, ElementView, Mesh, RawTopology};
pub use node::Node;
pub use types::Point3;
