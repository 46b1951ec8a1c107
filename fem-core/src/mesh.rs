//! Mesh data structure.
//!
//! Owns the canonical node list and the element list built from raw topology
//! (coordinate rows and connectivity rows) supplied by an external reader.
//! A mesh holds a single element kind, fixed when it is created.
//!
//! Each element receives copies of its nodes at ingestion time. Editing a node
//! through [`Mesh::node_mut`] afterwards changes the canonical node only; the
//! element geometry stays frozen.

use crate::config::MeshConfig;
use crate::element::{create_element, Element, LocalSystem, MeshElement};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::types::{Point3, MAX_DIM};
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Supported element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Sentinel for unrecognized names. Never produces an element.
    Null,
    /// 2-node line.
    Line2,
    /// 3-node triangle.
    Tri3,
    /// 4-node quadrilateral.
    Quad4,
    /// 4-node tetrahedron.
    Tet4,
}

impl ElementType {
    /// Resolve an element type name.
    ///
    /// Accepts `LinLine`/`line2`, `LinTri`/`tri3`, `LinQuad`/`quad4` and
    /// `LinTet`/`tet4`. Anything else resolves to [`ElementType::Null`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "LinLine" | "line2" => ElementType::Line2,
            "LinTri" | "tri3" => ElementType::Tri3,
            "LinQuad" | "quad4" => ElementType::Quad4,
            "LinTet" | "tet4" => ElementType::Tet4,
            _ => ElementType::Null,
        }
    }

    /// Short name of this element type.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Null => "null",
            ElementType::Line2 => "line2",
            ElementType::Tri3 => "tri3",
            ElementType::Quad4 => "quad4",
            ElementType::Tet4 => "tet4",
        }
    }

    /// Number of nodes for this element type (0 for `Null`).
    pub fn n_nodes(self) -> usize {
        match self {
            ElementType::Null => 0,
            ElementType::Line2 => 2,
            ElementType::Tri3 => 3,
            ElementType::Quad4 => 4,
            ElementType::Tet4 => 4,
        }
    }

    /// Spatial dimension (0 for `Null`).
    pub fn dimension(self) -> usize {
        match self {
            ElementType::Null => 0,
            ElementType::Line2 => 1,
            ElementType::Tri3 | ElementType::Quad4 => 2,
            ElementType::Tet4 => 3,
        }
    }

    /// Whether this is the `Null` sentinel.
    pub fn is_null(self) -> bool {
        self == ElementType::Null
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match ElementType::from_name(s) {
            ElementType::Null => Err(Error::Config(format!(
                "unknown element type '{}' (supported: LinLine, LinTri, LinQuad, LinTet)",
                s.trim()
            ))),
            element_type => Ok(element_type),
        }
    }
}

/// Topology as produced by a mesh-file reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTopology {
    /// Spatial dimension.
    pub dimension: usize,
    /// One row of `dimension` coordinates per node.
    pub coordinates: Vec<Vec<f64>>,
    /// One row of 0-based node indices per element.
    pub connectivity: Vec<Vec<usize>>,
    /// Node count announced by the file header, if any.
    pub declared_nodes: Option<usize>,
    /// Element count announced by the file header, if any.
    pub declared_elements: Option<usize>,
}

impl RawTopology {
    /// Create topology from coordinate and connectivity rows.
    pub fn new(dimension: usize, coordinates: Vec<Vec<f64>>, connectivity: Vec<Vec<usize>>) -> Self {
        Self {
            dimension,
            coordinates,
            connectivity,
            declared_nodes: None,
            declared_elements: None,
        }
    }

    /// Record header counts to be checked against the rows.
    pub fn with_declared_counts(mut self, n_nodes: usize, n_elements: usize) -> Self {
        self.declared_nodes = Some(n_nodes);
        self.declared_elements = Some(n_elements);
        self
    }
}

/// Diagnostic view of one element and its bound nodes.
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    element: &'a MeshElement,
}

impl<'a> ElementView<'a> {
    /// Element identifier.
    pub fn id(&self) -> usize {
        self.element.id()
    }

    /// Bound node copies.
    pub fn nodes(&self) -> &'a [Node] {
        let element: &'a MeshElement = self.element;
        element.nodes()
    }

    /// Identifiers of the bound nodes.
    pub fn node_ids(&self) -> impl Iterator<Item = usize> + 'a {
        self.nodes().iter().map(Node::id)
    }
}

impl fmt::Display for ElementView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "element: {}", self.id())?;
        let ids: Vec<String> = self.node_ids().map(|id| id.to_string()).collect();
        writeln!(f, "nodes: {}", ids.join(" "))?;
        for node in self.nodes() {
            write!(f, "node: {}, coords:", node.id())?;
            for x in node.coords() {
                write!(f, " {}", x)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Finite element mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Element kind and nodes per element.
    config: MeshConfig,
    /// Spatial dimension; 0 until topology is ingested.
    dimension: usize,
    /// Canonical node list.
    nodes: Vec<Node>,
    /// Element list with frozen node copies and local matrices.
    elements: Vec<MeshElement>,
    /// Set once topology has been committed, even if it was empty.
    ingested: bool,
}

impl Mesh {
    /// Create an empty mesh for the named element type.
    ///
    /// Fails before anything is allocated if the name is not supported.
    pub fn new(element_name: &str) -> Result<Self> {
        Ok(Self::with_config(MeshConfig::from_element_name(element_name)?))
    }

    /// Create an empty mesh from a resolved configuration.
    pub fn with_config(config: MeshConfig) -> Self {
        info!(
            kind = %config.element_type(),
            nodes_per_element = config.nodes_per_element(),
            "created mesh"
        );
        Self {
            config,
            dimension: 0,
            nodes: Vec::new(),
            elements: Vec::new(),
            ingested: false,
        }
    }

    /// Create a mesh and ingest `topology` in one step.
    pub fn from_topology(element_name: &str, topology: &RawTopology) -> Result<Self> {
        let mut mesh = Self::new(element_name)?;
        mesh.ingest_topology(topology)?;
        Ok(mesh)
    }

    /// Build nodes and elements from raw topology.
    ///
    /// Node and element identifiers are their row indices. Every element gets
    /// copies of its nodes and has K and M computed before this returns. On
    /// error the mesh is left empty.
    pub fn ingest_topology(&mut self, topology: &RawTopology) -> Result<()> {
        if self.ingested {
            return Err(Error::Mesh(
                "topology has already been ingested".to_string(),
            ));
        }

        let dim = topology.dimension;
        let element_type = self.config.element_type();
        if !(1..=MAX_DIM).contains(&dim) {
            return Err(Error::Config(format!(
                "unsupported spatial dimension {}",
                dim
            )));
        }
        if dim != element_type.dimension() {
            return Err(Error::Config(format!(
                "{} elements require dimension {}, got {}",
                element_type,
                element_type.dimension(),
                dim
            )));
        }
        check_declared("node", topology.declared_nodes, topology.coordinates.len())?;
        check_declared(
            "element",
            topology.declared_elements,
            topology.connectivity.len(),
        )?;

        let nodes = topology
            .coordinates
            .iter()
            .enumerate()
            .map(|(id, row)| {
                if row.len() != dim {
                    return Err(Error::Topology(format!(
                        "node {} has {} coordinates, expected {}",
                        id,
                        row.len(),
                        dim
                    )));
                }
                Node::with_coords(id, row)
            })
            .collect::<Result<Vec<_>>>()?;

        let npe = self.config.nodes_per_element();
        let mut elements = Vec::with_capacity(topology.connectivity.len());
        for (id, row) in topology.connectivity.iter().enumerate() {
            if row.len() != npe {
                return Err(Error::Topology(format!(
                    "element {} has {} nodes, {} requires {}",
                    id,
                    row.len(),
                    element_type,
                    npe
                )));
            }

            let mut element = self.create_element(id)?;
            for (local, &global) in row.iter().enumerate() {
                let node = nodes.get(global).ok_or_else(|| {
                    Error::Topology(format!(
                        "element {} references node {} (mesh has {} nodes)",
                        id,
                        global,
                        nodes.len()
                    ))
                })?;
                element.bind_node(local, node);
            }
            element.build()?;
            elements.push(element);
        }

        self.dimension = dim;
        self.nodes = nodes;
        self.elements = elements;
        self.ingested = true;
        info!(
            n_nodes = self.nodes.len(),
            n_elements = self.elements.len(),
            "ingested mesh topology"
        );
        Ok(())
    }

    /// Create an uninitialized element of the configured kind.
    pub fn create_element(&self, id: usize) -> Result<MeshElement> {
        create_element(self.config.element_type(), id)
    }

    /// Recompute K and M of every element from its frozen node copies.
    ///
    /// Elements share no state, so this runs in parallel.
    pub fn rebuild_matrices(&mut self) -> Result<()> {
        debug!(n_elements = self.elements.len(), "rebuilding local matrices");
        self.elements.par_iter_mut().try_for_each(|e| e.build())
    }

    /// Resolved configuration.
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Spatial dimension (0 before ingestion).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Element kind of every element in the mesh.
    pub fn element_type(&self) -> ElementType {
        self.config.element_type()
    }

    /// Nodes per element.
    pub fn nodes_per_element(&self) -> usize {
        self.config.nodes_per_element()
    }

    /// Number of nodes in the mesh.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements in the mesh.
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Canonical node list.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a specific node.
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Mutable canonical node. Element copies are not affected.
    pub fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx)
    }

    /// Element list.
    pub fn elements(&self) -> &[MeshElement] {
        &self.elements
    }

    /// Get a specific element.
    pub fn element(&self, idx: usize) -> Option<&MeshElement> {
        self.elements.get(idx)
    }

    /// Mutable element, e.g. to edit its node copies before a rebuild.
    pub fn element_mut(&mut self, idx: usize) -> Option<&mut MeshElement> {
        self.elements.get_mut(idx)
    }

    /// Lazily walk elements with their bound nodes, for diagnostics.
    pub fn dump(&self) -> impl Iterator<Item = ElementView<'_>> + '_ {
        self.elements.iter().map(|element| ElementView { element })
    }

    /// Lazily produce each element's local matrices for global assembly.
    pub fn local_systems(&self) -> impl Iterator<Item = LocalSystem> + '_ {
        self.elements.iter().map(|e| e.local_system())
    }

    /// Compute mesh bounding box.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = self.nodes.first()?.point();
        let mut min = first;
        let mut max = first;

        for node in &self.nodes[1..] {
            let p = node.point();
            for i in 0..self.dimension {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Some((min, max))
    }
}

fn check_declared(what: &str, declared: Option<usize>, actual: usize) -> Result<()> {
    match declared {
        Some(n) if n != actual => Err(Error::Topology(format!(
            "declared {} {}s but found {}",
            n, what, actual
        ))),
        _ => Ok(()),
    }
}
