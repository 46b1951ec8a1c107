//! Run configuration.
//!
//! [`MeshConfig`] is the element kind resolved once when a mesh is created.
//! [`Condition`] is the `key = value` condition file that names the element
//! type, the mesh file and the time-stepping parameters of a run:
//!
//! ```text
//! number of dimensions = 2
//! time step = 0.01
//! element type = LinTri
//! mesh file = meshes/circle.mphtxt
//! number of species = 1
//! ```

use crate::error::{Error, Result};
use crate::mesh::ElementType;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Element kind and nodes per element of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshConfig {
    element_type: ElementType,
    nodes_per_element: usize,
}

impl MeshConfig {
    /// Resolve a configuration for `element_type`.
    ///
    /// The `Null` sentinel is rejected.
    pub fn new(element_type: ElementType) -> Result<Self> {
        if element_type.is_null() {
            return Err(Error::Config(
                "element type is null; the mesh cannot be built".to_string(),
            ));
        }
        Ok(Self {
            element_type,
            nodes_per_element: element_type.n_nodes(),
        })
    }

    /// Resolve a configuration from an element type name.
    pub fn from_element_name(name: &str) -> Result<Self> {
        Self::new(name.parse()?)
    }

    /// Element kind.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Nodes per element.
    pub fn nodes_per_element(&self) -> usize {
        self.nodes_per_element
    }
}

/// Contents of a condition file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    /// Number of spatial dimensions.
    pub n_dims: Option<usize>,
    /// Time step size.
    pub time_step: Option<f64>,
    /// Element type name.
    pub element_type: Option<String>,
    /// Path of the mesh file.
    pub mesh_file: Option<PathBuf>,
    /// Number of chemical species.
    pub n_species: Option<usize>,
}

impl Condition {
    /// Parse condition-file text.
    ///
    /// Blank lines, `#` comments and unknown keys are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut condition = Self::default();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                trace!(line = lineno + 1, "skipping line without '='");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "number of dimensions" => condition.n_dims = Some(parse_value(key, value)?),
                "time step" => condition.time_step = Some(parse_value(key, value)?),
                "element type" => condition.element_type = Some(value.to_string()),
                "mesh file" => condition.mesh_file = Some(PathBuf::from(value)),
                "number of species" => condition.n_species = Some(parse_value(key, value)?),
                _ => {
                    trace!(key, "ignoring unknown condition key");
                    continue;
                }
            }
            trace!(key, value, "parsed condition key");
        }

        Ok(condition)
    }

    /// Read and parse a condition file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading condition file");
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Resolve the mesh configuration named by this condition.
    ///
    /// Fails if no element type is given, if it is unknown, or if the declared
    /// number of dimensions does not match the element kind.
    pub fn mesh_config(&self) -> Result<MeshConfig> {
        let name = self
            .element_type
            .as_deref()
            .ok_or_else(|| Error::Config("condition has no element type".to_string()))?;
        let config = MeshConfig::from_element_name(name)?;

        if let Some(n_dims) = self.n_dims {
            let expected = config.element_type().dimension();
            if n_dims != expected {
                return Err(Error::Config(format!(
                    "condition declares {} dimensions but {} elements are {}D",
                    n_dims,
                    config.element_type(),
                    expected
                )));
            }
        }

        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("invalid value '{}' for '{}'", value, key)))
}
