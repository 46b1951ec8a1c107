//! Core geometric types.

use nalgebra::Vector3;

/// A point in space.
///
/// 1D and 2D nodes use the leading components; the rest stay unused.
pub type Point3 = Vector3<f64>;

/// Largest supported spatial dimension.
pub const MAX_DIM: usize = 3;
