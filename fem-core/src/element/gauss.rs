//! Gauss quadrature rules on the reference cells.
//!
//! All points are given in parametric coordinates (ξ, η, ζ) of the reference
//! cell used by the element kinds:
//! - line: ξ ∈ [-1, 1]
//! - triangle: (0,0), (1,0), (0,1)
//! - quadrilateral: [-1, 1]²
//! - tetrahedron: (0,0,0), (1,0,0), (0,1,0), (0,0,1)
//!
//! Unused trailing coordinates are zero.
//!
//! # Usage
//!
//! ```
//! use fem_core::element::gauss::{gauss_line, gauss_tet};
//!
//! // integral of x² over [-1, 1]
//! let integral: f64 = gauss_line(2).iter().map(|gp| gp.xi().powi(2) * gp.weight).sum();
//! assert!((integral - 2.0 / 3.0).abs() < 1e-14);
//!
//! // volume of the unit tetrahedron
//! let volume: f64 = gauss_tet(4).iter().map(|gp| gp.weight).sum();
//! assert!((volume - 1.0 / 6.0).abs() < 1e-14);
//! ```

/// A quadrature point with parametric coordinates and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussPoint {
    /// Parametric coordinates [ξ, η, ζ].
    pub coords: [f64; 3],
    /// Integration weight.
    pub weight: f64,
}

impl GaussPoint {
    /// Create a new Gauss point.
    pub fn new(coords: [f64; 3], weight: f64) -> Self {
        Self { coords, weight }
    }

    /// Get ξ (first parametric coordinate).
    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    /// Get η (second parametric coordinate).
    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }

    /// Get ζ (third parametric coordinate).
    #[inline]
    pub fn zeta(&self) -> f64 {
        self.coords[2]
    }
}

/// 1D Gauss-Legendre (point, weight) pairs on [-1, 1].
fn legendre(n: usize) -> Vec<(f64, f64)> {
    match n {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        3 => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
        4 => {
            // Points: ±√((3 ∓ 2√(6/5))/7), weights: (18 ± √30) / 36
            let sqrt_6_5 = (6.0 / 5.0_f64).sqrt();
            let p1 = ((3.0 - 2.0 * sqrt_6_5) / 7.0).sqrt();
            let p2 = ((3.0 + 2.0 * sqrt_6_5) / 7.0).sqrt();
            let sqrt_30 = 30.0_f64.sqrt();
            let w1 = (18.0 + sqrt_30) / 36.0;
            let w2 = (18.0 - sqrt_30) / 36.0;
            vec![(-p2, w2), (-p1, w1), (p1, w1), (p2, w2)]
        }
        _ => panic!("gauss_line: n must be 1, 2, 3, or 4, got {}", n),
    }
}

/// Gauss-Legendre rule on the reference line [-1, 1].
///
/// An n-point rule integrates polynomials up to degree 2n-1 exactly.
///
/// # Panics
///
/// Panics if `n` is not in 1..=4.
pub fn gauss_line(n: usize) -> Vec<GaussPoint> {
    legendre(n)
        .into_iter()
        .map(|(xi, w)| GaussPoint::new([xi, 0.0, 0.0], w))
        .collect()
}

/// Rule on the reference triangle (0,0), (1,0), (0,1).
///
/// Weights are scaled for the reference area 1/2.
///
/// - n=1: centroid, degree 1
/// - n=3: edge midpoints, degree 2
/// - n=4: centroid + 3 interior points, degree 3
///
/// # Panics
///
/// Panics if `n` is not 1, 3, or 4.
pub fn gauss_tri(n: usize) -> Vec<GaussPoint> {
    match n {
        1 => vec![GaussPoint::new([1.0 / 3.0, 1.0 / 3.0, 0.0], 0.5)],
        3 => {
            let w = 1.0 / 6.0;
            vec![
                GaussPoint::new([0.5, 0.5, 0.0], w),
                GaussPoint::new([0.5, 0.0, 0.0], w),
                GaussPoint::new([0.0, 0.5, 0.0], w),
            ]
        }
        4 => {
            let w_center = -27.0 / 96.0;
            let w_inner = 25.0 / 96.0;
            vec![
                GaussPoint::new([1.0 / 3.0, 1.0 / 3.0, 0.0], w_center),
                GaussPoint::new([0.2, 0.2, 0.0], w_inner),
                GaussPoint::new([0.6, 0.2, 0.0], w_inner),
                GaussPoint::new([0.2, 0.6, 0.0], w_inner),
            ]
        }
        _ => panic!("gauss_tri: n must be 1, 3, or 4, got {}", n),
    }
}

/// Tensor-product rule on the reference square [-1, 1]².
///
/// Returns n² points.
///
/// # Panics
///
/// Panics if `n` is not in 1..=4.
pub fn gauss_quad(n: usize) -> Vec<GaussPoint> {
    let rule_1d = legendre(n);
    let mut points = Vec::with_capacity(n * n);

    for &(xi, w_xi) in &rule_1d {
        for &(eta, w_eta) in &rule_1d {
            points.push(GaussPoint::new([xi, eta, 0.0], w_xi * w_eta));
        }
    }

    points
}

/// Rule on the reference tetrahedron (0,0,0), (1,0,0), (0,1,0), (0,0,1).
///
/// Weights are scaled for the reference volume 1/6.
///
/// - n=1: centroid, degree 1
/// - n=4: degree 2
/// - n=5: degree 3 (one negative weight)
///
/// # Panics
///
/// Panics if `n` is not 1, 4, or 5.
pub fn gauss_tet(n: usize) -> Vec<GaussPoint> {
    match n {
        1 => vec![GaussPoint::new([0.25, 0.25, 0.25], 1.0 / 6.0)],
        4 => {
            // (α, β, β) and permutations, plus (β, β, β)
            // α = (5 + 3√5) / 20, β = (5 - √5) / 20
            let sqrt5 = 5.0_f64.sqrt();
            let alpha = (5.0 + 3.0 * sqrt5) / 20.0;
            let beta = (5.0 - sqrt5) / 20.0;
            let w = 1.0 / 24.0;
            vec![
                GaussPoint::new([beta, beta, beta], w),
                GaussPoint::new([alpha, beta, beta], w),
                GaussPoint::new([beta, alpha, beta], w),
                GaussPoint::new([beta, beta, alpha], w),
            ]
        }
        5 => {
            // Sum check: -2/15 + 4 * 3/40 = 1/6
            let w_center = -2.0 / 15.0;
            let w_inner = 3.0 / 40.0;
            let a = 0.5;
            let b = 1.0 / 6.0;
            vec![
                GaussPoint::new([0.25, 0.25, 0.25], w_center),
                GaussPoint::new([b, b, b], w_inner),
                GaussPoint::new([a, b, b], w_inner),
                GaussPoint::new([b, a, b], w_inner),
                GaussPoint::new([b, b, a], w_inner),
            ]
        }
        _ => panic!("gauss_tet: n must be 1, 4, or 5, got {}", n),
    }
}
