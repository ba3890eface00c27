//! Affine pixel-to-geographic transform
//!
//! This module provides the transform solver:
//! - Affine transform construction from 3 point correspondences
//! - Forward mapping of pixel coordinates to geographic coordinates
//! - Corner extents of a transformed raster
//!
//! # Affine Transform
//!
//! The transform is represented as:
//! ```text
//! | a  b  c |
//! | d  e  f |
//! | 0  0  1 |
//! ```
//!
//! The transformation equations are:
//! ```text
//! x' = a*col + b*row + c     (longitude)
//! y' = d*col + e*row + f     (latitude)
//! ```
//!
//! This is the GDAL/rasterio geotransform layout with geographic
//! x = longitude and y = latitude.

use crate::geo::{BoundingBox, CoordinatePair, GeoPoint, PixelPoint};
use crate::{Error, Result};

/// Number of correspondences that determine an affine transform
pub const REQUIRED_POINTS: usize = 3;

/// Relative area below which three pixel points count as collinear
const COLLINEAR_EPS: f64 = 1e-10;

/// 2D affine transformation (6 coefficients)
///
/// Represents the transformation:
/// ```text
/// x' = coeffs[0]*col + coeffs[1]*row + coeffs[2]
/// y' = coeffs[3]*col + coeffs[4]*row + coeffs[5]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// Coefficients [a, b, c, d, e, f]
    coeffs: [f64; 6],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// Create the identity transformation
    pub fn identity() -> Self {
        Self {
            coeffs: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    /// Create from raw coefficients `[a, b, c, d, e, f]`
    pub fn from_coeffs(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// Get the raw coefficients
    pub fn coeffs(&self) -> &[f64; 6] {
        &self.coeffs
    }

    /// Longitude change per column
    pub fn a(&self) -> f64 {
        self.coeffs[0]
    }

    /// Longitude change per row
    pub fn b(&self) -> f64 {
        self.coeffs[1]
    }

    /// Longitude of pixel corner (0, 0)
    pub fn c(&self) -> f64 {
        self.coeffs[2]
    }

    /// Latitude change per column
    pub fn d(&self) -> f64 {
        self.coeffs[3]
    }

    /// Latitude change per row
    pub fn e(&self) -> f64 {
        self.coeffs[4]
    }

    /// Latitude of pixel corner (0, 0)
    pub fn f(&self) -> f64 {
        self.coeffs[5]
    }

    /// Compute the transform from a list of reference points
    ///
    /// Only the first three pairs are used; any further pairs are ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientPoints`] if fewer than three pairs are given
    /// - [`Error::DegenerateGeometry`] if the first three pixel points are
    ///   collinear
    /// - [`Error::InvalidCoordinate`] if any of them is out of range
    pub fn from_pairs(pairs: &[CoordinatePair]) -> Result<Self> {
        if pairs.len() < REQUIRED_POINTS {
            return Err(Error::InsufficientPoints {
                required: REQUIRED_POINTS,
                supplied: pairs.len(),
            });
        }
        if pairs.len() > REQUIRED_POINTS {
            log::warn!(
                "using the first {} of {} reference points, ignoring {}",
                REQUIRED_POINTS,
                pairs.len(),
                pairs.len() - REQUIRED_POINTS
            );
        }
        let pixels = [pairs[0].pixel, pairs[1].pixel, pairs[2].pixel];
        let geos = [pairs[0].geo, pairs[1].geo, pairs[2].geo];
        Self::from_three_points(pixels, geos)
    }

    /// Compute the transform from exactly three point correspondences
    ///
    /// Solves two 3x3 systems that share the pixel design matrix
    /// `[[x1 y1 1] [x2 y2 1] [x3 y3 1]]`: one for the longitude
    /// coefficients `(a, b, c)`, one for the latitude coefficients
    /// `(d, e, f)`. The result maps each pixel point exactly onto its
    /// geographic point.
    pub fn from_three_points(pixels: [PixelPoint; 3], geos: [GeoPoint; 3]) -> Result<Self> {
        for p in &pixels {
            p.validate()?;
        }
        for g in &geos {
            g.validate()?;
        }
        if is_collinear(&pixels) {
            return Err(Error::DegenerateGeometry);
        }

        log::debug!("source points: {:?}", pixels);
        log::debug!("destination points: {:?}", geos);

        let design = pixels.map(|p| [p.x, p.y, 1.0]);
        let lon = solve3(design, geos.map(|g| g.lon)).ok_or(Error::DegenerateGeometry)?;
        let lat = solve3(design, geos.map(|g| g.lat)).ok_or(Error::DegenerateGeometry)?;

        Ok(Self {
            coeffs: [lon[0], lon[1], lon[2], lat[0], lat[1], lat[2]],
        })
    }

    /// Transform a pixel position, returning `(x', y')` = `(lon, lat)`
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.coeffs;
        (a * col + b * row + c, d * col + e * row + f)
    }

    /// Transform a pixel point to a geographic point
    pub fn pixel_to_geo(&self, pt: PixelPoint) -> GeoPoint {
        let (lon, lat) = self.apply(pt.x, pt.y);
        GeoPoint { lat, lon }
    }

    /// True when the transform has no rotation or shear terms
    pub fn is_rectilinear(&self) -> bool {
        self.coeffs[1] == 0.0 && self.coeffs[3] == 0.0
    }

    /// Geographic extent of a `width` x `height` raster under this transform
    ///
    /// Maps the four outer pixel corners, `(0, 0)` through
    /// `(width, height)`, and takes their extrema.
    pub fn bounds(&self, width: u32, height: u32) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let [first, rest @ ..] = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
            .map(|(col, row)| self.pixel_to_geo(PixelPoint::new(col, row)));
        rest.into_iter()
            .fold(BoundingBox::from_point(first), BoundingBox::expanded)
    }
}

/// Check whether three points are collinear (or coincident)
///
/// Compares twice the signed triangle area against the squared extent of
/// the points, so the test is independent of the pixel scale.
fn is_collinear(pts: &[PixelPoint; 3]) -> bool {
    let [p1, p2, p3] = pts;
    let area2 = (p2.x - p1.x) * (p3.y - p1.y) - (p3.x - p1.x) * (p2.y - p1.y);

    let xs = [p1.x, p2.x, p3.x];
    let ys = [p1.y, p2.y, p3.y];
    let span = |v: [f64; 3]| {
        v.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
            - v.iter().cloned().fold(f64::INFINITY, f64::min)
    };
    let extent = span(xs).max(span(ys));
    if extent == 0.0 {
        return true;
    }
    area2.abs() <= COLLINEAR_EPS * extent * extent
}

/// Gauss-Jordan elimination for a 3x3 system Ax = b.
/// Returns the solution x, or None if singular.
fn solve3(a: [[f64; 3]; 3], b: [f64; 3]) -> Option<[f64; 3]> {
    // Augmented matrix [A | b]
    let mut m = [[0.0f64; 4]; 3];
    for (row, (a_row, &b_val)) in m.iter_mut().zip(a.iter().zip(b.iter())) {
        row[..3].copy_from_slice(a_row);
        row[3] = b_val;
    }

    for col in 0..3 {
        // Partial pivoting
        let pivot = (col..3).max_by(|&i, &j| {
            m[i][col]
                .abs()
                .partial_cmp(&m[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        m.swap(col, pivot);

        let diag = m[col][col];
        if diag == 0.0 || !diag.is_finite() {
            return None;
        }
        for v in &mut m[col] {
            *v /= diag;
        }
        let pivot_row = m[col];
        for (row, m_row) in m.iter_mut().enumerate() {
            if row == col {
                continue;
            }
            let factor = m_row[col];
            for (rv, &pv) in m_row.iter_mut().zip(pivot_row.iter()) {
                *rv -= pv * factor;
            }
        }
    }

    Some([m[0][3], m[1][3], m[2][3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(x: f64, y: f64, lat: f64, lon: f64) -> CoordinatePair {
        CoordinatePair::new(PixelPoint::new(x, y), GeoPoint::new(lat, lon))
    }

    #[test]
    fn test_identity() {
        let t = AffineTransform::identity();
        assert_eq!(t.apply(3.0, 4.0), (3.0, 4.0));
        assert!(t.is_rectilinear());
    }

    #[test]
    fn test_solve3_simple() {
        // x + y + z = 6, 2y + 5z = -4, 2x + 5y - z = 27
        let a = [[1.0, 1.0, 1.0], [0.0, 2.0, 5.0], [2.0, 5.0, -1.0]];
        let x = solve3(a, [6.0, -4.0, 27.0]).unwrap();
        assert!((x[0] - 5.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
        assert!((x[2] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve3_singular() {
        let a = [[1.0, 2.0, 1.0], [2.0, 4.0, 1.0], [3.0, 6.0, 1.0]];
        assert!(solve3(a, [1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_from_pairs_north_up() {
        // 0.001 degree per pixel, north up
        let pairs = [
            pair(0.0, 0.0, 34.0, -118.0),
            pair(100.0, 0.0, 34.0, -117.9),
            pair(0.0, 100.0, 33.9, -118.0),
        ];
        let t = AffineTransform::from_pairs(&pairs).unwrap();
        assert!((t.a() - 0.001).abs() < 1e-12);
        assert!(t.b().abs() < 1e-12);
        assert!((t.c() + 118.0).abs() < 1e-12);
        assert!(t.d().abs() < 1e-12);
        assert!((t.e() + 0.001).abs() < 1e-12);
        assert!((t.f() - 34.0).abs() < 1e-12);
    }

    #[test]
    fn test_reproduces_reference_points() {
        let pairs = [
            pair(100.0, 150.0, 34.000, -118.000),
            pair(200.0, 260.0, 34.001, -118.001),
            pair(310.0, 350.0, 34.002, -118.002),
        ];
        let t = AffineTransform::from_pairs(&pairs).unwrap();
        for p in &pairs {
            let g = t.pixel_to_geo(p.pixel);
            assert!((g.lat - p.geo.lat).abs() < 1e-9);
            assert!((g.lon - p.geo.lon).abs() < 1e-9);
        }
    }

    #[test]
    fn test_insufficient_points() {
        let pairs = [pair(0.0, 0.0, 1.0, 1.0), pair(1.0, 0.0, 1.0, 2.0)];
        assert_eq!(
            AffineTransform::from_pairs(&pairs),
            Err(Error::InsufficientPoints {
                required: 3,
                supplied: 2
            })
        );
        assert!(matches!(
            AffineTransform::from_pairs(&[]),
            Err(Error::InsufficientPoints { supplied: 0, .. })
        ));
    }

    #[test]
    fn test_collinear_points() {
        let pairs = [
            pair(0.0, 0.0, 1.0, 1.0),
            pair(1.0, 1.0, 2.0, 2.0),
            pair(2.0, 2.0, 3.0, 1.0),
        ];
        assert_eq!(
            AffineTransform::from_pairs(&pairs),
            Err(Error::DegenerateGeometry)
        );
    }

    #[test]
    fn test_coincident_points() {
        let pairs = [
            pair(5.0, 5.0, 1.0, 1.0),
            pair(5.0, 5.0, 2.0, 2.0),
            pair(5.0, 5.0, 3.0, 1.0),
        ];
        assert_eq!(
            AffineTransform::from_pairs(&pairs),
            Err(Error::DegenerateGeometry)
        );
    }

    #[test]
    fn test_extra_points_ignored() {
        let three = [
            pair(0.0, 0.0, 10.0, 20.0),
            pair(10.0, 0.0, 10.0, 21.0),
            pair(0.0, 10.0, 9.0, 20.0),
        ];
        let mut four = three.to_vec();
        four.push(pair(50.0, 50.0, -45.0, 100.0));
        assert_eq!(
            AffineTransform::from_pairs(&three).unwrap(),
            AffineTransform::from_pairs(&four).unwrap()
        );
    }

    #[test]
    fn test_invalid_geo_rejected() {
        let pairs = [
            pair(0.0, 0.0, 95.0, 20.0),
            pair(10.0, 0.0, 10.0, 21.0),
            pair(0.0, 10.0, 9.0, 20.0),
        ];
        assert!(matches!(
            AffineTransform::from_pairs(&pairs),
            Err(Error::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_bounds_rotated() {
        // 90 degree rotation: columns run south, rows run west
        let t = AffineTransform::from_coeffs([0.0, -1.0, 10.0, -1.0, 0.0, 50.0]);
        assert!(!t.is_rectilinear());
        let b = t.bounds(4, 2);
        assert_eq!(b.north, 50.0);
        assert_eq!(b.south, 46.0);
        assert_eq!(b.east, 10.0);
        assert_eq!(b.west, 8.0);
    }
}
