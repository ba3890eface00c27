//! Pixel and geographic coordinates
//!
//! - [`PixelPoint`] - a position on the chart image, in pixels
//! - [`GeoPoint`] - a WGS84 latitude/longitude, in degrees
//! - [`CoordinatePair`] - one reference point tying the two together
//! - [`BoundingBox`] - a north/south/east/west extent

use crate::{Error, Result};

/// A pixel coordinate on the source image
///
/// `x` is the column and `y` the row, both measured from the top-left
/// corner of the top-left pixel. Fractional values are allowed since
/// reference points are picked on a scaled display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    /// Column
    pub x: f64,
    /// Row
    pub y: f64,
}

impl PixelPoint {
    /// Create a new pixel point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check that both coordinates are finite
    pub fn validate(&self) -> Result<()> {
        if self.x.is_finite() && self.y.is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate(format!(
                "pixel ({}, {}) is not finite",
                self.x, self.y
            )))
        }
    }
}

/// A geographic coordinate in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    /// Latitude, positive north
    pub lat: f64,
    /// Longitude, positive east
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographic point
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that the point is finite and within the WGS84 range
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoordinate`] if latitude is outside
    /// `[-90, 90]` or longitude outside `[-180, 180]`.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(Error::InvalidCoordinate(format!(
                "({}, {}) is not finite",
                self.lat, self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

/// A reference point: where a known location appears on the chart
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinatePair {
    pub pixel: PixelPoint,
    pub geo: GeoPoint,
}

impl CoordinatePair {
    /// Create a new coordinate pair
    pub fn new(pixel: PixelPoint, geo: GeoPoint) -> Self {
        Self { pixel, geo }
    }

    /// Build a list of pairs from parallel pixel and geographic lists
    ///
    /// The shorter list decides the number of pairs, matching how the
    /// clicked points and entered coordinates are zipped together.
    pub fn zip(pixels: &[PixelPoint], geos: &[GeoPoint]) -> Vec<Self> {
        pixels
            .iter()
            .zip(geos)
            .map(|(&pixel, &geo)| Self { pixel, geo })
            .collect()
    }
}

/// Geographic extent in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Zero-area box at a single point
    pub fn from_point(p: GeoPoint) -> Self {
        Self {
            north: p.lat,
            south: p.lat,
            east: p.lon,
            west: p.lon,
        }
    }

    /// Smallest box containing all `points`
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = Self::from_point(iter.next()?);
        Some(iter.fold(first, Self::expanded))
    }

    /// Grow the box to include `p`
    pub fn expanded(self, p: GeoPoint) -> Self {
        Self {
            north: self.north.max(p.lat),
            south: self.south.min(p.lat),
            east: self.east.max(p.lon),
            west: self.west.min(p.lon),
        }
    }

    /// North-south extent in degrees
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// East-west extent in degrees
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// True when the box covers no area
    pub fn is_empty(&self) -> bool {
        self.height() <= 0.0 || self.width() <= 0.0
    }

    /// Check whether a point lies inside or on the edge of the box
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }
}
