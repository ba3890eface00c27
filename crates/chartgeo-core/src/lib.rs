//! Chartgeo Core - Basic data structures for chart georeferencing
//!
//! This crate provides the fundamental types used throughout chartgeo:
//!
//! - [`PixelPoint`] / [`GeoPoint`] / [`CoordinatePair`] - Reference points
//! - [`BoundingBox`] - Geographic extent
//! - [`AffineTransform`] - Pixel-to-geographic mapping and its 3-point solver
//! - [`Raster`] / [`BandData`] - Decoded multi-band image
//! - [`GeoRaster`] - Raster plus transform and [`Crs`] tag
//!
//! # Example
//!
//! ```
//! use chartgeo_core::{AffineTransform, CoordinatePair, GeoPoint, PixelPoint};
//!
//! let pairs = [
//!     CoordinatePair::new(PixelPoint::new(0.0, 0.0), GeoPoint::new(34.0, -118.0)),
//!     CoordinatePair::new(PixelPoint::new(100.0, 0.0), GeoPoint::new(34.0, -117.9)),
//!     CoordinatePair::new(PixelPoint::new(0.0, 100.0), GeoPoint::new(33.9, -118.0)),
//! ];
//! let t = AffineTransform::from_pairs(&pairs).unwrap();
//! let g = t.pixel_to_geo(PixelPoint::new(0.0, 0.0));
//! assert!((g.lat - 34.0).abs() < 1e-9);
//! ```

pub mod affine;
pub mod crs;
pub mod error;
pub mod geo;
pub mod georaster;
pub mod raster;

pub use affine::{AffineTransform, REQUIRED_POINTS};
pub use crs::Crs;
pub use error::{Error, Result};
pub use geo::{BoundingBox, CoordinatePair, GeoPoint, PixelPoint};
pub use georaster::{GeoRaster, Resampling};
pub use raster::{BandData, Raster, SampleType};
