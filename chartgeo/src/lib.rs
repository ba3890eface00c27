//! chartgeo - Georeference scanned aeronautical charts
//!
//! Turns a chart image plus three reference points (where known locations
//! appear on the image) into a georeferenced GeoTIFF in WGS84 /
//! EPSG:4326, or into a KML ground overlay.
//!
//! # Overview
//!
//! - [`AffineTransform`] - the exact 3-point pixel-to-geographic transform
//! - [`Upload`] - a PNG or JPEG chart as received from the user interface
//! - [`Georeferencer`] - runs the whole pipeline and produces [`Artifact`]s
//! - [`io`] - image decoding, GeoTIFF and KML output
//!
//! # Example
//!
//! ```
//! use chartgeo::{CoordinatePair, GeoPoint, Georeferencer, PixelPoint, Raster, BandData};
//!
//! let raster = Raster::new(200, 200, vec![BandData::U8(vec![0; 200 * 200])]).unwrap();
//! let pairs = [
//!     CoordinatePair::new(PixelPoint::new(0.0, 0.0), GeoPoint::new(34.0, -118.0)),
//!     CoordinatePair::new(PixelPoint::new(200.0, 0.0), GeoPoint::new(34.0, -117.8)),
//!     CoordinatePair::new(PixelPoint::new(0.0, 200.0), GeoPoint::new(33.8, -118.0)),
//! ];
//!
//! let geo = Georeferencer::default().georeference(&raster, &pairs).unwrap();
//! let bounds = geo.bounds();
//! assert!((bounds.north - 34.0).abs() < 1e-9);
//! assert!((bounds.east + 117.8).abs() < 1e-9);
//! ```

mod georef_error;
mod pipeline;
mod upload;

// Re-export core types (primary data structures used everywhere)
pub use chartgeo_core::*;

// Re-export the I/O crate as a module to avoid name conflicts
pub use chartgeo_io as io;

pub use georef_error::{ErrorKind, GeorefError, GeorefResult};
pub use pipeline::{
    Artifact, GEOTIFF_DOWNLOAD_NAME, GeorefOptions, Georeferencer, KML_DOWNLOAD_NAME,
};
pub use upload::Upload;
