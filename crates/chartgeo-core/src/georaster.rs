//! Georeferenced raster
//!
//! Pairs a [`Raster`] with the [`AffineTransform`] that places it on the
//! globe and the CRS the transform is expressed in.

use crate::affine::AffineTransform;
use crate::crs::Crs;
use crate::geo::{BoundingBox, GeoPoint, PixelPoint};
use crate::raster::Raster;

/// Resampling applied when copying bands to the output
///
/// Output dimensions always equal input dimensions, so this is recorded
/// as metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    /// Nearest-neighbour
    #[default]
    Nearest,
}

/// A raster with an embedded geotransform and CRS tag
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRaster {
    raster: Raster,
    transform: AffineTransform,
    crs: Crs,
    resampling: Resampling,
}

impl GeoRaster {
    /// Attach `transform` to `raster` in WGS84
    pub fn new(raster: Raster, transform: AffineTransform) -> Self {
        Self::with_crs(raster, transform, Crs::WGS84)
    }

    /// Attach `transform` to `raster` in an explicit CRS
    pub fn with_crs(raster: Raster, transform: AffineTransform, crs: Crs) -> Self {
        Self {
            raster,
            transform,
            crs,
            resampling: Resampling::Nearest,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn resampling(&self) -> Resampling {
        self.resampling
    }

    /// Geographic extent of the whole image
    pub fn bounds(&self) -> BoundingBox {
        self.transform
            .bounds(self.raster.width(), self.raster.height())
    }

    /// Location of a pixel position
    pub fn pixel_to_geo(&self, pt: PixelPoint) -> GeoPoint {
        self.transform.pixel_to_geo(pt)
    }

    /// Consume, returning the pixel data
    pub fn into_raster(self) -> Raster {
        self.raster
    }
}
