//! End-to-end georeferencing
//!
//! [`Georeferencer`] ties the pieces together: solve the affine transform
//! from the reference points, decode the chart, attach the transform and
//! the WGS84 CRS, and write the result as a GeoTIFF (or, in the
//! lower-fidelity mode, a KML ground overlay).
//!
//! Output files for uploads get a fresh unique name in the output
//! directory, so concurrent runs never collide. Every output is written
//! completely before it becomes visible under its final name.

use crate::georef_error::GeorefResult;
use crate::upload::Upload;
use chartgeo_core::{AffineTransform, CoordinatePair, GeoRaster, Raster};
use chartgeo_io::{
    GeoTiffWriter, GroundOverlay, ImageFormat, IoResult, KML_MIME_TYPE, TiffCompression,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Download name of georeferenced GeoTIFF artifacts
pub const GEOTIFF_DOWNLOAD_NAME: &str = "georeferenced_chart.tif";

/// Download name of KML overlay artifacts
pub const KML_DOWNLOAD_NAME: &str = "overlay.kml";

/// Options for a [`Georeferencer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeorefOptions {
    /// GeoTIFF compression
    pub compression: TiffCompression,
    /// Directory for upload artifacts; the system temporary directory if
    /// `None`
    pub output_dir: Option<PathBuf>,
}

impl GeorefOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the GeoTIFF compression
    #[must_use]
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the directory upload artifacts are written to
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// A file produced for download
///
/// The caller owns the file at `path` and is responsible for removing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the written file
    pub path: PathBuf,
    /// Name to offer the file under
    pub file_name: String,
    /// MIME type of the file
    pub mime_type: String,
}

impl Artifact {
    /// Read the file contents for download
    pub fn read_bytes(&self) -> GeorefResult<Vec<u8>> {
        Ok(std::fs::read(&self.path).map_err(chartgeo_io::IoError::Io)?)
    }
}

/// Georeferences chart images from three reference points
#[derive(Debug, Clone, Default)]
pub struct Georeferencer {
    options: GeorefOptions,
}

impl Georeferencer {
    /// Create a georeferencer with the given options
    pub fn new(options: GeorefOptions) -> Self {
        Self { options }
    }

    /// Get the options
    pub fn options(&self) -> &GeorefOptions {
        &self.options
    }

    /// Attach the transform solved from `pairs` to a copy of `raster`
    ///
    /// # Errors
    ///
    /// Fails with the solver's error for fewer than three pairs, collinear
    /// pixels or out-of-range coordinates.
    pub fn georeference(&self, raster: &Raster, pairs: &[CoordinatePair]) -> GeorefResult<GeoRaster> {
        let transform = AffineTransform::from_pairs(pairs)?;
        Ok(GeoRaster::new(raster.clone(), transform))
    }

    /// Georeference the image at `src` and write it as a GeoTIFF to `dst`
    ///
    /// The points are checked before the image is read, so invalid points
    /// fail without touching the file system.
    pub fn georeference_file<P, Q>(
        &self,
        src: P,
        pairs: &[CoordinatePair],
        dst: Q,
    ) -> GeorefResult<GeoRaster>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let transform = AffineTransform::from_pairs(pairs)?;
        let raster = chartgeo_io::read_raster(src.as_ref())?;
        let georaster = GeoRaster::new(raster, transform);

        GeoTiffWriter::new(&georaster)
            .compression(self.options.compression)
            .write(dst.as_ref())?;
        log::info!(
            "georeferenced {} -> {}",
            src.as_ref().display(),
            dst.as_ref().display()
        );
        Ok(georaster)
    }

    /// Georeference an uploaded chart into a fresh GeoTIFF artifact
    pub fn georeference_upload(
        &self,
        upload: &Upload,
        pairs: &[CoordinatePair],
    ) -> GeorefResult<Artifact> {
        let transform = AffineTransform::from_pairs(pairs)?;
        let raster = upload.decode()?;
        let georaster = GeoRaster::new(raster, transform);

        let writer = GeoTiffWriter::new(&georaster).compression(self.options.compression);
        let path = self.write_fresh(".tif", |w| writer.write_to(w))?;
        log::info!("georeferenced upload {} -> {}", upload.name, path.display());

        Ok(Artifact {
            path,
            file_name: GEOTIFF_DOWNLOAD_NAME.to_string(),
            mime_type: ImageFormat::Tiff.mime_type().to_string(),
        })
    }

    /// Describe an uploaded chart as a KML ground overlay artifact
    ///
    /// The overlay references the upload by its name and spans the
    /// bounding box of the first three geographic points.
    pub fn overlay_upload(&self, upload: &Upload, pairs: &[CoordinatePair]) -> GeorefResult<Artifact> {
        upload.format()?;
        let overlay = GroundOverlay::from_pairs(pairs, upload.name.as_str())?;

        let path = self.write_fresh(".kml", |w| chartgeo_io::write_kml(&overlay, w))?;
        log::info!("wrote overlay for {} -> {}", upload.name, path.display());

        Ok(Artifact {
            path,
            file_name: KML_DOWNLOAD_NAME.to_string(),
            mime_type: KML_MIME_TYPE.to_string(),
        })
    }

    /// Write a uniquely named file in the output directory and keep it
    fn write_fresh<F>(&self, suffix: &str, write: F) -> GeorefResult<PathBuf>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> IoResult<()>,
    {
        let dir = self.options.resolved_output_dir();
        let mut tmp = tempfile::Builder::new()
            .prefix("chartgeo-")
            .suffix(suffix)
            .tempfile_in(&dir)
            .map_err(chartgeo_io::IoError::Io)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write(&mut writer)?;
            writer.flush().map_err(chartgeo_io::IoError::Io)?;
        }
        let (_, path) = tmp.keep()?;
        Ok(path)
    }
}
