//! Chartgeo I/O - Image decoding and georeferenced output
//!
//! Reads chart images into a [`Raster`] and writes georeferenced results:
//!
//! - PNG, JPEG and TIFF decoding, selected by magic number
//! - GeoTIFF output (and read-back) for a [`GeoRaster`]
//! - KML `GroundOverlay` output
//!
//! Formats are gated behind the `png-format`, `jpeg` and `tiff-format`
//! features, all enabled by default.

pub mod error;
pub mod format;
pub mod kml;

#[cfg(feature = "png-format")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(feature = "tiff-format")]
pub mod tiff;

#[cfg(feature = "tiff-format")]
pub mod geotiff;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};
pub use kml::{GroundOverlay, KML_MIME_TYPE, write_kml, write_kml_file};

#[cfg(feature = "tiff-format")]
pub use crate::geotiff::{GeoTiffInfo, GeoTiffWriter, read_geotiff, read_geotiff_info};
#[cfg(feature = "tiff-format")]
pub use crate::tiff::TiffCompression;

use chartgeo_core::{GeoRaster, Raster};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Read an image file, detecting its format from the header
pub fn read_raster<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let file = File::open(path).map_err(IoError::Io)?;
    read_raster_with_format(BufReader::new(file), format)
}

/// Read an image from memory, detecting its format from the header
pub fn read_raster_from_bytes(data: &[u8]) -> IoResult<Raster> {
    let format = detect_format_from_bytes(data)?;
    read_raster_with_format(Cursor::new(data), format)
}

/// Read an image of a known format
pub fn read_raster_with_format<R: BufRead + Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<Raster> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => crate::png::read_png(reader),

        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => crate::jpeg::read_jpeg(reader),

        #[cfg(feature = "tiff-format")]
        ImageFormat::Tiff => crate::tiff::read_tiff(reader),

        #[allow(unreachable_patterns)]
        _ => {
            drop(reader);
            Err(IoError::UnsupportedFormat(format!(
                "{:?} support not enabled",
                format
            )))
        }
    }
}

/// Write a georeferenced raster as an uncompressed GeoTIFF file
#[cfg(feature = "tiff-format")]
pub fn write_geotiff_file<P: AsRef<Path>>(georaster: &GeoRaster, path: P) -> IoResult<()> {
    GeoTiffWriter::new(georaster).write(path)
}

/// Write a file through a temporary sibling and rename it into place
///
/// `write` receives a buffered writer over the temporary file. If it fails,
/// the temporary file is removed and `path` is left untouched.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> IoResult<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> IoResult<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(".chartgeo")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| IoError::Io(e.error))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
