//! Uploaded chart images

use chartgeo_core::Raster;
use chartgeo_io::{ImageFormat, IoError, IoResult, detect_format_from_bytes};
use std::io::Cursor;
use std::path::Path;

/// A chart image as handed over by the user interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name, e.g. `"ksfo_ils28r.png"`
    pub name: String,
    /// MIME type reported by the uploader, if any
    pub mime_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create an upload from its name, reported MIME type and contents
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from a local file
    ///
    /// The name is the file name of `path`; no MIME type is recorded.
    pub fn from_file<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            mime_type: None,
            bytes,
        })
    }

    /// Detect the image format from the contents
    ///
    /// Only PNG and JPEG are accepted. When the reported MIME type
    /// disagrees with the contents, the contents win.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] for anything but PNG or JPEG,
    /// and [`IoError::InvalidData`] for uploads too short to identify.
    pub fn format(&self) -> IoResult<ImageFormat> {
        let format = detect_format_from_bytes(&self.bytes)?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(IoError::UnsupportedFormat(format!(
                "{:?} upload, expected PNG or JPEG",
                format
            )));
        }

        if let Some(mime) = &self.mime_type {
            match ImageFormat::from_mime_type(mime) {
                Some(reported) if reported == format => {}
                _ => log::warn!(
                    "{}: reported MIME type {} but contents are {}",
                    self.name,
                    mime,
                    format.mime_type()
                ),
            }
        }
        Ok(format)
    }

    /// Decode the uploaded image
    pub fn decode(&self) -> IoResult<Raster> {
        let format = self.format()?;
        let raster = chartgeo_io::read_raster_with_format(Cursor::new(&self.bytes[..]), format)?;
        log::debug!(
            "decoded upload {}: {}x{}, {} band(s)",
            self.name,
            raster.width(),
            raster.height(),
            raster.band_count()
        );
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_format_png() {
        let upload = Upload::new("chart.png", Some("image/png"), PNG_HEADER.to_vec());
        assert_eq!(upload.format().unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_mime_mismatch_uses_contents() {
        let upload = Upload::new("chart.jpg", Some("image/jpeg"), PNG_HEADER.to_vec());
        assert_eq!(upload.format().unwrap(), ImageFormat::Png);
        let upload = Upload::new("chart", Some("application/octet-stream"), PNG_HEADER.to_vec());
        assert_eq!(upload.format().unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_tiff_rejected() {
        let upload = Upload::new("chart.tif", None, vec![0x49, 0x49, 0x2A, 0x00, 8, 0, 0, 0]);
        assert!(matches!(
            upload.format(),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_rejected() {
        let upload = Upload::new("empty.png", Some("image/png"), Vec::new());
        assert!(matches!(upload.format(), Err(IoError::InvalidData(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ksfo_ils28r.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let upload = Upload::from_file(&path).unwrap();
        assert_eq!(upload.name, "ksfo_ils28r.png");
        assert_eq!(upload.mime_type, None);
        assert_eq!(upload.bytes, PNG_HEADER.to_vec());
        assert_eq!(upload.format().unwrap(), ImageFormat::Png);

        assert!(matches!(
            Upload::from_file(dir.path().join("missing.png")),
            Err(IoError::Io(_))
        ));
    }
}
