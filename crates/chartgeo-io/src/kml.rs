//! KML ground overlay output
//!
//! A KML `GroundOverlay` drapes the original chart image over a
//! north/south/east/west box. The box cannot express rotation or shear, so
//! this is a lower-fidelity alternative to the GeoTIFF output: rotated
//! charts are placed inaccurately.

use crate::{IoResult, write_atomic};
use chartgeo_core::{BoundingBox, CoordinatePair, Error, REQUIRED_POINTS, Result};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// MIME type of KML documents
pub const KML_MIME_TYPE: &str = "application/vnd.google-earth.kml+xml";

const DEFAULT_NAME: &str = "Georeferenced chart";

/// A KML ground overlay referencing an image by name
#[derive(Debug, Clone, PartialEq)]
pub struct GroundOverlay {
    /// Display name of the overlay
    pub name: String,
    /// `Icon/href`: the image file, relative to the KML document
    pub image_href: String,
    /// Geographic box the image is stretched over
    pub bounds: BoundingBox,
}

impl GroundOverlay {
    /// Build an overlay from reference points
    ///
    /// The box spans the extrema of the first three geographic points.
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientPoints`] if fewer than three pairs are given
    /// - [`Error::InvalidCoordinate`] if a geographic point is out of range
    /// - [`Error::DegenerateGeometry`] if the box has zero height or width
    pub fn from_pairs(pairs: &[CoordinatePair], image_href: impl Into<String>) -> Result<Self> {
        if pairs.len() < REQUIRED_POINTS {
            return Err(Error::InsufficientPoints {
                required: REQUIRED_POINTS,
                supplied: pairs.len(),
            });
        }
        let used = &pairs[..REQUIRED_POINTS];
        for pair in used {
            pair.geo.validate()?;
        }

        let bounds = BoundingBox::from_points(used.iter().map(|p| p.geo))
            .ok_or(Error::DegenerateGeometry)?;
        if bounds.is_empty() {
            return Err(Error::DegenerateGeometry);
        }

        Ok(Self {
            name: DEFAULT_NAME.to_string(),
            image_href: image_href.into(),
            bounds,
        })
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Render the overlay as a KML 2.2 document
    pub fn to_kml_string(&self) -> String {
        let b = &self.bounds;
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = write!(
            out,
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n",
                "  <GroundOverlay>\n",
                "    <name>{name}</name>\n",
                "    <Icon>\n",
                "      <href>{href}</href>\n",
                "    </Icon>\n",
                "    <LatLonBox>\n",
                "      <north>{north}</north>\n",
                "      <south>{south}</south>\n",
                "      <east>{east}</east>\n",
                "      <west>{west}</west>\n",
                "    </LatLonBox>\n",
                "  </GroundOverlay>\n",
                "</kml>\n",
            ),
            name = escape_xml(&self.name),
            href = escape_xml(&self.image_href),
            north = b.north,
            south = b.south,
            east = b.east,
            west = b.west,
        );
        out
    }
}

/// Write an overlay as KML to any writer
pub fn write_kml<W: Write>(overlay: &GroundOverlay, mut writer: W) -> IoResult<()> {
    writer.write_all(overlay.to_kml_string().as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write an overlay as KML to a file
///
/// The file only appears at `path` once it is completely written.
pub fn write_kml_file<P: AsRef<Path>>(overlay: &GroundOverlay, path: P) -> IoResult<()> {
    write_atomic(path.as_ref(), |w| write_kml(overlay, w))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
