//! Coordinate reference system tag

/// EPSG-coded coordinate reference system
///
/// Output rasters always carry [`Crs::WGS84`]; other codes only show up
/// when reading GeoTIFFs produced elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u16,
}

impl Crs {
    /// WGS84 geographic coordinates (EPSG:4326)
    pub const WGS84: Crs = Crs { epsg: 4326 };

    /// Wrap an EPSG code
    pub fn from_epsg(epsg: u16) -> Self {
        Self { epsg }
    }

    /// The EPSG code
    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    /// Human-readable name used in GeoTIFF citations, if known
    pub fn citation(&self) -> Option<&'static str> {
        match self.epsg {
            4326 => Some("WGS 84"),
            _ => None,
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}
