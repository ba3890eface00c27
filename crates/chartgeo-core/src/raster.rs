//! Multi-band raster container
//!
//! A [`Raster`] holds the decoded pixels of a chart image as separate
//! (planar) bands of a single [`SampleType`]. It is built once by a decoder
//! and never mutated afterwards; the georeferencing step copies the bands
//! through to the output file untouched.
//!
//! Decoders produce interleaved samples (`RGBRGB...`), so
//! [`Raster::from_interleaved`] and [`Raster::interleaved`] convert between
//! the two layouts.

use crate::{Error, Result};

/// Pixel sample data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// Unsigned 8-bit
    U8,
    /// Unsigned 16-bit
    U16,
    /// 32-bit IEEE float
    F32,
}

impl SampleType {
    /// Bits per sample
    pub fn bits(self) -> u16 {
        match self {
            SampleType::U8 => 8,
            SampleType::U16 => 16,
            SampleType::F32 => 32,
        }
    }
}

/// Sample buffer for one band (or for interleaved samples of all bands)
#[derive(Debug, Clone, PartialEq)]
pub enum BandData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl BandData {
    /// Sample type of the buffer
    pub fn sample_type(&self) -> SampleType {
        match self {
            BandData::U8(_) => SampleType::U8,
            BandData::U16(_) => SampleType::U16,
            BandData::F32(_) => SampleType::F32,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            BandData::U8(v) => v.len(),
            BandData::U16(v) => v.len(),
            BandData::F32(v) => v.len(),
        }
    }

    /// True if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `idx` widened to `f64`
    pub fn get(&self, idx: usize) -> Option<f64> {
        match self {
            BandData::U8(v) => v.get(idx).map(|&s| s as f64),
            BandData::U16(v) => v.get(idx).map(|&s| s as f64),
            BandData::F32(v) => v.get(idx).map(|&s| s as f64),
        }
    }
}

/// A decoded raster image
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    bands: Vec<BandData>,
}

impl Raster {
    /// Create a raster from planar bands
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] if either dimension is zero
    /// - [`Error::NoBands`] if `bands` is empty
    /// - [`Error::SampleTypeMismatch`] if the bands disagree on sample type
    /// - [`Error::BandLengthMismatch`] if a band does not hold
    ///   `width * height` samples
    pub fn new(width: u32, height: u32, bands: Vec<BandData>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let first = bands.first().ok_or(Error::NoBands)?.sample_type();
        let expected = width as usize * height as usize;
        for (band, data) in bands.iter().enumerate() {
            if data.sample_type() != first {
                return Err(Error::SampleTypeMismatch { band });
            }
            if data.len() != expected {
                return Err(Error::BandLengthMismatch {
                    band,
                    expected,
                    actual: data.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            bands,
        })
    }

    /// Create a raster from interleaved samples with `spp` samples per pixel
    pub fn from_interleaved(width: u32, height: u32, spp: usize, data: BandData) -> Result<Self> {
        if spp == 0 {
            return Err(Error::NoBands);
        }
        let expected = width as usize * height as usize * spp;
        if data.len() != expected {
            return Err(Error::BandLengthMismatch {
                band: 0,
                expected,
                actual: data.len(),
            });
        }
        let bands = match data {
            BandData::U8(v) => deinterleave(&v, spp).into_iter().map(BandData::U8).collect(),
            BandData::U16(v) => deinterleave(&v, spp).into_iter().map(BandData::U16).collect(),
            BandData::F32(v) => deinterleave(&v, spp).into_iter().map(BandData::F32).collect(),
        };
        Self::new(width, height, bands)
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Sample type shared by all bands
    pub fn sample_type(&self) -> SampleType {
        // Non-empty by construction
        self.bands[0].sample_type()
    }

    /// All bands, in order
    pub fn bands(&self) -> &[BandData] {
        &self.bands
    }

    /// A single band (0-based)
    pub fn band(&self, index: usize) -> Option<&BandData> {
        self.bands.get(index)
    }

    /// Sample of `band` at pixel `(x, y)`, widened to `f64`
    pub fn sample(&self, band: usize, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.bands.get(band)?.get(idx)
    }

    /// All bands interleaved pixel by pixel (`b0 b1 b2 b0 b1 b2 ...`)
    pub fn interleaved(&self) -> BandData {
        match self.sample_type() {
            SampleType::U8 => BandData::U8(interleave(&self.bands, |b| match b {
                BandData::U8(v) => Some(v.as_slice()),
                _ => None,
            })),
            SampleType::U16 => BandData::U16(interleave(&self.bands, |b| match b {
                BandData::U16(v) => Some(v.as_slice()),
                _ => None,
            })),
            SampleType::F32 => BandData::F32(interleave(&self.bands, |b| match b {
                BandData::F32(v) => Some(v.as_slice()),
                _ => None,
            })),
        }
    }

    /// Consume the raster, returning its bands
    pub fn into_bands(self) -> Vec<BandData> {
        self.bands
    }
}

/// Split interleaved samples into `spp` planes
fn deinterleave<T: Copy>(data: &[T], spp: usize) -> Vec<Vec<T>> {
    let mut planes: Vec<Vec<T>> = (0..spp)
        .map(|_| Vec::with_capacity(data.len() / spp))
        .collect();
    for pixel in data.chunks_exact(spp) {
        for (plane, &s) in planes.iter_mut().zip(pixel) {
            plane.push(s);
        }
    }
    planes
}

/// Merge planes into interleaved samples
fn interleave<T: Copy>(bands: &[BandData], view: impl Fn(&BandData) -> Option<&[T]>) -> Vec<T> {
    let planes: Vec<&[T]> = bands.iter().filter_map(view).collect();
    let len = planes.first().map_or(0, |p| p.len());
    let mut out = Vec::with_capacity(len * planes.len());
    for i in 0..len {
        out.extend(planes.iter().map(|p| p[i]));
    }
    out
}
