//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate. Grayscale decodes to
//! one band (8- or 16-bit), RGB to three bands and CMYK to four.
//! JPEG output is not needed: georeferenced charts are always written as
//! GeoTIFF.

use crate::{IoError, IoResult};
use chartgeo_core::{BandData, Raster};
use jpeg_decoder::{Decoder, PixelFormat};
use std::io::Read;

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Raster> {
    let mut decoder = Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header not available".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    let (spp, samples) = match info.pixel_format {
        PixelFormat::L8 => (1, BandData::U8(pixels)),
        PixelFormat::L16 => (1, BandData::U16(l16_samples(&pixels))),
        PixelFormat::RGB24 => (3, BandData::U8(pixels)),
        // Kept as four raw ink bands. GeoTIFF output has no CMYK
        // photometric for them and tags them as RGBA.
        PixelFormat::CMYK32 => (4, BandData::U8(pixels)),
        #[allow(unreachable_patterns)]
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported JPEG pixel format: {:?}",
                other
            )));
        }
    };

    log::debug!(
        "decoded JPEG {}x{}, {} band(s), {:?}",
        width,
        height,
        spp,
        info.pixel_format
    );
    Ok(Raster::from_interleaved(width, height, spp, samples)?)
}

/// 16-bit lossless output comes in native byte order
fn l16_samples(pixels: &[u8]) -> Vec<u16> {
    pixels
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect()
}
