//! TIFF image format support
//!
//! This module decodes plain TIFF images into a [`Raster`] and defines the
//! compression options shared with the GeoTIFF writer.

use crate::{IoError, IoResult};
use chartgeo_core::{BandData, Raster};
use std::io::{Read, Seek};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::Compression;

/// TIFF compression format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression
    #[default]
    None,
    /// PackBits compression
    PackBits,
    /// LZW compression
    Lzw,
    /// ZIP/Deflate compression
    Zip,
}

impl TiffCompression {
    /// Convert to tiff crate's Compression enum
    pub(crate) fn to_tiff_compression(self) -> Compression {
        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::PackBits => Compression::Packbits,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::Zip => Compression::Deflate(tiff::encoder::DeflateLevel::default()),
        }
    }

    /// Value of the TIFF `Compression` tag
    pub fn tag_value(self) -> u16 {
        match self {
            TiffCompression::None => 1,
            TiffCompression::Lzw => 5,
            TiffCompression::Zip => 8,
            TiffCompression::PackBits => 0x8005,
        }
    }
}

pub(crate) fn decode_err(context: &str, e: tiff::TiffError) -> IoError {
    IoError::DecodeError(format!("TIFF {}: {}", context, e))
}

pub(crate) fn encode_err(context: &str, e: tiff::TiffError) -> IoError {
    IoError::EncodeError(format!("TIFF {}: {}", context, e))
}

/// Read the first page of a TIFF image
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<Raster> {
    let mut decoder = Decoder::new(reader).map_err(|e| decode_err("decode error", e))?;
    decode_tiff_raster(&mut decoder)
}

/// Read the compression method of the first page
pub fn tiff_compression<R: Read + Seek>(reader: R) -> IoResult<TiffCompression> {
    let mut decoder = Decoder::new(reader).map_err(|e| decode_err("decode error", e))?;

    let compression_val = decoder
        .get_tag_u32(tiff::tags::Tag::Compression)
        .unwrap_or(1); // Default: no compression

    match compression_val {
        1 => Ok(TiffCompression::None),
        5 => Ok(TiffCompression::Lzw),
        8 | 0x80B2 => Ok(TiffCompression::Zip), // Deflate or OldDeflate
        0x8005 => Ok(TiffCompression::PackBits),
        other => Err(IoError::UnsupportedFormat(format!(
            "TIFF compression {}",
            other
        ))),
    }
}

/// Decode the image at the current decoder position
pub(crate) fn decode_tiff_raster<R: Read + Seek>(decoder: &mut Decoder<R>) -> IoResult<Raster> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| decode_err("dimensions", e))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| decode_err("color type", e))?;

    let (spp, bits) = match color_type {
        ColorType::Gray(n) => (1, n),
        ColorType::GrayA(n) => (2, n),
        ColorType::RGB(n) => (3, n),
        ColorType::RGBA(n) => (4, n),
        ColorType::CMYK(n) => (4, n),
        ColorType::Multiband {
            bit_depth,
            num_samples,
        } => (num_samples as usize, bit_depth),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF color type: {:?}",
                other
            )));
        }
    };

    let image_data = decoder
        .read_image()
        .map_err(|e| decode_err("image data", e))?;

    let samples = match (image_data, bits) {
        (DecodingResult::U8(data), 8) => BandData::U8(data),
        (DecodingResult::U16(data), 16) => BandData::U16(data),
        (DecodingResult::F32(data), 32) => BandData::F32(data),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF sample layout: {:?}",
                color_type
            )));
        }
    };

    Ok(Raster::from_interleaved(width, height, spp, samples)?)
}
