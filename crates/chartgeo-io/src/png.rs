//! PNG image format support
//!
//! Palettes, sub-byte grayscale and `tRNS` transparency are expanded by the
//! decoder, so the result is always 8- or 16-bit samples with 1 (gray),
//! 2 (gray + alpha), 3 (RGB) or 4 (RGBA) bands.

use crate::{IoError, IoResult};
use chartgeo_core::{BandData, Raster};
use png::{BitDepth, ColorType, Decoder, Transformations};
use std::io::{BufRead, Seek};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Raster> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let width = output_info.width;
    let height = output_info.height;
    let spp = match output_info.color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "PNG palette was not expanded".to_string(),
            ));
        }
    };

    let row_samples = width as usize * spp;
    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let rows = data.chunks(bytes_per_row).take(height as usize);

    let samples = match output_info.bit_depth {
        BitDepth::Eight => {
            let mut out = Vec::with_capacity(row_samples * height as usize);
            for row in rows {
                out.extend_from_slice(&row[..row_samples]);
            }
            BandData::U8(out)
        }
        BitDepth::Sixteen => {
            // PNG stores 16-bit samples big-endian
            let mut out = Vec::with_capacity(row_samples * height as usize);
            for row in rows {
                out.extend(
                    row[..row_samples * 2]
                        .chunks_exact(2)
                        .map(|b| u16::from_be_bytes([b[0], b[1]])),
                );
            }
            BandData::U16(out)
        }
        depth => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG bit depth after expansion: {:?}",
                depth
            )));
        }
    };

    log::debug!(
        "decoded PNG {}x{}, {} band(s), {:?}",
        width,
        height,
        spp,
        samples.sample_type()
    );
    Ok(Raster::from_interleaved(width, height, spp, samples)?)
}
