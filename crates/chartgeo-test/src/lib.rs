//! chartgeo-test - Regression test framework for chartgeo
//!
//! Provides [`RegParams`] for regression checks, supporting three modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison
//!
//! plus in-memory fixtures: synthetic rasters, PNG/JPEG encodings of them
//! and the example reference points.
//!
//! # Usage
//!
//! ```ignore
//! use chartgeo_test::RegParams;
//!
//! let mut rp = RegParams::new("affine");
//! rp.compare_values(34.0, geo.lat, 1e-6);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"
//! - `RUST_LOG`: Log level for [`init_logging`] (default `warn`)

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use chartgeo_core::{BandData, CoordinatePair, GeoPoint, PixelPoint, Raster, SampleType};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

/// Example geographic coordinates `(lat, lon)` of the three reference points
pub const EXAMPLE_GEO_COORDS: [(f64, f64); 3] =
    [(34.000, -118.000), (34.001, -118.001), (34.002, -118.002)];

/// Example pixel positions `(x, y)`, paired with [`EXAMPLE_GEO_COORDS`]
pub const EXAMPLE_PIXELS: [(f64, f64); 3] = [(100.0, 150.0), (300.0, 150.0), (100.0, 350.0)];

/// Three pixel positions on one line; no transform can be solved from them
pub const COLLINEAR_PIXELS: [(f64, f64); 3] = [(100.0, 150.0), (200.0, 250.0), (300.0, 350.0)];

/// Install an `env_logger` logger writing to the test output
///
/// The level comes from `RUST_LOG` and defaults to `warn`. Safe to call
/// from every test: only the first call installs the logger.
pub fn init_logging() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);

    let _ = Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .is_test(true)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

/// Build coordinate pairs from `(x, y)` pixels and `(lat, lon)` coordinates
pub fn pairs_from(pixels: &[(f64, f64)], geos: &[(f64, f64)]) -> Vec<CoordinatePair> {
    pixels
        .iter()
        .zip(geos)
        .map(|(&(x, y), &(lat, lon))| {
            CoordinatePair::new(PixelPoint::new(x, y), GeoPoint::new(lat, lon))
        })
        .collect()
}

/// The example reference points
pub fn example_pairs() -> Vec<CoordinatePair> {
    pairs_from(&EXAMPLE_PIXELS, &EXAMPLE_GEO_COORDS)
}

/// The example geographic coordinates on collinear pixels
pub fn collinear_example_pairs() -> Vec<CoordinatePair> {
    pairs_from(&COLLINEAR_PIXELS, &EXAMPLE_GEO_COORDS)
}

/// Deterministic gradient raster
///
/// Every band carries a different pattern so band order mix-ups show up
/// in comparisons.
pub fn gradient_raster(
    width: u32,
    height: u32,
    bands: usize,
    sample_type: SampleType,
) -> TestResult<Raster> {
    let planes = (0..bands)
        .map(|b| {
            let coords = (0..height).flat_map(move |y| (0..width).map(move |x| (x as usize, y as usize)));
            match sample_type {
                SampleType::U8 => {
                    BandData::U8(coords.map(|(x, y)| ((x * 3 + y * 5 + b * 40) % 256) as u8).collect())
                }
                SampleType::U16 => BandData::U16(
                    coords
                        .map(|(x, y)| ((x * 257 + y * 1031 + b * 4099) % 65536) as u16)
                        .collect(),
                ),
                SampleType::F32 => BandData::F32(
                    coords
                        .map(|(x, y)| x as f32 * 0.5 + y as f32 * 0.25 + b as f32)
                        .collect(),
                ),
            }
        })
        .collect();
    Ok(Raster::new(width, height, planes)?)
}

/// Encode an 8- or 16-bit raster with 1 to 4 bands as PNG
pub fn encode_png(raster: &Raster) -> TestResult<Vec<u8>> {
    let color = match raster.band_count() {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(TestError::UnsupportedFixture(format!("PNG with {} bands", n))),
    };
    let (depth, data) = match raster.interleaved() {
        BandData::U8(v) => (png::BitDepth::Eight, v),
        BandData::U16(v) => (
            png::BitDepth::Sixteen,
            v.iter().flat_map(|s| s.to_be_bytes()).collect(),
        ),
        BandData::F32(_) => {
            return Err(TestError::UnsupportedFixture(
                "PNG with float samples".to_string(),
            ));
        }
    };

    let encode_err = |e: png::EncodingError| TestError::FixtureEncode {
        message: e.to_string(),
    };
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, raster.width(), raster.height());
        encoder.set_color(color);
        encoder.set_depth(depth);
        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(&data).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;
    }
    Ok(out)
}

/// Encode an 8-bit gray or RGB raster as JPEG
pub fn encode_jpeg(raster: &Raster, quality: u8) -> TestResult<Vec<u8>> {
    let color = match raster.band_count() {
        1 => jpeg_encoder::ColorType::Luma,
        3 => jpeg_encoder::ColorType::Rgb,
        n => return Err(TestError::UnsupportedFixture(format!("JPEG with {} bands", n))),
    };
    let BandData::U8(data) = raster.interleaved() else {
        return Err(TestError::UnsupportedFixture(
            "JPEG with non-8-bit samples".to_string(),
        ));
    };
    let too_large = || TestError::UnsupportedFixture("JPEG larger than 65535".to_string());
    let width = u16::try_from(raster.width()).map_err(|_| too_large())?;
    let height = u16::try_from(raster.height()).map_err(|_| too_large())?;

    let mut out = Vec::new();
    jpeg_encoder::Encoder::new(&mut out, quality)
        .encode(&data, width, height, color)
        .map_err(|e| TestError::FixtureEncode {
            message: e.to_string(),
        })?;
    Ok(out)
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // chartgeo-test is at crates/chartgeo-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
