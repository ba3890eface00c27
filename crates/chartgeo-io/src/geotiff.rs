//! GeoTIFF writer and reader
//!
//! Writes a [`GeoRaster`] as a GeoTIFF: the bands are copied unchanged and
//! the affine transform plus CRS are stored in the GeoTIFF tags, so GIS and
//! mapping tools place the chart without further input.
//!
//! # Tags written
//!
//! | Tag | Contents |
//! |---|---|
//! | `ModelPixelScaleTag` + `ModelTiepointTag` | north-up transforms (`b = d = 0`) |
//! | `ModelTransformationTag` | rotated or skewed transforms |
//! | `GeoKeyDirectoryTag` | geographic model, PixelIsArea, EPSG code, citation, degrees |
//! | `GeoAsciiParamsTag` | citation text (`"WGS 84|"`) |

use crate::tiff::{TiffCompression, decode_err, decode_tiff_raster, encode_err};
use crate::{IoError, IoResult, write_atomic};
use chartgeo_core::{AffineTransform, BandData, Crs, GeoRaster};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tiff::decoder::Decoder;
use tiff::encoder::colortype::{
    self, Gray8, Gray16, Gray32Float, RGB8, RGB16, RGB32Float, RGBA8, RGBA16, RGBA32Float,
};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;

// GeoTIFF tag IDs
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
const GEOTIFF_MODELTIEPOINT: u16 = 33922;
const GEOTIFF_MODELTRANSFORMATION: u16 = 34264;
const GEOTIFF_GEOKEYDIRECTORY: u16 = 34735;
const GEOTIFF_GEOASCIIPARAMS: u16 = 34737;

// GeoKey IDs
const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const GEOG_CITATION_GEO_KEY: u16 = 2049;
const GEOG_ANGULAR_UNITS_GEO_KEY: u16 = 2054;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

// GeoKey values
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;
const ANGULAR_DEGREE: u16 = 9102;

/// Builder for configuring GeoTIFF output
pub struct GeoTiffWriter<'a> {
    georaster: &'a GeoRaster,
    compression: TiffCompression,
}

impl<'a> GeoTiffWriter<'a> {
    /// Create a new GeoTIFF writer for a georeferenced raster
    #[must_use]
    pub fn new(georaster: &'a GeoRaster) -> Self {
        Self {
            georaster,
            compression: TiffCompression::default(),
        }
    }

    /// Set the compression method
    ///
    /// Applies to 1-, 3- and 4-band rasters; other band counts are always
    /// written uncompressed.
    #[must_use]
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Write to a file path
    ///
    /// The file only appears at `path` once it is completely written.
    pub fn write<P: AsRef<Path>>(self, path: P) -> IoResult<()> {
        write_atomic(path.as_ref(), |w| self.write_to(w))
    }

    /// Write to any writer that implements Write + Seek
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> IoResult<()> {
        let raster = self.georaster.raster();
        let width = raster.width();
        let height = raster.height();

        let encoder = TiffEncoder::new(writer).map_err(|e| encode_err("encoder error", e))?;

        let samples = raster.interleaved();
        match (raster.band_count(), &samples) {
            (1, BandData::U8(d)) => self.write_image::<_, Gray8>(encoder, d),
            (1, BandData::U16(d)) => self.write_image::<_, Gray16>(encoder, d),
            (1, BandData::F32(d)) => self.write_image::<_, Gray32Float>(encoder, d),
            (3, BandData::U8(d)) => self.write_image::<_, RGB8>(encoder, d),
            (3, BandData::U16(d)) => self.write_image::<_, RGB16>(encoder, d),
            (3, BandData::F32(d)) => self.write_image::<_, RGB32Float>(encoder, d),
            (4, BandData::U8(d)) => self.write_image::<_, RGBA8>(encoder, d),
            (4, BandData::U16(d)) => self.write_image::<_, RGBA16>(encoder, d),
            (4, BandData::F32(d)) => self.write_image::<_, RGBA32Float>(encoder, d),
            (bands, _) => {
                if self.compression != TiffCompression::None {
                    log::warn!(
                        "{} band raster written uncompressed, {:?} not applied",
                        bands,
                        self.compression
                    );
                }
                self.write_multiband_image(encoder, &samples)
            }
        }?;

        log::debug!(
            "wrote GeoTIFF {}x{}, {} band(s), {}",
            width,
            height,
            raster.band_count(),
            self.georaster.crs()
        );
        Ok(())
    }

    fn write_image<W, C>(&self, encoder: TiffEncoder<W>, data: &[C::Inner]) -> IoResult<()>
    where
        W: Write + Seek,
        C: colortype::ColorType,
        [C::Inner]: TiffValue,
    {
        let raster = self.georaster.raster();
        let mut encoder = encoder.with_compression(self.compression.to_tiff_compression());
        let mut image = encoder
            .new_image::<C>(raster.width(), raster.height())
            .map_err(|e| encode_err("image error", e))?;
        self.write_geotiff_tags(image.encoder())?;
        image
            .write_data(data)
            .map_err(|e| encode_err("write error", e))
    }

    /// Write a raster with an arbitrary band count (2, 5, ...) using the
    /// low-level DirectoryEncoder API. Bands beyond the first are marked as
    /// unspecified extra samples.
    fn write_multiband_image<W: Write + Seek>(
        &self,
        mut encoder: TiffEncoder<W>,
        samples: &BandData,
    ) -> IoResult<()> {
        let raster = self.georaster.raster();
        let bands = raster.band_count();
        let sample_type = raster.sample_type();
        let tag_err = |e: tiff::TiffError| encode_err("tag error", e);

        let mut dir = encoder
            .image_directory()
            .map_err(|e| encode_err("directory error", e))?;

        dir.write_tag(Tag::ImageWidth, raster.width())
            .map_err(tag_err)?;
        dir.write_tag(Tag::ImageLength, raster.height())
            .map_err(tag_err)?;

        let bits_per_sample: Vec<u16> = vec![sample_type.bits(); bands];
        dir.write_tag(Tag::BitsPerSample, bits_per_sample.as_slice())
            .map_err(tag_err)?;
        dir.write_tag(Tag::Compression, TiffCompression::None.tag_value())
            .map_err(tag_err)?;
        // BlackIsZero
        dir.write_tag(Tag::PhotometricInterpretation, 1u16)
            .map_err(tag_err)?;
        dir.write_tag(Tag::SamplesPerPixel, bands as u16)
            .map_err(tag_err)?;

        // 1 = unsigned integer, 3 = IEEE float
        let format = match sample_type {
            chartgeo_core::SampleType::F32 => 3u16,
            _ => 1u16,
        };
        let sample_format: Vec<u16> = vec![format; bands];
        dir.write_tag(Tag::SampleFormat, sample_format.as_slice())
            .map_err(tag_err)?;
        // Chunky (interleaved)
        dir.write_tag(Tag::PlanarConfiguration, 1u16)
            .map_err(tag_err)?;
        dir.write_tag(Tag::RowsPerStrip, raster.height())
            .map_err(tag_err)?;

        if bands > 1 {
            let extra_samples: Vec<u16> = vec![0; bands - 1];
            dir.write_tag(Tag::ExtraSamples, extra_samples.as_slice())
                .map_err(tag_err)?;
        }

        self.write_geotiff_tags(&mut dir)?;

        let data_err = |e: tiff::TiffError| encode_err("strip error", e);
        let (offset, byte_count) = match samples {
            BandData::U8(v) => (dir.write_data(v.as_slice()).map_err(data_err)?, v.len()),
            BandData::U16(v) => (dir.write_data(v.as_slice()).map_err(data_err)?, v.len() * 2),
            BandData::F32(v) => (dir.write_data(v.as_slice()).map_err(data_err)?, v.len() * 4),
        };
        let offset = u32::try_from(offset)
            .map_err(|_| IoError::EncodeError("strip offset exceeds 4 GiB".to_string()))?;
        let byte_count = u32::try_from(byte_count)
            .map_err(|_| IoError::EncodeError("strip exceeds 4 GiB".to_string()))?;
        dir.write_tag(Tag::StripOffsets, offset).map_err(tag_err)?;
        dir.write_tag(Tag::StripByteCounts, byte_count)
            .map_err(tag_err)?;

        dir.finish().map_err(|e| encode_err("directory error", e))
    }

    fn write_geotiff_tags<W: Write + Seek, K: TiffKind>(
        &self,
        dir: &mut DirectoryEncoder<W, K>,
    ) -> IoResult<()> {
        let t = self.georaster.transform();
        let tag_err = |e: tiff::TiffError| encode_err("GeoTIFF tag error", e);
        let geo_tag = Tag::from_u16_exhaustive;

        if t.is_rectilinear() {
            // ModelPixelScale: [ScaleX, ScaleY, ScaleZ], ScaleY positive
            // when latitude decreases down the image
            let pixel_scale = [t.a(), -t.e(), 0.0];
            dir.write_tag(geo_tag(GEOTIFF_MODELPIXELSCALE), pixel_scale.as_slice())
                .map_err(tag_err)?;

            // ModelTiepoint: [I, J, K, X, Y, Z] ties pixel corner (0, 0)
            let tiepoint = [0.0, 0.0, 0.0, t.c(), t.f(), 0.0];
            dir.write_tag(geo_tag(GEOTIFF_MODELTIEPOINT), tiepoint.as_slice())
                .map_err(tag_err)?;
        } else {
            let matrix = model_transformation(t);
            dir.write_tag(geo_tag(GEOTIFF_MODELTRANSFORMATION), matrix.as_slice())
                .map_err(tag_err)?;
        }

        let crs = self.georaster.crs();
        let citation = crs.citation().map(|c| format!("{}|", c));
        let geokeys = build_geokey_directory(crs, citation.as_deref());
        dir.write_tag(geo_tag(GEOTIFF_GEOKEYDIRECTORY), geokeys.as_slice())
            .map_err(tag_err)?;

        if let Some(ascii) = citation {
            dir.write_tag(geo_tag(GEOTIFF_GEOASCIIPARAMS), ascii.as_str())
                .map_err(tag_err)?;
        }

        Ok(())
    }
}

/// Row-major 4x4 `ModelTransformationTag` matrix for an affine transform
fn model_transformation(t: &AffineTransform) -> [f64; 16] {
    let [a, b, c, d, e, f] = *t.coeffs();
    [
        a, b, 0.0, c, //
        d, e, 0.0, f, //
        0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Build the GeoKeyDirectory for a geographic CRS
///
/// Layout: `[KeyDirectoryVersion, KeyRevision, MinorRevision, NumberOfKeys,
/// KeyID1, TIFFTagLocation1, Count1, Value_Offset1, ...]`, keys sorted by ID.
fn build_geokey_directory(crs: Crs, citation: Option<&str>) -> Vec<u16> {
    let mut entries: Vec<[u16; 4]> = vec![
        // TIFFTagLocation = 0 means value is in Value_Offset
        [GT_MODEL_TYPE_GEO_KEY, 0, 1, MODEL_TYPE_GEOGRAPHIC],
        [GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA],
        [GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, crs.epsg()],
    ];
    if let Some(text) = citation {
        // Offset 0 into GeoAsciiParams, length includes the '|'
        entries.push([
            GEOG_CITATION_GEO_KEY,
            GEOTIFF_GEOASCIIPARAMS,
            text.len() as u16,
            0,
        ]);
    }
    entries.push([GEOG_ANGULAR_UNITS_GEO_KEY, 0, 1, ANGULAR_DEGREE]);

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    for entry in entries {
        keys.extend_from_slice(&entry);
    }
    keys
}

/// Georeferencing read back from GeoTIFF tags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTiffInfo {
    /// Pixel-corner transform
    pub transform: AffineTransform,
    /// CRS from the GeoKeyDirectory, if present
    pub crs: Option<Crs>,
}

/// Read only the georeferencing tags of a GeoTIFF
///
/// Returns `None` when the file has neither a `ModelTransformationTag` nor
/// a tiepoint/pixel-scale pair.
pub fn read_geotiff_info<R: Read + Seek>(reader: R) -> IoResult<Option<GeoTiffInfo>> {
    let mut decoder = Decoder::new(reader).map_err(|e| decode_err("decode error", e))?;
    read_info(&mut decoder)
}

/// Read a GeoTIFF into a [`GeoRaster`]
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] if the file carries no transform or
/// no CRS.
pub fn read_geotiff<R: Read + Seek>(reader: R) -> IoResult<GeoRaster> {
    let mut decoder = Decoder::new(reader).map_err(|e| decode_err("decode error", e))?;
    let info = read_info(&mut decoder)?
        .ok_or_else(|| IoError::InvalidData("TIFF has no georeferencing".to_string()))?;
    let crs = info
        .crs
        .ok_or_else(|| IoError::InvalidData("GeoTIFF has no CRS".to_string()))?;
    let raster = decode_tiff_raster(&mut decoder)?;
    Ok(GeoRaster::with_crs(raster, info.transform, crs))
}

fn read_info<R: Read + Seek>(decoder: &mut Decoder<R>) -> IoResult<Option<GeoTiffInfo>> {
    let geokeys = find_vec(decoder, GEOTIFF_GEOKEYDIRECTORY, |v| v.into_u16_vec())?;
    let crs = geokeys.as_deref().and_then(parse_crs);
    let pixel_is_point = geokeys
        .as_deref()
        .and_then(|k| geokey_value(k, GT_RASTER_TYPE_GEO_KEY))
        == Some(RASTER_PIXEL_IS_POINT);

    let transform = if let Some(m) =
        find_vec(decoder, GEOTIFF_MODELTRANSFORMATION, |v| v.into_f64_vec())?
    {
        if m.len() < 8 {
            return Err(IoError::InvalidData(format!(
                "ModelTransformationTag has {} values",
                m.len()
            )));
        }
        AffineTransform::from_coeffs([m[0], m[1], m[3], m[4], m[5], m[7]])
    } else {
        let scale = find_vec(decoder, GEOTIFF_MODELPIXELSCALE, |v| v.into_f64_vec())?;
        let tie = find_vec(decoder, GEOTIFF_MODELTIEPOINT, |v| v.into_f64_vec())?;
        match (scale, tie) {
            (Some(s), Some(tp)) if s.len() >= 2 && tp.len() >= 6 => {
                // Tiepoint (I, J) -> (X, Y)
                let (sx, sy) = (s[0], s[1]);
                let (i, j, x, y) = (tp[0], tp[1], tp[3], tp[4]);
                AffineTransform::from_coeffs([sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy])
            }
            _ => return Ok(None),
        }
    };

    // PixelIsPoint ties model coordinates to pixel centres
    let transform = if pixel_is_point {
        let [a, b, c, d, e, f] = *transform.coeffs();
        AffineTransform::from_coeffs([a, b, c - 0.5 * (a + b), d, e, f - 0.5 * (d + e)])
    } else {
        transform
    };

    Ok(Some(GeoTiffInfo { transform, crs }))
}

fn find_vec<R, T, F>(decoder: &mut Decoder<R>, tag: u16, convert: F) -> IoResult<Option<Vec<T>>>
where
    R: Read + Seek,
    F: FnOnce(tiff::decoder::ifd::Value) -> tiff::TiffResult<Vec<T>>,
{
    let ctx = "GeoTIFF tag";
    match decoder
        .find_tag(Tag::from_u16_exhaustive(tag))
        .map_err(|e| decode_err(ctx, e))?
    {
        Some(value) => convert(value).map(Some).map_err(|e| decode_err(ctx, e)),
        None => Ok(None),
    }
}

/// Inline value of a GeoKey
fn geokey_value(keys: &[u16], id: u16) -> Option<u16> {
    let count = *keys.get(3)? as usize;
    keys.get(4..)?
        .chunks_exact(4)
        .take(count)
        .find(|k| k[0] == id && k[1] == 0)
        .map(|k| k[3])
}

fn parse_crs(keys: &[u16]) -> Option<Crs> {
    geokey_value(keys, GEOGRAPHIC_TYPE_GEO_KEY)
        .or_else(|| geokey_value(keys, PROJECTED_CS_TYPE_GEO_KEY))
        .map(Crs::from_epsg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgeo_core::Raster;
    use std::io::Cursor;

    fn test_georaster(bands: usize, transform: AffineTransform) -> GeoRaster {
        let (w, h) = (6u32, 4u32);
        let planes = (0..bands)
            .map(|b| BandData::U8((0..w * h).map(|i| (i as usize * 7 + b * 50) as u8).collect()))
            .collect();
        GeoRaster::new(Raster::new(w, h, planes).unwrap(), transform)
    }

    fn north_up() -> AffineTransform {
        AffineTransform::from_coeffs([0.001, 0.0, -118.0, 0.0, -0.001, 34.0])
    }

    fn roundtrip(geo: &GeoRaster) -> GeoRaster {
        let mut buffer = Cursor::new(Vec::new());
        GeoTiffWriter::new(geo).write_to(&mut buffer).unwrap();
        buffer.set_position(0);
        read_geotiff(buffer).unwrap()
    }

    #[test]
    fn test_geokey_directory() {
        let keys = build_geokey_directory(Crs::WGS84, Some("WGS 84|"));
        assert_eq!(&keys[..4], &[1, 1, 0, 5]);
        assert_eq!(geokey_value(&keys, GT_MODEL_TYPE_GEO_KEY), Some(2));
        assert_eq!(geokey_value(&keys, GT_RASTER_TYPE_GEO_KEY), Some(1));
        assert_eq!(geokey_value(&keys, GEOGRAPHIC_TYPE_GEO_KEY), Some(4326));
        assert_eq!(geokey_value(&keys, GEOG_ANGULAR_UNITS_GEO_KEY), Some(9102));
        // Citation lives in GeoAsciiParams, not inline
        assert_eq!(geokey_value(&keys, GEOG_CITATION_GEO_KEY), None);

        let ids: Vec<u16> = keys[4..].chunks(4).map(|k| k[0]).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_model_transformation_layout() {
        let t = AffineTransform::from_coeffs([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let m = model_transformation(&t);
        assert_eq!(&m[..8], &[1.0, 2.0, 0.0, 3.0, 4.0, 5.0, 0.0, 6.0]);
        assert_eq!(m[15], 1.0);
    }

    #[test]
    fn test_roundtrip_north_up_rgb() {
        let geo = test_georaster(3, north_up());
        let back = roundtrip(&geo);
        assert_eq!(back.raster(), geo.raster());
        assert_eq!(back.crs(), Crs::WGS84);
        for (x, y) in back.transform().coeffs().iter().zip(geo.transform().coeffs()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_roundtrip_rotated_gray() {
        let t = AffineTransform::from_coeffs([0.001, 0.0005, -118.0, 0.0003, -0.001, 34.0]);
        let geo = test_georaster(1, t);
        let back = roundtrip(&geo);
        assert_eq!(back.raster(), geo.raster());
        assert_eq!(back.transform(), &t);
    }

    #[test]
    fn test_roundtrip_two_bands() {
        let geo = test_georaster(2, north_up());
        let back = roundtrip(&geo);
        assert_eq!(back.raster().band_count(), 2);
        assert_eq!(back.raster(), geo.raster());
    }

    #[test]
    fn test_roundtrip_five_bands_compressed() {
        let geo = test_georaster(5, north_up());
        let mut buffer = Cursor::new(Vec::new());
        GeoTiffWriter::new(&geo)
            .compression(TiffCompression::Lzw)
            .write_to(&mut buffer)
            .unwrap();
        buffer.set_position(0);
        let back = read_geotiff(buffer).unwrap();
        assert_eq!(back.raster(), geo.raster());
    }

    #[test]
    fn test_plain_tiff_has_no_info() {
        let mut buffer = Cursor::new(Vec::new());
        TiffEncoder::new(&mut buffer)
            .unwrap()
            .write_image::<Gray8>(2, 2, &[1, 2, 3, 4])
            .unwrap();
        buffer.set_position(0);
        assert_eq!(read_geotiff_info(buffer.clone()).unwrap(), None);
        buffer.set_position(0);
        assert!(matches!(read_geotiff(buffer), Err(IoError::InvalidData(_))));
    }
}
