//! Georeferencing pipeline regression test
//!
//! Runs uploads and files through the [`Georeferencer`] and checks that the
//! GeoTIFF keeps every pixel, that the embedded transform maps the raster
//! corners onto the expected box, that the KML overlay is stable, and that
//! invalid input is classified correctly.

use chartgeo::io::{TiffCompression, read_geotiff, read_raster_from_bytes};
use chartgeo::{
    AffineTransform, ErrorKind, GEOTIFF_DOWNLOAD_NAME, GeoRaster, GeorefOptions, Georeferencer,
    KML_DOWNLOAD_NAME, PixelPoint, Raster, SampleType, Upload,
};
use chartgeo_test::{
    RegParams, collinear_example_pairs, encode_jpeg, encode_png, example_pairs, gradient_raster,
    pairs_from,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn bool_value(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn read_back(path: &Path) -> GeoRaster {
    let file = File::open(path).expect("open GeoTIFF");
    read_geotiff(BufReader::new(file)).expect("read GeoTIFF")
}

/// Compare the corner images of two transforms over a `width` x `height` raster
fn compare_corners(rp: &mut RegParams, expected: &AffineTransform, actual: &AffineTransform, raster: &Raster) {
    let (w, h) = (raster.width() as f64, raster.height() as f64);
    for (col, row) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
        let e = expected.pixel_to_geo(PixelPoint::new(col, row));
        let a = actual.pixel_to_geo(PixelPoint::new(col, row));
        rp.compare_values(e.lat, a.lat, 1e-9);
        rp.compare_values(e.lon, a.lon, 1e-9);
    }
}

#[test]
fn pipeline_png_upload_reg() {
    let mut rp = RegParams::new("pipeline_png");
    let dir = tempfile::tempdir().expect("tempdir");
    let georef = Georeferencer::new(GeorefOptions::new().output_dir(dir.path()));

    let source = gradient_raster(400, 500, 3, SampleType::U8).expect("fixture");
    let upload = Upload::new(
        "chart.png",
        Some("image/png"),
        encode_png(&source).expect("encode"),
    );
    let pairs = example_pairs();

    let artifact = georef
        .georeference_upload(&upload, &pairs)
        .expect("georeference upload");
    rp.compare_strings(GEOTIFF_DOWNLOAD_NAME.as_bytes(), artifact.file_name.as_bytes());
    rp.compare_strings(b"image/tiff", artifact.mime_type.as_bytes());
    rp.compare_values(1.0, bool_value(artifact.path.starts_with(dir.path())), 0.0);

    // Same size, bands and values
    let back = read_back(&artifact.path);
    rp.compare_rasters(&source, back.raster());
    rp.compare_values(4326.0, back.crs().epsg() as f64, 0.0);

    // (0, 0) and (width, height) land on the expected corners
    let b = back.bounds();
    rp.compare_values(34.005, b.north, 1e-9);
    rp.compare_values(33.998, b.south, 1e-9);
    rp.compare_values(-117.998, b.east, 1e-9);
    rp.compare_values(-118.005, b.west, 1e-9);
    let origin = back.pixel_to_geo(PixelPoint::new(0.0, 0.0));
    rp.compare_values(33.998, origin.lat, 1e-9);
    rp.compare_values(-117.998, origin.lon, 1e-9);
    let far = back.pixel_to_geo(PixelPoint::new(400.0, 500.0));
    rp.compare_values(34.005, far.lat, 1e-9);
    rp.compare_values(-118.005, far.lon, 1e-9);

    // Reference points reproduced through the file
    for p in &pairs {
        let g = back.pixel_to_geo(p.pixel);
        rp.compare_values(p.geo.lat, g.lat, 1e-6);
        rp.compare_values(p.geo.lon, g.lon, 1e-6);
    }

    // Download bytes are the file contents
    let bytes = artifact.read_bytes().expect("read artifact");
    rp.compare_strings(&std::fs::read(&artifact.path).expect("read"), &bytes);

    // A second run gets its own file
    let second = georef
        .georeference_upload(&upload, &pairs)
        .expect("second run");
    rp.compare_values(0.0, bool_value(second.path == artifact.path), 0.0);

    assert!(rp.cleanup());
}

#[test]
fn pipeline_jpeg_upload_reg() {
    let mut rp = RegParams::new("pipeline_jpeg");
    let dir = tempfile::tempdir().expect("tempdir");
    let georef = Georeferencer::new(
        GeorefOptions::new()
            .output_dir(dir.path())
            .compression(TiffCompression::Zip),
    );

    let source = gradient_raster(64, 48, 3, SampleType::U8).expect("fixture");
    let jpeg = encode_jpeg(&source, 85).expect("encode");
    // Lossy: compare against the decoded JPEG, not the fixture
    let decoded = read_raster_from_bytes(&jpeg).expect("decode");

    // Mislabelled MIME type: the contents decide
    let upload = Upload::new("chart.jpg", Some("image/png"), jpeg);
    let pairs = pairs_from(
        &[(0.0, 0.0), (64.0, 0.0), (0.0, 48.0)],
        &[(40.0, -75.0), (40.0, -74.0), (39.25, -75.0)],
    );
    let artifact = georef
        .georeference_upload(&upload, &pairs)
        .expect("georeference upload");

    let back = read_back(&artifact.path);
    rp.compare_rasters(&decoded, back.raster());

    let t = back.transform();
    rp.compare_values(1.0, bool_value(t.is_rectilinear()), 0.0);
    rp.compare_values(1.0 / 64.0, t.a(), 1e-12);
    rp.compare_values(-0.75 / 48.0, t.e(), 1e-12);
    let b = back.bounds();
    rp.compare_values(40.0, b.north, 1e-9);
    rp.compare_values(39.25, b.south, 1e-9);
    rp.compare_values(-74.0, b.east, 1e-9);
    rp.compare_values(-75.0, b.west, 1e-9);

    assert!(rp.cleanup());
}

#[test]
fn pipeline_file_reg() {
    let mut rp = RegParams::new("pipeline_file");
    let dir = tempfile::tempdir().expect("tempdir");
    let georef = Georeferencer::new(GeorefOptions::new().compression(TiffCompression::Lzw));
    let pairs = example_pairs();
    let expected = AffineTransform::from_pairs(&pairs).expect("solve");

    // 16-bit gray and 8-bit gray + alpha sources
    for (i, bands, sample_type) in [(1, 1, SampleType::U16), (2, 2, SampleType::U8)] {
        let source = gradient_raster(37, 23, bands, sample_type).expect("fixture");
        let src = dir.path().join(format!("chart{}.png", i));
        std::fs::write(&src, encode_png(&source).expect("encode")).expect("write source");
        let dst = dir.path().join(format!("chart{}.tif", i));

        let geo = georef
            .georeference_file(&src, &pairs, &dst)
            .expect("georeference file");
        rp.compare_rasters(&source, geo.raster());

        let back = read_back(&dst);
        rp.compare_rasters(&source, back.raster());
        compare_corners(&mut rp, &expected, back.transform(), &source);
    }

    assert!(rp.cleanup());
}

#[test]
fn pipeline_kml_reg() {
    let mut rp = RegParams::new("pipeline_kml");
    let dir = tempfile::tempdir().expect("tempdir");
    let georef = Georeferencer::new(GeorefOptions::new().output_dir(dir.path()));

    let source = gradient_raster(16, 16, 1, SampleType::U8).expect("fixture");
    let upload = Upload::new("chart.png", None, encode_png(&source).expect("encode"));
    let artifact = georef
        .overlay_upload(&upload, &example_pairs())
        .expect("overlay");

    let kml = artifact.read_bytes().expect("read artifact");
    rp.write_data_and_check(&kml, "kml").expect("check kml");
    rp.compare_strings(KML_DOWNLOAD_NAME.as_bytes(), artifact.file_name.as_bytes());
    rp.compare_strings(
        b"application/vnd.google-earth.kml+xml",
        artifact.mime_type.as_bytes(),
    );

    assert!(rp.cleanup());
}

#[test]
fn pipeline_errors_reg() {
    let mut rp = RegParams::new("pipeline_errors");
    let dir = tempfile::tempdir().expect("tempdir");
    let georef = Georeferencer::new(GeorefOptions::new().output_dir(dir.path()));

    let source = gradient_raster(20, 20, 3, SampleType::U8).expect("fixture");
    let png = encode_png(&source).expect("encode");
    let upload = Upload::new("chart.png", Some("image/png"), png.clone());
    let pairs = example_pairs();

    // Fewer than three points
    let err = georef
        .georeference_upload(&upload, &pairs[..2])
        .expect_err("two points");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::InsufficientPoints), 0.0);
    let err = georef
        .overlay_upload(&upload, &pairs[..1])
        .expect_err("one point");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::InsufficientPoints), 0.0);

    // Collinear pixels
    let err = georef
        .georeference_upload(&upload, &collinear_example_pairs())
        .expect_err("collinear");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::DegenerateGeometry), 0.0);

    // Zero-area overlay box
    let flat = pairs_from(
        &[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)],
        &[(34.0, -118.0), (34.0, -117.0), (34.0, -116.0)],
    );
    let err = georef.overlay_upload(&upload, &flat).expect_err("flat box");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::DegenerateGeometry), 0.0);

    // Not an image, and a TIFF upload
    let text = Upload::new("notes.txt", Some("text/plain"), b"hello, world".to_vec());
    let err = georef
        .georeference_upload(&text, &pairs)
        .expect_err("text upload");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::Io), 0.0);
    let tiff = Upload::new("chart.tif", None, vec![0x49, 0x49, 0x2A, 0x00, 8, 0, 0, 0]);
    let err = georef.overlay_upload(&tiff, &pairs).expect_err("tiff upload");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::Io), 0.0);

    // Truncated PNG
    let truncated = Upload::new("chart.png", None, png[..png.len() / 2].to_vec());
    let err = georef
        .georeference_upload(&truncated, &pairs)
        .expect_err("truncated png");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::Io), 0.0);

    // Source file that starts like a PNG but does not decode
    let src_dir = tempfile::tempdir().expect("tempdir");
    let corrupt = src_dir.path().join("corrupt.png");
    std::fs::write(&corrupt, &png[..12]).expect("write source");
    let err = georef
        .georeference_file(&corrupt, &pairs, dir.path().join("corrupt.tif"))
        .expect_err("corrupt source");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::Io), 0.0);

    // Missing source file and unwritable destination
    let err = georef
        .georeference_file(dir.path().join("missing.png"), &pairs, dir.path().join("out.tif"))
        .expect_err("missing source");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::Io), 0.0);

    let missing_dir = Georeferencer::new(GeorefOptions::new().output_dir(dir.path().join("nope")));
    let err = missing_dir
        .georeference_upload(&upload, &pairs)
        .expect_err("missing output dir");
    rp.compare_values(1.0, bool_value(err.kind() == ErrorKind::Io), 0.0);

    // Failed runs leave nothing behind
    let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
    rp.compare_values(0.0, leftovers as f64, 0.0);

    assert!(rp.cleanup());
}
