//! End-to-end compression through the real codec, local files and a
//! directory store.
//!
//! Run with: cargo test --test pipeline

use image::{ExtendedColorType, GenericImageView, ImageEncoder, Rgb, RgbImage};
use squishpic::dedup::{Compressor, JobReport};
use squishpic::imaging::{CustomSettings, QualityTier, RustBackend};
use squishpic::job::{JobOutcome, Pipeline};
use squishpic::request::{CompressionRequest, JobPayload};
use squishpic::source::{FileSource, SourceId};
use squishpic::store::DirectoryStore;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use tempfile::TempDir;

const COLLECTION: &str = "Pictures/squishpic";

fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_jpeg(width, height)).unwrap();
}

/// JPEG whose APP1 segment carries only an EXIF Orientation tag.
fn write_oriented_jpeg(path: &Path, width: u32, height: u32, orientation: u16) {
    let jpeg = encode_jpeg(width, height);
    let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08".to_vec();
    exif.extend_from_slice(&1u16.to_be_bytes());
    exif.extend_from_slice(&0x0112u16.to_be_bytes());
    exif.extend_from_slice(&3u16.to_be_bytes());
    exif.extend_from_slice(&1u32.to_be_bytes());
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

type FileCompressor = Compressor<RustBackend, FileSource, DirectoryStore>;

fn compressor(store_root: &Path) -> (FileCompressor, Receiver<JobReport>) {
    let (tx, rx) = mpsc::channel();
    let pipeline = Pipeline::new(
        RustBackend::new(),
        FileSource::new(),
        DirectoryStore::new(store_root),
        COLLECTION,
    );
    (Compressor::new(pipeline, 2, tx).unwrap(), rx)
}

fn saved_path(report: &JobReport) -> PathBuf {
    match &report.outcome {
        JobOutcome::Success { saved_location } => PathBuf::from(saved_location.as_str()),
        JobOutcome::Failure { failure_message } => panic!("job failed: {failure_message}"),
    }
}

#[test]
fn tier_output_is_scaled_jpeg_in_collection() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("landscape.png");
    // Content is JPEG even though the name says PNG; the decoder sniffs.
    write_jpeg(&source, 800, 600);
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let request = CompressionRequest::new(SourceId::from(source.as_path()))
        .unwrap()
        .with_tier(QualityTier::Low)
        .with_name("small")
        .unwrap();
    assert!(compressor.submit(&request));

    let report = reports.recv_timeout(Duration::from_secs(30)).unwrap();
    let saved = saved_path(&report);

    assert_eq!(
        saved,
        tmp.path().join("store").join(COLLECTION).join("small.png")
    );
    let bytes = std::fs::read(&saved).unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (320, 240));
}

#[test]
fn custom_settings_produce_exact_size() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    write_jpeg(&source, 640, 480);
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let request = CompressionRequest::new(SourceId::new(format!("file://{}", source.display())))
        .unwrap()
        .with_custom(CustomSettings::new(500, 300, 50).unwrap());
    assert!(compressor.submit(&request));

    let saved = saved_path(&reports.recv_timeout(Duration::from_secs(30)).unwrap());
    let name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("IMG-") && name.ends_with(".jpg"), "{name}");
    let decoded = image::open(&saved).unwrap();
    assert_eq!(decoded.dimensions(), (500, 300));
}

#[test]
fn corrupt_source_reports_failure_only() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("broken.jpg");
    std::fs::write(&source, b"\xFF\xD8\xFF\xE0 this is not a jpeg").unwrap();
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let request = CompressionRequest::new(SourceId::from(source.as_path())).unwrap();
    assert!(compressor.submit(&request));

    let report = reports.recv_timeout(Duration::from_secs(30)).unwrap();
    match report.outcome {
        JobOutcome::Failure { failure_message } => assert!(!failure_message.is_empty()),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(reports.recv_timeout(Duration::from_millis(200)).is_err());
    assert!(!tmp.path().join("store").join(COLLECTION).exists());
}

#[test]
fn missing_source_reports_failure() {
    let tmp = TempDir::new().unwrap();
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let request =
        CompressionRequest::new(SourceId::new("/definitely/not/here.jpg")).unwrap();
    assert!(compressor.submit(&request));

    let report = reports.recv_timeout(Duration::from_secs(30)).unwrap();
    assert!(matches!(
        report.outcome,
        JobOutcome::Failure { ref failure_message } if failure_message.contains("source unreadable")
    ));
}

#[test]
fn queued_payload_runs_like_a_request() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    write_jpeg(&source, 4000, 3000);
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let payload: JobPayload = serde_json::from_value(serde_json::json!({
        "source": source.to_string_lossy(),
        "file_name": "queued",
        "target_quality": 80,
        "compress_quality": 3
    }))
    .unwrap();
    assert!(compressor.submit_payload("queued-job", &payload));

    let report = reports.recv_timeout(Duration::from_secs(60)).unwrap();
    assert_eq!(report.key, "queued-job");
    let saved = saved_path(&report);
    assert!(saved.ends_with("queued.jpg"));
    assert_eq!(image::open(&saved).unwrap().dimensions(), (3000, 2250));
}

#[test]
fn repeated_names_do_not_overwrite() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("a.jpg");
    let second = tmp.path().join("b.jpg");
    write_jpeg(&first, 100, 100);
    write_jpeg(&second, 100, 100);
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    for source in [&first, &second] {
        let request = CompressionRequest::new(SourceId::from(source.as_path()))
            .unwrap()
            .with_name("same")
            .unwrap();
        assert!(compressor.submit(&request));
    }

    let mut saved: Vec<PathBuf> = (0..2)
        .map(|_| saved_path(&reports.recv_timeout(Duration::from_secs(30)).unwrap()))
        .collect();
    saved.sort();
    let names: Vec<String> = saved
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["same (1).jpg", "same.jpg"]);
}

#[test]
fn exif_rotation_reaches_the_store() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("portrait.jpg");
    write_oriented_jpeg(&source, 800, 600, 6);
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let request = CompressionRequest::new(SourceId::from(source.as_path()))
        .unwrap()
        .with_tier(QualityTier::Low);
    assert!(compressor.submit(&request));

    let saved = saved_path(&reports.recv_timeout(Duration::from_secs(30)).unwrap());
    assert_eq!(image::open(&saved).unwrap().dimensions(), (240, 320));
}

#[test]
fn oversized_custom_target_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    write_jpeg(&source, 64, 48);
    let (compressor, reports) = compressor(&tmp.path().join("store"));

    let request = CompressionRequest::new(SourceId::from(source.as_path()))
        .unwrap()
        .with_custom(CustomSettings::new(200_000, 200_000, 80).unwrap());
    assert!(compressor.submit(&request));

    let report = reports.recv_timeout(Duration::from_secs(30)).unwrap();
    assert!(matches!(
        report.outcome,
        JobOutcome::Failure { ref failure_message } if failure_message.starts_with("resize failed")
    ));
    assert!(!tmp.path().join("store").join(COLLECTION).exists());
}
