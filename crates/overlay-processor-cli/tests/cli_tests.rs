//! Black-box tests for the overlay-processor binary

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::Path;

fn write_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    image.save(path).unwrap();
}

fn overlay_processor() -> Command {
    Command::cargo_bin("overlay-processor").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    overlay_processor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("save-preset"));
}

#[test]
fn test_process_writes_archive_and_summary() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input_dir = temp_dir.path().join("input");
    std::fs::create_dir(&input_dir).unwrap();
    write_png(&input_dir.join("one.png"), 32, 32, [255, 0, 0, 255]);
    write_png(&input_dir.join("two.png"), 32, 32, [0, 255, 0, 255]);
    let overlay = temp_dir.path().join("overlay.png");
    write_png(&overlay, 32, 32, [0, 0, 255, 100]);
    let archive = temp_dir.path().join("out.zip");

    overlay_processor()
        .args(["process", "--input"])
        .arg(&input_dir)
        .arg("--overlay")
        .arg(&overlay)
        .arg("--output")
        .arg(&archive)
        .args(["--format", "png", "--suffix", "_done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2/2"));

    let file = std::fs::File::open(&archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    assert_eq!(zip.len(), 2);
    assert_eq!(zip.by_index(0).unwrap().name(), "one_done.png");
}

#[test]
fn test_process_reports_corrupt_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input_dir = temp_dir.path().join("input");
    std::fs::create_dir(&input_dir).unwrap();
    write_png(&input_dir.join("good.png"), 16, 16, [255, 255, 0, 255]);
    std::fs::write(input_dir.join("bad.png"), b"not an image").unwrap();
    let overlay = temp_dir.path().join("overlay.png");
    write_png(&overlay, 16, 16, [0, 0, 255, 100]);
    let archive = temp_dir.path().join("out.zip");

    overlay_processor()
        .args(["process", "--input"])
        .arg(&input_dir)
        .arg("--overlay")
        .arg(&overlay)
        .arg("--output")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1/2"))
        .stderr(predicate::str::contains("bad.png"));
}

#[test]
fn test_process_fails_on_empty_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input_dir = temp_dir.path().join("input");
    std::fs::create_dir(&input_dir).unwrap();
    let overlay = temp_dir.path().join("overlay.png");
    write_png(&overlay, 16, 16, [0, 0, 255, 100]);

    overlay_processor()
        .args(["process", "--input"])
        .arg(&input_dir)
        .arg("--overlay")
        .arg(&overlay)
        .arg("--output")
        .arg(temp_dir.path().join("out.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No image files found"));
}

#[test]
fn test_preview_writes_single_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let base = temp_dir.path().join("base.png");
    write_png(&base, 48, 48, [128, 128, 128, 255]);
    let overlay = temp_dir.path().join("overlay.png");
    write_png(&overlay, 48, 48, [255, 0, 0, 64]);
    let output = temp_dir.path().join("preview.png");

    overlay_processor()
        .args(["preview", "--input"])
        .arg(&base)
        .arg("--overlay")
        .arg(&overlay)
        .arg("--output")
        .arg(&output)
        .args(["--format", "png", "--text", "DRAFT", "--text-size", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("48x48"));

    let decoded = image::open(&output).unwrap();
    assert_eq!(decoded.width(), 48);
}

#[test]
fn test_save_preset_round_trips_through_process_flags() {
    let temp_dir = tempfile::tempdir().unwrap();
    let preset = temp_dir.path().join("preset.json");

    overlay_processor()
        .args(["save-preset", "--output"])
        .arg(&preset)
        .args([
            "--format",
            "jpeg",
            "--quality",
            "85",
            "--prefix",
            "shop_",
            "--text",
            "SALE",
            "--text-position",
            "top-right",
        ])
        .assert()
        .success();

    let contents = std::fs::read_to_string(&preset).unwrap();
    assert!(contents.contains("\"jpeg\""));
    assert!(contents.contains("SALE"));
    assert!(contents.contains("top-right"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    overlay_processor()
        .args(["save-preset", "--output"])
        .arg(temp_dir.path().join("preset.json"))
        .args(["--format", "tiff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tiff"));
}
