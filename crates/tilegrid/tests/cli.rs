use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const GREEN: [u8; 3] = [30, 150, 40];
const DIAMOND: [u8; 3] = [88, 212, 252];

fn save(path: &Path, img: &image::RgbImage) {
    img.save(path).unwrap();
}

/// 3x2 grid of 10x10 cells: two wall rows, then floor with one diamond.
fn fixture(dir: &Path) {
    let tiles = dir.join("tiles");
    fs::create_dir(&tiles).unwrap();
    save(
        &tiles.join("tile7.png"),
        &image::RgbImage::from_pixel(10, 10, image::Rgb(GREEN)),
    );
    let mut shot = image::RgbImage::from_pixel(20, 30, image::Rgb(GREEN));
    shot.put_pixel(14, 25, image::Rgb(DIAMOND));
    save(&dir.join("shot.png"), &shot);
}

fn tilegrid() -> Command {
    Command::cargo_bin("tilegrid").unwrap()
}

#[test]
fn prints_matrix_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    tilegrid()
        .arg(dir.path().join("shot.png"))
        .arg("--templates")
        .arg(dir.path().join("tiles"))
        .args(["--template-count", "8", "--rows", "3", "--cols", "2"])
        .assert()
        .success()
        .stdout("1 1\n1 1\n0 2\n");
}

#[test]
fn writes_output_and_report_files() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let out = dir.path().join("level.txt");
    let report = dir.path().join("report.json");

    tilegrid()
        .arg(dir.path().join("shot.png"))
        .arg("--templates")
        .arg(dir.path().join("tiles"))
        .args(["--rows", "3", "--cols", "2", "--sequential"])
        .arg("--output")
        .arg(&out)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(&out).unwrap(), "1 1\n1 1\n0 2\n");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["num_templates"], 1);
    assert_eq!(json["matrix"][2][1], 2);
    assert_eq!(json["cells"][5]["source"]["kind"], "heuristic");
    assert_eq!(json["cells"][5]["source"]["rule"], "diamond_sparkle");
}

#[test]
fn config_file_supplies_paths_and_grid() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let cfg = dir.path().join("run.json");
    let config = serde_json::json!({
        "image_path": dir.path().join("shot.png"),
        "templates": { "kind": "directory", "dir": dir.path().join("tiles"), "count": 8 },
        "params": { "rows": 3, "cols": 2, "wall_rows": 1 }
    });
    fs::write(&cfg, config.to_string()).unwrap();

    tilegrid()
        .arg("--config")
        .arg(&cfg)
        .assert()
        .success()
        .stdout("1 1\n0 0\n0 2\n");
}

#[test]
fn missing_screenshot_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let out = dir.path().join("level.txt");

    tilegrid()
        .arg(dir.path().join("nope.png"))
        .arg("--templates")
        .arg(dir.path().join("tiles"))
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.png"));
    assert!(!out.exists());
}

#[test]
fn requires_an_image() {
    tilegrid()
        .assert()
        .failure()
        .stderr(predicate::str::contains("IMAGE"));
}

#[test]
fn verbosity_flags_control_stderr_logging() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let run = |flag: &str| {
        tilegrid()
            .arg(dir.path().join("shot.png"))
            .arg("--templates")
            .arg(dir.path().join("tiles"))
            .args(["--rows", "3", "--cols", "2", flag])
            .assert()
            .success()
            .stdout("1 1\n1 1\n0 2\n")
    };

    run("-v").stderr(predicate::str::contains("classifying"));
    run("-q").stderr(predicate::str::contains("classifying").not());
}

#[test]
fn quiet_and_verbose_conflict() {
    tilegrid()
        .args(["shot.png", "-q", "-v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
