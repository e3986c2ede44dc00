//! Integration tests for the uvf-export binary
//!
//! Tests the full pipeline: write fixtures -> run CLI -> verify output

mod generate_test_assets;

use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

use generate_test_assets as assets;

fn uvf_export(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_uvf-export"))
        .args(args)
        .output()
        .expect("Failed to run uvf-export")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 temp path")
}

/// Test VTK -> basic UVF conversion
#[test]
fn test_convert_basic() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("quad.vtk");
    let out = dir.path().join("out");
    assets::write(&input, assets::QUAD_VTK).expect("Failed to write VTK");

    let output = uvf_export(&["convert", path_str(&input), "-o", path_str(&out), "-m", "basic"]);
    assert!(output.status.success(), "convert failed: {:?}", output);
    assert!(out.join("manifest.json").exists(), "manifest should exist");
    assert!(out.join("uvf.bin").exists(), "buffer should exist");

    // Second run needs --force
    let output = uvf_export(&["convert", path_str(&input), "-o", path_str(&out), "-m", "basic"]);
    assert!(!output.status.success(), "overwrite without --force should fail");

    let output = uvf_export(&[
        "convert",
        path_str(&input),
        "-o",
        path_str(&out),
        "-m",
        "basic",
        "--force",
    ]);
    assert!(output.status.success(), "forced convert failed: {:?}", output);
}

/// Test the version flag
#[test]
fn test_version_flag() {
    let output = uvf_export(&["--version"]);
    assert!(output.status.success(), "--version failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("uvf-export {}", env!("CARGO_PKG_VERSION"))
    );
}

/// Test an unknown mode string
#[test]
fn test_invalid_mode() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("quad.vtk");
    assets::write(&input, assets::QUAD_VTK).expect("Failed to write VTK");

    let output = uvf_export(&["convert", path_str(&input), "-o", "unused", "-m", "fast"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid mode: fast"), "stderr: {stderr}");
}

/// Test auto mode on a directory, then count and inspect
#[test]
fn test_directory_count_and_inspect() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("cases");
    let out = dir.path().join("out");
    std::fs::create_dir(&input).expect("Failed to create input dir");
    assets::write(&input.join("quad.vtk"), assets::QUAD_VTK).unwrap();
    assets::write(&input.join("seed_traces.vtp"), assets::STREAMLINES_VTP).unwrap();

    let output = uvf_export(&["count", path_str(&input)]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2");

    let output = uvf_export(&["convert", path_str(&input), "-o", path_str(&out)]);
    assert!(output.status.success(), "convert failed: {:?}", output);
    assert!(out.join("resources/uvf/quad.bin").exists());
    assert!(out.join("resources/uvf/seed_traces.bin").exists());

    let output = uvf_export(&["inspect", path_str(&out), "--tree"]);
    assert!(output.status.success(), "inspect failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 SolidGeometry"), "stdout: {stdout}");
    assert!(stdout.contains("seed_traces_face [Face]"), "stdout: {stdout}");
}

/// Test count on a missing directory
#[test]
fn test_count_missing_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output = uvf_export(&["count", path_str(&dir.path().join("missing"))]);
    assert!(!output.status.success());
}

/// Test parse on valid and invalid input
#[test]
fn test_parse() {
    let dir = tempdir().expect("Failed to create temp dir");
    let good = dir.path().join("parts.stl");
    let bad = dir.path().join("bad.vtk");
    assets::write(&good, assets::PARTS_STL).unwrap();
    assets::write(&bad, assets::BAD_INDEX_VTK).unwrap();

    assert!(uvf_export(&["parse", path_str(&good)]).status.success());
    assert!(uvf_export(&["parse", path_str(&good), "--no-dedup"]).status.success());
    let output = uvf_export(&["parse", path_str(&bad)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.vtk"));
}

/// Test a job file with relative paths
#[test]
fn test_build_job_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    assets::write(&dir.path().join("tetra.vtk"), assets::TETRA_VTK).unwrap();
    assets::write(&dir.path().join("parts.stl"), assets::PARTS_STL).unwrap();
    let jobs = dir.path().join("uvf-jobs.toml");
    std::fs::write(
        &jobs,
        r#"
[settings]
force = true

[[jobs]]
input = "tetra.vtk"
output = "out/tetra"
mode = "basic"

[[jobs]]
input = "parts.stl"
output = "out/parts"
"#,
    )
    .expect("Failed to write job file");

    let output = uvf_export(&["build", path_str(&jobs)]);
    assert!(output.status.success(), "build failed: {:?}", output);
    assert!(dir.path().join("out/tetra/uvf.bin").exists());
    assert!(dir.path().join("out/parts/resources/uvf/hull.bin").exists());

    // force = true lets the same jobs run again
    let output = uvf_export(&["build", path_str(&jobs)]);
    assert!(output.status.success(), "rebuild failed: {:?}", output);
}
