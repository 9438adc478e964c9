use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
use dupesweep::output::{format_size, TextReport};
use dupesweep::signal::ShutdownHandler;
use std::fs;
use tempfile::tempdir;

fn run_report(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut input: &[u8] = b"";
    let mut out = Vec::new();
    let mut err = Vec::new();
    dupesweep::run_app_with_io(cli, ShutdownHandler::new(), &mut input, &mut out, &mut err)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_text_report_for_basic_scenario() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), [b'x'; 2000]).unwrap();
    fs::write(dir.path().join("b.txt"), [b'x'; 2000]).unwrap();
    fs::write(dir.path().join("c.txt"), [b'y'; 1500]).unwrap();
    let root = dir.path().to_str().unwrap();

    let out = run_report(&["dupesweep", root, "--min-size", "1024", "-q"]);

    assert!(out.starts_with(&"=".repeat(60)));
    assert!(out.contains("DUPLICATE FILE REPORT"));
    assert!(out.contains("Total files processed: 3"));
    assert!(out.contains("Duplicate groups found: 1"));
    assert!(out.contains(&format!("  [KEEP] {}", dir.path().join("a.txt").display())));
    assert!(out.contains(&format!(
        "  [DUPLICATE] {}",
        dir.path().join("b.txt").display()
    )));
    assert!(out.contains("  Size: 1.95 KB each"));
    assert!(out.contains("  Waste: 1.95 KB"));
    assert!(out.contains("Total reclaimable space: 1.95 KB"));
    assert!(!out.contains("c.txt"));
}

#[test]
fn test_text_report_without_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), [b'x'; 2000]).unwrap();
    fs::write(dir.path().join("b.txt"), [b'x'; 2000]).unwrap();
    let root = dir.path().to_str().unwrap();

    let out = run_report(&["dupesweep", root, "--min-size", "3000", "-q"]);

    assert!(out.contains("Total files processed: 0"));
    assert!(out.contains("Duplicate groups found: 0"));
    assert!(out.contains("No duplicates found!"));
    assert!(!out.contains("Group 1"));
}

#[test]
fn test_text_report_group_hash_prefix() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), [5u8; 2048]).unwrap();
    fs::write(dir.path().join("b.bin"), [5u8; 2048]).unwrap();

    let result = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates(dir.path())
        .unwrap();
    let report = TextReport::new(&result).render();
    let expected = blake3::hash(&[5u8; 2048]).to_hex().to_string();

    assert!(report.contains(&format!("Group 1 (Hash: {}...):", &expected[..16])));
}

#[test]
fn test_json_report_document() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), [b'x'; 2000]).unwrap();
    fs::write(dir.path().join("b.txt"), [b'x'; 2000]).unwrap();
    fs::write(dir.path().join("c.txt"), [b'y'; 1500]).unwrap();
    let root = dir.path().to_str().unwrap();

    let out = run_report(&["dupesweep", root, "--output", "json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(parsed["summary"]["total_files"], 3);
    assert_eq!(parsed["summary"]["duplicate_groups"], 1);
    assert_eq!(parsed["summary"]["reclaimable_bytes"], 2000);
    assert_eq!(parsed["summary"]["bytes_hashed"], 5500);
    assert_eq!(parsed["summary"]["exit_code_name"], "DS000");
    let files = parsed["groups"][0]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["status"], "keep");
    assert!(files[0]["path"].as_str().unwrap().ends_with("a.txt"));
    assert!(parsed["scanned_at"].as_str().is_some());
}

#[test]
fn test_format_size_examples() {
    assert_eq!(format_size(1000), "1000.00 B");
    assert_eq!(format_size(2000), "1.95 KB");
    assert_eq!(format_size(4096), "4.00 KB");
    assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
}
