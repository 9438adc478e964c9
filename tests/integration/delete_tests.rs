use clap::Parser;
use dupesweep::actions::delete::{delete_duplicates, DeleteConfig, NoopDeleteCallback};
use dupesweep::cli::Cli;
use dupesweep::duplicates::DuplicateFinder;
use dupesweep::error::ExitCode;
use dupesweep::signal::ShutdownHandler;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str], answer: &str) -> (ExitCode, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut input = answer.as_bytes();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code =
        dupesweep::run_app_with_io(cli, ShutdownHandler::new(), &mut input, &mut out, &mut err)
            .unwrap();
    (code, String::from_utf8(out).unwrap())
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_confirmed_delete_removes_non_first() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    fs::write(&a, [1u8; 2048]).unwrap();
    fs::write(&b, [1u8; 2048]).unwrap();
    let root = dir.path().to_str().unwrap();

    let (code, out) = run(&["dupesweep", root, "--delete", "-q"], "y\n");

    assert_eq!(code, ExitCode::Success);
    assert_eq!(file_count(dir.path()), 1);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(out.contains(&format!("Deleted: {}", b.display())));
    assert!(out.contains("Deleted 1 of 1 duplicate files"));
}

#[test]
fn test_uppercase_confirmation_accepted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), [1u8; 2048]).unwrap();
    fs::write(dir.path().join("b.bin"), [1u8; 2048]).unwrap();
    let root = dir.path().to_str().unwrap();

    let (_, out) = run(&["dupesweep", root, "--delete", "-q"], "Y\n");

    assert_eq!(file_count(dir.path()), 1);
    assert!(out.contains("Deleted 1 of 1 duplicate files"));
}

#[test]
fn test_declined_delete_changes_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), [1u8; 2048]).unwrap();
    fs::write(dir.path().join("b.bin"), [1u8; 2048]).unwrap();
    let root = dir.path().to_str().unwrap();

    for answer in ["n\n", "\n", "yes\n", ""] {
        let (code, out) = run(&["dupesweep", root, "--delete", "-q"], answer);
        assert_eq!(code, ExitCode::Success);
        assert!(out.contains("Deletion cancelled."), "answer {answer:?}");
        assert_eq!(file_count(dir.path()), 2);
    }
}

#[test]
fn test_yes_flag_skips_prompt() {
    let dir = tempdir().unwrap();
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(dir.path().join(name), [3u8; 4096]).unwrap();
    }
    let root = dir.path().to_str().unwrap();

    let (_, out) = run(&["dupesweep", root, "--delete", "--yes", "-q"], "");

    assert!(!out.contains("Do you want to delete duplicates?"));
    assert!(out.contains("Deleted 2 of 2 duplicate files"));
    assert!(dir.path().join("a.bin").exists());
    assert_eq!(file_count(dir.path()), 1);
}

#[test]
fn test_delete_without_duplicates_is_noop() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), [1u8; 2048]).unwrap();
    fs::write(dir.path().join("b.bin"), [2u8; 2048]).unwrap();
    let root = dir.path().to_str().unwrap();

    let (code, out) = run(&["dupesweep", root, "--delete", "-q"], "y\n");

    assert_eq!(code, ExitCode::Success);
    assert!(out.contains("No duplicates found!"));
    assert!(!out.contains("Do you want to delete"));
    assert_eq!(file_count(dir.path()), 2);
}

#[test]
fn test_externally_removed_duplicate_is_reported() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    fs::write(&a, [1u8; 2048]).unwrap();
    fs::write(&b, [1u8; 2048]).unwrap();

    let mut result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(result.group_count(), 1);

    // Removed by someone else between scan and deletion
    fs::remove_file(&b).unwrap();

    let batch =
        delete_duplicates::<NoopDeleteCallback>(&mut result, &DeleteConfig::default(), None);

    assert_eq!(batch.success_count(), 0);
    assert_eq!(batch.failure_count(), 1);
    assert_eq!(batch.considered, 1);
    assert!(a.exists());
}

#[test]
fn test_every_group_keeps_exactly_its_first_member() {
    let dir = tempdir().unwrap();
    for (name, byte) in [
        ("g1_a", 1u8),
        ("g1_b", 1),
        ("g1_c", 1),
        ("g2_a", 2),
        ("g2_b", 2),
        ("solo", 3),
    ] {
        fs::write(dir.path().join(name), [byte; 1500]).unwrap();
    }

    let mut result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let keepers: Vec<_> = result
        .duplicate_groups
        .iter()
        .map(|g| g.keep().unwrap().path.clone())
        .collect();

    let batch =
        delete_duplicates::<NoopDeleteCallback>(&mut result, &DeleteConfig::default(), None);

    assert_eq!(batch.success_count(), 3);
    assert_eq!(batch.bytes_freed, 3 * 1500);
    for keeper in keepers {
        assert!(keeper.exists());
    }
    assert!(dir.path().join("solo").exists());
    assert_eq!(file_count(dir.path()), 3);
    assert!(!result.has_duplicates());
}

#[cfg(unix)]
#[test]
fn test_follow_symlinks_never_deletes_through_directory_alias() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    let photo = real.join("photo.bin");
    fs::write(&photo, [9u8; 4096]).unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("alias")).unwrap();
    let root = dir.path().to_str().unwrap();

    let (code, out) = run(
        &["dupesweep", root, "--follow-symlinks", "--delete", "--yes", "-q"],
        "",
    );

    assert_eq!(code, ExitCode::Success);
    assert!(out.contains("No duplicates found!"));
    assert!(photo.exists());
}

#[cfg(unix)]
#[test]
fn test_follow_symlinks_keeps_target_of_earlier_link() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("z_real.bin");
    let link = dir.path().join("a_link.bin");
    let copy = dir.path().join("m_copy.bin");
    fs::write(&target, [9u8; 4096]).unwrap();
    fs::write(&copy, [9u8; 4096]).unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();
    let root = dir.path().to_str().unwrap();

    let (_, out) = run(
        &["dupesweep", root, "--follow-symlinks", "--delete", "--yes", "-q"],
        "",
    );

    // The link is the keep path for the target; the independent copy goes
    assert!(out.contains(&format!("  [KEEP] {}", link.display())));
    assert!(out.contains("Deleted 1 of 1 duplicate files"));
    assert!(target.exists());
    assert!(!copy.exists());
    assert!(fs::read(&link).is_ok());
}

#[cfg(unix)]
#[test]
fn test_hardlinks_are_not_reported_as_duplicates() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    fs::write(&a, [4u8; 4096]).unwrap();
    fs::hard_link(&a, dir.path().join("b.bin")).unwrap();
    let root = dir.path().to_str().unwrap();

    let (_, out) = run(&["dupesweep", root, "--delete", "--yes", "-q"], "");

    assert!(out.contains("Total files processed: 1"));
    assert!(out.contains("No duplicates found!"));
    assert_eq!(file_count(dir.path()), 2);
}
