use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::WalkerConfig;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn names(paths: &[std::path::PathBuf], root: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

fn basic_tree(dir: &Path) {
    write(dir, "a.txt", &[b'x'; 2000]);
    write(dir, "b.txt", &[b'x'; 2000]);
    write(dir, "c.txt", &[b'y'; 1500]);
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(!result.has_duplicates());
    assert_eq!(result.total_files_considered, 0);
    assert_eq!(result.reclaimable_space(), 0);
}

#[test]
fn test_scan_basic_duplicates() {
    let dir = tempdir().unwrap();
    basic_tree(dir.path());

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(1024));
    let result = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.total_files_considered, 3);
    assert_eq!(result.group_count(), 1);

    let group = &result.duplicate_groups[0];
    assert_eq!(names(&group.paths(), dir.path()), vec!["a.txt", "b.txt"]);
    assert_eq!(group.keep().unwrap().path, dir.path().join("a.txt"));
    assert_eq!(group.wasted_space(), 2000);
    assert_eq!(result.reclaimable_space(), 2000);
}

#[test]
fn test_scan_min_size_above_everything() {
    let dir = tempdir().unwrap();
    basic_tree(dir.path());

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(3000));
    let result = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.group_count(), 0);
    assert_eq!(result.total_files_considered, 0);
}

#[test]
fn test_scan_small_files_never_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1.txt", b"tiny");
    write(dir.path(), "small2.txt", b"tiny");
    write(dir.path(), "big1.bin", &[7; 1024]);
    write(dir.path(), "big2.bin", &[7; 1024]);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(1024));
    let result = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.total_files_considered, 2);
    assert_eq!(result.group_count(), 1);
    assert_eq!(
        names(&result.duplicate_groups[0].paths(), dir.path()),
        vec!["big1.bin", "big2.bin"]
    );
}

#[test]
fn test_scan_nested_directories_keep_walk_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "z.bin", &[1; 2048]);
    write(dir.path(), "a/deep/copy.bin", &[1; 2048]);
    write(dir.path(), "m/other.bin", &[1; 2048]);
    write(dir.path(), "m/unique.bin", &[2; 2048]);

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(
        names(&result.duplicate_groups[0].paths(), dir.path()),
        vec!["a/deep/copy.bin", "m/other.bin", "z.bin"]
    );
    assert_eq!(result.duplicate_groups[0].wasted_space(), 4096);
}

#[test]
fn test_scan_multiple_groups_in_first_seen_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "1.bin", &[9; 1500]);
    write(dir.path(), "2.bin", &[3; 1500]);
    write(dir.path(), "3.bin", &[3; 1500]);
    write(dir.path(), "4.bin", &[9; 1500]);
    write(dir.path(), "5.bin", &[5; 1500]);

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.group_count(), 2);
    assert_eq!(
        names(&result.duplicate_groups[0].paths(), dir.path()),
        vec!["1.bin", "4.bin"]
    );
    assert_eq!(
        names(&result.duplicate_groups[1].paths(), dir.path()),
        vec!["2.bin", "3.bin"]
    );
}

#[test]
fn test_scan_same_content_different_names_and_empty_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(0));
    let result = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(result.reclaimable_space(), 0);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible.bin", &[4; 2048]);
    write(dir.path(), ".hidden.bin", &[4; 2048]);
    write(dir.path(), ".cache/inner.bin", &[4; 2048]);

    let walker = WalkerConfig {
        skip_hidden: true,
        ..Default::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let result = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(result.total_files_considered, 1);
    assert!(!result.has_duplicates());

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(result.total_files_considered, 3);
    assert_eq!(result.group_count(), 1);
}

#[test]
fn test_scan_invalid_roots() {
    let dir = tempdir().unwrap();
    write(dir.path(), "file.txt", b"x");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("file.txt"))
        .unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_scan_is_repeatable() {
    let dir = tempdir().unwrap();
    basic_tree(dir.path());
    write(dir.path(), "sub/a_copy.txt", &[b'x'; 2000]);

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(3));
    let first = finder.find_duplicates(dir.path()).unwrap();
    let second = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.duplicate_groups, second.duplicate_groups);
}

#[cfg(unix)]
#[test]
fn test_scan_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    basic_tree(dir.path());
    write(dir.path(), "locked/a_copy.txt", &[b'x'; 2000]);

    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.traversal_skips, 1);
    assert_eq!(result.total_files_considered, 3);
    assert_eq!(result.group_count(), 1);
    assert_eq!(
        names(&result.duplicate_groups[0].paths(), dir.path()),
        vec!["a.txt", "b.txt"]
    );
}
