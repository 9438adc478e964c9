use dupesweep::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Build the figment by hand so the user's environment cannot leak in
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.min_size, 1024);
    assert_eq!(config.io_threads, 4);
    assert!(!config.follow_symlinks);
    assert!(!config.skip_hidden);
    assert!(!config.trash);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
min_size = 65536
io_threads = 8
follow_symlinks = true
trash = true
chunk_size = 65536
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.min_size, 65536);
    assert_eq!(config.io_threads, 8);
    assert!(config.follow_symlinks);
    assert!(config.trash);
    assert_eq!(config.chunk_size, 65536);
}

#[test]
fn test_config_env_layer_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nmin_size = 10\n").unwrap();

    // A private prefix keeps this from affecting tests that load the real layers
    std::env::set_var("DUPESWEEP_CFGTEST_IO_THREADS", "16");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DUPESWEEP_CFGTEST_"));
    let config = Config::from_figment(&figment).unwrap();

    std::env::remove_var("DUPESWEEP_CFGTEST_IO_THREADS");

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.min_size, 10);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = [1, 2").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_zero_chunk_size_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "chunk_size = 0\n").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            key: "chunk_size",
            ..
        })
    ));
}

#[test]
fn test_config_unknown_keys_ignored() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "theme = \"dark\"\nskip_hidden = true\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert!(config.skip_hidden);
}
