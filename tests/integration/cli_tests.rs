use clap::Parser;
use dupesweep::cli::{Cli, OutputFormat};
use dupesweep::error::ExitCode;
use dupesweep::signal::ShutdownHandler;
use std::fs;
use tempfile::tempdir;

fn run(cli: Cli) -> (anyhow::Result<ExitCode>, String, String) {
    let mut input: &[u8] = b"";
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code =
        dupesweep::run_app_with_io(cli, ShutdownHandler::new(), &mut input, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn test_default_directory_is_current() {
    let cli = Cli::try_parse_from(["dupesweep"]).unwrap();
    assert_eq!(cli.directory, std::path::PathBuf::from("."));
    assert_eq!(cli.output, OutputFormat::Text);
}

#[test]
fn test_unknown_flag_rejected() {
    assert!(Cli::try_parse_from(["dupesweep", "--paranoid"]).is_err());
    assert!(Cli::try_parse_from(["dupesweep", "--min-size", "ten"]).is_err());
}

#[test]
fn test_config_file_supplies_min_size() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), [b'x'; 2000]).unwrap();
    fs::write(data.join("b.txt"), [b'x'; 2000]).unwrap();

    let config = dir.path().join("dupesweep.toml");
    fs::write(&config, "min_size = 3000\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupesweep",
        data.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "-q",
    ])
    .unwrap();
    let (code, out, _) = run(cli);

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("No duplicates found!"));
}

#[test]
fn test_cli_min_size_beats_config_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), [b'x'; 2000]).unwrap();
    fs::write(data.join("b.txt"), [b'x'; 2000]).unwrap();

    let config = dir.path().join("dupesweep.toml");
    fs::write(&config, "min_size = 3000\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupesweep",
        data.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--min-size",
        "1KB",
        "-q",
    ])
    .unwrap();
    let (_, out, _) = run(cli);

    assert!(out.contains("Duplicate groups found: 1"));
}

#[test]
fn test_missing_config_file_is_general_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "dupesweep",
        dir.path().to_str().unwrap(),
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
        "-q",
    ])
    .unwrap();
    let (code, out, _) = run(cli);

    let err = code.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(err.to_string().contains("absent.toml"));
    assert!(out.is_empty());
}

#[test]
fn test_single_io_thread_gives_same_report() {
    let dir = tempdir().unwrap();
    for (name, byte) in [("a", 1u8), ("b", 2), ("c", 1), ("d", 2)] {
        fs::write(dir.path().join(name), [byte; 2048]).unwrap();
    }
    let root = dir.path().to_str().unwrap();

    let serial = run(Cli::try_parse_from(["dupesweep", root, "--io-threads", "1", "-q"]).unwrap()).1;
    let parallel =
        run(Cli::try_parse_from(["dupesweep", root, "--io-threads", "8", "-q"]).unwrap()).1;

    assert_eq!(serial, parallel);
    assert!(serial.contains("Duplicate groups found: 2"));
}
