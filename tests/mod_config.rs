use std::path::PathBuf;

use estatelite::config::{AppConfig, ConfigError, candidate_paths};

#[test]
fn explicit_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("estatelite.toml");
    std::fs::write(
        &path,
        "[server]\nport = 7070\ncors_origins = [\"http://localhost:3000\"]\n\n[listing]\ndefault_limit = 20\n",
    )
    .unwrap();
    let cfg = AppConfig::from_file(&path).unwrap();
    assert_eq!(cfg.server.port, 7070);
    assert_eq!(cfg.server.cors_origins, vec!["http://localhost:3000".to_string()]);
    assert_eq!(cfg.listing.default_limit, 20);
    assert_eq!(cfg.listing.default_list_limit, 10);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn broken_file_names_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();
    let err = AppConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn explicit_path_is_searched_first() {
    let explicit = PathBuf::from("/etc/estatelite/custom.toml");
    let paths = candidate_paths(Some(&explicit));
    assert_eq!(paths.first(), Some(&explicit));
    assert!(paths.iter().any(|p| p.ends_with("estatelite.toml")));
}

#[test]
fn toml_output_parses_back() {
    let mut cfg = AppConfig::default();
    cfg.server.port = 6000;
    cfg.storage.data_dir = Some(PathBuf::from("/var/lib/estatelite"));
    let text = cfg.to_toml().unwrap();
    let back: AppConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}
