//! Config files written to disk and loaded back

use gcodeview_settings::{Config, ConfigError, SettingsError};

fn custom_config() -> Config {
    let mut config = Config::new();
    config.parser.rapid_feed_rate = 2500.0;
    config.synthesis.cut_depth = -0.5;
    config.synthesis.origin.x = 10.0;
    config.playback.tick_interval_ms = 33;
    config.playback.initial_speed = 2.0;
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let config = custom_config();
    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[parser]"));
    assert!(content.contains("rapid_feed_rate = 2500.0"));
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = custom_config();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("gcodeview").join("config.toml");

    Config::new().save_to_file(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_load_or_default_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
}

#[test]
fn test_invalid_file_content_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[playback]\ninitial_speed = -1.0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { ref key, .. } if key == "playback"));

    std::fs::write(&path, "[parser\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let err = Config::new().save_to_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(_))
    ));
}
