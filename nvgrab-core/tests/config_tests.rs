//! Configuration loading tests

use nvgrab_core::config::{CaptureConfig, ConfigFile, DEFAULT_ENCODER_PRIORITIES};

#[test]
fn test_missing_file_yields_defaults() {
    let config = ConfigFile::load_from("/definitely/not/a/real/path.toml".into())
        .expect("missing file is not an error");
    assert_eq!(config.capture.framerate, 30);
    assert_eq!(
        config.encoder.candidates,
        DEFAULT_ENCODER_PRIORITIES.to_vec()
    );
}

#[test]
fn test_load_full_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[capture]
framerate = 60
capture_size = [1280, 720]
backend = "kmsgrab"

[encoder]
candidates = ["h264_nvenc"]
preset = "slow"
bitrate = 8000000
"#,
    )
    .expect("write config");

    let config = ConfigFile::load_from(path).expect("load");
    assert_eq!(config.capture.framerate, 60);
    assert_eq!(config.capture.capture_size, Some((1280, 720)));
    assert_eq!(config.capture.backend.as_deref(), Some("kmsgrab"));
    assert_eq!(config.encoder.candidates, vec!["h264_nvenc"]);
    assert_eq!(config.encoder.preset, "slow");
    assert_eq!(config.encoder.bitrate, 8_000_000);
    // Unspecified fields keep their defaults
    assert_eq!(config.encoder.gop_size, 10);
    assert_eq!(config.encoder.max_b_frames, 2);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[capture]\nframerate = 24\n").expect("write config");

    let config = ConfigFile::load_from(path).expect("load");
    assert_eq!(config.capture.framerate, 24);
    assert_eq!(
        config.encoder.candidates,
        DEFAULT_ENCODER_PRIORITIES.to_vec()
    );
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not toml {{{{").expect("write config");

    assert!(ConfigFile::load_from(path).is_err());
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(CaptureConfig::default().validate().is_ok());
}
