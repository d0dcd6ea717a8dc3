//! End-to-end pipeline tests
//!
//! The full capture-to-file path needs both a live display and an
//! NVENC-capable GPU, so those tests are `#[ignore]`d for plain CI runs.

use nvgrab_core::{CaptureConfig, NvgrabError, Session, SessionStats};

#[test]
fn test_session_rejects_invalid_config() {
    let mut config = CaptureConfig::default();
    config.capture.framerate = 0;
    match Session::new(config) {
        Err(NvgrabError::Config(_)) => {}
        Err(other) => panic!("Expected a config error, got {:?}", other),
        Ok(_) => panic!("Zero framerate must not build a session"),
    }
}

#[test]
fn test_session_reports_missing_backend() {
    let mut config = CaptureConfig::default();
    config.capture.backend = Some("definitely-not-a-backend".to_string());
    match Session::new(config) {
        Err(NvgrabError::BackendNotFound(name)) => {
            assert_eq!(name, "definitely-not-a-backend");
        }
        Err(other) => panic!("Expected BackendNotFound, got {:?}", other),
        Ok(_) => panic!("Unknown backend must not build a session"),
    }
}

#[test]
fn test_stats_display() {
    let stats = SessionStats {
        frames_encoded: 300,
        packets_produced: 300,
        write_failures: 1,
        elapsed_secs: 10.0,
    };
    let text = stats.to_string();
    assert!(text.contains("300 frames"));
    assert!(text.contains("1 write failures"));
}

#[test]
#[ignore = "Requires a live display and an NVENC-capable GPU"]
fn test_session_negotiates_full_pipeline() {
    // Screen-grab inputs never signal end of stream on their own, so this
    // only verifies negotiation: backend open, encoder pick, decoder and
    // converter sizing. A full run needs an input that terminates.
    let mut config = CaptureConfig::default();
    config.capture.capture_size = Some((640, 480));

    let session = Session::new(config).expect("build session");
    assert_eq!(session.time_base(), ffmpeg_next::Rational::new(1, 30));
    assert_eq!(session.config().capture.capture_size, Some((640, 480)));
}
