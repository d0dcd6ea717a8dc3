//! Hardware encoder selection
//!
//! Walks an ordered candidate list and picks the first encoder FFmpeg knows
//! about on this system. There is deliberately no software fallback: a miss
//! on every candidate is fatal for session setup.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::encoder;
use tracing::{info, warn};

use crate::error::{NvgrabError, Result};

/// Pick the first candidate the availability predicate accepts.
///
/// Strict left-to-right priority; no capability scoring beyond
/// available/unavailable. The predicate is injected so tests can substitute
/// fake codec sets.
pub fn select_by_priority<'a, S: AsRef<str>>(
    candidates: &'a [S],
    is_available: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    for candidate in candidates {
        let name = candidate.as_ref();
        if is_available(name) {
            info!("Selected hardware encoder: {}", name);
            return Some(name);
        }
        warn!("Hardware encoder {} not supported, skipping", name);
    }
    None
}

/// Pick the first available hardware encoder from the priority list.
pub fn pick_available_encoder<S: AsRef<str>>(candidates: &[S]) -> Result<ffmpeg::Codec> {
    ffmpeg::init().map_err(|e| NvgrabError::encoder(format!("FFmpeg init failed: {}", e)))?;

    let name = select_by_priority(candidates, |name| encoder::find_by_name(name).is_some())
        .ok_or_else(|| {
            NvgrabError::NoSupportedEncoder(
                candidates.iter().map(|c| c.as_ref().to_string()).collect(),
            )
        })?;

    encoder::find_by_name(name)
        .ok_or_else(|| NvgrabError::encoder(format!("Encoder {} disappeared after probe", name)))
}

/// Check whether a single encoder name is available
pub fn encoder_available(name: &str) -> bool {
    ffmpeg::init().ok();
    encoder::find_by_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_available_wins() {
        let candidates = ["av1_nvenc", "hevc_nvenc", "h264_nvenc"];
        let picked = select_by_priority(&candidates, |name| name != "av1_nvenc");
        assert_eq!(picked, Some("hevc_nvenc"));
    }

    #[test]
    fn test_priority_order_beats_later_availability() {
        // Everything is available; the leftmost still wins.
        let candidates = ["av1_nvenc", "hevc_nvenc", "h264_nvenc"];
        let picked = select_by_priority(&candidates, |_| true);
        assert_eq!(picked, Some("av1_nvenc"));
    }

    #[test]
    fn test_none_available() {
        let candidates = ["av1_nvenc", "hevc_nvenc"];
        assert_eq!(select_by_priority(&candidates, |_| false), None);
    }

    #[test]
    fn test_empty_list() {
        let candidates: [&str; 0] = [];
        assert_eq!(select_by_priority(&candidates, |_| true), None);
    }
}
