//! Screen capture input via FFmpeg's avdevice backends
//!
//! Opens a platform screen-grab demuxer (x11grab, gdigrab, avfoundation),
//! binds the first video stream it exposes, and pumps raw packets to a
//! handler in a blocking loop.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::Parameters;
use ffmpeg_next::format::{self, format::Format};
use ffmpeg_next::{media, Dictionary};
use tracing::{debug, info, warn};

use crate::config::CaptureOptions;
use crate::error::{NvgrabError, Result};

/// A live screen capture session bound to one video stream.
pub struct ScreenCapture {
    input: format::context::Input,
    /// Immutable after discovery; exactly one video stream per session
    video_stream_index: usize,
}

impl ScreenCapture {
    /// Open the capture backend and bind its video stream.
    ///
    /// The backend identifier comes from the options (platform default
    /// unless overridden); frame rate and optional fixed capture resolution
    /// are applied as demuxer options. Fails with `NoVideoStream` if the
    /// opened input exposes no video stream.
    pub fn open(opts: &CaptureOptions) -> Result<Self> {
        ffmpeg::init().map_err(|e| NvgrabError::capture(format!("FFmpeg init failed: {}", e)))?;

        let backend = opts.backend_name();
        let input_format = find_capture_backend(backend)
            .ok_or_else(|| NvgrabError::BackendNotFound(backend.to_string()))?;

        let mut dict = Dictionary::new();
        dict.set("framerate", &opts.framerate.to_string());
        if let Some((width, height)) = opts.capture_size {
            dict.set("video_size", &format!("{}x{}", width, height));
        }

        info!(
            "Opening capture: backend={} source={} framerate={}",
            backend, opts.source, opts.framerate
        );

        let context = format::open_with(&opts.source, &input_format, dict).map_err(|e| {
            NvgrabError::capture(format!("Failed to open capture source {}: {}", opts.source, e))
        })?;

        let input = match context {
            format::Context::Input(input) => input,
            format::Context::Output(_) => {
                return Err(NvgrabError::capture(format!(
                    "Backend {} is not an input format",
                    backend
                )));
            }
        };

        // Bind the first stream whose media type is video
        let video_stream_index = input
            .streams()
            .find(|stream| stream.parameters().medium() == media::Type::Video)
            .map(|stream| stream.index())
            .ok_or(NvgrabError::NoVideoStream)?;

        info!("Bound video stream index {}", video_stream_index);

        Ok(Self {
            input,
            video_stream_index,
        })
    }

    /// Index of the bound video stream
    pub fn stream_index(&self) -> usize {
        self.video_stream_index
    }

    /// Codec parameters of the bound video stream, for building the decoder
    pub fn video_parameters(&self) -> Result<Parameters> {
        self.input
            .stream(self.video_stream_index)
            .map(|stream| stream.parameters())
            .ok_or_else(|| NvgrabError::capture("Bound video stream disappeared"))
    }

    /// Read packets in a blocking loop until the source ends.
    ///
    /// Only packets belonging to the bound video stream reach the handler;
    /// every packet's storage is released after the handler returns, so the
    /// handler must not retain it. The loop terminates when the upstream
    /// read signals end-of-stream or an error, or when the handler returns
    /// an error (which is propagated).
    pub fn run(
        &mut self,
        mut on_packet: impl FnMut(&ffmpeg::Packet) -> Result<()>,
    ) -> Result<()> {
        loop {
            // Fresh packet per iteration; Drop releases the storage
            let mut packet = ffmpeg::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        on_packet(&packet)?;
                    }
                }
                Err(ffmpeg::Error::Eof) => {
                    debug!("Capture source reached end of stream");
                    break;
                }
                Err(e) => {
                    warn!("Capture read failed, ending session: {}", e);
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Look up an avdevice input format by name.
///
/// FFmpeg registers some backends under comma-separated aliases, so each
/// component is matched.
fn find_capture_backend(name: &str) -> Option<Format> {
    ffmpeg::device::input::video()
        .find(|format| format.name().split(',').any(|alias| alias == name))
}

/// List the capture backends this FFmpeg build supports
pub fn available_backends() -> Vec<String> {
    ffmpeg::init().ok();
    ffmpeg::device::input::video()
        .map(|format| format.name().to_string())
        .collect()
}
