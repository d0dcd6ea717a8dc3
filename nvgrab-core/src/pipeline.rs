//! Capture session pipeline
//!
//! Wires the components end to end:
//!
//! ```text
//! ScreenCapture -> decoder -> Converter -> HardwareEncoder -> sink
//! ```
//!
//! The encode of frame N runs on a worker thread while the capture and
//! conversion of frame N+1 proceed on the session thread. Exactly one
//! submission is ever in flight; packets are delivered to the sink strictly
//! in capture order.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec;
use ffmpeg_next::util::frame::video::Video;
use tracing::{debug, info, warn};

use crate::capture::ScreenCapture;
use crate::config::CaptureConfig;
use crate::encode::{self, Converter, EncodedPacket, HardwareEncoder, PendingSubmission};
use crate::error::{NvgrabError, Result};
use crate::output::FileSink;

/// Summary of a completed capture session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Frames handed to the encoder
    pub frames_encoded: u64,
    /// Encoded packets delivered downstream
    pub packets_produced: u64,
    /// Packet writes that failed and were skipped (file sessions only)
    pub write_failures: u64,
    /// Wall-clock session duration in seconds
    pub elapsed_secs: f64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames encoded, {} packets in {:.1}s ({} write failures)",
            self.frames_encoded, self.packets_produced, self.elapsed_secs, self.write_failures
        )
    }
}

/// A fully-negotiated capture session, ready to run.
pub struct Session {
    config: CaptureConfig,
    capture: ScreenCapture,
    decoder: codec::decoder::Video,
    converter: Converter,
    encoder: HardwareEncoder,
}

impl Session {
    /// Negotiate every stage of the pipeline.
    ///
    /// Opens the capture backend, picks the first available hardware encoder
    /// from the configured priority list, builds a decoder from the capture
    /// stream's parameters, and sizes the encoder and converter from the
    /// decoded frame geometry. Any failure here is fatal; nothing has been
    /// written yet.
    pub fn new(config: CaptureConfig) -> Result<Self> {
        config.validate()?;

        let capture = ScreenCapture::open(&config.capture)?;
        let codec = encode::pick_available_encoder(&config.encoder.candidates)?;

        let decoder = codec::context::Context::from_parameters(capture.video_parameters()?)
            .map_err(|e| NvgrabError::capture(format!("Failed to read stream parameters: {}", e)))?
            .decoder()
            .video()
            .map_err(|e| NvgrabError::capture(format!("Failed to open capture decoder: {}", e)))?;

        let (width, height) = (decoder.width(), decoder.height());
        let encoder =
            HardwareEncoder::open(codec, width, height, config.capture.framerate, &config.encoder)?;
        let converter = Converter::new(
            decoder.format(),
            width,
            height,
            encoder.width(),
            encoder.height(),
        )?;

        info!(
            "Session ready: {}x{} @ {}fps via {}",
            width,
            height,
            config.capture.framerate,
            codec.name()
        );

        Ok(Self {
            config,
            capture,
            decoder,
            converter,
            encoder,
        })
    }

    /// The configuration this session was built from
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Encoder time base, needed to rescale delivered packet timestamps
    pub fn time_base(&self) -> ffmpeg::Rational {
        self.encoder.time_base()
    }

    /// Run the session, delivering every encoded packet to the handler.
    ///
    /// Blocks until the capture source ends. Packets arrive in capture
    /// order; their timestamps are in the encoder time base.
    pub fn run(self, mut on_packet: impl FnMut(&EncodedPacket)) -> Result<SessionStats> {
        let start = Instant::now();

        let Self {
            mut capture,
            mut decoder,
            mut converter,
            mut encoder,
            ..
        } = self;

        let mut pending: Option<PendingSubmission> = None;
        let mut decoded = Video::empty();
        let mut frames_encoded: u64 = 0;
        let mut packets_produced: u64 = 0;
        let mut next_pts: i64 = 0;

        let mut deliver = |packet: &EncodedPacket| {
            packets_produced += 1;
            on_packet(packet);
        };

        capture.run(|packet| {
            if let Err(e) = decoder.send_packet(packet) {
                // One rejected packet does not end a live session
                warn!("Decoder rejected packet (skipping): {}", e);
                return Ok(());
            }

            while decoder.receive_frame(&mut decoded).is_ok() {
                let converted = converter.convert(&decoded)?;

                // Resolve the previous submission before starting the next;
                // the encoder pipelines exactly one frame deep.
                if let Some(p) = pending.take() {
                    encoder.await_drain(p, &mut deliver)?;
                }

                // The converter reuses its buffer, so the frame crossing the
                // thread boundary must own its data.
                let mut frame = converted.clone();
                frame.set_pts(Some(next_pts));
                next_pts += 1;
                frames_encoded += 1;

                pending = Some(encoder.submit_async(frame)?);
            }

            Ok(())
        })?;

        // Resolve the trailing submission
        if let Some(p) = pending.take() {
            encoder.await_drain(p, &mut deliver)?;
        }

        // Flush frames the decoder is still holding
        if decoder.send_eof().is_ok() {
            while decoder.receive_frame(&mut decoded).is_ok() {
                let mut frame = converter.convert(&decoded)?.clone();
                frame.set_pts(Some(next_pts));
                next_pts += 1;
                frames_encoded += 1;
                encoder.synchronous(&frame, &mut deliver)?;
            }
        }

        encoder.flush(&mut deliver)?;

        let stats = SessionStats {
            frames_encoded,
            packets_produced,
            write_failures: 0,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        debug!("Session finished: {}", stats);
        Ok(stats)
    }

    /// Run the session and write every packet to a container file.
    ///
    /// Individual packet write failures are logged and counted but do not
    /// abort the session. The container trailer is written on every exit
    /// path.
    pub fn record(self, path: impl Into<PathBuf>) -> Result<SessionStats> {
        let src_time_base = self.encoder.time_base();
        let mut sink = FileSink::create(path, self.encoder.context()?)?;

        let result = self.run(|packet| sink.write_or_log(packet, src_time_base));

        // The trailer must go out even when the session failed
        let close_result = sink.close();
        let mut stats = result?;
        close_result?;

        stats.write_failures = sink.write_failures();
        info!("Recording complete: {}", stats);
        Ok(stats)
    }
}
