//! Hardware video encoder
//!
//! Wraps an FFmpeg NVENC encoder context. Frames go in through `submit` (or
//! `submit_async`, which overlaps the send with the caller's next
//! capture/convert step), encoded packets come back out through `drain`.
//!
//! The encoder is a single-slot pipeline: at most one submission may be in
//! flight. While a `PendingSubmission` is outstanding the context physically
//! lives on the submit thread, so every other entry point reports
//! `PipelineOverlap` until `await_drain` brings it back.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::{self, encoder};
use ffmpeg_next::format::Pixel;
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::{Dictionary, Rational};
use std::thread;
use tracing::{info, trace};

use crate::config::EncoderOptions;
use crate::error::{NvgrabError, Result};

/// Encoded video packet
#[derive(Debug, Clone)]
pub struct EncodedPacket {
    /// Encoded bitstream data
    pub data: Vec<u8>,
    /// Presentation timestamp in the encoder time base
    pub pts: i64,
    /// Decode timestamp in the encoder time base
    pub dts: i64,
    /// Is this a keyframe?
    pub keyframe: bool,
}

/// An in-flight asynchronous frame submission.
///
/// Returned by [`HardwareEncoder::submit_async`] and resolved by
/// [`HardwareEncoder::await_drain`]. Dropping it without awaiting leaves the
/// encoder permanently in flight, so callers must join every submission.
#[must_use = "a pending submission must be resolved with await_drain"]
#[derive(Debug)]
pub struct PendingSubmission {
    handle: thread::JoinHandle<(encoder::Video, std::result::Result<(), ffmpeg::Error>)>,
}

/// NVENC hardware encoder
pub struct HardwareEncoder {
    /// Encoder context; None while a submission is in flight
    encoder: Option<encoder::Video>,
    width: u32,
    height: u32,
    time_base: Rational,
}

impl HardwareEncoder {
    /// Open the encoder with negotiated parameters.
    ///
    /// `codec` comes from [`crate::encode::pick_available_encoder`]; width and
    /// height are the capture session's negotiated dimensions. NVENC consumes
    /// NV12, so the pixel format is fixed.
    pub fn open(
        codec: ffmpeg::Codec,
        width: u32,
        height: u32,
        fps: u32,
        opts: &EncoderOptions,
    ) -> Result<Self> {
        let time_base = Rational::new(1, fps as i32);

        let mut context = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| NvgrabError::encoder(format!("Failed to create encoder context: {}", e)))?;

        context.set_width(width);
        context.set_height(height);
        context.set_format(Pixel::NV12);
        context.set_time_base(time_base);
        context.set_frame_rate(Some(Rational::new(fps as i32, 1)));
        context.set_bit_rate(opts.bitrate);
        context.set_gop(opts.gop_size);
        context.set_max_b_frames(opts.max_b_frames);

        // Encoder-specific tuning, passed through as opaque key/value options
        let mut dict = Dictionary::new();
        dict.set("preset", &opts.preset);
        dict.set("profile", &opts.profile);
        dict.set("gpu", &opts.gpu);

        let encoder = context
            .open_with(dict)
            .map_err(|e| NvgrabError::encoder(format!("Failed to open encoder: {}", e)))?;

        info!(
            "Hardware encoder opened: {}x{} @ {}fps, {} bps, gop={}",
            width, height, fps, opts.bitrate, opts.gop_size
        );

        Ok(Self {
            encoder: Some(encoder),
            width,
            height,
            time_base,
        })
    }

    /// Negotiated frame width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Negotiated frame height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoder time base (reciprocal of the target frame rate)
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Whether a submission is currently in flight
    pub fn in_flight(&self) -> bool {
        self.encoder.is_none()
    }

    /// Borrow the opened encoder context (e.g. for sink parameter copy)
    pub fn context(&self) -> Result<&encoder::Video> {
        self.encoder.as_ref().ok_or(NvgrabError::PipelineOverlap)
    }

    fn context_mut(&mut self) -> Result<&mut encoder::Video> {
        self.encoder.as_mut().ok_or(NvgrabError::PipelineOverlap)
    }

    /// Hand a frame to the encoder synchronously.
    ///
    /// Rejection by the encoder (wrong format, resource exhaustion) is fatal
    /// for the session unless the caller retries on its own.
    pub fn submit(&mut self, frame: &Video) -> Result<()> {
        self.context_mut()?
            .send_frame(frame)
            .map_err(|e| NvgrabError::encoder(format!("Failed to send frame: {}", e)))
    }

    /// Pull every currently-ready packet, invoking the handler once per
    /// packet. Returns once the encoder reports nothing further is ready.
    pub fn drain(&mut self, mut on_packet: impl FnMut(&EncodedPacket)) -> Result<()> {
        let enc = self.context_mut()?;
        let mut packet = ffmpeg::Packet::empty();

        loop {
            match enc.receive_packet(&mut packet) {
                Ok(()) => {
                    let encoded = EncodedPacket {
                        data: packet.data().map(|d| d.to_vec()).unwrap_or_default(),
                        pts: packet.pts().unwrap_or(0),
                        dts: packet.dts().unwrap_or(0),
                        keyframe: packet.is_key(),
                    };
                    trace!(
                        "Encoded packet: pts={}, size={}, keyframe={}",
                        encoded.pts,
                        encoded.data.len(),
                        encoded.keyframe
                    );
                    on_packet(&encoded);
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => break,
                Err(ffmpeg::Error::Eof) => break,
                Err(e) => {
                    return Err(NvgrabError::encoder(format!(
                        "Failed to receive packet: {}",
                        e
                    )));
                }
            }
        }

        Ok(())
    }

    /// Begin submitting a frame on a detached thread.
    ///
    /// The encoder context and the frame move onto the thread, so the caller
    /// is free to capture and convert the next frame while the hardware
    /// works. Issuing a second submission before the first is resolved is a
    /// precondition violation, not a queue: the pipeline overlaps one frame
    /// deep by design.
    pub fn submit_async(&mut self, frame: Video) -> Result<PendingSubmission> {
        let mut enc = self.encoder.take().ok_or(NvgrabError::PipelineOverlap)?;

        let handle = thread::spawn(move || {
            let result = enc.send_frame(&frame);
            (enc, result)
        });

        Ok(PendingSubmission { handle })
    }

    /// Join a pending submission, propagate its result, then drain.
    ///
    /// Packets are delivered in submission order; a submission that produced
    /// no packets invokes the handler zero times.
    pub fn await_drain(
        &mut self,
        pending: PendingSubmission,
        on_packet: impl FnMut(&EncodedPacket),
    ) -> Result<()> {
        let (enc, result) = pending
            .handle
            .join()
            .map_err(|_| NvgrabError::encoder("Encoder submit thread panicked"))?;
        self.encoder = Some(enc);

        result.map_err(|e| NvgrabError::encoder(format!("Failed to send frame: {}", e)))?;
        self.drain(on_packet)
    }

    /// Submit a frame and immediately drain its output.
    ///
    /// For callers that do not pipeline capture ahead of encode.
    pub fn synchronous(
        &mut self,
        frame: &Video,
        on_packet: impl FnMut(&EncodedPacket),
    ) -> Result<()> {
        self.submit(frame)?;
        self.drain(on_packet)
    }

    /// Signal end of stream and drain any remaining packets
    pub fn flush(&mut self, on_packet: impl FnMut(&EncodedPacket)) -> Result<()> {
        self.context_mut()?
            .send_eof()
            .map_err(|e| NvgrabError::encoder(format!("Failed to send EOF: {}", e)))?;
        self.drain(on_packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_packet_fields() {
        let pkt = EncodedPacket {
            data: vec![0, 1, 2],
            pts: 7,
            dts: 5,
            keyframe: true,
        };
        let cloned = pkt.clone();
        assert_eq!(cloned.data.len(), 3);
        assert_eq!(cloned.pts, 7);
        assert!(cloned.keyframe);
    }
}
