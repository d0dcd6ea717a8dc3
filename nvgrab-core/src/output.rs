//! Container output
//!
//! Writes encoded packets into an MP4/MKV container, rescaling timestamps
//! from the encoder time base into the output stream's time base.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec::encoder;
use ffmpeg_next::format;
use ffmpeg_next::Rational;

use crate::encode::EncodedPacket;
use crate::error::{NvgrabError, Result};

/// File sink for encoded packets.
///
/// The container trailer is written exactly once: either by an explicit
/// [`FileSink::close`] or, on early exit paths, by `Drop`.
pub struct FileSink {
    path: PathBuf,
    output: format::context::Output,
    stream_index: usize,
    packets_written: u64,
    write_failures: u64,
    closed: bool,
}

impl FileSink {
    /// Create the output container with one video stream whose codec
    /// parameters are copied from the opened encoder. The container header
    /// is written immediately; any failure here is fatal.
    pub fn create(path: impl Into<PathBuf>, encoder: &encoder::Video) -> Result<Self> {
        let path = path.into();
        info!("Creating output container: {:?}", path);

        let mut output = format::output(&path)
            .map_err(|e| NvgrabError::output(format!("Failed to create output file: {}", e)))?;

        let stream_index = {
            let mut stream = output
                .add_stream(encoder.codec())
                .map_err(|e| NvgrabError::output(format!("Failed to add video stream: {}", e)))?;

            // SAFETY: rust-ffmpeg exposes no safe call for
            // avcodec_parameters_from_context. The stream was just created so
            // its codecpar pointer is valid, and the encoder context is open;
            // the call copies the negotiated parameters (including extradata)
            // into the stream.
            unsafe {
                let par = stream.parameters().as_ptr() as *mut ffmpeg::ffi::AVCodecParameters;
                let ret = ffmpeg::ffi::avcodec_parameters_from_context(par, encoder.as_ptr());
                if ret < 0 {
                    return Err(NvgrabError::output(format!(
                        "Failed to copy codec parameters: {}",
                        ffmpeg::Error::from(ret)
                    )));
                }
            }

            stream.set_time_base(encoder.time_base());
            stream.index()
        };

        output
            .write_header()
            .map_err(|e| NvgrabError::output(format!("Failed to write container header: {}", e)))?;

        debug!("Container header written, stream index {}", stream_index);

        Ok(Self {
            path,
            output,
            stream_index,
            packets_written: 0,
            write_failures: 0,
            closed: false,
        })
    }

    /// Write one encoded packet, rescaling its timestamps from the
    /// encoder time base into the output stream's time base.
    pub fn write(&mut self, packet: &EncodedPacket, src_time_base: Rational) -> Result<()> {
        let mut pkt = ffmpeg::Packet::copy(&packet.data);
        pkt.set_stream(self.stream_index);
        pkt.set_pts(Some(packet.pts));
        pkt.set_dts(Some(packet.dts));
        if packet.keyframe {
            pkt.set_flags(ffmpeg::packet::Flags::KEY);
        }

        // The muxer may have replaced the requested time base on header write
        let dst_time_base = self
            .output
            .stream(self.stream_index)
            .map(|s| s.time_base())
            .unwrap_or(src_time_base);
        pkt.rescale_ts(src_time_base, dst_time_base);

        pkt.write_interleaved(&mut self.output)
            .map_err(|e| NvgrabError::output(format!("Failed to write packet: {}", e)))?;

        self.packets_written += 1;
        Ok(())
    }

    /// Write a packet, treating failure as recoverable: a single dropped
    /// frame write must not abort a live capture session.
    pub fn write_or_log(&mut self, packet: &EncodedPacket, src_time_base: Rational) {
        if let Err(e) = self.write(packet, src_time_base) {
            self.write_failures += 1;
            warn!("Packet write failed (continuing): {}", e);
        }
    }

    /// Finalize the container. Idempotent; the trailer is written once.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.output
            .write_trailer()
            .map_err(|e| NvgrabError::output(format!("Failed to write container trailer: {}", e)))?;

        info!(
            "Output finalized: {:?} ({} packets, {} write failures)",
            self.path, self.packets_written, self.write_failures
        );
        Ok(())
    }

    /// Output path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Number of packets written so far
    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Number of packet writes that failed and were skipped
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.output.write_trailer() {
                error!("Failed to write container trailer on drop: {}", e);
            }
        }
    }
}
