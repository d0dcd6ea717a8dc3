//! nvgrab-core: hardware-accelerated screen recording
//!
//! Captures the screen through FFmpeg's avdevice backends, encodes it on an
//! NVIDIA GPU via NVENC, and muxes the result into a container file.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   raw packets   ┌─────────┐   frames   ┌───────────┐
//! │ ScreenCapture │ ──────────────> │ decoder │ ─────────> │ Converter │
//! │ (x11grab/...) │                 └─────────┘            │  (-> NV12)│
//! └───────────────┘                                        └─────┬─────┘
//!                                                                │
//!                              ┌─────────────────┐               │
//!  ┌──────────┐   packets     │ HardwareEncoder  │ <─────────────┘
//!  │ FileSink │ <──────────── │ (NVENC, 1 frame  │   owned frame, moved to
//!  │ (mp4/mkv)│               │  in flight)      │   the submit thread
//!  └──────────┘               └─────────────────┘
//! ```
//!
//! [`pipeline::Session`] owns the whole chain: encoding of frame N overlaps
//! the capture and conversion of frame N+1, and packets reach the sink in
//! capture order.

pub mod capture;
pub mod config;
pub mod encode;
pub mod error;
pub mod output;
pub mod pipeline;

pub use capture::{available_backends, ScreenCapture};
pub use config::{CaptureConfig, CaptureOptions, ConfigFile, EncoderOptions};
pub use encode::{encoder_available, Converter, EncodedPacket, HardwareEncoder};
pub use error::{NvgrabError, Result};
pub use output::FileSink;
pub use pipeline::{Session, SessionStats};
