//! Hardware video encoding via FFmpeg/NVENC
//!
//! This module provides:
//! - Priority-list selection of an available hardware encoder
//! - Pixel format conversion into the encoder's NV12 layout
//! - Synchronous and overlapped (one frame in flight) encoding

mod convert;
mod hw;
mod select;

pub use convert::Converter;
pub use hw::{EncodedPacket, HardwareEncoder, PendingSubmission};
pub use select::{encoder_available, pick_available_encoder, select_by_priority};
