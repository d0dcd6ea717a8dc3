//! Pixel format conversion
//!
//! Converts decoded capture frames (typically packed BGRA/RGBA) into the
//! biplanar NV12 layout the hardware encoder consumes.

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{self, Flags};
use ffmpeg_next::util::frame::video::Video;
use tracing::debug;

use crate::error::{NvgrabError, Result};

/// Fixed-target pixel format converter.
///
/// The destination frame is allocated once at construction and reused for
/// every call: the borrow returned by [`Converter::convert`] is overwritten
/// by the next call, so callers that keep converted data across calls must
/// clone it first.
pub struct Converter {
    scaler: scaling::Context,
    /// Reused destination buffer
    output: Video,
}

impl Converter {
    /// Build a converter from the capture format to NV12 at the encoder's
    /// negotiated output dimensions. Allocation failure is fatal.
    pub fn new(
        src_format: Pixel,
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    ) -> Result<Self> {
        debug!(
            "Creating converter: {:?} {}x{} -> NV12 {}x{}",
            src_format, src_width, src_height, dst_width, dst_height
        );

        let scaler = scaling::Context::get(
            src_format,
            src_width,
            src_height,
            Pixel::NV12,
            dst_width,
            dst_height,
            Flags::BILINEAR,
        )
        .map_err(|e| NvgrabError::Converter(format!("Failed to create scaler: {}", e)))?;

        // Video::new allocates the plane buffers up front
        let output = Video::new(Pixel::NV12, dst_width, dst_height);

        Ok(Self { scaler, output })
    }

    /// Convert a frame into the reused destination buffer and return a
    /// borrow of it.
    pub fn convert(&mut self, src: &Video) -> Result<&Video> {
        self.scaler
            .run(src, &mut self.output)
            .map_err(|e| NvgrabError::Converter(format!("Conversion failed: {}", e)))?;
        Ok(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_next as ffmpeg;

    #[test]
    fn test_convert_reuses_destination() {
        ffmpeg::init().expect("ffmpeg init");

        let mut converter = Converter::new(Pixel::RGBA, 64, 64, 64, 64).expect("build converter");

        let mut src = Video::new(Pixel::RGBA, 64, 64);
        src.data_mut(0).fill(255);
        let first_ptr = {
            let out = converter.convert(&src).expect("convert");
            assert_eq!(out.format(), Pixel::NV12);
            assert_eq!(out.width(), 64);
            assert_eq!(out.height(), 64);
            out.data(0).as_ptr()
        };

        src.data_mut(0).fill(0);
        let second_ptr = converter.convert(&src).expect("convert").data(0).as_ptr();

        // Same backing storage across calls
        assert_eq!(first_ptr, second_ptr);
    }

    #[test]
    fn test_white_rgba_maps_to_bright_luma() {
        ffmpeg::init().expect("ffmpeg init");

        let mut converter = Converter::new(Pixel::RGBA, 32, 32, 32, 32).expect("build converter");
        let mut src = Video::new(Pixel::RGBA, 32, 32);
        src.data_mut(0).fill(255);

        let out = converter.convert(&src).expect("convert");
        // Full-scale white lands near the top of the luma range
        assert!(out.data(0)[0] > 200);
    }
}
