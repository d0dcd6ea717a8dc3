//! Record command - capture the screen into a container file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nvgrab_core::{CaptureConfig, ConfigFile, Session};

/// Arguments for the record command
#[derive(Args)]
pub struct RecordArgs {
    /// Output file path (omit to discard packets and only report throughput)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Capture frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Capture resolution as WIDTHxHEIGHT (omit to let the backend decide)
    #[arg(long)]
    size: Option<String>,

    /// Capture source (X11 display, gdigrab window name)
    #[arg(long)]
    source: Option<String>,

    /// Capture backend override (x11grab, gdigrab, avfoundation)
    #[arg(long)]
    backend: Option<String>,

    /// Encoder candidates in priority order, comma separated
    #[arg(long, value_delimiter = ',')]
    codecs: Vec<String>,

    /// NVENC preset
    #[arg(long)]
    preset: Option<String>,

    /// NVENC profile
    #[arg(long)]
    profile: Option<String>,

    /// GPU index
    #[arg(long)]
    gpu: Option<String>,

    /// Target bitrate in bits per second
    #[arg(long)]
    bitrate: Option<usize>,

    /// Keyframe interval in frames
    #[arg(long)]
    gop: Option<u32>,

    /// Maximum consecutive B-frames
    #[arg(long)]
    bframes: Option<usize>,
}

/// Record the screen until the capture source ends.
pub async fn record(args: RecordArgs) -> Result<()> {
    // Config file first, CLI flags win
    let file = ConfigFile::load_or_default();
    let mut config = CaptureConfig {
        capture: file.capture,
        encoder: file.encoder,
        output: args.output.clone(),
    };

    if let Some(fps) = args.fps {
        config.capture.framerate = fps;
    }
    if let Some(size) = &args.size {
        config.capture.capture_size = Some(parse_size(size)?);
    }
    if let Some(source) = args.source {
        config.capture.source = source;
    }
    if let Some(backend) = args.backend {
        config.capture.backend = Some(backend);
    }
    if !args.codecs.is_empty() {
        config.encoder.candidates = args.codecs;
    }
    if let Some(preset) = args.preset {
        config.encoder.preset = preset;
    }
    if let Some(profile) = args.profile {
        config.encoder.profile = profile;
    }
    if let Some(gpu) = args.gpu {
        config.encoder.gpu = gpu;
    }
    if let Some(bitrate) = args.bitrate {
        config.encoder.bitrate = bitrate;
    }
    if let Some(gop) = args.gop {
        config.encoder.gop_size = gop;
    }
    if let Some(bframes) = args.bframes {
        config.encoder.max_b_frames = bframes;
    }

    match &args.output {
        Some(path) => println!("Recording to {:?} (close the capture source to stop)", path),
        None => println!("Dry run: encoding without writing (close the capture source to stop)"),
    }

    let output = args.output;
    // The pipeline is blocking FFmpeg I/O; keep it off the async runtime
    let stats = tokio::task::spawn_blocking(move || {
        let session = Session::new(config)?;
        match output {
            Some(path) => session.record(path),
            None => session.run(|packet| {
                tracing::info!(
                    "packet: pts={} size={} keyframe={}",
                    packet.pts,
                    packet.data.len(),
                    packet.keyframe
                );
            }),
        }
    })
    .await
    .context("recording task panicked")??;

    println!("Recording finished: {}", stats);
    Ok(())
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .context("size must be WIDTHxHEIGHT, e.g. 1920x1080")?;
    Ok((
        w.parse().context("invalid width")?,
        h.parse().context("invalid height")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1920x1080").unwrap(), (1920, 1080));
        assert!(parse_size("1920").is_err());
        assert!(parse_size("axb").is_err());
    }
}
