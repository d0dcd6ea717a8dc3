//! Info command - show encoder and capture backend availability

use anyhow::Result;
use nvgrab_core::config::DEFAULT_ENCODER_PRIORITIES;
use nvgrab_core::{available_backends, encoder_available, ConfigFile};

/// Show what this system can capture and encode
pub async fn info() -> Result<()> {
    println!("nvgrab - System Information\n");

    println!("Hardware encoders (probed in priority order):");
    let mut any = false;
    for name in DEFAULT_ENCODER_PRIORITIES {
        let available = encoder_available(name);
        any |= available;
        let icon = if available { "[OK]" } else { "[--]" };
        println!("  {} {}", icon, name);
    }

    if !any {
        println!();
        println!("  No NVENC encoders found.");
        println!("  Make sure you have:");
        println!("  - An NVIDIA GPU with NVENC support");
        println!("  - NVIDIA drivers installed");
        println!("  - FFmpeg compiled with NVENC support");
    }

    println!();
    println!("Capture backends in this FFmpeg build:");
    let backends = available_backends();
    if backends.is_empty() {
        println!("  none (FFmpeg built without avdevice?)");
    } else {
        for backend in backends {
            println!("  - {}", backend);
        }
    }

    println!();
    println!("Config file: {:?}", ConfigFile::default_path());

    Ok(())
}
