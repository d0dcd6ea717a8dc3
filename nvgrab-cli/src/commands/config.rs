//! Config command - print a sample configuration file

use anyhow::Result;
use nvgrab_core::config::sample_config;
use nvgrab_core::ConfigFile;

/// Print a sample configuration, ready to save to the default path
pub async fn config() -> Result<()> {
    println!("# Save as {:?}", ConfigFile::default_path());
    println!();
    print!("{}", sample_config());
    Ok(())
}
