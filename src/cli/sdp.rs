use std::fs::{self, File};
use std::io::BufWriter;

use anyhow::{Context, Result};

use super::command::SdpArgs;
use st2110::sdp::{SdpSettings, SdpWriter};

pub fn cmd_sdp(args: &SdpArgs) -> Result<()> {
    let settings = SdpSettings {
        session_name: args.session_name.clone(),
        session_info: args.session_info.clone(),
        output_path: args.output.clone(),
    };

    let mut writer = SdpWriter::new(&settings);
    for media in &args.media {
        writer.add_media(&media.0)?;
        log::debug!(
            "Added {} stream {} (pt {})",
            media.0.kind,
            media.0.destination,
            media.0.payload_type
        );
    }

    let path = writer.output_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    log::info!("Writing SDP file to {}", path.display());
    let file = File::create(path)
        .with_context(|| format!("Failed to create SDP file {}", path.display()))?;
    writer.write_to(BufWriter::new(file))?;

    Ok(())
}
