//! Pack command: file trees into a folder of QR code images

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use paperwire_core::{ArchiveWriter, CapacityParams, ChunkEncoder, EcLevel, XzCodec};

use crate::qr;

pub struct PackConfig {
    /// Glob patterns naming the files and directories to pack.
    pub patterns: Vec<String>,
    /// Error-correction level of the rendered codes.
    pub level: EcLevel,
    /// Largest symbol version the chunk capacity is computed for.
    pub max_version: u8,
    /// Directory receiving the numbered PNG files.
    pub output_dir: PathBuf,
}

pub fn run(config: PackConfig) -> Result<()> {
    let params = CapacityParams::new(config.level, config.max_version)?;
    let capacity = params.payload_bytes()?;
    debug!(
        "chunk capacity: {} bytes at level {} version {}",
        capacity,
        params.level(),
        params.version()
    );

    let compressed = compress_inputs(&config.patterns)?;
    info!("inputs archived: {} compressed bytes", compressed.len());

    // Capacity overflow is detected here, before the first file is written.
    let encoder = ChunkEncoder::new(&compressed, capacity)?;
    let total = encoder.total_chunks();

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
    for chunk in encoder {
        let path = config
            .output_dir
            .join(format!("{}.png", usize::from(chunk.index) - 1));
        debug!("writing: {}", path.display());
        qr::render_code(&chunk.digits(), params.level(), &path)?;
    }

    info!("{} codes written to {}", total, config.output_dir.display());
    Ok(())
}

/// Tar every matched path and compress the archive stream.
fn compress_inputs(patterns: &[String]) -> Result<Vec<u8>> {
    let encoder = XzCodec::new().encoder(Vec::new())?;
    let mut archive = ArchiveWriter::new(encoder);

    let mut matched = 0usize;
    for pattern in patterns {
        let paths =
            glob::glob(pattern).with_context(|| format!("bad pattern {pattern:?}"))?;
        for entry in paths {
            archive.append_path(&entry?)?;
            matched += 1;
        }
    }
    if matched == 0 {
        warn!("no inputs matched, archive is empty");
    }

    Ok(archive.finish()?.finish()?)
}
