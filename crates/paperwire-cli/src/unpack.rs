//! Unpack command: folders of scanned codes back into a file tree
//!
//! Each source directory carries one complete chunk stream and is
//! processed on its own: scan every file, collect chunks, verify the
//! index range is complete, then decompress and extract. A failing
//! source stops the run; sources after it are not touched.

use std::fs;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use paperwire_core::{unpack_stream, ChunkSet, XzCodec};

use crate::source::{DigitSource, QrScanSource, RawDigitSource};

pub struct UnpackConfig {
    /// Directories holding the scanned transport units.
    pub sources: Vec<PathBuf>,
    /// Directory the tree is extracted into.
    pub output_dir: PathBuf,
    /// Treat units as raw text dumps instead of images.
    pub raw: bool,
}

pub fn run(config: UnpackConfig) -> Result<()> {
    let extractor: Box<dyn DigitSource> = if config.raw {
        Box::new(RawDigitSource)
    } else {
        Box::new(QrScanSource)
    };

    for source in &config.sources {
        info!("reading codes from {}", source.display());
        process_source(source, &config.output_dir, extractor.as_ref())?;
    }
    Ok(())
}

fn process_source(source: &Path, output_dir: &Path, extractor: &dyn DigitSource) -> Result<()> {
    let mut chunks = ChunkSet::new();
    for unit in list_units(source)? {
        match extractor.extract(&unit) {
            Ok(Some(digits)) => match chunks.insert_digits(&digits) {
                Ok(index) => debug!("opening: {} ... chunk {}", unit.display(), index),
                Err(e) => debug!("opening: {} ... skipped: {}", unit.display(), e),
            },
            Ok(None) => debug!("opening: {} ... no symbol", unit.display()),
            Err(e) => debug!("opening: {} ... skipped: {:#}", unit.display(), e),
        }
    }

    let total = chunks.len();
    let compressed = chunks.reassemble()?;
    debug!("{} chunks, {} compressed bytes", total, compressed.len());

    // Spool the decompressed archive to disk; it can be much larger than
    // the chunk stream.
    let mut spool = tempfile::tempfile()?;
    let size = XzCodec::new().decompress_to(&compressed, &mut spool)?;
    debug!("decompressed {} bytes", size);
    spool.seek(SeekFrom::Start(0))?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;
    unpack_stream(spool, output_dir)?;
    info!("extracted into {}", output_dir.display());
    Ok(())
}

/// Files directly inside `source`, in name order.
fn list_units(source: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(source)
        .with_context(|| format!("cannot read source directory {}", source.display()))?;
    let mut units: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    units.sort();
    Ok(units)
}
