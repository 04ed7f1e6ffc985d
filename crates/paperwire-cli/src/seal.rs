//! Seal command: encrypt files into printable text frames on stdout

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use paperwire_core::{FrameKey, FrameWriter};

use crate::password;

pub struct SealConfig {
    /// Files to seal, one frame line each.
    pub paths: Vec<PathBuf>,
    /// Password file; prompts when absent.
    pub password_file: Option<PathBuf>,
}

pub fn run(config: SealConfig) -> Result<()> {
    let password = password::obtain(config.password_file.as_deref())?;
    let key = FrameKey::derive(&password);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    seal_paths(&key, &config.paths, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Write one framed line per input file. Stops at the first file that
/// cannot be read; frames already written stay valid on their own.
pub fn seal_paths<W: Write>(key: &FrameKey, paths: &[PathBuf], out: &mut W) -> Result<()> {
    for path in paths {
        seal_file(key, path, &mut *out)?;
    }
    Ok(())
}

fn seal_file<W: Write>(key: &FrameKey, path: &Path, out: W) -> Result<()> {
    debug!("sealing: {}", path.display());
    let mut input =
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut writer = FrameWriter::new(key, out)?;
    io::copy(&mut input, &mut writer)
        .with_context(|| format!("sealing {} failed", path.display()))?;
    writer.finish()?;
    Ok(())
}
