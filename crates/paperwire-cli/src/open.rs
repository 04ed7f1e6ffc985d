//! Open command: decrypt text frames from stdin into numbered files
//!
//! Frames are independent; a line that fails to authenticate or
//! decompress is logged and skipped without touching the others. The
//! output name keeps the line number, so surviving frames land in the
//! same files they would have without the bad line. Nothing is written
//! for a failed frame.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use paperwire_core::{open_frame, FrameKey};

use crate::password;

pub struct OpenConfig {
    /// Directory the numbered output files are written to.
    pub output_dir: PathBuf,
    /// Password file; prompts when absent.
    pub password_file: Option<PathBuf>,
}

pub fn run(config: OpenConfig) -> Result<()> {
    let password = password::obtain(config.password_file.as_deref())?;
    let key = FrameKey::derive(&password);

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;

    let stdin = io::stdin();
    let failures = open_lines(&key, stdin.lock(), &config.output_dir)?;
    if failures > 0 {
        bail!("{failures} frame(s) could not be opened");
    }
    Ok(())
}

/// Decrypt each line of `reader` into `<line number>.bin` under `dir`.
/// Returns how many frames failed.
pub fn open_lines<R: BufRead>(key: &FrameKey, mut reader: R, dir: &Path) -> Result<usize> {
    let mut line = Vec::new();
    let mut index = 0usize;
    let mut failures = 0usize;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        match open_frame(key, &line) {
            Ok(data) => {
                let path = dir.join(format!("{index}.bin"));
                fs::write(&path, &data)
                    .with_context(|| format!("cannot write {}", path.display()))?;
                info!("wrote {} ({} bytes)", path.display(), data.len());
            }
            Err(e) => {
                warn!("frame {} failed: {}", index, e);
                failures += 1;
            }
        }
        index += 1;
    }
    Ok(failures)
}
