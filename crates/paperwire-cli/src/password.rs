//! Password acquisition for the text-frame commands

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read the password from the first line of `file`, or prompt on the
/// controlling terminal when no file is given.
pub fn obtain(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read password file {}", path.display()))?;
            Ok(text.lines().next().unwrap_or_default().to_string())
        }
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}
