//! Digit extraction from chunk transport units
//!
//! A transport unit is any file from which a chunk's decimal digit string
//! can be recovered. QR images are the normal carrier; raw dumps cover
//! units that arrive through copy-paste or OCR instead of a scanner.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Strategy for recovering a digit string from one transport unit.
///
/// `Ok(None)` means the unit held nothing usable; `Err` means the unit
/// itself could not be read. Callers skip both and keep scanning.
pub trait DigitSource {
    fn extract(&self, unit: &Path) -> Result<Option<String>>;
}

/// Decodes the first readable QR symbol in an image file.
pub struct QrScanSource;

impl DigitSource for QrScanSource {
    fn extract(&self, unit: &Path) -> Result<Option<String>> {
        let image = image::open(unit)
            .with_context(|| format!("cannot open image {}", unit.display()))?
            .to_luma8();
        let (width, height) = image.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                image.get_pixel(x as u32, y as u32).0[0]
            });
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_, content)) => return Ok(Some(content)),
                Err(e) => debug!("undecodable symbol in {}: {:?}", unit.display(), e),
            }
        }
        Ok(None)
    }
}

/// Keeps only the ASCII digits of an unstructured byte dump.
pub struct RawDigitSource;

impl DigitSource for RawDigitSource {
    fn extract(&self, unit: &Path) -> Result<Option<String>> {
        let raw =
            fs::read(unit).with_context(|| format!("cannot read {}", unit.display()))?;
        let digits: String = raw
            .iter()
            .filter(|b| b.is_ascii_digit())
            .map(|&b| char::from(b))
            .collect();
        Ok((!digits.is_empty()).then_some(digits))
    }
}
