//! QR symbol rendering for chunk digit strings

use std::path::Path;

use anyhow::{Context, Result};
use image::Luma;
use qrcode::QrCode;

use paperwire_core::EcLevel;

/// Rendered pixels per module.
const MODULE_PIXELS: u32 = 8;

fn qr_level(level: EcLevel) -> qrcode::EcLevel {
    match level {
        EcLevel::L => qrcode::EcLevel::L,
        EcLevel::M => qrcode::EcLevel::M,
        EcLevel::Q => qrcode::EcLevel::Q,
        EcLevel::H => qrcode::EcLevel::H,
    }
}

/// Render a digit string as a QR PNG at `path`.
///
/// All-digit payloads select the numeric symbol mode, which is where the
/// capacity tables get their headroom; the smallest version that fits is
/// chosen automatically.
pub fn render_code(digits: &str, level: EcLevel, path: &Path) -> Result<()> {
    let code = QrCode::with_error_correction_level(digits, qr_level(level))
        .with_context(|| format!("{} digits do not fit any symbol", digits.len()))?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();
    image
        .save(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
