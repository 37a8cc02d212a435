//! SVG rendering for volunteer QR codes.

use qrcode::QrCode;
use qrcode::render::svg;
use qrcode::types::QrError;

/// Smallest rendered edge in pixels.
const MIN_DIMENSION: u32 = 200;

/// The payload could not be encoded as a QR symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to render QR code: {0}")]
pub struct QrCodeError(#[from] QrError);

/// Render `payload` as a standalone SVG document.
///
/// # Examples
/// ```
/// use pazanimal::domain::render_qr_svg;
///
/// let svg = render_qr_svg("https://pazanimal.org/voluntarios/ana-lopez-123456")
///     .expect("short payloads encode");
/// assert!(svg.contains("<svg"));
/// ```
///
/// # Errors
/// Returns [`QrCodeError`] when the payload exceeds QR capacity.
pub fn render_qr_svg(payload: &str) -> Result<String, QrCodeError> {
    let code = QrCode::new(payload.as_bytes())?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build())
}
