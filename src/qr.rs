//! QR PNG rendering of provisioning URIs

use crate::Error;
use image::{GrayImage, ImageEncoder, Luma};
use qrcode::{Color, EcLevel, QrCode};

/// Pixels per QR module
const MODULE_PX: u32 = 8;
/// Quiet-zone border, in modules
const QUIET_ZONE: u32 = 4;

/// Encode `uri` as a QR code (error correction level Q) and return PNG bytes
///
/// # Errors
///
/// Returns [`Error::QrEncode`] if the data does not fit in a QR code or PNG
/// encoding fails
pub fn new_qr(uri: &str) -> Result<Vec<u8>, Error> {
    let code = QrCode::with_error_correction_level(uri.as_bytes(), EcLevel::Q)
        .map_err(|e| Error::QrEncode(e.to_string()))?;

    let width = u32::try_from(code.width()).map_err(|e| Error::QrEncode(e.to_string()))?;
    let size = (width + QUIET_ZONE * 2) * MODULE_PX;
    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));

    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        // i < width * width, so both fit in u32
        let (x, y) = (i as u32 % width, i as u32 / width);
        let (left, top) = ((x + QUIET_ZONE) * MODULE_PX, (y + QUIET_ZONE) * MODULE_PX);
        for dy in 0..MODULE_PX {
            for dx in 0..MODULE_PX {
                img.put_pixel(left + dx, top + dy, Luma([0u8]));
            }
        }
    }

    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(img.as_raw(), size, size, image::ExtendedColorType::L8)
        .map_err(|e| Error::QrEncode(e.to_string()))?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Otp;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn uri_renders_to_png() {
        let png = Otp::totp("JBSWY3DPEHPK3PXP").qr_png().unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn image_has_quiet_zone_and_module_scale() {
        let uri = Otp::hotp_at("JBSWY3DPEHPK3PXP", 5).create_uri();
        let png = new_qr(&uri).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();

        let modules = QrCode::with_error_correction_level(uri.as_bytes(), EcLevel::Q)
            .unwrap()
            .width() as u32;
        assert_eq!(img.width(), (modules + 2 * QUIET_ZONE) * MODULE_PX);
        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
        // top-left finder pattern starts right after the quiet zone
        let corner = QUIET_ZONE * MODULE_PX;
        assert_eq!(img.get_pixel(corner, corner), &Luma([0u8]));
    }

    #[test]
    fn oversized_input_is_an_error() {
        let too_long = "A".repeat(8_000);
        assert!(matches!(new_qr(&too_long), Err(Error::QrEncode(_))));
    }
}
