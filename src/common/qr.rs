// src/common/qr.rs

use image::Luma;
use qrcode::QrCode;

use crate::common::error::AppError;

/// Renderiza `payload` como QR em PNG (escala de cinza).
pub fn png(payload: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    // Renderiza para imagem
    let image_buffer = code.render::<Luma<u8>>().min_dimensions(256, 256).build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

    let mut bytes = Vec::new();
    dynamic_image
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png() {
        let bytes = png("1032456789").unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
