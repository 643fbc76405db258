//! Uploaded label photo

use crate::llm::InlineImage;
use crate::{MedscanError, Result};
use image::GenericImageView;

/// A photo that is known to decode as a raster image
#[derive(Debug, Clone)]
pub struct LabelImage {
    bytes: Vec<u8>,
    mime_type: &'static str,
    width: u32,
    height: u32,
}

impl LabelImage {
    /// Sniff the format and decode once to make sure the bytes are an image.
    ///
    /// The original bytes are kept and sent to the model as-is.
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(MedscanError::image("empty upload"));
        }

        let format = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;
        let (width, height) = decoded.dimensions();

        Ok(Self {
            bytes,
            mime_type: format.to_mime_type(),
            width,
            height,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// View for the model request
    pub fn inline(&self) -> InlineImage<'_> {
        InlineImage {
            mime_type: self.mime_type,
            data: &self.bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(12, 8, Rgb([200u8, 200, 200]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, format)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = LabelImage::decode(encode(ImageFormat::Png)).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.dimensions(), (12, 8));
        assert_eq!(image.inline().data.len(), image.byte_len());
    }

    #[test]
    fn test_decode_jpeg() {
        let image = LabelImage::decode(encode(ImageFormat::Jpeg)).unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_reject_empty() {
        assert!(matches!(
            LabelImage::decode(Vec::new()),
            Err(MedscanError::Image(_))
        ));
    }

    #[test]
    fn test_reject_text() {
        let result = LabelImage::decode(b"definitely not a picture".to_vec());
        assert!(matches!(result, Err(MedscanError::Image(_))));
    }

    #[test]
    fn test_reject_truncated_png() {
        let mut bytes = encode(ImageFormat::Png);
        bytes.truncate(30);
        assert!(LabelImage::decode(bytes).is_err());
    }
}
