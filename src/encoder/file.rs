//! PNG/BMP file encoder built on the image crate

use std::path::Path;

use image::{ExtendedColorType, ImageFormat};

use crate::{
    capture::traits::{DefaultPixelConverter, PixelFormatConverter},
    encoder::ImageEncoder,
    error::{EncodingError, EncodingResult},
    types::{OutputFormat, RawImage, BYTES_PER_PIXEL},
};

/// Writes captured images as PNG or BMP files
#[derive(Debug, Clone, Copy, Default)]
pub struct FileEncoder {
    format: OutputFormat,
}

impl FileEncoder {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn png() -> Self {
        Self::new(OutputFormat::Png)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Tightly packed, opaque RGBA copy of `image`
    fn to_rgba(image: &RawImage) -> EncodingResult<Vec<u8>> {
        if image.width == 0 || image.height == 0 {
            return Err(EncodingError::InvalidDimensions {
                width: image.width,
                height: image.height,
            });
        }

        let row_bytes = image.width as usize * BYTES_PER_PIXEL;
        let required = image.stride.max(row_bytes) * (image.height as usize - 1) + row_bytes;
        if image.stride < row_bytes || image.data.len() < required {
            return Err(EncodingError::BufferTooSmall {
                required,
                provided: image.data.len(),
            });
        }

        let mut rgba = Vec::with_capacity(row_bytes * image.height as usize);
        for row in image.data.chunks(image.stride).take(image.height as usize) {
            rgba.extend_from_slice(&row[..row_bytes]);
        }

        let converter = DefaultPixelConverter;
        converter.convert_bgra_to_rgba(&mut rgba);
        converter.force_opaque(&mut rgba);

        Ok(rgba)
    }
}

impl ImageEncoder for FileEncoder {
    fn encode_to(&self, image: &RawImage, path: &Path) -> EncodingResult<()> {
        let rgba = Self::to_rgba(image)?;
        let format = match self.format {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
        };

        image::save_buffer_with_format(
            path,
            &rgba,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
            format,
        )?;

        log::debug!(
            "Wrote {}x{} {} to {}",
            image.width,
            image.height,
            self.format.extension(),
            path.display()
        );
        Ok(())
    }

    fn extension(&self) -> &str {
        self.format.extension()
    }

    fn name(&self) -> &str {
        match self.format {
            OutputFormat::Png => "PNG file encoder",
            OutputFormat::Bmp => "BMP file encoder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgba_strips_padding_and_swaps_channels() {
        // 1x2 BGRA image with 4 bytes of row padding
        let data = vec![1, 2, 3, 0, 9, 9, 9, 9, 4, 5, 6, 0];
        let image = RawImage::with_stride(data, 1, 2, 8);

        let rgba = FileEncoder::to_rgba(&image).unwrap();
        assert_eq!(rgba, vec![3, 2, 1, 255, 6, 5, 4, 255]);
    }

    #[test]
    fn test_to_rgba_rejects_short_buffer() {
        let image = RawImage::new(vec![0; 12], 2, 2);
        assert!(matches!(
            FileEncoder::to_rgba(&image),
            Err(EncodingError::BufferTooSmall { required: 16, provided: 12 })
        ));
    }

    #[test]
    fn test_writes_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.png");
        let image = RawImage::new([10u8, 20, 30, 0].repeat(8 * 4), 8, 4);

        FileEncoder::png().encode_to(&image, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(0, 0).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_missing_directory_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("1.png");
        let image = RawImage::new(vec![0; 4], 1, 1);

        assert!(FileEncoder::png().encode_to(&image, &path).is_err());
        assert!(!dir.path().join("missing").exists());
    }
}
