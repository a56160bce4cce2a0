use std::io::{BufRead, Read};

use image::{DynamicImage, ImageFormat};

use crate::{Image, LoadError, Loader, PixelMode, Result, SourceManager};

/// Every raster format the `image` crate decodes, behind one shared instance.
pub struct ImageLoader;

impl ImageLoader {
    /// Decodes `bytes`, trusting the type tag when it names a known format and
    /// sniffing the content otherwise.
    pub fn decode(bytes: &[u8], type_tag: &str) -> Result<Image> {
        let decoded = match ImageFormat::from_extension(type_tag) {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        }
        .map_err(|err| LoadError::decode(type_tag, err))?;
        Ok(convert(decoded))
    }
}

/// Keeps the channel layout of the source, narrowed to 8 bits per channel.
fn convert(decoded: DynamicImage) -> Image {
    let color = decoded.color();
    let (mode, width, height, data) = match (color.has_color(), color.has_alpha()) {
        (false, false) => {
            let buffer = decoded.to_luma8();
            (PixelMode::Luminance, buffer.width(), buffer.height(), buffer.into_raw())
        }
        (false, true) => {
            let buffer = decoded.to_luma_alpha8();
            (PixelMode::LuminanceAlpha, buffer.width(), buffer.height(), buffer.into_raw())
        }
        (true, false) => {
            let buffer = decoded.to_rgb8();
            (PixelMode::Rgb, buffer.width(), buffer.height(), buffer.into_raw())
        }
        (true, true) => {
            let buffer = decoded.to_rgba8();
            (PixelMode::Rgba, buffer.width(), buffer.height(), buffer.into_raw())
        }
    };
    Image::new(width, height, mode, data)
}

impl Loader<Image> for ImageLoader {
    fn do_load(
        &self,
        stream: &mut dyn BufRead,
        _manager: &mut dyn SourceManager,
        type_tag: &str,
    ) -> Result<Image> {
        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .map_err(|err| LoadError::decode(type_tag, err))?;
        Self::decode(&bytes, type_tag)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayImage, RgbaImage};

    use super::*;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decodes_rgba_png() {
        let source = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]));
        let bytes = encode(DynamicImage::ImageRgba8(source), ImageFormat::Png);

        let decoded = ImageLoader::decode(&bytes, "png").unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.mode, PixelMode::Rgba);
        assert_eq!(decoded.data.len(), decoded.expected_len());
        assert_eq!(&decoded.data[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn keeps_grayscale_as_luminance() {
        let source = GrayImage::from_pixel(2, 2, image::Luma([7]));
        let bytes = encode(DynamicImage::ImageLuma8(source), ImageFormat::Png);

        let decoded = ImageLoader::decode(&bytes, "").unwrap();
        assert_eq!(decoded.mode, PixelMode::Luminance);
        assert_eq!(decoded.data, vec![7; 4]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = ImageLoader::decode(b"not an image", "png").unwrap_err();
        assert!(matches!(err, LoadError::Decode { ref tag, .. } if tag == "png"));
    }
}
