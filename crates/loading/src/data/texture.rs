/// Layout of one pixel in `Image::data`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PixelMode {
    Luminance,
    LuminanceAlpha,
    Rgb,
    #[default]
    Rgba,
}

impl PixelMode {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelMode::Luminance => 1,
            PixelMode::LuminanceAlpha => 2,
            PixelMode::Rgb => 3,
            PixelMode::Rgba => 4,
        }
    }
}

/// Decoded 8-bit image, rows stored top to bottom.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub mode: PixelMode,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, mode: PixelMode, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            mode,
            data,
        }
    }

    /// Size in bytes the pixel buffer should have for the current dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.mode.bytes_per_pixel()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
