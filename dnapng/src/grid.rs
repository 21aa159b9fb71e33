/// An RGBA pixel, 8 bits per channel.
pub type Rgba = [u8; 4];

/// Fully transparent black, the zero value of a fresh grid.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Opaque black.
pub const OPAQUE_BLACK: Rgba = [0, 0, 0, 255];

/// Opaque gray of the given intensity.
pub const fn gray(v: u8) -> Rgba {
    [v, v, v, 255]
}

/// Pixel-addressable image the codec reads from and writes to.
pub trait PixelGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn get_pixel(&self, x: u32, y: u32) -> Rgba;
    fn set_pixel(&mut self, x: u32, y: u32, px: Rgba);
}

/// RGBA image with tightly packed row-major pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub buf: Vec<u8>,
}

impl RgbaImage {
    /// Create a new fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Create an image with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba) -> Self {
        let count = width as usize * height as usize;
        let mut buf = Vec::with_capacity(count * 4);
        for _ in 0..count {
            buf.extend_from_slice(&px);
        }
        Self { width, height, buf }
    }

    /// Wrap existing RGBA8 data. Returns `None` if `buf` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, buf: Vec<u8>) -> Option<Self> {
        if buf.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, buf })
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes in one pixel row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 4
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.row_bytes() + x as usize * 4
    }
}

impl PixelGrid for RgbaImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get_pixel(&self, x: u32, y: u32) -> Rgba {
        let i = self.offset(x, y);
        [self.buf[i], self.buf[i + 1], self.buf[i + 2], self.buf[i + 3]]
    }

    #[inline]
    fn set_pixel(&mut self, x: u32, y: u32, px: Rgba) {
        let i = self.offset(x, y);
        self.buf[i..i + 4].copy_from_slice(&px);
    }
}
