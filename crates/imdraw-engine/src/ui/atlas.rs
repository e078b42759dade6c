/// Font atlas pixels as exported by the UI library (tightly packed RGBA32).
///
/// Queried once at startup and handed to `UiRenderer::new`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontAtlas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl FontAtlas {
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// Bytes per tightly packed row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL as usize
    }

    /// Byte length implied by the dimensions.
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}
