//! 8-bit RGB colours for the reference rasterizer.

/// Opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Construct from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Scale RGB by `factor`, saturating at 255.
    pub fn brighten(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }

    // ── Palette ─────────────────────────────────────────────────────────────

    pub const DARK_GRAY: Self = Self::rgb(64, 64, 64);

    /// Class colours, cycled by class index.
    pub const CLASS_PALETTE: [Self; 8] = [
        Self::from_hex(0xE6194B),
        Self::from_hex(0x3CB44B),
        Self::from_hex(0xFFE119),
        Self::from_hex(0x4363D8),
        Self::from_hex(0xF58231),
        Self::from_hex(0x911EB4),
        Self::from_hex(0x46F0F0),
        Self::from_hex(0xF032E6),
    ];

    /// Colour for class `class`; wraps around the palette.
    pub fn for_class(class: usize) -> Self {
        Self::CLASS_PALETTE[class % Self::CLASS_PALETTE.len()]
    }
}
