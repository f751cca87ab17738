/// Opaque color as written in a log: `r<<24 | g<<16 | b<<8 | 255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Highlight a node has before any action touches it.
    pub const NODE_DEFAULT: Color = Color::rgb(255, 255, 255);
    /// Color an edge has before any action touches it.
    pub const EDGE_DEFAULT: Color = Color::rgb(100, 100, 100);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn packed(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | 0xFF
    }
}

impl From<colorous::Color> for Color {
    fn from(c: colorous::Color) -> Self {
        Self::rgb(c.r, c.g, c.b)
    }
}
