use serde::{Deserialize, Serialize};
use std::fmt;

/// Color stored in the packed `r<<24 | g<<16 | b<<8 | a` layout used on
/// the wire. Keeping the packed value means an inverse action restores
/// the exact integer it replaced.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba(u32);

impl Rgba {
    pub const WHITE: Rgba = Rgba(0xFFFF_FFFF);

    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(
            (r as u32) << 24
                | (g as u32) << 16
                | (b as u32) << 8
                | a as u32,
        )
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 255)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgba(#{:08x})", self.0)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::from_rgba(r, g, b, a)
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        [c.r(), c.g(), c.b(), c.a()]
    }
}
