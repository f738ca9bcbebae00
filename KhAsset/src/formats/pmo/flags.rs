//! Per-chunk vertex format word
//!
//! Bit layout (PSP GE vertex type, plus PMO extensions):
//!
//! | bits   | meaning                                  |
//! |--------|------------------------------------------|
//! | 0-1    | texture coordinate format                |
//! | 2-4    | vertex color format (7 = RGBA 8888)      |
//! | 7-8    | position format                          |
//! | 24     | uniform diffuse color follows the header |
//! | 28-30  | primitive type (3 = triangle list)       |

use serde::{Deserialize, Serialize};

/// Storage precision of a coordinate channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoordinateFormat {
    /// Channel absent.
    NoCoord = 0,
    Normalized8 = 1,
    Normalized16 = 2,
    Float32 = 3,
}

impl CoordinateFormat {
    /// 2-bit code stored in the flag word.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code & 0b11 {
            0 => Self::NoCoord,
            1 => Self::Normalized8,
            2 => Self::Normalized16,
            _ => Self::Float32,
        }
    }

    /// Bytes used by one component in this format.
    #[must_use]
    pub const fn component_size(self) -> u32 {
        match self {
            Self::Float32 => 4,
            other => other.code(),
        }
    }

    /// Next wider format, `Float32` being the widest.
    #[must_use]
    pub const fn wider(self) -> Self {
        match self {
            Self::NoCoord => Self::Normalized8,
            Self::Normalized8 => Self::Normalized16,
            Self::Normalized16 | Self::Float32 => Self::Float32,
        }
    }

    /// Signed fixed-point value of a position component.
    ///
    /// `None` when the rounded value falls outside the integer range, and
    /// for formats without a fixed-point encoding.
    #[must_use]
    pub fn quantize_signed(self, value: f32) -> Option<i32> {
        match self {
            Self::Normalized8 => quantize(value, 128.0, -128.0, 127.0),
            Self::Normalized16 => quantize(value, 32768.0, -32768.0, 32767.0),
            Self::NoCoord | Self::Float32 => None,
        }
    }

    /// Unsigned fixed-point value of a texture coordinate component.
    #[must_use]
    pub fn quantize_unsigned(self, value: f32) -> Option<i32> {
        match self {
            Self::Normalized8 => quantize(value, 128.0, 0.0, 255.0),
            Self::Normalized16 => quantize(value, 32768.0, 0.0, 65535.0),
            Self::NoCoord | Self::Float32 => None,
        }
    }
}

fn quantize(value: f32, scale: f32, min: f32, max: f32) -> Option<i32> {
    let fixed = (value * scale).round();
    // NaN fails both comparisons
    (fixed >= min && fixed <= max).then_some(fixed as i32)
}

const BASE: u32 = 0x3000_0000;
const UNIFORM_COLOR_BIT: u32 = 24;
const COLOR_SHIFT: u32 = 2;
const COLOR_MASK: u32 = 0b111;
/// RGBA 8888 per-vertex color.
const COLOR_8888: u32 = 7;
const TEXTURE_SHIFT: u32 = 0;
const POSITION_SHIFT: u32 = 7;
const FORMAT_MASK: u32 = 0b11;

/// Packed 32-bit vertex format descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexFlags(u32);

impl VertexFlags {
    /// Build the flag word for a chunk.
    #[must_use]
    pub fn pack(
        uniform_color: bool,
        texture_format: CoordinateFormat,
        position_format: CoordinateFormat,
    ) -> Self {
        let mut bits = BASE;
        if uniform_color {
            bits |= 1 << UNIFORM_COLOR_BIT;
        } else {
            bits = set_bits(bits, COLOR_SHIFT, COLOR_MASK, COLOR_8888);
        }
        bits = set_bits(bits, TEXTURE_SHIFT, FORMAT_MASK, texture_format.code());
        bits = set_bits(bits, POSITION_SHIFT, FORMAT_MASK, position_format.code());
        Self(bits)
    }

    #[must_use]
    pub const fn from_raw(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn has_uniform_color(self) -> bool {
        self.0 & (1 << UNIFORM_COLOR_BIT) != 0
    }

    /// 3-bit color format (0 when colors are uniform).
    #[must_use]
    pub const fn color_format(self) -> u32 {
        (self.0 >> COLOR_SHIFT) & COLOR_MASK
    }

    #[must_use]
    pub const fn texture_format(self) -> CoordinateFormat {
        CoordinateFormat::from_code(self.0 >> TEXTURE_SHIFT)
    }

    #[must_use]
    pub const fn position_format(self) -> CoordinateFormat {
        CoordinateFormat::from_code(self.0 >> POSITION_SHIFT)
    }

    /// Primitive type (bits 28-30).
    #[must_use]
    pub const fn primitive_type(self) -> u32 {
        (self.0 >> 28) & 0b111
    }
}

fn set_bits(value: u32, shift: u32, mask: u32, bits: u32) -> u32 {
    (value & !(mask << shift)) | ((bits & mask) << shift)
}
