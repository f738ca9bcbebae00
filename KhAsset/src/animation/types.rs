//! Sequence animation data types

use serde::{Deserialize, Serialize};

/// Neutral vertex color (`0x80` per lane is full intensity on the GS).
pub const NEUTRAL_COLOR: u32 = 0x8080_8080;

/// Per-animation flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationFlags(u32);

impl AnimationFlags {
    /// Bit 0: linear curve instead of cubic ease-in.
    pub const LINEAR: u32 = 0x0001;
    /// Bit 14: secondary translation (`xb`/`yb`) is ignored.
    pub const DISABLE_TRANSLATION_B: u32 = 0x4000;

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_linear(self) -> bool {
        self.0 & Self::LINEAR != 0
    }

    #[must_use]
    pub const fn is_translation_b_disabled(self) -> bool {
        self.0 & Self::DISABLE_TRANSLATION_B != 0
    }
}

/// A keyframe pair interpolated from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Channel {
    pub start: f32,
    pub end: f32,
}

impl Channel {
    #[must_use]
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// A channel holding `value` for the whole range.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    pub(crate) fn is_finite(self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

/// One sprite animation: a frame range, a flag word and keyframe channels.
///
/// Missing fields in JSON take the values of [`Animation::default`]: zero
/// translation and rotation, unit scale, neutral color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    pub flags: AnimationFlags,
    pub frame_start: i32,
    pub frame_end: i32,
    /// Primary translation.
    pub xa: Channel,
    pub ya: Channel,
    /// Secondary translation, summed with the primary one.
    pub xb: Channel,
    pub yb: Channel,
    pub rotation_x: Channel,
    pub rotation_y: Channel,
    pub rotation_z: Channel,
    pub scale: Channel,
    pub scale_x: Channel,
    pub scale_y: Channel,
    /// Packed `0xAABBGGRR` colors.
    pub color_start: u32,
    pub color_end: u32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            flags: AnimationFlags::default(),
            frame_start: 0,
            frame_end: 0,
            xa: Channel::default(),
            ya: Channel::default(),
            xb: Channel::default(),
            yb: Channel::default(),
            rotation_x: Channel::default(),
            rotation_y: Channel::default(),
            rotation_z: Channel::default(),
            scale: Channel::constant(1.0),
            scale_x: Channel::constant(1.0),
            scale_y: Channel::constant(1.0),
            color_start: NEUTRAL_COLOR,
            color_end: NEUTRAL_COLOR,
        }
    }
}

impl Animation {
    pub(crate) fn channels(&self) -> [(&'static str, Channel); 10] {
        [
            ("xa", self.xa),
            ("ya", self.ya),
            ("xb", self.xb),
            ("yb", self.yb),
            ("rotation_x", self.rotation_x),
            ("rotation_y", self.rotation_y),
            ("rotation_z", self.rotation_z),
            ("scale", self.scale),
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
        ]
    }
}

/// Sprite transform at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation_x: f32,
    pub translation_y: f32,
    /// Rotation around X, Y, Z.
    pub rotation: [f32; 3],
    pub scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Packed color, same layout as the keyframes.
    pub color: u32,
}

impl Transform {
    /// Color split into its byte lanes, lowest lane first.
    #[must_use]
    pub const fn color_lanes(&self) -> [u8; 4] {
        self.color.to_le_bytes()
    }
}
