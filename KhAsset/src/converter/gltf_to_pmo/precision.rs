//! SPDX-FileCopyrightText: 2025 KhAsset contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Coordinate precision negotiation.
//!
//! Each selector walks the tiers from narrowest to widest and returns the
//! first one every sample fits. Only the upper bound of a tier is checked;
//! the encoder widens a tier whose expanded values fall outside its range.

use serde::{Deserialize, Serialize};

use crate::formats::pmo::CoordinateFormat;

const NORMALIZED_8_SCALE: f32 = 128.0;
const NORMALIZED_8_MAX: f32 = 255.0;
const NORMALIZED_16_SCALE: f32 = 32768.0;
const NORMALIZED_16_MAX: f32 = 65535.0;
/// Positions are tested in units of 100.
const POSITION_UNIT: f32 = 100.0;

/// How the encoder picks the formats written into the flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionPolicy {
    /// Always 32-bit float, whatever the selectors compute. Matches every
    /// model produced by the reference exporter.
    #[default]
    FixedFloat32,
    /// Use the narrowest tier the selectors find.
    Adaptive,
}

impl PrecisionPolicy {
    /// Final format for a channel given the selector's result.
    #[must_use]
    pub fn resolve(self, computed: CoordinateFormat) -> CoordinateFormat {
        match self {
            Self::FixedFloat32 => CoordinateFormat::Float32,
            Self::Adaptive => computed,
        }
    }
}

/// Narrowest texture coordinate format that holds every sample.
#[must_use]
pub fn select_texture_coordinate_format(samples: &[[f32; 2]]) -> CoordinateFormat {
    if samples.iter().all(|uv| uv[0] == 0.0 && uv[1] == 0.0) {
        return CoordinateFormat::NoCoord;
    }
    if fits(samples, |v| v * NORMALIZED_8_SCALE, NORMALIZED_8_MAX) {
        return CoordinateFormat::Normalized8;
    }
    if fits(samples, |v| v * NORMALIZED_16_SCALE, NORMALIZED_16_MAX) {
        return CoordinateFormat::Normalized16;
    }
    CoordinateFormat::Float32
}

/// Narrowest position format that holds every sample.
///
/// Positions never resolve to [`CoordinateFormat::NoCoord`].
#[must_use]
pub fn select_position_format(samples: &[[f32; 3]]) -> CoordinateFormat {
    if fits(
        samples,
        |v| (v / POSITION_UNIT) * NORMALIZED_8_SCALE,
        NORMALIZED_8_MAX,
    ) {
        return CoordinateFormat::Normalized8;
    }
    if fits(
        samples,
        |v| (v / POSITION_UNIT) * NORMALIZED_16_SCALE,
        NORMALIZED_16_MAX,
    ) {
        return CoordinateFormat::Normalized16;
    }
    CoordinateFormat::Float32
}

fn fits<const N: usize>(samples: &[[f32; N]], scale: impl Fn(f32) -> f32, max: f32) -> bool {
    // NaN compares false and falls through to the float tier.
    samples
        .iter()
        .all(|sample| sample.iter().all(|&v| scale(v) <= max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_no_coord() {
        assert_eq!(
            select_texture_coordinate_format(&[[0.0, 0.0], [0.0, 0.0]]),
            CoordinateFormat::NoCoord
        );
    }

    #[test]
    fn test_texture_tiers() {
        assert_eq!(
            select_texture_coordinate_format(&[[0.0, 0.0], [1.0, 0.5]]),
            CoordinateFormat::Normalized8
        );
        // 1.99 * 128 = 254.72 still fits the 8-bit tier
        assert_eq!(
            select_texture_coordinate_format(&[[1.99, 0.0]]),
            CoordinateFormat::Normalized8
        );
        assert_eq!(
            select_texture_coordinate_format(&[[0.5, 0.5], [1.995, 0.0]]),
            CoordinateFormat::Normalized16
        );
        assert_eq!(
            select_texture_coordinate_format(&[[0.5, 0.5], [0.0, 2.5]]),
            CoordinateFormat::Float32
        );
    }

    #[test]
    fn test_texture_single_failing_sample_aborts_tier() {
        let mut samples = vec![[0.25, 0.25]; 100];
        samples.push([3.0, 0.0]);
        assert_eq!(
            select_texture_coordinate_format(&samples),
            CoordinateFormat::Float32
        );
    }

    #[test]
    fn test_position_tiers() {
        // 199 / 100 * 128 = 254.72
        assert_eq!(
            select_position_format(&[[0.0, 0.0, 0.0], [199.0, -50.0, 10.0]]),
            CoordinateFormat::Normalized8
        );
        assert_eq!(
            select_position_format(&[[0.0, 199.9, 0.0]]),
            CoordinateFormat::Normalized16
        );
        assert_eq!(
            select_position_format(&[[0.0, 0.0, 250.0]]),
            CoordinateFormat::Float32
        );
    }

    #[test]
    fn test_position_never_no_coord() {
        assert_eq!(
            select_position_format(&[[0.0, 0.0, 0.0]]),
            CoordinateFormat::Normalized8
        );
    }

    #[test]
    fn test_tier_containment() {
        let sets: [&[[f32; 2]]; 4] = [
            &[[0.1, 0.2], [1.0, 1.0]],
            &[[1.9921875, 0.0]],
            &[[1.999, 1.5]],
            &[[-5.0, 0.5]],
        ];
        for samples in sets {
            if select_texture_coordinate_format(samples) == CoordinateFormat::Normalized8 {
                assert!(fits(samples, |v| v * NORMALIZED_16_SCALE, NORMALIZED_16_MAX));
            }
        }
        let positions: [&[[f32; 3]]; 3] = [
            &[[10.0, 20.0, 30.0]],
            &[[199.21875, 0.0, 0.0]],
            &[[-1000.0, 5.0, 5.0]],
        ];
        for samples in positions {
            if select_position_format(samples) == CoordinateFormat::Normalized8 {
                assert!(fits(
                    samples,
                    |v| (v / POSITION_UNIT) * NORMALIZED_16_SCALE,
                    NORMALIZED_16_MAX
                ));
            }
        }
    }

    #[test]
    fn test_policy_resolution() {
        assert_eq!(
            PrecisionPolicy::default().resolve(CoordinateFormat::Normalized8),
            CoordinateFormat::Float32
        );
        assert_eq!(
            PrecisionPolicy::Adaptive.resolve(CoordinateFormat::Normalized16),
            CoordinateFormat::Normalized16
        );
    }
}
