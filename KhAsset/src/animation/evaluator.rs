//! Keyframe evaluation.
//!
//! Time is normalized over the frame range and clamped to `[0, 1]`. One
//! curve, selected by flag bit 0, shapes every channel: linear when set,
//! cubic ease-in (`t^3`) when clear. Translation is the sum of the primary
//! and secondary channels, and flag bit 14 zeroes the secondary one.

use super::types::{Animation, Channel, Transform};
use crate::error::{Error, Result};

/// Evaluate `animation` at `frame`.
///
/// # Errors
/// `InvalidRange` if the frame range is inverted or if `frame` or any
/// keyframe value is not finite.
pub fn evaluate(animation: &Animation, frame: f32) -> Result<Transform> {
    validate(animation, frame)?;

    let t = normalized_time(animation.frame_start, animation.frame_end, frame);
    let f = if animation.flags.is_linear() { t } else { t * t * t };

    let translation = |primary: Channel, secondary: Channel| {
        let offset = if animation.flags.is_translation_b_disabled() {
            0.0
        } else {
            lerp(secondary, f)
        };
        saturate(lerp(primary, f) + offset)
    };

    Ok(Transform {
        translation_x: translation(animation.xa, animation.xb),
        translation_y: translation(animation.ya, animation.yb),
        rotation: [
            interpolate(animation.rotation_x, f),
            interpolate(animation.rotation_y, f),
            interpolate(animation.rotation_z, f),
        ],
        scale: interpolate(animation.scale, f),
        scale_x: interpolate(animation.scale_x, f),
        scale_y: interpolate(animation.scale_y, f),
        color: interpolate_color(animation.color_start, animation.color_end, f),
    })
}

impl Animation {
    /// Shorthand for [`evaluate`].
    ///
    /// # Errors
    /// See [`evaluate`].
    pub fn evaluate(&self, frame: f32) -> Result<Transform> {
        evaluate(self, frame)
    }
}

fn validate(animation: &Animation, frame: f32) -> Result<()> {
    if animation.frame_end < animation.frame_start {
        return Err(Error::invalid_range(format!(
            "frame end {} precedes frame start {}",
            animation.frame_end, animation.frame_start
        )));
    }
    if !frame.is_finite() {
        return Err(Error::invalid_range(format!("query frame {frame} is not finite")));
    }
    if let Some((name, _)) = animation.channels().iter().find(|(_, c)| !c.is_finite()) {
        return Err(Error::invalid_range(format!("channel {name} is not finite")));
    }
    Ok(())
}

fn normalized_time(start: i32, end: i32, frame: f32) -> f64 {
    let duration = f64::from(end) - f64::from(start);
    if duration <= 0.0 {
        return 0.0;
    }
    ((f64::from(frame) - f64::from(start)) / duration).clamp(0.0, 1.0)
}

/// `start * (1 - f) + end * f`, exact at both ends.
fn lerp(channel: Channel, f: f64) -> f64 {
    f64::from(channel.start) * (1.0 - f) + f64::from(channel.end) * f
}

fn interpolate(channel: Channel, f: f64) -> f32 {
    saturate(lerp(channel, f))
}

/// Narrow to `f32`, clamping to the finite range.
fn saturate(value: f64) -> f32 {
    let max = f64::from(f32::MAX);
    value.clamp(-max, max) as f32
}

fn interpolate_color(start: u32, end: u32, f: f64) -> u32 {
    let (s, e) = (start.to_le_bytes(), end.to_le_bytes());
    let mut lanes = [0u8; 4];
    for (lane, (&a, &b)) in lanes.iter_mut().zip(s.iter().zip(&e)) {
        let value = f64::from(a) * (1.0 - f) + f64::from(b) * f;
        *lane = value.round().clamp(0.0, 255.0) as u8;
    }
    u32::from_le_bytes(lanes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::types::AnimationFlags;
    use pretty_assertions::assert_eq;

    fn over_1000_frames(flags: u32) -> Animation {
        Animation {
            flags: AnimationFlags::from_bits(flags),
            frame_start: 0,
            frame_end: 1000,
            ..Animation::default()
        }
    }

    fn translation_x(animation: &Animation, frame: f32) -> f32 {
        evaluate(animation, frame).unwrap().translation_x.round()
    }

    #[test]
    fn test_primary_translation_curves() {
        let mut anim = over_1000_frames(0);
        anim.xa = Channel::new(0.0, 1000.0);
        assert_eq!(translation_x(&anim, 500.0), 125.0);
        assert_eq!(translation_x(&anim, 750.0), 422.0);

        anim.flags = AnimationFlags::from_bits(AnimationFlags::LINEAR);
        assert_eq!(translation_x(&anim, 0.0), 0.0);
        assert_eq!(translation_x(&anim, 500.0), 500.0);
    }

    #[test]
    fn test_secondary_translation_curves() {
        let mut anim = over_1000_frames(0);
        anim.xb = Channel::new(0.0, 1000.0);
        assert_eq!(translation_x(&anim, 500.0), 125.0);
        assert_eq!(translation_x(&anim, 750.0), 422.0);

        anim.flags = AnimationFlags::from_bits(AnimationFlags::LINEAR);
        assert_eq!(translation_x(&anim, 500.0), 500.0);
    }

    #[test]
    fn test_secondary_translation_masked() {
        let mut anim = over_1000_frames(AnimationFlags::DISABLE_TRANSLATION_B);
        anim.xb = Channel::new(0.0, 1000.0);
        anim.yb = Channel::new(0.0, 1000.0);
        let transform = evaluate(&anim, 500.0).unwrap();
        assert_eq!(transform.translation_x, 0.0);
        assert_eq!(transform.translation_y, 0.0);
    }

    #[test]
    fn test_translations_are_summed() {
        let mut anim = over_1000_frames(0);
        anim.xa = Channel::new(200.0, 500.0);
        anim.xb = Channel::new(150.0, 400.0);
        assert_eq!(evaluate(&anim, 500.0).unwrap().translation_x, 418.75);
        assert_eq!(translation_x(&anim, 500.0), 419.0);
    }

    #[test]
    fn test_zero_duration_holds_start() {
        let anim = Animation {
            xa: Channel::new(0.0, 1000.0),
            ..Animation::default()
        };
        for frame in [-10.0, 0.0, 5.0, 1e6] {
            assert_eq!(evaluate(&anim, frame).unwrap().translation_x, 0.0);
        }
    }

    #[test]
    fn test_boundaries_hit_keyframes() {
        for flags in [0, AnimationFlags::LINEAR] {
            let anim = Animation {
                frame_start: 10,
                frame_end: 40,
                xa: Channel::new(-3.5, 17.25),
                scale: Channel::new(0.1, 2.3),
                rotation_z: Channel::new(0.0, 2.5),
                color_start: 0x8000_40FF,
                color_end: 0x2080_8000,
                ..over_1000_frames(flags)
            };
            let start = evaluate(&anim, 10.0).unwrap();
            assert_eq!(start.translation_x, -3.5);
            assert_eq!(start.scale, 0.1);
            assert_eq!(start.color, 0x8000_40FF);

            let end = evaluate(&anim, 40.0).unwrap();
            assert_eq!(end.translation_x, 17.25);
            assert_eq!(end.scale, 2.3);
            assert_eq!(end.rotation[2], 2.5);
            assert_eq!(end.color, 0x2080_8000);

            // Clamped outside the range
            assert_eq!(evaluate(&anim, -100.0).unwrap(), start);
            assert_eq!(evaluate(&anim, 400.0).unwrap(), end);
        }
    }

    #[test]
    fn test_curve_applies_to_all_channels() {
        let anim = Animation {
            scale: Channel::new(0.0, 8.0),
            color_start: 0,
            color_end: 0xFF,
            ..over_1000_frames(0)
        };
        let transform = evaluate(&anim, 500.0).unwrap();
        assert_eq!(transform.scale, 1.0);
        assert_eq!(transform.color_lanes(), [32, 0, 0, 0]);
    }

    #[test]
    fn test_color_lanes_interpolate_independently() {
        let anim = Animation {
            color_start: 0x0000_FF00,
            color_end: 0xFF00_0000,
            ..over_1000_frames(AnimationFlags::LINEAR)
        };
        assert_eq!(evaluate(&anim, 500.0).unwrap().color, 0x8000_8000);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut anim = over_1000_frames(0);
        anim.xa = Channel::new(12.5, -800.0);
        anim.ya = Channel::new(1.0, 2.0);
        let first = evaluate(&anim, 333.3).unwrap();
        let second = evaluate(&anim, 333.3).unwrap();
        assert_eq!(first.translation_x.to_bits(), second.translation_x.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_extreme_values_stay_finite() {
        let anim = Animation {
            xa: Channel::new(-f32::MAX, f32::MAX),
            ..over_1000_frames(AnimationFlags::LINEAR)
        };
        assert!(evaluate(&anim, 250.0).unwrap().translation_x.is_finite());
    }

    #[test]
    fn test_summed_translation_saturates() {
        let anim = Animation {
            frame_end: 10,
            xa: Channel::constant(f32::MAX),
            xb: Channel::constant(f32::MAX),
            ya: Channel::constant(-f32::MAX),
            yb: Channel::new(-f32::MAX, 0.0),
            ..Animation::default()
        };
        let transform = evaluate(&anim, 5.0).unwrap();
        assert_eq!(transform.translation_x, f32::MAX);
        assert_eq!(transform.translation_y, -f32::MAX);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let inverted = Animation {
            frame_start: 10,
            frame_end: 5,
            ..Animation::default()
        };
        assert!(matches!(evaluate(&inverted, 0.0), Err(Error::InvalidRange { .. })));

        let anim = over_1000_frames(0);
        assert!(matches!(evaluate(&anim, f32::NAN), Err(Error::InvalidRange { .. })));
        assert!(matches!(evaluate(&anim, f32::INFINITY), Err(Error::InvalidRange { .. })));

        let bad_key = Animation {
            scale_y: Channel::new(1.0, f32::NAN),
            ..over_1000_frames(0)
        };
        assert!(matches!(evaluate(&bad_key, 0.0), Err(Error::InvalidRange { .. })));
    }
}
