//! Sequence (2D sprite) animation
//!
//! Evaluates keyframed sprite animations to a [`Transform`] per frame.
//! Animations are read from JSON arrays:
//!
//! ```json
//! [{ "flags": 1, "frame_start": 0, "frame_end": 60, "xa": { "start": 0, "end": 320 } }]
//! ```

mod evaluator;
mod types;

pub use evaluator::evaluate;
pub use types::{Animation, AnimationFlags, Channel, Transform, NEUTRAL_COLOR};

use std::path::Path;

use crate::error::Result;

/// Parse a JSON array of animations.
///
/// # Errors
/// Returns an error if the text is not a valid animation list.
pub fn load_animations(json: &str) -> Result<Vec<Animation>> {
    let animations: Vec<Animation> = serde_json::from_str(json)?;
    tracing::debug!("Loaded {} animations", animations.len());
    Ok(animations)
}

/// Read and parse an animation file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_animations_from_path(path: &Path) -> Result<Vec<Animation>> {
    load_animations(&std::fs::read_to_string(path)?)
}
