//! Sequence animation CLI commands

use std::path::Path;

use anyhow::Context;

use crate::animation::{evaluate, load_animations_from_path};

/// Evaluate one animation of a JSON list and print the transform.
pub fn eval(source: &Path, index: usize, frame: f32) -> anyhow::Result<()> {
    let animations = load_animations_from_path(source)
        .with_context(|| format!("reading {}", source.display()))?;

    let animation = animations.get(index).with_context(|| {
        format!(
            "animation {index} out of range ({} in {})",
            animations.len(),
            source.display()
        )
    })?;

    let transform = evaluate(animation, frame)?;
    println!("{}", serde_json::to_string_pretty(&transform)?);
    Ok(())
}
