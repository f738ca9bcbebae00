//! Terminal output for the PMO commands: numbered step lines and a file
//! counter bar for batches.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::converter::gltf_to_pmo::PmoPhase;

static SCAN: Emoji<'_, '_> = Emoji("🔍 ", "");
static TEXTURE: Emoji<'_, '_> = Emoji("🖼️  ", "");
static MESH: Emoji<'_, '_> = Emoji("📐 ", "");
static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
static DONE: Emoji<'_, '_> = Emoji("✨ ", "");
pub static BATCH: Emoji<'_, '_> = Emoji("🚚 ", "");

const BAR_TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)";

/// Icon for a pipeline phase, `None` for phases that print nothing.
pub fn phase_icon(phase: PmoPhase) -> Option<Emoji<'static, 'static>> {
    match phase {
        PmoPhase::LoadingScene => Some(SCAN),
        PmoPhase::EncodingTextures => Some(TEXTURE),
        PmoPhase::EncodingMeshes => Some(MESH),
        PmoPhase::WritingFile => Some(SAVE),
        PmoPhase::Complete => None,
    }
}

/// `[2/4] 🖼️  Encoding textures: 1 textures`
pub fn step_line(step: usize, steps: usize, icon: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{step}/{steps}]")).bold().dim(),
        icon,
        msg
    );
}

pub fn finished(elapsed: Duration) {
    println!("{} Done in {}", DONE, HumanDuration(elapsed));
}

/// Bar counting converted files out of `total`.
#[must_use]
pub fn file_bar(total: u64, msg: &str) -> ProgressBar {
    let bar_style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    let pb = ProgressBar::new(total);
    pb.set_style(bar_style);
    pb.set_message(msg.to_string());
    pb
}
