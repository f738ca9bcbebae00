//! Batch glTF → PMO conversion
//!
//! Finds every `.gltf`/`.glb` under a directory and converts them in
//! parallel, mirroring the source layout in the output directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::types::{PmoPhase, PmoProgress};
use crate::config::EncoderConfig;

/// Result of a batch conversion
#[derive(Debug, Clone)]
pub struct BatchConvertResult {
    /// Number of successful conversions
    pub success_count: usize,
    /// Number of failed conversions
    pub fail_count: usize,
    /// Messages for each file processed
    pub results: Vec<String>,
}

/// Find all .gltf and .glb files in a directory recursively, sorted.
pub fn find_gltf_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path().extension().is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("gltf") || ext.eq_ignore_ascii_case("glb")
                })
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Convert every glTF file under `source_dir` into `dest_dir`.
///
/// Each `a/b/model.glb` becomes `dest_dir/a/b/model.pmo`. Failures are
/// counted and reported per file; they do not stop the batch.
pub fn batch_convert<F>(
    source_dir: &Path,
    dest_dir: &Path,
    config: &EncoderConfig,
    progress: F,
) -> BatchConvertResult
where
    F: Fn(&PmoProgress) + Send + Sync,
{
    let files = find_gltf_files(source_dir);
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    tracing::info!("Converting {} glTF files from {}", total, source_dir.display());

    let results: Vec<String> = files
        .par_iter()
        .map(|path| {
            let relative_path = path.strip_prefix(source_dir).unwrap_or(path.as_path());
            let display_path = relative_path.to_string_lossy();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(
                &PmoProgress::new(PmoPhase::EncodingMeshes, current, total)
                    .with_detail(display_path.to_string()),
            );

            let output = dest_dir.join(relative_path).with_extension("pmo");
            if let Some(parent) = output.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    return format!("Failed to create folder for {display_path}: {e}");
                }
            }

            match super::convert_gltf_to_pmo_with_progress(path, &output, config, &|_| {}) {
                Ok(()) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Converted: {display_path}")
                }
                Err(e) => {
                    tracing::debug!("{}: {}", display_path, e);
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Failed {display_path}: {e}")
                }
            }
        })
        .collect();

    progress(&PmoProgress::new(PmoPhase::Complete, total, total));

    BatchConvertResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    }
}
