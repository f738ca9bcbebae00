//! PMO CLI commands
//!
//! Commands for converting glTF scenes to PMO models.

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{file_bar, finished, phase_icon, step_line, BATCH};
use crate::config::EncoderConfig;
use crate::converter::gltf_to_pmo::{
    batch_convert, convert_gltf_to_pmo_with_progress, encode_source, GltfMeshSource,
    PrecisionPolicy,
};

fn load_config(config: Option<&Path>) -> anyhow::Result<EncoderConfig> {
    let config = EncoderConfig::load_or_default(config)?;
    tracing::debug!("Encoder config: {:?}", config);
    Ok(config)
}

/// Convert a glTF/GLB file to PMO.
pub fn convert(
    source: &Path,
    destination: &Path,
    config: Option<&Path>,
    adaptive: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config)?;
    if adaptive {
        config.precision = PrecisionPolicy::Adaptive;
    }

    let started = Instant::now();
    convert_gltf_to_pmo_with_progress(source, destination, &config, &|progress| {
        let Some(icon) = phase_icon(progress.phase) else {
            return;
        };
        let msg = match &progress.detail {
            Some(detail) => format!("{}: {detail}", progress.phase.label()),
            None => format!("{}...", progress.phase.label()),
        };
        // The completion step prints the done line instead
        step_line(progress.step, progress.steps - 1, icon, &msg);
    })?;

    finished(started.elapsed());
    Ok(())
}

/// Encode a glTF/GLB file without writing it and show the model layout.
pub fn inspect(source: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let scene = GltfMeshSource::open(source)?.with_flip_texture_v(config.flip_texture_v);
    let model = encode_source(&scene, &config, &|_| {})?;
    let header = &model.header;

    println!("PMO Model: {}", source.display());
    println!("==========");
    println!("Version:      {}", header.version);
    println!("Textures:     {}", header.texture_count);
    println!("Vertices:     {}", header.vertex_count);
    println!("Triangles:    {}", header.triangle_count);
    println!("Records:      {}", model.expanded_vertex_count());
    println!("Mesh offset:  {:#x}", header.mesh_offset0);
    println!();

    if !model.textures.is_empty() {
        println!("Textures:");
        for (i, texture) in model.textures.iter().enumerate() {
            println!("  [{i:2}] {:12} {:>8} bytes", texture.name, texture.data.len());
        }
        println!();
    }

    println!("Chunks ({}):", model.chunks.len());
    for (i, chunk) in model.chunks.iter().enumerate() {
        let section = &chunk.section;
        let flags = section.vertex_flags;
        let texture = if section.texture_id == crate::formats::pmo::NO_TEXTURE {
            "-".to_string()
        } else {
            section.texture_id.to_string()
        };
        println!(
            "  [{i:2}] texture {texture:>3} | flags {:#010x} | uv {:?} pos {:?} | {:>2} bytes/vertex | {} records{}",
            flags.raw(),
            flags.texture_format(),
            flags.position_format(),
            section.vertex_size,
            chunk.vertices.len(),
            chunk
                .uniform_color
                .map(|c| format!(" | color {c:#010x}"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

/// Convert every glTF/GLB file in a directory.
pub fn batch(source: &Path, destination: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let total = crate::converter::gltf_to_pmo::find_gltf_files(source).len();

    if total == 0 {
        println!("No glTF files found in: {}", source.display());
        return Ok(());
    }

    step_line(1, 1, BATCH, &format!("Converting {total} glTF files"));
    let started = Instant::now();
    let pb = file_bar(total as u64, "Converting");

    let result = batch_convert(source, destination, &config, |progress| {
        pb.set_position(progress.step as u64);
        if let Some(ref name) = progress.detail {
            pb.set_message(name.clone());
        }
    });

    pb.finish_and_clear();

    println!();
    println!("Conversion complete:");
    println!("  Success: {}", result.success_count);
    println!("  Failed: {}", result.fail_count);

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in result.results.iter().filter(|m| m.starts_with("Failed")) {
            println!("  {msg}");
        }
    }

    finished(started.elapsed());
    Ok(())
}
