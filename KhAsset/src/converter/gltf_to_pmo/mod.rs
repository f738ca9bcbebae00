//! SPDX-FileCopyrightText: 2025 KhAsset contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! glTF to PMO converter
//!
//! Imports glTF 2.0 scenes and encodes them as PMO models with embedded
//! TIM2 textures.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

mod batch;
mod encoder;
mod mesh_source;
mod precision;
mod texture_codec;
mod types;

pub use batch::{batch_convert, find_gltf_files, BatchConvertResult};
pub use encoder::{pack_uniform_color, uses_uniform_color, vertex_size, ModelEncoder};
pub use mesh_source::{GltfMeshSource, MeshSource};
pub use precision::{select_position_format, select_texture_coordinate_format, PrecisionPolicy};
pub use texture_codec::{EncodedTexture, TextureCodec, Tm2Codec};
pub use types::{
    MeshChunk, MeshGroup, MeshVertex, PIPELINE_STEPS, PmoPhase, PmoProgress, PmoProgressCallback,
    SourceTexture,
};

use std::path::Path;

use crate::config::EncoderConfig;
use crate::error::Result;
use crate::formats::pmo::{PmoModel, PmoWriter};

/// Convert a glTF/GLB file to PMO format with the default settings.
///
/// # Errors
/// Returns an error if conversion fails.
pub fn convert_gltf_to_pmo(input_path: &Path, output_path: &Path) -> Result<()> {
    convert_gltf_to_pmo_with_progress(input_path, output_path, &EncoderConfig::default(), &|_| {})
}

/// Convert a glTF/GLB file to PMO format with progress callback.
///
/// # Errors
/// Returns an error if conversion fails.
pub fn convert_gltf_to_pmo_with_progress(
    input_path: &Path,
    output_path: &Path,
    config: &EncoderConfig,
    progress: PmoProgressCallback,
) -> Result<()> {
    progress(&PmoProgress::pipeline(PmoPhase::LoadingScene).with_detail(input_path.display().to_string()));
    let source = GltfMeshSource::open(input_path)?.with_flip_texture_v(config.flip_texture_v);
    let model = encode_source(&source, config, progress)?;

    progress(&PmoProgress::pipeline(PmoPhase::WritingFile).with_detail(output_path.display().to_string()));
    PmoWriter::new(&model).write(output_path)?;

    progress(&PmoProgress::pipeline(PmoPhase::Complete));
    tracing::info!("Wrote {}", output_path.display());
    Ok(())
}

/// Convert GLB (or self-contained glTF) bytes to PMO bytes.
///
/// # Errors
/// Returns an error if conversion fails.
pub fn convert_gltf_bytes_to_pmo(gltf_data: &[u8]) -> Result<Vec<u8>> {
    convert_gltf_bytes_to_pmo_with_progress(gltf_data, &EncoderConfig::default(), &|_| {})
}

/// Convert glTF bytes to PMO bytes with progress callback.
///
/// # Errors
/// Returns an error if conversion fails.
pub fn convert_gltf_bytes_to_pmo_with_progress(
    gltf_data: &[u8],
    config: &EncoderConfig,
    progress: PmoProgressCallback,
) -> Result<Vec<u8>> {
    progress(&PmoProgress::pipeline(PmoPhase::LoadingScene));
    let source = GltfMeshSource::from_bytes(gltf_data)?.with_flip_texture_v(config.flip_texture_v);
    let model = encode_source(&source, config, progress)?;

    progress(&PmoProgress::pipeline(PmoPhase::WritingFile));
    let result = PmoWriter::new(&model).build()?;

    progress(&PmoProgress::pipeline(PmoPhase::Complete));
    Ok(result)
}

/// Load a mesh group from any source and encode it with TIM2 textures.
///
/// # Errors
/// Returns an error if the source cannot be loaded or encoded.
pub fn encode_source(
    source: &dyn MeshSource,
    config: &EncoderConfig,
    progress: PmoProgressCallback,
) -> Result<PmoModel> {
    let group = source.load_mesh_group()?;
    ModelEncoder::new(config.clone()).encode_with_progress(&group, &Tm2Codec, progress)
}
