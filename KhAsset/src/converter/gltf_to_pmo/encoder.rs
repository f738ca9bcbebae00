//! Mesh → PMO model encoder.
//!
//! Negotiates per-chunk precision, packs the vertex format word, computes
//! the serialized vertex size and expands indexed geometry into one record
//! per index. Precision selection is always computed, but under the default
//! [`PrecisionPolicy::FixedFloat32`] its result is replaced by 32-bit floats
//! before it reaches the flag word.

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;

use super::precision::{select_position_format, select_texture_coordinate_format};
use super::texture_codec::TextureCodec;
use super::types::{MeshChunk, MeshGroup, MeshVertex, PmoPhase, PmoProgress, PmoProgressCallback};
use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::formats::pmo::{
    CoordinateFormat, EncodedChunk, MeshSection, NO_TEXTURE, PmoHeader, PmoModel, TextureInfo,
    VertexFlags, VertexRecord,
};

/// Largest vertex/index count a 16-bit count field can hold.
pub const MAX_COUNT: usize = u16::MAX as usize;
/// Largest texture count the 8-bit header field can hold.
pub const MAX_TEXTURES: usize = u8::MAX as usize;

/// Per-channel scale applied to expanded colors.
const COLOR_SCALE: f32 = 256.0;
/// Alpha written into every expanded color.
const EXPANDED_ALPHA: f32 = 128.0;

/// Encodes [`MeshGroup`]s into [`PmoModel`]s.
#[derive(Debug, Clone, Default)]
pub struct ModelEncoder {
    config: EncoderConfig,
}

impl ModelEncoder {
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode a whole model: textures, chunks and header.
    ///
    /// # Errors
    /// Returns the first chunk or texture error; nothing is partially emitted.
    pub fn encode(&self, group: &MeshGroup, codec: &dyn TextureCodec) -> Result<PmoModel> {
        self.encode_with_progress(group, codec, &|_| {})
    }

    /// Encode a whole model, reporting the texture and mesh phases.
    ///
    /// # Errors
    /// Returns the first chunk or texture error; nothing is partially emitted.
    pub fn encode_with_progress(
        &self,
        group: &MeshGroup,
        codec: &dyn TextureCodec,
        progress: PmoProgressCallback,
    ) -> Result<PmoModel> {
        if group.textures.len() > MAX_TEXTURES {
            return Err(Error::CapacityExceeded {
                what: "texture",
                count: group.textures.len(),
                max: MAX_TEXTURES,
            });
        }

        progress(&PmoProgress::pipeline(PmoPhase::EncodingTextures).with_detail(
            format!("{} textures", group.textures.len()),
        ));
        let textures = group
            .textures
            .iter()
            .map(|texture| {
                let encoded = codec.encode(texture)?;
                Ok(TextureInfo {
                    name: encoded.name,
                    data: encoded.data,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        progress(&PmoProgress::pipeline(PmoPhase::EncodingMeshes).with_detail(
            format!("{} chunks", group.chunks.len()),
        ));
        let chunks = self.encode_chunks(&group.chunks, group.textures.len())?;

        let mut model = PmoModel {
            header: PmoHeader::new(0, 0),
            textures,
            chunks,
            // Skeletal export is not supported
            bones: Vec::new(),
        };
        let expanded = model.expanded_vertex_count();
        let vertex_count = u16::try_from(expanded).map_err(|_| Error::CapacityExceeded {
            what: "model vertex",
            count: expanded,
            max: MAX_COUNT,
        })?;
        model.header = PmoHeader::new(model.textures.len() as u8, vertex_count);

        tracing::info!(
            "Encoded PMO: {} chunks, {} vertices, {} triangles, {} textures",
            model.chunks.len(),
            model.header.vertex_count,
            model.header.triangle_count,
            model.header.texture_count
        );
        Ok(model)
    }

    fn encode_chunks(&self, chunks: &[MeshChunk], texture_count: usize) -> Result<Vec<EncodedChunk>> {
        let encode = |(i, chunk): (usize, &MeshChunk)| {
            let texture_id = resolve_texture_id(chunk, texture_count)?;
            self.encode_chunk(chunk, texture_id)
                .inspect_err(|e| tracing::debug!("Chunk {} ('{}') rejected: {}", i, chunk.name, e))
        };

        if self.config.parallel {
            chunks.par_iter().enumerate().map(encode).collect()
        } else {
            chunks.iter().enumerate().map(encode).collect()
        }
    }

    /// Encode one chunk.
    ///
    /// # Errors
    /// `MalformedInput` for an empty chunk or an out-of-range index,
    /// `CapacityExceeded` when a count does not fit 16 bits.
    pub fn encode_chunk(&self, chunk: &MeshChunk, texture_id: u8) -> Result<EncodedChunk> {
        let Some(first) = chunk.vertices.first() else {
            return Err(Error::malformed(format!("chunk '{}' has no vertices", chunk.name)));
        };
        check_count("chunk vertex", chunk.vertices.len())?;
        check_count("chunk index", chunk.indices.len())?;
        if let Some(&bad) = chunk
            .indices
            .iter()
            .find(|&&i| i as usize >= chunk.vertices.len())
        {
            return Err(Error::malformed(format!(
                "chunk '{}' index {} out of range ({} vertices)",
                chunk.name,
                bad,
                chunk.vertices.len()
            )));
        }

        let uniform = uses_uniform_color(&chunk.vertices);

        let divisor = self.config.position_divisor;
        let vertices: Vec<VertexRecord> = chunk
            .indices
            .iter()
            .map(|&i| expand_vertex(&chunk.vertices[i as usize], divisor))
            .collect();

        let uvs: Vec<[f32; 2]> = chunk.vertices.iter().map(|v| v.texture_coordinate).collect();
        let positions: Vec<[f32; 3]> = chunk.vertices.iter().map(|v| v.position).collect();
        let texture_format = widen_until_representable(
            self.config.precision.resolve(select_texture_coordinate_format(&uvs)),
            |format| {
                vertices.iter().all(|record| {
                    record
                        .texture_coordinate
                        .to_array()
                        .iter()
                        .all(|&v| format.quantize_unsigned(v).is_some())
                })
            },
        );
        let position_format = widen_until_representable(
            self.config.precision.resolve(select_position_format(&positions)),
            |format| {
                vertices.iter().all(|record| {
                    record
                        .position
                        .to_array()
                        .iter()
                        .all(|&v| format.quantize_signed(v).is_some())
                })
            },
        );

        let vertex_flags = VertexFlags::pack(uniform, texture_format, position_format);
        let vertex_size = vertex_size(texture_format, uniform, position_format);

        tracing::debug!(
            "Chunk '{}': {} vertices, {} records, flags {:#010x}, vertex size {}",
            chunk.name,
            chunk.vertices.len(),
            chunk.indices.len(),
            vertex_flags.raw(),
            vertex_size
        );

        Ok(EncodedChunk {
            section: MeshSection {
                vertex_count: chunk.vertices.len() as u16,
                texture_id,
                vertex_size,
                vertex_flags,
                group: 0,
                triangle_strip_count: 0,
                attribute: 0,
            },
            uniform_color: uniform.then(|| pack_uniform_color(first.color)),
            vertices,
        })
    }
}

/// Widen a fixed-point tier until every expanded component quantizes in
/// range. Float and absent channels are returned as they are.
fn widen_until_representable(
    selected: CoordinateFormat,
    fits: impl Fn(CoordinateFormat) -> bool,
) -> CoordinateFormat {
    let mut format = selected;
    while matches!(
        format,
        CoordinateFormat::Normalized8 | CoordinateFormat::Normalized16
    ) && !fits(format)
    {
        format = format.wider();
    }
    if format != selected {
        tracing::debug!("Widened {:?} to {:?} to keep expanded values in range", selected, format);
    }
    format
}

fn check_count(what: &'static str, count: usize) -> Result<()> {
    if count > MAX_COUNT {
        return Err(Error::CapacityExceeded {
            what,
            count,
            max: MAX_COUNT,
        });
    }
    Ok(())
}

fn resolve_texture_id(chunk: &MeshChunk, texture_count: usize) -> Result<u8> {
    match chunk.texture {
        None => Ok(NO_TEXTURE),
        Some(slot) if slot < texture_count => Ok(slot as u8),
        Some(slot) => Err(Error::malformed(format!(
            "chunk '{}' references texture {} of {}",
            chunk.name, slot, texture_count
        ))),
    }
}

/// True when every vertex carries exactly the first vertex's RGBA.
#[must_use]
pub fn uses_uniform_color(vertices: &[MeshVertex]) -> bool {
    vertices
        .first()
        .is_some_and(|first| vertices.iter().all(|v| v.color == first.color))
}

/// Pack a 0-1 RGBA color into `0xRRGGBBAA`, each channel `min(255, c * 256)`.
#[must_use]
pub fn pack_uniform_color(color: [f32; 4]) -> u32 {
    let channel = |c: f32| (c * COLOR_SCALE).clamp(0.0, 255.0) as u32;
    let [r, g, b, a] = color;
    (channel(r) << 24) | (channel(g) << 16) | (channel(b) << 8) | channel(a)
}

/// Serialized vertex size: weights (none), texture coordinates, padding,
/// color, position, padding. Always a multiple of 4.
#[must_use]
pub fn vertex_size(
    texture_format: CoordinateFormat,
    uniform_color: bool,
    position_format: CoordinateFormat,
) -> u8 {
    let mut size = 0u32;
    size += 2 * texture_format.component_size();
    size = align4(size);
    if !uniform_color {
        size += 4;
    }
    size += 3 * position_format.component_size();
    align4(size) as u8
}

const fn align4(size: u32) -> u32 {
    (size + 3) & !3
}

fn expand_vertex(vertex: &MeshVertex, divisor: f32) -> VertexRecord {
    let [r, g, b, _] = vertex.color;
    VertexRecord {
        position: Vec3::from(vertex.position) / divisor,
        texture_coordinate: Vec2::from(vertex.texture_coordinate),
        color: Vec4::new(r * COLOR_SCALE, g * COLOR_SCALE, b * COLOR_SCALE, EXPANDED_ALPHA),
    }
}
