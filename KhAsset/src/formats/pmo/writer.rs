//! PMO file writer.
//!
//! Layout: header, texture table, mesh chunks starting at `MeshOffset0`,
//! an 8-byte zero terminator, then the texture payloads aligned to 16 bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::{
    CoordinateFormat, EncodedChunk, PmoHeader, PmoModel, TEXTURE_ENTRY_SIZE, TEXTURE_NAME_LEN,
    VertexRecord,
};
use crate::error::{Error, Result};

const TEXTURE_ALIGNMENT: usize = 16;

/// Serializes a [`PmoModel`] into its fixed byte layout.
pub struct PmoWriter<'a> {
    model: &'a PmoModel,
}

impl<'a> PmoWriter<'a> {
    #[must_use]
    pub fn new(model: &'a PmoModel) -> Self {
        Self { model }
    }

    /// Build the PMO file and return it as bytes.
    ///
    /// # Errors
    /// Returns an error if a chunk cannot be represented in the container.
    pub fn build(&self) -> Result<Vec<u8>> {
        let model = self.model;
        let mut output = Vec::new();

        write_header(&mut output, &model.header)?;

        // Texture table, offsets patched once the payload position is known
        let table_start = output.len();
        for texture in &model.textures {
            output.write_u32::<LittleEndian>(0)?;
            output.extend_from_slice(&texture_name_bytes(&texture.name));
            for _ in 0..4 {
                output.write_u32::<LittleEndian>(0)?;
            }
        }
        debug_assert_eq!(output.len(), model.header.mesh_offset0 as usize);

        for chunk in &model.chunks {
            write_chunk(&mut output, chunk)?;
        }
        output.write_u64::<LittleEndian>(0)?;

        for (i, texture) in model.textures.iter().enumerate() {
            align(&mut output, TEXTURE_ALIGNMENT);
            let offset = u32::try_from(output.len()).map_err(|_| Error::CapacityExceeded {
                what: "file size",
                count: output.len(),
                max: u32::MAX as usize,
            })?;
            let entry = table_start + i * TEXTURE_ENTRY_SIZE as usize;
            output[entry..entry + 4].copy_from_slice(&offset.to_le_bytes());
            output.extend_from_slice(&texture.data);
        }

        tracing::debug!(
            "Built PMO: {} chunks, {} textures, {} bytes",
            model.chunks.len(),
            model.textures.len(),
            output.len()
        );
        Ok(output)
    }

    /// Write the PMO file to disk.
    ///
    /// # Errors
    /// Returns an error if building or writing fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        let data = self.build()?;
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&data)?;
        file.flush()?;
        Ok(())
    }
}

fn write_header(output: &mut Vec<u8>, header: &PmoHeader) -> Result<()> {
    output.write_u32::<LittleEndian>(header.magic)?;
    output.write_u8(header.number)?;
    output.write_u8(header.group)?;
    output.write_u8(header.version)?;
    output.write_u8(0)?;
    output.write_u8(header.texture_count)?;
    output.write_u8(0)?;
    output.write_u16::<LittleEndian>(header.flag)?;
    output.write_u32::<LittleEndian>(header.skeleton_offset)?;
    output.write_u32::<LittleEndian>(header.mesh_offset0)?;
    output.write_u16::<LittleEndian>(header.triangle_count)?;
    output.write_u16::<LittleEndian>(header.vertex_count)?;
    output.write_f32::<LittleEndian>(header.model_scale)?;
    output.write_u32::<LittleEndian>(header.mesh_offset1)?;
    for value in header.bounding_box {
        output.write_f32::<LittleEndian>(value)?;
    }
    Ok(())
}

fn write_chunk(output: &mut Vec<u8>, chunk: &EncodedChunk) -> Result<()> {
    let section = &chunk.section;
    let record_count = u16::try_from(chunk.vertices.len()).map_err(|_| Error::CapacityExceeded {
        what: "chunk record",
        count: chunk.vertices.len(),
        max: u16::MAX as usize,
    })?;

    // The serialized count is the number of records that follow, not the
    // number of source vertices.
    output.write_u16::<LittleEndian>(record_count)?;
    output.write_u8(section.texture_id)?;
    output.write_u8(section.vertex_size)?;
    output.write_u32::<LittleEndian>(section.vertex_flags.raw())?;
    output.write_u8(section.group)?;
    output.write_u8(section.triangle_strip_count)?;
    output.write_u16::<LittleEndian>(section.attribute)?;

    if let Some(color) = chunk.uniform_color {
        output.write_u32::<LittleEndian>(color)?;
    }

    let mut record = Vec::with_capacity(section.vertex_size as usize);
    for vertex in &chunk.vertices {
        record.clear();
        write_record(&mut record, vertex, chunk)?;
        if record.len() > section.vertex_size as usize {
            return Err(Error::malformed(format!(
                "vertex record of {} bytes exceeds declared size {}",
                record.len(),
                section.vertex_size
            )));
        }
        record.resize(section.vertex_size as usize, 0);
        output.extend_from_slice(&record);
    }

    align(output, 4);
    Ok(())
}

/// Serialize one vertex in GE component order: texture, color, position.
fn write_record(record: &mut Vec<u8>, vertex: &VertexRecord, chunk: &EncodedChunk) -> Result<()> {
    let flags = chunk.section.vertex_flags;

    let texture_format = flags.texture_format();
    let uv = vertex.texture_coordinate.to_array();
    match texture_format {
        CoordinateFormat::NoCoord => {}
        CoordinateFormat::Normalized8 => {
            for v in uv {
                let fixed = fixed_point(texture_format.quantize_unsigned(v), v, texture_format)?;
                record.write_u8(fixed as u8)?;
            }
        }
        CoordinateFormat::Normalized16 => {
            for v in uv {
                let fixed = fixed_point(texture_format.quantize_unsigned(v), v, texture_format)?;
                record.write_u16::<LittleEndian>(fixed as u16)?;
            }
        }
        CoordinateFormat::Float32 => {
            for v in uv {
                record.write_f32::<LittleEndian>(v)?;
            }
        }
    }
    align(record, 4);

    if !flags.has_uniform_color() {
        for channel in vertex.color.to_array() {
            record.write_u8(channel.clamp(0.0, 255.0) as u8)?;
        }
    }

    let position_format = flags.position_format();
    let position = vertex.position.to_array();
    match position_format {
        CoordinateFormat::NoCoord => {}
        CoordinateFormat::Normalized8 => {
            for v in position {
                let fixed = fixed_point(position_format.quantize_signed(v), v, position_format)?;
                record.write_i8(fixed as i8)?;
            }
        }
        CoordinateFormat::Normalized16 => {
            for v in position {
                let fixed = fixed_point(position_format.quantize_signed(v), v, position_format)?;
                record.write_i16::<LittleEndian>(fixed as i16)?;
            }
        }
        CoordinateFormat::Float32 => {
            for v in position {
                record.write_f32::<LittleEndian>(v)?;
            }
        }
    }
    Ok(())
}

fn fixed_point(fixed: Option<i32>, value: f32, format: CoordinateFormat) -> Result<i32> {
    fixed.ok_or_else(|| Error::malformed(format!("component {value} does not fit {format:?}")))
}

fn texture_name_bytes(name: &str) -> [u8; TEXTURE_NAME_LEN] {
    let mut bytes = [0u8; TEXTURE_NAME_LEN];
    let src = name.as_bytes();
    let len = src.len().min(TEXTURE_NAME_LEN);
    bytes[..len].copy_from_slice(&src[..len]);
    bytes
}

fn align(data: &mut Vec<u8>, alignment: usize) {
    let padding = (alignment - (data.len() % alignment)) % alignment;
    data.extend(std::iter::repeat_n(0u8, padding));
}
