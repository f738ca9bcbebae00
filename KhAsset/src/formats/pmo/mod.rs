//! PMO model container (Kingdom Hearts Birth by Sleep)
//!
//! In-memory representation of a packed PSP model: a fixed 0xA0-byte
//! header, a table of 0x20-byte texture entries, a sequence of mesh chunks
//! and the texture payloads. [`PmoWriter`] turns a [`PmoModel`] into bytes.

mod flags;
mod writer;

pub use flags::{CoordinateFormat, VertexFlags};
pub use writer::PmoWriter;

/// "PMO\0" little-endian.
pub const MAGIC: u32 = 0x004F4D50;
pub const NUMBER: u8 = 1;
pub const GROUP: u8 = 1;
pub const VERSION: u8 = 3;
/// Header flag observed on every exported model.
pub const HEADER_FLAG: u16 = 0x800;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: u32 = 0xA0;
/// Size of one texture table entry in bytes.
pub const TEXTURE_ENTRY_SIZE: u32 = 0x20;
/// Texture names are stored in a fixed 12-byte field.
pub const TEXTURE_NAME_LEN: usize = 12;
/// Bounding box placeholder length (floats).
pub const BOUNDING_BOX_LEN: usize = 32;

/// Texture id used by chunks that reference no texture.
pub const NO_TEXTURE: u8 = 0xFF;

/// Mesh data offset for a model with `texture_count` textures.
#[must_use]
pub const fn mesh_offset0(texture_count: u8) -> u32 {
    HEADER_SIZE + texture_count as u32 * TEXTURE_ENTRY_SIZE
}

/// Global model header.
#[derive(Debug, Clone, PartialEq)]
pub struct PmoHeader {
    pub magic: u32,
    pub number: u8,
    pub group: u8,
    pub version: u8,
    pub texture_count: u8,
    pub flag: u16,
    pub skeleton_offset: u32,
    pub mesh_offset0: u32,
    pub triangle_count: u16,
    pub vertex_count: u16,
    pub model_scale: f32,
    pub mesh_offset1: u32,
    pub bounding_box: [f32; BOUNDING_BOX_LEN],
}

impl PmoHeader {
    /// Header for a model with the given texture count and expanded vertex count.
    #[must_use]
    pub fn new(texture_count: u8, vertex_count: u16) -> Self {
        Self {
            magic: MAGIC,
            number: NUMBER,
            group: GROUP,
            version: VERSION,
            texture_count,
            flag: HEADER_FLAG,
            skeleton_offset: 0,
            mesh_offset0: mesh_offset0(texture_count),
            // A trailing partial triangle is dropped.
            triangle_count: vertex_count / 3,
            vertex_count,
            model_scale: 1.0,
            mesh_offset1: 0,
            bounding_box: [0.0; BOUNDING_BOX_LEN],
        }
    }
}

/// Per-chunk section descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSection {
    /// Number of source (unique) vertices in the chunk.
    pub vertex_count: u16,
    pub texture_id: u8,
    /// Byte size of one serialized vertex, always a multiple of 4.
    pub vertex_size: u8,
    pub vertex_flags: VertexFlags,
    pub group: u8,
    pub triangle_strip_count: u8,
    pub attribute: u16,
}

/// One expanded vertex record, emitted per index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRecord {
    pub position: glam::Vec3,
    pub texture_coordinate: glam::Vec2,
    /// Channels scaled to 0..=256, alpha fixed.
    pub color: glam::Vec4,
}

/// A mesh chunk ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedChunk {
    pub section: MeshSection,
    /// Packed `0xRRGGBBAA` color, present iff every vertex shares one color.
    pub uniform_color: Option<u32>,
    pub vertices: Vec<VertexRecord>,
}

/// Entry of the texture table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Name truncated to [`TEXTURE_NAME_LEN`] bytes.
    pub name: String,
    /// Encoded texture container (TIM2).
    pub data: Vec<u8>,
}

/// Skeleton bone. Skeletal export is not supported, the list is always empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneData {
    pub index: u16,
    pub parent_index: u16,
    pub name: String,
}

/// Complete in-memory model.
#[derive(Debug, Clone, PartialEq)]
pub struct PmoModel {
    pub header: PmoHeader,
    pub textures: Vec<TextureInfo>,
    pub chunks: Vec<EncodedChunk>,
    pub bones: Vec<BoneData>,
}

impl PmoModel {
    /// Total number of expanded vertex records across all chunks.
    #[must_use]
    pub fn expanded_vertex_count(&self) -> usize {
        self.chunks.iter().map(|c| c.vertices.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_offset_stride() {
        assert_eq!(mesh_offset0(0), 0xA0);
        assert_eq!(mesh_offset0(1), 0xC0);
        assert_eq!(mesh_offset0(3), 0x100);
    }

    #[test]
    fn test_header_triangle_count_drops_partial() {
        let header = PmoHeader::new(2, 7);
        assert_eq!(header.vertex_count, 7);
        assert_eq!(header.triangle_count, 2);
        assert_eq!(header.mesh_offset0, 0xE0);
        assert!(header.bounding_box.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_expanded_vertex_count_spans_chunks() {
        let section = MeshSection {
            vertex_count: 3,
            texture_id: NO_TEXTURE,
            vertex_size: 20,
            vertex_flags: VertexFlags::from_raw(0x3100_0183),
            group: 0,
            triangle_strip_count: 0,
            attribute: 0,
        };
        let record = VertexRecord {
            position: glam::Vec3::ZERO,
            texture_coordinate: glam::Vec2::ZERO,
            color: glam::Vec4::ZERO,
        };
        let chunk = |records: usize| EncodedChunk {
            section,
            uniform_color: Some(0x8080_8080),
            vertices: vec![record; records],
        };
        let model = PmoModel {
            header: PmoHeader::new(0, 9),
            textures: Vec::new(),
            chunks: vec![chunk(3), chunk(6)],
            bones: Vec::new(),
        };
        assert_eq!(model.expanded_vertex_count(), 9);
    }
}
