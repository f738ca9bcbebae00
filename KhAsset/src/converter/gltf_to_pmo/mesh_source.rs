//! SPDX-FileCopyrightText: 2025 KhAsset contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Scene import.
//!
//! [`GltfMeshSource`] loads glTF/GLB files into a [`MeshGroup`]: node
//! transforms are baked into positions, every triangle primitive becomes a
//! chunk and base-color textures are resolved to stable slots.

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Vec3};
use image::{DynamicImage, ImageBuffer};

use super::types::{MeshChunk, MeshGroup, MeshVertex, SourceTexture};
use crate::error::{Error, Result};

/// Supplies mesh chunks and their textures to the encoder.
pub trait MeshSource {
    /// # Errors
    /// Returns an error if the scene cannot be read.
    fn load_mesh_group(&self) -> Result<MeshGroup>;
}

impl MeshSource for MeshGroup {
    fn load_mesh_group(&self) -> Result<MeshGroup> {
        Ok(self.clone())
    }
}

/// glTF 2.0 scene (`.gltf` or `.glb`).
pub struct GltfMeshSource {
    document: gltf::Document,
    buffers: Vec<gltf::buffer::Data>,
    images: Vec<gltf::image::Data>,
    flip_texture_v: bool,
}

impl GltfMeshSource {
    /// Load a glTF or GLB file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let (document, buffers, images) = gltf::import(path).map_err(|e| Error::GltfLoadFailed {
            message: format!("{}: {e}", path.display()),
        })?;
        Ok(Self::from_parts(document, buffers, images))
    }

    /// Load from GLB bytes (or self-contained glTF JSON).
    ///
    /// # Errors
    /// Returns an error if the data cannot be parsed.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (document, buffers, images) =
            gltf::import_slice(data).map_err(|e| Error::GltfLoadFailed {
                message: e.to_string(),
            })?;
        Ok(Self::from_parts(document, buffers, images))
    }

    fn from_parts(
        document: gltf::Document,
        buffers: Vec<gltf::buffer::Data>,
        images: Vec<gltf::image::Data>,
    ) -> Self {
        Self {
            document,
            buffers,
            images,
            flip_texture_v: true,
        }
    }

    /// Whether texture coordinates are stored as `1 - v`.
    #[must_use]
    pub fn with_flip_texture_v(mut self, flip: bool) -> Self {
        self.flip_texture_v = flip;
        self
    }

    /// Resolve base-color textures. Returns the texture list and, per
    /// material index, the slot of its texture.
    fn load_textures(&self) -> (Vec<SourceTexture>, Vec<Option<usize>>) {
        let mut textures = Vec::new();
        let mut image_slots: HashMap<usize, Option<usize>> = HashMap::new();
        let mut material_slots = Vec::new();

        for material in self.document.materials() {
            let slot = material
                .pbr_metallic_roughness()
                .base_color_texture()
                .and_then(|info| {
                    let image = info.texture().source();
                    *image_slots.entry(image.index()).or_insert_with(|| {
                        match self.decode_image(&image) {
                            Ok(texture) => {
                                textures.push(texture);
                                Some(textures.len() - 1)
                            }
                            Err(e) => {
                                tracing::warn!("Skipping texture {}: {}", image.index(), e);
                                None
                            }
                        }
                    })
                });
            material_slots.push(slot);
        }

        (textures, material_slots)
    }

    fn decode_image(&self, image: &gltf::Image) -> Result<SourceTexture> {
        let data = self.images.get(image.index()).ok_or_else(|| Error::GltfLoadFailed {
            message: format!("image {} was not loaded", image.index()),
        })?;
        let rgba = to_rgba8(data)?;
        Ok(SourceTexture {
            name: image_name(image),
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    fn load_primitive(
        &self,
        primitive: &gltf::Primitive,
        world: Mat4,
        name: String,
        material_slots: &[Option<usize>],
    ) -> Result<Option<MeshChunk>> {
        // Only support triangles
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!("Skipping '{}': {:?} primitives are not supported", name, primitive.mode());
            return Ok(None);
        }

        let reader = primitive.reader(|buffer| Some(&self.buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| Error::malformed(format!("'{name}' has no position attribute")))?
            .collect();

        if positions.is_empty() {
            tracing::warn!("Skipping '{}': no vertices", name);
            return Ok(None);
        }

        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map_or_else(|| vec![[0.0, 0.0]; positions.len()], |iter| iter.into_f32().collect());

        let colors: Vec<[f32; 4]> = reader
            .read_colors(0)
            .map_or_else(|| vec![[1.0; 4]; positions.len()], |iter| iter.into_rgba_f32().collect());

        let indices: Vec<u32> = reader
            .read_indices()
            .map_or_else(|| (0..positions.len() as u32).collect(), |iter| iter.into_u32().collect());

        let vertices = positions
            .iter()
            .zip(&uvs)
            .zip(&colors)
            .map(|((&position, &uv), &color)| {
                let v = if self.flip_texture_v { 1.0 - uv[1] } else { uv[1] };
                MeshVertex {
                    position: world.transform_point3(Vec3::from(position)).to_array(),
                    texture_coordinate: [uv[0], v],
                    color,
                }
            })
            .collect();

        let texture = primitive
            .material()
            .index()
            .and_then(|i| material_slots.get(i).copied().flatten());

        Ok(Some(MeshChunk {
            name,
            vertices,
            indices,
            texture,
        }))
    }

    fn visit_node(
        &self,
        node: &gltf::Node,
        parent: Mat4,
        material_slots: &[Option<usize>],
        chunks: &mut Vec<MeshChunk>,
    ) -> Result<()> {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            let base = mesh.name().or(node.name()).unwrap_or("Mesh");
            let primitive_count = mesh.primitives().len();
            for (prim_idx, primitive) in mesh.primitives().enumerate() {
                let name = if primitive_count > 1 {
                    format!("{base}_{prim_idx}")
                } else {
                    base.to_string()
                };
                if let Some(chunk) = self.load_primitive(&primitive, world, name, material_slots)? {
                    chunks.push(chunk);
                }
            }
        }

        for child in node.children() {
            self.visit_node(&child, world, material_slots, chunks)?;
        }
        Ok(())
    }
}

impl MeshSource for GltfMeshSource {
    fn load_mesh_group(&self) -> Result<MeshGroup> {
        let (textures, material_slots) = self.load_textures();
        let mut chunks = Vec::new();

        if let Some(scene) = self.document.default_scene().or_else(|| self.document.scenes().next()) {
            for node in scene.nodes() {
                self.visit_node(&node, Mat4::IDENTITY, &material_slots, &mut chunks)?;
            }
        } else {
            // No scene graph: take meshes as authored
            for mesh in self.document.meshes() {
                let base = mesh.name().unwrap_or("Mesh");
                for (prim_idx, primitive) in mesh.primitives().enumerate() {
                    let name = format!("{base}_{prim_idx}");
                    if let Some(chunk) =
                        self.load_primitive(&primitive, Mat4::IDENTITY, name, &material_slots)?
                    {
                        chunks.push(chunk);
                    }
                }
            }
        }

        if chunks.is_empty() {
            return Err(Error::malformed("no triangle meshes found in glTF file"));
        }

        tracing::debug!("Loaded {} chunks, {} textures from glTF", chunks.len(), textures.len());
        Ok(MeshGroup { chunks, textures })
    }
}

fn image_name(image: &gltf::Image) -> String {
    if let Some(name) = image.name() {
        return name.to_string();
    }
    match image.source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => Path::new(uri)
            .file_name()
            .map_or_else(|| uri.to_string(), |n| n.to_string_lossy().into_owned()),
        _ => format!("texture{}", image.index()),
    }
}

/// Normalize any glTF pixel layout to RGBA8.
fn to_rgba8(data: &gltf::image::Data) -> Result<image::RgbaImage> {
    use gltf::image::Format;

    let (w, h) = (data.width, data.height);
    let bytes = data.pixels.clone();
    let image = match data.format {
        Format::R8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageLuma8),
        Format::R8G8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageLumaA8),
        Format::R8G8B8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageRgb8),
        Format::R8G8B8A8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageRgba8),
        Format::R16 => ImageBuffer::from_raw(w, h, words(&bytes)).map(DynamicImage::ImageLuma16),
        Format::R16G16 => ImageBuffer::from_raw(w, h, words(&bytes)).map(DynamicImage::ImageLumaA16),
        Format::R16G16B16 => ImageBuffer::from_raw(w, h, words(&bytes)).map(DynamicImage::ImageRgb16),
        Format::R16G16B16A16 => {
            ImageBuffer::from_raw(w, h, words(&bytes)).map(DynamicImage::ImageRgba16)
        }
        Format::R32G32B32FLOAT => {
            ImageBuffer::from_raw(w, h, floats(&bytes)).map(DynamicImage::ImageRgb32F)
        }
        Format::R32G32B32A32FLOAT => {
            ImageBuffer::from_raw(w, h, floats(&bytes)).map(DynamicImage::ImageRgba32F)
        }
    };
    image
        .map(|img| img.to_rgba8())
        .ok_or_else(|| Error::UnsupportedImageFormat {
            format: format!("{:?} pixel buffer does not match {w}x{h}", data.format),
        })
}

fn words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect()
}

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
