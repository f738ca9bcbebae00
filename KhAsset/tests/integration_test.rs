use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use khasset::converter::{convert_gltf_bytes_to_pmo, convert_gltf_to_pmo};
use khasset::formats::pmo::{HEADER_SIZE, MAGIC, NO_TEXTURE, TEXTURE_ENTRY_SIZE};
use khasset::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn png_data_uri() -> String {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]));
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, image::ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(png.into_inner()))
}

/// One triangle under a translated node, optionally textured.
fn triangle_gltf(textured: bool) -> Vec<u8> {
    let mut buffer = f32_bytes(&[0.0, 0.0, 0.0, 10000.0, 0.0, 0.0, 0.0, 10000.0, 0.0]);
    buffer.extend(f32_bytes(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.25]));
    buffer.extend([0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()));
    let byte_length = buffer.len();
    let uri = format!("data:application/octet-stream;base64,{}", STANDARD.encode(&buffer));

    let material = if textured {
        format!(
            r#""materials": [{{ "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }}],
               "textures": [{{ "source": 0 }}],
               "images": [{{ "name": "crate_diffuse_texture", "uri": "{}" }}],"#,
            png_data_uri()
        )
    } else {
        String::new()
    };
    let material_ref = if textured { r#", "material": 0"# } else { "" };

    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [10000.0, 0.0, 0.0] }}],
  "meshes": [{{ "name": "Crate", "primitives": [{{
    "attributes": {{ "POSITION": 0, "TEXCOORD_0": 1 }},
    "indices": 2{material_ref}
  }}] }}],
  {material}
  "buffers": [{{ "byteLength": {byte_length}, "uri": "{uri}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 24 }},
    {{ "buffer": 0, "byteOffset": 60, "byteLength": 6 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [10000.0, 10000.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" }},
    {{ "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#
    )
    .into_bytes()
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}

#[test]
fn test_gltf_import_bakes_transforms() {
    let source = GltfMeshSource::from_bytes(&triangle_gltf(false)).unwrap();
    let group = source.load_mesh_group().unwrap();

    assert_eq!(group.chunks.len(), 1);
    assert!(group.textures.is_empty());
    let chunk = &group.chunks[0];
    assert_eq!(chunk.name, "Crate");
    assert_eq!(chunk.indices, vec![0, 1, 2]);
    assert_eq!(chunk.texture, None);
    assert_eq!(chunk.vertices[1].position, [20000.0, 0.0, 0.0]);
    // v is flipped, missing colors default to white
    assert_eq!(chunk.vertices[2].texture_coordinate, [0.0, 0.75]);
    assert_eq!(chunk.vertices[0].color, [1.0; 4]);

    let unflipped = GltfMeshSource::from_bytes(&triangle_gltf(false))
        .unwrap()
        .with_flip_texture_v(false)
        .load_mesh_group()
        .unwrap();
    assert_eq!(unflipped.chunks[0].vertices[2].texture_coordinate, [0.0, 0.25]);
}

#[test]
fn test_untextured_conversion() {
    let data = convert_gltf_bytes_to_pmo(&triangle_gltf(false)).unwrap();

    assert_eq!(u32_at(&data, 0), MAGIC);
    assert_eq!(data[6], 3); // version
    assert_eq!(data[8], 0); // texture count
    assert_eq!(u32_at(&data, 16), HEADER_SIZE);
    assert_eq!(u16_at(&data, 20), 1); // triangles
    assert_eq!(u16_at(&data, 22), 3); // vertices

    // First chunk: record count, no texture, uniform white
    let chunk = HEADER_SIZE as usize;
    assert_eq!(u16_at(&data, chunk), 3);
    assert_eq!(data[chunk + 2], NO_TEXTURE);
    assert_eq!(data[chunk + 3], 20);
    let flags = VertexFlags::from_raw(u32_at(&data, chunk + 4));
    assert!(flags.has_uniform_color());
    assert_eq!(flags.position_format(), CoordinateFormat::Float32);
}

#[test]
fn test_textured_conversion_to_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("crate.gltf");
    let output = dir.path().join("crate.pmo");
    std::fs::write(&input, triangle_gltf(true)).unwrap();

    convert_gltf_to_pmo(&input, &output).unwrap();
    let data = std::fs::read(&output).unwrap();

    assert_eq!(data[8], 1);
    assert_eq!(u32_at(&data, 16), HEADER_SIZE + TEXTURE_ENTRY_SIZE);

    // Texture entry: payload offset, then the truncated name
    let entry = HEADER_SIZE as usize;
    let offset = u32_at(&data, entry) as usize;
    assert_eq!(&data[entry + 4..entry + 16], b"crate_diffus");
    assert_eq!(offset % 16, 0);
    assert_eq!(&data[offset..offset + 4], b"TIM2");
    assert_eq!(&data[offset + 0x40..offset + 0x44], &[200, 100, 50, 128]);

    let chunk = (HEADER_SIZE + TEXTURE_ENTRY_SIZE) as usize;
    assert_eq!(data[chunk + 2], 0);
}

#[test]
fn test_adaptive_precision_narrows_flags() {
    let config = EncoderConfig {
        precision: PrecisionPolicy::Adaptive,
        ..EncoderConfig::default()
    };
    let source = GltfMeshSource::from_bytes(&triangle_gltf(false)).unwrap();
    let model = khasset::converter::gltf_to_pmo::encode_source(&source, &config, &|_| {}).unwrap();
    let flags = model.chunks[0].section.vertex_flags;

    assert_eq!(flags.texture_format(), CoordinateFormat::Normalized8);
    // 20000 / 100 * 128 exceeds both fixed-point tiers
    assert_eq!(flags.position_format(), CoordinateFormat::Float32);
}

#[test]
fn test_batch_convert_mirrors_layout() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("props")).unwrap();
    std::fs::write(src.path().join("props/crate.gltf"), triangle_gltf(false)).unwrap();
    std::fs::write(src.path().join("broken.glb"), b"glTF").unwrap();

    let config = EncoderConfig::default();
    let result = batch_convert(src.path(), dest.path(), &config, |_| {});

    assert_eq!(result.success_count, 1);
    assert_eq!(result.fail_count, 1);
    assert!(dest.path().join("props/crate.pmo").is_file());
}

#[test]
fn test_animation_file_scenarios() {
    let json = r#"[
        { "frame_end": 1000, "xa": { "start": 0, "end": 1000 } },
        { "flags": 1, "frame_end": 1000, "xa": { "start": 0, "end": 1000 } },
        { "frame_end": 1000, "xa": { "start": 200, "end": 500 }, "xb": { "start": 150, "end": 400 } },
        { "flags": 16384, "frame_end": 1000, "xb": { "start": 0, "end": 1000 } }
    ]"#;
    let animations = khasset::animation::load_animations(json).unwrap();
    let at = |i: usize, frame: f32| evaluate(&animations[i], frame).unwrap().translation_x.round();

    assert_eq!(at(0, 500.0), 125.0);
    assert_eq!(at(0, 750.0), 422.0);
    assert_eq!(at(1, 500.0), 500.0);
    assert_eq!(at(2, 500.0), 419.0);
    assert_eq!(at(3, 500.0), 0.0);

    let transform = evaluate(&animations[0], 500.0).unwrap();
    assert_eq!(transform.color, khasset::animation::NEUTRAL_COLOR);
    assert_eq!(transform.scale, 1.0);
}
