//! SPDX-FileCopyrightText: 2025 KhAsset contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Texture transcoding for PMO texture blocks.

use super::types::SourceTexture;
use crate::error::{Error, Result};
use crate::formats::pmo::TEXTURE_NAME_LEN;
use crate::formats::tm2;

/// A texture ready for the PMO texture table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTexture {
    /// Name as it will be stored (fits the 12-byte field).
    pub name: String,
    pub data: Vec<u8>,
}

/// Transcodes decoded images into the console texture container.
pub trait TextureCodec: Send + Sync {
    /// # Errors
    /// Returns an error if the image cannot be represented.
    fn encode(&self, texture: &SourceTexture) -> Result<EncodedTexture>;
}

/// 32-bit TIM2 encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tm2Codec;

impl TextureCodec for Tm2Codec {
    fn encode(&self, texture: &SourceTexture) -> Result<EncodedTexture> {
        let data = tm2::encode_rgba32(texture.width, texture.height, &texture.rgba).map_err(|e| {
            Error::TextureEncodeFailed {
                name: texture.name.clone(),
                message: e.to_string(),
            }
        })?;
        tracing::debug!(
            "Encoded texture '{}' ({}x{}, {} bytes)",
            texture.name,
            texture.width,
            texture.height,
            data.len()
        );
        Ok(EncodedTexture {
            name: truncate_name(&texture.name),
            data,
        })
    }
}

/// Truncate to the texture name field without splitting a UTF-8 sequence.
fn truncate_name(name: &str) -> String {
    let mut end = name.len().min(TEXTURE_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}
