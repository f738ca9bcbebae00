//! SPDX-FileCopyrightText: 2025 KhAsset contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Format conversion utilities
//!
//! - glTF 2.0 → PMO (with TIM2 textures) - 3D model conversion

pub mod gltf_to_pmo;

pub use gltf_to_pmo::{
    convert_gltf_to_pmo, convert_gltf_to_pmo_with_progress,
    convert_gltf_bytes_to_pmo, convert_gltf_bytes_to_pmo_with_progress,
};
