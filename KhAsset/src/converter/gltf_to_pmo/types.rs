//! SPDX-FileCopyrightText: 2025 KhAsset contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Types for glTF → PMO conversion
//!
//! Mesh import results and progress tracking.

// ============================================================================
// Mesh Import Types
// ============================================================================

/// A source vertex as handed over by a [`MeshSource`](super::MeshSource).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub texture_coordinate: [f32; 2],
    /// RGBA in the 0.0 - 1.0 range.
    pub color: [f32; 4],
}

/// A group of vertices sharing one texture and one vertex format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshChunk {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
    /// Slot in [`MeshGroup::textures`], if the chunk is textured.
    pub texture: Option<usize>,
}

/// Decoded texture image referenced by chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels.
    pub rgba: Vec<u8>,
}

/// Everything a scene import produces for the encoder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGroup {
    pub chunks: Vec<MeshChunk>,
    pub textures: Vec<SourceTexture>,
}

// ============================================================================
// Progress
// ============================================================================

/// Receives a [`PmoProgress`] at every phase boundary.
pub type PmoProgressCallback<'a> = &'a (dyn Fn(&PmoProgress) + Sync + Send);

/// Number of phases a single-file conversion walks through.
pub const PIPELINE_STEPS: usize = 5;

/// Snapshot handed to a [`PmoProgressCallback`].
///
/// A single conversion counts pipeline phases; a batch counts files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmoProgress {
    pub phase: PmoPhase,
    pub step: usize,
    pub steps: usize,
    /// File name or short summary of the work in this step.
    pub detail: Option<String>,
}

impl PmoProgress {
    #[must_use]
    pub fn new(phase: PmoPhase, step: usize, steps: usize) -> Self {
        Self {
            phase,
            step,
            steps,
            detail: None,
        }
    }

    /// Position of `phase` within a single-file conversion.
    #[must_use]
    pub fn pipeline(phase: PmoPhase) -> Self {
        Self::new(phase, phase.step(), PIPELINE_STEPS)
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmoPhase {
    LoadingScene,
    /// TIM2 transcoding.
    EncodingTextures,
    EncodingMeshes,
    WritingFile,
    Complete,
}

impl PmoPhase {
    /// 1-based step of this phase, out of [`PIPELINE_STEPS`].
    #[must_use]
    pub const fn step(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadingScene => "Loading scene",
            Self::EncodingTextures => "Encoding textures",
            Self::EncodingMeshes => "Encoding meshes",
            Self::WritingFile => "Writing file",
            Self::Complete => "Complete",
        }
    }
}
