//! # KhAsset
//!
//! A pure-Rust asset pipeline for Kingdom Hearts PSP/PS2 formats.
//!
//! ## Supported Formats
//!
//! - **PMO** - PSP model containers, encoded from glTF 2.0 scenes
//! - **TIM2** - 32-bit textures embedded in PMO models
//! - **Sequence animations** - 2D sprite keyframes evaluated per frame
//!
//! ## Quick Start
//!
//! ### Converting a Model
//!
//! ```no_run
//! use std::path::Path;
//! use khasset::converter::convert_gltf_to_pmo;
//!
//! convert_gltf_to_pmo(Path::new("model.glb"), Path::new("model.pmo"))?;
//! # Ok::<(), khasset::Error>(())
//! ```
//!
//! ### Evaluating an Animation
//!
//! ```
//! use khasset::animation::{evaluate, Animation, Channel};
//!
//! let anim = Animation {
//!     frame_end: 1000,
//!     xa: Channel::new(0.0, 1000.0),
//!     ..Animation::default()
//! };
//! let transform = evaluate(&anim, 500.0)?;
//! assert_eq!(transform.translation_x, 125.0);
//! # Ok::<(), khasset::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `khasset` command-line binary

pub mod animation;
pub mod config;
pub mod converter;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::config::{EncoderConfig, DEFAULT_POSITION_DIVISOR};

    // Model encoding
    pub use crate::converter::gltf_to_pmo::{
        GltfMeshSource, MeshChunk, MeshGroup, MeshSource, MeshVertex, ModelEncoder,
        PrecisionPolicy, TextureCodec, Tm2Codec,
        find_gltf_files, batch_convert, BatchConvertResult,
    };
    pub use crate::formats::pmo::{PmoModel, PmoWriter, CoordinateFormat, VertexFlags};

    // Animation
    pub use crate::animation::{Animation, AnimationFlags, Channel, Transform, evaluate};

    pub use crate::converter;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
