//! File format writers for KH PSP/PS2 formats

pub mod pmo;
pub mod tm2;

pub use pmo::{PmoHeader, PmoModel, PmoWriter};
