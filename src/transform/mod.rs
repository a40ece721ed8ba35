//! Transformation module.
//!
//! This module turns parsed batches into Artillery outputs:
//! - Ops: batch transforms (identity, mirror, sort)
//! - Pipeline: the wave, battle and burst generators

pub mod ops;
pub mod pipeline;

pub use ops::{BatchTransform, DEFAULT_MIRROR_BOUND};
pub use pipeline::*;
