//! # Pixelload - Artillery scenario generation for pixel canvas load tests
//!
//! Pixelload turns CSV pixel exports into the payload files and Artillery
//! configs that drive socketio load tests against a collaborative canvas
//! service.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │  Pixel CSV  │────▶│   Parser    │────▶│  Transform   │────▶│  Artillery JSON  │
//! │ (x,y,color) │     │ (user ids)  │     │ (mirror/sort)│     │ (config+payload) │
//! └─────────────┘     └─────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixelload::{burst, BurstOptions};
//! use std::path::PathBuf;
//!
//! fn main() {
//!     let summary = burst(&[PathBuf::from("pixels.csv")], &BurstOptions::default()).unwrap();
//!     for cmd in &summary.run_commands {
//!         println!("{}", cmd);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Pixel, Batch)
//! - [`parser`] - Pixel CSV parsing
//! - [`transform`] - Batch transforms and the generator pipelines
//! - [`artillery`] - Script model and payload files
//! - [`validation`] - Script schema validation

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Artillery outputs
pub mod artillery;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, ScenarioError, TransformError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{looks_like_color, Batch, Pixel};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{parse_pixels, read_batch};

// =============================================================================
// Re-exports - Transforms
// =============================================================================

pub use transform::ops::{BatchTransform, DEFAULT_MIRROR_BOUND};

// =============================================================================
// Re-exports - Artillery output
// =============================================================================

pub use artillery::{
    count_records, write_payload, ArtilleryScript, Emit, EmitData, Engines, FlowStep, PayloadRef,
    Phase, Scenario, ScriptConfig, SocketIoEngine, EMIT_CHANNEL, ENGINE_SOCKETIO, PAYLOAD_FIELDS,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    check_event_budget, is_valid, is_valid_script, validate, validate_script,
    validate_script_value,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    battle, burst, wave, BatchReport, BattleOptions, BurstOptions, GeneratedFile, OutputKind,
    RunSummary, WaveOptions, BATTLE_CONFIG_FILE, BURST_CONFIG_FILE, BURST_PAYLOAD_FILE,
    DEFAULT_ARRIVAL_RATE, DEFAULT_BATTLE_WEIGHT, DEFAULT_CANVAS_ID, DEFAULT_DURATION_PAD,
    DEFAULT_PHASE_DURATION, DEFAULT_TARGET_URL, DEFAULT_THINK_STEP,
};

// Pipeline
pub mod pipeline {
    pub use crate::transform::pipeline::*;
}
