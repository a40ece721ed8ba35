//! Artillery output module.
//!
//! This module owns everything that lands on disk for `artillery run`:
//! - Script: the typed config/scenario model and its JSON form
//! - Payload: line-delimited payload files

pub mod payload;
pub mod script;

pub use payload::{count_records, write_payload};
pub use script::{
    ArtilleryScript, Emit, EmitData, Engines, FlowStep, PayloadRef, Phase, Scenario, ScriptConfig,
    SocketIoEngine, EMIT_CHANNEL, ENGINE_SOCKETIO, PAYLOAD_FIELDS,
};
