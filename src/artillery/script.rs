//! Artillery scenario script model.
//!
//! Mirrors the JSON layout `artillery run` expects:
//!
//! ```json
//! {
//!   "config": {
//!     "target": "http://localhost:3000",
//!     "phases": [{ "arrivalCount": 120, "duration": 80 }],
//!     "engines": { "socketio": {} },
//!     "payload": { "path": "payload.json", "fields": ["x", "y", "color", "user_id"] }
//!   },
//!   "scenarios": [
//!     { "engine": "socketio", "flow": [{ "emit": { "channel": "draw_pixel_simul", "data": { ... } } }] }
//!   ]
//! }
//! ```
//!
//! Struct field order is the key order of the serialized output, so the
//! generated configs diff cleanly against hand-written ones.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ScenarioError, ScenarioResult};
use crate::models::Pixel;

/// Socket.io channel the canvas service listens on for simulated draws.
pub const EMIT_CHANNEL: &str = "draw_pixel_simul";

/// Engine name Artillery resolves to the socketio plugin.
pub const ENGINE_SOCKETIO: &str = "socketio";

/// Payload columns, in the order templated emits reference them.
pub const PAYLOAD_FIELDS: [&str; 4] = ["x", "y", "color", "user_id"];

// =============================================================================
// Script Root
// =============================================================================

/// A complete Artillery script: one `config` block plus its scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtilleryScript {
    pub config: ScriptConfig,
    pub scenarios: Vec<Scenario>,
}

impl ArtilleryScript {
    /// Create a script from a config and its scenarios.
    pub fn new(config: ScriptConfig, scenarios: Vec<Scenario>) -> Self {
        Self { config, scenarios }
    }

    /// Serialize to pretty JSON (2-space indent, what `artillery run` reads).
    pub fn to_json(&self) -> ScenarioResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a script back from JSON text.
    pub fn from_json(json: &str) -> ScenarioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the script to disk as pretty JSON.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> ScenarioResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| ScenarioError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// =============================================================================
// Config Block
// =============================================================================

/// The `config` block: target URL, load phases, engine settings and an
/// optional script-wide payload file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub target: String,
    pub phases: Vec<Phase>,
    pub engines: Engines,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadRef>,
}

impl ScriptConfig {
    /// Config with a single phase and default socketio engine settings.
    pub fn new(target: impl Into<String>, phase: Phase) -> Self {
        Self {
            target: target.into(),
            phases: vec![phase],
            engines: Engines::default(),
            payload: None,
        }
    }

    /// Replace the socketio engine settings.
    pub fn with_engine(mut self, socketio: SocketIoEngine) -> Self {
        self.engines = Engines { socketio };
        self
    }

    /// Attach a script-wide payload file shared by all scenarios.
    pub fn with_payload(mut self, payload: PayloadRef) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A load phase, either rate-based (`arrivalRate` users per second) or
/// count-based (`arrivalCount` users spread over the duration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Phase {
    #[serde(rename_all = "camelCase")]
    Rate { arrival_rate: u64, duration: u64 },
    #[serde(rename_all = "camelCase")]
    Count { arrival_count: u64, duration: u64 },
}

impl Phase {
    /// Rate-based phase: `arrival_rate` virtual users/second for `duration` seconds.
    pub fn rate(arrival_rate: u64, duration: u64) -> Self {
        Phase::Rate {
            arrival_rate,
            duration,
        }
    }

    /// Count-based phase: exactly `arrival_count` virtual users over `duration` seconds.
    pub fn count(arrival_count: u64, duration: u64) -> Self {
        Phase::Count {
            arrival_count,
            duration,
        }
    }

    /// How many virtual users this phase starts in total.
    pub fn planned_arrivals(&self) -> u64 {
        match self {
            Phase::Rate {
                arrival_rate,
                duration,
            } => arrival_rate * duration,
            Phase::Count { arrival_count, .. } => *arrival_count,
        }
    }
}

/// Engine table; only socketio is ever configured here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engines {
    pub socketio: SocketIoEngine,
}

/// Socketio engine settings. All fields optional; the default serializes
/// as `{}` which lets the plugin pick its own transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocketIoEngine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<bool>,
}

impl SocketIoEngine {
    /// Websocket-only transport, no polling upgrade, 30s handshake timeout.
    pub fn websocket_only() -> Self {
        Self {
            timeout: Some(30_000),
            transports: Some(vec!["websocket".to_string()]),
            upgrade: Some(false),
        }
    }
}

/// Reference to an external payload file and the columns to bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRef {
    pub path: String,
    pub fields: Vec<String>,
}

impl PayloadRef {
    /// Payload reference binding the standard pixel columns.
    pub fn pixel_fields(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: PAYLOAD_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

/// One scenario: an optional name/weight, the engine, an optional
/// per-scenario payload and the flow a virtual user walks through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,
    pub engine: String,
    pub flow: Vec<FlowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadRef>,
}

impl Scenario {
    /// Scenario for one concrete pixel: think for `think` seconds, then
    /// emit the pixel with literal values baked in.
    pub fn per_pixel(pixel: &Pixel, think: f64, canvas_id: u32) -> Self {
        Self {
            name: None,
            weight: None,
            engine: ENGINE_SOCKETIO.to_string(),
            flow: vec![
                FlowStep::Think { think },
                FlowStep::Emit {
                    emit: Emit::pixel(canvas_id, pixel),
                },
            ],
            payload: None,
        }
    }

    /// Scenario that emits one payload row through `{{ field }}` templates.
    pub fn templated(canvas_id: u32) -> Self {
        Self {
            name: None,
            weight: None,
            engine: ENGINE_SOCKETIO.to_string(),
            flow: vec![FlowStep::Emit {
                emit: Emit::templated(canvas_id),
            }],
            payload: None,
        }
    }

    /// Set the scenario name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the scenario weight.
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Attach a per-scenario payload file.
    pub fn with_payload(mut self, payload: PayloadRef) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// One step of a scenario flow: pause or emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowStep {
    Think { think: f64 },
    Emit { emit: Emit },
}

/// A socketio emit: channel name plus the draw event data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emit {
    pub channel: String,
    pub data: EmitData,
}

impl Emit {
    /// Emit carrying one pixel's concrete values.
    pub fn pixel(canvas_id: u32, pixel: &Pixel) -> Self {
        Self {
            channel: EMIT_CHANNEL.to_string(),
            data: EmitData::literal(canvas_id, pixel),
        }
    }

    /// Emit whose values come from payload template variables.
    pub fn templated(canvas_id: u32) -> Self {
        Self {
            channel: EMIT_CHANNEL.to_string(),
            data: EmitData::templated(canvas_id),
        }
    }
}

/// Data object of a draw event.
///
/// The canvas service reads `canvas_id` as a string; the pixel fields are
/// either literal numbers/strings or `{{ field }}` template strings that
/// Artillery substitutes from the payload file at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitData {
    pub canvas_id: String,
    pub x: Value,
    pub y: Value,
    pub color: Value,
    pub user_id: Value,
}

impl EmitData {
    /// Event data with the pixel's values baked in.
    pub fn literal(canvas_id: u32, pixel: &Pixel) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
            x: json!(pixel.x),
            y: json!(pixel.y),
            color: json!(pixel.color),
            user_id: json!(pixel.user_id),
        }
    }

    /// Event data referencing payload columns by template.
    pub fn templated(canvas_id: u32) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
            x: json!("{{ x }}"),
            y: json!("{{ y }}"),
            color: json!("{{ color }}"),
            user_id: json!("{{ user_id }}"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
