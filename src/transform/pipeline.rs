//! Generator pipelines: pixel CSVs in, Artillery scripts out.
//!
//! Three modes cover the load shapes the canvas service gets tested with:
//!
//! | Mode   | Scenarios                        | Phase          | Payload             |
//! |--------|----------------------------------|----------------|---------------------|
//! | wave   | one per pixel, staggered thinks  | `arrivalRate`  | none, values baked  |
//! | battle | one per team, named and weighted | `arrivalCount` | one file per team   |
//! | burst  | single templated scenario        | `arrivalCount` | one merged file     |
//!
//! Each mode validates every generated config against the embedded schema
//! and checks its arrival budget before reporting success. Any failure
//! aborts the whole run; partially written files are left for inspection.
//!
//! # Example
//!
//! ```rust,ignore
//! use pixelload::pipeline::{wave, WaveOptions};
//! use std::path::PathBuf;
//!
//! let summary = wave(&[PathBuf::from("team1.csv")], &WaveOptions::default())?;
//! println!("{} pixels across {} files", summary.total_pixels(), summary.files.len());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::artillery::{
    write_payload, ArtilleryScript, PayloadRef, Phase, Scenario, ScriptConfig, SocketIoEngine,
};
use crate::error::{PipelineError, PipelineResult, ScenarioError};
use crate::models::{Batch, Pixel};
use crate::parser::read_batch;
use crate::transform::ops::{BatchTransform, DEFAULT_MIRROR_BOUND};
use crate::validation::{check_event_budget, validate_script};

// =============================================================================
// Defaults
// =============================================================================

/// Target matching the canvas service dev setup.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:3000";

/// Canvas the draw events address.
pub const DEFAULT_CANVAS_ID: u32 = 1;

/// Wave pacing: seconds between consecutive pixel draws.
pub const DEFAULT_THINK_STEP: f64 = 0.05;

/// Wave phase: virtual users started per second.
pub const DEFAULT_ARRIVAL_RATE: u64 = 30;

/// Wave phase: seconds added on top of the last think delay.
pub const DEFAULT_DURATION_PAD: u64 = 10;

/// Count-based phase length for battle and burst runs.
pub const DEFAULT_PHASE_DURATION: u64 = 80;

/// Scenario weight given to each battle team.
pub const DEFAULT_BATTLE_WEIGHT: u64 = 50;

/// Battle config filename.
pub const BATTLE_CONFIG_FILE: &str = "artillery_battle.json";

/// Burst config filename.
pub const BURST_CONFIG_FILE: &str = "artillery_config.json";

/// Burst merged payload filename.
pub const BURST_PAYLOAD_FILE: &str = "payload.json";

// =============================================================================
// Options
// =============================================================================

/// Options for [`wave`].
#[derive(Debug, Clone)]
pub struct WaveOptions {
    /// Target URL written into each config.
    pub target: String,
    /// Canvas the draws address.
    pub canvas_id: u32,
    /// Directory the generated files land in.
    pub out_dir: PathBuf,
    /// Explicit user id offsets, one per CSV. Empty picks defaults
    /// (1 for the first batch, then 10000, 20000, ...).
    pub start_ids: Vec<u64>,
    /// Seconds between consecutive draws of one batch.
    pub think_step: f64,
    /// Virtual users per second in the rate phase.
    pub arrival_rate: u64,
    /// Seconds added after the last think delay.
    pub duration_pad: u64,
}

impl Default for WaveOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_URL.to_string(),
            canvas_id: DEFAULT_CANVAS_ID,
            out_dir: PathBuf::from("."),
            start_ids: Vec::new(),
            think_step: DEFAULT_THINK_STEP,
            arrival_rate: DEFAULT_ARRIVAL_RATE,
            duration_pad: DEFAULT_DURATION_PAD,
        }
    }
}

/// Options for [`battle`].
#[derive(Debug, Clone)]
pub struct BattleOptions {
    /// Target URL written into the config.
    pub target: String,
    /// Canvas the draws address.
    pub canvas_id: u32,
    /// Directory the generated files land in.
    pub out_dir: PathBuf,
    /// Explicit user id offsets for the two teams. Empty picks 1 and 10000.
    pub start_ids: Vec<u64>,
    /// Mirror the second team to the opposite corner.
    pub mirror: bool,
    /// Highest valid coordinate used by the mirror.
    pub mirror_bound: u32,
    /// Count phase duration in seconds.
    pub duration: u64,
    /// Weight given to each team scenario.
    pub weight: u64,
    /// Config filename, joined onto `out_dir`.
    pub config_file: String,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_URL.to_string(),
            canvas_id: DEFAULT_CANVAS_ID,
            out_dir: PathBuf::from("."),
            start_ids: Vec::new(),
            mirror: true,
            mirror_bound: DEFAULT_MIRROR_BOUND,
            duration: DEFAULT_PHASE_DURATION,
            weight: DEFAULT_BATTLE_WEIGHT,
            config_file: BATTLE_CONFIG_FILE.to_string(),
        }
    }
}

/// Options for [`burst`].
#[derive(Debug, Clone)]
pub struct BurstOptions {
    /// Target URL written into the config.
    pub target: String,
    /// Canvas the draws address.
    pub canvas_id: u32,
    /// Directory the generated files land in.
    pub out_dir: PathBuf,
    /// First user id; batches are numbered contiguously from here.
    pub start_id: u64,
    /// Count phase duration in seconds.
    pub duration: u64,
    /// Merged payload filename, joined onto `out_dir` and referenced
    /// verbatim from the config.
    pub payload_file: String,
    /// Config filename, joined onto `out_dir`.
    pub config_file: String,
}

impl Default for BurstOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_URL.to_string(),
            canvas_id: DEFAULT_CANVAS_ID,
            out_dir: PathBuf::from("."),
            start_id: 1,
            duration: DEFAULT_PHASE_DURATION,
            payload_file: BURST_PAYLOAD_FILE.to_string(),
            config_file: BURST_CONFIG_FILE.to_string(),
        }
    }
}

// =============================================================================
// Run Summary
// =============================================================================

/// Role of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    ScenarioConfig,
    Payload,
}

/// One file written during a run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub kind: OutputKind,
    /// Payload record count; configs carry no records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
}

/// Per-batch line of the console summary.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub name: String,
    pub pixels: usize,
    pub start_user_id: u64,
    /// Pixels whose color cell did not look like a color.
    pub odd_colors: usize,
    /// Extra remark, e.g. that the batch was mirrored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BatchReport {
    fn from_batch(batch: &Batch) -> Self {
        Self {
            name: batch.name.clone(),
            pixels: batch.len(),
            start_user_id: batch.start_user_id,
            odd_colors: batch.odd_color_count(),
            note: None,
        }
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Everything a generator run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub batches: Vec<BatchReport>,
    pub files: Vec<GeneratedFile>,
    /// Shell commands to start the generated runs, one per config.
    pub run_commands: Vec<String>,
}

impl RunSummary {
    /// Total pixels across all batches.
    pub fn total_pixels(&self) -> usize {
        self.batches.iter().map(|b| b.pixels).sum()
    }

    /// Total odd-looking colors across all batches.
    pub fn odd_color_total(&self) -> usize {
        self.batches.iter().map(|b| b.odd_colors).sum()
    }
}

// =============================================================================
// Wave
// =============================================================================

/// Generate one rate-based config per CSV.
///
/// Each batch is sorted by x, then every pixel becomes its own scenario
/// whose think delay staggers the draws left to right. Values are baked
/// into the emits, so no payload files are written.
pub fn wave(csv_paths: &[PathBuf], options: &WaveOptions) -> PipelineResult<RunSummary> {
    let batches = load_batches(csv_paths, &options.start_ids)?;
    check_distinct_names(&batches, wave_config_name)?;
    ensure_out_dir(&options.out_dir)?;

    let mut summary = RunSummary {
        batches: Vec::new(),
        files: Vec::new(),
        run_commands: Vec::new(),
    };

    for mut batch in batches {
        BatchTransform::SortByX.apply(&mut batch)?;

        let scenarios: Vec<Scenario> = batch
            .pixels
            .iter()
            .enumerate()
            .map(|(i, pixel)| {
                Scenario::per_pixel(pixel, i as f64 * options.think_step, options.canvas_id)
            })
            .collect();

        let duration = ramp_duration(batch.len(), options.think_step, options.duration_pad);
        let script = ArtilleryScript::new(
            ScriptConfig::new(
                options.target.clone(),
                Phase::rate(options.arrival_rate, duration),
            ),
            scenarios,
        );

        validate_script(&script)?;
        check_event_budget(&script, batch.len() as u64)?;

        let config_name = wave_config_name(&batch.name);
        let config_path = options.out_dir.join(&config_name);
        script.write_to(&config_path)?;

        summary.run_commands.push(format!(
            "npx artillery run {} &",
            hint_path(&options.out_dir, &config_name)
        ));
        summary.files.push(GeneratedFile {
            path: config_path,
            kind: OutputKind::ScenarioConfig,
            records: None,
        });
        summary.batches.push(BatchReport::from_batch(&batch));
    }

    Ok(summary)
}

/// Seconds a rate phase needs: the last think delay plus a fixed pad,
/// truncated to whole seconds.
fn ramp_duration(pixels: usize, think_step: f64, pad: u64) -> u64 {
    (pixels as f64 * think_step + pad as f64) as u64
}

/// Config filename for one wave batch.
fn wave_config_name(name: &str) -> String {
    format!("artillery_{}.json", name)
}

// =============================================================================
// Battle
// =============================================================================

/// Generate a head-to-head config for two teams.
///
/// Each team gets its own payload file and a named, weighted scenario.
/// The second team is mirrored to the opposite corner unless disabled, so
/// both teams paint toward each other on the same canvas.
pub fn battle(
    team1_csv: &Path,
    team2_csv: &Path,
    options: &BattleOptions,
) -> PipelineResult<RunSummary> {
    let paths = [team1_csv.to_path_buf(), team2_csv.to_path_buf()];
    let mut batches = load_batches(&paths, &options.start_ids)?;
    check_distinct_names(&batches, team_payload_name)?;

    let transform = if options.mirror {
        BatchTransform::Mirror {
            bound: options.mirror_bound,
        }
    } else {
        BatchTransform::Identity
    };
    transform.apply(&mut batches[1])?;

    ensure_out_dir(&options.out_dir)?;

    let mut reports = Vec::new();
    let mut files = Vec::new();
    let mut scenarios = Vec::new();
    let mut total: u64 = 0;

    for (i, batch) in batches.iter().enumerate() {
        let payload_name = team_payload_name(&batch.name);
        let payload_path = options.out_dir.join(&payload_name);
        let written = write_payload(&payload_path, &batch.pixels)?;
        total += written as u64;

        scenarios.push(
            Scenario::templated(options.canvas_id)
                .with_name(team_label(batch, i, options))
                .with_weight(options.weight)
                .with_payload(PayloadRef::pixel_fields(payload_name)),
        );
        files.push(GeneratedFile {
            path: payload_path,
            kind: OutputKind::Payload,
            records: Some(written),
        });

        let report = BatchReport::from_batch(batch);
        reports.push(if i == 1 && options.mirror {
            report.with_note("mirrored")
        } else {
            report
        });
    }

    let script = ArtilleryScript::new(
        ScriptConfig::new(options.target.clone(), Phase::count(total, options.duration))
            .with_engine(SocketIoEngine::websocket_only()),
        scenarios,
    );

    validate_script(&script)?;
    check_event_budget(&script, total)?;

    let config_path = options.out_dir.join(&options.config_file);
    script.write_to(&config_path)?;
    files.push(GeneratedFile {
        path: config_path,
        kind: OutputKind::ScenarioConfig,
        records: None,
    });

    Ok(RunSummary {
        batches: reports,
        files,
        run_commands: vec![format!(
            "artillery run {}",
            hint_path(&options.out_dir, &options.config_file)
        )],
    })
}

/// Payload filename for one battle team.
fn team_payload_name(name: &str) -> String {
    format!("{}_payload.json", name)
}

/// Display name of a team scenario, tagged with its starting corner
/// when mirroring puts the teams in opposite ones.
fn team_label(batch: &Batch, index: usize, options: &BattleOptions) -> String {
    let team = title_case(&batch.name);
    if !options.mirror {
        return format!("Team {}", team);
    }
    let corner = if index == 0 { 0 } else { options.mirror_bound };
    format!("Team {} ({},{} start)", team, corner, corner)
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Burst
// =============================================================================

/// Generate one merged payload plus a single templated config.
///
/// Batches are numbered contiguously from `start_id`, concatenated into
/// one payload file and fired through a count phase sized to draw every
/// pixel exactly once.
pub fn burst(csv_paths: &[PathBuf], options: &BurstOptions) -> PipelineResult<RunSummary> {
    let mut batches = Vec::with_capacity(csv_paths.len());
    let mut next_id = options.start_id;
    for path in csv_paths {
        let batch = read_batch(path, next_id)?;
        next_id += batch.len() as u64;
        batches.push(batch);
    }

    ensure_out_dir(&options.out_dir)?;

    let all_pixels: Vec<&Pixel> = batches.iter().flat_map(|b| b.pixels.iter()).collect();
    let payload_path = options.out_dir.join(&options.payload_file);
    let written = write_payload(&payload_path, all_pixels)?;

    let script = ArtilleryScript::new(
        ScriptConfig::new(
            options.target.clone(),
            Phase::count(written as u64, options.duration),
        )
        .with_engine(SocketIoEngine::websocket_only())
        .with_payload(PayloadRef::pixel_fields(options.payload_file.clone())),
        vec![Scenario::templated(options.canvas_id)],
    );

    validate_script(&script)?;
    check_event_budget(&script, written as u64)?;

    let config_path = options.out_dir.join(&options.config_file);
    script.write_to(&config_path)?;

    Ok(RunSummary {
        batches: batches.iter().map(BatchReport::from_batch).collect(),
        files: vec![
            GeneratedFile {
                path: payload_path,
                kind: OutputKind::Payload,
                records: Some(written),
            },
            GeneratedFile {
                path: config_path,
                kind: OutputKind::ScenarioConfig,
                records: None,
            },
        ],
        run_commands: vec![format!(
            "artillery run {}",
            hint_path(&options.out_dir, &options.config_file)
        )],
    })
}

// =============================================================================
// Shared helpers
// =============================================================================

fn load_batches(csv_paths: &[PathBuf], start_ids: &[u64]) -> PipelineResult<Vec<Batch>> {
    if !start_ids.is_empty() && start_ids.len() != csv_paths.len() {
        return Err(PipelineError::StartIds {
            given: start_ids.len(),
            batches: csv_paths.len(),
        });
    }

    let mut batches = Vec::with_capacity(csv_paths.len());
    for (i, path) in csv_paths.iter().enumerate() {
        let start = start_ids
            .get(i)
            .copied()
            .unwrap_or_else(|| default_start_id(i));
        batches.push(read_batch(path, start)?);
    }
    Ok(batches)
}

/// Default user id offset for batch `i`: 1 for the first, then 10000, 20000, ...
fn default_start_id(i: usize) -> u64 {
    if i == 0 {
        1
    } else {
        i as u64 * 10_000
    }
}

/// Batch names become output filenames, so they must be distinct.
fn check_distinct_names(
    batches: &[Batch],
    file_for: impl Fn(&str) -> String,
) -> PipelineResult<()> {
    for (i, batch) in batches.iter().enumerate() {
        if batches[..i].iter().any(|prev| prev.name == batch.name) {
            return Err(PipelineError::DuplicateBatch {
                name: batch.name.clone(),
                file: file_for(&batch.name),
            });
        }
    }
    Ok(())
}

/// Spell a generated file the way a run hint should read from the
/// invoking directory.
fn hint_path(out_dir: &Path, file: &str) -> String {
    if out_dir == Path::new(".") {
        file.to_string()
    } else {
        out_dir.join(file).display().to_string()
    }
}

fn ensure_out_dir(dir: &Path) -> PipelineResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        PipelineError::Scenario(ScenarioError::Io {
            path: dir.to_path_buf(),
            source: e,
        })
    })
}

// =============================================================================
// Tests
// =============================================================================
