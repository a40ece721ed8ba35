//! Pixelload CLI - Generate Artillery load tests from pixel CSV exports
//!
//! # Main Commands
//!
//! ```bash
//! pixelload wave team1.csv team2.csv    # One staggered config per team
//! pixelload battle team1.csv team2.csv  # Two weighted scenarios, one config
//! pixelload burst team1.csv team2.csv   # One merged payload + config
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! pixelload parse pixels.csv            # Parse a CSV and print the batch JSON
//! pixelload validate artillery.json     # Validate a generated config
//! pixelload schema                      # Print the embedded script schema
//! ```

use clap::{Parser, Subcommand};
use pixelload::{
    battle, burst, check_event_budget, count_records, read_batch, validate_script_value, wave,
    ArtilleryScript, BattleOptions, BurstOptions, PayloadRef, RunSummary, WaveOptions,
    BATTLE_CONFIG_FILE, BURST_CONFIG_FILE, BURST_PAYLOAD_FILE, DEFAULT_ARRIVAL_RATE,
    DEFAULT_CANVAS_ID, DEFAULT_DURATION_PAD, DEFAULT_MIRROR_BOUND, DEFAULT_PHASE_DURATION,
    DEFAULT_TARGET_URL, DEFAULT_THINK_STEP,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pixelload")]
#[command(about = "Generate Artillery scenarios and payloads from pixel CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One rate-based config per CSV, draws staggered left to right
    Wave {
        /// Input CSV files, one batch per file
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target URL (overrides PIXELLOAD_TARGET)
        #[arg(short, long)]
        target: Option<String>,

        /// Canvas id the draws address
        #[arg(long, default_value_t = DEFAULT_CANVAS_ID)]
        canvas_id: u32,

        /// Seconds between consecutive draws of one batch
        #[arg(long, default_value_t = DEFAULT_THINK_STEP)]
        think_step: f64,

        /// Virtual users started per second
        #[arg(long, default_value_t = DEFAULT_ARRIVAL_RATE)]
        arrival_rate: u64,

        /// Seconds added on top of the last think delay
        #[arg(long, default_value_t = DEFAULT_DURATION_PAD)]
        duration_pad: u64,

        /// User id offsets, comma separated, one per CSV
        #[arg(long, value_delimiter = ',')]
        start_ids: Vec<u64>,

        /// Output directory for generated files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Head-to-head config: two teams, the second mirrored to the far corner
    Battle {
        /// Team 1 CSV
        team1: PathBuf,

        /// Team 2 CSV
        team2: PathBuf,

        /// Target URL (overrides PIXELLOAD_TARGET)
        #[arg(short, long)]
        target: Option<String>,

        /// Canvas id the draws address
        #[arg(long, default_value_t = DEFAULT_CANVAS_ID)]
        canvas_id: u32,

        /// Highest valid coordinate for the mirror
        #[arg(long, default_value_t = DEFAULT_MIRROR_BOUND)]
        bound: u32,

        /// Keep team 2 coordinates as they are
        #[arg(long)]
        no_mirror: bool,

        /// User id offsets for the two teams, comma separated
        #[arg(long, value_delimiter = ',')]
        start_ids: Vec<u64>,

        /// Phase duration in seconds
        #[arg(long, default_value_t = DEFAULT_PHASE_DURATION)]
        duration: u64,

        /// Output directory for generated files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Config filename
        #[arg(short, long, default_value = BATTLE_CONFIG_FILE)]
        output: String,
    },

    /// Single merged payload and config, one draw per virtual user
    Burst {
        /// Input CSV files, numbered contiguously
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target URL (overrides PIXELLOAD_TARGET)
        #[arg(short, long)]
        target: Option<String>,

        /// Canvas id the draws address
        #[arg(long, default_value_t = DEFAULT_CANVAS_ID)]
        canvas_id: u32,

        /// First user id
        #[arg(long, default_value_t = 1)]
        start_id: u64,

        /// Phase duration in seconds
        #[arg(long, default_value_t = DEFAULT_PHASE_DURATION)]
        duration: u64,

        /// Merged payload filename
        #[arg(long, default_value = BURST_PAYLOAD_FILE)]
        payload: String,

        /// Config filename
        #[arg(short, long, default_value = BURST_CONFIG_FILE)]
        output: String,

        /// Output directory for generated files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Parse a pixel CSV and print the numbered batch as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// First user id to assign
        #[arg(long, default_value_t = 1)]
        start_id: u64,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a generated config and its payload files without running it
    Validate {
        /// Config JSON file
        input: PathBuf,
    },

    /// Print the embedded script schema
    Schema,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Wave {
            inputs,
            target,
            canvas_id,
            think_step,
            arrival_rate,
            duration_pad,
            start_ids,
            out_dir,
        } => {
            let options = WaveOptions {
                target: resolve_target(target),
                canvas_id,
                out_dir,
                start_ids,
                think_step,
                arrival_rate,
                duration_pad,
            };
            cmd_wave(&inputs, &options)
        }

        Commands::Battle {
            team1,
            team2,
            target,
            canvas_id,
            bound,
            no_mirror,
            start_ids,
            duration,
            out_dir,
            output,
        } => {
            let options = BattleOptions {
                target: resolve_target(target),
                canvas_id,
                out_dir,
                start_ids,
                mirror: !no_mirror,
                mirror_bound: bound,
                duration,
                config_file: output,
                ..BattleOptions::default()
            };
            cmd_battle(&team1, &team2, &options)
        }

        Commands::Burst {
            inputs,
            target,
            canvas_id,
            start_id,
            duration,
            payload,
            output,
            out_dir,
        } => {
            let options = BurstOptions {
                target: resolve_target(target),
                canvas_id,
                out_dir,
                start_id,
                duration,
                payload_file: payload,
                config_file: output,
            };
            cmd_burst(&inputs, &options)
        }

        Commands::Parse {
            input,
            start_id,
            output,
        } => cmd_parse(&input, start_id, output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Schema => cmd_schema(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Target resolution: flag, then PIXELLOAD_TARGET, then the dev default.
fn resolve_target(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("PIXELLOAD_TARGET").ok())
        .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string())
}

fn cmd_wave(inputs: &[PathBuf], options: &WaveOptions) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading {} pixel CSV(s)...", inputs.len());

    let summary = wave(inputs, options)?;
    print_summary(&summary);

    if summary.batches.len() > 1 {
        eprintln!();
        eprintln!("🏁 Start them all at once and let the teams race!");
    }

    Ok(())
}

fn cmd_battle(
    team1: &Path,
    team2: &Path,
    options: &BattleOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading team CSVs...");

    let summary = battle(team1, team2, options)?;
    print_summary(&summary);

    Ok(())
}

fn cmd_burst(inputs: &[PathBuf], options: &BurstOptions) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading {} pixel CSV(s)...", inputs.len());

    let summary = burst(inputs, options)?;
    print_summary(&summary);

    Ok(())
}

/// Console summary of a generator run.
fn print_summary(summary: &RunSummary) {
    eprintln!("✅ Generated {} file(s):", summary.files.len());
    for file in &summary.files {
        match file.records {
            Some(n) => eprintln!("   💾 {} ({} records)", file.path.display(), n),
            None => eprintln!("   💾 {}", file.path.display()),
        }
    }

    eprintln!();
    eprintln!("📊 {} pixels total:", summary.total_pixels());
    for batch in &summary.batches {
        let last_id = batch.start_user_id + batch.pixels.saturating_sub(1) as u64;
        match &batch.note {
            Some(note) => eprintln!(
                "   {}: {} pixels, users {}-{} ({})",
                batch.name, batch.pixels, batch.start_user_id, last_id, note
            ),
            None => eprintln!(
                "   {}: {} pixels, users {}-{}",
                batch.name, batch.pixels, batch.start_user_id, last_id
            ),
        }
    }

    if summary.odd_color_total() > 0 {
        eprintln!(
            "   ⚠️  {} color value(s) look unusual",
            summary.odd_color_total()
        );
    }

    eprintln!();
    eprintln!("🚀 Run:");
    for cmd in &summary.run_commands {
        println!("{}", cmd);
    }
}

fn cmd_parse(
    input: &Path,
    start_id: u64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let batch = read_batch(input, start_id)?;
    let last_id = batch.start_user_id + (batch.len() as u64 - 1);
    eprintln!(
        "✅ Parsed {} pixels (users {}-{})",
        batch.len(),
        batch.start_user_id,
        last_id
    );

    let odd = batch.odd_color_count();
    if odd > 0 {
        eprintln!("⚠️  {} color value(s) look unusual", odd);
    }

    let json = serde_json::to_string_pretty(&batch)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let data: serde_json::Value = serde_json::from_str(&content)?;

    if let Err(errors) = validate_script_value(&data) {
        eprintln!("\n❌ Config invalid:");
        for err in errors.iter().take(5) {
            eprintln!("   - {}", err);
        }
        std::process::exit(1);
    }

    let script = ArtilleryScript::from_json(&content)?;

    // Payload paths resolve relative to the config file.
    let base = input.parent().unwrap_or(Path::new("."));
    let mut records: u64 = 0;
    let mut payloads = 0;
    for payload in script_payloads(&script) {
        let path = base.join(&payload.path);
        let count = count_records(&path)?;
        eprintln!("   📄 {}: {} records", payload.path, count);
        records += count as u64;
        payloads += 1;
    }

    if payloads > 0 {
        check_event_budget(&script, records)?;
    }

    eprintln!("✅ Config valid");
    Ok(())
}

/// Payload references of a script, config-level first.
fn script_payloads(script: &ArtilleryScript) -> Vec<&PayloadRef> {
    script
        .config
        .payload
        .iter()
        .chain(script.scenarios.iter().filter_map(|s| s.payload.as_ref()))
        .collect()
}

fn cmd_schema() -> Result<(), Box<dyn std::error::Error>> {
    let schema: serde_json::Value =
        serde_json::from_str(include_str!("../schemas/artillery-script.json"))?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
