//! Plover CLI - resample state tracks and run simulate-and-score passes.

pub mod io;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use plover_core::{resample, time_range, StateSequence, Track, TimestampedState};
use plover_sim::{
    generate_track, resample_error, simulate_truth, TrackConfig, TruthConfig, POSITION_INDICES,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::parse_from(args);
    main_inner(args)
}

#[derive(Parser, Debug)]
#[command(name = "plover-cli")]
#[command(about = "Resample timestamped state tracks by linear interpolation")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Interpolate a CSV track onto a regular time grid or explicit times
    Resample(ResampleArgs),
    /// Simulate truth and a noisy track, then score the resampled track
    Simulate(SimulateArgs),
}

#[derive(ClapArgs, Debug)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output file format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,
}

#[derive(ClapArgs, Debug)]
struct ResampleArgs {
    /// CSV file with a `timestamp` column (RFC 3339) followed by components
    #[arg(short, long)]
    input: PathBuf,

    /// Grid step in milliseconds
    #[arg(long, default_value_t = 1000)]
    step_ms: i64,

    /// Grid start (RFC 3339); defaults to the first track time
    #[arg(long)]
    start: Option<String>,

    /// Grid end (RFC 3339); defaults to the last track time
    #[arg(long)]
    end: Option<String>,

    /// Explicit query times (RFC 3339), comma separated; overrides the grid
    #[arg(long, value_delimiter = ',')]
    times: Option<Vec<String>>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(ClapArgs, Debug)]
struct SimulateArgs {
    // ── Truth ───────────────────────────────────────────────
    #[arg(long, default_value_t = 60.0)]
    duration: f64,

    /// Mean truth sample interval (s)
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    #[arg(long, default_value_t = 0.05)]
    process_noise: f64,

    // ── Track ───────────────────────────────────────────────
    /// Position measurement noise std-dev (m)
    #[arg(long, alias = "noise", default_value_t = 2.0)]
    pos_noise: f64,

    #[arg(long, default_value_t = 0.5)]
    vel_noise: f64,

    /// Detection probability
    #[arg(long, default_value_t = 0.8)]
    pd: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    // ── Resampling ──────────────────────────────────────────
    #[arg(long, default_value_t = 1000)]
    step_ms: i64,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main_inner(args: Args) -> Result<()> {
    println!("Plover State Resampler");
    println!("======================\n");

    match args.mode {
        Mode::Resample(a) => run_resample(&a),
        Mode::Simulate(a) => run_simulate(&a),
    }
}

// ---------------------------------------------------------------------------
// Resample
// ---------------------------------------------------------------------------
fn run_resample(args: &ResampleArgs) -> Result<()> {
    let loaded = io::read_track_csv(&args.input)?;
    let track = loaded.track;
    let (first, last) = track
        .time_span()
        .with_context(|| format!("{} holds no states", args.input.display()))?;

    let times: Vec<DateTime<Utc>> = match &args.times {
        Some(raw) => raw
            .iter()
            .map(|t| io::parse_time(t))
            .collect::<Result<_>>()?,
        None => {
            let start = args.start.as_deref().map(io::parse_time).transpose()?.unwrap_or(first);
            let end = args.end.as_deref().map(io::parse_time).transpose()?.unwrap_or(last);
            grid(start, end, args.step_ms)?
        }
    };

    println!("Input:  {} states from {:?}", track.len(), args.input);
    println!("Query:  {} times", times.len());

    let resampled = resample(&track, &times)
        .with_context(|| format!("failed to resample {}", args.input.display()))?;
    if !resampled.discarded.is_empty() {
        println!(
            "Dropped {} times outside {} -> {}",
            resampled.discarded.len(),
            io::format_time(first),
            io::format_time(last)
        );
    }

    write_resampled(
        &args.output,
        &track.id,
        &resampled.sequence,
        &resampled.discarded,
        &loaded.components,
    )
}

// ---------------------------------------------------------------------------
// Simulate
// ---------------------------------------------------------------------------
fn run_simulate(args: &SimulateArgs) -> Result<()> {
    println!("Running simulation...");

    let truth_cfg = TruthConfig {
        duration_s: args.duration,
        mean_interval_s: args.interval,
        process_noise: args.process_noise,
        seed: args.seed,
        ..TruthConfig::default()
    };
    let track_cfg = TrackConfig {
        position_noise_std: args.pos_noise,
        velocity_noise_std: args.vel_noise,
        detection_probability: args.pd,
        seed: args.seed.wrapping_add(1),
    };

    let truth = simulate_truth(&truth_cfg).context("invalid truth configuration")?;
    let track = generate_track(&truth, &track_cfg);
    print_sim_stats(truth.len(), &track);

    let metrics = resample_error(&truth, &track)
        .with_context(|| format!("cannot score a track of {} states", track.len()))?;
    println!("Resampled at truth times:");
    println!("  Compared:    {}", metrics.compared);
    println!("  Discarded:   {}", metrics.discarded);
    println!("  Pos RMSE:    {:.3} m", metrics.pos_rmse_m);
    info!(rmse = metrics.pos_rmse_m, compared = metrics.compared, "scored resampled track");

    let (first, last) = track
        .time_span()
        .context("generated track holds no states")?;
    let times = grid(first, last, args.step_ms)?;
    let resampled = resample(&track, &times)?;

    let ndim = track.state().map(|s| s.ndim()).unwrap_or(0);
    let components = io::component_names(ndim);
    std::fs::create_dir_all(&args.output.output_dir)?;
    io::write_states_csv(
        &args.output.output_dir.join("truth.csv"),
        &truth,
        &components,
    )?;
    write_resampled(
        &args.output,
        &track.id,
        &resampled.sequence,
        &resampled.discarded,
        &components,
    )?;

    let summary = serde_json::json!({
        "truth": truth_cfg.to_json(),
        "track": track_cfg.to_json(),
        "position_indices": POSITION_INDICES,
        "step_ms": args.step_ms,
        "metrics": {
            "pos_rmse_m": metrics.pos_rmse_m,
            "compared": metrics.compared,
            "discarded": metrics.discarded,
        },
    });
    let summary_path = args.output.output_dir.join("run_summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("Run summary written to {:?}", summary_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn grid(start: DateTime<Utc>, end: DateTime<Utc>, step_ms: i64) -> Result<Vec<DateTime<Utc>>> {
    if step_ms <= 0 {
        bail!("step must be positive, got {} ms", step_ms);
    }
    if end < start {
        bail!(
            "grid end {} is before start {}",
            io::format_time(end),
            io::format_time(start)
        );
    }
    Ok(time_range(start, end, TimeDelta::milliseconds(step_ms)).collect())
}

fn print_sim_stats<S: TimestampedState>(truth_len: usize, track: &Track<S>) {
    let span = track
        .time_span()
        .map(|(a, b)| (b - a).num_milliseconds() as f64 / 1000.0)
        .unwrap_or(0.0);

    println!("\nSimulation Stats:");
    println!("  Truth samples: {}", truth_len);
    println!("  Track states:  {}", track.len());
    println!("  Track span:    {:.2} s", span);
    println!("-----------------------------");
}

fn write_resampled<Q: StateSequence>(
    output: &OutputArgs,
    id: &str,
    sequence: &Q,
    discarded: &[DateTime<Utc>],
    components: &[String],
) -> Result<()> {
    std::fs::create_dir_all(&output.output_dir)?;

    let path = match output.format {
        OutputFormat::Csv => {
            let path = output.output_dir.join("resampled.csv");
            io::write_states_csv(&path, sequence, components)?;
            path
        }
        OutputFormat::Json => {
            let path = output.output_dir.join("resampled.json");
            let value = io::states_to_json(id, sequence, discarded);
            std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
            path
        }
    };

    report_written(&path, sequence.len());
    Ok(())
}

fn report_written(path: &Path, n: usize) {
    println!("{} states written to {:?}", n, path);
    info!(path = %path.display(), states = n, "wrote resampled states");
}
