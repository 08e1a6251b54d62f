use std::path::PathBuf;

use aurum_common::{FieldConfig, Viewport};
use aurum_field::{ParticleSet, SteppedClock};
use aurum_render::{HeadlessHost, HeadlessSurface, LoopStats, RenderLoop};
use aurum_tools::{FieldSummary, ParticleInspector};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aurum-cli", about = "CLI tool for the particle field")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML field configuration; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective field configuration
    Info,
    /// Sample the sphere and summarize the base positions
    Sample {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drive the render loop headlessly and report what it did
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Seconds advanced per tick
        #[arg(long, default_value = "0.016666666666666666")]
        dt: f64,
        /// Pointer position in logical pixels, as `x,y`
        #[arg(long, value_parser = parse_pointer)]
        pointer: Option<(f32, f32)>,
        /// Viewport width in logical pixels
        #[arg(long, default_value = "1280")]
        width: f32,
        /// Viewport height in logical pixels
        #[arg(long, default_value = "720")]
        height: f32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_pointer(text: &str) -> Result<(f32, f32), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{text}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid coordinate `{v}`: {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    ticks: u64,
    stats: Stats,
    pointer: [f32; 2],
    smoothed_pointer: [f32; 2],
    presents: u64,
    uploads: u64,
    releases: u32,
    field: FieldSummary,
}

#[derive(Debug, Serialize)]
struct Stats {
    frames_presented: u64,
    frames_skipped: u64,
    frames_requested: u64,
}

impl From<LoopStats> for Stats {
    fn from(s: LoopStats) -> Self {
        Self {
            frames_presented: s.frames_presented,
            frames_skipped: s.frames_skipped,
            frames_requested: s.frames_requested,
        }
    }
}

fn simulate(
    config: FieldConfig,
    ticks: u64,
    dt: f64,
    pointer: Option<(f32, f32)>,
    viewport: Viewport,
) -> anyhow::Result<SimulationReport> {
    let host = HeadlessHost::new();
    let probe = host.probe();
    let mut rl: RenderLoop<HeadlessSurface, SteppedClock> =
        RenderLoop::with_clock(config, viewport, SteppedClock::new(dt))?;

    let mut pending = 0u64;
    rl.init(host, &mut || pending += 1)?;
    if let Some((x, y)) = pointer {
        rl.pointer_moved(x, y);
    }

    for _ in 0..ticks {
        rl.tick(&mut || pending += 1);
    }

    let field = rl
        .particles()
        .map(ParticleInspector::summary)
        .ok_or_else(|| anyhow::anyhow!("render loop stopped running"))?;
    let state = rl.pointer();
    let stats = rl.stats();
    rl.dispose();

    let record = probe.record();
    tracing::debug!(pending, "simulation finished");
    Ok(SimulationReport {
        ticks: stats.ticks,
        stats: stats.into(),
        pointer: state.raw.to_array(),
        smoothed_pointer: state.smoothed.to_array(),
        presents: record.presents,
        uploads: record.uploads,
        releases: record.releases,
        field,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("aurum-cli v{}", env!("CARGO_PKG_VERSION"));
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Sample { json } => {
            let set = ParticleSet::from_config(&config);
            let summary = ParticleInspector::base_summary(&set);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
        }
        Commands::Simulate {
            ticks,
            dt,
            pointer,
            width,
            height,
            json,
        } => {
            let viewport = Viewport::new(width, height, 1.0);
            let report = simulate(config, ticks, dt, pointer, viewport)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Simulated {} ticks: presented={} skipped={} requested={}",
                    report.ticks,
                    report.stats.frames_presented,
                    report.stats.frames_skipped,
                    report.stats.frames_requested
                );
                println!(
                    "Pointer: raw=({:.4}, {:.4}) smoothed=({:.4}, {:.4})",
                    report.pointer[0],
                    report.pointer[1],
                    report.smoothed_pointer[0],
                    report.smoothed_pointer[1]
                );
                println!("{}", report.field);
                println!(
                    "Surface: presents={} uploads={} releases={}",
                    report.presents, report.uploads, report.releases
                );
            }
        }
    }

    Ok(())
}
