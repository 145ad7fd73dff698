use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use geosphere_engine::{EngineConfig, PassMode, ThreadedEngine};
use geosphere_kernel::Planet;
use geosphere_scheduler::{AmortizedScheduler, Backend, update};
use geosphere_tools::PlanetInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geosphere-cli", about = "Headless runner for the geosphere planet simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON engine configuration; missing fields take their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the plate seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Override the total shell count
    #[arg(long, global = true)]
    shells: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the planet built from the configuration
    Info,
    /// Print the effective configuration as JSON
    Config,
    /// Advance the planet on this thread for a number of cycles
    Run {
        /// Number of cycles to simulate
        #[arg(short = 'n', long, default_value = "10")]
        cycles: u64,
        /// Simulated years per cycle
        #[arg(long, default_value = "1000")]
        dt: f64,
        /// Spread each cycle over many scheduler ticks instead of one update
        #[arg(long)]
        amortized: bool,
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the threaded engine for a wall-clock duration
    Threaded {
        /// Wall-clock seconds to run
        #[arg(long, default_value = "5")]
        seconds: f64,
        /// Simulated years per wall-clock second
        #[arg(long)]
        speed: Option<f64>,
        /// Worker wake-ups per second
        #[arg(long)]
        rate: Option<f64>,
        /// Run one whole update per wake
        #[arg(long)]
        synchronous: bool,
    },
    /// Describe the surface voxel under a latitude/longitude
    Inspect {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Cycles to simulate first
        #[arg(short = 'n', long, default_value = "0")]
        cycles: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.sim.tectonics.seed = seed;
    }
    if let Some(shells) = cli.shells {
        config.sim.planet.shells = shells;
    }

    match cli.command {
        Commands::Info => {
            println!("geosphere-cli v{}", env!("CARGO_PKG_VERSION"));
            let planet = build(&config)?;
            println!("{}", PlanetInspector::summary(&planet));
            for row in PlanetInspector::temperature_profile(&planet) {
                println!("  {row}");
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Run {
            cycles,
            dt,
            amortized,
            json,
        } => {
            let mut planet = build(&config)?;
            let start = Instant::now();
            run_cycles(&mut planet, &config, cycles, dt, amortized)?;
            let elapsed = start.elapsed();

            if json {
                let report = serde_json::json!({
                    "summary": PlanetInspector::summary(&planet),
                    "plates": PlanetInspector::plates(&planet),
                    "boundaries": PlanetInspector::boundaries(&planet),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Ran {cycles} cycles of {dt} yr in {elapsed:.2?}");
                print_report(&planet);
            }
        }
        Commands::Threaded {
            seconds,
            speed,
            rate,
            synchronous,
        } => {
            if let Some(speed) = speed {
                config.speed = speed;
            }
            if let Some(rate) = rate {
                config.update_rate_hz = rate;
            }
            if synchronous {
                config.mode = PassMode::Synchronous;
            }
            anyhow::ensure!(
                seconds.is_finite() && seconds >= 0.0,
                "duration must be a non-negative number of seconds"
            );

            let planet = build(&config)?;
            let engine = ThreadedEngine::start(planet, config)?;
            let deadline = Instant::now() + Duration::from_secs_f64(seconds);
            while Instant::now() < deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                thread::sleep(Duration::from_secs(1).min(remaining));
                let snapshot = engine.snapshot();
                println!(
                    "t={:.0}yr cycles={} volcanism={}",
                    snapshot.sim_time(),
                    engine.cycles(),
                    snapshot.volcanism_count()
                );
            }
            let planet = engine.stop();
            print_report(&planet);
        }
        Commands::Inspect { lat, lon, cycles } => {
            let mut planet = build(&config)?;
            let dt = config.sim.scheduler.target_step_years;
            run_cycles(&mut planet, &config, cycles, dt, false)?;
            let info = PlanetInspector::inspect_surface(&planet, lat, lon)
                .with_context(|| format!("no solid surface under ({lat}, {lon})"))?;
            println!("{info}");
            match planet.plate_at(lat, lon) {
                Some(plate) => println!("on plate {} ({})", plate.id, plate.kind),
                None => println!("not on a plate"),
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

fn build(config: &EngineConfig) -> anyhow::Result<Planet> {
    config.validate()?;
    Ok(config.sim.build_planet()?)
}

fn run_cycles(
    planet: &mut Planet,
    config: &EngineConfig,
    cycles: u64,
    dt: f64,
    amortized: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(dt.is_finite() && dt > 0.0, "dt must be a positive number of years");
    if amortized {
        let mut sim = config.sim.clone();
        sim.scheduler.target_step_years = dt;
        let mut scheduler = AmortizedScheduler::from_sim(&sim)?;
        for _ in 0..cycles {
            let mut pending = dt;
            while !scheduler.tick(planet, pending) {
                pending = 0.0;
            }
        }
        let stats = scheduler.stats();
        tracing::info!(
            calls = stats.calls,
            last_cycle_calls = stats.last_cycle_calls,
            average_call = ?stats.average_call,
            "amortized run finished"
        );
    } else {
        let mut backend = Backend::cpu();
        for _ in 0..cycles {
            update(planet, dt, &mut backend, &config.sim);
        }
    }
    Ok(())
}

fn print_report(planet: &Planet) {
    println!("{}", PlanetInspector::summary(planet));
    for plate in PlanetInspector::plates(planet) {
        println!("  {plate}");
    }
    for boundary in PlanetInspector::boundaries(planet) {
        println!("  {boundary}");
    }
}
