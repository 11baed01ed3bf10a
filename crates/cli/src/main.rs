#![deny(unsafe_code)]
//! Headless driver for the curlfield particle simulation.
//!
//! Subcommands:
//! - `run`: build a simulation, step it N frames at a fixed dt, optionally write a PNG
//! - `schema`: print the configuration parameter schema

mod error;

use clap::{Parser, Subcommand};
use curlfield_core::config::param_schema;
use curlfield_core::{Simulation, SimulationConfig};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "curlfield", about = "Curl-noise particle field simulator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Step a simulation for N frames and report where the particles ended up.
    Run {
        /// JSON file with a full or partial simulation config.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of particles (1000..=20000).
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Per-instance particle size (0.1..=2.0).
        #[arg(long)]
        size: Option<f64>,

        /// Noise spatial frequency (0.005..=0.1).
        #[arg(long)]
        noise_scale: Option<f64>,

        /// Velocity multiplier (0.1..=10).
        #[arg(long)]
        speed: Option<f64>,

        /// Boundary restoring gain (1..=10).
        #[arg(long)]
        boundary_strength: Option<f64>,

        /// PRNG seed for deterministic output.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,

        /// Seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// Write a PNG snapshot of the final frame here.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Snapshot width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Snapshot height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,
    },
    /// Print the parameter schema.
    Schema,
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig, CliError> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseConfig {
        path: path.to_owned(),
        source,
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&param_schema())?);
        }
        Command::Run {
            config,
            count,
            size,
            noise_scale,
            speed,
            boundary_strength,
            seed,
            frames,
            dt,
            output,
            width,
            height,
        } => {
            if !dt.is_finite() || dt < 0.0 {
                return Err(CliError::InvalidDt(dt));
            }

            let mut config = load_config(config.as_deref())?;
            if let Some(n) = count {
                config.particles.count = n;
            }
            if let Some(s) = size {
                config.particles.size = s;
            }
            if let Some(v) = noise_scale {
                config.field.noise_scale = v;
            }
            if let Some(v) = speed {
                config.field.speed = v;
            }
            if let Some(v) = boundary_strength {
                config.field.boundary_strength = v;
            }
            if let Some(s) = seed {
                config.seed = s;
            }

            let mut sim = Simulation::new(config)?;
            log::info!(
                "simulating {} particles for {frames} frames (dt {dt:.4}s, seed {})",
                sim.particle_count(),
                sim.config().seed
            );

            for frame in 0..frames {
                sim.step(dt);
                if frame % 60 == 59 {
                    log::debug!("frame {}: max radius {:.3}", frame + 1, sim.radial_stats().max);
                }
            }

            if let Some(path) = &output {
                curlfield_present::snapshot::write_png(&sim, width, height, path)?;
            }

            let stats = sim.radial_stats();
            log::info!("done after {} frames", sim.frame());

            if cli.json {
                let info = serde_json::json!({
                    "frames": sim.frame(),
                    "dt": dt,
                    "params": sim.params(),
                    "seed": sim.config().seed,
                    "maxRadius": stats.max,
                    "meanRadius": stats.mean,
                    "domainRadius": sim.domain_radius(),
                    "output": output.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "{} particles, {} frames: max radius {:.3} / {:.1}, mean radius {:.3}",
                    sim.particle_count(),
                    sim.frame(),
                    stats.max,
                    sim.domain_radius(),
                    stats.mean
                );
                if let Some(path) = &output {
                    println!("snapshot -> {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        log::error!("{e}");
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults_parse() {
        let cli = Cli::try_parse_from(["curlfield", "run"]).unwrap();
        match cli.command {
            Command::Run { frames, dt, count, .. } => {
                assert_eq!(frames, 600);
                assert!((dt - 1.0 / 60.0).abs() < 1e-12);
                assert!(count.is_none());
            }
            Command::Schema => panic!("expected run"),
        }
    }

    #[test]
    fn run_overrides_parse() {
        let cli = Cli::try_parse_from([
            "curlfield",
            "--json",
            "run",
            "-n",
            "2000",
            "--noise-scale",
            "0.02",
            "--boundary-strength",
            "6",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Run {
                count,
                noise_scale,
                boundary_strength,
                ..
            } => {
                assert_eq!(count, Some(2000));
                assert_eq!(noise_scale, Some(0.02));
                assert_eq!(boundary_strength, Some(6.0));
            }
            Command::Schema => panic!("expected run"),
        }
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, CliError::ReadConfig { .. }));
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn malformed_config_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"particleCount\": ").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::ParseConfig { .. }));
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn no_config_file_gives_defaults() {
        let cfg = load_config(None).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cfg, SimulationConfig::default());
    }

    #[test]
    fn negative_dt_is_input_error() {
        let cli = Cli::try_parse_from(["curlfield", "run", "--dt=-1", "-f", "1"]).unwrap();
        let err = run(cli).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn out_of_range_count_is_sim_error() {
        let cli = Cli::try_parse_from(["curlfield", "run", "-n", "10", "-f", "1"]).unwrap();
        let err = run(cli).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }
}
