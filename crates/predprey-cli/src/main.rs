//! Lattice predator-prey simulator.
//!
//! Seeds the generator, builds the lattice and steps it to `maxtime`,
//! printing densities to stdout and optionally rendering frames.

mod output;
mod render;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use predprey_core::{RunConfig, Xorshift128Plus};
use predprey_world::{LatticeSnapshot, Simulation, StepObserver};
use rand_core::SeedableRng;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::{debug, info};

use output::DensityReporter;
use render::FrameRenderer;

#[derive(Parser, Debug)]
#[command(name = "predprey")]
#[command(version)]
#[command(about = "Stochastic lattice Lotka-Volterra predator-prey simulator")]
struct Cli {
    /// Run configuration file (JSON); flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Predator death rate
    #[arg(long)]
    mu: Option<f64>,

    /// Predation rate
    #[arg(long)]
    lambda: Option<f64>,

    /// Prey reproduction rate
    #[arg(long)]
    sigma: Option<f64>,

    /// Initial predator density
    #[arg(long)]
    rho_pred: Option<f64>,

    /// Initial prey density
    #[arg(long)]
    rho_prey: Option<f64>,

    /// Lattice side length
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Number of steps to simulate
    #[arg(short = 't', long)]
    maxtime: Option<u64>,

    /// Random seed for reproducibility (default: OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Steps between density report lines (0 disables)
    #[arg(long)]
    report_interval: Option<u64>,

    /// Directory for PNG frames
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Path for an animated GIF of the run
    #[arg(long)]
    gif: Option<PathBuf>,

    /// Steps between rendered frames
    #[arg(long)]
    frame_interval: Option<u64>,

    /// Pixels per lattice site in rendered frames
    #[arg(long)]
    cell_scale: Option<u32>,

    /// Write the final lattice snapshot here
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Resume from a snapshot instead of a fresh lattice
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Suppress the density report and informational logs
    #[arg(short, long)]
    quiet: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {:?}", path))?,
            None => RunConfig::default(),
        };

        let params = &mut config.params;
        if let Some(mu) = self.mu {
            params.mu = mu;
        }
        if let Some(lambda) = self.lambda {
            params.lambda = lambda;
        }
        if let Some(sigma) = self.sigma {
            params.sigma = sigma;
        }
        if let Some(rho_pred) = self.rho_pred {
            params.rho_pred = rho_pred;
        }
        if let Some(rho_prey) = self.rho_prey {
            params.rho_prey = rho_prey;
        }
        if let Some(size) = self.size {
            params.size = size;
        }
        if let Some(maxtime) = self.maxtime {
            params.maxtime = maxtime;
        }

        if self.seed.is_some() {
            config.seed = self.seed;
        }

        let output = &mut config.output;
        if let Some(interval) = self.report_interval {
            output.report_interval = interval;
        }
        if self.quiet {
            output.report_interval = 0;
        }
        if let Some(dir) = &self.frames {
            output.frame_dir = Some(dir.clone());
        }
        if let Some(path) = &self.gif {
            output.gif_path = Some(path.clone());
        }
        if let Some(interval) = self.frame_interval {
            output.frame_interval = interval;
        }
        if let Some(scale) = self.cell_scale {
            output.cell_scale = scale;
        }
        if let Some(path) = &self.snapshot {
            output.snapshot_path = Some(path.clone());
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Fans each callback out to several observers in order
struct Observers<'a>(Vec<&'a mut dyn StepObserver>);

impl StepObserver for Observers<'_> {
    fn observe(&mut self, sim: &Simulation) -> predprey_core::Result<()> {
        for observer in self.0.iter_mut() {
            observer.observe(sim)?;
        }
        Ok(())
    }

    fn finish(&mut self, sim: &Simulation) -> predprey_core::Result<()> {
        for observer in self.0.iter_mut() {
            observer.finish(sim)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.run_config()?;

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    telemetry::init_telemetry(cli.log_json, cli.quiet)?;
    info!("Starting predprey");

    let mut rng = match config.seed {
        Some(seed) => {
            info!("Seeding generator with {}", seed);
            Xorshift128Plus::seed_from_u64(seed)
        }
        None => Xorshift128Plus::from_entropy().context("failed to seed generator")?,
    };
    debug!(state = ?rng.state(), "Generator state");

    let mut sim = match &cli.resume {
        Some(path) => {
            let snapshot = LatticeSnapshot::read_from_file(path)
                .with_context(|| format!("failed to read snapshot {:?}", path))?;
            Simulation::restore(config.params.clone(), &snapshot)?
        }
        None => Simulation::init(config.params.clone(), &mut rng)
            .context("failed to initialize lattice")?,
    };

    let stdout = io::stdout();
    let mut reporter = DensityReporter::new(
        BufWriter::new(stdout.lock()),
        config.output.report_interval,
    );
    let mut renderer = FrameRenderer::new(
        config.output.frame_dir.clone(),
        config.output.gif_path.clone(),
        config.output.frame_interval,
        config.output.cell_scale,
    )
    .context("failed to set up rendering")?;

    let mut observers = Observers(vec![
        &mut reporter as &mut dyn StepObserver,
        &mut renderer as &mut dyn StepObserver,
    ]);
    let result = sim.run(&mut rng, &mut observers)?;

    if let Some(path) = &config.output.snapshot_path {
        sim.snapshot()
            .write_to_file(path)
            .with_context(|| format!("failed to write snapshot {:?}", path))?;
    }

    info!(
        "Finished at step {}: predator density {:.6}, prey density {:.6}",
        result.final_time,
        result.final_census.predator_density(),
        result.final_census.prey_density()
    );

    sim.teardown();
    Ok(())
}
