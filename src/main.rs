mod config;
mod export;
mod geodetic;
mod propagation;
mod report;
mod track;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{parse_duration, ConfigError, RunConfig};
use crate::export::{ExportError, TIME_FORMAT};
use crate::propagation::{
    current_position, load_satellite, propagate, Propagation, PropagationError, Sample,
    SamplingPlan, Sgp4Propagator, SkipReason, StatePropagator, TleError,
};
use crate::track::GroundTrack;

/// Steps longer than this fraction of a period risk ground-track jumps near 180°
const MAX_STEP_PERIOD_FRACTION: f64 = 0.25;

#[derive(Parser)]
#[command(name = "ground-track")]
#[command(about = "Satellite ground track computation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run file and its TLE
    Validate { config: PathBuf },
    /// Propagate, segment and export a run file
    Run { config: PathBuf },
    /// Print a propagation table for a TLE
    Propagate {
        #[arg(long)]
        tle: PathBuf,
        #[arg(long, default_value = "24h")]
        duration: String,
        #[arg(long, default_value = "30m")]
        step: String,
        /// Print every sample instead of a summary
        #[arg(long)]
        all: bool,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print the current sub-satellite point
    Position {
        #[arg(long)]
        tle: PathBuf,
    },
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Tle(#[from] TleError),
    #[error("{0}")]
    Propagation(#[from] PropagationError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid argument {0}: {1}")]
    Argument(&'static str, String),
    #[error("no samples were produced, nothing to draw")]
    InsufficientSamples,
    #[error("no position at {epoch}: {reason}")]
    NoPosition {
        epoch: DateTime<Utc>,
        reason: SkipReason,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run { config } => run(&config),
        Commands::Propagate {
            tle,
            duration,
            step,
            all,
            csv,
        } => propagate_table(&tle, &duration, &step, all, csv.as_deref()),
        Commands::Position { tle } => position(&tle),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path) -> Result<(), AppError> {
    let config = RunConfig::from_file(path)?;
    let satellite = load_satellite(&config.tle)?;
    let plan = config.sampling_plan(Utc::now())?;
    let epochs = plan.epochs()?;
    let elements = satellite.describe();
    let period = config
        .period_minutes
        .unwrap_or(elements.period_minutes);

    println!("Run file is valid");
    println!("  Satellite:        {} (NORAD {})", satellite.name, elements.norad_id);
    println!("  Element epoch:    {}", elements.epoch.format(TIME_FORMAT));
    println!("  Inclination:      {:.4}°", elements.inclination_deg);
    println!("  RAAN:             {:.4}°", elements.right_ascension_deg);
    println!("  Eccentricity:     {:.7}", elements.eccentricity);
    println!("  Arg. of perigee:  {:.4}°", elements.argument_of_perigee_deg);
    println!("  Mean anomaly:     {:.4}°", elements.mean_anomaly_deg);
    println!("  Mean motion:      {:.8} rev/day", elements.mean_motion_rev_per_day);
    println!("  B* drag term:     {:.4e}", elements.bstar);
    println!("  Period:           {:.2} min", period);
    println!(
        "  Samples:          {} ({} every {})",
        epochs.len(),
        config.duration,
        config.step
    );
    println!("  Orbits:           {}", config.orbits);
    warn_on_coarse_step(&plan, period);
    Ok(())
}

fn run(path: &Path) -> Result<(), AppError> {
    let config = RunConfig::from_file(path)?;
    let satellite = load_satellite(&config.tle)?;
    let plan = config.sampling_plan(Utc::now())?;
    let period = config
        .period_minutes
        .unwrap_or_else(|| satellite.orbital_period_minutes());

    log::info!(
        "Propagating {} from {} for {} every {}",
        satellite.name,
        plan.start.format(TIME_FORMAT),
        config.duration,
        config.step
    );
    warn_on_coarse_step(&plan, period);

    let propagation = propagate_satellite(&Sgp4Propagator::new(&satellite), &plan)?;
    let track = build_track(&satellite.name, &propagation, period, config.orbits)?;
    log::info!(
        "{} samples in {} segments, {} full orbits of {:.2} min over {:.1} h",
        track.points,
        track.segments.len(),
        track.orbits.len(),
        period,
        track.duration_hours()
    );
    if track.orbits.len() < config.orbits {
        log::warn!(
            "Only {} of {} requested orbits fit in the propagated window",
            track.orbits.len(),
            config.orbits
        );
    }

    report::print_propagation(&propagation, false)?;

    if let Some(csv) = &config.output.csv {
        export::save_csv(csv, &propagation.samples)?;
    }
    if let Some(path) = &config.output.track {
        export::save_track(path, &track)?;
    }

    Ok(())
}

fn propagate_table(
    tle: &Path,
    duration: &str,
    step: &str,
    show_all: bool,
    csv: Option<&Path>,
) -> Result<(), AppError> {
    let satellite = load_satellite(tle)?;
    let duration = parse_duration(duration).map_err(|e| AppError::Argument("duration", e))?;
    let step = parse_duration(step).map_err(|e| AppError::Argument("step", e))?;
    let plan = SamplingPlan::new(Utc::now(), duration, step);

    println!("Satellite: {}", satellite.name);
    let period = satellite.orbital_period_minutes();
    println!(
        "Orbital period: {:.2} minutes ({:.2} hours)",
        period,
        period / 60.0
    );

    let propagation = propagate_satellite(&Sgp4Propagator::new(&satellite), &plan)?;
    report::print_propagation(&propagation, show_all)?;

    if let Some(csv) = csv {
        export::save_csv(csv, &propagation.samples)?;
    }
    Ok(())
}

fn position(tle: &Path) -> Result<(), AppError> {
    let satellite = load_satellite(tle)?;
    let sample = locate(&Sgp4Propagator::new(&satellite), Utc::now())?;

    println!("{} at {}", satellite.name, sample.epoch.format(TIME_FORMAT));
    println!("  Latitude:  {:>9.3}°", sample.latitude_deg);
    println!("  Longitude: {:>9.3}°", sample.longitude_deg);
    println!("  Altitude:  {:>9.2} km", sample.altitude_km);
    println!("  Speed:     {:>9.3} km/s", sample.speed_km_s);
    Ok(())
}

fn locate<P: StatePropagator>(propagator: &P, now: DateTime<Utc>) -> Result<Sample, AppError> {
    current_position(propagator, now).map_err(|reason| AppError::NoPosition { epoch: now, reason })
}

fn propagate_satellite<P: StatePropagator + Sync>(
    propagator: &P,
    plan: &SamplingPlan,
) -> Result<Propagation, AppError> {
    let propagation = propagate(propagator, plan)?;

    for skipped in &propagation.skipped {
        log::warn!(
            "Skipped {}: {}",
            skipped.epoch.format(TIME_FORMAT),
            skipped.reason
        );
    }
    log::debug!(
        "{} samples, {} skipped",
        propagation.samples.len(),
        propagation.skipped.len()
    );

    Ok(propagation)
}

/// A track needs at least one sample; an all-skipped propagation is fatal.
fn build_track(
    satellite: &str,
    propagation: &Propagation,
    period_minutes: f64,
    orbit_count: usize,
) -> Result<GroundTrack, AppError> {
    if propagation.is_empty() {
        return Err(AppError::InsufficientSamples);
    }
    Ok(GroundTrack::build(satellite, propagation, period_minutes, orbit_count))
}

fn warn_on_coarse_step(plan: &SamplingPlan, period_minutes: f64) {
    let step_minutes = plan.step.num_milliseconds() as f64 / 60_000.0;
    if step_minutes > period_minutes * MAX_STEP_PERIOD_FRACTION {
        log::warn!(
            "Step of {:.1} min exceeds a quarter of the {:.1} min period; antimeridian breaks may be misplaced",
            step_minutes,
            period_minutes
        );
    }
}
