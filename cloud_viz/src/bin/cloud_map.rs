//! Render a synthetic molecular cloud with an embedded star cluster
//!
//! Samples a Gaussian SPH gas cloud and a star cluster, then draws the
//! mid-plane log-density map with the stars on top.
//!
//! Usage:
//! ```
//! cargo run --bin cloud_map -- --output plots/cloud.png
//! cargo run --bin cloud_map -- --length 6 --offset-x 1.5   # terminal display
//! ```

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use cloud_viz::render::{AsciiBackend, FigureBackend, PngBackend};
use cloud_viz::scene::{plot_hydro_and_stars, SceneOptions};
use cloud_viz::sph::{CloudConfig, GasParticles};
use cloud_viz::stars::{ClusterConfig, StarParticles};
use cloud_viz::units::{Length, LengthExt, Mass, MassExt, Time, TimeExt, Velocity, VelocityExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot SPH gas density and star particles")]
struct Args {
    /// Width of the plotted square in parsecs
    #[arg(long, default_value_t = 10.0)]
    length: f64,

    /// Shift of the plotted region along x in parsecs
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f64>,

    /// Shift of the plotted region along y in parsecs
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f64>,

    /// Simulation time in Myr, shown in the default title
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Explicit plot title
    #[arg(long, default_value = "")]
    title: String,

    /// Save the figure as PNG here instead of printing it to the terminal
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of gas particles
    #[arg(long, default_value_t = 2000)]
    gas_particles: usize,

    /// Total gas mass in solar masses
    #[arg(long, default_value_t = 1000.0)]
    gas_mass: f64,

    /// Gaussian radius of the gas cloud in parsecs
    #[arg(long, default_value_t = 1.5)]
    cloud_radius: f64,

    /// Number of star particles
    #[arg(long, default_value_t = 50)]
    stars: usize,

    /// Gaussian radius of the star cluster in parsecs
    #[arg(long, default_value_t = 0.8)]
    cluster_radius: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging from environment variables
    env_logger::init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let gas = GasParticles::gaussian_cloud(
        &CloudConfig {
            particles: args.gas_particles,
            total_mass: Mass::from_solar_masses(args.gas_mass),
            radius: Length::from_parsecs(args.cloud_radius),
            velocity_dispersion: Velocity::from_kilometers_per_second(1.0),
            sound_speed: Velocity::from_kilometers_per_second(0.2),
        },
        &mut rng,
    )?;

    let stars = StarParticles::gaussian_cluster(
        &ClusterConfig {
            count: args.stars,
            radius: Length::from_parsecs(args.cluster_radius),
            ..Default::default()
        },
        &mut rng,
    )?;

    log::info!(
        "Sampled {} gas particles and {} stars",
        gas.len(),
        stars.len()
    );

    let options = SceneOptions {
        length: args.length,
        filename: args.output.clone(),
        offset_x: args.offset_x.map(Length::from_parsecs),
        offset_y: args.offset_y.map(Length::from_parsecs),
        title: args.title,
    };

    let mut backend: Box<dyn FigureBackend> = match &args.output {
        Some(_) => Box::new(PngBackend::new()),
        None => Box::new(AsciiBackend::stdout()),
    };

    let figure = plot_hydro_and_stars(
        Time::from_megayears(args.time),
        &gas,
        &stars,
        &options,
        &mut backend,
    )?;

    if let Some(path) = &args.output {
        println!("Plot saved to: {}", path.display());
    }
    log::debug!("Rendered \"{}\"", figure.title);
    Ok(())
}
