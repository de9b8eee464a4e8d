//! Density map visualization for SPH molecular cloud simulations.
//!
//! This crate turns the state of a smoothed-particle-hydrodynamics (SPH) gas
//! simulation into a single static figure: a log-scaled density slice through
//! the cloud mid-plane with the star particles drawn on top. It is meant to be
//! called from a simulation driver between integration steps.
//!
//! # Pipeline
//!
//! ```text
//! scene::compose_scene
//!     └─ density_map::make_map ── HydroFieldEvaluator::hydro_state_at_points
//!            └─ DensityGrid (N+1 × N+1, mass density)
//!     └─ log10(1e-5 + ρ[amu/cm³]) image + star overlay + limits/labels
//!            └─ Figure ── FigureBackend::{show, save}
//! ```
//!
//! # Core Modules
//!
//! ## Grid sampling (`density_map`)
//! Builds a uniform square grid of sample points at `z = 0`, asks the field
//! evaluator for the hydrodynamic state there and reshapes the density.
//!
//! ## Scene composition (`scene`)
//! Produces an explicit [`scene::Figure`] value: extent, log-density image,
//! star markers scaled by relative mass, inverted x limits, labels and title.
//! No process-wide "current figure" exists; the figure is handed to a backend.
//!
//! ## Rendering (`render`)
//! - **PNG**: `plotters` bitmap output for reports and batch runs
//! - **ASCII**: terminal display for headless sessions and log files
//!
//! ## Collaborators (`hydro`, `sph`, `stars`, `units`)
//! Traits for the field evaluator and the star collection, a kernel-interpolated
//! gas particle set, a `Vec`-backed star set and `uom` unit helpers for the
//! astronomical units involved (parsec, Myr, amu/cm³, km/s, solar masses).
//!
//! # Usage
//!
//! ```rust,no_run
//! use cloud_viz::render::AsciiBackend;
//! use cloud_viz::scene::{plot_hydro_and_stars, SceneOptions};
//! use cloud_viz::sph::UniformMedium;
//! use cloud_viz::stars::StarParticles;
//! use cloud_viz::units::{MassDensity, MassDensityExt, Time, TimeExt};
//!
//! let gas = UniformMedium::at_rest(MassDensity::from_amu_per_cubic_centimeter(100.0));
//! let stars = StarParticles::default();
//! let mut backend = AsciiBackend::stdout();
//!
//! let figure = plot_hydro_and_stars(
//!     Time::from_megayears(1.0),
//!     &gas,
//!     &stars,
//!     &SceneOptions::default(),
//!     &mut backend,
//! )?;
//! println!("{}", figure.title);
//! # Ok::<(), cloud_viz::VizError>(())
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result`] with a [`VizError`]. Failures
//! raised by the field evaluator are passed through to the caller untouched.

use thiserror::Error;

/// Error types for sampling, composition and rendering.
#[derive(Debug, Error)]
pub enum VizError {
    /// Grid parameters that cannot describe a sampling grid.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Generator or collaborator parameters outside their valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by a hydrodynamic field evaluator.
    #[error("Field evaluation failed: {0}")]
    FieldEvaluation(String),

    /// Arrays that should be index-aligned have different lengths.
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Drawing backend failure.
    ///
    /// Plotters errors are generic over the backend, so they are carried
    /// as their rendered message.
    #[error("Render error: {0}")]
    Render(String),

    /// File or stream I/O failure while writing a figure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard Result type for all visualization operations.
pub type Result<T> = std::result::Result<T, VizError>;

/// Check that a generator parameter is finite and strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(VizError::InvalidConfig(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

pub mod density_map;
pub mod hydro;
pub mod render;
pub mod scene;
pub mod sph;
pub mod stars;
pub mod units;
