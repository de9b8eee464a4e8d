//! Hydrodynamic field evaluator interface.
//!
//! A field evaluator answers "what is the gas state at these points" for a
//! batch of positions and velocities. SPH codes reconstruct the state by
//! kernel-weighted interpolation over neighbouring particles; grid codes
//! interpolate cells. Either way the caller only sees the five fields below.

use crate::units::{EnergyDensity, Length, MassDensity, MomentumDensity, Velocity};
use crate::{Result, VizError};

/// Batch of sample points, stored as six index-aligned columns.
///
/// Velocities are part of the query because some evaluators return the
/// state in the frame moving with the sample point.
#[derive(Debug, Clone, Default)]
pub struct SamplePoints {
    pub x: Vec<Length>,
    pub y: Vec<Length>,
    pub z: Vec<Length>,
    pub vx: Vec<Velocity>,
    pub vy: Vec<Velocity>,
    pub vz: Vec<Velocity>,
}

impl SamplePoints {
    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check that all six columns have the same length.
    pub fn validate(&self) -> Result<()> {
        let expected = self.x.len();
        let lengths = [
            self.y.len(),
            self.z.len(),
            self.vx.len(),
            self.vy.len(),
            self.vz.len(),
        ];
        match lengths.into_iter().find(|&len| len != expected) {
            Some(actual) => Err(VizError::ShapeMismatch { expected, actual }),
            None => Ok(()),
        }
    }
}

/// Gas state returned by a field evaluator, one entry per sample point.
///
/// Field order mirrors the conventional SPH query result:
/// density, momentum density (x, y, z), energy density.
#[derive(Debug, Clone)]
pub struct HydroSample {
    pub density: Vec<MassDensity>,
    pub momentum_x: Vec<MomentumDensity>,
    pub momentum_y: Vec<MomentumDensity>,
    pub momentum_z: Vec<MomentumDensity>,
    pub energy_density: Vec<EnergyDensity>,
}

impl HydroSample {
    /// Number of sampled points.
    pub fn len(&self) -> usize {
        self.density.len()
    }

    pub fn is_empty(&self) -> bool {
        self.density.is_empty()
    }

    /// Check that every field holds exactly `expected` values.
    pub fn validate(&self, expected: usize) -> Result<()> {
        let lengths = [
            self.density.len(),
            self.momentum_x.len(),
            self.momentum_y.len(),
            self.momentum_z.len(),
            self.energy_density.len(),
        ];
        match lengths.into_iter().find(|&len| len != expected) {
            Some(actual) => Err(VizError::ShapeMismatch { expected, actual }),
            None => Ok(()),
        }
    }
}

/// Source of hydrodynamic state at arbitrary points.
///
/// Implementations report their own failures (points outside the domain,
/// a dead solver process) as [`VizError::FieldEvaluation`]; callers pass
/// them through unchanged.
pub trait HydroFieldEvaluator {
    /// Evaluate the gas state at every point in `points`.
    fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample>;
}

impl<T: HydroFieldEvaluator + ?Sized> HydroFieldEvaluator for &T {
    fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample> {
        (**self).hydro_state_at_points(points)
    }
}

impl<T: HydroFieldEvaluator + ?Sized> HydroFieldEvaluator for Box<T> {
    fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample> {
        (**self).hydro_state_at_points(points)
    }
}
