//! Reference field evaluators.
//!
//! [`GasParticles`] reconstructs the gas state from a set of SPH particles
//! with the cubic spline (M4) kernel. [`UniformMedium`] returns the same
//! state everywhere and is mostly useful for tests and quick looks.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use uom::si::available_energy::joule_per_kilogram;
use uom::si::f64::AvailableEnergy;
use uom::si::length::meter;
use uom::si::mass::kilogram;
use uom::si::mass_density::kilogram_per_cubic_meter;
use uom::si::velocity::meter_per_second;

use crate::hydro::{HydroFieldEvaluator, HydroSample, SamplePoints};
use crate::units::{
    energy_density_from_si, EnergyDensity, Length, LengthExt, Mass, MassDensity,
    MomentumDensity, Velocity, VelocityExt,
};
use crate::{require_positive, Result, VizError};

/// Cubic spline kernel in three dimensions, normalized to unit volume integral.
///
/// Compact support of `2h`.
pub fn cubic_spline_kernel(r: f64, h: f64) -> f64 {
    let q = r / h;
    let sigma = 1.0 / (PI * h * h * h);
    if q < 1.0 {
        sigma * (1.0 - 1.5 * q * q + 0.75 * q * q * q)
    } else if q < 2.0 {
        let t = 2.0 - q;
        sigma * 0.25 * t * t * t
    } else {
        0.0
    }
}

/// A single gas particle.
#[derive(Debug, Clone, Copy)]
pub struct GasParticle {
    pub position: [Length; 3],
    pub velocity: [Velocity; 3],
    pub mass: Mass,
    pub smoothing_length: Length,
    /// Specific internal energy.
    pub internal_energy: AvailableEnergy,
}

/// Cached SI view of a particle, so the interpolation loop stays in plain floats.
#[derive(Debug, Clone, Copy)]
struct RawParticle {
    pos: [f64; 3],
    vel: [f64; 3],
    mass: f64,
    h: f64,
    u: f64,
}

impl From<&GasParticle> for RawParticle {
    fn from(p: &GasParticle) -> Self {
        Self {
            pos: p.position.map(|c| c.get::<meter>()),
            vel: p.velocity.map(|c| c.get::<meter_per_second>()),
            mass: p.mass.get::<kilogram>(),
            h: p.smoothing_length.get::<meter>(),
            u: p.internal_energy.get::<joule_per_kilogram>(),
        }
    }
}

/// Parameters for a synthetic Gaussian gas cloud.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Number of gas particles.
    pub particles: usize,
    /// Total gas mass.
    pub total_mass: Mass,
    /// Standard deviation of particle positions along each axis.
    pub radius: Length,
    /// One-dimensional velocity dispersion.
    pub velocity_dispersion: Velocity,
    /// Isothermal sound speed, sets the internal energy.
    pub sound_speed: Velocity,
}

impl Default for CloudConfig {
    fn default() -> Self {
        use crate::units::MassExt;
        Self {
            particles: 1000,
            total_mass: Mass::from_solar_masses(1000.0),
            radius: Length::from_parsecs(1.5),
            velocity_dispersion: Velocity::from_kilometers_per_second(1.0),
            sound_speed: Velocity::from_kilometers_per_second(0.2),
        }
    }
}

/// SPH gas particle set acting as a field evaluator.
///
/// Gather formulation: each particle contributes with its own smoothing length.
/// Evaluation is brute force over all particles.
#[derive(Debug, Clone, Default)]
pub struct GasParticles {
    particles: Vec<GasParticle>,
    raw: Vec<RawParticle>,
}

impl GasParticles {
    pub fn new(particles: Vec<GasParticle>) -> Self {
        let raw = particles.iter().map(RawParticle::from).collect();
        Self { particles, raw }
    }

    /// Sample a Gaussian cloud centered on the origin.
    ///
    /// Smoothing lengths are set so that a particle at the cloud center
    /// overlaps roughly 50 neighbours.
    pub fn gaussian_cloud<R: Rng>(config: &CloudConfig, rng: &mut R) -> Result<Self> {
        if config.particles == 0 {
            return Err(VizError::InvalidConfig(
                "gas cloud needs at least one particle".to_string(),
            ));
        }
        require_positive("cloud mass", config.total_mass.get::<kilogram>())?;
        let radius = require_positive("cloud radius", config.radius.get::<meter>())?;
        let sigma_v = require_positive(
            "velocity dispersion",
            config.velocity_dispersion.get::<meter_per_second>(),
        )?;
        let cs = require_positive("sound speed", config.sound_speed.get::<meter_per_second>())?;
        let position_dist = Normal::new(0.0, radius)
            .map_err(|e| VizError::InvalidConfig(format!("invalid cloud radius: {e}")))?;
        let velocity_dist = Normal::new(0.0, sigma_v).map_err(|e| {
            VizError::InvalidConfig(format!("invalid velocity dispersion: {e}"))
        })?;

        let n = config.particles as f64;
        let mass = config.total_mass / n;
        // Peak density of a 3D Gaussian is M / ((2π)^{3/2} σ³); solve n_ngb = (4/3)π(2h)³ ρ / m.
        let peak_number_density = n / ((2.0 * PI).powf(1.5) * radius.powi(3));
        let h = (50.0 * 3.0 / (32.0 * PI * peak_number_density)).cbrt();
        let internal_energy = AvailableEnergy::new::<joule_per_kilogram>(1.5 * cs * cs);

        let particles = (0..config.particles)
            .map(|_| GasParticle {
                position: [(); 3].map(|_| Length::new::<meter>(position_dist.sample(rng))),
                velocity: [(); 3]
                    .map(|_| Velocity::new::<meter_per_second>(velocity_dist.sample(rng))),
                mass,
                smoothing_length: Length::new::<meter>(h),
                internal_energy,
            })
            .collect();

        log::debug!(
            "Sampled gas cloud: {} particles, h = {:.4} pc",
            config.particles,
            Length::new::<meter>(h).as_parsecs()
        );
        Ok(Self::new(particles))
    }

    pub fn particles(&self) -> &[GasParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Kernel sums at one point: density, momentum density, energy density (SI).
    fn interpolate(&self, point: [f64; 3], frame_velocity: [f64; 3]) -> (f64, [f64; 3], f64) {
        let mut rho = 0.0;
        let mut momentum = [0.0; 3];
        let mut energy = 0.0;

        for p in &self.raw {
            let dx = point[0] - p.pos[0];
            let dy = point[1] - p.pos[1];
            let dz = point[2] - p.pos[2];
            let r = (dx * dx + dy * dy + dz * dz).sqrt();
            let w = cubic_spline_kernel(r, p.h);
            if w == 0.0 {
                continue;
            }

            let mw = p.mass * w;
            let v = [
                p.vel[0] - frame_velocity[0],
                p.vel[1] - frame_velocity[1],
                p.vel[2] - frame_velocity[2],
            ];
            rho += mw;
            for axis in 0..3 {
                momentum[axis] += mw * v[axis];
            }
            let v2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
            energy += mw * (p.u + 0.5 * v2);
        }

        (rho, momentum, energy)
    }
}

impl HydroFieldEvaluator for GasParticles {
    fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample> {
        points.validate()?;

        let n = points.len();
        let mut sample = HydroSample::with_capacity(n);
        for i in 0..n {
            let position = [
                points.x[i].get::<meter>(),
                points.y[i].get::<meter>(),
                points.z[i].get::<meter>(),
            ];
            if position.iter().any(|c| !c.is_finite()) {
                return Err(VizError::FieldEvaluation(format!(
                    "non-finite sample position at index {i}"
                )));
            }
            let frame_velocity = [
                points.vx[i].get::<meter_per_second>(),
                points.vy[i].get::<meter_per_second>(),
                points.vz[i].get::<meter_per_second>(),
            ];

            let (rho, momentum, energy) = self.interpolate(position, frame_velocity);
            sample.push_si(rho, momentum, energy);
        }
        Ok(sample)
    }
}

impl HydroSample {
    fn with_capacity(n: usize) -> Self {
        Self {
            density: Vec::with_capacity(n),
            momentum_x: Vec::with_capacity(n),
            momentum_y: Vec::with_capacity(n),
            momentum_z: Vec::with_capacity(n),
            energy_density: Vec::with_capacity(n),
        }
    }

    fn push_si(&mut self, rho: f64, momentum: [f64; 3], energy: f64) {
        self.density
            .push(MassDensity::new::<kilogram_per_cubic_meter>(rho));
        self.momentum_x.push(momentum_density_from_si(momentum[0]));
        self.momentum_y.push(momentum_density_from_si(momentum[1]));
        self.momentum_z.push(momentum_density_from_si(momentum[2]));
        self.energy_density.push(energy_density_from_si(energy));
    }
}

fn momentum_density_from_si(kg_per_m2_s: f64) -> MomentumDensity {
    MassDensity::new::<kilogram_per_cubic_meter>(kg_per_m2_s)
        * Velocity::new::<meter_per_second>(1.0)
}

/// Medium with the same state at every point.
#[derive(Debug, Clone, Copy)]
pub struct UniformMedium {
    pub density: MassDensity,
    pub velocity: [Velocity; 3],
    pub energy_density: EnergyDensity,
}

impl UniformMedium {
    /// Static gas with no internal energy.
    pub fn at_rest(density: MassDensity) -> Self {
        Self {
            density,
            velocity: [Velocity::new::<meter_per_second>(0.0); 3],
            energy_density: energy_density_from_si(0.0),
        }
    }
}

impl HydroFieldEvaluator for UniformMedium {
    fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample> {
        points.validate()?;

        let n = points.len();
        let [vx, vy, vz] = self.velocity;
        Ok(HydroSample {
            density: vec![self.density; n],
            momentum_x: vec![self.density * vx; n],
            momentum_y: vec![self.density * vy; n],
            momentum_z: vec![self.density * vz; n],
            energy_density: vec![self.energy_density; n],
        })
    }
}
