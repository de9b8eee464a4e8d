//! Star particle collections.

use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

use crate::units::{Length, LengthExt, Mass, MassExt};
use crate::{require_positive, Result, VizError};

/// Read access to a set of star particles.
///
/// `mass`, `x` and `y` are index-aligned.
pub trait StarCollection {
    fn is_empty(&self) -> bool;

    fn mass(&self) -> Vec<Mass>;

    fn x(&self) -> Vec<Length>;

    fn y(&self) -> Vec<Length>;
}

/// A single star particle. Only the planar position is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub mass: Mass,
    pub x: Length,
    pub y: Length,
}

impl Star {
    pub fn new(mass: Mass, x: Length, y: Length) -> Self {
        Self { mass, x, y }
    }

    /// Convenience constructor in solar masses and parsecs.
    pub fn from_solar_parsec(mass_msun: f64, x_pc: f64, y_pc: f64) -> Self {
        Self::new(
            Mass::from_solar_masses(mass_msun),
            Length::from_parsecs(x_pc),
            Length::from_parsecs(y_pc),
        )
    }
}

/// Parameters for a synthetic embedded cluster.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub count: usize,
    /// Standard deviation of positions along each axis.
    pub radius: Length,
    /// Median of the log-normal mass function.
    pub median_mass: Mass,
    /// Width of the mass function in natural-log units.
    pub mass_sigma: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            count: 100,
            radius: Length::from_parsecs(1.0),
            median_mass: Mass::from_solar_masses(0.5),
            mass_sigma: 1.0,
        }
    }
}

/// `Vec`-backed star collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarParticles {
    stars: Vec<Star>,
}

impl StarParticles {
    pub fn new(stars: Vec<Star>) -> Self {
        Self { stars }
    }

    pub fn push(&mut self, star: Star) {
        self.stars.push(star);
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Sample a Gaussian cluster with a log-normal mass function.
    pub fn gaussian_cluster<R: Rng>(config: &ClusterConfig, rng: &mut R) -> Result<Self> {
        let radius = require_positive("cluster radius", config.radius.as_parsecs())?;
        let median = require_positive("median star mass", config.median_mass.as_solar_masses())?;
        if !(config.mass_sigma.is_finite() && config.mass_sigma >= 0.0) {
            return Err(VizError::InvalidConfig(format!(
                "mass function width must be finite and non-negative, got {}",
                config.mass_sigma
            )));
        }
        let position = Normal::new(0.0, radius)
            .map_err(|e| VizError::InvalidConfig(format!("invalid cluster radius: {e}")))?;
        let mass = LogNormal::new(median.ln(), config.mass_sigma)
            .map_err(|e| VizError::InvalidConfig(format!("invalid mass function: {e}")))?;

        let stars = (0..config.count)
            .map(|_| {
                Star::from_solar_parsec(
                    mass.sample(rng),
                    position.sample(rng),
                    position.sample(rng),
                )
            })
            .collect();
        Ok(Self::new(stars))
    }
}

impl FromIterator<Star> for StarParticles {
    fn from_iter<I: IntoIterator<Item = Star>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl StarCollection for StarParticles {
    fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    fn mass(&self) -> Vec<Mass> {
        self.stars.iter().map(|s| s.mass).collect()
    }

    fn x(&self) -> Vec<Length> {
        self.stars.iter().map(|s| s.x).collect()
    }

    fn y(&self) -> Vec<Length> {
        self.stars.iter().map(|s| s.y).collect()
    }
}

impl<T: StarCollection + ?Sized> StarCollection for &T {
    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn mass(&self) -> Vec<Mass> {
        (**self).mass()
    }

    fn x(&self) -> Vec<Length> {
        (**self).x()
    }

    fn y(&self) -> Vec<Length> {
        (**self).y()
    }
}
