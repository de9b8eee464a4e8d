//! Type-safe physical units for cloud visualization
//!
//! Quantities are carried as `uom` SI values; the extension traits below
//! add the astronomical units a star-formation run is usually reported in.

use std::ops::Mul;

use uom::si::length::{centimeter, meter};
use uom::si::mass::{dalton, gram, kilogram};
use uom::si::mass_density::gram_per_cubic_centimeter;
use uom::si::pressure::pascal;
use uom::si::time::year;
use uom::si::velocity::kilometer_per_second;

pub use uom::si::f64::{Length, Mass, MassDensity, Pressure, Time, Velocity};

/// Momentum per unit volume (ρv).
pub type MomentumDensity = <MassDensity as Mul<Velocity>>::Output;

/// Energy per unit volume. Dimensionally identical to pressure.
pub type EnergyDensity = Pressure;

/// IAU parsec in meters.
pub const PARSEC_M: f64 = 3.085_677_581_491_367_3e16;

/// Solar mass in kilograms.
pub const SOLAR_MASS_KG: f64 = 1.98892e30;

/// Extension trait for lengths on cloud scales
pub trait LengthExt {
    /// Create length from parsecs
    fn from_parsecs(pc: f64) -> Self;

    /// Get length in parsecs
    fn as_parsecs(&self) -> f64;

    /// Create length from centimeters
    fn from_centimeters(cm: f64) -> Self;

    /// Get length in centimeters
    fn as_centimeters(&self) -> f64;
}

/// Extension trait for simulation times
pub trait TimeExt {
    /// Create time from megayears
    fn from_megayears(myr: f64) -> Self;

    /// Get time in megayears
    fn as_megayears(&self) -> f64;

    /// Format as `"<value> Myr"`, keeping a trailing `.0` on whole numbers
    fn as_string_in_megayears(&self) -> String;
}

/// Extension trait for gas densities
pub trait MassDensityExt {
    /// Create density from a number density of atomic mass units per cm³
    fn from_amu_per_cubic_centimeter(n: f64) -> Self;

    /// Get density in atomic mass units per cm³
    fn as_amu_per_cubic_centimeter(&self) -> f64;
}

/// Extension trait for gas and stellar velocities
pub trait VelocityExt {
    /// Create velocity from km/s
    fn from_kilometers_per_second(kms: f64) -> Self;

    /// Get velocity in km/s
    fn as_kilometers_per_second(&self) -> f64;
}

/// Extension trait for particle masses
pub trait MassExt {
    /// Create mass from solar masses
    fn from_solar_masses(msun: f64) -> Self;

    /// Get mass in solar masses
    fn as_solar_masses(&self) -> f64;
}

impl LengthExt for Length {
    fn from_parsecs(pc: f64) -> Self {
        Length::new::<meter>(pc * PARSEC_M)
    }

    fn as_parsecs(&self) -> f64 {
        self.get::<meter>() / PARSEC_M
    }

    fn from_centimeters(cm: f64) -> Self {
        Length::new::<centimeter>(cm)
    }

    fn as_centimeters(&self) -> f64 {
        self.get::<centimeter>()
    }
}

impl TimeExt for Time {
    fn from_megayears(myr: f64) -> Self {
        Time::new::<year>(myr * 1.0e6)
    }

    fn as_megayears(&self) -> f64 {
        self.get::<year>() / 1.0e6
    }

    fn as_string_in_megayears(&self) -> String {
        format_megayears(self.as_megayears())
    }
}

impl MassDensityExt for MassDensity {
    fn from_amu_per_cubic_centimeter(n: f64) -> Self {
        let amu_grams = Mass::new::<dalton>(1.0).get::<gram>();
        MassDensity::new::<gram_per_cubic_centimeter>(n * amu_grams)
    }

    fn as_amu_per_cubic_centimeter(&self) -> f64 {
        let amu_grams = Mass::new::<dalton>(1.0).get::<gram>();
        self.get::<gram_per_cubic_centimeter>() / amu_grams
    }
}

impl VelocityExt for Velocity {
    fn from_kilometers_per_second(kms: f64) -> Self {
        Velocity::new::<kilometer_per_second>(kms)
    }

    fn as_kilometers_per_second(&self) -> f64 {
        self.get::<kilometer_per_second>()
    }
}

impl MassExt for Mass {
    fn from_solar_masses(msun: f64) -> Self {
        Mass::new::<kilogram>(msun * SOLAR_MASS_KG)
    }

    fn as_solar_masses(&self) -> f64 {
        self.get::<kilogram>() / SOLAR_MASS_KG
    }
}

/// Format a time already expressed in Myr, e.g. `2.0 Myr`, `0.25 Myr`.
pub fn format_megayears(myr: f64) -> String {
    format!("{myr:?} Myr")
}

/// Energy density in J/m³.
pub fn energy_density_from_si(joules_per_cubic_meter: f64) -> EnergyDensity {
    Pressure::new::<pascal>(joules_per_cubic_meter)
}
