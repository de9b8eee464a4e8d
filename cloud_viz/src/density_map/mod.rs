//! Density map sampling of a hydrodynamic field on a regular grid.
//!
//! This module slices the gas through the `z = 0` mid-plane: it lays out a
//! square grid of sample points, asks a [`HydroFieldEvaluator`] for the gas
//! state at each one, and keeps the density as a 2D array.
//!
//! # Grid Geometry
//!
//! For resolution `N` and span `L` (in parsecs) the grid holds `(N+1)²`
//! points. Along each axis the sample coordinate for index `k ∈ [0, N]` is
//!
//! ```text
//! coord_k = L · (k − N/2) / N
//! ```
//!
//! so the first and last samples sit exactly on `−L/2` and `+L/2`, whatever
//! `N` is. An optional planar offset moves the whole square.
//!
//! # Memory Layout
//!
//! Points are generated row-major with the x index varying slowest, and the
//! density comes back in the same order. The returned array is indexed
//! `[x_index, y_index]`; transpose it before drawing as an image with rows
//! along y.
//!
//! # Usage
//!
//! ```rust
//! use cloud_viz::density_map::{make_map, MapGrid};
//! use cloud_viz::sph::UniformMedium;
//! use cloud_viz::units::{MassDensity, MassDensityExt};
//!
//! let gas = UniformMedium::at_rest(MassDensity::from_amu_per_cubic_centimeter(1.0));
//! let grid = MapGrid {
//!     resolution: 2,
//!     length: 2.0,
//!     ..Default::default()
//! };
//!
//! let map = make_map(&gas, &grid)?;
//! assert_eq!(map.shape(), (3, 3));
//! # Ok::<(), cloud_viz::VizError>(())
//! ```

use ndarray::Array2;

use crate::hydro::{HydroFieldEvaluator, SamplePoints};
use crate::units::{Length, LengthExt, MassDensity, MassDensityExt, Velocity, VelocityExt};
use crate::{Result, VizError};

/// Square sampling grid in the `z = 0` plane.
#[derive(Debug, Clone)]
pub struct MapGrid {
    /// Number of intervals per axis; the grid has `resolution + 1` samples per axis.
    pub resolution: usize,

    /// Full width of the sampled square, in parsecs.
    pub length: f64,

    /// Shift of the square's center along x.
    pub offset_x: Option<Length>,

    /// Shift of the square's center along y.
    pub offset_y: Option<Length>,
}

impl Default for MapGrid {
    fn default() -> Self {
        Self {
            resolution: 100,
            length: 1.0,
            offset_x: None,
            offset_y: None,
        }
    }
}

impl MapGrid {
    /// Samples per axis.
    pub fn samples_per_axis(&self) -> usize {
        self.resolution + 1
    }

    /// Axis coordinate of sample `index`, in parsecs and before any offset.
    pub fn axis_coordinate(&self, index: usize) -> f64 {
        let n = self.resolution as f64;
        self.length * (index as f64 - n / 2.0) / n
    }

    fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(VizError::InvalidGrid(
                "resolution must be at least 1".to_string(),
            ));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(VizError::InvalidGrid(format!(
                "span must be positive and finite, got {}",
                self.length
            )));
        }
        Ok(())
    }
}

/// Sampled gas density, indexed `[x_index, y_index]`.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    values: Array2<MassDensity>,
}

impl DensityGrid {
    pub fn new(values: Array2<MassDensity>) -> Self {
        Self { values }
    }

    /// Array shape as `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<MassDensity> {
        &self.values
    }

    pub fn into_values(self) -> Array2<MassDensity> {
        self.values
    }

    /// Swap the two grid axes.
    pub fn transposed(&self) -> Self {
        Self {
            values: self.values.t().to_owned(),
        }
    }

    /// Densities converted to atomic mass units per cm³.
    pub fn in_amu_per_cubic_centimeter(&self) -> Array2<f64> {
        self.values.mapv(|rho| rho.as_amu_per_cubic_centimeter())
    }
}

/// Lay out the sample points for `grid`, flattened row-major.
///
/// Positions carry parsec-based lengths, `z` is zero, and all velocities are
/// zero km/s. Offsets are added after the grid is built.
pub fn sample_points(grid: &MapGrid) -> SamplePoints {
    let samples = grid.samples_per_axis();
    let count = samples * samples;

    let mut x = Vec::with_capacity(count);
    let mut y = Vec::with_capacity(count);
    for i in 0..samples {
        for j in 0..samples {
            x.push(Length::from_parsecs(grid.axis_coordinate(i)));
            y.push(Length::from_parsecs(grid.axis_coordinate(j)));
        }
    }

    if let Some(offset) = grid.offset_x {
        x.iter_mut().for_each(|v| *v += offset);
    }
    if let Some(offset) = grid.offset_y {
        y.iter_mut().for_each(|v| *v += offset);
    }

    let zero_velocity = Velocity::from_kilometers_per_second(0.0);
    SamplePoints {
        x,
        y,
        z: vec![Length::from_parsecs(0.0); count],
        vx: vec![zero_velocity; count],
        vy: vec![zero_velocity; count],
        vz: vec![zero_velocity; count],
    }
}

/// Sample the gas density on `grid` through the `z = 0` plane.
///
/// Returns an `(N+1) × (N+1)` array in the physical density units the
/// evaluator reports. Momentum and energy densities are discarded.
/// Evaluator errors are returned unchanged.
pub fn make_map<E>(sph: &E, grid: &MapGrid) -> Result<DensityGrid>
where
    E: HydroFieldEvaluator + ?Sized,
{
    grid.validate()?;

    let points = sample_points(grid);
    log::debug!(
        "Sampling density on {0}x{0} grid spanning {1} pc",
        grid.samples_per_axis(),
        grid.length
    );

    let state = sph.hydro_state_at_points(&points)?;
    state.validate(points.len())?;

    let samples = grid.samples_per_axis();
    let values = Array2::from_shape_vec((samples, samples), state.density).map_err(|_| {
        VizError::ShapeMismatch {
            expected: points.len(),
            actual: samples * samples,
        }
    })?;

    Ok(DensityGrid::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydro::HydroSample;
    use crate::sph::UniformMedium;
    use approx::assert_relative_eq;
    use uom::si::mass_density::kilogram_per_cubic_meter;

    fn unit_medium() -> UniformMedium {
        UniformMedium::at_rest(MassDensity::from_amu_per_cubic_centimeter(1.0))
    }

    /// Reports the sampled x coordinate (in pc) as the density in kg/m³.
    struct XEcho;

    impl HydroFieldEvaluator for XEcho {
        fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample> {
            let mut sample = unit_medium().hydro_state_at_points(points)?;
            sample.density = points
                .x
                .iter()
                .map(|x| MassDensity::new::<kilogram_per_cubic_meter>(x.as_parsecs()))
                .collect();
            Ok(sample)
        }
    }

    struct Failing;

    impl HydroFieldEvaluator for Failing {
        fn hydro_state_at_points(&self, _points: &SamplePoints) -> Result<HydroSample> {
            Err(VizError::FieldEvaluation("solver not running".to_string()))
        }
    }

    struct Truncating;

    impl HydroFieldEvaluator for Truncating {
        fn hydro_state_at_points(&self, points: &SamplePoints) -> Result<HydroSample> {
            let mut sample = unit_medium().hydro_state_at_points(points)?;
            sample.density.pop();
            Ok(sample)
        }
    }

    #[test]
    fn test_shape_for_several_resolutions() {
        for resolution in [1, 2, 7, 10, 50] {
            let grid = MapGrid {
                resolution,
                ..Default::default()
            };
            let map = make_map(&unit_medium(), &grid).unwrap();
            assert_eq!(map.shape(), (resolution + 1, resolution + 1));
        }
    }

    #[test]
    fn test_uniform_density_three_by_three() {
        let grid = MapGrid {
            resolution: 2,
            length: 2.0,
            ..Default::default()
        };
        let map = make_map(&unit_medium(), &grid).unwrap();

        assert_eq!(map.shape(), (3, 3));
        for value in map.in_amu_per_cubic_centimeter().iter() {
            assert_relative_eq!(*value, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_grid_symmetric_without_offset() {
        for resolution in [1, 2, 5, 100] {
            let grid = MapGrid {
                resolution,
                length: 3.0,
                ..Default::default()
            };
            let first = grid.axis_coordinate(0);
            let last = grid.axis_coordinate(resolution);
            assert_relative_eq!(first, -1.5, epsilon = 1e-12);
            assert_relative_eq!(first, -last, epsilon = 1e-12);
        }

        let points = sample_points(&MapGrid {
            resolution: 4,
            length: 2.0,
            ..Default::default()
        });
        let n = points.len();
        assert_relative_eq!(
            points.x[0].as_parsecs(),
            -points.x[n - 1].as_parsecs(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            points.y[0].as_parsecs(),
            -points.y[n - 1].as_parsecs(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_points_flattened_row_major() {
        let grid = MapGrid {
            resolution: 2,
            length: 2.0,
            ..Default::default()
        };
        let points = sample_points(&grid);
        assert_eq!(points.len(), 9);

        // x varies slowest, y fastest
        let xs: Vec<f64> = points.x.iter().map(|v| v.as_parsecs()).collect();
        let ys: Vec<f64> = points.y.iter().map(|v| v.as_parsecs()).collect();
        let expected_x = [-1.0, -1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let expected_y = [-1.0, 0.0, 1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0];
        for k in 0..9 {
            assert_relative_eq!(xs[k], expected_x[k], epsilon = 1e-12);
            assert_relative_eq!(ys[k], expected_y[k], epsilon = 1e-12);
        }

        assert!(points.z.iter().all(|z| z.as_parsecs() == 0.0));
        assert!(points
            .vx
            .iter()
            .chain(&points.vy)
            .chain(&points.vz)
            .all(|v| v.as_kilometers_per_second() == 0.0));
    }

    #[test]
    fn test_offset_shifts_only_x() {
        let base = MapGrid {
            resolution: 4,
            length: 2.0,
            ..Default::default()
        };
        let shifted = MapGrid {
            offset_x: Some(Length::from_parsecs(0.75)),
            ..base.clone()
        };

        let a = sample_points(&base);
        let b = sample_points(&shifted);
        for k in 0..a.len() {
            assert_relative_eq!(
                b.x[k].as_parsecs() - a.x[k].as_parsecs(),
                0.75,
                epsilon = 1e-12
            );
            assert_relative_eq!(b.y[k].as_parsecs(), a.y[k].as_parsecs(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_offset_y() {
        let grid = MapGrid {
            resolution: 2,
            length: 2.0,
            offset_y: Some(Length::from_parsecs(-3.0)),
            ..Default::default()
        };
        let points = sample_points(&grid);
        assert_relative_eq!(points.y[0].as_parsecs(), -4.0, epsilon = 1e-12);
        assert_relative_eq!(points.y[2].as_parsecs(), -2.0, epsilon = 1e-12);
        assert_relative_eq!(points.x[0].as_parsecs(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reshape_indexes_x_then_y() {
        let grid = MapGrid {
            resolution: 2,
            length: 2.0,
            ..Default::default()
        };
        let map = make_map(&XEcho, &grid).unwrap();
        let raw = map.values().mapv(|rho| rho.get::<kilogram_per_cubic_meter>());

        // first index follows x
        assert_relative_eq!(raw[[0, 2]], -1.0, epsilon = 1e-9);
        assert_relative_eq!(raw[[2, 0]], 1.0, epsilon = 1e-9);

        let transposed = map
            .transposed()
            .values()
            .mapv(|rho| rho.get::<kilogram_per_cubic_meter>());
        assert_relative_eq!(transposed[[0, 2]], 1.0, epsilon = 1e-9);
        assert_relative_eq!(transposed[[2, 0]], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_evaluator_error_propagates() {
        let result = make_map(&Failing, &MapGrid::default());
        match result {
            Err(VizError::FieldEvaluation(msg)) => assert_eq!(msg, "solver not running"),
            other => panic!("expected evaluator error, got {other:?}"),
        }
    }

    #[test]
    fn test_short_result_rejected() {
        let grid = MapGrid {
            resolution: 3,
            ..Default::default()
        };
        let result = make_map(&Truncating, &grid);
        assert!(matches!(
            result,
            Err(VizError::ShapeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let zero = MapGrid {
            resolution: 0,
            ..Default::default()
        };
        assert!(matches!(
            make_map(&unit_medium(), &zero),
            Err(VizError::InvalidGrid(_))
        ));

        let negative = MapGrid {
            length: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            make_map(&unit_medium(), &negative),
            Err(VizError::InvalidGrid(_))
        ));
    }
}
