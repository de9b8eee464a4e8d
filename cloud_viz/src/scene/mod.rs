//! Scene composition: log-density background plus star overlay.
//!
//! [`compose_scene`] builds a [`Figure`] describing everything that ends up on
//! the plot. [`plot_hydro_and_stars`] composes the figure and hands it to a
//! [`FigureBackend`], saving when a filename is configured and displaying
//! otherwise.
//!
//! # Orientation
//!
//! Three steps together decide where things land on screen and must be read
//! as one contract:
//! 1. The sampled grid is transposed so image rows follow y and columns follow x,
//!    with row 0 at the bottom (`origin = lower`).
//! 2. Stars are placed at their physical `(x, y)` in the same parsec frame as
//!    the image extent.
//! 3. The x limits are stored high-to-low, so the x axis increases to the left.
//!
//! A star sitting on a density peak therefore covers the peak's pixel
//! whichever way the axes are drawn.

use std::path::PathBuf;

use ndarray::Array2;
use plotters::style::{RGBColor, WHITE};

use crate::density_map::{make_map, MapGrid};
use crate::hydro::HydroFieldEvaluator;
use crate::render::FigureBackend;
use crate::stars::StarCollection;
use crate::units::{Length, LengthExt, MassExt, Time, TimeExt};
use crate::{Result, VizError};

/// Grid resolution used for every scene, independent of caller settings.
pub const SCENE_RESOLUTION: usize = 200;

/// Floor added to the density (amu/cm³) before taking the logarithm.
pub const DENSITY_FLOOR: f64 = 1.0e-5;

/// Resolution of a figure on screen.
pub const DISPLAY_DPI: u32 = 100;

/// Resolution used when a figure is written to a file.
pub const SAVE_DPI: u32 = 300;

/// Marker size given to a star of exactly the mean mass.
pub const MEAN_MARKER_SIZE: f64 = 3.0;

/// Prefix of the title used when no explicit title is given.
pub const DEFAULT_TITLE_PREFIX: &str = "Molecular cloud at time=";

/// Options for [`compose_scene`] and [`plot_hydro_and_stars`].
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Width of the plotted square, in parsecs.
    pub length: f64,

    /// Where to save the figure. `None` displays it instead.
    pub filename: Option<PathBuf>,

    /// Shift of the plotted region along x.
    pub offset_x: Option<Length>,

    /// Shift of the plotted region along y.
    pub offset_y: Option<Length>,

    /// Explicit title. Empty means the default time-stamped title.
    pub title: String,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            length: 10.0,
            filename: None,
            offset_x: None,
            offset_y: None,
            title: String::new(),
        }
    }
}

/// Image extent in parsecs: `[xmin, xmax] × [ymin, ymax]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    /// Square of width `length` centered on the origin, shifted by the offsets.
    pub fn centered(length: f64, offset_x: Option<Length>, offset_y: Option<Length>) -> Self {
        let dx = offset_x.map_or(0.0, |o| o.as_parsecs());
        let dy = offset_y.map_or(0.0, |o| o.as_parsecs());
        Self {
            xmin: -length / 2.0 + dx,
            xmax: length / 2.0 + dx,
            ymin: -length / 2.0 + dy,
            ymax: length / 2.0 + dy,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Scatter overlay of star particles.
#[derive(Debug, Clone)]
pub struct StarOverlay {
    /// Star x positions in parsecs.
    pub x: Vec<f64>,
    /// Star y positions in parsecs.
    pub y: Vec<f64>,
    /// Marker areas in points², `3 · m / mean(m)`.
    pub sizes: Vec<f64>,
    pub color: RGBColor,
    /// Marker edge width; zero draws no edge.
    pub edge_width: f64,
}

impl StarOverlay {
    /// Build the overlay from a non-empty collection; `None` when it is empty.
    ///
    /// Mass and position columns must have the same length.
    pub fn from_collection<S: StarCollection + ?Sized>(stars: &S) -> Result<Option<Self>> {
        if stars.is_empty() {
            return Ok(None);
        }

        let masses: Vec<f64> = stars.mass().iter().map(|m| m.as_solar_masses()).collect();
        let x: Vec<f64> = stars.x().iter().map(|x| x.as_parsecs()).collect();
        let y: Vec<f64> = stars.y().iter().map(|y| y.as_parsecs()).collect();
        for column in [&x, &y] {
            if column.len() != masses.len() {
                return Err(VizError::ShapeMismatch {
                    expected: masses.len(),
                    actual: column.len(),
                });
            }
        }

        let mean = masses.iter().sum::<f64>() / masses.len() as f64;
        let sizes = masses.iter().map(|m| MEAN_MARKER_SIZE * m / mean).collect();

        Ok(Some(Self {
            x,
            y,
            sizes,
            color: WHITE,
            edge_width: 0.0,
        }))
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(x, y, size)` triples.
    pub fn markers(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.sizes)
            .map(|((&x, &y), &s)| (x, y, s))
    }
}

/// Everything needed to draw one density/star plot.
#[derive(Debug, Clone)]
pub struct Figure {
    /// Figure size in inches.
    pub size_inches: (f64, f64),
    /// Output resolution in dots per inch.
    pub dpi: u32,
    /// `log10(floor + ρ)`, rows along y with row 0 at `ymin`, columns along x.
    pub image: Array2<f64>,
    pub extent: Extent,
    pub stars: Option<StarOverlay>,
    /// Displayed x range as `(left, right)`; stored inverted.
    pub x_limits: (f64, f64),
    /// Displayed y range as `(bottom, top)`.
    pub y_limits: (f64, f64),
    pub x_label: String,
    pub y_label: String,
    pub title: String,
}

impl Figure {
    /// Output size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.size_inches.0 * dpi).round() as u32,
            (self.size_inches.1 * dpi).round() as u32,
        )
    }

    /// Smallest and largest finite image value, `None` if there are none.
    pub fn image_range(&self) -> Option<(f64, f64)> {
        self.image
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// True when the x limits run from high to low.
    pub fn x_inverted(&self) -> bool {
        self.x_limits.0 > self.x_limits.1
    }
}

/// Title used when the caller gives none.
pub fn default_title(time: Time) -> String {
    format!("{DEFAULT_TITLE_PREFIX}{}", time.as_string_in_megayears())
}

/// `log10(DENSITY_FLOOR + ρ)` for densities in amu/cm³.
pub fn log_density(rho_amu_per_cc: &Array2<f64>) -> Array2<f64> {
    rho_amu_per_cc.mapv(|rho| (DENSITY_FLOOR + rho).log10())
}

/// Compose the density/star figure without drawing it.
///
/// Samples the gas with [`SCENE_RESOLUTION`] on the options' square, converts
/// density to a log image and attaches the star overlay, limits, labels and
/// title. Evaluator failures are returned unchanged.
pub fn compose_scene<E, S>(
    time: Time,
    sph: &E,
    stars: &S,
    options: &SceneOptions,
) -> Result<Figure>
where
    E: HydroFieldEvaluator + ?Sized,
    S: StarCollection + ?Sized,
{
    let grid = MapGrid {
        resolution: SCENE_RESOLUTION,
        length: options.length,
        offset_x: options.offset_x,
        offset_y: options.offset_y,
    };
    let rho = make_map(sph, &grid)?.transposed();

    let extent = Extent::centered(options.length, options.offset_x, options.offset_y);
    log::debug!(
        "Scene extent x: [{:.3}, {:.3}] pc, y: [{:.3}, {:.3}] pc",
        extent.xmin,
        extent.xmax,
        extent.ymin,
        extent.ymax
    );

    let image = log_density(&rho.in_amu_per_cubic_centimeter());
    let non_finite = image.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        log::warn!("{non_finite} density cells fell below the log floor");
    }

    let overlay = StarOverlay::from_collection(stars)?;
    if let Some(overlay) = &overlay {
        log::debug!("Overlaying {} stars", overlay.len());
    }

    let title = if options.title.is_empty() {
        default_title(time)
    } else {
        options.title.clone()
    };

    Ok(Figure {
        size_inches: (6.0, 6.0),
        dpi: DISPLAY_DPI,
        image,
        extent,
        stars: overlay,
        x_limits: (extent.xmax, extent.xmin),
        y_limits: (extent.ymin, extent.ymax),
        x_label: "x [pc]".to_string(),
        y_label: "y [pc]".to_string(),
        title,
    })
}

/// Compose the figure and send it to `backend`.
///
/// With `options.filename` set the figure is saved there at [`SAVE_DPI`];
/// otherwise it is shown. The figure as handed to the backend is returned.
pub fn plot_hydro_and_stars<E, S, B>(
    time: Time,
    sph: &E,
    stars: &S,
    options: &SceneOptions,
    backend: &mut B,
) -> Result<Figure>
where
    E: HydroFieldEvaluator + ?Sized,
    S: StarCollection + ?Sized,
    B: FigureBackend + ?Sized,
{
    let mut figure = compose_scene(time, sph, stars, options)?;
    match &options.filename {
        Some(path) => {
            figure.dpi = SAVE_DPI;
            backend.save(&figure, path)?;
        }
        None => backend.show(&figure)?,
    }
    Ok(figure)
}
