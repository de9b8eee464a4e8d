//! End-to-end orientation checks: grid transpose, star placement and the
//! inverted x axis must agree so that a star sitting on a density peak is
//! drawn on top of that peak.

use cloud_viz::hydro::{HydroFieldEvaluator, HydroSample, SamplePoints};
use cloud_viz::render::{render_ascii, AsciiConfig, FigureBackend, PngBackend};
use cloud_viz::scene::{compose_scene, Figure, SceneOptions};
use cloud_viz::sph::UniformMedium;
use cloud_viz::stars::{Star, StarParticles};
use cloud_viz::units::{LengthExt, MassDensity, MassDensityExt, Time, TimeExt};

const PEAK_X: f64 = 2.0;
const PEAK_Y: f64 = -1.5;
const PEAK_SIGMA: f64 = 0.5;

/// Gaussian density bump at (PEAK_X, PEAK_Y) pc over a 1 amu/cm³ background.
struct OffCenterBlob;

impl HydroFieldEvaluator for OffCenterBlob {
    fn hydro_state_at_points(&self, points: &SamplePoints) -> cloud_viz::Result<HydroSample> {
        let background = MassDensity::from_amu_per_cubic_centimeter(1.0);
        let mut sample = UniformMedium::at_rest(background).hydro_state_at_points(points)?;
        sample.density = points
            .x
            .iter()
            .zip(&points.y)
            .map(|(x, y)| {
                let dx = x.as_parsecs() - PEAK_X;
                let dy = y.as_parsecs() - PEAK_Y;
                let bump = (-(dx * dx + dy * dy) / (2.0 * PEAK_SIGMA * PEAK_SIGMA)).exp();
                MassDensity::from_amu_per_cubic_centimeter(1.0 + 1.0e4 * bump)
            })
            .collect();
        Ok(sample)
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn star_on_peak() -> StarParticles {
    [Star::from_solar_parsec(1.0, PEAK_X, PEAK_Y)]
        .into_iter()
        .collect()
}

fn compose(stars: &StarParticles) -> Figure {
    compose_scene(
        Time::from_megayears(1.0),
        &OffCenterBlob,
        stars,
        &SceneOptions::default(),
    )
    .expect("scene should compose")
}

#[test]
fn image_peak_lies_at_physical_peak() {
    init_logging();
    let figure = compose(&StarParticles::default());

    let ((row, col), _) = figure
        .image
        .indexed_iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap();

    let (rows, cols) = figure.image.dim();
    let dx = figure.extent.width() / cols as f64;
    let dy = figure.extent.height() / rows as f64;
    let x = figure.extent.xmin + (col as f64 + 0.5) * dx;
    let y = figure.extent.ymin + (row as f64 + 0.5) * dy;

    assert!((x - PEAK_X).abs() <= dx, "peak x {x} should be near {PEAK_X}");
    assert!((y - PEAK_Y).abs() <= dy, "peak y {y} should be near {PEAK_Y}");
}

#[test]
fn star_marker_shares_peak_coordinates() {
    init_logging();
    let figure = compose(&star_on_peak());
    let overlay = figure.stars.as_ref().expect("overlay present");
    let (x, y, size) = overlay.markers().next().unwrap();

    assert!((x - PEAK_X).abs() < 1e-9);
    assert!((y - PEAK_Y).abs() < 1e-9);
    assert!((size - 3.0).abs() < 1e-12);
    assert!(figure.x_inverted());
}

#[test]
fn ascii_star_covers_brightest_cell() {
    init_logging();
    let config = AsciiConfig::default();
    let top_char = config.density_chars.chars().last().unwrap();

    let cell_of = |figure: &Figure| {
        let (left, right) = figure.x_limits;
        let (bottom, top) = figure.y_limits;
        let c = ((PEAK_X - left) / (right - left) * config.width as f64) as usize;
        let r = ((top - PEAK_Y) / (top - bottom) * config.height as f64) as usize;
        (r, c)
    };
    let rows = |text: &str| -> Vec<Vec<char>> {
        text.lines()
            .filter(|l| l.starts_with("  |"))
            .map(|l| l[3..l.len() - 1].chars().collect())
            .collect()
    };

    let bare = compose(&StarParticles::default());
    let (r, c) = cell_of(&bare);
    let bare_rows = rows(&render_ascii(&bare, &config).unwrap());
    assert_eq!(bare_rows[r][c], top_char);

    // the mirrored column is dim background
    let mirrored = config.width - 1 - c;
    assert_ne!(bare_rows[r][mirrored], top_char);

    let with_star = compose(&star_on_peak());
    let star_rows = rows(&render_ascii(&with_star, &config).unwrap());
    assert_eq!(star_rows[r][c], config.star_char);
}

#[test]
fn png_star_drawn_over_peak() {
    init_logging();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("orientation.png");

    let figure = compose(&star_on_peak());
    let mut backend = PngBackend::new();
    backend.save(&figure, &path).unwrap();

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), figure.pixel_size());

    // Plot area: 10 px margin, 40 px caption band, 50 px y labels, 40 px x labels.
    let (width, height) = figure.pixel_size();
    let (px0, px1) = (60.0, width as f64 - 10.0);
    let (py0, py1) = (50.0, height as f64 - 50.0);
    let (left, right) = figure.x_limits;
    let (bottom, top) = figure.y_limits;
    let px = px0 + (PEAK_X - left) / (right - left) * (px1 - px0);
    let py = py0 + (top - PEAK_Y) / (top - bottom) * (py1 - py0);

    let has_white_near = |cx: f64, cy: f64| {
        let (cx, cy) = (cx.round() as i64, cy.round() as i64);
        (-3..=3).any(|dy| {
            (-3..=3).any(|dx| {
                let (x, y) = (cx + dx, cy + dy);
                x >= 0
                    && y >= 0
                    && (x as u32) < width
                    && (y as u32) < height
                    && image.get_pixel(x as u32, y as u32).0 == [255, 255, 255]
            })
        })
    };

    assert!(has_white_near(px, py), "star marker expected near ({px}, {py})");
    let mirrored_px = px0 + px1 - px;
    assert!(!has_white_near(mirrored_px, py));
}
