//! PNG output through `plotters`.
//!
//! The density image is painted cell by cell as filled rectangles in data
//! coordinates, then stars are drawn as filled circles. Plotters axes always
//! run low to high, so an inverted x range is drawn by mirroring every x
//! coordinate and relabelling the ticks.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::FigureBackend;
use crate::scene::Figure;
use crate::{Result, VizError};

/// Anchor colours of the viridis colormap, low to high.
const VIRIDIS: [(u8, u8, u8); 6] = [
    (68, 1, 84),
    (65, 68, 135),
    (42, 120, 142),
    (34, 168, 132),
    (122, 209, 81),
    (253, 231, 37),
];

/// PNG backend configuration
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// File written by `show`, since there is no window to open.
    pub display_path: PathBuf,
    /// Caption font size in pixels
    pub caption_size: u32,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            display_path: PathBuf::from("plots/molecular_cloud.png"),
            caption_size: 20,
        }
    }
}

/// Backend writing figures as PNG files.
#[derive(Debug, Default)]
pub struct PngBackend {
    config: PngConfig,
    written: Vec<PathBuf>,
}

impl PngBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PngConfig) -> Self {
        Self {
            config,
            written: Vec::new(),
        }
    }

    /// Paths written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FigureBackend for PngBackend {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        let path = self.config.display_path.clone();
        self.save(figure, &path)
    }

    fn save(&mut self, figure: &Figure, path: &Path) -> Result<()> {
        draw_figure(figure, path, self.config.caption_size)?;
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> VizError {
    VizError::Render(e.to_string())
}

/// Map `t ∈ [0, 1]` onto the viridis colormap. NaN maps to the lowest colour.
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f64;

    let (r0, g0, b0) = VIRIDIS[i];
    let (r1, g1, b1) = VIRIDIS[i + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Marker radius in pixels for a matplotlib-style marker area in points².
pub fn marker_radius_px(size: f64, dpi: u32) -> i32 {
    let radius = size.max(0.0).sqrt() / 2.0 * dpi as f64 / 72.0;
    radius.round().max(1.0) as i32
}

/// Render `figure` to a PNG at `path`, creating parent directories.
pub fn render_png(figure: &Figure, path: &Path) -> Result<()> {
    draw_figure(figure, path, PngConfig::default().caption_size)
}

fn draw_figure(figure: &Figure, path: &Path, caption_size: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let (width, _) = figure.pixel_size();
    let root = BitMapBackend::new(path, figure.pixel_size()).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (left, right) = figure.x_limits;
    let (x_lo, x_hi) = (left.min(right), left.max(right));
    let (bottom, top) = figure.y_limits;
    let inverted = figure.x_inverted();
    let screen_x = move |x: f64| if inverted { x_lo + x_hi - x } else { x };

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .margin_top(10 + 2 * caption_size as i32)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, bottom..top)
        .map_err(render_err)?;

    let (lo, hi) = figure.image_range().unwrap_or((0.0, 1.0));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let extent = figure.extent;
    let (rows, cols) = figure.image.dim();
    let dx = extent.width() / cols as f64;
    let dy = extent.height() / rows as f64;

    // row 0 sits at ymin
    chart
        .draw_series(figure.image.indexed_iter().map(|((row, col), &value)| {
            let xa = screen_x(extent.xmin + col as f64 * dx);
            let xb = screen_x(extent.xmin + (col + 1) as f64 * dx);
            let y0 = extent.ymin + row as f64 * dy;
            let y1 = y0 + dy;
            let color = viridis((value - lo) / span);
            Rectangle::new([(xa.min(xb), y0), (xa.max(xb), y1)], color.filled())
        }))
        .map_err(render_err)?;

    if let Some(overlay) = &figure.stars {
        let color = overlay.color;
        let dpi = figure.dpi;
        chart
            .draw_series(
                overlay
                    .markers()
                    .filter(|&(x, y, _)| x >= x_lo && x <= x_hi && y >= bottom && y <= top)
                    .map(|(x, y, size)| {
                        Circle::new((screen_x(x), y), marker_radius_px(size, dpi), color.filled())
                    }),
            )
            .map_err(render_err)?;
    }

    // Text needs a system font; the image is still useful without it.
    let annotated = (|| -> Result<()> {
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .x_label_formatter(&|v| format!("{:.1}", screen_x(*v)))
            .y_label_formatter(&|v| format!("{v:.1}"))
            .draw()
            .map_err(render_err)?;

        let caption = TextStyle::from(("sans-serif", caption_size as i32).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw_text(&figure.title, &caption, ((width / 2) as i32, 10))
            .map_err(render_err)?;
        Ok(())
    })();
    if let Err(e) = annotated {
        log::warn!("Figure labels skipped: {e}");
    }

    root.present().map_err(render_err)?;
    log::info!("Figure saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{compose_scene, SceneOptions};
    use crate::sph::UniformMedium;
    use crate::stars::{Star, StarParticles};
    use crate::units::{MassDensity, MassDensityExt, Time, TimeExt};
    use tempfile::TempDir;

    fn small_figure() -> Figure {
        let gas = UniformMedium::at_rest(MassDensity::from_amu_per_cubic_centimeter(10.0));
        let stars: StarParticles = [
            Star::from_solar_parsec(1.0, 1.0, 1.0),
            Star::from_solar_parsec(4.0, -2.0, 0.5),
        ]
        .into_iter()
        .collect();
        compose_scene(
            Time::from_megayears(0.5),
            &gas,
            &stars,
            &SceneOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.0), RGBColor(68, 1, 84));
        assert_eq!(viridis(1.0), RGBColor(253, 231, 37));
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
    }

    #[test]
    fn test_marker_radius() {
        // 3 pt² at 72 dpi is under a pixel; never drawn smaller than one
        assert_eq!(marker_radius_px(3.0, 72), 1);
        assert_eq!(marker_radius_px(400.0, 72), 10);
        assert_eq!(marker_radius_px(400.0, 144), 20);
    }

    #[test]
    fn test_save_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cloud.png");

        let mut backend = PngBackend::new();
        backend.save(&small_figure(), &path).unwrap();

        assert!(path.exists());
        assert_eq!(backend.written(), &[path.clone()]);
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_show_writes_display_path() {
        let dir = TempDir::new().unwrap();
        let display_path = dir.path().join("shown.png");
        let mut backend = PngBackend::with_config(PngConfig {
            display_path: display_path.clone(),
            ..Default::default()
        });

        backend.show(&small_figure()).unwrap();
        assert!(display_path.exists());
    }
}
