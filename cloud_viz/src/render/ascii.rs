//! ASCII rendering of figures for terminals and log files.
//!
//! The log-density image is resampled onto a character grid and mapped to a
//! character progression, lowest density first. Stars are stamped on top.
//!
//! # Character Mapping
//! Image values are normalized against the finite min/max of the image:
//! ```text
//! char_index = round((value - min) / (max - min) × (num_chars - 1))
//! ```
//! Non-finite values map to the first character.
//!
//! # Orientation
//! Column 0 is the left x limit and row 0 the top y limit, so an inverted x
//! range reads right-to-left exactly as the PNG output does.

use std::fs;
use std::io::{self, Stdout, Write};
use std::path::Path;

use super::FigureBackend;
use crate::scene::Figure;
use crate::{Result, VizError};

/// Configuration for ASCII figure output.
///
/// # Examples
/// ```rust
/// use cloud_viz::render::AsciiConfig;
///
/// let wide = AsciiConfig {
///     width: 120,
///     height: 40,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Character progression from lowest to highest density.
    pub density_chars: String,

    /// Character used for star markers.
    pub star_char: char,

    /// Map width in character columns.
    pub width: usize,

    /// Map height in character rows.
    ///
    /// Terminal cells are roughly twice as tall as wide, so half the width
    /// keeps a square figure square.
    pub height: usize,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            density_chars: " .:-=+#%@".to_string(),
            star_char: '*',
            width: 60,
            height: 30,
        }
    }
}

/// Backend printing figures as character maps.
pub struct AsciiBackend<W: Write> {
    config: AsciiConfig,
    out: W,
}

impl AsciiBackend<Stdout> {
    /// Print to standard output with the default configuration.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), AsciiConfig::default())
    }
}

impl<W: Write> AsciiBackend<W> {
    pub fn new(out: W, config: AsciiConfig) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FigureBackend for AsciiBackend<W> {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        let text = render_ascii(figure, &self.config)?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn save(&mut self, figure: &Figure, path: &Path) -> Result<()> {
        let text = render_ascii(figure, &self.config)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, text)?;
        log::info!("Figure saved to: {}", path.display());
        Ok(())
    }
}

/// Render `figure` as a character map with title, axis labels and legend.
pub fn render_ascii(figure: &Figure, config: &AsciiConfig) -> Result<String> {
    let chars: Vec<char> = config.density_chars.chars().collect();
    if chars.is_empty() {
        return Err(VizError::Render(
            "Empty character set for density map".to_string(),
        ));
    }
    if config.width == 0 || config.height == 0 {
        return Err(VizError::Render(format!(
            "character grid must be non-empty, got {}x{}",
            config.width, config.height
        )));
    }

    let (left, right) = figure.x_limits;
    let (bottom, top) = figure.y_limits;
    let extent = figure.extent;
    let (rows, cols) = figure.image.dim();
    let (lo, hi) = figure.image_range().unwrap_or((0.0, 0.0));

    let mut grid = vec![vec![chars[0]; config.width]; config.height];
    for (r, line) in grid.iter_mut().enumerate() {
        let y = top - (r as f64 + 0.5) / config.height as f64 * (top - bottom);
        let row = cell_index(y, extent.ymin, extent.ymax, rows);
        for (c, cell) in line.iter_mut().enumerate() {
            let x = left + (c as f64 + 0.5) / config.width as f64 * (right - left);
            let col = cell_index(x, extent.xmin, extent.xmax, cols);
            if let (Some(row), Some(col)) = (row, col) {
                let value = figure.image[[row, col]];
                *cell = chars[char_index(value, lo, hi, chars.len())];
            }
        }
    }

    let mut star_count = 0;
    if let Some(overlay) = &figure.stars {
        for (x, y, _) in overlay.markers() {
            let fx = (x - left) / (right - left);
            let fy = (top - y) / (top - bottom);
            if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
                continue;
            }
            let c = ((fx * config.width as f64) as usize).min(config.width - 1);
            let r = ((fy * config.height as f64) as usize).min(config.height - 1);
            grid[r][c] = config.star_char;
            star_count += 1;
        }
    }

    let mut output = String::new();

    output.push_str(&format!("{}\n", figure.title));
    output.push_str(&format!("{}\n", "=".repeat(figure.title.chars().count())));
    output.push_str(&format!("  {} = {top:.1}\n", figure.y_label));

    output.push_str(&format!("  {}\n", "-".repeat(config.width + 2)));
    for line in &grid {
        output.push_str("  |");
        output.extend(line.iter());
        output.push_str("|\n");
    }
    output.push_str(&format!("  {}\n", "-".repeat(config.width + 2)));

    output.push_str(&format!("  {} = {bottom:.1}\n", figure.y_label));
    let left_label = format!("{left:.1}");
    let right_label = format!("{right:.1}");
    let axis_name = &figure.x_label;
    let gap = (config.width + 2)
        .saturating_sub(left_label.len() + right_label.len() + axis_name.len())
        / 2;
    output.push_str(&format!(
        "  {left_label}{}{axis_name}{}{right_label}\n",
        " ".repeat(gap),
        " ".repeat(gap)
    ));

    output.push_str(&format!(
        "  Legend: '{}' = log10 density {lo:.2}, '{}' = {hi:.2}, '{}' = star ({star_count} shown)\n",
        chars[0],
        chars[chars.len() - 1],
        config.star_char,
    ));

    Ok(output)
}

/// Image cell containing coordinate `v` on an axis spanning `[min, max]` with `n` cells.
fn cell_index(v: f64, min: f64, max: f64, n: usize) -> Option<usize> {
    if n == 0 || v < min || v > max {
        return None;
    }
    let f = (v - min) / (max - min);
    Some(((f * n as f64) as usize).min(n - 1))
}

fn char_index(value: f64, lo: f64, hi: f64, n: usize) -> usize {
    if !value.is_finite() || hi <= lo {
        return if value.is_finite() { n - 1 } else { 0 };
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    (t * (n - 1) as f64).round() as usize
}
