//! Figure rendering backends.
//!
//! A [`FigureBackend`] turns a composed [`Figure`] into pixels or text.
//! `show` is the interactive path, `save` writes to a chosen file.
//!
//! - [`PngBackend`]: `plotters` bitmap output
//! - [`AsciiBackend`]: character map for terminals and log files

use std::path::Path;

use crate::scene::Figure;
use crate::Result;

pub mod ascii;
pub mod png;

pub use ascii::{render_ascii, AsciiBackend, AsciiConfig};
pub use png::{render_png, PngBackend, PngConfig};

/// Destination for composed figures.
pub trait FigureBackend {
    /// Present the figure to the user.
    fn show(&mut self, figure: &Figure) -> Result<()>;

    /// Write the figure to `path`.
    fn save(&mut self, figure: &Figure, path: &Path) -> Result<()>;
}

impl<T: FigureBackend + ?Sized> FigureBackend for Box<T> {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        (**self).show(figure)
    }

    fn save(&mut self, figure: &Figure, path: &Path) -> Result<()> {
        (**self).save(figure, path)
    }
}
