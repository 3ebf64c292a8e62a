use anyhow::{bail, Context, Result};
use crossterm::style::{Color, Stylize};
use lscolors::{Color as LsColor, LsColors};
use std::env;
use std::fs;
use std::path::Path;

pub struct Palette {
    pub enabled: bool,
    pub index: Color,
    pub tag: Color,
    pub dash: Color,
    pub url: Color,
    pub git: Color,
    pub code_error: Color,
    pub dir: Color,
    /// Per-file colors parsed from LS_COLORS, if configured.
    pub files: Option<LsColors>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            enabled: true,
            index: Color::Rgb { r: 255, g: 255, b: 0 },
            tag: Color::Rgb { r: 0, g: 255, b: 0 },
            dash: Color::Rgb { r: 0, g: 0, b: 255 },
            url: Color::Rgb { r: 200, g: 0, b: 255 },
            git: Color::Rgb { r: 0, g: 255, b: 115 },
            code_error: Color::Rgb { r: 255, g: 0, b: 0 },
            dir: Color::Blue,
            files: None,
        }
    }
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn with_file_colors(self, files: LsColors) -> Self {
        Self {
            files: Some(files),
            ..self
        }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Paints `text` with the LS_COLORS entry for `path`. Directories without
    /// an entry get the `dir` color; other files stay unpainted.
    pub fn paint_path(&self, text: &str, path: &Path) -> String {
        match self.file_color(path).or_else(|| path.is_dir().then_some(self.dir)) {
            Some(color) => self.paint(text, color),
            None => text.to_string(),
        }
    }

    fn file_color(&self, path: &Path) -> Option<Color> {
        let style = self.files.as_ref()?.style_for_path(path)?;
        style.foreground.as_ref().and_then(crossterm_color)
    }
}

fn crossterm_color(color: &LsColor) -> Option<Color> {
    let color = match color {
        LsColor::Black => Color::Black,
        LsColor::Red => Color::DarkRed,
        LsColor::Green => Color::DarkGreen,
        LsColor::Yellow => Color::DarkYellow,
        LsColor::Blue => Color::DarkBlue,
        LsColor::Magenta => Color::DarkMagenta,
        LsColor::Cyan => Color::DarkCyan,
        LsColor::White => Color::Grey,
        LsColor::BrightBlack => Color::DarkGrey,
        LsColor::BrightRed => Color::Red,
        LsColor::BrightGreen => Color::Green,
        LsColor::BrightYellow => Color::Yellow,
        LsColor::BrightBlue => Color::Blue,
        LsColor::BrightMagenta => Color::Magenta,
        LsColor::BrightCyan => Color::Cyan,
        LsColor::BrightWhite => Color::White,
        LsColor::Fixed(n) => Color::AnsiValue(*n),
        LsColor::RGB(r, g, b) => Color::Rgb { r: *r, g: *g, b: *b },
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(color)
}

/// Reads an LS_COLORS value from `file` when given, otherwise from the
/// environment.
pub fn load_ls_colors(file: Option<&Path>) -> Result<LsColors> {
    let raw = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => env::var("LS_COLORS").context("LS_COLORS is not set")?,
    };
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("LS_COLORS is empty");
    }
    Ok(LsColors::from_string(raw))
}
