//! Style definitions for the built-in tile renderer.
//!
//! Styles are small JSON or YAML documents:
//!
//! ```json
//! {
//!   "name": "debug-grid",
//!   "background": "#f2efe9",
//!   "graticule": { "spacing_degrees": 10.0, "color": "#9999aa", "width": 1 },
//!   "tile_border": { "color": [255, 0, 0, 128] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialization format of a style document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFormat {
    Json,
    Yaml,
}

impl StyleFormat {
    /// Guess the format from a file name or URL path; JSON unless it ends in
    /// `.yaml` or `.yml`.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            StyleFormat::Yaml
        } else {
            StyleFormat::Json
        }
    }
}

/// A complete tile style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Human-readable name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Fill for the whole tile
    #[serde(default = "Color::transparent")]
    pub background: Color,

    /// Meridians and parallels at a fixed spacing
    #[serde(default)]
    pub graticule: Option<GraticuleStyle>,

    /// One pixel outline around every tile
    #[serde(default)]
    pub tile_border: Option<TileBorderStyle>,
}

impl StyleDefinition {
    /// A style that draws nothing; every tile comes out blank.
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            background: Color::transparent(),
            graticule: None,
            tile_border: None,
        }
    }

    /// Load a style from a file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StyleError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| StyleError::IoError(e.to_string()))?;
        Self::parse(&content, StyleFormat::from_name(&path.to_string_lossy()))
    }

    /// Parse and validate a style document.
    pub fn parse(content: &str, format: StyleFormat) -> Result<Self, StyleError> {
        let style: Self = match format {
            StyleFormat::Json => {
                serde_json::from_str(content).map_err(|e| StyleError::ParseError(e.to_string()))?
            }
            StyleFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| StyleError::ParseError(e.to_string()))?
            }
        };
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.name.trim().is_empty() {
            return Err(StyleError::ValidationError("style name is empty".to_string()));
        }
        if let Some(graticule) = &self.graticule {
            graticule
                .validate()
                .map_err(|e| StyleError::ValidationError(format!("{}: {}", self.name, e)))?;
        }
        Ok(())
    }
}

/// Graticule line settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraticuleStyle {
    /// Degrees between adjacent lines, for both meridians and parallels
    pub spacing_degrees: f64,

    pub color: Color,

    /// Line width in pixels
    #[serde(default = "default_line_width")]
    pub width: u32,
}

fn default_line_width() -> u32 {
    1
}

impl GraticuleStyle {
    fn validate(&self) -> Result<(), String> {
        if !(self.spacing_degrees.is_finite() && self.spacing_degrees > 0.0) {
            return Err(format!(
                "graticule spacing must be positive, got {}",
                self.spacing_degrees
            ));
        }
        if self.width == 0 {
            return Err("graticule width must be at least 1 pixel".to_string());
        }
        Ok(())
    }
}

/// Tile outline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileBorderStyle {
    pub color: Color,
}

/// An RGBA color.
///
/// Deserializes from `"#RRGGBB"`, `"#RRGGBBAA"`, `[r, g, b]` or `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColorSpec", into = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Hex(String),
    Array(Vec<u8>),
}

impl TryFrom<ColorSpec> for Color {
    type Error = String;

    fn try_from(spec: ColorSpec) -> Result<Self, Self::Error> {
        match spec {
            ColorSpec::Hex(hex) => {
                Color::from_hex(&hex).ok_or_else(|| format!("invalid hex color '{}'", hex))
            }
            ColorSpec::Array(values) => match values.as_slice() {
                [r, g, b] => Ok(Color::rgba(*r, *g, *b, 255)),
                [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
                _ => Err(format!(
                    "color arrays need 3 or 4 components, got {}",
                    values.len()
                )),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Failed to read style: {0}")]
    IoError(String),

    #[error("Failed to parse style: {0}")]
    ParseError(String),

    #[error("Invalid style: {0}")]
    ValidationError(String),
}
