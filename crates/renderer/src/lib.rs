//! Raster tile rendering.
//!
//! The tile pyramid only depends on the [`TileRenderer`] seam: given a tile
//! and its geographic bounds, produce an image file at a path. This crate
//! also ships [`StyleRenderer`], a small built-in renderer that paints a
//! background, a graticule and an optional tile border from a
//! [`StyleDefinition`], encoded with the hand-written PNG encoder in [`png`].

pub mod canvas;
pub mod png;
pub mod render;
pub mod style;
pub mod style_renderer;

pub use canvas::Canvas;
pub use render::{RenderError, RenderRequest, RendererFactory, TileRenderer};
pub use style::{Color, GraticuleStyle, StyleDefinition, StyleError, StyleFormat, TileBorderStyle};
pub use style_renderer::{StyleRenderer, StyleRendererFactory};
