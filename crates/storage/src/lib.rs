//! Storage layout for rendered tile pyramids.
//!
//! Tiles are plain files laid out as `{root}/{z}/{x}/{y}.png`. The layout is
//! append-only: directories are created on demand and never removed, and a
//! tile file that already exists is treated as finished work.

pub mod tile_store;

pub use tile_store::{EmptyTilePolicy, TileClass, TileStore, TILE_EXTENSION};
