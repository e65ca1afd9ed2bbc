//! Filesystem tile store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use tile_common::{TileCoord, TileError, TileResult};

/// File extension of every stored tile.
pub const TILE_EXTENSION: &str = "png";

/// How a finished tile artifact is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileClass {
    Normal,
    /// Byte-identical in size to the renderer's blank output
    Empty,
}

/// Size heuristic for detecting blank tiles without decoding them.
///
/// The blank size depends on the renderer and the image encoding, so it is
/// configured rather than fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyTilePolicy {
    /// Exact byte size of a fully transparent tile
    pub blank_size_bytes: u64,
}

impl EmptyTilePolicy {
    pub fn new(blank_size_bytes: u64) -> Self {
        Self { blank_size_bytes }
    }

    pub fn classify_size(&self, size: u64) -> TileClass {
        if size == self.blank_size_bytes {
            TileClass::Empty
        } else {
            TileClass::Normal
        }
    }
}

impl Default for EmptyTilePolicy {
    fn default() -> Self {
        // Transparent 256x256 palette PNG written by the reference renderer
        Self {
            blank_size_bytes: 103,
        }
    }
}

/// Maps tile coordinates to files under a root directory.
///
/// Holds no mutable state, so one store can be shared by the dispatcher and
/// every worker.
#[derive(Debug, Clone)]
pub struct TileStore {
    root: PathBuf,
    empty_policy: EmptyTilePolicy,
}

impl TileStore {
    pub fn new(root: impl Into<PathBuf>, empty_policy: EmptyTilePolicy) -> Self {
        Self {
            root: root.into(),
            empty_policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn empty_policy(&self) -> EmptyTilePolicy {
        self.empty_policy
    }

    /// `{root}/{z}/{x}/{y}.png`
    pub fn location_for(&self, coord: TileCoord) -> PathBuf {
        self.column_dir(coord.z, coord.x)
            .join(format!("{}.{}", coord.y, TILE_EXTENSION))
    }

    fn column_dir(&self, zoom: u32, x: u32) -> PathBuf {
        self.root.join(zoom.to_string()).join(x.to_string())
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure_root(&self) -> TileResult<()> {
        create_dir_idempotent(&self.root)
    }

    /// Create `{root}`, `{root}/{z}` and `{root}/{z}/{x}` as needed.
    ///
    /// Safe to call concurrently: a directory created by someone else in the
    /// meantime counts as success.
    pub fn ensure_directories(&self, zoom: u32, x: u32) -> TileResult<()> {
        let zoom_dir = self.root.join(zoom.to_string());
        let column_dir = zoom_dir.join(x.to_string());

        if column_dir.is_dir() {
            return Ok(());
        }

        create_dir_idempotent(&self.root)?;
        create_dir_idempotent(&zoom_dir)?;
        create_dir_idempotent(&column_dir)
    }

    /// Whether a tile file is already present at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Classify a finished tile by its byte size.
    pub fn classify(&self, path: &Path) -> TileResult<TileClass> {
        let size = fs::metadata(path)?.len();
        Ok(self.empty_policy.classify_size(size))
    }
}

/// `create_dir` that treats an existing directory as success.
fn create_dir_idempotent(path: &Path) -> TileResult<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Created tile directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(TileError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}
