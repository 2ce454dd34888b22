//! Asset cache: pre-loaded tile maps and textures, looked up by logical path and expected type.
//!
//! The screen never loads files itself. A host fills the cache (directly or
//! from a JSON manifest), and the screen takes counted references on entry
//! and hands them back on exit.
//!
//! # Invariants
//! - A lookup names both the path and the type it expects; a mismatch is an error.
//! - Every successful [`AssetCache::get`] must be paired with one [`AssetCache::release`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;

/// Texture identity derived from its logical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// A GPU-side image the host has already uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// One layer of tile ids, row-major from the bottom row; 0 is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub tiles: Vec<u32>,
}

/// An orthogonal tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiledMap {
    pub name: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub layers: Vec<TileLayer>,
}

impl TiledMap {
    /// A map with one layer where every tile is `tile`.
    pub fn filled(name: impl Into<String>, width: u32, height: u32, tile_size: u32, tile: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            tile_width: tile_size,
            tile_height: tile_size,
            layers: vec![TileLayer {
                name: "ground".into(),
                tiles: vec![tile; (width * height) as usize],
            }],
        }
    }

    pub fn pixel_width(&self) -> u32 {
        self.width * self.tile_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.height * self.tile_height
    }

    /// Tile id at column `x`, row `y` of `layer`, if in range.
    pub fn tile_at(&self, layer: usize, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let layer = self.layers.get(layer)?;
        layer.tiles.get((y * self.width + x) as usize).copied()
    }

    /// Number of non-empty tiles across all layers.
    pub fn occupied_tiles(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.tiles.iter().filter(|&&t| t != 0).count())
            .sum()
    }
}

/// An entry in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Asset {
    TiledMap(TiledMap),
    Texture(Texture),
}

impl Asset {
    pub fn kind(&self) -> &'static str {
        match self {
            Asset::TiledMap(_) => TiledMap::KIND,
            Asset::Texture(_) => Texture::KIND,
        }
    }
}

/// A type that can be looked up in the cache.
pub trait AssetKind: Clone {
    const KIND: &'static str;

    fn from_asset(asset: &Asset) -> Option<&Self>;
}

impl AssetKind for TiledMap {
    const KIND: &'static str = "tiled map";

    fn from_asset(asset: &Asset) -> Option<&Self> {
        match asset {
            Asset::TiledMap(m) => Some(m),
            _ => None,
        }
    }
}

impl AssetKind for Texture {
    const KIND: &'static str = "texture";

    fn from_asset(asset: &Asset) -> Option<&Self> {
        match asset {
            Asset::Texture(t) => Some(t),
            _ => None,
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing asset: no {expected} at {path:?}")]
    Missing { path: String, expected: &'static str },
    #[error("wrong asset type at {path:?}: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("asset {0:?} has no outstanding references")]
    NotLoaded(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    asset: Asset,
    #[serde(skip)]
    refs: Cell<u32>,
}

/// Path-keyed asset cache with per-entry reference counts.
///
/// Lookups take `&self` so the cache can be shared with a screen behind an
/// `Rc`; counts live in `Cell`s. Single-threaded by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetCache {
    entries: BTreeMap<String, Entry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset. Replacing resets its reference count.
    pub fn insert(&mut self, path: impl Into<String>, asset: Asset) {
        let path = path.into();
        tracing::debug!(path = %path, kind = asset.kind(), "asset registered");
        self.entries.insert(
            path,
            Entry {
                asset,
                refs: Cell::new(0),
            },
        );
    }

    pub fn insert_map(&mut self, path: impl Into<String>, map: TiledMap) {
        self.insert(path, Asset::TiledMap(map));
    }

    /// Register a texture and return it; its id is derived from the path.
    pub fn insert_texture(&mut self, path: impl Into<String>, width: u32, height: u32) -> Texture {
        let path = path.into();
        let texture = Texture {
            id: texture_id(&path),
            width,
            height,
        };
        self.insert(path, Asset::Texture(texture.clone()));
        texture
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up without taking a reference.
    pub fn peek<T: AssetKind>(&self, path: &str) -> Result<&T, AssetError> {
        let entry = self.entries.get(path).ok_or_else(|| AssetError::Missing {
            path: path.to_string(),
            expected: T::KIND,
        })?;
        T::from_asset(&entry.asset).ok_or_else(|| AssetError::WrongType {
            path: path.to_string(),
            expected: T::KIND,
            found: entry.asset.kind(),
        })
    }

    /// Look up an asset of the expected type and take a reference to it.
    pub fn get<T: AssetKind>(&self, path: &str) -> Result<T, AssetError> {
        let asset = self.peek::<T>(path)?.clone();
        if let Some(entry) = self.entries.get(path) {
            entry.refs.set(entry.refs.get() + 1);
        }
        Ok(asset)
    }

    /// Give back a reference taken by [`get`](Self::get).
    pub fn release(&self, path: &str) -> Result<(), AssetError> {
        let entry = self
            .entries
            .get(path)
            .ok_or_else(|| AssetError::NotLoaded(path.to_string()))?;
        match entry.refs.get() {
            0 => Err(AssetError::NotLoaded(path.to_string())),
            n => {
                entry.refs.set(n - 1);
                Ok(())
            }
        }
    }

    /// Outstanding references for `path`; 0 for unknown paths.
    pub fn ref_count(&self, path: &str) -> u32 {
        self.entries.get(path).map_or(0, |e| e.refs.get())
    }

    /// Save the cache contents to a JSON manifest. Reference counts are not saved.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a cache from a JSON manifest.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let cache: Self = serde_json::from_reader(file)?;
        tracing::info!(assets = cache.len(), "asset manifest loaded");
        Ok(cache)
    }
}

fn texture_id(path: &str) -> TextureId {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    TextureId(u64::from_le_bytes(bytes))
}

pub fn crate_info() -> &'static str {
    "playfield-assets v0.1.0"
}
