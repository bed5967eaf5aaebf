use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::assets::{AssetError, ImageHandle, ImageLoader};

const REQUIRED_KEYS: [&str; 3] = ["tile_width", "tile_height", "tiles"];
const PLACEHOLDER_COLOR: [u8; 4] = [128, 128, 128, 255];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tileset file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tileset file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("tileset file {path}: top level must be a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("tileset file {path} is missing required keys: {}", keys.join(", "))]
    MissingKeys { path: PathBuf, keys: Vec<String> },
    #[error("tileset file {path}: {key} must be a positive integer")]
    InvalidDimension { path: PathBuf, key: &'static str },
    #[error("tileset file {path}: tiles must be an object mapping tile codes to entries")]
    TilesNotAMap { path: PathBuf },
    #[error("tileset file {path} contains invalid tile codes: {}", codes.join(", "))]
    InvalidCodes { path: PathBuf, codes: Vec<String> },
    #[error("tileset file {path}: tile entry for code '{code}' is malformed: {source}")]
    InvalidTileEntry {
        path: PathBuf,
        code: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to resolve image for tile code '{code}': {source}")]
    TileImage {
        code: String,
        #[source]
        source: AssetError,
    },
    #[error("unknown tile code '{code}'")]
    UnknownCode { code: String },
}

/// Per-code tile description: the fully composited rendering handle plus any
/// extra JSON properties the rendering collaborator may want, passed through
/// untouched.
#[derive(Debug, Clone)]
pub struct TileProperties {
    image: ImageHandle,
    extra: serde_json::Map<String, Value>,
}

impl TileProperties {
    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    pub fn extra(&self) -> &serde_json::Map<String, Value> {
        &self.extra
    }
}

#[derive(Debug, Deserialize)]
struct TileEntry {
    image: Option<PathBuf>,
    overlay: Option<OverlayEntry>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct OverlayEntry {
    image: PathBuf,
    #[serde(default)]
    offset: [i64; 2],
}

/// Maps single-character (or short alphanumeric) tile codes to tile
/// properties. Tile dimensions are fixed at load time and uniform across the
/// tileset; the map is read-only after construction.
#[derive(Debug, Clone)]
pub struct Tileset {
    tile_width: u32,
    tile_height: u32,
    tiles: BTreeMap<String, TileProperties>,
}

impl Tileset {
    pub fn load(path: &Path, loader: &dyn ImageLoader) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading_tileset");

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let root = root.as_object().ok_or_else(|| ConfigError::NotAnObject {
            path: path.to_path_buf(),
        })?;

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| !root.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys {
                path: path.to_path_buf(),
                keys: missing,
            });
        }

        let tile_width = positive_dimension(&root["tile_width"], "tile_width", path)?;
        let tile_height = positive_dimension(&root["tile_height"], "tile_height", path)?;

        let entries = root["tiles"]
            .as_object()
            .ok_or_else(|| ConfigError::TilesNotAMap {
                path: path.to_path_buf(),
            })?;

        let mut invalid: Vec<String> = entries
            .keys()
            .filter(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            invalid.sort();
            return Err(ConfigError::InvalidCodes {
                path: path.to_path_buf(),
                codes: invalid,
            });
        }

        let mut tiles = BTreeMap::new();
        for (code, value) in entries {
            let entry: TileEntry =
                serde_json::from_value(value.clone()).map_err(|source| {
                    ConfigError::InvalidTileEntry {
                        path: path.to_path_buf(),
                        code: code.clone(),
                        source,
                    }
                })?;
            let image = resolve_tile_image(&entry, code, tile_width, tile_height, loader)?;
            tiles.insert(
                code.clone(),
                TileProperties {
                    image,
                    extra: entry.extra,
                },
            );
        }

        debug!(
            path = %path.display(),
            tile_width,
            tile_height,
            tile_codes = tiles.len(),
            "tileset_loaded"
        );
        Ok(Self {
            tile_width,
            tile_height,
            tiles,
        })
    }

    pub fn find(&self, code: &str) -> Result<&TileProperties, ConfigError> {
        self.tiles
            .get(code)
            .ok_or_else(|| ConfigError::UnknownCode {
                code: code.to_string(),
            })
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }
}

fn positive_dimension(value: &Value, key: &'static str, path: &Path) -> Result<u32, ConfigError> {
    let coerced = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    };
    match coerced {
        Some(dimension) if dimension > 0 && dimension <= u64::from(u32::MAX) => {
            Ok(dimension as u32)
        }
        _ => Err(ConfigError::InvalidDimension {
            path: path.to_path_buf(),
            key,
        }),
    }
}

fn resolve_tile_image(
    entry: &TileEntry,
    code: &str,
    tile_width: u32,
    tile_height: u32,
    loader: &dyn ImageLoader,
) -> Result<ImageHandle, ConfigError> {
    let base = match &entry.image {
        Some(image_path) => loader
            .load_image(image_path)
            .map_err(|source| ConfigError::TileImage {
                code: code.to_string(),
                source,
            })?
            .scaled_to(tile_width, tile_height),
        None => ImageHandle::solid(tile_width, tile_height, PLACEHOLDER_COLOR),
    };
    match &entry.overlay {
        Some(overlay) => {
            let overlay_image =
                loader
                    .load_image(&overlay.image)
                    .map_err(|source| ConfigError::TileImage {
                        code: code.to_string(),
                        source,
                    })?;
            Ok(base.composited(&overlay_image, (overlay.offset[0], overlay.offset[1])))
        }
        None => Ok(base),
    }
}
