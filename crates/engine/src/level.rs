use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::actor::{Actor, ActorTuning};
use crate::assets::ImageLoader;
use crate::geometry::{Rect, Vec2};
use crate::tileset::{ConfigError, Tileset};
use crate::world::{CollisionWorld, Tile};

const REQUIRED_KEYS: [&str; 7] = [
    "spawn",
    "tiles",
    "tileset",
    "background",
    "gravity",
    "move_speed",
    "jump_speed",
];

#[derive(Debug, Error)]
pub enum LevelFileError {
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("level file {path}: top level must be a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("level file {path} is missing required keys (no default supplied): {}", keys.join(", "))]
    MissingKeys { path: PathBuf, keys: Vec<String> },
    #[error("level file {path}: key '{key}' is malformed: {source}")]
    InvalidField {
        path: PathBuf,
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("level file {path}: spawn must be a 2-element integer array of grid cells")]
    InvalidSpawn { path: PathBuf },
    #[error("level file {path}: '{key}' must be a positive number")]
    InvalidTuning { path: PathBuf, key: &'static str },
    #[error("grid row {row} has length {actual}, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("grid cell ({column}, {row}) references undeclared tile code '{code}'")]
    UndeclaredTile {
        code: char,
        column: usize,
        row: usize,
    },
    #[error(transparent)]
    Tileset(#[from] ConfigError),
}

/// A fully constructed level: the immutable collision world, the spawn point
/// in world pixels, the actor tuning from the level file (or its defaults)
/// and the background color string the rendering collaborator consumes.
#[derive(Debug, Clone)]
pub struct Level {
    world: CollisionWorld,
    tileset: Tileset,
    spawn: Vec2,
    tuning: ActorTuning,
    background: String,
}

impl Level {
    /// Loads a level from a JSON file. Missing required keys are filled from
    /// `defaults` where present; a key absent from both fails the load.
    /// Construction is all-or-nothing: any error leaves no partial level.
    pub fn load(
        path: &Path,
        defaults: &serde_json::Map<String, Value>,
        loader: &dyn ImageLoader,
    ) -> Result<Self, LevelFileError> {
        debug!(path = %path.display(), "loading_level");

        let raw = fs::read_to_string(path).map_err(|source| LevelFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_str(&raw).map_err(|source| LevelFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut root = match root {
            Value::Object(map) => map,
            _ => {
                return Err(LevelFileError::NotAnObject {
                    path: path.to_path_buf(),
                })
            }
        };

        // Key validation happens before any grid construction.
        let mut missing = Vec::new();
        for key in REQUIRED_KEYS {
            if !root.contains_key(key) {
                match defaults.get(key) {
                    Some(default) => {
                        root.insert(key.to_string(), default.clone());
                    }
                    None => missing.push(key.to_string()),
                }
            }
        }
        if !missing.is_empty() {
            return Err(LevelFileError::MissingKeys {
                path: path.to_path_buf(),
                keys: missing,
            });
        }

        let tileset_path: PathBuf = typed_field(&root, "tileset", path)?;
        let rows: Vec<String> = typed_field(&root, "tiles", path)?;
        let background: String = typed_field(&root, "background", path)?;
        let tuning = ActorTuning {
            move_speed: positive_number(&root, "move_speed", path)?,
            jump_speed: positive_number(&root, "jump_speed", path)?,
            gravity: positive_number(&root, "gravity", path)?,
        };

        // Relative tileset references resolve against the level's directory.
        let tileset_path = match path.parent() {
            Some(dir) if tileset_path.is_relative() => dir.join(tileset_path),
            _ => tileset_path,
        };
        let tileset = Tileset::load(&tileset_path, loader)?;

        let spawn_cell = spawn_cell(&root, path)?;
        let spawn = Vec2 {
            x: spawn_cell.0 as f32 * tileset.tile_width() as f32,
            y: spawn_cell.1 as f32 * tileset.tile_height() as f32,
        };

        let (tiles, bounds) = build_grid(&rows, &tileset)?;
        info!(
            path = %path.display(),
            tiles = tiles.len(),
            bounds_width = bounds.width,
            bounds_height = bounds.height,
            "level_loaded"
        );

        Ok(Self {
            world: CollisionWorld::new(tiles, bounds),
            tileset,
            spawn,
            tuning,
            background,
        })
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn tuning(&self) -> ActorTuning {
        self.tuning
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    /// Creates an actor of the given pixel size at the level's spawn point.
    pub fn spawn_player(&self, width: f32, height: f32) -> Actor {
        Actor::new(
            Rect::new(self.spawn.x, self.spawn.y, width, height),
            self.tuning,
        )
    }
}

/// Converts the character grid into placed tiles plus the level bounds.
///
/// The first non-empty row establishes the expected width; every row must
/// match it. A grid with zero rows (or only empty rows) is accepted and
/// yields zero-sized bounds rather than an error. Tiles are pushed in
/// row-major order, which is what makes [`CollisionWorld::first_overlap`]'s
/// tie-break deterministic.
pub fn build_grid(
    rows: &[String],
    tileset: &Tileset,
) -> Result<(Vec<Tile>, Rect), LevelFileError> {
    let expected = rows
        .iter()
        .find(|row| !row.is_empty())
        .map_or(0, |row| row.chars().count());

    let tile_width = tileset.tile_width() as f32;
    let tile_height = tileset.tile_height() as f32;
    let mut tiles = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let actual = row.chars().count();
        if actual != expected {
            return Err(LevelFileError::RowLength {
                row: row_index,
                expected,
                actual,
            });
        }
        for (column, code) in row.chars().enumerate() {
            if code == ' ' {
                continue;
            }
            let properties = match tileset.find(code.encode_utf8(&mut [0u8; 4])) {
                Ok(properties) => properties,
                Err(ConfigError::UnknownCode { .. }) => {
                    return Err(LevelFileError::UndeclaredTile {
                        code,
                        column,
                        row: row_index,
                    })
                }
                Err(other) => return Err(LevelFileError::Tileset(other)),
            };
            tiles.push(Tile::new(
                Rect::new(
                    column as f32 * tile_width,
                    row_index as f32 * tile_height,
                    tile_width,
                    tile_height,
                ),
                properties.image().clone(),
            ));
        }
    }

    let bounds = Rect::new(
        0.0,
        0.0,
        expected as f32 * tile_width,
        rows.len() as f32 * tile_height,
    );
    Ok((tiles, bounds))
}

fn typed_field<T: serde::de::DeserializeOwned>(
    root: &serde_json::Map<String, Value>,
    key: &'static str,
    path: &Path,
) -> Result<T, LevelFileError> {
    serde_json::from_value(root[key].clone()).map_err(|source| LevelFileError::InvalidField {
        path: path.to_path_buf(),
        key,
        source,
    })
}

fn positive_number(
    root: &serde_json::Map<String, Value>,
    key: &'static str,
    path: &Path,
) -> Result<f32, LevelFileError> {
    let value = root[key].as_f64().filter(|v| v.is_finite() && *v > 0.0);
    match value {
        Some(number) => Ok(number as f32),
        None => Err(LevelFileError::InvalidTuning {
            path: path.to_path_buf(),
            key,
        }),
    }
}

fn spawn_cell(
    root: &serde_json::Map<String, Value>,
    path: &Path,
) -> Result<(i64, i64), LevelFileError> {
    let invalid = || LevelFileError::InvalidSpawn {
        path: path.to_path_buf(),
    };
    let pair = root["spawn"].as_array().ok_or_else(invalid)?;
    if pair.len() != 2 {
        return Err(invalid());
    }
    let column = pair[0].as_i64().ok_or_else(invalid)?;
    let row = pair[1].as_i64().ok_or_else(invalid)?;
    Ok((column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DiskImageLoader;

    // Entries without images resolve to placeholders, so the disk loader
    // never touches the filesystem for these fixtures.
    const TILESET_JSON: &str = r#"{"tile_width": 32, "tile_height": 32, "tiles": {"X": {}}}"#;

    fn fixture_tileset() -> (tempfile::TempDir, Tileset) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tileset.json");
        fs::write(&path, TILESET_JSON).expect("write tileset");
        let tileset = Tileset::load(&path, &DiskImageLoader).expect("tileset");
        (dir, tileset)
    }

    fn rows(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|row| row.to_string()).collect()
    }

    fn write_level(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("level.json");
        fs::write(&path, contents).expect("write level");
        path
    }

    fn defaults() -> serde_json::Map<String, Value> {
        serde_json::json!({
            "background": "#5A9AE1",
            "gravity": 0.18,
            "move_speed": 8,
            "jump_speed": 16
        })
        .as_object()
        .expect("object")
        .clone()
    }

    #[test]
    fn build_grid_places_tiles_at_scaled_cell_origins() {
        let (_dir, tileset) = fixture_tileset();
        let (tiles, bounds) =
            build_grid(&rows(&["X X", "XXX"]), &tileset).expect("build");

        assert_eq!(bounds, Rect::new(0.0, 0.0, 96.0, 64.0));
        assert_eq!(tiles.len(), 5);
        assert_eq!(tiles[0].rect(), Rect::new(0.0, 0.0, 32.0, 32.0));
        assert_eq!(tiles[1].rect(), Rect::new(64.0, 0.0, 32.0, 32.0));
        assert_eq!(tiles[2].rect(), Rect::new(0.0, 32.0, 32.0, 32.0));
    }

    #[test]
    fn build_grid_scales_by_both_tile_dimensions_independently() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tileset.json");
        fs::write(
            &path,
            r#"{"tile_width": 16, "tile_height": 8, "tiles": {"X": {}}}"#,
        )
        .expect("write tileset");
        let tileset = Tileset::load(&path, &DiskImageLoader).expect("tileset");

        let (tiles, bounds) = build_grid(&rows(&[" X", "X "]), &tileset).expect("build");
        assert_eq!(bounds, Rect::new(0.0, 0.0, 32.0, 16.0));
        assert_eq!(tiles[0].rect(), Rect::new(16.0, 0.0, 16.0, 8.0));
        assert_eq!(tiles[1].rect(), Rect::new(0.0, 8.0, 16.0, 8.0));
    }

    #[test]
    fn build_grid_rejects_mismatched_row_lengths_naming_the_row() {
        let (_dir, tileset) = fixture_tileset();
        match build_grid(&rows(&["XXX", "XX", "XXX"]), &tileset) {
            Err(LevelFileError::RowLength {
                row,
                expected,
                actual,
            }) => {
                assert_eq!(row, 1);
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn build_grid_accepts_zero_rows_with_degenerate_bounds() {
        let (_dir, tileset) = fixture_tileset();
        let (tiles, bounds) = build_grid(&[], &tileset).expect("build");
        assert!(tiles.is_empty());
        assert_eq!(bounds, Rect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn build_grid_rejects_undeclared_codes_naming_the_cell() {
        let (_dir, tileset) = fixture_tileset();
        match build_grid(&rows(&["X X", "XQX"]), &tileset) {
            Err(LevelFileError::UndeclaredTile { code, column, row }) => {
                assert_eq!(code, 'Q');
                assert_eq!(column, 1);
                assert_eq!(row, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_builds_the_donut_level_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tileset.json"), TILESET_JSON).expect("write tileset");
        let path = write_level(
            &dir,
            r#"{
                "spawn": [1, 1],
                "tiles": ["XXX", "X X", "XXX"],
                "tileset": "tileset.json"
            }"#,
        );

        let level = Level::load(&path, &defaults(), &DiskImageLoader).expect("load");
        assert_eq!(level.world().tile_count(), 8);
        assert_eq!(level.world().bounds(), Rect::new(0.0, 0.0, 96.0, 96.0));
        assert_eq!(level.spawn(), Vec2::new(32.0, 32.0));
        assert_eq!(level.background(), "#5A9AE1");
        assert_eq!(level.tuning().move_speed, 8.0);

        let actor = level.spawn_player(32.0, 32.0);
        assert_eq!(actor.rect(), Rect::new(32.0, 32.0, 32.0, 32.0));
    }

    #[test]
    fn load_fails_when_a_required_key_has_no_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tileset.json"), TILESET_JSON).expect("write tileset");
        let path = write_level(
            &dir,
            r#"{"tiles": ["X"], "tileset": "tileset.json"}"#,
        );

        match Level::load(&path, &defaults(), &DiskImageLoader) {
            Err(LevelFileError::MissingKeys { keys, .. }) => {
                assert_eq!(keys, vec!["spawn".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn level_values_take_precedence_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tileset.json"), TILESET_JSON).expect("write tileset");
        let path = write_level(
            &dir,
            r#"{
                "spawn": [0, 0],
                "tiles": ["X"],
                "tileset": "tileset.json",
                "gravity": 2.5
            }"#,
        );

        let level = Level::load(&path, &defaults(), &DiskImageLoader).expect("load");
        assert_eq!(level.tuning().gravity, 2.5);
        assert_eq!(level.tuning().jump_speed, 16.0);
    }

    #[test]
    fn malformed_spawn_pairs_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tileset.json"), TILESET_JSON).expect("write tileset");

        for spawn in ["[1, 2, 3]", "[1.5, 2]", "\"origin\""] {
            let path = write_level(
                &dir,
                &format!(
                    r#"{{"spawn": {spawn}, "tiles": ["X"], "tileset": "tileset.json"}}"#
                ),
            );
            assert!(
                matches!(
                    Level::load(&path, &defaults(), &DiskImageLoader),
                    Err(LevelFileError::InvalidSpawn { .. })
                ),
                "spawn {spawn} should be rejected"
            );
        }
    }

    #[test]
    fn non_positive_tuning_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tileset.json"), TILESET_JSON).expect("write tileset");
        let path = write_level(
            &dir,
            r#"{
                "spawn": [0, 0],
                "tiles": ["X"],
                "tileset": "tileset.json",
                "gravity": 0
            }"#,
        );

        assert!(matches!(
            Level::load(&path, &defaults(), &DiskImageLoader),
            Err(LevelFileError::InvalidTuning { key: "gravity", .. })
        ));
    }

    #[test]
    fn tileset_failures_surface_as_level_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_level(
            &dir,
            r#"{"spawn": [0, 0], "tiles": ["X"], "tileset": "absent.json"}"#,
        );

        assert!(matches!(
            Level::load(&path, &defaults(), &DiskImageLoader),
            Err(LevelFileError::Tileset(ConfigError::Read { .. }))
        ));
    }

    #[test]
    fn missing_and_malformed_level_files_are_reported_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Level::load(&missing, &defaults(), &DiskImageLoader),
            Err(LevelFileError::Read { .. })
        ));

        let path = write_level(&dir, "{broken");
        assert!(matches!(
            Level::load(&path, &defaults(), &DiskImageLoader),
            Err(LevelFileError::Parse { .. })
        ));
    }
}
