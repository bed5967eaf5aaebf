use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is malformed at {}: {source}", source.path())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },
}

/// Immutable game configuration, constructed once at startup and passed by
/// reference from there on. Every field has a default, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub game_name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub background: String,
    pub fps: u32,
    pub gravity: f64,
    pub move_speed: f64,
    pub jump_speed: f64,
    pub levels: Vec<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_name: "Platform Demo Game".to_string(),
            window_width: 1000,
            window_height: 800,
            background: "#5A9AE1".to_string(),
            fps: 60,
            gravity: 0.18,
            move_speed: 8.0,
            jump_speed: 16.0,
            levels: vec![PathBuf::from("assets/levels/W01_L01.json")],
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, GameConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| GameConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
            GameConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// The defaults mapping handed to the level loader: level files may omit
    /// these keys and inherit the game-wide values.
    pub fn level_defaults(&self) -> serde_json::Map<String, Value> {
        let defaults = serde_json::json!({
            "background": self.background,
            "gravity": self.gravity,
            "move_speed": self.move_speed,
            "jump_speed": self.jump_speed,
        });
        match defaults {
            Value::Object(map) => map,
            _ => unreachable!("level defaults are built as an object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"game_name": "Test Run", "gravity": 1.0}"#).expect("write");

        let config = GameConfig::load(&path).expect("load");
        assert_eq!(config.game_name, "Test Run");
        assert_eq!(config.gravity, 1.0);
        assert_eq!(config.window_width, 1000);
        assert_eq!(config.jump_speed, 16.0);
        assert_eq!(config.levels, vec![PathBuf::from("assets/levels/W01_L01.json")]);
    }

    #[test]
    fn level_defaults_expose_the_defaultable_keys_only() {
        let config = GameConfig::default();
        let defaults = config.level_defaults();

        assert_eq!(defaults.len(), 4);
        assert_eq!(defaults["background"], "#5A9AE1");
        assert_eq!(defaults["move_speed"], 8.0);
        assert!(!defaults.contains_key("spawn"));
        assert!(!defaults.contains_key("tileset"));
    }

    #[test]
    fn parse_errors_name_the_failing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"window_width": "wide"}"#).expect("write");

        match GameConfig::load(&path) {
            Err(GameConfigError::Parse { source, .. }) => {
                assert_eq!(source.path().to_string(), "window_width");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            GameConfig::load(&dir.path().join("absent.json")),
            Err(GameConfigError::Read { .. })
        ));
    }
}
