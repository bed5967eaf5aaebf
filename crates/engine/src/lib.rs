//! Core of a 2D side-scrolling platformer prototype: tile-based level
//! loading driven by JSON configuration, an immutable collision world and
//! the per-tick actor movement/collision-resolution algorithm. Rendering,
//! windowing, input polling and audio are external collaborators; the crate
//! only exposes the state they read (`Tile`/`Actor` rectangles, image
//! handles, animation cues) and the commands they issue (`walk`/`stop`/
//! `jump`).

pub mod actor;
pub mod assets;
pub mod camera;
pub mod geometry;
pub mod level;
pub mod tileset;
pub mod world;

pub use actor::{Actor, ActorTuning, AnimationCue, Direction};
pub use assets::{AssetError, DiskImageLoader, ImageHandle, ImageLoader};
pub use camera::Camera;
pub use geometry::{Rect, Vec2};
pub use level::{build_grid, Level, LevelFileError};
pub use tileset::{ConfigError, TileProperties, Tileset};
pub use world::{CollisionWorld, Tile, TileId};
