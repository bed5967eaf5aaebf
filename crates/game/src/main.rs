mod config;
mod controller;

use std::path::Path;
use std::process::ExitCode;

use platformer_engine::{Camera, DiskImageLoader, Level};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use controller::{InputState, PlayerController};

const PLAYER_WIDTH: f32 = 32.0;
const PLAYER_HEIGHT: f32 = 64.0;
const SMOKE_TICKS: u32 = 600;
const SETTLE_TICKS: u32 = 60;

/// Headless shell: loads every configured level and runs a scripted
/// fixed-tick simulation against it. The windowed renderer and the real
/// input loop are separate collaborators; this binary exercises the whole
/// load-and-simulate pipeline without them.
fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => match GameConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(error) => {
                error!(%error, "config_load_failed");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    info!(game_name = %config.game_name, levels = config.levels.len(), "starting");

    if config.levels.is_empty() {
        error!("no levels supplied, nothing left to play");
        return ExitCode::FAILURE;
    }

    let defaults = config.level_defaults();
    for level_path in &config.levels {
        let level = match Level::load(level_path, &defaults, &DiskImageLoader) {
            Ok(level) => level,
            Err(error) => {
                error!(path = %level_path.display(), %error, "level_load_failed");
                return ExitCode::FAILURE;
            }
        };
        smoke_run(&level, &config);
    }

    ExitCode::SUCCESS
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Scripted run: settle onto the ground, then walk right (hopping off every
/// fresh landing) until the tick limit runs out, the actor dies, or it gets
/// stuck against the world edge.
fn smoke_run(level: &Level, config: &GameConfig) {
    let mut actor = level.spawn_player(PLAYER_WIDTH, PLAYER_HEIGHT);
    let mut camera = Camera::new(config.window_width as f32, config.window_height as f32);
    let controller = PlayerController;
    let world = level.world();

    let mut first_grounded_tick = None;
    let mut ticks = 0;
    for tick in 0..SMOKE_TICKS {
        ticks = tick + 1;
        let input = InputState {
            right: tick >= SETTLE_TICKS,
            jump: tick >= SETTLE_TICKS && tick % 90 == 0,
            ..InputState::default()
        };
        controller.apply(input, &mut actor);
        actor.update(world);
        camera.follow(actor.rect(), world.bounds());

        if actor.grounded() && first_grounded_tick.is_none() {
            first_grounded_tick = Some(tick);
        }
        if actor.dead() {
            break;
        }
        if actor.rect().right() >= world.bounds().width {
            break;
        }
    }

    match first_grounded_tick {
        Some(grounded_tick) => info!(
            ticks,
            grounded_tick,
            dead = actor.dead(),
            x = actor.rect().x,
            y = actor.rect().y,
            scroll_x = camera.scroll().x,
            "smoke_run_finished"
        ),
        None => warn!(ticks, "smoke_run_never_touched_ground"),
    }
}
