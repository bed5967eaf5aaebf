use crate::geometry::{Rect, Vec2};
use crate::world::{CollisionWorld, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Animation the rendering collaborator should show for the current state.
/// Derived from the velocity vector the same way every frame; the core does
/// not own images or frame cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCue {
    Idle,
    Run,
    Jump,
    Fall,
}

/// Movement tuning for one actor. All values are positive world-pixel
/// quantities, fixed at construction from the level file or its defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorTuning {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
}

/// Per-actor kinematic state plus the per-tick movement and collision
/// resolution. Consumes an immutable [`CollisionWorld`]; never fails at
/// runtime — world-bound death and wall contact are state transitions, not
/// errors.
#[derive(Debug, Clone)]
pub struct Actor {
    rect: Rect,
    velocity: Vec2,
    tuning: ActorTuning,
    standing_on: Option<TileId>,
    facing: Direction,
    dead: bool,
}

impl Actor {
    pub fn new(rect: Rect, tuning: ActorTuning) -> Self {
        Self {
            rect,
            velocity: Vec2::default(),
            tuning,
            standing_on: None,
            facing: Direction::Right,
            dead: false,
        }
    }

    /// Sets the horizontal direction sign. The rectangle only moves on the
    /// next [`Actor::update`].
    pub fn walk(&mut self, direction: Direction) {
        self.velocity.x = match direction {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        };
        self.facing = direction;
    }

    pub fn stop(&mut self) {
        self.velocity.x = 0.0;
    }

    /// Applies the jump impulse unconditionally. Gating on ground contact is
    /// the controller's job, not the kinematics component's.
    pub fn jump(&mut self) {
        self.velocity.y = -self.tuning.jump_speed;
    }

    /// Advances the actor exactly one tick: world-bound death check, then
    /// vertical resolution (gravity included), then horizontal resolution.
    /// Each axis is resolved independently with a discrete overlap test
    /// against the same immutable world snapshot.
    pub fn update(&mut self, world: &CollisionWorld) {
        if self.rect.top() >= world.bounds().height {
            self.dead = true;
        }
        self.resolve_vertical(world);
        self.resolve_horizontal(world);
    }

    fn resolve_vertical(&mut self, world: &CollisionWorld) {
        // Perched and not jumping: skip gravity while the support still
        // carries the actor's horizontal extent.
        if self.velocity.y == 0.0 {
            if let Some(id) = self.standing_on {
                let support = world.tile(id).rect();
                if self.rect.left() <= support.right() && self.rect.right() >= support.left() {
                    return;
                }
            }
        }

        self.standing_on = None;
        self.velocity.y += self.tuning.gravity;
        self.rect.y += self.velocity.y;

        if let Some(id) = world.first_overlap(&self.rect) {
            let tile = world.tile(id).rect();
            if self.velocity.y > 0.0 {
                self.rect.set_bottom(tile.top());
                self.velocity.y = 0.0;
                self.standing_on = Some(id);
            } else if self.velocity.y < 0.0 {
                self.rect.set_top(tile.bottom());
                self.velocity.y = 0.0;
            }
        }
    }

    fn resolve_horizontal(&mut self, world: &CollisionWorld) {
        if self.velocity.x == 0.0 {
            return;
        }

        let bounds = world.bounds();
        self.rect.x += self.velocity.x * self.tuning.move_speed;

        // Hard wall at the world edges: clamp to the boundary rather than
        // skipping the step, so speeds above one pixel per tick cannot
        // overshoot. A world-edge clamp keeps the velocity sign; only tile
        // bumps zero it.
        if self.rect.left() < 0.0 {
            self.rect.set_left(0.0);
        } else if self.rect.right() > bounds.width {
            self.rect.set_right(bounds.width);
        }

        if let Some(id) = world.first_overlap(&self.rect) {
            let tile = world.tile(id).rect();
            if self.velocity.x < 0.0 {
                self.rect.set_left(tile.right());
            } else {
                self.rect.set_right(tile.left());
            }
            self.velocity.x = 0.0;
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn tuning(&self) -> ActorTuning {
        self.tuning
    }

    pub fn grounded(&self) -> bool {
        self.standing_on.is_some()
    }

    pub fn standing_on(&self) -> Option<TileId> {
        self.standing_on
    }

    pub fn dead(&self) -> bool {
        self.dead
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn animation_cue(&self) -> AnimationCue {
        if self.velocity.y < 0.0 {
            AnimationCue::Jump
        } else if self.velocity.y > 0.0 {
            AnimationCue::Fall
        } else if self.velocity.x != 0.0 {
            AnimationCue::Run
        } else {
            AnimationCue::Idle
        }
    }
}
