use platformer_engine::{Actor, Direction};

/// Held-key snapshot for one tick, filled in by the input collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Translates held keys into actor commands. This is the one place that
/// gates jumping on ground contact; the kinematics component applies the
/// impulse unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerController;

impl PlayerController {
    pub fn apply(&self, input: InputState, actor: &mut Actor) {
        if input.right {
            actor.walk(Direction::Right);
        } else if input.left {
            actor.walk(Direction::Left);
        } else {
            actor.stop();
        }
        if input.jump && actor.grounded() {
            actor.jump();
        }
    }
}
