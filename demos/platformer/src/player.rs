//! Player frames and the animation state machine that picks between them.

use anyhow::Result;
use coinclimb::{EngineContext, TextureHandle};

/// Walk and climb cycles share one counter with this many steps.
pub const FRAME_COUNT: usize = 8;
/// Ticks each climb frame is held for.
const CLIMB_FRAME_TICKS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

/// The same frame facing either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TexturePair {
    pub right: TextureHandle,
    pub left: TextureHandle,
}

impl TexturePair {
    pub fn facing(&self, facing: Facing) -> TextureHandle {
        match facing {
            Facing::Right => self.right,
            Facing::Left => self.left,
        }
    }
}

/// Load an image as a right-facing frame plus its mirror image.
///
/// Missing or undecodable files are errors.
pub fn load_texture_pair(ctx: &mut EngineContext<'_>, path: &str) -> Result<TexturePair> {
    let [right, left] = ctx.load_texture_pair(path)?;
    Ok(TexturePair { right, left })
}

/// Every frame the player can show. Climb frames look the same both ways.
#[derive(Clone, Copy, Debug)]
pub struct PlayerTextures {
    pub idle: TexturePair,
    pub jump: TexturePair,
    pub fall: TexturePair,
    pub walk: [TexturePair; FRAME_COUNT],
    pub climb: [TextureHandle; 2],
}

impl PlayerTextures {
    /// Load `{prefix}_idle.png`, `_jump`, `_fall`, `_walk0`..`_walk7`,
    /// `_climb0` and `_climb1`.
    pub fn load(ctx: &mut EngineContext<'_>, prefix: &str) -> Result<Self> {
        let idle = load_texture_pair(ctx, &format!("{prefix}_idle.png"))?;
        let jump = load_texture_pair(ctx, &format!("{prefix}_jump.png"))?;
        let fall = load_texture_pair(ctx, &format!("{prefix}_fall.png"))?;

        let mut walk = [idle; FRAME_COUNT];
        for (i, pair) in walk.iter_mut().enumerate() {
            *pair = load_texture_pair(ctx, &format!("{prefix}_walk{i}.png"))?;
        }

        let climb = [
            ctx.load_texture(&format!("{prefix}_climb0.png"))?,
            ctx.load_texture(&format!("{prefix}_climb1.png"))?,
        ];

        Ok(Self {
            idle,
            jump,
            fall,
            walk,
            climb,
        })
    }

    pub fn texture_for(&self, frame: PlayerFrame, facing: Facing) -> TextureHandle {
        match frame {
            PlayerFrame::Idle => self.idle.facing(facing),
            PlayerFrame::Jump => self.jump.facing(facing),
            PlayerFrame::Fall => self.fall.facing(facing),
            PlayerFrame::Walk(i) => self.walk[i % FRAME_COUNT].facing(facing),
            PlayerFrame::Climb(i) => self.climb[i % self.climb.len()],
        }
    }
}

/// Frame chosen by [`Player::update_animation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerFrame {
    #[default]
    Idle,
    Jump,
    Fall,
    /// Index into the walk cycle.
    Walk(usize),
    /// Index into the climb frames.
    Climb(usize),
}

/// Contact state as far as the animation cares.
///
/// Leaving a ladder keeps the player climbing for exactly one more tick
/// (`just_left_ladder`) so a single missed contact does not flicker frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionState {
    Grounded,
    Airborne,
    Climbing { just_left_ladder: bool },
}

impl MotionState {
    fn next(self, on_ladder: bool, grounded: bool) -> Self {
        match self {
            _ if on_ladder => MotionState::Climbing {
                just_left_ladder: false,
            },
            MotionState::Climbing {
                just_left_ladder: false,
            } => MotionState::Climbing {
                just_left_ladder: true,
            },
            _ if grounded => MotionState::Grounded,
            _ => MotionState::Airborne,
        }
    }

    pub fn is_climbing(self) -> bool {
        matches!(self, MotionState::Climbing { .. })
    }
}

/// Animation state of the player character.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    facing: Facing,
    counter: usize,
    state: MotionState,
    frame: PlayerFrame,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            facing: Facing::Right,
            counter: 0,
            state: MotionState::Airborne,
            frame: PlayerFrame::Idle,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn frame(&self) -> PlayerFrame {
        self.frame
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Pick this tick's frame from the velocity and contacts.
    ///
    /// Priority: climbing, then jump (`dy > 0`), fall (`dy < 0`), idle
    /// (`dx == 0`) and finally the walk cycle.
    pub fn update_animation(
        &mut self,
        dx: f32,
        dy: f32,
        on_ladder: bool,
        grounded: bool,
    ) -> PlayerFrame {
        if dx < 0.0 && self.facing == Facing::Right {
            self.facing = Facing::Left;
        } else if dx > 0.0 && self.facing == Facing::Left {
            self.facing = Facing::Right;
        }

        self.state = self.state.next(on_ladder, grounded);

        self.frame = if self.state.is_climbing() {
            if dy.abs() > 1.0 {
                self.advance();
            }
            PlayerFrame::Climb(self.counter / CLIMB_FRAME_TICKS)
        } else if dy > 0.0 && !on_ladder {
            PlayerFrame::Jump
        } else if dy < 0.0 && !on_ladder {
            PlayerFrame::Fall
        } else if dx == 0.0 {
            PlayerFrame::Idle
        } else {
            self.advance();
            PlayerFrame::Walk(self.counter)
        };
        self.frame
    }

    fn advance(&mut self) {
        self.counter = (self.counter + 1) % FRAME_COUNT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_flips_on_opposing_motion_and_sticks_at_rest() {
        let mut player = Player::new();
        player.update_animation(-7.0, 0.0, false, true);
        assert_eq!(player.facing(), Facing::Left);
        player.update_animation(0.0, 0.0, false, true);
        assert_eq!(player.facing(), Facing::Left);
        player.update_animation(-7.0, 0.0, false, true);
        assert_eq!(player.facing(), Facing::Left);
        player.update_animation(7.0, 0.0, false, true);
        assert_eq!(player.facing(), Facing::Right);
    }

    #[test]
    fn vertical_motion_picks_jump_or_fall() {
        let mut player = Player::new();
        assert_eq!(player.update_animation(0.0, 5.0, false, false), PlayerFrame::Jump);
        assert_eq!(player.update_animation(7.0, -5.0, false, false), PlayerFrame::Fall);
        assert_eq!(player.update_animation(0.0, 0.0, false, true), PlayerFrame::Idle);
        assert_eq!(player.state(), MotionState::Grounded);
    }

    #[test]
    fn walk_cycle_wraps() {
        let mut player = Player::new();
        let frames: Vec<_> = (0..10)
            .map(|_| player.update_animation(7.0, 0.0, false, true))
            .collect();
        assert_eq!(frames[0], PlayerFrame::Walk(1));
        assert_eq!(frames[6], PlayerFrame::Walk(7));
        assert_eq!(frames[7], PlayerFrame::Walk(0));
        assert!(player.counter() < FRAME_COUNT);
    }

    #[test]
    fn climbing_only_animates_while_moving() {
        let mut player = Player::new();
        for _ in 0..3 {
            assert_eq!(player.update_animation(0.0, 7.0, true, false), PlayerFrame::Climb(0));
        }
        assert_eq!(player.update_animation(0.0, 7.0, true, false), PlayerFrame::Climb(1));
        assert_eq!(player.counter(), 4);

        assert_eq!(player.update_animation(0.0, 0.5, true, false), PlayerFrame::Climb(1));
        assert_eq!(player.counter(), 4);

        for _ in 0..4 {
            player.update_animation(0.0, -7.0, true, false);
        }
        assert_eq!(player.counter(), 0);
        assert_eq!(player.frame(), PlayerFrame::Climb(0));
    }

    #[test]
    fn climbing_outlasts_the_ladder_by_one_tick() {
        let mut player = Player::new();
        player.update_animation(0.0, 7.0, true, false);
        assert_eq!(player.state(), MotionState::Climbing { just_left_ladder: false });

        let frame = player.update_animation(0.0, 7.0, false, false);
        assert!(matches!(frame, PlayerFrame::Climb(_)));
        assert_eq!(player.state(), MotionState::Climbing { just_left_ladder: true });

        assert_eq!(player.update_animation(0.0, 7.0, false, false), PlayerFrame::Jump);
        assert_eq!(player.state(), MotionState::Airborne);
    }

    #[test]
    fn regaining_the_ladder_resets_the_grace_tick() {
        let mut player = Player::new();
        player.update_animation(0.0, 0.0, true, false);
        player.update_animation(0.0, 0.0, false, false);
        player.update_animation(0.0, 0.0, true, false);
        player.update_animation(0.0, 0.0, false, true);
        assert!(player.state().is_climbing());
        assert_eq!(player.update_animation(0.0, 0.0, false, true), PlayerFrame::Idle);
    }
}
