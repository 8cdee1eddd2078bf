//! Keyboard state to desired player velocity.

use coinclimb::{KeyBindings, KeyCode, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Arrow keys and WASD.
pub fn default_bindings() -> KeyBindings<Direction> {
    let mut bindings = KeyBindings::new();
    bindings
        .bind(KeyCode::ArrowUp, Direction::Up)
        .bind(KeyCode::KeyW, Direction::Up)
        .bind(KeyCode::ArrowDown, Direction::Down)
        .bind(KeyCode::KeyS, Direction::Down)
        .bind(KeyCode::ArrowLeft, Direction::Left)
        .bind(KeyCode::KeyA, Direction::Left)
        .bind(KeyCode::ArrowRight, Direction::Right)
        .bind(KeyCode::KeyD, Direction::Right);
    bindings
}

/// Which directional keys are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionKeys {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }
}

/// What the player is touching right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    pub on_ladder: bool,
    /// Solid ground close enough below to jump from.
    pub can_jump: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speeds {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub climb_speed: f32,
}

/// Result of [`recompute_intent`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intent {
    pub change_x: f32,
    pub change_y: f32,
    pub jump_needs_reset: bool,
    /// A jump started; the caller plays the jump sound.
    pub jumped: bool,
}

/// Desired velocity for the held keys.
///
/// Vertical velocity is only overwritten on a ladder or when a jump starts;
/// otherwise `current.y` carries over so gravity keeps acting. Starting a
/// jump sets the latch, and nothing here clears it: that happens when the
/// up key is released.
pub fn recompute_intent(
    keys: DirectionKeys,
    contacts: Contacts,
    jump_needs_reset: bool,
    current: Vec2,
    speeds: &Speeds,
) -> Intent {
    let mut change_y = current.y;
    let mut latch = jump_needs_reset;
    let mut jumped = false;

    if keys.up && !keys.down {
        if contacts.on_ladder {
            change_y = speeds.climb_speed;
        } else if contacts.can_jump && !latch {
            change_y = speeds.jump_speed;
            latch = true;
            jumped = true;
        }
    } else if keys.down && !keys.up && contacts.on_ladder {
        change_y = -speeds.climb_speed;
    }

    if contacts.on_ladder && keys.up == keys.down {
        change_y = 0.0;
    }

    let change_x = match (keys.right, keys.left) {
        (true, false) => speeds.move_speed,
        (false, true) => -speeds.move_speed,
        _ => 0.0,
    };

    Intent {
        change_x,
        change_y,
        jump_needs_reset: latch,
        jumped,
    }
}
