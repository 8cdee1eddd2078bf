//! Scrolling camera that eases towards a target which never leaves the
//! positive quadrant of the world.

use crate::math::{Camera2D, Vec2};

/// Camera follow behaviour for side-scrolling levels.
#[derive(Clone, Copy, Debug)]
pub struct CameraFollow {
    /// Size of the visible viewport in world pixels.
    pub viewport: Vec2,
    /// Position the camera is easing towards.
    pub goal: Vec2,
    /// Fraction of the remaining distance covered per update (0.0..=1.0).
    pub speed: f32,
}

impl CameraFollow {
    /// Create a follower for a viewport of the given size, resting at the origin.
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            goal: Vec2::ZERO,
            speed: 1.0,
        }
    }

    /// Camera position that centres `focus` in the viewport.
    ///
    /// Each axis is clamped so the view never scrolls past the world origin.
    pub fn target_for(&self, focus: Vec2) -> Vec2 {
        (focus - self.viewport / 2.0).max(Vec2::ZERO)
    }

    /// Start easing towards `goal`, covering `speed` of the gap every update.
    pub fn move_to(&mut self, goal: Vec2, speed: f32) {
        self.goal = goal;
        self.speed = speed.clamp(0.0, 1.0);
    }

    /// Advance `camera` one step towards the goal.
    pub fn update(&self, camera: &mut Camera2D) {
        camera.position = camera.position.lerp(self.goal, self.speed);
    }
}
