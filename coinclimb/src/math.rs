use glam::{Mat4, Vec3};

/// 2D vector type used throughout coinclimb.
///
/// World space is y-up: positive `y` points towards the top of the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Linearly interpolates between two vectors.
    pub fn lerp(self, rhs: Self, t: f32) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
        )
    }

    /// Returns a vector with component-wise maximum values.
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y))
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle stored as centre and half extents.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Build a rectangle from its edges.
    pub fn from_edges(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            center: Vec2::new((left + right) * 0.5, (bottom + top) * 0.5),
            half_extents: Vec2::new((right - left) * 0.5, (top - bottom) * 0.5),
        }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_extents.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_extents.x
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_extents.y
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// True when the rectangles share interior area. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }
}

/// Transform describing 2D position, scale, and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub scale: Vec2,
    /// Rotation in radians around the Z axis.
    pub rotation: f32,
}

impl Transform2D {
    pub fn new(position: Vec2, scale: Vec2, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }

    pub fn to_matrix(&self, base_size: Vec2) -> Mat4 {
        let translation = Mat4::from_translation(Vec3::new(self.position.x, self.position.y, 0.0));
        let rotation = Mat4::from_rotation_z(self.rotation);
        let scale = Mat4::from_scale(Vec3::new(
            self.scale.x * base_size.x,
            self.scale.y * base_size.y,
            1.0,
        ));

        translation * rotation * scale
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Camera representing a scrolling 2D view.
///
/// `position` is the world coordinate shown at the bottom-left corner of the
/// viewport, so a camera at the origin maps world pixels straight to screen
/// pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Camera2D {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            zoom: 1.0,
        }
    }

    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        let projection = Mat4::orthographic_rh_gl(0.0, width as f32, 0.0, height as f32, -1.0, 1.0);

        let translation =
            Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));
        let zoom = Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0));

        projection * zoom * translation
    }

    /// Converts world coordinates to screen pixels (y-up, origin bottom-left).
    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        (world_pos - self.position) * self.zoom
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_overlap() {
        let floor = Rect::from_edges(0.0, 64.0, 0.0, 64.0);
        let standing = Rect::from_edges(10.0, 40.0, 64.0, 150.0);
        assert!(!floor.overlaps(&standing));

        let sunk = Rect::from_edges(10.0, 40.0, 63.0, 150.0);
        assert!(floor.overlaps(&sunk));
    }

    #[test]
    fn camera_maps_bottom_left_of_view_to_clip_corner() {
        let camera = Camera2D::new(Vec2::new(100.0, 50.0));
        let vp = camera.view_projection(1000, 650);
        let corner = vp.transform_point3(Vec3::new(100.0, 50.0, 0.0));
        assert!((corner.x + 1.0).abs() < 1e-5);
        assert!((corner.y + 1.0).abs() < 1e-5);

        let top_right = vp.transform_point3(Vec3::new(1100.0, 700.0, 0.0));
        assert!((top_right.x - 1.0).abs() < 1e-5);
        assert!((top_right.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn world_to_screen_subtracts_camera_position() {
        let camera = Camera2D::new(Vec2::new(30.0, 20.0));
        assert_eq!(camera.world_to_screen(Vec2::new(40.0, 25.0)), Vec2::new(10.0, 5.0));
    }
}
