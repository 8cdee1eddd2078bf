use crate::math::{Transform2D, Vec2};

/// Opaque handle used to reference textures owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// A textured quad positioned by its centre.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub transform: Transform2D,
    /// Size of the quad in world pixels before `transform.scale`.
    ///
    /// `None` uses the pixel size of the sampled texture region.
    pub size: Option<Vec2>,
    /// Normalised `[x, y, w, h]` region of the texture, `None` for all of it.
    pub uv_rect: Option<[f32; 4]>,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Multiplicative tint applied to the sampled texture color.
    pub tint: [f32; 4],
}

impl Sprite {
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            transform: Transform2D::default(),
            size: None,
            uv_rect: None,
            flip_x: false,
            flip_y: false,
            tint: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// UV offset and scale passed to the shader.
    ///
    /// Flips are expressed as a negative scale starting from the opposite edge.
    pub(crate) fn uv_params(&self) -> ([f32; 2], [f32; 2]) {
        let [x, y, w, h] = self.uv_rect.unwrap_or([0.0, 0.0, 1.0, 1.0]);
        let (ox, sx) = if self.flip_x { (x + w, -w) } else { (x, w) };
        let (oy, sy) = if self.flip_y { (y + h, -h) } else { (y, h) };
        ([ox, oy], [sx, sy])
    }

    /// Quad size in world pixels for a texture of `texture_size` pixels.
    pub(crate) fn base_size(&self, texture_size: (u32, u32)) -> Vec2 {
        self.size.unwrap_or_else(|| {
            let [_, _, w, h] = self.uv_rect.unwrap_or([0.0, 0.0, 1.0, 1.0]);
            Vec2::new(texture_size.0 as f32 * w, texture_size.1 as f32 * h)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_flip_mirrors_the_region() {
        let mut sprite = Sprite::new(TextureHandle(1));
        sprite.uv_rect = Some([0.5, 0.0, 0.5, 1.0]);
        assert_eq!(sprite.uv_params(), ([0.5, 0.0], [0.5, 1.0]));

        sprite.flip_x = true;
        assert_eq!(sprite.uv_params(), ([1.0, 0.0], [-0.5, 1.0]));
    }

    #[test]
    fn base_size_follows_region_unless_overridden() {
        let mut sprite = Sprite::new(TextureHandle(1));
        sprite.uv_rect = Some([0.0, 0.0, 0.5, 1.0]);
        assert_eq!(sprite.base_size((256, 128)), Vec2::new(128.0, 128.0));

        sprite.size = Some(Vec2::new(64.0, 64.0));
        assert_eq!(sprite.base_size((256, 128)), Vec2::new(64.0, 64.0));
    }
}
