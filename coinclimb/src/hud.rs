use anyhow::Result;

use crate::{
    math::{Camera2D, Vec2},
    render::{FontHandle, Frame, Renderer},
};

/// Text element drawn in screen-space pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct HudText {
    pub text: String,
    pub font: FontHandle,
    pub size: f32,
    /// Left end of the baseline; (0, 0) is the bottom-left of the window.
    pub position: Vec2,
    pub color: [f32; 4],
}

/// Screen-space overlay rebuilt every frame and drawn on top of the world.
#[derive(Debug, Default)]
pub struct HudLayer {
    texts: Vec<HudText>,
}

impl HudLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }

    pub fn add_text(&mut self, text: HudText) {
        self.texts.push(text);
    }

    pub fn texts(&self) -> &[HudText] {
        &self.texts
    }

    /// Draw every element with a camera that maps world units to pixels.
    pub fn draw(
        &self,
        renderer: &mut Renderer,
        frame: &mut Frame,
        camera: &Camera2D,
    ) -> Result<()> {
        for ht in &self.texts {
            renderer.draw_text(
                frame,
                &ht.text,
                ht.font,
                ht.size,
                ht.position,
                ht.color,
                camera,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_last_frames_text() {
        let mut hud = HudLayer::new();
        hud.add_text(HudText {
            text: "Score: 0".into(),
            font: FontHandle(1),
            size: 18.0,
            position: Vec2::new(10.0, 10.0),
            color: [1.0; 4],
        });
        assert_eq!(hud.texts().len(), 1);
        hud.clear();
        assert!(hud.texts().is_empty());
    }
}
