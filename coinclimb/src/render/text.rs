use std::collections::HashMap;

use ab_glyph::{Font, FontArc, Glyph, GlyphId, PxScale, ScaleFont};
use anyhow::{anyhow, Result};

use crate::math::Vec2;
use crate::render::TextureHandle;

/// A font loaded and ready for text rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle(pub(crate) u32);

/// Coverage bitmap of one glyph, ready to upload as a white RGBA texture.
pub(crate) struct RasterizedGlyph {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub metrics: GlyphMetrics,
}

/// Placement of a glyph relative to the pen position on the baseline.
///
/// Distances are in pixels with y pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    pub width: f32,
    pub height: f32,
    /// Offset from the pen to the glyph's left edge.
    pub bearing_x: f32,
    /// Offset from the baseline to the glyph's top edge.
    pub top: f32,
    pub advance: f32,
}

impl GlyphMetrics {
    /// Centre and size of the glyph quad for a pen at `pen`.
    pub fn quad(&self, pen: Vec2) -> (Vec2, Vec2) {
        let center = Vec2::new(
            pen.x + self.bearing_x + self.width * 0.5,
            pen.y + self.top - self.height * 0.5,
        );
        (center, Vec2::new(self.width, self.height))
    }
}

/// Cached glyph: `texture` is `None` for glyphs without an outline (spaces).
#[derive(Clone, Copy, Debug)]
pub(crate) struct GlyphCacheEntry {
    pub texture: Option<TextureHandle>,
    pub metrics: GlyphMetrics,
}

/// Owns loaded fonts and the per-size glyph texture cache.
pub struct TextRenderer {
    fonts: HashMap<FontHandle, FontArc>,
    next_font_id: u32,
    glyph_cache: HashMap<(FontHandle, char, u32), GlyphCacheEntry>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            next_font_id: 1,
            glyph_cache: HashMap::new(),
        }
    }

    /// Load a font from bytes (TTF/OTF format).
    pub fn load_font_from_bytes(&mut self, bytes: &[u8]) -> Result<FontHandle> {
        let font = FontArc::try_from_vec(bytes.to_vec())
            .map_err(|e| anyhow!("Failed to load font: {}", e))?;

        let handle = FontHandle(self.next_font_id);
        self.next_font_id += 1;
        self.fonts.insert(handle, font);
        Ok(handle)
    }

    pub(crate) fn cached(&self, font: FontHandle, ch: char, size: f32) -> Option<GlyphCacheEntry> {
        self.glyph_cache.get(&(font, ch, size as u32)).copied()
    }

    pub(crate) fn cache_glyph(
        &mut self,
        font: FontHandle,
        ch: char,
        size: f32,
        entry: GlyphCacheEntry,
    ) {
        self.glyph_cache.insert((font, ch, size as u32), entry);
    }

    /// Kerning between two consecutive characters at `size`.
    pub(crate) fn kern(&self, font: FontHandle, prev: char, next: char, size: f32) -> f32 {
        self.fonts
            .get(&font)
            .map(|f| {
                let scaled = f.as_scaled(PxScale::from(size));
                scaled.kern(f.glyph_id(prev), f.glyph_id(next))
            })
            .unwrap_or(0.0)
    }

    /// Rasterize `ch` at `size` pixels into white RGBA coverage.
    pub(crate) fn rasterize(
        &self,
        font: FontHandle,
        ch: char,
        size: f32,
    ) -> Result<RasterizedGlyph> {
        let font = self
            .fonts
            .get(&font)
            .ok_or_else(|| anyhow!("Font handle not found"))?;

        let scale = PxScale::from(size);
        let scaled_font = font.as_scaled(scale);
        let glyph_id: GlyphId = font.glyph_id(ch);
        let advance = scaled_font.h_advance(glyph_id);
        let glyph = Glyph {
            id: glyph_id,
            scale,
            position: ab_glyph::point(0.0, 0.0),
        };

        let Some(outlined) = scaled_font.outline_glyph(glyph) else {
            return Ok(RasterizedGlyph {
                rgba: Vec::new(),
                width: 0,
                height: 0,
                metrics: GlyphMetrics {
                    width: 0.0,
                    height: 0.0,
                    bearing_x: 0.0,
                    top: 0.0,
                    advance,
                },
            });
        };

        let bounds = outlined.px_bounds();
        let width = bounds.width().ceil().max(1.0) as u32;
        let height = bounds.height().ceil().max(1.0) as u32;
        let mut rgba = vec![0u8; (width * height * 4) as usize];
        outlined.draw(|x, y, coverage| {
            if x < width && y < height {
                let idx = ((y * width + x) * 4) as usize;
                rgba[idx] = 255;
                rgba[idx + 1] = 255;
                rgba[idx + 2] = 255;
                rgba[idx + 3] = (coverage.clamp(0.0, 1.0) * 255.0) as u8;
            }
        });

        Ok(RasterizedGlyph {
            rgba,
            width,
            height,
            metrics: GlyphMetrics {
                width: width as f32,
                height: height as f32,
                bearing_x: bounds.min.x,
                // ab_glyph bounds are y-down from the baseline
                top: -bounds.min.y,
                advance,
            },
        })
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}
