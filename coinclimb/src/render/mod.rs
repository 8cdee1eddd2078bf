mod sprite;
mod text;
mod wgpu_backend;

pub use sprite::{Sprite, TextureHandle};
pub use text::{FontHandle, GlyphMetrics, TextRenderer};
pub use wgpu_backend::{Frame, Renderer};
