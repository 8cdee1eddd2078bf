//! coinclimb - a small 2D engine for tile-map platformers.
//!
//! Window loop and callbacks, keyboard input, audio, asset caching, a wgpu
//! sprite renderer, Tiled map loading and arcade-style platformer physics.

pub mod assets;
pub mod audio;
pub mod camera;
pub mod engine;
pub mod hud;
pub mod input;
pub mod math;
pub mod physics;
pub mod render;
pub mod scene;
pub mod tilemap;

pub use crate::assets::AssetManager;
pub use crate::audio::{AudioOutput, AudioSystem, PlaybackId, SoundHandle};
pub use crate::camera::CameraFollow;
pub use crate::engine::{ApplicationCallbacks, Engine, EngineConfig, EngineContext};
pub use crate::hud::{HudLayer, HudText};
pub use crate::input::{InputState, KeyBindings, KeyTransition};
pub use crate::math::{Camera2D, Rect, Transform2D, Vec2};
pub use crate::physics::{CollisionGroup, Hitbox, PlatformMotion, PlatformerPhysics};
pub use crate::render::{FontHandle, Frame, Renderer, Sprite, TextureHandle};
pub use crate::scene::{EntityId, Scene, SceneSprite, SpriteList};
pub use crate::tilemap::{MapLayer, MapTile, Properties, TileImage, TileMap, TileMapError};
pub use winit::keyboard::KeyCode;
