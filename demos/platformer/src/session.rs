use anyhow::{Context, Result};
use coinclimb::{
    ApplicationCallbacks, AudioOutput, Camera2D, EngineContext, FontHandle, HudLayer, HudText,
    KeyBindings, KeyCode, PlaybackId, SoundHandle, Sprite, TileMap, Vec2,
};

use crate::config::GameConfig;
use crate::controls::{default_bindings, Direction};
use crate::level::{Level, Sounds};
use crate::player::PlayerTextures;

const SCORE_POSITION: Vec2 = Vec2::new(10.0, 10.0);
const SCORE_SIZE: f32 = 18.0;
const SCORE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const MUSIC_VOLUME: f32 = 0.5;

/// Everything loaded from disk at setup.
struct Media {
    textures: PlayerTextures,
    sounds: Sounds,
    music: SoundHandle,
    font: Option<FontHandle>,
}

fn load_sound(ctx: &mut EngineContext<'_>, path: &str) -> Result<SoundHandle> {
    let path = ctx.assets().resolve(path);
    ctx.audio().load(path)
}

/// The running game, driven by the engine's callbacks.
pub struct Session {
    config: GameConfig,
    bindings: KeyBindings<Direction>,
    level: Option<Level>,
    media: Option<Media>,
    music: Option<PlaybackId>,
    hud: HudLayer,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            bindings: default_bindings(),
            level: None,
            media: None,
            music: None,
            hud: HudLayer::new(),
        }
    }

    fn load_media(&self, ctx: &mut EngineContext<'_>) -> Result<Media> {
        let assets = &self.config.assets;
        let textures = PlayerTextures::load(ctx, &assets.character)?;

        let sounds = Sounds {
            coin: load_sound(ctx, &assets.coin_sound)?,
            jump: load_sound(ctx, &assets.jump_sound)?,
        };
        let music = load_sound(ctx, &assets.music)?;

        let font = match ctx.load_font(&assets.font) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("Score will not be shown: {err:#}");
                None
            }
        };

        Ok(Media {
            textures,
            sounds,
            music,
            font,
        })
    }

    fn key_changed(&mut self, ctx: &mut EngineContext<'_>, key: KeyCode, held: bool) {
        let Some(direction) = self.bindings.action_for(key) else {
            return;
        };
        if let (Some(level), Some(media)) = (self.level.as_mut(), self.media.as_ref()) {
            level.key_changed(direction, held, ctx.audio(), &media.sounds);
        }
    }
}

impl ApplicationCallbacks for Session {
    /// Load everything and start from the beginning of the map. Safe to call
    /// again to restart.
    fn setup(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        if let Some(id) = self.music.take() {
            ctx.audio().stop(id);
        }

        let map_path = ctx.assets().resolve(&self.config.assets.map);
        let map = TileMap::load(&map_path, self.config.tile_scaling)
            .with_context(|| format!("Failed to load map {}", map_path.display()))?;
        let level = Level::new(&self.config, &map);

        {
            let (renderer, assets) = ctx.graphics();
            level.scene().preload(assets, renderer)?;
        }
        let media = self.load_media(ctx)?;

        self.music = ctx.audio().play(&media.music, MUSIC_VOLUME, true);
        self.level = Some(level);
        self.media = Some(media);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut EngineContext<'_>, _dt: f32) -> Result<()> {
        let (Some(level), Some(media)) = (self.level.as_mut(), self.media.as_ref()) else {
            return Ok(());
        };
        let (width, height) = ctx.renderer().surface_size();
        let scale = ctx.scale_factor();
        level.set_viewport(Vec2::new(width as f32 / scale, height as f32 / scale));
        level.tick(ctx.audio(), &media.sounds);
        Ok(())
    }

    fn on_draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let (Some(level), Some(media)) = (self.level.as_ref(), self.media.as_ref()) else {
            return Ok(());
        };

        // World and GUI coordinates are logical pixels.
        let scale = ctx.scale_factor();
        let mut camera = level.camera();
        camera.zoom = scale;
        let mut gui_camera = Camera2D::default();
        gui_camera.zoom = scale;

        let player = level.player();
        let mut player_sprite =
            Sprite::new(media.textures.texture_for(player.frame(), player.facing()));
        player_sprite.transform.position = level.player_center();
        player_sprite.transform.scale =
            Vec2::new(self.config.character_scaling, self.config.character_scaling);

        self.hud.clear();
        if let Some(font) = media.font {
            self.hud.add_text(HudText {
                text: format!("Score: {}", level.score()),
                font,
                size: SCORE_SIZE,
                position: SCORE_POSITION,
                color: SCORE_COLOR,
            });
        }

        let (renderer, assets) = ctx.graphics();
        let mut frame = renderer.begin_frame()?;
        renderer.clear(&mut frame, level.background_color());

        let player_layer = level.player_layer_index();
        for (index, list) in level.scene().lists().iter().enumerate() {
            list.draw(renderer, &mut frame, assets, &camera)?;
            if Some(index) == player_layer {
                renderer.draw_sprite(&mut frame, &player_sprite, &camera)?;
            }
        }

        self.hud.draw(renderer, &mut frame, &gui_camera)?;
        renderer.end_frame(frame)
    }

    fn on_key_down(&mut self, ctx: &mut EngineContext<'_>, key: KeyCode) -> Result<()> {
        self.key_changed(ctx, key, true);
        Ok(())
    }

    fn on_key_up(&mut self, ctx: &mut EngineContext<'_>, key: KeyCode) -> Result<()> {
        self.key_changed(ctx, key, false);
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        if let Some(id) = self.music.take() {
            ctx.audio().stop(id);
        }
        if let Some(level) = &self.level {
            log::info!("Final score: {}", level.score());
        }
        Ok(())
    }
}
