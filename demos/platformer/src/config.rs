use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use coinclimb::{Hitbox, Vec2};
use serde::Deserialize;

/// Environment variable naming an optional JSON file of overrides.
pub const CONFIG_ENV: &str = "COINCLIMB_CONFIG";
/// Environment variable overriding the asset root directory.
pub const ASSETS_ENV: &str = "COINCLIMB_ASSETS";

/// Everything tunable about the game. Missing JSON fields keep their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub screen_width: u32,
    pub screen_height: u32,

    pub tile_scaling: f32,
    pub character_scaling: f32,
    /// Edge length of one unscaled map tile.
    pub sprite_pixel_size: f32,

    /// Pixels per tick.
    pub move_speed: f32,
    /// Pixels per tick, per tick.
    pub gravity: f32,
    pub jump_speed: f32,
    pub climb_speed: f32,
    /// Ground probe used when keys change.
    pub key_jump_probe: f32,
    /// Ground probe used for the animation each tick.
    pub tick_jump_probe: f32,

    /// Player start in tiles, measured from the bottom-left of the map.
    pub player_start_tiles: [f32; 2],
    pub hitbox: HitboxConfig,

    /// Fraction of the remaining distance the camera covers per tick.
    pub camera_speed: f32,
    pub win_score: u32,
    /// Used when the map has no background colour of its own.
    pub background_color: [f32; 4],

    pub layers: LayerNames,
    pub assets: AssetPaths,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Platformer".into(),
            screen_width: 1000,
            screen_height: 650,
            tile_scaling: 0.5,
            character_scaling: 1.0,
            sprite_pixel_size: 128.0,
            move_speed: 7.0,
            gravity: 1.5,
            jump_speed: 30.0,
            climb_speed: 7.0,
            key_jump_probe: 10.0,
            tick_jump_probe: 5.0,
            player_start_tiles: [2.0, 1.0],
            hitbox: HitboxConfig::default(),
            camera_speed: 0.2,
            win_score: 11,
            // CSS cornflower blue.
            background_color: [100.0 / 255.0, 149.0 / 255.0, 237.0 / 255.0, 1.0],
            layers: LayerNames::default(),
            assets: AssetPaths::default(),
        }
    }
}

impl GameConfig {
    /// Defaults, then the file named by `COINCLIMB_CONFIG`, then
    /// `COINCLIMB_ASSETS`.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_json_str(&json)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        if let Some(root) = env::var_os(ASSETS_ENV) {
            config.assets.root = PathBuf::from(root);
        }
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Size of one map tile in world pixels.
    pub fn grid_pixel_size(&self) -> f32 {
        self.sprite_pixel_size * self.tile_scaling
    }

    pub fn player_start(&self) -> Vec2 {
        let grid = self.grid_pixel_size();
        Vec2::new(
            self.player_start_tiles[0] * grid,
            self.player_start_tiles[1] * grid,
        )
    }

    /// Player collision box at the configured character scaling.
    pub fn player_hitbox(&self) -> Hitbox {
        let s = self.character_scaling;
        Hitbox {
            half_width: self.hitbox.half_width * s,
            bottom: self.hitbox.bottom * s,
            top: self.hitbox.top * s,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.screen_width as f32, self.screen_height as f32)
    }
}

/// Player hit box in unscaled texture pixels, relative to the sprite centre.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HitboxConfig {
    pub half_width: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            half_width: 22.0,
            bottom: -64.0,
            top: 28.0,
        }
    }
}

/// Names of the map layers the game gives meaning to.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerNames {
    pub moving_platforms: String,
    pub platforms: String,
    pub coins: String,
    pub foreground: String,
    pub background: String,
    pub dont_touch: String,
    pub player: String,
    pub ladders: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            moving_platforms: "Moving Platforms".into(),
            platforms: "Platforms".into(),
            coins: "Coins".into(),
            foreground: "Foreground".into(),
            background: "Background".into(),
            dont_touch: "Don't Touch".into(),
            player: "Player".into(),
            ladders: "Ladders".into(),
        }
    }
}

/// Asset locations, relative to `root` unless absolute.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetPaths {
    pub root: PathBuf,
    pub map: String,
    /// Prefix of the character frames; `_idle.png`, `_walk0.png` and so on
    /// are appended.
    pub character: String,
    pub coin_sound: String,
    pub jump_sound: String,
    pub music: String,
    /// Optional; the score is not drawn if it fails to load.
    pub font: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            map: "tiled_maps/map_with_ladders.json".into(),
            character: "images/animated_characters/male_person/malePerson".into(),
            coin_sound: "sounds/coin1.wav".into(),
            jump_sound: "sounds/jump1.wav".into(),
            music: "music/1918.mp3".into(),
            font: "fonts/ttf/Kenney_Mini_Square.ttf".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_level_design() {
        let config = GameConfig::default();
        assert_eq!((config.screen_width, config.screen_height), (1000, 650));
        assert_eq!(config.grid_pixel_size(), 64.0);
        assert_eq!(config.player_start(), Vec2::new(128.0, 64.0));
        assert_eq!(config.move_speed, 7.0);
        assert_eq!(config.gravity, 1.5);
        assert_eq!(config.jump_speed, 30.0);
        assert_eq!(config.win_score, 11);
        assert_eq!(config.layers.foreground, "Foreground");
        assert_eq!(
            config.player_hitbox(),
            Hitbox {
                half_width: 22.0,
                bottom: -64.0,
                top: 28.0
            }
        );
    }

    #[test]
    fn json_overrides_only_what_it_names() {
        let config = GameConfig::from_json_str(
            r#"{
                "jump_speed": 25,
                "character_scaling": 0.5,
                "layers": { "coins": "Gems" },
                "assets": { "root": "/opt/game" }
            }"#,
        )
        .expect("config parses");

        assert_eq!(config.jump_speed, 25.0);
        assert_eq!(config.move_speed, 7.0);
        assert_eq!(config.layers.coins, "Gems");
        assert_eq!(config.layers.ladders, "Ladders");
        assert_eq!(config.assets.root, PathBuf::from("/opt/game"));
        assert_eq!(config.assets.map, AssetPaths::default().map);
        assert_eq!(config.player_hitbox().bottom, -32.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GameConfig::from_json_str("{ \"gravity\": ").is_err());
        assert!(GameConfig::from_json_str("{ \"gravity\": \"heavy\" }").is_err());
    }
}
