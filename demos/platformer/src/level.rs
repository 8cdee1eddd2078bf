//! One playthrough of a map: world state and the per-tick rules.
//!
//! Nothing here touches the window or the GPU, so the whole game loop can be
//! driven from tests with a map literal and a recording audio output.

use coinclimb::{
    AudioOutput, Camera2D, CameraFollow, CollisionGroup, EntityId, PlatformMotion,
    PlatformerPhysics, Properties, Rect, Scene, SoundHandle, TileMap, Vec2,
};

use crate::config::GameConfig;
use crate::controls::{recompute_intent, Contacts, Direction, DirectionKeys, Speeds};
use crate::player::Player;

/// Sounds the rules trigger.
#[derive(Clone, Debug)]
pub struct Sounds {
    pub coin: SoundHandle,
    pub jump: SoundHandle,
}

/// World, player and score for one map.
pub struct Level {
    scene: Scene,
    physics: PlatformerPhysics,
    player: Player,
    player_layer: String,

    keys: DirectionKeys,
    jump_needs_reset: bool,
    speeds: Speeds,
    key_jump_probe: f32,
    tick_jump_probe: f32,

    score: u32,
    win_score: u32,
    win_logged: bool,

    camera: Camera2D,
    follow: CameraFollow,
    camera_speed: f32,
    background_color: [f32; 4],
}

impl Level {
    /// Build the scene and physics world from `map`'s named layers.
    ///
    /// Platforms become walls, moving platforms move by their `change_x`,
    /// `change_y` and `boundary_*` properties, ladders, coins and the
    /// don't-touch layer become sensors. The player list goes at the map's
    /// player layer, before the foreground if there is none, else last.
    pub fn new(config: &GameConfig, map: &TileMap) -> Self {
        let layers = &config.layers;
        let mut scene = Scene::from_tilemap(map);
        let mut physics = PlatformerPhysics::new(
            config.gravity,
            config.player_hitbox(),
            config.player_start(),
        );

        let roles = [
            (&layers.platforms, CollisionGroup::Wall),
            (&layers.ladders, CollisionGroup::Ladder),
            (&layers.coins, CollisionGroup::Pickup),
            (&layers.dont_touch, CollisionGroup::Hazard),
        ];
        let mut statics = Vec::new();
        for (name, group) in roles {
            let Some(list) = scene.list(name) else {
                log::warn!("Map has no '{name}' layer");
                continue;
            };
            statics.extend(
                list.sprites()
                    .iter()
                    .map(|s| (s.entity, sprite_rect(s.center, s.size), group)),
            );
        }
        physics.add_statics(statics);

        if let Some(list) = scene.list(&layers.moving_platforms) {
            for sprite in list.sprites() {
                let motion = platform_motion(&sprite.properties, map.scaling);
                physics.add_moving_platform(
                    sprite.entity,
                    sprite_rect(sprite.center, sprite.size),
                    motion,
                );
            }
        }

        scene.add_list_before(&layers.player, &layers.foreground);

        let coins = scene.list(&layers.coins).map_or(0, |l| l.len());
        log::info!(
            "Loaded {}x{} map with {} layers and {} coins",
            map.width,
            map.height,
            scene.lists().len(),
            coins
        );

        let mut follow = CameraFollow::new(config.viewport());
        follow.move_to(Vec2::ZERO, config.camera_speed);

        Self {
            scene,
            physics,
            player: Player::new(),
            player_layer: layers.player.clone(),
            keys: DirectionKeys::default(),
            jump_needs_reset: false,
            speeds: Speeds {
                move_speed: config.move_speed,
                jump_speed: config.jump_speed,
                climb_speed: config.climb_speed,
            },
            key_jump_probe: config.key_jump_probe,
            tick_jump_probe: config.tick_jump_probe,
            score: 0,
            win_score: config.win_score,
            win_logged: false,
            camera: Camera2D::default(),
            follow,
            camera_speed: config.camera_speed,
            background_color: map.background_color.unwrap_or(config.background_color),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_center(&self) -> Vec2 {
        self.physics.player_center()
    }

    pub fn player_velocity(&self) -> Vec2 {
        self.physics.player_velocity()
    }

    /// Index of the sprite list the player is drawn after.
    pub fn player_layer_index(&self) -> Option<usize> {
        self.scene.list_index(&self.player_layer)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn jump_needs_reset(&self) -> bool {
        self.jump_needs_reset
    }

    pub fn camera(&self) -> Camera2D {
        self.camera
    }

    pub fn background_color(&self) -> [f32; 4] {
        self.background_color
    }

    /// Visible area in world pixels; the camera keeps the player centred in it.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.follow.viewport = viewport;
    }

    /// A directional key went down or up.
    pub fn key_changed(
        &mut self,
        direction: Direction,
        held: bool,
        audio: &mut dyn AudioOutput,
        sounds: &Sounds,
    ) {
        self.keys.set(direction, held);
        if direction == Direction::Up && !held {
            self.jump_needs_reset = false;
        }
        self.apply_intent(audio, sounds);
    }

    fn apply_intent(&mut self, audio: &mut dyn AudioOutput, sounds: &Sounds) {
        let contacts = Contacts {
            on_ladder: self.physics.is_on_ladder(),
            can_jump: self.physics.can_jump(self.key_jump_probe),
        };
        let intent = recompute_intent(
            self.keys,
            contacts,
            self.jump_needs_reset,
            self.physics.player_velocity(),
            &self.speeds,
        );
        self.physics
            .set_player_velocity(Vec2::new(intent.change_x, intent.change_y));
        self.jump_needs_reset = intent.jump_needs_reset;
        if intent.jumped {
            audio.play(&sounds.jump, 1.0, false);
        }
    }

    /// Advance the world one fixed step.
    pub fn tick(&mut self, audio: &mut dyn AudioOutput, sounds: &Sounds) {
        self.physics.update();

        let can_jump = self.physics.can_jump(self.tick_jump_probe);
        let climbing = self.physics.is_on_ladder() && !can_jump;

        // Contacts may have changed without a key event.
        self.apply_intent(audio, sounds);

        let velocity = self.physics.player_velocity();
        self.player
            .update_animation(velocity.x, velocity.y, climbing, can_jump);

        self.physics.step_platforms();
        let moved: Vec<(EntityId, Vec2)> = self.physics.moving_platforms().collect();
        for (entity, center) in moved {
            self.scene.set_center(entity, center);
        }

        self.collect_coins(audio, sounds);

        if self.score >= self.win_score && !self.win_logged {
            log::info!("All {} coins collected", self.score);
            self.win_logged = true;
        }

        let target = self.follow.target_for(self.physics.player_center());
        self.follow.move_to(target, self.camera_speed);
        self.follow.update(&mut self.camera);
    }

    fn collect_coins(&mut self, audio: &mut dyn AudioOutput, sounds: &Sounds) {
        for coin in self.physics.overlapping(CollisionGroup::Pickup) {
            self.physics.remove(coin);
            self.scene.remove(coin);
            audio.play(&sounds.coin, 1.0, false);
            self.score += 1;
            log::debug!("Collected coin {} (score {})", coin.to_u32(), self.score);
        }
    }
}

fn sprite_rect(center: Vec2, size: Vec2) -> Rect {
    Rect::new(center, size / 2.0)
}

/// Motion from a platform's custom properties.
///
/// Speeds are pixels per tick as authored; boundaries are map pixels and
/// get scaled like the map.
fn platform_motion(properties: &Properties, scaling: f32) -> PlatformMotion {
    let boundary = |name: &str| properties.get_f32(name).map(|v| v * scaling);
    PlatformMotion {
        change: Vec2::new(
            properties.get_f32("change_x").unwrap_or(0.0),
            properties.get_f32("change_y").unwrap_or(0.0),
        ),
        boundary_left: boundary("boundary_left"),
        boundary_right: boundary("boundary_right"),
        boundary_top: boundary("boundary_top"),
        boundary_bottom: boundary("boundary_bottom"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinclimb::PlaybackId;
    use std::path::Path;

    /// Remembers what was played instead of making noise.
    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<String>,
    }

    impl RecordingAudio {
        fn count(&self, name: &str) -> usize {
            self.played.iter().filter(|p| *p == name).count()
        }
    }

    impl AudioOutput for RecordingAudio {
        fn play(
            &mut self,
            sound: &SoundHandle,
            _volume: f32,
            _looping: bool,
        ) -> Option<PlaybackId> {
            self.played.push(sound.name().to_string());
            None
        }

        fn stop(&mut self, _id: PlaybackId) {}
    }

    fn sounds() -> Sounds {
        Sounds {
            coin: SoundHandle::from_bytes("coin", Vec::new()),
            jump: SoundHandle::from_bytes("jump", Vec::new()),
        }
    }

    // 20x6 tiles of 128 px at scaling 0.5: a 64 px floor along the bottom
    // row, two coins above it at x 224 and 288, a ladder column at x 608
    // and a moving platform carrying boundaries.
    const MAP: &str = r##"{
        "width": 20, "height": 6, "tilewidth": 128, "tileheight": 128,
        "backgroundcolor": "#102030",
        "tilesets": [ { "firstgid": 1, "tilewidth": 128, "tileheight": 128, "tiles": [
            { "id": 0, "image": "grass.png", "imagewidth": 128, "imageheight": 128 },
            { "id": 1, "image": "coin.png", "imagewidth": 128, "imageheight": 128 },
            { "id": 2, "image": "ladder.png", "imagewidth": 128, "imageheight": 128 },
            { "id": 3, "image": "platform.png", "imagewidth": 128, "imageheight": 128,
              "properties": [
                { "name": "change_x", "type": "float", "value": 2 },
                { "name": "boundary_left", "type": "float", "value": 1536 },
                { "name": "boundary_right", "type": "float", "value": 2304 }
              ] }
        ] } ],
        "layers": [
            { "type": "tilelayer", "name": "Background", "width": 20, "height": 6,
              "data": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] },
            { "type": "tilelayer", "name": "Platforms", "width": 20, "height": 6,
              "data": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1] },
            { "type": "tilelayer", "name": "Moving Platforms", "width": 20, "height": 6,
              "data": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,4,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] },
            { "type": "tilelayer", "name": "Ladders", "width": 20, "height": 6,
              "data": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] },
            { "type": "tilelayer", "name": "Coins", "width": 20, "height": 6,
              "data": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,2,2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] },
            { "type": "tilelayer", "name": "Foreground", "width": 20, "height": 6,
              "data": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
                       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] }
        ]
    }"##;

    fn config() -> GameConfig {
        GameConfig {
            win_score: 2,
            ..GameConfig::default()
        }
    }

    fn level_with(config: &GameConfig) -> Level {
        let map = TileMap::from_json_str(MAP, Path::new(""), config.tile_scaling).expect("map");
        Level::new(config, &map)
    }

    fn level() -> Level {
        level_with(&config())
    }

    fn run(level: &mut Level, audio: &mut RecordingAudio, ticks: usize) {
        let sounds = sounds();
        for _ in 0..ticks {
            level.tick(audio, &sounds);
        }
    }

    /// Put the player on the floor at `x` and let it settle.
    fn settle_at(level: &mut Level, x: f32, audio: &mut RecordingAudio) {
        level.physics.set_player_center(Vec2::new(x, 128.0));
        level.physics.set_player_velocity(Vec2::ZERO);
        run(level, audio, 1);
    }

    #[test]
    fn player_list_goes_before_the_foreground() {
        let level = level();
        let names: Vec<_> = level.scene().lists().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Background",
                "Platforms",
                "Moving Platforms",
                "Ladders",
                "Coins",
                "Player",
                "Foreground",
            ]
        );
        assert_eq!(level.player_layer_index(), Some(5));
    }

    #[test]
    fn map_background_colour_wins_over_the_default() {
        let level = level();
        let [r, g, b, _] = level.background_color();
        assert!((r - 16.0 / 255.0).abs() < 1e-6);
        assert!((g - 32.0 / 255.0).abs() < 1e-6);
        assert!((b - 48.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn player_drops_onto_the_floor_and_idles() {
        let mut level = level();
        let mut audio = RecordingAudio::default();
        run(&mut level, &mut audio, 60);
        assert_eq!(level.player_center().y, 128.0);
        assert_eq!(level.player().frame(), crate::player::PlayerFrame::Idle);
        assert!(audio.played.is_empty());
    }

    #[test]
    fn jumping_plays_one_sound_until_up_is_released() {
        let mut level = level();
        let mut audio = RecordingAudio::default();
        let sounds = sounds();
        settle_at(&mut level, 128.0, &mut audio);

        level.key_changed(Direction::Up, true, &mut audio, &sounds);
        assert_eq!(level.player_velocity().y, 30.0);
        assert!(level.jump_needs_reset());
        assert_eq!(audio.count("jump"), 1);

        // Holding up through the landing does not jump again.
        run(&mut level, &mut audio, 60);
        assert_eq!(level.player_center().y, 128.0);
        assert_eq!(audio.count("jump"), 1);

        level.key_changed(Direction::Up, false, &mut audio, &sounds);
        assert!(!level.jump_needs_reset());
        level.key_changed(Direction::Up, true, &mut audio, &sounds);
        assert_eq!(audio.count("jump"), 2);
    }

    #[test]
    fn coins_score_once_and_disappear() {
        let mut level = level();
        let mut audio = RecordingAudio::default();
        let sounds = sounds();
        settle_at(&mut level, 128.0, &mut audio);

        level.key_changed(Direction::Right, true, &mut audio, &sounds);
        let mut scores = Vec::new();
        for _ in 0..40 {
            level.tick(&mut audio, &sounds);
            scores.push(level.score());
        }

        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(level.score(), 2);
        assert_eq!(audio.count("coin"), 2);
        assert!(level.scene().list("Coins").expect("coins").is_empty());
        assert!(level.win_logged);

        // Walking back over the spot scores nothing.
        level.key_changed(Direction::Right, false, &mut audio, &sounds);
        level.key_changed(Direction::Left, true, &mut audio, &sounds);
        run(&mut level, &mut audio, 40);
        assert_eq!(level.score(), 2);
        assert_eq!(audio.count("coin"), 2);
    }

    #[test]
    fn ladders_let_the_player_climb() {
        let mut level = level();
        let mut audio = RecordingAudio::default();
        let sounds = sounds();
        settle_at(&mut level, 608.0, &mut audio);

        level.key_changed(Direction::Up, true, &mut audio, &sounds);
        run(&mut level, &mut audio, 10);
        assert!(level.player_center().y > 128.0);
        assert_eq!(level.player_velocity().y, 7.0);
        assert!(level.player().state().is_climbing());
        assert_eq!(audio.count("jump"), 0);

        level.key_changed(Direction::Up, false, &mut audio, &sounds);
        let height = level.player_center().y;
        run(&mut level, &mut audio, 5);
        assert_eq!(level.player_center().y, height);
    }

    #[test]
    fn moving_platforms_move_their_sprites_too() {
        let mut level = level();
        let mut audio = RecordingAudio::default();
        let platform = level.scene().list("Moving Platforms").expect("list").sprites()[0].clone();
        assert_eq!(platform.center, Vec2::new(864.0, 224.0));

        run(&mut level, &mut audio, 3);
        let moved = level.scene().sprite(platform.entity).expect("still there");
        assert_eq!(moved.center, Vec2::new(870.0, 224.0));
    }

    #[test]
    fn boundaries_scale_with_the_map() {
        let map = TileMap::from_json_str(MAP, Path::new(""), 0.5).expect("map");
        let layer = map.layer("Moving Platforms").expect("layer");
        let motion = platform_motion(&layer.tiles[0].properties, map.scaling);
        assert_eq!(motion.change, Vec2::new(2.0, 0.0));
        assert_eq!(motion.boundary_left, Some(768.0));
        assert_eq!(motion.boundary_right, Some(1152.0));
        assert_eq!(motion.boundary_top, None);
    }

    #[test]
    fn camera_eases_toward_the_player_but_stays_in_the_world() {
        let mut level = level();
        let mut audio = RecordingAudio::default();
        level.set_viewport(Vec2::new(400.0, 300.0));
        settle_at(&mut level, 1000.0, &mut audio);

        let first = level.camera().position;
        assert!(first.x > 0.0 && first.x < 800.0);
        assert_eq!(first.y, 0.0);

        run(&mut level, &mut audio, 60);
        assert!((level.camera().position.x - 800.0).abs() < 0.5);
        assert_eq!(level.camera().position.y, 0.0);
    }
}
