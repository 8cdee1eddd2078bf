//! Sprite lists built from a Tiled map, kept in draw order.

use anyhow::Result;

use crate::assets::AssetManager;
use crate::math::{Camera2D, Vec2};
use crate::render::{Frame, Renderer, Sprite};
use crate::tilemap::{Properties, TileImage, TileMap};

/// Unique identifier for a sprite in a scene and its collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying integer ID (useful for debugging).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// One placed sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSprite {
    pub entity: EntityId,
    pub image: TileImage,
    pub center: Vec2,
    /// Drawn size in world pixels.
    pub size: Vec2,
    pub flip_x: bool,
    pub flip_y: bool,
    pub properties: Properties,
}

impl SceneSprite {
    fn to_sprite(&self, assets: &mut AssetManager, renderer: &mut Renderer) -> Result<Sprite> {
        let texture = assets.load_texture(renderer, &self.image.path)?;
        let mut sprite = Sprite::new(texture);
        sprite.transform.position = self.center;
        sprite.size = Some(self.size);
        sprite.uv_rect = self.image.uv_rect;
        sprite.flip_x = self.flip_x;
        sprite.flip_y = self.flip_y;
        Ok(sprite)
    }
}

/// A named list of sprites drawn together.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteList {
    pub name: String,
    pub visible: bool,
    sprites: Vec<SceneSprite>,
}

impl SpriteList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            sprites: Vec::new(),
        }
    }

    pub fn sprites(&self) -> &[SceneSprite] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn draw(
        &self,
        renderer: &mut Renderer,
        frame: &mut Frame,
        assets: &mut AssetManager,
        camera: &Camera2D,
    ) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        for sprite in &self.sprites {
            let sprite = sprite.to_sprite(assets, renderer)?;
            renderer.draw_sprite(frame, &sprite, camera)?;
        }
        Ok(())
    }
}

/// Ordered collection of sprite lists.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    lists: Vec<SpriteList>,
    next_entity: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            lists: Vec::new(),
            next_entity: 1,
        }
    }

    /// One sprite list per map layer, in map order. Every tile gets a fresh
    /// [`EntityId`].
    pub fn from_tilemap(map: &TileMap) -> Self {
        let mut scene = Self::new();
        for layer in &map.layers {
            let mut list = SpriteList::new(layer.name.clone());
            list.visible = layer.visible;
            for tile in &layer.tiles {
                let entity = scene.spawn_entity();
                list.sprites.push(SceneSprite {
                    entity,
                    image: tile.image.clone(),
                    center: tile.rect.center,
                    size: tile.rect.size(),
                    flip_x: tile.flip_x,
                    flip_y: tile.flip_y,
                    properties: tile.properties.clone(),
                });
            }
            scene.lists.push(list);
        }
        scene
    }

    /// Reserve an id for an entity that lives outside the sprite lists.
    pub fn spawn_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity.max(1));
        self.next_entity = id.0 + 1;
        id
    }

    pub fn lists(&self) -> &[SpriteList] {
        &self.lists
    }

    pub fn list(&self, name: &str) -> Option<&SpriteList> {
        self.lists.iter().find(|l| l.name == name)
    }

    pub fn list_index(&self, name: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.name == name)
    }

    /// Insert an empty list named `name` just before the list `before`, or at
    /// the end when there is no such list. Returns the new list's index.
    ///
    /// Does nothing but return the index if `name` already exists.
    pub fn add_list_before(&mut self, name: &str, before: &str) -> usize {
        if let Some(index) = self.list_index(name) {
            return index;
        }
        let index = self.list_index(before).unwrap_or(self.lists.len());
        self.lists.insert(index, SpriteList::new(name));
        index
    }

    pub fn sprite(&self, entity: EntityId) -> Option<&SceneSprite> {
        self.lists
            .iter()
            .flat_map(|l| l.sprites.iter())
            .find(|s| s.entity == entity)
    }

    /// Remove a sprite from whichever list holds it.
    pub fn remove(&mut self, entity: EntityId) -> Option<SceneSprite> {
        for list in &mut self.lists {
            if let Some(pos) = list.sprites.iter().position(|s| s.entity == entity) {
                return Some(list.sprites.remove(pos));
            }
        }
        None
    }

    /// Move a sprite. Returns false if no sprite has that id.
    pub fn set_center(&mut self, entity: EntityId, center: Vec2) -> bool {
        for list in &mut self.lists {
            if let Some(sprite) = list.sprites.iter_mut().find(|s| s.entity == entity) {
                sprite.center = center;
                return true;
            }
        }
        false
    }

    /// Load every texture the scene uses so the first frame does not stall.
    pub fn preload(&self, assets: &mut AssetManager, renderer: &mut Renderer) -> Result<()> {
        for sprite in self.lists.iter().flat_map(|l| l.sprites.iter()) {
            assets.load_texture(renderer, &sprite.image.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const MAP: &str = r#"{
        "width": 3, "height": 2, "tilewidth": 128, "tileheight": 128,
        "tilesets": [ { "firstgid": 1, "tilewidth": 128, "tileheight": 128, "tiles": [
            { "id": 0, "image": "grass.png", "imagewidth": 128, "imageheight": 128 },
            { "id": 1, "image": "coin.png", "imagewidth": 128, "imageheight": 128 }
        ] } ],
        "layers": [
            { "type": "tilelayer", "name": "Platforms", "width": 3, "height": 2,
              "data": [0,0,0, 1,1,1] },
            { "type": "tilelayer", "name": "Coins", "width": 3, "height": 2,
              "data": [0,2,2, 0,0,0] },
            { "type": "tilelayer", "name": "Foreground", "width": 3, "height": 2,
              "data": [0,0,0, 0,0,0] }
        ]
    }"#;

    fn scene() -> Scene {
        let map = TileMap::from_json_str(MAP, Path::new(""), 0.5).expect("map");
        Scene::from_tilemap(&map)
    }

    #[test]
    fn lists_follow_map_order_with_unique_ids() {
        let scene = scene();
        let names: Vec<_> = scene.lists().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Platforms", "Coins", "Foreground"]);

        let mut ids: Vec<_> = scene
            .lists()
            .iter()
            .flat_map(|l| l.sprites().iter().map(|s| s.entity))
            .collect();
        assert_eq!(ids.len(), 5);
        ids.dedup();
        assert_eq!(ids.len(), 5);

        let coin = &scene.list("Coins").expect("coins").sprites()[0];
        assert_eq!(coin.center, Vec2::new(96.0, 96.0));
        assert_eq!(coin.size, Vec2::new(64.0, 64.0));
    }

    #[test]
    fn removed_sprites_are_gone_for_good() {
        let mut scene = scene();
        let coin = scene.list("Coins").expect("coins").sprites()[0].entity;
        assert!(scene.remove(coin).is_some());
        assert!(scene.remove(coin).is_none());
        assert!(scene.sprite(coin).is_none());
        assert_eq!(scene.list("Coins").map(SpriteList::len), Some(1));
    }

    #[test]
    fn lists_can_be_inserted_before_another() {
        let mut scene = scene();
        assert_eq!(scene.add_list_before("Player", "Foreground"), 2);
        assert_eq!(scene.add_list_before("Player", "Coins"), 2);
        assert_eq!(scene.add_list_before("Overlay", "Missing"), 4);
    }

    #[test]
    fn sprites_can_be_moved_and_new_ids_do_not_collide() {
        let mut scene = scene();
        let first = scene.list("Platforms").expect("list").sprites()[0].entity;
        assert!(scene.set_center(first, Vec2::new(1.0, 2.0)));
        assert_eq!(scene.sprite(first).map(|s| s.center), Some(Vec2::new(1.0, 2.0)));

        let fresh = scene.spawn_entity();
        assert!(scene.sprite(fresh).is_none());
        assert!(!scene.set_center(fresh, Vec2::ZERO));
    }
}
