//! Arcade-style platformer physics.
//!
//! Only the player moves freely; everything else is an axis-aligned box that
//! is either static or a kinematic moving platform. Rapier's query pipeline
//! finds static collision candidates while resolution happens here on exact
//! rectangles, one axis at a time. Moving platforms stay out of the query
//! tree and are checked directly, so moving them never rebuilds it.

use std::collections::BTreeMap;

use crate::math::{Rect, Vec2};
use crate::scene::EntityId;

// Rapier is private implementation detail: do NOT re-export it.
use rapier2d::prelude::*;

/// Penetration below this depth counts as touching, not overlapping.
const SKIN: f32 = 0.01;

/// Role of a static or kinematic collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionGroup {
    /// Solid terrain.
    Wall,
    /// Solid terrain that may move.
    Platform,
    Ladder,
    Pickup,
    Hazard,
}

impl CollisionGroup {
    const ALL: [CollisionGroup; 5] = [
        CollisionGroup::Wall,
        CollisionGroup::Platform,
        CollisionGroup::Ladder,
        CollisionGroup::Pickup,
        CollisionGroup::Hazard,
    ];

    fn to_bits(self) -> u128 {
        self as u128
    }

    fn from_bits(bits: u128) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }
}

const SOLID: [CollisionGroup; 2] = [CollisionGroup::Wall, CollisionGroup::Platform];

/// Kinematics of a moving platform, in world pixels per tick.
///
/// A platform reverses when it reaches one of its boundaries; a missing
/// boundary never reverses it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlatformMotion {
    pub change: Vec2,
    pub boundary_left: Option<f32>,
    pub boundary_right: Option<f32>,
    pub boundary_top: Option<f32>,
    pub boundary_bottom: Option<f32>,
}

/// Player collision box relative to the player's centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub half_width: f32,
    /// Offset of the bottom edge (negative: below the centre).
    pub bottom: f32,
    /// Offset of the top edge.
    pub top: f32,
}

impl Hitbox {
    pub fn rect_at(&self, center: Vec2) -> Rect {
        Rect::from_edges(
            center.x - self.half_width,
            center.x + self.half_width,
            center.y + self.bottom,
            center.y + self.top,
        )
    }
}

struct Body {
    rect: Rect,
    group: CollisionGroup,
    motion: Option<PlatformMotion>,
    /// Static bodies only.
    handle: Option<ColliderHandle>,
}

fn penetrates(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() - SKIN
        && b.left() < a.right() - SKIN
        && a.bottom() < b.top() - SKIN
        && b.bottom() < a.top() - SKIN
}

fn user_data(entity: EntityId, group: CollisionGroup) -> u128 {
    (entity.to_u32() as u128) | (group.to_bits() << 32)
}

/// Player-versus-tiles physics world.
pub struct PlatformerPhysics {
    colliders: ColliderSet,
    rigid_bodies: RigidBodySet,
    island_manager: IslandManager,
    query_pipeline: QueryPipeline,
    /// Times the query tree was rebuilt.
    tree_builds: usize,
    bodies: BTreeMap<EntityId, Body>,

    gravity: f32,
    hitbox: Hitbox,
    player_center: Vec2,
    player_velocity: Vec2,
}

impl PlatformerPhysics {
    /// Create an empty world. `gravity` is subtracted from the player's
    /// vertical velocity every tick.
    pub fn new(gravity: f32, hitbox: Hitbox, player_center: Vec2) -> Self {
        Self {
            colliders: ColliderSet::new(),
            rigid_bodies: RigidBodySet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            tree_builds: 0,
            bodies: BTreeMap::new(),
            gravity,
            hitbox,
            player_center,
            player_velocity: Vec2::ZERO,
        }
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Add a static collider.
    ///
    /// Prefer [`add_statics`](Self::add_statics) when loading a level: each
    /// call here rebuilds the query tree.
    pub fn add_static(&mut self, entity: EntityId, rect: Rect, group: CollisionGroup) {
        self.add_statics([(entity, rect, group)]);
    }

    /// Add many static colliders, rebuilding the query tree once at the end.
    pub fn add_statics<I>(&mut self, statics: I)
    where
        I: IntoIterator<Item = (EntityId, Rect, CollisionGroup)>,
    {
        let mut added = 0usize;
        for (entity, rect, group) in statics {
            self.remove_body(entity);
            let collider = ColliderBuilder::cuboid(rect.half_extents.x, rect.half_extents.y)
                .translation(vector![rect.center.x, rect.center.y])
                .user_data(user_data(entity, group))
                .build();
            let handle = self.colliders.insert(collider);
            self.bodies.insert(
                entity,
                Body {
                    rect,
                    group,
                    motion: None,
                    handle: Some(handle),
                },
            );
            added += 1;
        }
        if added > 0 {
            self.rebuild_queries();
        }
    }

    /// Add a platform that moves by `motion` every [`step_platforms`](Self::step_platforms).
    pub fn add_moving_platform(&mut self, entity: EntityId, rect: Rect, motion: PlatformMotion) {
        let replaced = self.remove_body(entity);
        if replaced.map_or(false, |b| b.handle.is_some()) {
            self.rebuild_queries();
        }
        self.bodies.insert(
            entity,
            Body {
                rect,
                group: CollisionGroup::Platform,
                motion: Some(motion),
                handle: None,
            },
        );
    }

    /// Remove an entity's collider. Returns false if it had none.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        match self.remove_body(entity) {
            Some(body) => {
                if body.handle.is_some() {
                    self.rebuild_queries();
                }
                true
            }
            None => false,
        }
    }

    fn remove_body(&mut self, entity: EntityId) -> Option<Body> {
        let body = self.bodies.remove(&entity)?;
        if let Some(handle) = body.handle {
            self.colliders.remove(
                handle,
                &mut self.island_manager,
                &mut self.rigid_bodies,
                false,
            );
        }
        Some(body)
    }

    /// Rebuild the broad-phase tree from the current collider positions.
    ///
    /// Parentless colliders are not tracked incrementally by the pipeline,
    /// so any change to the collider set needs a fresh tree.
    fn rebuild_queries(&mut self) {
        self.query_pipeline = QueryPipeline::new();
        self.query_pipeline
            .update(&self.island_manager, &self.rigid_bodies, &self.colliders);
        self.tree_builds += 1;
    }

    pub fn player_center(&self) -> Vec2 {
        self.player_center
    }

    pub fn set_player_center(&mut self, center: Vec2) {
        self.player_center = center;
    }

    pub fn player_velocity(&self) -> Vec2 {
        self.player_velocity
    }

    pub fn set_player_velocity(&mut self, velocity: Vec2) {
        self.player_velocity = velocity;
    }

    pub fn player_rect(&self) -> Rect {
        self.hitbox.rect_at(self.player_center)
    }

    pub fn collider_center(&self, entity: EntityId) -> Option<Vec2> {
        self.bodies.get(&entity).map(|b| b.rect.center)
    }

    pub fn collider_rect(&self, entity: EntityId) -> Option<Rect> {
        self.bodies.get(&entity).map(|b| b.rect)
    }

    /// Current centres of all moving platforms.
    pub fn moving_platforms(&self) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        self.bodies
            .iter()
            .filter(|(_, b)| b.motion.is_some())
            .map(|(e, b)| (*e, b.rect.center))
    }

    /// Entities whose colliders penetrate `rect` and belong to one of `groups`.
    fn hits(&self, rect: &Rect, groups: &[CollisionGroup]) -> Vec<EntityId> {
        let mut found = Vec::new();

        if self.colliders.len() > 0 {
            let shape = SharedShape::cuboid(rect.half_extents.x, rect.half_extents.y);
            let position = Isometry::translation(rect.center.x, rect.center.y);
            self.query_pipeline.intersections_with_shape(
                &self.rigid_bodies,
                &self.colliders,
                &position,
                &*shape,
                QueryFilter::default(),
                |handle| {
                    if let Some(collider) = self.colliders.get(handle) {
                        let data = collider.user_data;
                        let group = CollisionGroup::from_bits(data >> 32);
                        let entity = EntityId::from_u32(data as u32);
                        if group.map_or(false, |g| groups.contains(&g)) {
                            found.push(entity);
                        }
                    }
                    true
                },
            );
        }

        found.extend(
            self.bodies
                .iter()
                .filter(|(_, b)| b.handle.is_none() && groups.contains(&b.group))
                .map(|(e, _)| *e),
        );
        found.retain(|e| {
            self.bodies
                .get(e)
                .map_or(false, |b| penetrates(&b.rect, rect))
        });
        found.sort();
        found.dedup();
        found
    }

    /// Entities of `group` overlapping the player.
    pub fn overlapping(&self, group: CollisionGroup) -> Vec<EntityId> {
        self.hits(&self.player_rect(), &[group])
    }

    pub fn is_on_ladder(&self) -> bool {
        !self.overlapping(CollisionGroup::Ladder).is_empty()
    }

    /// True if solid ground lies within `probe` pixels below the player.
    pub fn can_jump(&self, probe: f32) -> bool {
        let mut rect = self.player_rect();
        rect.center.y -= probe;
        !self.hits(&rect, &SOLID).is_empty()
    }

    /// Apply gravity and move the player, resolving against solid colliders.
    pub fn update(&mut self) {
        if !self.is_on_ladder() {
            self.player_velocity.y -= self.gravity;
        }
        self.move_vertically();
        self.move_horizontally();
    }

    fn move_vertically(&mut self) {
        let dy = self.player_velocity.y;
        self.player_center.y += dy;

        let hits = self.hits(&self.player_rect(), &SOLID);
        if hits.is_empty() {
            return;
        }

        let rects: Vec<(Rect, Option<PlatformMotion>)> = hits
            .iter()
            .filter_map(|e| self.bodies.get(e).map(|b| (b.rect, b.motion)))
            .collect();

        let support = if dy > 0.0 {
            let lowest = rects
                .iter()
                .min_by(|a, b| a.0.bottom().total_cmp(&b.0.bottom()));
            if let Some((rect, _)) = lowest {
                self.player_center.y = rect.bottom() - self.hitbox.top;
            }
            lowest
        } else if dy < 0.0 {
            let highest = rects
                .iter()
                .max_by(|a, b| a.0.top().total_cmp(&b.0.top()));
            if let Some((rect, _)) = highest {
                self.player_center.y = rect.top() - self.hitbox.bottom;
            }
            for (_, motion) in &rects {
                if let Some(motion) = motion {
                    self.player_center.x += motion.change.x;
                }
            }
            highest
        } else {
            rects.first()
        };

        let support_dy = support
            .and_then(|(_, motion)| motion.map(|m| m.change.y))
            .unwrap_or(0.0);
        self.player_velocity.y = support_dy.min(0.0);
    }

    fn move_horizontally(&mut self) {
        let dx = self.player_velocity.x;
        if dx == 0.0 {
            return;
        }
        self.player_center.x += dx;

        let hits = self.hits(&self.player_rect(), &SOLID);
        if hits.is_empty() {
            return;
        }

        // Walk up small steps and slopes: rise one pixel at a time, at most |dx|.
        let original_y = self.player_center.y;
        let mut rise = 1.0;
        while rise <= dx.abs() {
            self.player_center.y = original_y + rise;
            if self.hits(&self.player_rect(), &SOLID).is_empty() {
                return;
            }
            rise += 1.0;
        }
        self.player_center.y = original_y;

        let edges = hits.iter().filter_map(|e| self.bodies.get(e).map(|b| b.rect));
        if dx > 0.0 {
            if let Some(left) = edges.map(|r| r.left()).min_by(f32::total_cmp) {
                self.player_center.x = left - self.hitbox.half_width;
            }
        } else if let Some(right) = edges.map(|r| r.right()).max_by(f32::total_cmp) {
            self.player_center.x = right + self.hitbox.half_width;
        }
    }

    /// Advance moving platforms one tick.
    ///
    /// Each platform reverses when it reaches a boundary, moves by its
    /// velocity and pushes the player out of the way if it runs into it.
    /// The query tree is left alone since platforms are not in it.
    pub fn step_platforms(&mut self) {
        let hitbox = self.hitbox;
        let mut player = self.player_center;

        for body in self.bodies.values_mut() {
            let Some(motion) = body.motion.as_mut() else {
                continue;
            };
            if motion.change == Vec2::ZERO {
                continue;
            }
            let rect = &mut body.rect;
            let half = rect.half_extents;

            if let Some(left) = motion.boundary_left {
                if rect.left() <= left {
                    rect.center.x = left + half.x;
                    if motion.change.x < 0.0 {
                        motion.change.x = -motion.change.x;
                    }
                }
            }
            if let Some(right) = motion.boundary_right {
                if rect.right() >= right {
                    rect.center.x = right - half.x;
                    if motion.change.x > 0.0 {
                        motion.change.x = -motion.change.x;
                    }
                }
            }
            rect.center.x += motion.change.x;
            if penetrates(&hitbox.rect_at(player), rect) {
                if motion.change.x < 0.0 {
                    player.x = rect.left() - hitbox.half_width;
                } else if motion.change.x > 0.0 {
                    player.x = rect.right() + hitbox.half_width;
                }
            }

            if let Some(top) = motion.boundary_top {
                if rect.top() >= top {
                    rect.center.y = top - half.y;
                    if motion.change.y > 0.0 {
                        motion.change.y = -motion.change.y;
                    }
                }
            }
            if let Some(bottom) = motion.boundary_bottom {
                if rect.bottom() <= bottom {
                    rect.center.y = bottom + half.y;
                    if motion.change.y < 0.0 {
                        motion.change.y = -motion.change.y;
                    }
                }
            }
            rect.center.y += motion.change.y;
            if penetrates(&hitbox.rect_at(player), rect) {
                if motion.change.y < 0.0 {
                    player.y = rect.bottom() - hitbox.top;
                } else if motion.change.y > 0.0 {
                    player.y = rect.top() - hitbox.bottom;
                }
            }
        }

        self.player_center = player;
    }
}
