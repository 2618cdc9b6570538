use std::collections::BTreeMap;

use crate::components::entity::Entity;
use crate::components::obstacle::ObstaclePair;
use crate::core::physics::PhysicsWorld;

/// Entity storage: named entities plus a numerically indexed obstacle pool.
///
/// Systems take the store by value and hand it back, so a tick replaces the
/// whole store at once from the consumer's point of view. `revision` counts
/// committed ticks for cheap change detection.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    named: BTreeMap<String, Entity>,
    obstacles: Vec<ObstaclePair>,
    revision: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named entity. Returns the previous entity under that key.
    pub fn insert(&mut self, key: impl Into<String>, entity: Entity) -> Option<Entity> {
        self.named.insert(key.into(), entity)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, entity: Entity) -> Self {
        self.insert(key, entity);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Entity> {
        self.named.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.named.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.named.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.named.contains_key(key)
    }

    /// Append an obstacle slot. Slots keep their index for the store's lifetime.
    pub fn push_obstacle(&mut self, pair: ObstaclePair) {
        self.obstacles.push(pair);
    }

    pub fn obstacles(&self) -> &[ObstaclePair] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [ObstaclePair] {
        &mut self.obstacles
    }

    /// The first entity of kind `Player`.
    pub fn player(&self) -> Option<&Entity> {
        self.named.values().find(|e| e.is_player())
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.named.values_mut().find(|e| e.is_player())
    }

    /// Iterate all entities with a display key. Obstacles are keyed
    /// `obstacle<N>Top` / `obstacle<N>Bottom`, counting from 1.
    pub fn iter(&self) -> impl Iterator<Item = (String, &Entity)> {
        let named = self.named.iter().map(|(k, e)| (k.clone(), e));
        let obstacles = self.obstacles.iter().enumerate().flat_map(|(i, pair)| {
            [
                (format!("obstacle{}Top", i + 1), &pair.top),
                (format!("obstacle{}Bottom", i + 1), &pair.bottom),
            ]
        });
        named.chain(obstacles)
    }

    /// Iterate all entities mutably, named first, then obstacles.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.named
            .values_mut()
            .chain(self.obstacles.iter_mut().flat_map(|pair| pair.iter_mut()))
    }

    /// Copy body positions out of the simulation into `Entity::pos`.
    pub fn sync_from(&mut self, physics: &PhysicsWorld) {
        for entity in self.iter_mut() {
            if let Some(body) = &entity.body {
                let (pos, _rot) = physics.body_position(body);
                entity.pos = pos;
            }
        }
    }

    /// Number of entities, counting both halves of every obstacle pair.
    pub fn len(&self) -> usize {
        self.named.len() + self.obstacles.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::entity::EntityKind;
    use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};
    use glam::Vec2;

    #[test]
    fn insert_and_get() {
        let mut store = EntityStore::new();
        store.insert("floor", Entity::new(EntityId(1)).with_pos(Vec2::new(10.0, 20.0)));
        let e = store.get("floor").unwrap();
        assert_eq!(e.pos, Vec2::new(10.0, 20.0));
        assert!(store.contains("floor"));
        assert!(store.remove("floor").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn finds_player_by_kind() {
        let store = EntityStore::new()
            .with("floor", Entity::new(EntityId(1)))
            .with(
                "bird",
                Entity::new(EntityId(2)).with_kind(EntityKind::Player { airborne: false, alive: true }),
            );
        assert_eq!(store.player().unwrap().id, EntityId(2));
    }

    #[test]
    fn iter_keys_obstacles_from_one() {
        let mut store = EntityStore::new();
        store.push_obstacle(ObstaclePair::new(Entity::new(EntityId(1)), Entity::new(EntityId(2))));
        let keys: Vec<String> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["obstacle1Top", "obstacle1Bottom"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn sync_copies_body_positions() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let body = physics.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Ball { radius: 5.0 }).with_position(Vec2::new(30.0, 40.0)),
            ColliderMaterial::default(),
        );
        let mut store = EntityStore::new().with("ball", Entity::new(EntityId(1)).with_body(body));
        store.sync_from(&physics);
        assert_eq!(store.get("ball").unwrap().pos, Vec2::new(30.0, 40.0));
    }
}
