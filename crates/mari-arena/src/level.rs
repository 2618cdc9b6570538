//! Level setup: the bird, the floor, the score display and the pipe slots.

use glam::Vec2;
use mari_engine::{
    BodyDesc, ColliderDesc, ColliderMaterial, Entity, EntityId, EntityKind, EntityStore,
    ObstaclePair, PhysicsWorld,
};

use crate::config::ArenaConfig;
use crate::renderers;
use crate::rng::Rng;

pub const PLAYER: &str = "bird";
pub const FLOOR: &str = "floor";
pub const SCORE: &str = "score";

const PLAYER_ID: EntityId = EntityId(1);
const FLOOR_ID: EntityId = EntityId(2);
const SCORE_ID: EntityId = EntityId(3);
const FIRST_PIPE_ID: u32 = 100;

/// Heights of a top and a bottom pipe. One of them is drawn from
/// `[100, height/2 - 100)`, the other fills the rest minus the gap. Which
/// one is top is a coin flip.
pub fn pipe_heights(config: &ArenaConfig, rng: &mut Rng) -> (f32, f32) {
    let height = config.viewport.height;
    let first = rng.range(100.0, height / 2.0 - 100.0);
    let second = height - first - config.pipe_gap;
    if rng.coin() {
        (second, first)
    } else {
        (first, second)
    }
}

/// Build the live store and create its bodies in `physics`.
pub fn build(config: &ArenaConfig, physics: &mut PhysicsWorld, rng: &mut Rng) -> EntityStore {
    let viewport = config.viewport;
    let mut store = EntityStore::new();

    let bird = BodyDesc::dynamic(ColliderDesc::rect(config.player_size))
        .with_position(config.player_spawn())
        .with_fixed_rotation(true)
        .with_ccd(true);
    store.insert(
        PLAYER,
        Entity::new(PLAYER_ID)
            .with_kind(EntityKind::Player { airborne: false, alive: true })
            .with_pos(config.player_spawn())
            .with_size(config.player_size)
            .with_color("green")
            .with_renderer(renderers::bird)
            .with_body(physics.create_body(PLAYER_ID, &bird, ColliderMaterial::default())),
    );

    let floor_size = Vec2::new(viewport.width, config.floor_height());
    let floor_pos = Vec2::new(viewport.width / 2.0, viewport.height - floor_size.y / 2.0);
    let floor = BodyDesc::fixed(ColliderDesc::rect(floor_size)).with_position(floor_pos);
    store.insert(
        FLOOR,
        Entity::new(FLOOR_ID)
            .with_pos(floor_pos)
            .with_size(floor_size)
            .with_color("#ff5252")
            .with_renderer(renderers::wall)
            .with_body(physics.create_body(FLOOR_ID, &floor, ColliderMaterial::default())),
    );

    store.insert(
        SCORE,
        Entity::new(SCORE_ID)
            .with_kind(EntityKind::Counter { value: 0 })
            .with_pos(Vec2::new(viewport.width / 2.0, 60.0))
            .with_size(Vec2::new(100.0, 50.0))
            .with_renderer(renderers::score),
    );

    for slot in 0..config.pipe_slots {
        let (top_height, bottom_height) = pipe_heights(config, rng);
        let x = viewport.width - config.pipe_width / 2.0 + config.pipe_spacing * (slot + 1) as f32;
        let top_id = EntityId(FIRST_PIPE_ID + 2 * slot as u32);
        let bottom_id = EntityId(top_id.0 + 1);
        let top = pipe(physics, top_id, Vec2::new(x, top_height / 2.0), config.pipe_width, top_height);
        let bottom = pipe(
            physics,
            bottom_id,
            Vec2::new(x, viewport.height - bottom_height / 2.0),
            config.pipe_width,
            bottom_height,
        );
        store.push_obstacle(ObstaclePair::new(top, bottom));
    }

    log::debug!(
        "level: built {} entities, {} bodies",
        store.len(),
        physics.body_count()
    );
    store
}

fn pipe(physics: &mut PhysicsWorld, id: EntityId, pos: Vec2, width: f32, height: f32) -> Entity {
    let size = Vec2::new(width, height);
    let desc = BodyDesc::fixed(ColliderDesc::rect(size)).with_position(pos);
    Entity::new(id)
        .with_pos(pos)
        .with_size(size)
        .with_color("green")
        .with_renderer(renderers::pipe)
        .with_body(physics.create_body(id, &desc, ColliderMaterial::default()))
}

/// The store shown while waiting for the game to start: the live store's
/// named entities, without pipes.
pub fn waiting_room(live: &EntityStore) -> EntityStore {
    [PLAYER, FLOOR, SCORE]
        .into_iter()
        .filter_map(|key| live.get(key).map(|e| (key, e.clone())))
        .fold(EntityStore::new(), |store, (key, entity)| store.with(key, entity))
}
