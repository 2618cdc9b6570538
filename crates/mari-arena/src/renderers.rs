//! Renderers for the arena's entities.

use mari_engine::{Entity, Viewport, Visual};

pub const BIRD_UPFLAP: &str = "/assets/bird/redbird-upflap.png";
pub const BIRD_DOWNFLAP: &str = "/assets/bird/redbird-downflap.png";
pub const PIPE_SPRITE: &str = "/assets/pipe-green.png";
pub const BASE_SPRITE: &str = "/assets/base.png";

pub fn bird(key: &str, entity: &Entity, _viewport: &Viewport) -> Visual {
    let sprite = if entity.is_airborne() { BIRD_UPFLAP } else { BIRD_DOWNFLAP };
    Visual::boxed(key, entity)
        .transparent()
        .with_sprite(sprite)
        .with_z_index(1000)
}

/// Top pipes are drawn flipped. Pipes queued far off the right edge are hidden.
pub fn pipe(key: &str, entity: &Entity, viewport: &Viewport) -> Visual {
    let visual = Visual::boxed(key, entity).transparent().with_sprite(PIPE_SPRITE);
    let hidden = visual.x > viewport.width + entity.size.x;
    visual
        .with_rotation(if entity.is_top() { 180.0 } else { 0.0 })
        .with_visible(!hidden)
}

pub fn wall(key: &str, entity: &Entity, _viewport: &Viewport) -> Visual {
    Visual::boxed(key, entity).with_sprite(BASE_SPRITE)
}

pub fn score(key: &str, entity: &Entity, _viewport: &Viewport) -> Visual {
    Visual::boxed(key, entity)
        .transparent()
        .with_text(entity.counter().unwrap_or(0).to_string())
        .with_z_index(1001)
}
