use glam::Vec2;
use crate::api::types::EntityId;
use crate::core::physics::PhysicsBody;
use crate::renderer::Renderer;

/// Which half of an obstacle pair an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleRole {
    Top,
    Bottom,
}

/// Variant-specific state carried by an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// Floors, walls, backgrounds.
    Scenery,
    /// The controllable body. `airborne` is set for the tick a flap landed in.
    Player { airborne: bool, alive: bool },
    /// One half of a scrolling obstacle pair.
    Obstacle { role: ObstacleRole },
    /// A plain counter (score display and the like).
    Counter { value: u32 },
}

/// Fat Entity: one struct with optional parts.
/// Entities without a renderer are not drawn; entities without a body are
/// not simulated.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    pub kind: EntityKind,
    /// Position in world space. Synced from the physics body after every tick.
    pub pos: Vec2,
    /// Width/height, used only for rendering.
    pub size: Vec2,
    /// Display hint (CSS color).
    pub color: String,
    pub renderer: Option<Renderer>,
    pub body: Option<PhysicsBody>,
}

impl Entity {
    /// Create a new scenery entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            kind: EntityKind::Scenery,
            pos: Vec2::ZERO,
            size: Vec2::ONE,
            color: String::new(),
            renderer: None,
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    // -- Kind accessors --

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player { .. })
    }

    /// `true` when this is a top obstacle (drawn flipped).
    pub fn is_top(&self) -> bool {
        matches!(self.kind, EntityKind::Obstacle { role: ObstacleRole::Top })
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self.kind, EntityKind::Player { airborne: true, .. })
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.kind, EntityKind::Player { alive: true, .. })
    }

    pub fn set_airborne(&mut self, value: bool) {
        if let EntityKind::Player { airborne, .. } = &mut self.kind {
            *airborne = value;
        }
    }

    /// Mark the player as out. No-op on other kinds.
    pub fn kill(&mut self) {
        if let EntityKind::Player { alive, .. } = &mut self.kind {
            *alive = false;
        }
    }

    /// Current counter value, if this is a counter.
    pub fn counter(&self) -> Option<u32> {
        match self.kind {
            EntityKind::Counter { value } => Some(value),
            _ => None,
        }
    }

    /// Bump a counter by one and return the new value.
    pub fn increment(&mut self) -> Option<u32> {
        match &mut self.kind {
            EntityKind::Counter { value } => {
                *value += 1;
                Some(*value)
            }
            _ => None,
        }
    }

    /// Left edge in world space.
    pub fn left(&self) -> f32 {
        self.pos.x - self.size.x / 2.0
    }

    /// Right edge in world space.
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}
