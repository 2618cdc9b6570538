use crate::components::entity::{Entity, EntityKind, ObstacleRole};

/// One slot of the recycled obstacle pool: a top and a bottom entity that
/// scroll together.
#[derive(Debug, Clone)]
pub struct ObstaclePair {
    pub top: Entity,
    pub bottom: Entity,
    /// Set once the player has flown past this pair. Cleared on recycle.
    pub passed: bool,
}

impl ObstaclePair {
    /// Build a pair, tagging each entity with its role.
    pub fn new(top: Entity, bottom: Entity) -> Self {
        Self {
            top: top.with_kind(EntityKind::Obstacle { role: ObstacleRole::Top }),
            bottom: bottom.with_kind(EntityKind::Obstacle { role: ObstacleRole::Bottom }),
            passed: false,
        }
    }

    /// Both halves, top first.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        [&self.top, &self.bottom].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        [&mut self.top, &mut self.bottom].into_iter()
    }

    pub fn get(&self, role: ObstacleRole) -> &Entity {
        match role {
            ObstacleRole::Top => &self.top,
            ObstacleRole::Bottom => &self.bottom,
        }
    }
}
