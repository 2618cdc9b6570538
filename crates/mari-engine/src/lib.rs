//! Headless, frame-driven game loop.
//!
//! A [`GameEngine`] folds an ordered pipeline of [`System`]s over an
//! [`EntityStore`] on every animation frame of a shared [`Timer`], and talks
//! to its embedding screen through [`EngineEvent`]s.

pub mod api;
pub mod components;
pub mod core;
pub mod engine;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::context::{system, System, TickContext};
pub use api::events::EngineEvent;
pub use api::types::{EntityId, Viewport};
pub use components::entity::{Entity, EntityKind, ObstacleRole};
pub use components::obstacle::ObstaclePair;
pub use core::physics::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsBody, PhysicsWorld,
};
pub use core::store::EntityStore;
pub use core::time::{FixedTimestep, FrameTime};
pub use core::timer::{FrameCallback, FrameRequest, FrameScheduler, HostFrames, Timer};
pub use engine::{EngineConfig, EngineStatus, GameEngine};
pub use error::EngineError;
pub use input::queue::{InputEvent, InputKind, InputPayload, InputQueue};
pub use renderer::{Renderer, Visual};
pub use systems::render::render;
