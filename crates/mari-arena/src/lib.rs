//! Mari Arena: a side-scrolling flap-through-the-pipes game on top of
//! `mari-engine`, playable solo or against other players through a
//! socket coordinator.

pub mod config;
pub mod error;
pub mod level;
pub mod physics;
pub mod protocol;
pub mod renderers;
pub mod rng;
pub mod screen;

pub use config::ArenaConfig;
pub use error::{ProtocolError, ScreenError};
pub use physics::PhysicsSystem;
pub use protocol::{Inbound, Outbound};
pub use screen::{ArenaScreen, GameSession, Mode, Outcome, Overlay};
