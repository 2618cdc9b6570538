pub mod physics;
pub mod store;
pub mod time;
pub mod timer;
