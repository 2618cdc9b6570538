pub mod visual;

pub use visual::{Renderer, Visual};
