pub mod entity;
pub mod obstacle;
