mod destroyable;
pub mod events;
pub mod game;
pub mod model;
pub mod ui;

pub use destroyable::Destroyable;
