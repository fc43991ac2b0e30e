mod component;
mod dialog;
mod geometry;
mod node;
mod render;
mod state;
mod types;

pub use component::NetworkCanvas;
pub use state::NewRelationship;
pub use types::{Entity, Relationship};
