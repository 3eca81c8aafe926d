pub mod folders;
pub mod notes;
pub mod resource;
pub mod root;

pub use resource::{Reference, Resource};
