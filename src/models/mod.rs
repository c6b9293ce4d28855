//! Data models for the slide composition backend.
//!
//! Slide and scene field names match the collaborator services and the editor front end.

mod color;
mod project;
mod requests;
mod scene;
mod slide;

pub use color::*;
pub use project::*;
pub use requests::*;
pub use scene::*;
pub use slide::*;
