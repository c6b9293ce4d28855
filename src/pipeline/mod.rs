//! Pipeline stages that turn a topic into finished slides.
//!
//! Each stage is a free function over a collaborator trait object so the
//! workflow controller can call it without holding the session lock.

mod draft;
mod images;
mod remake;

pub use draft::*;
pub use images::*;
pub use remake::*;
