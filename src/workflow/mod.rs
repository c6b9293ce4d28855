//! Workflow controller: the session state machine.

mod controller;
mod in_flight;

pub use controller::*;
