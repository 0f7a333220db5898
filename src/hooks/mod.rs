//! External process hooks.
//!
//! - `generator`: runs the scene generator script on script changes

mod generator;

pub use generator::GeneratorSupervisor;
