//! Step definitions for todo completion scenarios.

mod given;
mod then;
mod when;
pub mod world;
