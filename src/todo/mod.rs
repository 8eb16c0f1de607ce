//! Todo lifecycle management.
//!
//! Todos are created pending and completed in two phases: a completion is
//! first requested, which only publishes a `todo_completed` event, and is
//! applied later when the completion worker consumes that event. Reads of the
//! full list go through a read-through cache; single lookups always hit
//! storage. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
