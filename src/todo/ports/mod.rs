//! Port contracts for the todo lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by the orchestrator
//! and the completion worker.

pub mod cache;
pub mod events;
pub mod repository;

pub use cache::{CacheError, CacheResult, CacheStore};
pub use events::{
    Delivery, DeliveryAcker, EventChannelError, EventChannelResult, EventPublisher,
    EventSubscription,
};
pub use repository::{TodoRepository, TodoRepositoryError, TodoRepositoryResult};
