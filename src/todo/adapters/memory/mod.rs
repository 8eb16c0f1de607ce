//! In-memory adapters for tests and local deterministic runs.

mod cache;
mod channel;
mod repository;

pub use cache::InMemoryCacheStore;
pub use channel::{InMemoryEventChannel, InMemorySubscription, PublishedMessage};
pub use repository::InMemoryTodoRepository;
