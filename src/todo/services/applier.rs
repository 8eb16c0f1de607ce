//! Apply-side seam between the completion worker and the orchestrator.

use super::{TodoOrchestrator, TodoServiceResult};
use crate::todo::{
    domain::{CompletionOutcome, TodoId},
    ports::{CacheStore, EventPublisher, TodoRepository},
};
use async_trait::async_trait;
use mockable::Clock;

/// Applies a requested completion to storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionApplier: Send + Sync {
    /// Marks the todo completed; a no-op for already completed todos.
    async fn apply_completion(&self, id: TodoId) -> TodoServiceResult<CompletionOutcome>;
}

#[async_trait]
impl<R, K, P, C> CompletionApplier for TodoOrchestrator<R, K, P, C>
where
    R: TodoRepository,
    K: CacheStore,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    async fn apply_completion(&self, id: TodoId) -> TodoServiceResult<CompletionOutcome> {
        Self::apply_completion(self, id).await
    }
}
