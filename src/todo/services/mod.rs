//! Application services for todo lifecycle orchestration.

mod applier;
mod orchestrator;

pub use applier::CompletionApplier;
#[cfg(test)]
pub use applier::MockCompletionApplier;
pub use orchestrator::{
    CreateTodoRequest, DEFAULT_CACHE_TTL, OrchestratorSettings, TODOS_CACHE_KEY, TodoOrchestrator,
    TodoServiceError, TodoServiceResult,
};
