//! Shared world state for todo completion BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use todo_lifecycle::todo::{
    adapters::memory::{InMemoryCacheStore, InMemoryEventChannel, InMemoryTodoRepository},
    domain::{Todo, TodoId},
    services::{OrchestratorSettings, TodoOrchestrator, TodoServiceError},
};
use todo_lifecycle::worker::{CompletionWorker, WorkerSettings, WorkerSummary};
use tokio_util::sync::CancellationToken;

/// Exchange completion events are published to.
pub const EXCHANGE: &str = "todo";
/// Routing key completion events are published with.
pub const ROUTING_KEY: &str = "todo.completed";
/// Queue the worker consumes.
pub const QUEUE: &str = "todo.completed";

/// Orchestrator type used by the BDD world.
pub type TestOrchestrator = TodoOrchestrator<
    InMemoryTodoRepository,
    InMemoryCacheStore,
    InMemoryEventChannel,
    DefaultClock,
>;

/// Scenario world for todo completion behaviour tests.
pub struct CompletionWorld {
    /// In-memory broker shared by the orchestrator and the worker.
    pub channel: InMemoryEventChannel,
    /// The orchestrator under test.
    pub orchestrator: Arc<TestOrchestrator>,
    /// Todo created by the scenario.
    pub todo: Option<Todo>,
    /// Completion timestamp observed after the first apply.
    pub completed_at: Option<DateTime<Utc>>,
    /// Result of the last completion request.
    pub last_request: Option<Result<(), TodoServiceError>>,
    /// Summary of the last worker run.
    pub last_summary: Option<WorkerSummary>,
}

impl CompletionWorld {
    /// Creates a world with a bound queue and an empty store.
    #[must_use]
    pub fn new() -> Self {
        let channel = InMemoryEventChannel::new();
        channel
            .bind(EXCHANGE, ROUTING_KEY, QUEUE)
            .expect("in-memory bind should succeed");
        let orchestrator = TodoOrchestrator::new(
            Arc::new(InMemoryTodoRepository::new()),
            Arc::new(InMemoryCacheStore::new()),
            Arc::new(channel.clone()),
            Arc::new(DefaultClock),
            OrchestratorSettings::new(EXCHANGE, ROUTING_KEY),
        );
        Self {
            channel,
            orchestrator: Arc::new(orchestrator),
            todo: None,
            completed_at: None,
            last_request: None,
            last_summary: None,
        }
    }

    /// Returns the identifier of the scenario todo.
    pub fn todo_id(&self) -> Result<TodoId, eyre::Report> {
        self.todo
            .as_ref()
            .map(Todo::id)
            .ok_or_else(|| eyre::eyre!("no todo created in scenario world"))
    }

    /// Reads the scenario todo back from storage.
    pub fn reload(&self) -> Result<Todo, eyre::Report> {
        let id = self.todo_id()?;
        run_async(self.orchestrator.get_by_id(id))
            .map_err(|err| eyre::eyre!("get_by_id failed: {err}"))?
            .ok_or_else(|| eyre::eyre!("todo {id} disappeared from storage"))
    }

    /// Runs the worker until the queue is empty and every delivery settled.
    pub fn drain_queue(&mut self, settings: WorkerSettings) -> Result<(), eyre::Report> {
        let worker = CompletionWorker::new(Arc::clone(&self.orchestrator), settings);
        let subscription = self.channel.subscribe_until_idle(QUEUE);
        let summary = run_async(worker.run(subscription, CancellationToken::new()))
            .map_err(|err| eyre::eyre!("worker failed: {err}"))?;
        self.last_summary = Some(summary);
        Ok(())
    }
}

impl Default for CompletionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CompletionWorld {
    CompletionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
