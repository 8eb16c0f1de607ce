//! Orchestration of storage, cache, and messaging for the todo lifecycle.

use crate::telemetry::TodoMetrics;
use crate::todo::{
    domain::{
        CompletionEvent, CompletionOutcome, NewTodo, Todo, TodoCategory, TodoDescription,
        TodoDomainError, TodoId, TodoTitle,
    },
    ports::{CacheStore, EventChannelError, EventPublisher, TodoRepository, TodoRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Cache key holding the serialised list of all todos.
pub const TODOS_CACHE_KEY: &str = "todos";

/// Expiry applied to the cached todo list.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Request payload for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodoRequest {
    title: String,
    description: String,
    category: Option<String>,
}

impl CreateTodoRequest {
    /// Creates a request with the required fields and no category.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: None,
        }
    }

    /// Sets the category. Blank values fall back to `"default"`.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Messaging and caching policy for [`TodoOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Exchange completion events are published to.
    pub exchange: String,
    /// Routing key completion events are published with.
    pub routing_key: String,
    /// Expiry of the cached todo list.
    pub cache_ttl: Duration,
    /// Drop the cached list after `create` and an applied completion.
    ///
    /// Off by default: readers of the list may then observe data up to
    /// `cache_ttl` old.
    pub invalidate_cache_on_write: bool,
}

impl OrchestratorSettings {
    /// Creates settings for the given exchange and routing key.
    #[must_use]
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            invalidate_cache_on_write: false,
        }
    }

    /// Overrides the cached list expiry.
    #[must_use]
    pub const fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Enables or disables cache invalidation on writes.
    #[must_use]
    pub const fn with_cache_invalidation(mut self, enabled: bool) -> Self {
        self.invalidate_cache_on_write = enabled;
        self
    }
}

/// Service-level errors for todo lifecycle operations.
#[derive(Debug, Error)]
pub enum TodoServiceError {
    /// Draft validation failed.
    #[error(transparent)]
    Domain(#[from] TodoDomainError),
    /// No todo exists with the given identifier.
    #[error("todo {0} not found")]
    NotFound(TodoId),
    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] TodoRepositoryError),
    /// The event channel rejected a publish.
    #[error(transparent)]
    Publish(#[from] EventChannelError),
    /// The completion event could not be encoded.
    #[error("failed to encode completion event: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for todo service operations.
pub type TodoServiceResult<T> = Result<T, TodoServiceError>;

/// Single point of coordination between cache, storage, and messaging.
///
/// Methods hold no mutable state of their own and may be called concurrently;
/// shared state lives behind the ports.
#[derive(Clone)]
pub struct TodoOrchestrator<R, K, P, C>
where
    R: TodoRepository,
    K: CacheStore,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    cache: Arc<K>,
    publisher: Arc<P>,
    clock: Arc<C>,
    settings: OrchestratorSettings,
    metrics: TodoMetrics,
}

impl<R, K, P, C> TodoOrchestrator<R, K, P, C>
where
    R: TodoRepository,
    K: CacheStore,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator that records no metrics.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        cache: Arc<K>,
        publisher: Arc<P>,
        clock: Arc<C>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            publisher,
            clock,
            settings,
            metrics: TodoMetrics::noop(),
        }
    }

    /// Records into the given metric handles.
    #[must_use]
    pub fn with_metrics(mut self, metrics: TodoMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the messaging and caching policy.
    #[must_use]
    pub const fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Returns every todo, served from cache when possible.
    ///
    /// A cached list is returned without consulting storage, so it may lag
    /// storage by up to the cache TTL. On a miss or an undecodable entry the
    /// list is read from storage and written back to the cache. Cache
    /// failures are logged and never returned.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::Storage`] when the storage read fails.
    pub async fn list_all(&self) -> TodoServiceResult<Vec<Todo>> {
        if let Some(todos) = self.read_cached_list().await {
            self.metrics.cache_hits.increment(1);
            return Ok(todos);
        }
        self.metrics.cache_misses.increment(1);

        let todos = self.repository.list_all().await?;
        self.write_cached_list(&todos).await;
        Ok(todos)
    }

    /// Creates a pending todo.
    ///
    /// A blank category is stored as `"default"`.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::Domain`] when the draft is invalid or
    /// [`TodoServiceError::Storage`] when the insert fails.
    pub async fn create(&self, request: CreateTodoRequest) -> TodoServiceResult<Todo> {
        let draft = NewTodo::new(
            TodoTitle::new(request.title)?,
            TodoDescription::new(request.description)?,
            TodoCategory::or_default(request.category.as_deref())?,
        );
        let todo = self.repository.create(&draft).await?;
        self.metrics.todos_created.increment(1);
        debug!(todo_id = %todo.id(), category = todo.category(), "todo created");

        if self.settings.invalidate_cache_on_write {
            self.invalidate_cached_list().await;
        }
        Ok(todo)
    }

    /// Reads a todo directly from storage, bypassing the cache.
    ///
    /// Returns `Ok(None)` when the todo does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::Storage`] when the lookup fails.
    pub async fn get_by_id(&self, id: TodoId) -> TodoServiceResult<Option<Todo>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Requests completion of a todo by publishing a `todo_completed` event.
    ///
    /// The todo is not modified here and may already be completed; the
    /// completion worker applies the change later. Nothing is published
    /// unless the todo exists.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the todo does not exist,
    /// [`TodoServiceError::Storage`] when the lookup fails, or
    /// [`TodoServiceError::Publish`] when the channel rejects the event.
    pub async fn request_completion(&self, id: TodoId) -> TodoServiceResult<()> {
        let todo = self.find_todo_or_error(id).await?;
        let body = CompletionEvent::todo_completed(todo.id())
            .to_json_bytes()
            .map_err(TodoServiceError::Encode)?;

        self.publisher
            .publish(&self.settings.exchange, &self.settings.routing_key, &body)
            .await?;
        self.metrics.completion_requests.increment(1);
        info!(todo_id = %id, "todo completion requested");
        Ok(())
    }

    /// Applies a completion to storage.
    ///
    /// Already completed todos are left untouched and reported as
    /// [`CompletionOutcome::AlreadyCompleted`].
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the todo does not exist or
    /// [`TodoServiceError::Storage`] when the lookup or update fails.
    pub async fn apply_completion(&self, id: TodoId) -> TodoServiceResult<CompletionOutcome> {
        let mut todo = self.find_todo_or_error(id).await?;

        let outcome = todo.complete(self.clock.utc());
        if outcome == CompletionOutcome::AlreadyCompleted {
            self.metrics.completions_skipped.increment(1);
            info!(todo_id = %id, "todo already completed");
            return Ok(outcome);
        }

        self.repository
            .update(&todo)
            .await
            .map_err(|err| match err {
                TodoRepositoryError::NotFound(missing) => TodoServiceError::NotFound(missing),
                other => TodoServiceError::Storage(other),
            })?;
        self.metrics.completions_applied.increment(1);
        info!(todo_id = %id, "todo completed");

        if self.settings.invalidate_cache_on_write {
            self.invalidate_cached_list().await;
        }
        Ok(outcome)
    }

    async fn find_todo_or_error(&self, id: TodoId) -> TodoServiceResult<Todo> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TodoServiceError::NotFound(id))
    }

    async fn read_cached_list(&self) -> Option<Vec<Todo>> {
        let raw = match self.cache.get(TODOS_CACHE_KEY).await {
            Ok(raw) => raw?,
            Err(err) => {
                self.metrics.cache_errors.increment(1);
                warn!(error = %err, "todo list cache read failed");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Todo>>(&raw) {
            Ok(todos) => Some(todos),
            Err(err) => {
                warn!(error = %err, "discarding undecodable todo list cache entry");
                None
            }
        }
    }

    async fn write_cached_list(&self, todos: &[Todo]) {
        let encoded = match serde_json::to_string(todos) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "failed to encode todo list for cache");
                return;
            }
        };

        if let Err(err) = self
            .cache
            .set(TODOS_CACHE_KEY, &encoded, self.settings.cache_ttl)
            .await
        {
            self.metrics.cache_errors.increment(1);
            warn!(error = %err, "todo list cache write failed");
        }
    }

    async fn invalidate_cached_list(&self) {
        if let Err(err) = self.cache.delete(TODOS_CACHE_KEY).await {
            self.metrics.cache_errors.increment(1);
            warn!(error = %err, "todo list cache invalidation failed");
        }
    }
}
