//! Domain model for the todo lifecycle.
//!
//! The domain covers validated todo drafts, the persisted todo record with its
//! terminal completion state, and the completion event carried over the event
//! channel. Infrastructure concerns stay outside of this boundary.

mod error;
mod event;
mod ids;
mod text;
mod todo;

pub use error::TodoDomainError;
pub use event::{CompletionEvent, TODO_COMPLETED_EVENT};
pub use ids::TodoId;
pub use text::{TodoCategory, TodoDescription, TodoTitle};
pub use todo::{CompletionOutcome, NewTodo, PersistedTodoData, Todo, TodoStatus};
