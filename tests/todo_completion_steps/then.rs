//! Then steps for todo completion BDD scenarios.

use super::world::CompletionWorld;
use rstest_bdd_macros::then;
use todo_lifecycle::todo::{domain::CompletionEvent, services::TodoServiceError};

#[then(r#"the todo is stored with category "{category}""#)]
fn todo_has_category(world: &mut CompletionWorld, category: String) -> Result<(), eyre::Report> {
    let stored = world.reload()?;
    if stored.category() != category {
        return Err(eyre::eyre!(
            "expected category '{category}', found '{}'",
            stored.category()
        ));
    }
    Ok(())
}

#[then("the todo is still pending")]
fn todo_is_pending(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let stored = world.reload()?;
    if stored.done_at().is_some() {
        return Err(eyre::eyre!("expected todo {} to be pending", stored.id()));
    }
    Ok(())
}

#[then("the todo is completed")]
fn todo_is_completed(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let stored = world.reload()?;
    if !stored.is_completed() {
        return Err(eyre::eyre!("expected todo {} to be completed", stored.id()));
    }
    Ok(())
}

#[then("the todo keeps its original completion time")]
fn todo_keeps_completion_time(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let expected = world
        .completed_at
        .ok_or_else(|| eyre::eyre!("no completion time recorded in scenario world"))?;
    let stored = world.reload()?;
    if stored.done_at() != Some(expected) {
        return Err(eyre::eyre!(
            "expected done_at {expected}, found {:?}",
            stored.done_at()
        ));
    }
    Ok(())
}

#[then("{count:usize} completion events are published for the todo")]
fn events_published_for_todo(
    world: &mut CompletionWorld,
    count: usize,
) -> Result<(), eyre::Report> {
    let expected = CompletionEvent::todo_completed(world.todo_id()?);
    let published = world
        .channel
        .published()
        .map_err(|err| eyre::eyre!("read published messages: {err}"))?;
    let matching = published
        .iter()
        .filter(|message| {
            CompletionEvent::from_json_slice(&message.body)
                .is_ok_and(|event| event == expected)
        })
        .count();
    if matching != count {
        return Err(eyre::eyre!("expected {count} completion events, found {matching}"));
    }
    Ok(())
}

#[then("no completion events are published")]
fn no_events_published(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let published = world
        .channel
        .published()
        .map_err(|err| eyre::eyre!("read published messages: {err}"))?;
    if !published.is_empty() {
        return Err(eyre::eyre!("expected no events, found {}", published.len()));
    }
    Ok(())
}

#[then("the request fails with not found")]
fn request_fails_with_not_found(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_request
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing completion request result in scenario world"))?;
    if !matches!(result, Err(TodoServiceError::NotFound(_))) {
        return Err(eyre::eyre!("expected not found error, got {result:?}"));
    }
    Ok(())
}

#[then("the worker acknowledged {count:u64} deliveries")]
fn worker_acknowledged(world: &mut CompletionWorld, count: u64) -> Result<(), eyre::Report> {
    let summary = world
        .last_summary
        .ok_or_else(|| eyre::eyre!("the worker has not run in this scenario"))?;
    if summary.acked != count {
        return Err(eyre::eyre!("expected {count} acks, summary was {summary:?}"));
    }
    Ok(())
}

#[then("the worker rejected {count:u64} deliveries")]
fn worker_rejected(world: &mut CompletionWorld, count: u64) -> Result<(), eyre::Report> {
    let summary = world
        .last_summary
        .ok_or_else(|| eyre::eyre!("the worker has not run in this scenario"))?;
    if summary.rejected != count || summary.acked != 0 {
        return Err(eyre::eyre!("expected {count} rejects, summary was {summary:?}"));
    }
    Ok(())
}
