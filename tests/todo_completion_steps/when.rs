//! When steps for todo completion BDD scenarios.

use super::world::{CompletionWorld, EXCHANGE, ROUTING_KEY, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use todo_lifecycle::todo::{
    domain::{CompletionEvent, TodoId},
    ports::EventPublisher,
};
use todo_lifecycle::worker::WorkerSettings;

#[when("completion is requested for the todo")]
fn completion_is_requested(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let id = world.todo_id()?;
    world.last_request = Some(run_async(world.orchestrator.request_completion(id)));
    Ok(())
}

#[when("completion is requested for todo {id:i64}")]
fn completion_is_requested_for_id(
    world: &mut CompletionWorld,
    id: i64,
) -> Result<(), eyre::Report> {
    let todo_id = TodoId::new(id).wrap_err("scenario todo id")?;
    world.last_request = Some(run_async(world.orchestrator.request_completion(todo_id)));
    Ok(())
}

#[when(r#"an event "{event}" is published for the todo"#)]
fn an_event_is_published(world: &mut CompletionWorld, event: String) -> Result<(), eyre::Report> {
    let id = world.todo_id()?;
    let body = CompletionEvent {
        event,
        todo_id: Some(id),
    }
    .to_json_bytes()
    .wrap_err("encode scenario event")?;
    run_async(world.channel.publish(EXCHANGE, ROUTING_KEY, &body))
        .wrap_err("publish scenario event")?;
    Ok(())
}

#[when("the completion worker drains the queue")]
fn the_worker_drains_the_queue(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    world.drain_queue(WorkerSettings::default())
}

#[when("the completion worker drains the queue with a retry budget of {budget:u32}")]
fn the_worker_drains_with_budget(
    world: &mut CompletionWorld,
    budget: u32,
) -> Result<(), eyre::Report> {
    world.drain_queue(WorkerSettings::default().with_max_redeliveries(budget))
}
