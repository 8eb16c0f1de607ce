//! Given steps for todo completion BDD scenarios.

use super::world::{CompletionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use todo_lifecycle::todo::services::CreateTodoRequest;
use todo_lifecycle::worker::WorkerSettings;

#[given(r#"a todo titled "{title}" with description "{description}" and no category"#)]
fn a_todo_without_category(
    world: &mut CompletionWorld,
    title: String,
    description: String,
) -> Result<(), eyre::Report> {
    let request = CreateTodoRequest::new(title, description).with_category("");
    let created =
        run_async(world.orchestrator.create(request)).wrap_err("create todo for scenario")?;
    world.todo = Some(created);
    Ok(())
}

#[given("the todo has been completed")]
fn the_todo_has_been_completed(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let id = world.todo_id()?;
    run_async(world.orchestrator.request_completion(id)).wrap_err("request completion")?;
    world.drain_queue(WorkerSettings::default())?;
    let stored = world.reload()?;
    let done_at = stored
        .done_at()
        .ok_or_else(|| eyre::eyre!("todo {id} was not completed by the worker"))?;
    world.completed_at = Some(done_at);
    Ok(())
}
