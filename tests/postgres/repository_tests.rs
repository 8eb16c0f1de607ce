//! Storage semantics of [`PostgresTodoRepository`].

use super::helpers::{CleanupGuard, at, ensure_template, new_todo, setup_repository, test_runtime};
use chrono::{DateTime, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use todo_lifecycle::todo::{
    adapters::postgres::PostgresTodoRepository,
    domain::{PersistedTodoData, Todo, TodoId, TodoStatus},
    ports::{TodoRepository, TodoRepositoryError},
};

fn prepared(
    cluster: &'static TestCluster,
    label: &str,
) -> (CleanupGuard<'static>, PostgresTodoRepository) {
    ensure_template(cluster).expect("template setup");
    let db_name = format!("test_{label}_{}", uuid::Uuid::new_v4().simple());
    let guard = CleanupGuard::new(cluster, db_name.clone());
    let repo = setup_repository(cluster, &db_name).expect("repository setup");
    (guard, repo)
}

fn with_done_at(todo: &Todo, done_at: Option<DateTime<Utc>>) -> Todo {
    Todo::from_persisted(PersistedTodoData {
        id: todo.id(),
        title: todo.title().to_owned(),
        description: todo.description().to_owned(),
        category: todo.category().to_owned(),
        created_at: todo.created_at(),
        updated_at: todo.updated_at(),
        done_at,
    })
}

#[rstest]
fn create_find_and_complete(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) = prepared(shared_test_cluster, "create_find");
    let rt = test_runtime();

    let created = rt
        .block_on(repo.create(&new_todo("Buy milk", None)))
        .expect("create should succeed");
    assert!(created.id().value() > 0);
    assert_eq!(created.title(), "Buy milk");
    assert_eq!(created.category(), "default");
    assert_eq!(created.status(), TodoStatus::Pending);
    assert_eq!(created.created_at(), created.updated_at());

    let found = rt
        .block_on(repo.find_by_id(created.id()))
        .expect("find should succeed");
    assert_eq!(found.as_ref(), Some(&created));

    let mut completing = created.clone();
    completing.complete(at(9));
    let updated = rt
        .block_on(repo.update(&completing))
        .expect("update should succeed");
    assert_eq!(updated.done_at(), Some(at(9)));
    assert_eq!(updated.created_at(), created.created_at());
    assert!(updated.updated_at() >= created.updated_at());

    let reloaded = rt
        .block_on(repo.find_by_id(created.id()))
        .expect("find should succeed")
        .expect("todo should exist");
    assert!(reloaded.is_completed());
}

#[rstest]
fn stored_completion_is_never_moved_or_cleared(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) = prepared(shared_test_cluster, "done_at_kept");
    let rt = test_runtime();
    let created = rt
        .block_on(repo.create(&new_todo("Walk dog", Some("chores"))))
        .expect("create should succeed");

    rt.block_on(repo.update(&with_done_at(&created, Some(at(9)))))
        .expect("first completion should succeed");
    let moved = rt
        .block_on(repo.update(&with_done_at(&created, Some(at(17)))))
        .expect("second update should succeed");
    assert_eq!(moved.done_at(), Some(at(9)));

    let cleared = rt
        .block_on(repo.update(&with_done_at(&created, None)))
        .expect("third update should succeed");
    assert_eq!(cleared.done_at(), Some(at(9)));
    assert_eq!(cleared.category(), "chores");
}

#[rstest]
fn updating_a_missing_todo_is_not_found(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) = prepared(shared_test_cluster, "update_missing");
    let rt = test_runtime();
    let created = rt
        .block_on(repo.create(&new_todo("Buy milk", None)))
        .expect("create should succeed");
    let missing_id = TodoId::new(created.id().value() + 1000).expect("valid id");
    let missing = Todo::from_persisted(PersistedTodoData {
        id: missing_id,
        title: "Ghost".to_owned(),
        description: "never stored".to_owned(),
        category: "default".to_owned(),
        created_at: at(8),
        updated_at: at(8),
        done_at: Some(at(9)),
    });

    let result = rt.block_on(repo.update(&missing));

    assert!(matches!(result, Err(TodoRepositoryError::NotFound(id)) if id == missing_id));
    let absent = rt
        .block_on(repo.find_by_id(missing_id))
        .expect("find should succeed");
    assert!(absent.is_none());
}

#[rstest]
fn list_all_is_ordered_by_id(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) = prepared(shared_test_cluster, "list_order");
    let rt = test_runtime();
    assert!(rt.block_on(repo.list_all()).expect("list should succeed").is_empty());

    for title in ["first", "second", "third"] {
        rt.block_on(repo.create(&new_todo(title, None)))
            .expect("create should succeed");
    }

    let listed = rt.block_on(repo.list_all()).expect("list should succeed");
    let titles: Vec<_> = listed.iter().map(Todo::title).collect();
    assert_eq!(titles, ["first", "second", "third"]);
    assert!(listed.windows(2).all(|pair| {
        matches!(pair, [earlier, later] if earlier.id() < later.id())
    }));
}
