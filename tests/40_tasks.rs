use serde_json::json;

use projectdesk::error::AppError;
use projectdesk::models::{TaskFilters, TaskStatus};
use projectdesk::services::TaskService;
use projectdesk::testing::MemoryBackend;

fn seed_task(backend: &MemoryBackend, id: &str, project: &str, status: &str) {
    backend.seed(
        "tasks",
        id,
        json!({"title": id, "projectId": project, "status": status, "priority": "medium", "creatorId": "u1"}),
    );
}

#[tokio::test]
async fn status_filter_returns_only_matches_newest_first() {
    let backend = MemoryBackend::new();
    let tasks = TaskService::new(backend.client());
    seed_task(&backend, "d1", "p1", "done");
    seed_task(&backend, "t1", "p1", "todo");
    seed_task(&backend, "d2", "p1", "done");
    seed_task(&backend, "r1", "p1", "review");
    seed_task(&backend, "d3", "p1", "done");
    seed_task(&backend, "x1", "p2", "done");

    let done = tasks.list("p1", &TaskFilters::status(TaskStatus::Done)).await.unwrap();
    let ids: Vec<&str> = done.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["d3", "d2", "d1"]);
}

#[tokio::test]
async fn delete_survives_failed_attachment() {
    let backend = MemoryBackend::new();
    let tasks = TaskService::new(backend.client());
    backend.seed(
        "tasks",
        "t1",
        json!({"title": "Spec", "projectId": "p1", "status": "todo", "priority": "high",
               "creatorId": "u1", "attachments": ["f1", "f2"]}),
    );
    backend.put_file("task_attachments", "f1");
    backend.put_file("task_attachments", "f2");
    backend.fail_file_deletion("f1");

    tasks.delete("t1").await.unwrap();

    assert_eq!(backend.deleted_files(), vec!["f2".to_string()]);
    assert!(matches!(tasks.get("t1").await, Err(AppError::NotFound(_))));
    let calls = backend.calls();
    let f1 = calls.iter().position(|c| c == "delete_file:f1").unwrap();
    let f2 = calls.iter().position(|c| c == "delete_file:f2").unwrap();
    let doc = calls.iter().position(|c| c == "delete:tasks").unwrap();
    assert!(f1 < f2 && f2 < doc);
}

#[tokio::test]
async fn attachment_and_comment_calls_are_not_implemented() {
    let backend = MemoryBackend::new();
    let tasks = TaskService::new(backend.client());

    assert!(matches!(
        tasks.upload_attachment("t1", "a.txt", b"hello").await,
        Err(AppError::NotImplemented(_))
    ));
    assert!(matches!(tasks.list_comments("t1").await, Err(AppError::NotImplemented(_))));
    let err = tasks.add_comment("t1", "u1", "hi").await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_IMPLEMENTED");
    assert!(backend.calls().is_empty());
}
