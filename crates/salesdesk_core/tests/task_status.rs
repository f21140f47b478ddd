mod common;

use chrono::{DateTime, NaiveDate};
use common::Instrumented;
use salesdesk_core::controller::tasks::TasksPage;
use salesdesk_core::model::task::{Task, TaskPriority, TaskStatus};
use salesdesk_core::model::team_member::TeamMember;
use salesdesk_core::{
    EntityRepository, FixtureStore, PagePhase, RecordingNotifier, SubmitOutcome,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
async fn set_status_commits_a_status_only_change() {
    let (page, repo, notifier) = tasks_with(vec![task("Send proposal", TaskStatus::ToDo)]).await;
    let task_id = page.list().records().await[0].id;

    let outcome = page.set_status(task_id, TaskStatus::Done).await;
    assert_eq!(outcome, SubmitOutcome::Saved);

    let updated = &page.list().records().await[0];
    assert_eq!(updated.status, TaskStatus::Done);
    // A status flip must not disturb the rest of the record.
    assert_eq!(updated.title, "Send proposal");
    assert_eq!(updated.priority, TaskPriority::High);
    assert_eq!(repo.get_by_id(task_id).await.unwrap().status, TaskStatus::Done);
    assert!(notifier
        .entries()
        .iter()
        .any(|notice| notice.message == "Task updated successfully"));
}

#[tokio::test]
async fn failed_set_status_leaves_the_row_unchanged() {
    let (page, repo, _) = tasks_with(vec![task("Send proposal", TaskStatus::ToDo)]).await;
    let task_id = page.list().records().await[0].id;

    repo.fail_writes.store(true, Ordering::SeqCst);
    let outcome = page.set_status(task_id, TaskStatus::Done).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(page.list().records().await[0].status, TaskStatus::ToDo);
    assert_eq!(page.list().visible().await[0].status, TaskStatus::ToDo);
}

#[tokio::test]
async fn status_filter_narrows_the_visible_collection() {
    let (page, _, _) = tasks_with(vec![
        task("Send proposal", TaskStatus::ToDo),
        task("Review renewal", TaskStatus::Done),
    ])
    .await;

    page.filter_status(Some(TaskStatus::Done)).await;
    let visible = page.list().visible().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "Review renewal");
    assert_eq!(page.list().records().await.len(), 2);

    page.filter_status(None).await;
    assert_eq!(page.list().visible().await.len(), 2);
}

#[tokio::test]
async fn assignee_resolution_is_dangling_safe() {
    let store = FixtureStore::empty();
    let member = store
        .team_members()
        .create(TeamMember {
            id: 0,
            name: "Maria Keller".to_string(),
            email: "maria@salesdesk.example.com".to_string(),
            role: "Sales Manager".to_string(),
        })
        .await
        .unwrap();

    let page = TasksPage::new(
        store.tasks(),
        store.team_members(),
        Arc::new(RecordingNotifier::new()),
    );
    page.load().await;

    assert_eq!(page.assignee_name(Some(member.id)).await, "Maria Keller");
    assert_eq!(page.assignee_name(Some(999)).await, "Unassigned");
    assert_eq!(page.assignee_name(None).await, "Unassigned");
}

type TasksFixture = (
    TasksPage<
        Instrumented<Task>,
        salesdesk_core::MemoryRepository<TeamMember>,
    >,
    Instrumented<Task>,
    Arc<RecordingNotifier>,
);

async fn tasks_with(seed: Vec<Task>) -> TasksFixture {
    let store = FixtureStore::empty();
    let repo = Instrumented::new(store.tasks());
    for task in seed {
        repo.create(task).await.unwrap();
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let page = TasksPage::new(repo.clone(), store.team_members(), notifier.clone());
    page.load().await;
    assert_eq!(page.list().phase().await, PagePhase::Ready);
    notifier.take();
    (page, repo, notifier)
}

fn task(title: &str, status: TaskStatus) -> Task {
    Task {
        id: 0,
        title: title.to_string(),
        description: String::new(),
        status,
        priority: TaskPriority::High,
        due_date: NaiveDate::default(),
        assigned_to: Some(1),
        related_entity_type: None,
        related_entity_id: None,
        estimated_hours: 1.0,
        actual_hours: 0.0,
        tags: Vec::new(),
        created_at: DateTime::UNIX_EPOCH,
        updated_at: DateTime::UNIX_EPOCH,
    }
}
