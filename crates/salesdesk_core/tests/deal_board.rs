mod common;

use chrono::{DateTime, NaiveDate};
use common::Instrumented;
use salesdesk_core::controller::deals::{DealsPage, StageMove};
use salesdesk_core::model::deal::{Deal, Stage};
use salesdesk_core::{EntityRepository, FixtureStore, PagePhase, RecordingNotifier};
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
async fn stage_move_commits_and_updates_the_canonical_collection() {
    let (page, repo, _) = board_with(vec![deal("Northwind expansion", Stage::Lead)]).await;
    let deal_id = page.list().records().await[0].id;

    let outcome = page.move_stage(deal_id, Stage::Proposal).await;
    assert_eq!(outcome, StageMove::Committed);

    assert_eq!(page.list().records().await[0].stage, Stage::Proposal);
    assert_eq!(page.list().visible().await[0].stage, Stage::Proposal);
    // The commit also reached the backing store.
    assert_eq!(
        repo.get_by_id(deal_id).await.unwrap().stage,
        Stage::Proposal
    );
}

#[tokio::test]
async fn failed_commit_restores_the_pre_drop_stage() {
    let (page, repo, _) = board_with(vec![deal("Brightline renewal", Stage::Lead)]).await;
    let deal_id = page.list().records().await[0].id;

    repo.fail_writes.store(true, Ordering::SeqCst);
    let outcome = page.move_stage(deal_id, Stage::Proposal).await;
    assert_eq!(outcome, StageMove::RolledBack);

    // Compensating action: the board shows the stage the backend still has.
    assert_eq!(page.list().records().await[0].stage, Stage::Lead);
    assert_eq!(page.list().visible().await[0].stage, Stage::Lead);
    assert_eq!(repo.get_by_id(deal_id).await.unwrap().stage, Stage::Lead);
}

#[tokio::test]
async fn dropping_on_the_current_column_is_a_no_op() {
    let (page, repo, notifier) = board_with(vec![deal("Harbor pilot", Stage::Qualified)]).await;
    let deal_id = page.list().records().await[0].id;

    let outcome = page.move_stage(deal_id, Stage::Qualified).await;
    assert_eq!(outcome, StageMove::NoOp);
    assert_eq!(repo.update_calls.load(Ordering::SeqCst), 0);
    assert!(notifier.entries().is_empty());
}

#[tokio::test]
async fn moving_an_unknown_deal_is_a_no_op() {
    let (page, repo, _) = board_with(Vec::new()).await;

    let outcome = page.move_stage(404, Stage::Won).await;
    assert_eq!(outcome, StageMove::NoOp);
    assert_eq!(repo.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn terminal_stages_are_reachable_from_any_stage() {
    let (page, _, _) = board_with(vec![deal("Cedar clinics", Stage::Lead)]).await;
    let deal_id = page.list().records().await[0].id;

    assert_eq!(page.move_stage(deal_id, Stage::Lost).await, StageMove::Committed);
    assert_eq!(page.list().records().await[0].stage, Stage::Lost);
}

#[tokio::test]
async fn stage_summary_is_recomputed_from_the_visible_board() {
    let (page, _, _) = board_with(vec![
        deal_valued("A", Stage::Lead, 100.0),
        deal_valued("B", Stage::Lead, 250.0),
        deal_valued("C", Stage::Won, 900.0),
    ])
    .await;

    let summary = page.stage_summary().await;
    assert_eq!(summary.len(), Stage::ALL.len());
    assert_eq!(summary[0].stage, Stage::Lead);
    assert_eq!(summary[0].deal_count, 2);
    assert_eq!(summary[0].total_value, 350.0);
    let won = summary.iter().find(|s| s.stage == Stage::Won).unwrap();
    assert_eq!(won.deal_count, 1);
    assert_eq!(won.total_value, 900.0);

    // Narrowing the board narrows the summary with it.
    page.filter_stage(Some(Stage::Won)).await;
    let summary = page.stage_summary().await;
    assert_eq!(summary[0].deal_count, 0);
    let won = summary.iter().find(|s| s.stage == Stage::Won).unwrap();
    assert_eq!(won.deal_count, 1);
}

type BoardFixture = (
    DealsPage<
        Instrumented<Deal>,
        salesdesk_core::MemoryRepository<salesdesk_core::model::contact::Contact>,
        salesdesk_core::MemoryRepository<salesdesk_core::model::company::Company>,
        salesdesk_core::MemoryRepository<salesdesk_core::model::team_member::TeamMember>,
    >,
    Instrumented<Deal>,
    Arc<RecordingNotifier>,
);

async fn board_with(seed: Vec<Deal>) -> BoardFixture {
    let store = FixtureStore::empty();
    let repo = Instrumented::new(store.deals());
    for deal in seed {
        repo.create(deal).await.unwrap();
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let page = DealsPage::new(
        repo.clone(),
        store.contacts(),
        store.companies(),
        store.team_members(),
        notifier.clone(),
    );
    page.load().await;
    assert_eq!(page.list().phase().await, PagePhase::Ready);
    notifier.take();
    (page, repo, notifier)
}

fn deal(title: &str, stage: Stage) -> Deal {
    deal_valued(title, stage, 25_000.0)
}

fn deal_valued(title: &str, stage: Stage, value: f64) -> Deal {
    Deal {
        id: 0,
        title: title.to_string(),
        value,
        stage,
        contact_id: None,
        company_id: None,
        owner_id: None,
        probability: 40,
        close_date: NaiveDate::default(),
        tags: Vec::new(),
        created_at: DateTime::UNIX_EPOCH,
    }
}
