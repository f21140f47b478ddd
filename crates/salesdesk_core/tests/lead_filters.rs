use chrono::DateTime;
use salesdesk_core::controller::leads::LeadsPage;
use salesdesk_core::model::lead::{Lead, LeadStatus};
use salesdesk_core::{EntityRepository, FixtureStore, PagePhase, RecordingNotifier};
use std::sync::Arc;

#[tokio::test]
async fn status_filter_narrows_the_visible_collection() {
    let store = FixtureStore::empty();
    store.leads().create(lead("Atlas inquiry", LeadStatus::New)).await.unwrap();
    store
        .leads()
        .create(lead("Brightline add-on", LeadStatus::Qualified))
        .await
        .unwrap();

    let page = LeadsPage::new(
        store.leads(),
        store.companies(),
        store.contacts(),
        Arc::new(RecordingNotifier::new()),
    );
    page.load().await;
    assert_eq!(page.list().phase().await, PagePhase::Ready);

    page.filter_status(Some(LeadStatus::Qualified)).await;
    let visible = page.list().visible().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Brightline add-on");

    page.filter_status(None).await;
    assert_eq!(page.list().visible().await.len(), 2);
}

#[tokio::test]
async fn reference_display_falls_back_to_not_available() {
    let store = FixtureStore::empty();
    let page = LeadsPage::new(
        store.leads(),
        store.companies(),
        store.contacts(),
        Arc::new(RecordingNotifier::new()),
    );
    page.load().await;

    assert_eq!(page.company_name(Some(42)).await, "N/A");
    assert_eq!(page.company_name(None).await, "N/A");
    assert_eq!(page.contact_name(Some(42)).await, "N/A");
}

fn lead(name: &str, status: LeadStatus) -> Lead {
    Lead {
        id: 0,
        name: name.to_string(),
        status,
        contact_info: String::new(),
        project_details: String::new(),
        company_id: None,
        contact_id: None,
        tags: Vec::new(),
        created_at: DateTime::UNIX_EPOCH,
    }
}
