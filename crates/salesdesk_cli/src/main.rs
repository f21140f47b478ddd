//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `salesdesk_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use salesdesk_core::controller::contacts::ContactsPage;
use salesdesk_core::{FixtureStore, LogNotifier, PagePhase};
use std::sync::Arc;

fn main() {
    println!("salesdesk_core ping={}", salesdesk_core::ping());
    println!("salesdesk_core version={}", salesdesk_core::core_version());

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("runtime setup failed: {err}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        let store = match FixtureStore::seeded() {
            Ok(store) => store,
            Err(err) => {
                eprintln!("fixture seed failed: {err}");
                std::process::exit(1);
            }
        };

        let page = ContactsPage::new(
            store.contacts(),
            store.companies(),
            store.team_members(),
            Arc::new(LogNotifier),
        );
        page.load().await;

        match page.list().phase().await {
            PagePhase::Ready => {
                println!("contacts page ready");
                println!("contacts={}", page.list().records().await.len());
            }
            PagePhase::Loading => println!("contacts page still loading"),
            PagePhase::Failed(message) => println!("contacts page failed: {message}"),
        }
    });
}
