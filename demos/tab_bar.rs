//! Two contexts sharing one store.
//!
//! The options page edits the tab list; the popup follows along through
//! the change watchers.
//!
//! Run with: cargo run --example tab_bar [-- --debug]

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use setup_tabs::{
    BackgroundStore, ContextKind, ExtensionContext, MoveOptions, StaticSource, StoreOptions,
    TabData, TabQuery,
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "setup_tabs=debug"
    } else {
        "setup_tabs=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

fn locales() -> StaticSource {
    StaticSource::new().with_messages("en", [("tabs_title", "Your tabs"), ("pinned", "pinned")])
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(std::env::args().any(|a| a == "--debug"));

    let store = BackgroundStore::spawn(StoreOptions::new()).await?;

    let popup = ExtensionContext::builder()
        .kind(ContextKind::Popup)
        .store(store.clone())
        .locales(locales())
        .build()?;
    let options_page = ExtensionContext::builder()
        .kind(ContextKind::Options)
        .store(store.clone())
        .locales(locales())
        .build()?;

    let watchers = popup.start_watchers().await?;

    let editor = options_page.tab_container().await?;
    editor
        .add_tabs(
            [
                TabData::new("Profiles", "EnhancedProfiles"),
                TabData::new("Objects", "ObjectManager").with_pinned(true),
            ],
            true,
        )
        .await?;
    editor
        .move_tab(&TabQuery::by_url("ManageUsers"), MoveOptions::to_front())
        .await?;

    tokio::time::sleep(Duration::from_millis(50)).await;

    let i18n = popup.translation_service().await?;
    let pinned = i18n.translate("pinned");
    println!("{}:", i18n.translate("tabs_title"));
    for tab in popup.tab_container().await?.tabs() {
        let marker = if tab.is_pinned() { format!(" ({pinned})") } else { String::new() };
        println!("  {tab}{marker}");
    }

    println!("\nExport:\n{}", editor.export_tabs()?);

    for watcher in watchers {
        watcher.abort();
    }
    store.shutdown();
    Ok(())
}
