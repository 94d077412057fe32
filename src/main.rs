use std::sync::Arc;

use lab_inventory::cache::QueryCache;
use lab_inventory::config::Config;
use lab_inventory::filter::{FilterSet, ItemFlag};
use lab_inventory::http_client::HttpClient;
use lab_inventory::models::Item;
use lab_inventory::pagination::{ListController, PageNumber, PageView};
use lab_inventory::permissions::{Action, Capabilities};
use lab_inventory::services::{ItemsService, ResourceApi, RoomsService, UsersService};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads one page of a collection and logs what it shows.
async fn summarize<A: ResourceApi>(
    api: Arc<A>,
    cache: Arc<QueryCache>,
    page: PageNumber,
) -> anyhow::Result<PageView<A::Record>> {
    let mut list = ListController::new(api.clone(), cache);
    let view = list.load_page(page).await?;
    tracing::info!(
        "{}s page {}: {} records, previous={}, next={}",
        api.kind().title(),
        view.page,
        view.records.len(),
        view.has_previous_page(),
        view.has_next_page()
    );
    // let the next-page prefetch land before the cache is dropped
    list.settle().await;
    Ok(view)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lab_inventory=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Using API at {}", config.api_base_url);

    let http = HttpClient::new(&config)?;
    let users = Arc::new(UsersService::new(http.clone()));
    let items = Arc::new(ItemsService::new(http.clone()));
    let rooms = Arc::new(RoomsService::new(http));
    let cache = Arc::new(QueryCache::new());

    let me = users.me().await?;
    let caps = Capabilities::of(&me);
    tracing::info!("Signed in as {} ({})", me.display_name(), me.email);

    let page = PageNumber::parse(std::env::args().nth(1).as_deref());

    if caps.allows(Action::ViewLab) {
        let view = summarize(items, cache.clone(), page).await?;
        let available = FilterSet::<Item>::new()
            .flag(ItemFlag::IsAvailable, Some(true))
            .visible(&view)
            .len();
        tracing::info!("{} of {} items on this page are available", available, view.records.len());
        summarize(rooms, cache.clone(), page).await?;
    } else {
        tracing::warn!("Not a lab member; items and rooms are hidden");
    }

    if caps.allows(Action::EditUsers) {
        summarize(users, cache, page).await?;
    }

    Ok(())
}
