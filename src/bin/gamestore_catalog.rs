//! gamestore-catalog: federated catalog smoke check
//!
//! Wires the canonical and legacy stores behind the federated repositories
//! and logs the first catalog page and the total game count.
//!
//! ## Configuration
//! - GAMESTORE_CONFIG: Path to a YAML config file (optional)
//! - GAMESTORE__STORAGE__CANONICAL__TYPE: `sqlite` or `memory`
//! - GAMESTORE__STORAGE__LEGACY__TYPE: `mongodb` or `memory`
//! - GAMESTORE_LOG: tracing filter (default: info)

use std::sync::Arc;

use tracing::info;

use gamestore::config::Config;
use gamestore::pipeline::{DefaultPipelineFactory, GameFilter};
use gamestore::repository::FederatedRepositories;
use gamestore::services::{AtomicGameCounter, GameService};
use gamestore::storage::init_storage;
use gamestore::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;
    let page_size = config.catalog.page_size()?;

    let stores = init_storage(&config.storage).await?;
    let repositories = FederatedRepositories::new(stores);
    let service = GameService::new(
        Arc::new(DefaultPipelineFactory::new()),
        repositories.games.clone(),
        Arc::new(AtomicGameCounter::new()),
    );

    let filter = GameFilter::default().with_page(1, page_size);
    let page = service.list(&filter, false).await?;
    for game in &page.games {
        info!(
            key = %game.key,
            name = %game.name,
            price = game.price,
            legacy = game.is_legacy_derived(),
            "Catalog entry"
        );
    }

    let genres = repositories.genres.list().await?;
    info!(
        shown = page.games.len(),
        matched = page.count,
        total = service.total_games().await?,
        genres = genres.len(),
        "gamestore-catalog ready"
    );

    Ok(())
}
