//! storefeed - Entry Point
//!
//! Browses a seeded demo catalog through the pagination engine and prints the
//! resulting window (or infinite-scroll list) as JSON.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefeed::config::ListingSettings;
use storefeed::model::{
    AppError, CatalogItem, CategoryId, FilterState, ListingSurface, PageNumber, PageSize,
    PaginationType, SortKey,
};
use storefeed::runtime::{Collaborators, EngineDriver};
use storefeed::source::InMemoryCatalog;
use storefeed::state::{EngineConfig, ModeSelector, PaginationEngine};
use tracing::info;

/// storefeed - adaptive pagination over a demo storefront catalog
#[derive(Parser, Debug)]
#[command(name = "storefeed")]
#[command(version)]
#[command(about = "Browse a storefront listing by page number or infinite scroll")]
pub struct Args {
    /// Listing surface to browse
    #[arg(long, default_value = "products")]
    pub surface: ListingSurface,

    /// Restrict to one category
    #[arg(long)]
    pub category: Option<CategoryId>,

    /// Free-text search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort order (defaults to the surface's configured sort)
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Page to show (must be positive)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Items per page (defaults to the surface's configured size)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Use infinite scroll instead of numbered pages
    #[arg(long)]
    pub infinite: bool,

    /// Sentinel intersections to simulate in infinite-scroll mode
    #[arg(long, default_value = "2")]
    pub scroll_steps: u32,

    /// Number of items in the demo catalog
    #[arg(long, default_value = "250")]
    pub demo_items: usize,

    /// Most items the demo store returns per cursor batch
    #[arg(long)]
    pub store_batch_cap: Option<usize>,

    /// Upper bound on items requested per batch
    #[arg(long)]
    pub max_batch: Option<usize>,

    /// Search debounce in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Listing settings after the command line has had its say.
    fn apply_to(&self, settings: ListingSettings) -> Result<ListingSettings, AppError> {
        let mut settings = settings;
        if let Some(size) = self.page_size {
            settings = settings.with_page_size(PageSize::new(size as usize)?);
        }
        if self.infinite {
            settings = settings.with_pagination_type(PaginationType::InfiniteScroll);
        }
        Ok(settings)
    }

    /// Initial filter state for the chosen surface.
    fn filter(&self, settings: &ListingSettings) -> FilterState {
        FilterState::new(
            self.category.clone(),
            self.search.clone().unwrap_or_default(),
            self.sort.unwrap_or(settings.default_sort),
            settings.page_size,
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = storefeed::config::load_config_with_precedence(args.config.clone())?;
        let merged = storefeed::config::merge_config(config_file)?;
        let with_env = storefeed::config::apply_env_overrides(merged)?;
        storefeed::config::apply_cli_overrides(with_env, args.max_batch, args.debounce_ms)
    };

    storefeed::logging::init_from_config(&config)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let settings = args.apply_to(config.settings_for(args.surface))?;
    let filter = args.filter(&settings);
    let page = PageNumber::new(args.page as usize)?;

    let engine_config = EngineConfig {
        max_request_batch: config.max_request_batch,
        pagination_type: settings.pagination_type,
        selector: ModeSelector::for_surface(args.surface),
    };
    let engine = PaginationEngine::new(engine_config, filter);

    let mut catalog = InMemoryCatalog::seeded(args.surface, args.demo_items);
    if let Some(cap) = args.store_batch_cap {
        catalog = catalog.with_batch_cap(cap);
    }
    let collaborators = Collaborators::<CatalogItem>::from_store(Arc::new(catalog));
    let mut driver = EngineDriver::new(
        engine,
        collaborators,
        Duration::from_millis(config.search_debounce_ms),
    );

    driver.start();
    driver.settle().await;

    let output = match settings.pagination_type {
        PaginationType::Paginated => {
            driver.set_page(page);
            driver.settle().await;
            info!(window = %driver.window(), "window resolved");
            serde_json::to_string_pretty(driver.window())?
        }
        PaginationType::InfiniteScroll => {
            let sentinel = driver.attach_infinite_scroll_sentinel();
            for _ in 0..args.scroll_steps {
                sentinel.intersected();
                driver.settle().await;
            }
            let list = driver.infinite_list();
            info!(list = %list, "infinite list resolved");
            serde_json::to_string_pretty(&list)?
        }
    };

    println!("{output}");
    Ok(())
}
