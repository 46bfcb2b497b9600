//! State management for the tour engine.

use crate::config::Config;
use crate::error::Result;
use crate::prober::HttpProber;
use crate::region;
use crate::services::{DiscoveryService, ProgressService, TourService};
use crate::store::PresentationStore;
use std::sync::Arc;

pub mod progress;
pub mod slideshow;

pub use progress::{ProgressSnapshot, ProgressState, TourPhase};
pub use slideshow::SlideshowState;

/// Application-wide state container.
///
/// Constructed once at startup; the store and both state owners live here
/// and are handed to the rendering layer by reference.
pub struct AppState {
    pub config: Arc<Config>,
    pub store: PresentationStore,
    pub discovery: Arc<DiscoveryService<HttpProber>>,
    pub progress: Arc<ProgressService>,
    pub tour: TourService<HttpProber>,
}

impl AppState {
    /// Opens the store, runs the migration, and restores cached slides and
    /// progress. Store initialization failure is fatal; missing or
    /// unreadable cached data degrades to a first run.
    pub async fn init(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let store = PresentationStore::open(&config.db_path).await?;
        let prober = HttpProber::new(config.probe_timeout)?;

        let discovery = Arc::new(DiscoveryService::new(
            prober,
            store.clone(),
            Arc::clone(&config),
        ));
        let progress = Arc::new(ProgressService::new(
            store.clone(),
            region::base_region_count(),
            region::BONUS_REGION.id.clone(),
        ));

        discovery.preload().await;
        progress.load().await;

        let tour = TourService::new(
            Arc::clone(&discovery),
            Arc::clone(&progress),
            region::BONUS_REGION.id.clone(),
        );

        Ok(Self {
            config,
            store,
            discovery,
            progress,
            tour,
        })
    }
}
