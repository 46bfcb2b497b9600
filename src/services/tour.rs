//! Tour orchestration at the rendering-layer boundary.
//!
//! The rendering layer opens a region to get its ordered slides plus a
//! slideshow position, and closes it to learn which transition, if any, it
//! should play next.

use crate::error::{AppError, Result};
use crate::prober::SlideProber;
use crate::region::Region;
use crate::services::discovery::{DiscoverOptions, DiscoveryService};
use crate::services::progress::ProgressService;
use crate::state::progress::{ProgressSnapshot, TourPhase};
use crate::state::slideshow::SlideshowState;
use crate::store::SlideRecord;
use log::warn;
use std::sync::Arc;

/// Everything the rendering layer needs to present one open region.
#[derive(Debug)]
pub struct TourView {
    pub slides: Arc<Vec<SlideRecord>>,
    pub show: SlideshowState,
    pub progress: ProgressSnapshot,
}

/// What should happen after a region is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    /// The bonus region was just finished; reveal the final screen.
    pub show_final: bool,
}

pub struct TourService<P> {
    discovery: Arc<DiscoveryService<P>>,
    progress: Arc<ProgressService>,
    bonus_region_id: String,
}

impl<P: SlideProber> TourService<P> {
    pub fn new(
        discovery: Arc<DiscoveryService<P>>,
        progress: Arc<ProgressService>,
        bonus_region_id: impl Into<String>,
    ) -> Self {
        Self {
            discovery,
            progress,
            bonus_region_id: bonus_region_id.into(),
        }
    }

    /// Opens a region for viewing: resolves its slides (from cache or by
    /// discovery), marks it viewed, and returns the view state.
    ///
    /// Fails with [`AppError::NoSlides`] when nothing is published for the
    /// region yet.
    pub async fn open_region(&self, region: &Region) -> Result<TourView> {
        self.open_region_with(region, &DiscoverOptions::default())
            .await
    }

    pub async fn open_region_with(
        &self,
        region: &Region,
        options: &DiscoverOptions,
    ) -> Result<TourView> {
        let slides = self.discovery.discover_with(region, options).await;
        if slides.is_empty() {
            return Err(AppError::NoSlides(region.id.clone()));
        }

        let progress = match self.progress.mark_viewed(&region.id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // Keep the tour going non-persistent rather than blocking
                // the view.
                warn!("Failed to persist progress for {}: {}", region.id, err);
                self.progress.snapshot().await
            }
        };

        let show = SlideshowState::new(slides.len());
        Ok(TourView {
            slides,
            show,
            progress,
        })
    }

    /// Closes an open region and reports the follow-up transition.
    pub async fn close_region(&self, region_id: &str) -> CloseOutcome {
        if let Err(err) = self.progress.flush().await {
            warn!("Failed to flush progress on close: {}", err);
        }

        let show_final = region_id == self.bonus_region_id
            && self.progress.phase().await == TourPhase::Complete;
        CloseOutcome { show_final }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::prober::SlideProber;
    use crate::store::PresentationStore;
    use std::collections::HashSet;

    const BONUS: &str = "Kirovskaja";

    struct FixedProber {
        available_regions: HashSet<String>,
        slides_per_region: u32,
    }

    impl SlideProber for FixedProber {
        async fn exists(&self, url: &str) -> bool {
            let mut parts = url.rsplit('/');
            let file = parts.next().unwrap();
            let folder = parts.next().unwrap();
            if !self.available_regions.contains(folder) {
                return false;
            }
            let index: u32 = file.split('.').next().unwrap().parse().unwrap();
            index <= self.slides_per_region
        }
    }

    async fn tour_with_regions(
        regions: &[&str],
        base_count: usize,
    ) -> TourService<FixedProber> {
        let store = PresentationStore::open_in_memory().await.unwrap();
        let config = Arc::new(Config {
            base_url: "https://example.test/tour".to_string(),
            ..Config::default()
        });
        let prober = FixedProber {
            available_regions: regions.iter().map(|r| r.to_string()).collect(),
            slides_per_region: 3,
        };
        let discovery = Arc::new(DiscoveryService::new(prober, store.clone(), config));
        let progress = Arc::new(ProgressService::new(store, base_count, BONUS));
        TourService::new(discovery, progress, BONUS)
    }

    fn region(id: &str) -> Region {
        Region::new(id, id, "#00", id)
    }

    #[tokio::test]
    async fn open_region_returns_slides_and_marks_viewed() {
        let tour = tour_with_regions(&["Samara"], 8).await;

        let view = tour.open_region(&region("Samara")).await.unwrap();

        assert_eq!(view.slides.len(), 3);
        assert_eq!(view.show.counter_label(), "1 / 3");
        assert_eq!(view.progress.viewed, 1);
        assert!(tour.progress.is_viewed("Samara").await);
    }

    #[tokio::test]
    async fn open_region_without_slides_fails() {
        let tour = tour_with_regions(&["Samara"], 8).await;

        let err = tour.open_region(&region("SPB")).await.unwrap_err();
        match err {
            AppError::NoSlides(id) => assert_eq!(id, "SPB"),
            other => panic!("unexpected error: {}", other),
        }
        assert!(!tour.progress.is_viewed("SPB").await);
    }

    #[tokio::test]
    async fn closing_bonus_region_reveals_final_screen() {
        let tour = tour_with_regions(&["A", "B", BONUS], 2).await;

        let view = tour.open_region(&region("A")).await.unwrap();
        assert!(!view.progress.split_just_triggered);
        assert_eq!(tour.close_region("A").await, CloseOutcome { show_final: false });

        let view = tour.open_region(&region("B")).await.unwrap();
        assert!(view.progress.split_just_triggered);

        let view = tour.open_region(&region(BONUS)).await.unwrap();
        assert!(view.progress.tour_complete);
        assert_eq!(
            tour.close_region(BONUS).await,
            CloseOutcome { show_final: true }
        );
    }
}
