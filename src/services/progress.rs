//! Service wrapping the progress state machine with persistence.
//!
//! Owns every write to the `progress` table. State mutations persist
//! immediately; a failed write is reported to the caller, who logs it and
//! keeps the session running non-persistent.

use crate::error::Result;
use crate::state::progress::{ProgressSnapshot, ProgressState, TourPhase};
use crate::store::PresentationStore;
use log::{info, warn};
use tokio::sync::Mutex;

pub struct ProgressService {
    state: Mutex<ProgressState>,
    store: PresentationStore,
}

impl ProgressService {
    pub fn new(
        store: PresentationStore,
        base_region_count: usize,
        bonus_region_id: impl Into<String>,
    ) -> Self {
        Self {
            state: Mutex::new(ProgressState::new(base_region_count, bonus_region_id)),
            store,
        }
    }

    /// Restores persisted progress. Read failures degrade to a fresh
    /// session.
    pub async fn load(&self) {
        let viewed = match self.store.load_viewed_regions().await {
            Ok(viewed) => viewed.unwrap_or_default(),
            Err(err) => {
                warn!("Failed to load viewed regions, starting fresh: {}", err);
                Vec::new()
            }
        };
        let split_mode = match self.store.load_split_mode().await {
            Ok(flag) => flag.unwrap_or(false),
            Err(err) => {
                warn!("Failed to load split-mode flag, starting fresh: {}", err);
                false
            }
        };

        let mut state = self.state.lock().await;
        state.restore(viewed, split_mode);
        info!(
            "Restored progress: {} viewed, split mode {}",
            state.viewed_regions().len(),
            state.split_mode()
        );
    }

    /// Marks a region as viewed and persists the updated progress.
    ///
    /// The in-memory transition happens even when persistence fails, so the
    /// returned error is a notice, not a rollback.
    pub async fn mark_viewed(&self, region_id: &str) -> Result<ProgressSnapshot> {
        let (snapshot, viewed) = {
            let mut state = self.state.lock().await;
            let snapshot = state.mark_viewed(region_id);
            (snapshot, state.viewed_regions())
        };

        if snapshot.split_just_triggered {
            info!("All base regions viewed, split mode enabled");
            self.store.save_split_mode(true).await?;
        }
        self.store.save_viewed_regions(&viewed).await?;

        Ok(snapshot)
    }

    /// Clears all progress, in memory and on disk.
    pub async fn reset(&self) -> Result<ProgressSnapshot> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.reset()
        };
        self.store.clear_progress().await?;
        info!("Progress reset");
        Ok(snapshot)
    }

    /// Writes the current progress out, for use before shutdown.
    pub async fn flush(&self) -> Result<()> {
        let (viewed, split_mode) = {
            let state = self.state.lock().await;
            (state.viewed_regions(), state.split_mode())
        };
        if !viewed.is_empty() {
            self.store.save_viewed_regions(&viewed).await?;
            self.store.save_split_mode(split_mode).await?;
        }
        Ok(())
    }

    pub async fn phase(&self) -> TourPhase {
        self.state.lock().await.phase()
    }

    pub async fn snapshot(&self) -> ProgressSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn is_viewed(&self, region_id: &str) -> bool {
        self.state.lock().await.is_viewed(region_id)
    }

    pub async fn split_mode(&self) -> bool {
        self.state.lock().await.split_mode()
    }
}
