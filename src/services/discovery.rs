//! Region slide discovery.
//!
//! Probes numbered slide URLs for a region until the configured stopping
//! policy fires, caches results in memory and in the persistent store, and
//! coalesces concurrent discovery calls per region so a probe sequence runs
//! at most once.

use crate::config::{Config, StopPolicy};
use crate::prober::SlideProber;
use crate::region::Region;
use crate::slide_url;
use crate::store::{PresentationStore, SlideRecord, sort_slide_records};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Optional hooks for one discovery call.
#[derive(Default)]
pub struct DiscoverOptions {
    /// Invoked after each hit with the number of slides collected so far.
    pub on_progress: Option<Box<dyn Fn(usize) + Send + Sync>>,
}

/// Discovers and caches slide lists per region.
///
/// Discovery is at-most-once per region per cache lifetime: a cache entry,
/// including an explicitly recorded empty one, short-circuits all network
/// access until [`reset_slides`](DiscoveryService::reset_slides).
pub struct DiscoveryService<P> {
    prober: P,
    store: PresentationStore,
    config: Arc<Config>,
    /// Region id -> ordered slides. Presence means "checked".
    cache: RwLock<HashMap<String, Arc<Vec<SlideRecord>>>>,
    /// Region id -> in-flight gate. Exclusively owned by this service;
    /// entries are removed after the owning discovery completes.
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<P: SlideProber> DiscoveryService<P> {
    pub fn new(prober: P, store: PresentationStore, config: Arc<Config>) -> Self {
        Self {
            prober,
            store,
            config,
            cache: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Warms the in-memory cache from the persistent store. Read failures
    /// degrade to an empty cache, as on a first run.
    pub async fn preload(&self) {
        match self.store.get_all_slides().await {
            Ok(all) => {
                let mut cache = self.cache.write().await;
                for (region_id, slides) in all {
                    cache.insert(region_id, Arc::new(slides));
                }
                info!("Preloaded slide cache for {} regions", cache.len());
            }
            Err(err) => {
                warn!("Failed to preload slide cache, starting empty: {}", err);
            }
        }
    }

    /// Returns the cached slide list for a region, if it was ever checked.
    pub async fn cached(&self, region_id: &str) -> Option<Arc<Vec<SlideRecord>>> {
        self.cache.read().await.get(region_id).cloned()
    }

    /// True when a region has at least one discovered slide.
    pub async fn has_slides(&self, region_id: &str) -> bool {
        self.cached(region_id).await.is_some_and(|s| !s.is_empty())
    }

    /// Discovers the slide list for a region.
    pub async fn discover(&self, region: &Region) -> Arc<Vec<SlideRecord>> {
        self.discover_with(region, &DiscoverOptions::default()).await
    }

    /// Discovers the slide list for a region, reporting progress.
    ///
    /// Never fails: network errors count as misses and an empty result is
    /// the normal "nothing published yet" state. A failed cache write is
    /// logged and the session continues non-persistent.
    pub async fn discover_with(
        &self,
        region: &Region,
        options: &DiscoverOptions,
    ) -> Arc<Vec<SlideRecord>> {
        if let Some(hit) = self.cached(&region.id).await {
            debug!("Slide cache HIT: {}", region.id);
            return hit;
        }

        // Not in memory; a previous session may still have it on disk.
        match self.store.get_slides(&region.id).await {
            Ok(Some(slides)) => {
                let slides = Arc::new(slides);
                self.cache
                    .write()
                    .await
                    .insert(region.id.clone(), Arc::clone(&slides));
                debug!("Slide store HIT: {}", region.id);
                return slides;
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Failed to read stored slides for {}: {}", region.id, err);
            }
        }

        let gate = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(region.id.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let guard = gate.lock().await;

        // Another caller may have finished while we waited on the gate.
        if let Some(hit) = self.cached(&region.id).await {
            drop(guard);
            self.release_gate(&region.id, &gate).await;
            return hit;
        }

        let slides = Arc::new(self.probe_sequence(region, options).await);
        self.cache
            .write()
            .await
            .insert(region.id.clone(), Arc::clone(&slides));

        // Persist even an empty result so the next session skips probing.
        if let Err(err) = self.store.put_slides(&region.id, &slides).await {
            error!("Failed to persist slides for {}: {}", region.id, err);
        }

        drop(guard);
        self.release_gate(&region.id, &gate).await;

        info!("Discovered {} slides for {}", slides.len(), region.id);
        slides
    }

    /// Drops all cached slide lists, in memory and on disk. The next
    /// discovery call per region probes the host again.
    pub async fn reset_slides(&self) -> crate::error::Result<()> {
        self.store.clear_slides().await?;
        self.cache.write().await.clear();
        info!("Slide cache cleared");
        Ok(())
    }

    /// Removes the in-flight entry for a region unless a newer discovery
    /// already replaced it.
    async fn release_gate(&self, region_id: &str, gate: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        if let Some(existing) = inflight.get(region_id) {
            if Arc::ptr_eq(existing, gate) {
                inflight.remove(region_id);
            }
        }
    }

    /// Probes indices 1..=ceiling strictly in order. Sequential on purpose:
    /// the miss-streak counter needs ordered outcomes and the static host
    /// should not see a request storm.
    async fn probe_sequence(&self, region: &Region, options: &DiscoverOptions) -> Vec<SlideRecord> {
        let mut collected: Vec<SlideRecord> = Vec::new();
        let mut miss_streak: u32 = 0;

        for index in 1..=self.config.max_probe_attempts {
            let url = slide_url::resolve(&self.config, &region.folder_name, index);

            if self.prober.exists(&url).await {
                miss_streak = 0;
                collected.push(SlideRecord::new(
                    slide_url::slide_file_name(&self.config, index),
                    url,
                ));
                if let Some(on_progress) = &options.on_progress {
                    on_progress(collected.len());
                }
                continue;
            }

            match self.config.stop_policy {
                StopPolicy::Strict => break,
                StopPolicy::Tolerant { miss_streak: limit } => {
                    // Misses before the first hit never stop the scan.
                    if collected.is_empty() {
                        continue;
                    }
                    miss_streak += 1;
                    if miss_streak >= limit {
                        break;
                    }
                }
            }
        }

        // Probing runs in increasing order, but the ordering invariant is
        // enforced here rather than assumed.
        sort_slide_records(&mut collected);
        collected
    }
}
