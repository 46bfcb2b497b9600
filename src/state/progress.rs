//! Viewing-progress state machine.
//!
//! Owns the viewed-region set and the split-mode flag, and derives the
//! one-way tour phase sequence: intro, touring, split, complete.

use std::collections::BTreeSet;

/// Where the tour currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourPhase {
    /// Nothing viewed yet; onboarding screen shown.
    Intro,
    /// Grid interactive, base regions still being viewed.
    Touring,
    /// All base regions viewed; bonus region available.
    Split,
    /// Bonus region also viewed.
    Complete,
}

/// Result of a progress mutation or query.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub viewed: usize,
    pub total_expected: usize,
    /// Completion percentage, clamped to 100.
    pub percentage: f32,
    /// True only on the call that flipped split mode on.
    pub split_just_triggered: bool,
    /// True once the bonus region has been viewed.
    pub tour_complete: bool,
}

impl ProgressSnapshot {
    /// Progress-bar caption.
    pub fn label(&self) -> String {
        format!("Viewed {} of {} regions", self.viewed, self.total_expected)
    }
}

/// Manages the viewed-region set and split-mode flag.
///
/// Both only ever move forward during a viewing cycle; the sole way back is
/// an explicit [`reset`](ProgressState::reset).
#[derive(Debug)]
pub struct ProgressState {
    viewed: BTreeSet<String>,
    split_mode: bool,
    base_region_count: usize,
    bonus_region_id: String,
}

impl ProgressState {
    pub fn new(base_region_count: usize, bonus_region_id: impl Into<String>) -> Self {
        Self {
            viewed: BTreeSet::new(),
            split_mode: false,
            base_region_count,
            bonus_region_id: bonus_region_id.into(),
        }
    }

    /// Restores persisted state loaded from the store.
    pub fn restore(&mut self, viewed: Vec<String>, split_mode: bool) {
        self.viewed = viewed.into_iter().collect();
        self.split_mode = split_mode;
    }

    /// Records a region as viewed. Idempotent: re-adding a viewed region
    /// changes nothing.
    ///
    /// The split check uses `>=` so the bonus region's own viewing event
    /// cannot re-trigger the transition.
    pub fn mark_viewed(&mut self, region_id: &str) -> ProgressSnapshot {
        self.viewed.insert(region_id.to_string());

        let mut split_just_triggered = false;
        if !self.split_mode && self.viewed.len() >= self.base_region_count {
            self.split_mode = true;
            split_just_triggered = true;
        }

        self.snapshot_with(split_just_triggered)
    }

    /// Clears the viewed set and split flag, returning to the intro phase.
    pub fn reset(&mut self) -> ProgressSnapshot {
        self.viewed.clear();
        self.split_mode = false;
        self.snapshot()
    }

    pub fn is_viewed(&self, region_id: &str) -> bool {
        self.viewed.contains(region_id)
    }

    pub fn viewed_regions(&self) -> Vec<String> {
        self.viewed.iter().cloned().collect()
    }

    pub fn split_mode(&self) -> bool {
        self.split_mode
    }

    /// Number of regions the user is expected to view right now. Grows by
    /// one once split mode reveals the bonus region.
    pub fn total_expected(&self) -> usize {
        self.base_region_count + usize::from(self.split_mode)
    }

    pub fn phase(&self) -> TourPhase {
        if self.split_mode {
            if self.viewed.contains(&self.bonus_region_id) {
                TourPhase::Complete
            } else {
                TourPhase::Split
            }
        } else if self.viewed.is_empty() {
            TourPhase::Intro
        } else {
            TourPhase::Touring
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot_with(false)
    }

    fn snapshot_with(&self, split_just_triggered: bool) -> ProgressSnapshot {
        let total = self.total_expected();
        let percentage = if total == 0 {
            0.0
        } else {
            (self.viewed.len() as f32 / total as f32 * 100.0).min(100.0)
        };

        ProgressSnapshot {
            viewed: self.viewed.len(),
            total_expected: total,
            percentage,
            split_just_triggered,
            tour_complete: self.phase() == TourPhase::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_COUNT: usize = 8;
    const BONUS: &str = "Kirovskaja";

    fn base_ids() -> Vec<String> {
        (0..BASE_COUNT).map(|i| format!("region-{}", i)).collect()
    }

    #[test]
    fn mark_viewed_is_idempotent() {
        let mut state = ProgressState::new(BASE_COUNT, BONUS);

        let first = state.mark_viewed("region-0");
        let second = state.mark_viewed("region-0");

        assert_eq!(first.viewed, 1);
        assert_eq!(second.viewed, 1);
    }

    #[test]
    fn split_triggers_on_eighth_distinct_region() {
        let mut state = ProgressState::new(BASE_COUNT, BONUS);

        for (i, id) in base_ids().iter().enumerate() {
            let snapshot = state.mark_viewed(id);
            if i < BASE_COUNT - 1 {
                assert!(!snapshot.split_just_triggered);
                assert!(!state.split_mode());
            } else {
                assert!(snapshot.split_just_triggered);
                assert!(state.split_mode());
            }
        }
    }

    #[test]
    fn bonus_view_does_not_retrigger_split() {
        let mut state = ProgressState::new(BASE_COUNT, BONUS);
        for id in base_ids() {
            state.mark_viewed(&id);
        }

        let snapshot = state.mark_viewed(BONUS);

        assert!(!snapshot.split_just_triggered);
        assert!(state.split_mode());
        assert!(snapshot.tour_complete);
    }

    #[test]
    fn percentage_is_clamped() {
        let mut state = ProgressState::new(2, BONUS);
        state.mark_viewed("a");
        state.mark_viewed("b");
        state.mark_viewed(BONUS);
        // An extra id beyond the expected roster must not push past 100.
        let snapshot = state.mark_viewed("stray");

        assert_eq!(snapshot.percentage, 100.0);
    }

    #[test]
    fn phases_derive_from_viewed_set_and_flag() {
        let mut state = ProgressState::new(2, BONUS);
        assert_eq!(state.phase(), TourPhase::Intro);

        state.mark_viewed("a");
        assert_eq!(state.phase(), TourPhase::Touring);

        state.mark_viewed("b");
        assert_eq!(state.phase(), TourPhase::Split);

        state.mark_viewed(BONUS);
        assert_eq!(state.phase(), TourPhase::Complete);
    }

    #[test]
    fn reset_reproduces_fresh_session_behavior() {
        let mut state = ProgressState::new(2, BONUS);
        state.mark_viewed("a");
        state.mark_viewed("b");
        state.mark_viewed(BONUS);

        let cleared = state.reset();
        assert_eq!(cleared.viewed, 0);
        assert!(!state.split_mode());
        assert_eq!(state.phase(), TourPhase::Intro);

        // Same transition sequence as the first cycle.
        assert!(!state.mark_viewed("a").split_just_triggered);
        assert!(state.mark_viewed("b").split_just_triggered);
        assert!(state.mark_viewed(BONUS).tour_complete);
    }

    #[test]
    fn label_formats_viewed_of_total() {
        let mut state = ProgressState::new(BASE_COUNT, BONUS);
        state.mark_viewed("region-0");
        assert_eq!(state.snapshot().label(), "Viewed 1 of 8 regions");
    }
}
