//! Service layer for the tour engine.
//!
//! Separates discovery, progress, and orchestration logic from any
//! rendering layer for better testability.

pub mod discovery;
pub mod progress;
pub mod tour;

pub use discovery::{DiscoverOptions, DiscoveryService};
pub use progress::ProgressService;
pub use tour::{CloseOutcome, TourService, TourView};
