//! Slide discovery and view-state persistence engine for a regional
//! slideshow tour.
//!
//! Slides for each region are published as numbered images at predictable
//! URLs on a static host, with no manifest. This crate discovers them by
//! probing, caches the results in a local SQLite store, tracks which
//! regions have been viewed, and drives the one-way tour transitions
//! (intro, touring, split, complete). Rendering is left to an external
//! layer that consumes [`services::TourService`] and the state types.

pub mod config;
pub mod error;
pub mod prober;
pub mod region;
pub mod services;
pub mod slide_url;
pub mod state;
pub mod store;

pub use config::{Config, StopPolicy};
pub use error::{AppError, Result};
pub use region::{BASE_REGIONS, BONUS_REGION, Region};
pub use state::AppState;
pub use store::{PresentationStore, SlideRecord};
