//! Application configuration.
//!
//! Defaults mirror the reference deployment: two-digit zero-padded PNG
//! filenames probed up to 200 indices per region.

use std::path::PathBuf;
use std::time::Duration;

/// Default file extension for slide images.
pub const DEFAULT_SLIDE_EXT: &str = "png";

/// Default zero-padding width for slide filenames (`01.png` .. `99.png`).
pub const DEFAULT_SLIDE_PAD: usize = 2;

/// Hard ceiling on probe attempts per region.
pub const DEFAULT_MAX_PROBE_ATTEMPTS: u32 = 200;

/// Default timeout applied to each existence probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Consecutive-miss threshold used by the tolerant stopping policy.
pub const DEFAULT_MISS_STREAK: u32 = 5;

/// When to stop probing slide indices for a region.
///
/// The two policies produce different results on hosts with gaps in slide
/// numbering; `Strict` is the default and matches the reference host where
/// slides are numbered contiguously from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop at the first index that does not exist.
    Strict,
    /// Keep probing until `miss_streak` consecutive misses occur after at
    /// least one hit, or the attempt ceiling is reached.
    Tolerant { miss_streak: u32 },
}

impl Default for StopPolicy {
    fn default() -> Self {
        StopPolicy::Strict
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the static asset host.
    pub base_url: String,
    /// Optional path segment between the base URL and region folders.
    /// Empty means region folders live at the host root.
    pub slides_root: String,
    /// Slide image file extension, without the dot.
    pub slide_ext: String,
    /// Zero-padding width for slide filenames.
    pub slide_pad: usize,
    /// Hard ceiling on probe attempts per region.
    pub max_probe_attempts: u32,
    /// Stopping policy for the probe loop.
    pub stop_policy: StopPolicy,
    /// Timeout applied to each individual existence probe.
    pub probe_timeout: Duration,
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://aleksey341.github.io/-2025".to_string(),
            slides_root: String::new(),
            slide_ext: DEFAULT_SLIDE_EXT.to_string(),
            slide_pad: DEFAULT_SLIDE_PAD,
            max_probe_attempts: DEFAULT_MAX_PROBE_ATTEMPTS,
            stop_policy: StopPolicy::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            db_path: PathBuf::from("tour-cache.db"),
        }
    }
}
