//! Persistent store for discovered slides and viewing progress.
//!
//! A single SQLite file holds two logical tables: `slides`, keyed by region
//! id, and `progress`, keyed by a fixed set of record ids. Values are JSON.
//! Connections are driven through `spawn_blocking` so callers stay async.
//!
//! Slide entries written by earlier schema generations may be bare URL
//! strings or `{name, data}` objects; both are normalized on load.

use crate::error::{AppError, Result};
use log::info;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::task;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 3;

/// Progress-table record id for the viewed-region set.
const VIEWED_REGIONS_ID: &str = "viewedRegions";
/// Progress-table record id for the split-mode flag.
const SPLIT_MODE_ID: &str = "splitMode";

/// One discovered slide image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub file_name: String,
    pub url: String,
}

impl SlideRecord {
    pub fn new(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            url: url.into(),
        }
    }
}

/// Sorts slide records by numeric-aware filename order, so `2.png` comes
/// before `10.png`.
pub fn sort_slide_records(records: &mut [SlideRecord]) {
    records.sort_by(|a, b| natord::compare(&a.file_name, &b.file_name));
}

/// Accepts current and legacy on-disk slide encodings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSlide {
    Record {
        #[serde(alias = "name")]
        file_name: String,
        #[serde(alias = "data")]
        url: String,
    },
    Bare(String),
}

impl From<StoredSlide> for SlideRecord {
    fn from(stored: StoredSlide) -> Self {
        match stored {
            StoredSlide::Record { file_name, url } => SlideRecord { file_name, url },
            StoredSlide::Bare(url) => SlideRecord {
                file_name: String::new(),
                url,
            },
        }
    }
}

fn decode_slides(json: &str) -> Result<Vec<SlideRecord>> {
    let stored: Vec<StoredSlide> = serde_json::from_str(json)?;
    let mut records: Vec<SlideRecord> = stored.into_iter().map(SlideRecord::from).collect();
    sort_slide_records(&mut records);
    Ok(records)
}

/// Handle to the presentation database.
///
/// Cheap to clone; all clones share one connection guarded by a mutex and
/// only ever lock it inside `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct PresentationStore {
    conn: Arc<Mutex<Connection>>,
}

impl PresentationStore {
    /// Opens (creating if missing) the database and runs the migration.
    ///
    /// Migration failures are fatal: the engine cannot run without its
    /// store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            migrate(&conn)?;
            Ok(Self {
                conn: Arc::new(Mutex::new(conn)),
            })
        })
        .await?
    }

    /// In-memory database for tests and ephemeral runs.
    pub async fn open_in_memory() -> Result<Self> {
        task::spawn_blocking(|| {
            let conn = Connection::open_in_memory()?;
            migrate(&conn)?;
            Ok(Self {
                conn: Arc::new(Mutex::new(conn)),
            })
        })
        .await?
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            f(&conn)
        })
        .await?
    }

    /// Stores the slide list for a region, replacing any previous entry.
    /// An empty list is a valid entry meaning "checked, nothing found".
    pub async fn put_slides(&self, region_id: &str, slides: &[SlideRecord]) -> Result<()> {
        let region_id = region_id.to_string();
        let json = serde_json::to_string(slides)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO slides (region_id, slides) VALUES (?1, ?2)",
                params![region_id, json],
            )?;
            Ok(())
        })
        .await
    }

    /// Loads the slide list for a region. `None` means the region has never
    /// been checked.
    pub async fn get_slides(&self, region_id: &str) -> Result<Option<Vec<SlideRecord>>> {
        let region_id = region_id.to_string();
        self.with_conn(move |conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT slides FROM slides WHERE region_id = ?1",
                    params![region_id],
                    |row| row.get(0),
                )
                .optional()?;
            match json {
                Some(json) => Ok(Some(decode_slides(&json)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Loads every stored slide entry, keyed by region id.
    pub async fn get_all_slides(&self) -> Result<HashMap<String, Vec<SlideRecord>>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT region_id, slides FROM slides")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut all = HashMap::new();
            for row in rows {
                let (region_id, json) = row?;
                all.insert(region_id, decode_slides(&json)?);
            }
            Ok(all)
        })
        .await
    }

    /// Drops every stored slide entry.
    pub async fn clear_slides(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM slides", [])?;
            Ok(())
        })
        .await
    }

    /// Persists the viewed-region set.
    pub async fn save_viewed_regions(&self, regions: &[String]) -> Result<()> {
        let json = serde_json::to_string(regions)?;
        self.put_progress(VIEWED_REGIONS_ID, json).await
    }

    /// Loads the viewed-region set, if one was ever saved.
    pub async fn load_viewed_regions(&self) -> Result<Option<Vec<String>>> {
        match self.get_progress(VIEWED_REGIONS_ID).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Persists the split-mode flag.
    pub async fn save_split_mode(&self, value: bool) -> Result<()> {
        let json = serde_json::to_string(&value)?;
        self.put_progress(SPLIT_MODE_ID, json).await
    }

    /// Loads the split-mode flag, if one was ever saved.
    pub async fn load_split_mode(&self) -> Result<Option<bool>> {
        match self.get_progress(SPLIT_MODE_ID).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Drops every progress record.
    pub async fn clear_progress(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM progress", [])?;
            Ok(())
        })
        .await
    }

    async fn put_progress(&self, id: &'static str, json: String) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO progress (id, value) VALUES (?1, ?2)",
                params![id, json],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_progress(&self, id: &'static str) -> Result<Option<String>> {
        self.with_conn(move |conn| {
            let json = conn
                .query_row(
                    "SELECT value FROM progress WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(json)
        })
        .await
    }
}

/// One-time schema migration, run before any other operation.
///
/// Tables are created idempotently and the stored version only ever moves
/// forward. A database written by a newer build is rejected.
fn migrate(conn: &Connection) -> Result<()> {
    let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(AppError::SchemaVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS slides (
          region_id TEXT PRIMARY KEY,
          slides TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS progress (
          id TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
        ",
    )?;

    if found < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
        info!("Store schema migrated from version {} to {}", found, SCHEMA_VERSION);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn samara_slides() -> Vec<SlideRecord> {
        (1..=5)
            .map(|i| {
                SlideRecord::new(
                    format!("{:02}.png", i),
                    format!("https://example.test/Samara/{:02}.png", i),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn slides_round_trip_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tour.db");

        let store = PresentationStore::open(&path).await.unwrap();
        let slides = samara_slides();
        store.put_slides("Samara", &slides).await.unwrap();
        drop(store);

        // Simulates a process restart.
        let store = PresentationStore::open(&path).await.unwrap();
        let loaded = store.get_slides("Samara").await.unwrap().unwrap();
        assert_eq!(loaded, slides);
    }

    #[tokio::test]
    async fn missing_region_is_distinct_from_recorded_empty() {
        let store = PresentationStore::open_in_memory().await.unwrap();

        assert_eq!(store.get_slides("Samara").await.unwrap(), None);

        store.put_slides("Samara", &[]).await.unwrap();
        assert_eq!(store.get_slides("Samara").await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn legacy_bare_string_entries_are_normalized() {
        let store = PresentationStore::open_in_memory().await.unwrap();

        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO slides (region_id, slides) VALUES (?1, ?2)",
                    params![
                        "Samara",
                        r#"["https://example.test/Samara/01.png"]"#
                    ],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let loaded = store.get_slides("Samara").await.unwrap().unwrap();
        assert_eq!(
            loaded,
            vec![SlideRecord::new("", "https://example.test/Samara/01.png")]
        );
    }

    #[tokio::test]
    async fn legacy_name_data_entries_are_normalized() {
        let store = PresentationStore::open_in_memory().await.unwrap();

        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO slides (region_id, slides) VALUES (?1, ?2)",
                    params![
                        "SPB",
                        r#"[{"name":"01.png","data":"https://example.test/SPB/01.png"}]"#
                    ],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let loaded = store.get_slides("SPB").await.unwrap().unwrap();
        assert_eq!(
            loaded,
            vec![SlideRecord::new("01.png", "https://example.test/SPB/01.png")]
        );
    }

    #[tokio::test]
    async fn slides_load_in_numeric_aware_order() {
        let store = PresentationStore::open_in_memory().await.unwrap();

        let unsorted = vec![
            SlideRecord::new("10.png", "https://example.test/NN/10.png"),
            SlideRecord::new("2.png", "https://example.test/NN/2.png"),
            SlideRecord::new("1.png", "https://example.test/NN/1.png"),
        ];
        store.put_slides("NN", &unsorted).await.unwrap();

        let loaded = store.get_slides("NN").await.unwrap().unwrap();
        let names: Vec<&str> = loaded.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(names, ["1.png", "2.png", "10.png"]);
    }

    #[tokio::test]
    async fn clear_slides_keeps_progress() {
        let store = PresentationStore::open_in_memory().await.unwrap();

        store.put_slides("Samara", &samara_slides()).await.unwrap();
        store
            .save_viewed_regions(&["Samara".to_string()])
            .await
            .unwrap();

        store.clear_slides().await.unwrap();

        assert_eq!(store.get_slides("Samara").await.unwrap(), None);
        assert_eq!(
            store.load_viewed_regions().await.unwrap(),
            Some(vec!["Samara".to_string()])
        );
    }

    #[tokio::test]
    async fn progress_round_trip() {
        let store = PresentationStore::open_in_memory().await.unwrap();

        assert_eq!(store.load_viewed_regions().await.unwrap(), None);
        assert_eq!(store.load_split_mode().await.unwrap(), None);

        store
            .save_viewed_regions(&["Samara".to_string(), "SPB".to_string()])
            .await
            .unwrap();
        store.save_split_mode(true).await.unwrap();

        assert_eq!(
            store.load_viewed_regions().await.unwrap(),
            Some(vec!["Samara".to_string(), "SPB".to_string()])
        );
        assert_eq!(store.load_split_mode().await.unwrap(), Some(true));

        store.clear_progress().await.unwrap();
        assert_eq!(store.load_viewed_regions().await.unwrap(), None);
        assert_eq!(store.load_split_mode().await.unwrap(), None);
    }

    #[tokio::test]
    async fn newer_schema_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tour.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }

        let err = PresentationStore::open(&path).await.unwrap_err();
        match err {
            AppError::SchemaVersion { found, supported } => {
                assert_eq!(found, 99);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
