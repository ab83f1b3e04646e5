//! User document store
//!
//! Persists the three contribution views per username with upsert
//! semantics: `insertion_date` is written once, `last_updated` on
//! every write and never moves backwards.

use crate::services::Clock;
use crate::types::{ContributionViews, PersistedUserDocument, Result, StatsError};
use chrono::{Duration, NaiveDateTime};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistence gateway keyed by username
pub trait UserStore: Send + Sync {
    /// Insert or update the document for `username`
    fn upsert(&self, username: &str, views: &ContributionViews) -> Result<PersistedUserDocument>;

    /// Load the document for `username`, if any
    fn fetch(&self, username: &str) -> Result<Option<PersistedUserDocument>>;
}

/// Apply an upsert on top of the previous document
fn merge_document(
    previous: Option<&PersistedUserDocument>,
    username: &str,
    views: &ContributionViews,
    now: NaiveDateTime,
) -> PersistedUserDocument {
    let (insertion_date, last_updated) = match previous {
        Some(prev) if now > prev.last_updated => (prev.insertion_date, now),
        Some(prev) => (prev.insertion_date, prev.last_updated + Duration::seconds(1)),
        None => (now, now),
    };

    PersistedUserDocument {
        username: username.to_string(),
        daily: views.daily.clone(),
        weekly: views.weekly.clone(),
        monthly: views.monthly.clone(),
        insertion_date,
        last_updated,
    }
}

fn check_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(StatsError::InvalidIdentity);
    }
    if username.starts_with('.') || username.contains(['/', '\\']) {
        return Err(StatsError::Store(format!(
            "Username '{}' cannot be used as a document key",
            username
        )));
    }
    Ok(())
}

/// In-memory store
pub struct MemoryStore {
    documents: Mutex<HashMap<String, PersistedUserDocument>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl UserStore for MemoryStore {
    fn upsert(&self, username: &str, views: &ContributionViews) -> Result<PersistedUserDocument> {
        check_username(username)?;
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| StatsError::Store("Store lock poisoned".into()))?;

        let doc = merge_document(documents.get(username), username, views, self.clock.now());
        documents.insert(username.to_string(), doc.clone());
        Ok(doc)
    }

    fn fetch(&self, username: &str) -> Result<Option<PersistedUserDocument>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| StatsError::Store("Store lock poisoned".into()))?;
        Ok(documents.get(username).cloned())
    }
}

/// One JSON document per user under a directory
pub struct JsonFileStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonFileStore {
    pub fn with_dir(dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self { dir, clock }
    }

    pub fn document_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.json", username))
    }

    fn lock_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", username))
    }

    fn open_lock(&self, username: &str) -> Result<File> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(username))?;
        Ok(file)
    }

    /// Read a document without locking; caller holds the user's lock.
    fn read_document(&self, username: &str) -> Result<Option<PersistedUserDocument>> {
        let path = self.document_path(username);
        if !path.exists() {
            return Ok(None);
        }

        let mut content = String::new();
        File::open(&path)?.read_to_string(&mut content)?;
        let doc = serde_json::from_str(&content)
            .map_err(|e| StatsError::Store(format!("Corrupted document {:?}: {}", path, e)))?;
        Ok(Some(doc))
    }

    /// Save using atomic write (temp file + rename)
    fn write_document(&self, doc: &PersistedUserDocument) -> Result<()> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| StatsError::Store(format!("Serialization failed: {}", e)))?;

        let path = self.document_path(&doc.username);
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path)
                .map_err(|e| StatsError::Store(format!("Failed to create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| StatsError::Store(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| StatsError::Store(format!("Failed to sync temp file: {}", e)))?;
        }

        fs::rename(&temp_path, &path)
            .map_err(|e| StatsError::Store(format!("Failed to rename temp file: {}", e)))?;
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn upsert(&self, username: &str, views: &ContributionViews) -> Result<PersistedUserDocument> {
        check_username(username)?;

        let lock = self.open_lock(username)?;
        lock.lock_exclusive()
            .map_err(|e| StatsError::Store(format!("Failed to acquire write lock: {}", e)))?;

        let result = self.read_document(username).and_then(|previous| {
            let doc = merge_document(previous.as_ref(), username, views, self.clock.now());
            self.write_document(&doc)?;
            Ok(doc)
        });

        let _ = lock.unlock();

        if let Ok(doc) = &result {
            debug!(
                "Upserted {} (inserted {}, updated {})",
                username, doc.insertion_date, doc.last_updated
            );
        }
        result
    }

    fn fetch(&self, username: &str) -> Result<Option<PersistedUserDocument>> {
        check_username(username)?;
        if !self.document_path(username).exists() {
            return Ok(None);
        }

        let lock = self.open_lock(username)?;
        lock.lock_shared()
            .map_err(|e| StatsError::Store(format!("Failed to acquire read lock: {}", e)))?;
        let result = self.read_document(username);
        let _ = lock.unlock();
        result
    }
}
