// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Durable persistence for [`crate::record::OfflineState`], keyed by document id.
//!
//! `PersistenceFailure`/`DeserializationFailure` from §7 of the design are not
//! typed errors here: callers (the offline manager) log and swallow them, so
//! `anyhow::Result` is the right fit, matching how the source's `history.rs`
//! and `config.rs` use `anyhow` at similar "best effort" boundaries.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::record::OfflineState;

/// A durable key/value store for offline queue state, one entry per document.
///
/// Implementations are expected to make [`OfflineStorage::save`] atomic enough
/// that a crash mid-write never leaves a corrupt value behind — [`load`] treats
/// anything that fails to parse as absent, never as an error worth surfacing.
pub trait OfflineStorage: Send + Sync {
    fn save(&self, document_id: &str, state: &OfflineState) -> Result<()>;
    fn load(&self, document_id: &str) -> Result<Option<OfflineState>>;
    fn clear(&self, document_id: &str) -> Result<()>;
}

fn storage_key(document_id: &str) -> String {
    format!("offline_operations_{document_id}")
}

/// Filesystem-backed [`OfflineStorage`]: one JSON file per document under a
/// root directory, defaulting to the OS data directory (`dirs::data_dir()`)
/// the way a desktop editor would, rather than a path relative to cwd.
pub struct FileOfflineStorage {
    root: PathBuf,
}

impl FileOfflineStorage {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Uses `dirs::data_dir()/cotext` if available, else falls back to `./cotext-data`.
    #[must_use]
    pub fn with_default_root() -> Self {
        let root = dirs::data_dir()
            .map(|dir| dir.join("cotext"))
            .unwrap_or_else(|| PathBuf::from("cotext-data"));
        Self::new(root)
    }

    fn path_for(&self, document_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", storage_key(document_id)))
    }
}

impl OfflineStorage for FileOfflineStorage {
    fn save(&self, document_id: &str, state: &OfflineState) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating storage root {}", self.root.display()))?;

        let path = self.path_for(document_id);
        let json = serde_json::to_vec_pretty(state).context("serializing offline state")?;

        // Write to a sibling temp file, then rename, so a reader never observes
        // a half-written value.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("renaming {} into place", path.display()))?;
        Ok(())
    }

    fn load(&self, document_id: &str) -> Result<Option<OfflineState>> {
        let path = self.path_for(document_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
        };
        Ok(serde_json::from_slice(&bytes).ok())
    }

    fn clear(&self, document_id: &str) -> Result<()> {
        let path = self.path_for(document_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
        }
    }
}

/// An in-memory [`OfflineStorage`] double for tests that don't need real disk I/O.
#[derive(Default)]
pub struct MemoryOfflineStorage {
    entries: std::sync::Mutex<std::collections::HashMap<String, OfflineState>>,
}

impl MemoryOfflineStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OfflineStorage for MemoryOfflineStorage {
    fn save(&self, document_id: &str, state: &OfflineState) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(document_id.to_string(), state.clone());
        Ok(())
    }

    fn load(&self, document_id: &str) -> Result<Option<OfflineState>> {
        Ok(self.entries.lock().unwrap().get(document_id).cloned())
    }

    fn clear(&self, document_id: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(document_id);
        Ok(())
    }
}
