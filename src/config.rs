// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration surface for the offline operation manager.
//!
//! There is no `.ethersync/config` ini file to parse here: the embedding
//! application constructs this programmatically. The shape still follows the
//! source's `AppConfig` — `Option` fields with documented defaults exposed
//! through accessor methods — rather than a struct of bare required fields.

use std::path::PathBuf;

use crate::record::DEFAULT_MAX_RETRIES;

#[derive(Clone, Default)]
pub struct OfflineManagerConfig {
    /// Root directory for [`crate::storage::FileOfflineStorage`]. `None` defers
    /// to `dirs::data_dir()`.
    pub storage_root: Option<PathBuf>,
    /// Overrides [`DEFAULT_MAX_RETRIES`] for newly-queued operations.
    pub max_retries: Option<u32>,
    /// The reachability flag to seed the manager with before its first
    /// subscription callback fires. Tests typically pin this explicitly.
    pub initial_online: Option<bool>,
}

impl OfflineManagerConfig {
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    #[must_use]
    pub fn initial_online(&self) -> bool {
        self.initial_online.unwrap_or(true)
    }
}
