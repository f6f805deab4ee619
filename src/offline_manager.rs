// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The offline operation queue: buffers locally-produced operations across
//! network partitions, persists them, and feeds a sync driver in FIFO order
//! with bounded retry.

use tracing::{debug, info, warn};

use crate::config::OfflineManagerConfig;
use crate::network::{NetworkReachability, ReachabilityEvents};
use crate::operation::Operation;
use crate::record::{generate_operation_id, OfflineState, OperationRecord, QueuedOperation};
use crate::storage::OfflineStorage;

/// Consumer-supplied hooks, invoked synchronously inside the mutating call that
/// triggers them. A no-op default is provided for callers that don't need all four.
#[derive(Default)]
pub struct OfflineManagerCallbacks {
    pub on_operation_queued: Option<Box<dyn FnMut(&QueuedOperation) + Send>>,
    pub on_operation_synced: Option<Box<dyn FnMut(&str) + Send>>,
    pub on_sync_error: Option<Box<dyn FnMut(&str, &str) + Send>>,
    pub on_offline_state_change: Option<Box<dyn FnMut(bool) + Send>>,
}

impl OfflineManagerCallbacks {
    fn queued(&mut self, operation: &QueuedOperation) {
        if let Some(callback) = self.on_operation_queued.as_mut() {
            callback(operation);
        }
    }

    fn synced(&mut self, id: &str) {
        if let Some(callback) = self.on_operation_synced.as_mut() {
            callback(id);
        }
    }

    fn sync_error(&mut self, id: &str, error: &str) {
        if let Some(callback) = self.on_sync_error.as_mut() {
            callback(id, error);
        }
    }

    fn offline_state_change(&mut self, is_offline: bool) {
        if let Some(callback) = self.on_offline_state_change.as_mut() {
            callback(is_offline);
        }
    }
}

/// Owns the durable queue of locally-produced operations for one document,
/// exposes a sync-oriented view to an external sync driver, and mirrors
/// network-reachability state.
pub struct OfflineOperationManager {
    document_id: String,
    config: OfflineManagerConfig,
    storage: Box<dyn OfflineStorage>,
    state: OfflineState,
    sync_in_progress: bool,
    callbacks: OfflineManagerCallbacks,
    reachability_events: Option<ReachabilityEvents>,
}

impl OfflineOperationManager {
    /// Loads any persisted state for `document_id` (initializing empty on any
    /// read/parse failure) and subscribes to `network` for reachability transitions.
    pub fn new(
        document_id: impl Into<String>,
        config: OfflineManagerConfig,
        storage: Box<dyn OfflineStorage>,
        network: &dyn NetworkReachability,
        callbacks: OfflineManagerCallbacks,
    ) -> Self {
        let document_id = document_id.into();

        let state = match storage.load(&document_id) {
            Ok(Some(state)) => state,
            Ok(None) => OfflineState::empty(&document_id),
            Err(err) => {
                warn!(document_id = %document_id, error = %err, "failed to load offline state, starting empty");
                OfflineState::empty(&document_id)
            }
        };

        let mut state = state;
        state.is_offline = !network.is_online();

        info!(document_id = %document_id, queue_size = state.operations.len(), is_offline = state.is_offline, "offline manager constructed");

        Self {
            document_id,
            config,
            storage,
            state,
            sync_in_progress: false,
            callbacks,
            reachability_events: Some(ReachabilityEvents::subscribe(network)),
        }
    }

    /// Convenience constructor that resolves storage from `config.storage_root`
    /// (falling back to the OS data directory) instead of requiring the caller
    /// to build a [`crate::storage::FileOfflineStorage`] by hand.
    pub fn with_file_storage(
        document_id: impl Into<String>,
        config: OfflineManagerConfig,
        network: &dyn NetworkReachability,
        callbacks: OfflineManagerCallbacks,
    ) -> Self {
        let storage: Box<dyn OfflineStorage> = match config.storage_root.clone() {
            Some(root) => Box::new(crate::storage::FileOfflineStorage::new(root)),
            None => Box::new(crate::storage::FileOfflineStorage::with_default_root()),
        };
        Self::new(document_id, config, storage, network, callbacks)
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.document_id, &self.state) {
            warn!(document_id = %self.document_id, error = %err, "failed to persist offline state");
        }
    }

    /// Drains any reachability transitions queued since the last call and
    /// dispatches them serially to [`Self::set_offline_state`].
    pub fn pump_network_events(&mut self) {
        let Some(events) = self.reachability_events.as_ref() else {
            return;
        };
        for online in events.drain() {
            self.set_offline_state(!online);
        }
    }

    /// Assigns `{id, local_timestamp, retry_count=0}`, appends, persists, and
    /// emits `on_operation_queued`. Persistence failure is logged and does not
    /// fail the call.
    pub fn queue_operation(&mut self, operation: &Operation, position: usize, user_id: &str, version: u64) -> QueuedOperation {
        let record = OperationRecord::new(operation, position, user_id, version);
        let queued = QueuedOperation {
            id: generate_operation_id(&self.document_id),
            local_timestamp: record.timestamp,
            max_retries: self.config.max_retries(),
            record,
            retry_count: 0,
        };

        debug!(document_id = %self.document_id, operation_id = %queued.id, "queuing operation");
        self.state.operations.push(queued.clone());
        self.persist();
        self.callbacks.queued(&queued);
        queued
    }

    /// A defensive copy of every currently-queued operation.
    #[must_use]
    pub fn get_queued_operations(&self) -> Vec<QueuedOperation> {
        self.state.operations.clone()
    }

    #[must_use]
    pub fn queue_size(&self) -> usize {
        self.state.operations.len()
    }

    /// Removes the operation with `id` if present; persists and emits
    /// `on_operation_synced`. A no-op (no callback) on an unknown id.
    pub fn remove_operation(&mut self, id: &str) {
        let before = self.state.operations.len();
        self.state.operations.retain(|op| op.id != id);
        if self.state.operations.len() == before {
            return;
        }
        debug!(document_id = %self.document_id, operation_id = %id, "operation synced");
        self.persist();
        self.callbacks.synced(id);
    }

    /// Increments the retry counter for `id` and evicts it once that counter
    /// reaches the configured maximum on a *subsequent* failure call — i.e. an
    /// operation survives retries `1..max_retries-1`, sits at `retry_count ==
    /// max_retries` after the call that reaches it, and is evicted on the next
    /// failure after that. `on_sync_error` fires on every call regardless.
    pub fn mark_operation_failed(&mut self, id: &str, error: &str) {
        let Some(operation) = self.state.operations.iter_mut().find(|op| op.id == id) else {
            return;
        };

        let should_evict = operation.retry_count >= operation.max_retries;
        operation.retry_count += 1;
        let retry_count = operation.retry_count;

        warn!(document_id = %self.document_id, operation_id = %id, retry_count, error, "operation sync failed");
        self.callbacks.sync_error(id, error);

        if should_evict {
            self.remove_operation(id);
        } else {
            self.persist();
        }
    }

    /// Operations still eligible for sync (`retry_count < max_retries`).
    #[must_use]
    pub fn get_retryable_operations(&self) -> Vec<QueuedOperation> {
        self.state
            .operations
            .iter()
            .filter(|op| op.retry_count < op.max_retries)
            .cloned()
            .collect()
    }

    /// Retryable operations sorted ascending by `local_timestamp`, stable for
    /// equal timestamps.
    #[must_use]
    pub fn get_operations_for_sync(&self) -> Vec<QueuedOperation> {
        let mut retryable = self.get_retryable_operations();
        retryable.sort_by_key(|op| op.local_timestamp);
        retryable
    }

    /// Sets the offline flag; persists and emits `on_offline_state_change` only
    /// on an actual transition.
    pub fn set_offline_state(&mut self, is_offline: bool) {
        if self.state.is_offline == is_offline {
            return;
        }
        info!(document_id = %self.document_id, is_offline, "offline state changed");
        self.state.is_offline = is_offline;
        self.persist();
        self.callbacks.offline_state_change(is_offline);
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.state.is_offline
    }

    pub fn update_last_sync_version(&mut self, version: u64) {
        self.state.last_sync_version = version;
        self.persist();
    }

    #[must_use]
    pub fn get_last_sync_version(&self) -> u64 {
        self.state.last_sync_version
    }

    /// In-memory only; not persisted.
    pub fn set_sync_in_progress(&mut self, in_progress: bool) {
        self.sync_in_progress = in_progress;
    }

    #[must_use]
    pub fn is_sync_in_progress(&self) -> bool {
        self.sync_in_progress
    }

    pub fn clear_queue(&mut self) {
        debug!(document_id = %self.document_id, "clearing offline queue");
        self.state.operations.clear();
        self.persist();
    }

    /// Detaches the network subscription. The manager remains otherwise usable
    /// (queue/persist operations still work) but no longer reacts to reachability changes.
    pub fn destroy(&mut self) {
        info!(document_id = %self.document_id, "offline manager destroyed");
        self.reachability_events = None;
    }
}
