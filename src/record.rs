// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire and persistence records for operations queued by the [`crate::offline_manager`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::operation::Operation;

/// The wire shape of an [`Operation`], tagged so it serializes to the flat
/// `{type, position, content?}` record transport expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationWire {
    Insert { content: String },
    Delete { length: usize },
    Retain { length: usize },
}

impl From<&Operation> for OperationWire {
    fn from(operation: &Operation) -> Self {
        match operation {
            Operation::Insert(content) => Self::Insert {
                content: content.clone(),
            },
            Operation::Delete(length) => Self::Delete { length: *length },
            Operation::Retain(length) => Self::Retain { length: *length },
        }
    }
}

impl From<&OperationWire> for Operation {
    fn from(wire: &OperationWire) -> Self {
        match wire {
            OperationWire::Insert { content } => Self::Insert(content.clone()),
            OperationWire::Delete { length } => Self::Delete(*length),
            OperationWire::Retain { length } => Self::Retain(*length),
        }
    }
}

/// An edit as handed to and from the transport: the operation itself plus the
/// positional/attribution/versioning metadata that travels with it over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    #[serde(flatten)]
    pub operation: OperationWire,
    pub position: usize,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub version: u64,
}

impl OperationRecord {
    #[must_use]
    pub fn new(operation: &Operation, position: usize, user_id: impl Into<String>, version: u64) -> Self {
        Self {
            operation: OperationWire::from(operation),
            position,
            user_id: user_id.into(),
            timestamp: OffsetDateTime::now_utc(),
            version,
        }
    }
}

/// An [`OperationRecord`] sitting in the offline queue, with retry bookkeeping
/// layered on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedOperation {
    pub id: String,
    #[serde(flatten)]
    pub record: OperationRecord,
    #[serde(with = "time::serde::rfc3339")]
    pub local_timestamp: OffsetDateTime,
    pub retry_count: u32,
    pub max_retries: u32,
}

/// Default retry budget before a queued operation is evicted; see
/// [`crate::offline_manager::OfflineOperationManager::mark_operation_failed`]
/// for the exact eviction timing.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// The full persisted state for one document's offline queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineState {
    pub document_id: String,
    pub operations: Vec<QueuedOperation>,
    pub last_sync_version: u64,
    pub is_offline: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sync_timestamp: Option<OffsetDateTime>,
}

impl OfflineState {
    #[must_use]
    pub fn empty(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            operations: Vec::new(),
            last_sync_version: 0,
            is_offline: false,
            last_sync_timestamp: None,
        }
    }
}

/// Builds a locally-unique, collision-resistant id for a newly-queued operation:
/// the owning document, a wall-clock timestamp, and a random suffix, so
/// concurrent tabs enqueuing against the same document don't collide.
#[must_use]
pub fn generate_operation_id(document_id: &str) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let suffix: u32 = rand::thread_rng().gen();
    format!("{document_id}-{now}-{suffix:08x}")
}
