// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Operational-transform core and offline operation queue for a real-time
//! collaborative text editor.
//!
//! The two cooperating subsystems live in their own modules: the OT algebra
//! ([`operation`], [`sequence`], [`compose`], [`transform`]) represents and
//! reconciles concurrent edits; the offline operation manager ([`offline_manager`]
//! plus its supporting [`record`], [`storage`], [`network`], [`config`] modules)
//! buffers, persists, and replays locally-produced operations across
//! disconnects.

pub mod compose;
pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod offline_manager;
pub mod operation;
pub mod record;
pub mod sequence;
pub mod storage;
pub mod transform;

pub use error::OperationError;
pub use offline_manager::{OfflineOperationManager, OfflineManagerCallbacks};
pub use operation::Operation;
pub use sequence::OperationSequence;
pub use transform::{Priority, PositionedOperation};
