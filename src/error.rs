// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed errors for the OT algebra.
//!
//! These indicate programmer error or a corrupted document/operation pairing, and
//! are meant to propagate to the caller rather than be absorbed — unlike the
//! persistence-layer errors in [`crate::storage`], which are logged and swallowed.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("position {position} is out of bounds for a document of length {document_len}")]
    InvalidPosition {
        position: usize,
        document_len: usize,
    },

    #[error("range [{position}, {end}) is out of bounds for a document of length {document_len}")]
    InvalidRange {
        position: usize,
        end: usize,
        document_len: usize,
    },
}
