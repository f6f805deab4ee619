// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The three primitive edits the OT algebra is built from.
//!
//! Positions and lengths here are character counts (`chars().count()`), not byte
//! offsets, so that behavior matches a host document model indexed the same way
//! a JS `string.length`/`substr` pair would be.

use crate::error::OperationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert(String),
    Delete(usize),
    Retain(usize),
}

impl Operation {
    #[must_use]
    pub fn length(&self) -> usize {
        match self {
            Self::Insert(content) => content.chars().count(),
            Self::Delete(n) | Self::Retain(n) => *n,
        }
    }

    /// True for any zero-length operation. `Retain(0)` is the canonical no-op
    /// sentinel, but an empty `Insert` or a zero-length `Delete` are equally inert.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.length() == 0
    }

    /// Applies this operation to `document` at `position`, returning the resulting
    /// document and the cursor position after the edit.
    pub fn apply(&self, document: &str, position: usize) -> Result<(String, usize), OperationError> {
        let chars: Vec<char> = document.chars().collect();
        let document_len = chars.len();
        if position > document_len {
            return Err(OperationError::InvalidPosition {
                position,
                document_len,
            });
        }

        match self {
            Self::Insert(content) => {
                let mut result: String = chars[..position].iter().collect();
                result.push_str(content);
                result.extend(chars[position..].iter());
                Ok((result, position + content.chars().count()))
            }
            Self::Delete(length) => {
                let end = position + length;
                if end > document_len {
                    return Err(OperationError::InvalidRange {
                        position,
                        end,
                        document_len,
                    });
                }
                let result: String = chars[..position]
                    .iter()
                    .chain(chars[end..].iter())
                    .collect();
                Ok((result, position))
            }
            Self::Retain(length) => Ok((document.to_string(), position + length)),
        }
    }

    /// Builds the operation that undoes this one, given the document and position
    /// it originally applied against (i.e. its *pre*-state, not the result of `apply`).
    pub fn invert(&self, document: &str, position: usize) -> Result<Self, OperationError> {
        let chars: Vec<char> = document.chars().collect();
        let document_len = chars.len();
        if position > document_len {
            return Err(OperationError::InvalidPosition {
                position,
                document_len,
            });
        }

        match self {
            Self::Insert(content) => Ok(Self::Delete(content.chars().count())),
            Self::Delete(length) => {
                let end = position + length;
                if end > document_len {
                    return Err(OperationError::InvalidRange {
                        position,
                        end,
                        document_len,
                    });
                }
                let removed: String = chars[position..end].iter().collect();
                Ok(Self::Insert(removed))
            }
            Self::Retain(length) => Ok(Self::Retain(*length)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_splices_content_and_advances_position() {
        let op = Operation::Insert("llo wor".to_string());
        let (doc, pos) = op.apply("held", 2).unwrap();
        assert_eq!(doc, "hello world");
        assert_eq!(pos, 9);
    }

    #[test]
    fn delete_removes_range_and_keeps_position() {
        let op = Operation::Delete(3);
        let (doc, pos) = op.apply("hello world", 5).unwrap();
        assert_eq!(doc, "hellorld");
        assert_eq!(pos, 5);
    }

    #[test]
    fn retain_advances_position_without_changing_document() {
        let op = Operation::Retain(4);
        let (doc, pos) = op.apply("hello", 1).unwrap();
        assert_eq!(doc, "hello");
        assert_eq!(pos, 5);
    }

    #[test]
    fn zero_length_operations_are_no_ops() {
        assert!(Operation::Retain(0).is_no_op());
        assert!(Operation::Delete(0).is_no_op());
        assert!(Operation::Insert(String::new()).is_no_op());
        assert!(!Operation::Retain(1).is_no_op());
        assert!(!Operation::Insert("x".into()).is_no_op());
    }

    #[test]
    fn apply_rejects_position_past_document_end() {
        let err = Operation::Insert("x".into()).apply("hi", 5).unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidPosition {
                position: 5,
                document_len: 2
            }
        );
    }

    #[test]
    fn delete_rejects_range_past_document_end() {
        let err = Operation::Delete(5).apply("hi", 1).unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidRange {
                position: 1,
                end: 6,
                document_len: 2
            }
        );
    }

    #[test]
    fn invert_insert_yields_delete_of_same_length() {
        let op = Operation::Insert("abc".into());
        assert_eq!(op.invert("xyz", 0).unwrap(), Operation::Delete(3));
    }

    #[test]
    fn invert_delete_yields_insert_of_removed_text() {
        let op = Operation::Delete(3);
        assert_eq!(
            op.invert("hello world", 5).unwrap(),
            Operation::Insert(" wo".into())
        );
    }

    #[test]
    fn invert_retain_is_identity() {
        assert_eq!(
            Operation::Retain(4).invert("hello", 0).unwrap(),
            Operation::Retain(4)
        );
    }

    #[test]
    fn apply_then_invert_then_apply_round_trips() {
        let doc = "hello world";
        let op = Operation::Delete(6);
        let (edited, pos) = op.apply(doc, 0).unwrap();
        assert_eq!(edited, "world");
        let undo = op.invert(doc, 0).unwrap();
        let (restored, _) = undo.apply(&edited, pos).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn unicode_positions_are_character_counts_not_bytes() {
        let op = Operation::Insert("x".into());
        let (doc, pos) = op.apply("héllo", 2).unwrap();
        assert_eq!(doc, "héxllo");
        assert_eq!(pos, 3);
    }
}
