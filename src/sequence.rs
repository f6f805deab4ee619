// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ordered sequences of [`Operation`]s applied left-to-right with a threaded cursor —
//! the encoding a single whole-document edit is built from (e.g.
//! `[Retain(5), Insert("foo"), Retain(3), Delete(2)]`).

use crate::error::OperationError;
use crate::operation::Operation;

pub type OperationSequence = Vec<Operation>;

/// Threads `position` through `sequence`, applying each operation where the
/// previous one left the cursor.
pub fn apply_sequence(
    document: &str,
    sequence: &OperationSequence,
    position: usize,
) -> Result<String, OperationError> {
    let mut document = document.to_string();
    let mut position = position;
    for op in sequence {
        let (next_document, next_position) = op.apply(&document, position)?;
        document = next_document;
        position = next_position;
    }
    Ok(document)
}

/// Builds the undo sequence for `sequence`, replaying forward from `document` to
/// capture each operation's pre-state, then inverting in reverse order.
///
/// Guarantee: `apply_sequence(apply_sequence(doc, seq), invert_sequence(seq, doc)) == doc`.
pub fn invert_sequence(
    sequence: &OperationSequence,
    document: &str,
) -> Result<OperationSequence, OperationError> {
    let mut snapshots = Vec::with_capacity(sequence.len());
    let mut current_document = document.to_string();
    let mut position = 0;
    for op in sequence {
        snapshots.push((current_document.clone(), position));
        let (next_document, next_position) = op.apply(&current_document, position)?;
        current_document = next_document;
        position = next_position;
    }

    let mut inverses = Vec::with_capacity(sequence.len());
    for (op, (pre_document, pre_position)) in sequence.iter().zip(snapshots).rev() {
        inverses.push(op.invert(&pre_document, pre_position)?);
    }
    Ok(inverses)
}

/// Strips zero-length operations from `sequence` without changing its semantics.
#[must_use]
pub fn remove_no_ops(sequence: &OperationSequence) -> OperationSequence {
    sequence.iter().filter(|op| !op.is_no_op()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seq(ops: &[Operation]) -> OperationSequence {
        ops.to_vec()
    }

    #[test]
    fn apply_sequence_threads_cursor_through_ops() {
        let sequence = seq(&[
            Operation::Retain(5),
            Operation::Insert(" brave".into()),
            Operation::Retain(6),
        ]);
        let result = apply_sequence("hello world", &sequence, 0).unwrap();
        assert_eq!(result, "hello brave world");
    }

    #[test]
    fn invert_sequence_round_trips() {
        let doc = "hello world";
        let sequence = seq(&[
            Operation::Retain(5),
            Operation::Delete(1),
            Operation::Insert("_".into()),
            Operation::Retain(5),
        ]);
        let edited = apply_sequence(doc, &sequence, 0).unwrap();
        let inverse = invert_sequence(&sequence, doc).unwrap();
        let restored = apply_sequence(&edited, &inverse, 0).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn invert_sequence_reverses_order() {
        let doc = "ab";
        let sequence = seq(&[Operation::Insert("X".into()), Operation::Insert("Y".into())]);
        // doc -> "Xab" -> "XYab"
        let inverse = invert_sequence(&sequence, doc).unwrap();
        // undoing must remove "Y" first, then "X"
        assert_eq!(inverse, seq(&[Operation::Delete(1), Operation::Delete(1)]));
    }

    #[test]
    fn remove_no_ops_strips_zero_length_retain() {
        let sequence = seq(&[
            Operation::Retain(0),
            Operation::Insert("x".into()),
            Operation::Retain(0),
            Operation::Delete(0),
        ]);
        let cleaned = remove_no_ops(&sequence);
        assert_eq!(cleaned, seq(&[Operation::Insert("x".into())]));
    }

    #[test]
    fn remove_no_ops_is_a_fixed_point() {
        let sequence = seq(&[Operation::Retain(3), Operation::Insert("y".into())]);
        let once = remove_no_ops(&sequence);
        let twice = remove_no_ops(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_retain_zero_is_identity() {
        let sequence = seq(&[Operation::Retain(0)]);
        assert_eq!(apply_sequence("hello", &sequence, 0).unwrap(), "hello");
    }
}
