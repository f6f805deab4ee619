// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Folding two sequential operations into one equivalent operation, when possible.

use crate::operation::Operation;
use crate::sequence::OperationSequence;

/// Returns a single operation equivalent to applying `op1` then `op2`, or `None`
/// when the pair can't collapse (the caller keeps both, applied in sequence).
///
/// `None` is a normal signal here, not an error — `ComposeIncompatible` in the
/// distilled spec's error taxonomy is this return value, not an exception.
#[must_use]
pub fn compose(op1: &Operation, op2: &Operation) -> Option<Operation> {
    use Operation::{Delete, Insert, Retain};

    match (op1, op2) {
        (Retain(_), other) => Some(other.clone()),
        (first, Retain(_)) => Some(first.clone()),

        (Insert(a), Insert(b)) => Some(Insert(format!("{a}{b}"))),

        (Insert(a), Delete(n)) => {
            let len_a = a.chars().count();
            match len_a.cmp(n) {
                std::cmp::Ordering::Equal => Some(Retain(0)),
                std::cmp::Ordering::Greater => {
                    let remaining: String = a.chars().skip(*n).collect();
                    Some(Insert(remaining))
                }
                std::cmp::Ordering::Less => None,
            }
        }

        // Delete followed by Insert can't collapse: it's a replace, not a single
        // splice, and this algebra has no `Replace` variant (see design notes).
        (Delete(_), Insert(_)) => None,

        (Delete(m), Delete(n)) => Some(Delete(m + n)),
    }
}

/// Greedily folds adjacent operations in `sequence` via [`compose`]. A compose
/// that collapses to a zero-length result is dropped entirely rather than kept
/// as an explicit no-op retain. The output applies identically to the input from
/// the same starting state, and is never longer.
#[must_use]
pub fn compose_sequence(sequence: &OperationSequence) -> OperationSequence {
    let mut folded: OperationSequence = Vec::with_capacity(sequence.len());
    for op in sequence {
        if op.is_no_op() {
            continue;
        }
        match folded.last() {
            Some(previous) => match compose(previous, op) {
                Some(combined) if combined.is_no_op() => {
                    folded.pop();
                }
                Some(combined) => {
                    folded.pop();
                    folded.push(combined);
                }
                None => folded.push(op.clone()),
            },
            None => folded.push(op.clone()),
        }
    }
    folded
}
