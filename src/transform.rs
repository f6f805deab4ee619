// SPDX-FileCopyrightText: 2026 Cotext Contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Transforming concurrent operations against each other so that applying them
//! in either order converges on the same document (TP1).
//!
//! Every operation here carries its own absolute `position`, since transform
//! needs to compare *where* two edits land, not just their shape.

use crate::operation::Operation;

/// An [`Operation`] anchored at an absolute position in the document it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedOperation {
    pub operation: Operation,
    pub position: usize,
}

impl PositionedOperation {
    #[must_use]
    pub fn new(operation: Operation, position: usize) -> Self {
        Self { operation, position }
    }

    fn end(&self) -> usize {
        self.position + self.operation.length()
    }
}

/// Which side wins when two operations touch the same position. Callers derive
/// this from whatever tie-break they use for concurrent edits (commonly, a
/// comparison of user IDs); the algebra itself has no notion of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Left,
    Right,
}

/// Transforms `a` against `b`, both assumed concurrent (applied against the same
/// base document). Returns `(a', b')` such that applying `a` then `b'` produces
/// the same document as applying `b` then `a'`.
///
/// Either side of the pair may expand into more than one operation: splitting a
/// `Delete` is the only way to honor "characters inserted by a concurrent
/// operation are never deleted by a `Delete` that merely overlapped their
/// insertion point" when the insertion lands strictly inside the deleted range.
#[must_use]
pub fn transform(
    a: &PositionedOperation,
    b: &PositionedOperation,
    priority: Priority,
) -> (Vec<PositionedOperation>, Vec<PositionedOperation>) {
    use Operation::{Delete, Insert, Retain};

    match (&a.operation, &b.operation) {
        (Insert(_), Insert(_)) => transform_insert_insert(a, b, priority),
        (Insert(_), Delete(_)) => {
            let (b_prime, a_prime) = transform_insert_delete(a, b);
            (a_prime, b_prime)
        }
        (Delete(_), Insert(_)) => transform_insert_delete(b, a),
        (Delete(_), Delete(_)) => transform_delete_delete(a, b),
        (Retain(_), _) | (_, Retain(_)) => (
            vec![shift_against(a, b)],
            vec![shift_against(b, a)],
        ),
    }
}

/// Shifts `op`'s position past any `other` operation that lies entirely before it.
/// Used for the `Retain` cases, where a retain never conflicts with the other
/// operation's content — it only needs its anchor adjusted.
fn shift_against(op: &PositionedOperation, other: &PositionedOperation) -> PositionedOperation {
    let mut position = op.position;
    match &other.operation {
        Operation::Insert(content) if other.position <= op.position => {
            position += content.chars().count();
        }
        Operation::Delete(len) if other.position < op.position => {
            let overlap = (*len).min(op.position - other.position);
            position -= overlap;
        }
        _ => {}
    }
    PositionedOperation::new(op.operation.clone(), position)
}

fn transform_insert_insert(
    a: &PositionedOperation,
    b: &PositionedOperation,
    priority: Priority,
) -> (Vec<PositionedOperation>, Vec<PositionedOperation>) {
    let a_goes_first = match a.position.cmp(&b.position) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => priority == Priority::Left,
    };

    let a_len = a.operation.length();
    let b_len = b.operation.length();

    let a_prime_position = if a_goes_first { a.position } else { a.position + b_len };
    let b_prime_position = if a_goes_first { b.position + a_len } else { b.position };

    (
        vec![PositionedOperation::new(a.operation.clone(), a_prime_position)],
        vec![PositionedOperation::new(b.operation.clone(), b_prime_position)],
    )
}

fn transform_delete_delete(
    a: &PositionedOperation,
    b: &PositionedOperation,
) -> (Vec<PositionedOperation>, Vec<PositionedOperation>) {
    let a_len = a.operation.length();
    let b_len = b.operation.length();
    let (a_start, a_end) = (a.position, a.end());
    let (b_start, b_end) = (b.position, b.end());

    let overlap_start = a_start.max(b_start);
    let overlap_end = a_end.min(b_end);
    let overlap = overlap_end.saturating_sub(overlap_start);

    let a_prime = build_delete_after_skip(a_start, a_len, b_start, b_len, overlap);
    let b_prime = build_delete_after_skip(b_start, b_len, a_start, a_len, overlap);

    (a_prime, b_prime)
}

/// `this` is a delete of `this_len` chars starting at `this_start`; `other` already
/// removed `other_len` chars starting at `other_start`, `overlap` of which also
/// fell inside `this`'s range. Rebuilds `this` against the document with `other`
/// already applied: shrink by the shared overlap, shift left by whatever `other`
/// removed strictly before `this`.
fn build_delete_after_skip(
    this_start: usize,
    this_len: usize,
    other_start: usize,
    other_len: usize,
    overlap: usize,
) -> Vec<PositionedOperation> {
    let remaining_len = this_len - overlap;
    if remaining_len == 0 {
        return Vec::new();
    }
    let shift = if other_start <= this_start {
        other_len.min(this_start - other_start)
    } else {
        0
    };
    // `shift` is only what `other` removed strictly before `this_start`; the
    // overlap itself is already folded into `remaining_len` above and must not
    // also move the anchor, or overlapping deletes double-count it.
    let position = this_start.saturating_sub(shift.min(this_start));
    vec![PositionedOperation::new(Operation::Delete(remaining_len), position)]
}

/// `insert` and `delete` are concurrent; returns `(delete', insert')`.
fn transform_insert_delete(
    insert: &PositionedOperation,
    delete: &PositionedOperation,
) -> (Vec<PositionedOperation>, Vec<PositionedOperation>) {
    let insert_len = insert.operation.length();
    let delete_len = delete.operation.length();
    let (delete_start, delete_end) = (delete.position, delete.end());

    if insert.position <= delete_start {
        // insertion lands at or before the deleted range: delete shifts right,
        // insert is untouched (it went in first).
        let delete_prime = vec![PositionedOperation::new(
            Operation::Delete(delete_len),
            delete_start + insert_len,
        )];
        let insert_prime = vec![PositionedOperation::new(insert.operation.clone(), insert.position)];
        (delete_prime, insert_prime)
    } else if insert.position >= delete_end {
        // insertion lands after the deleted range: delete is untouched, insert
        // shifts left by whatever was removed before it.
        let delete_prime = vec![PositionedOperation::new(Operation::Delete(delete_len), delete_start)];
        let insert_prime = vec![PositionedOperation::new(
            insert.operation.clone(),
            insert.position - delete_len,
        )];
        (delete_prime, insert_prime)
    } else {
        // insertion lands strictly inside the deleted range: split the delete so
        // the inserted text survives untouched in the middle.
        let before = insert.position - delete_start;
        let after = delete_end - insert.position;
        let mut delete_prime = Vec::new();
        if before > 0 {
            delete_prime.push(PositionedOperation::new(Operation::Delete(before), delete_start));
        }
        if after > 0 {
            delete_prime.push(PositionedOperation::new(
                Operation::Delete(after),
                delete_start + insert_len,
            ));
        }
        let insert_prime = vec![PositionedOperation::new(insert.operation.clone(), before + delete_start)];
        (delete_prime, insert_prime)
    }
}

/// Transforms a whole sequence of concurrent operations from each side against
/// each other, folding through pairwise [`transform`] calls. Operations within
/// each input slice are assumed independent of one another (already anchored to
/// the same base document), not chained the way an [`crate::sequence::OperationSequence`] is.
#[must_use]
pub fn transform_sequence(
    seq_a: &[PositionedOperation],
    seq_b: &[PositionedOperation],
    priority: Priority,
) -> (Vec<PositionedOperation>, Vec<PositionedOperation>) {
    let mut a_acc = seq_a.to_vec();
    let mut b_acc = seq_b.to_vec();

    for b_op in seq_b {
        let mut next_a = Vec::with_capacity(a_acc.len());
        for a_op in &a_acc {
            let (a_prime, _) = transform(a_op, b_op, priority);
            next_a.extend(a_prime);
        }
        a_acc = next_a;
    }

    for a_op in seq_a {
        let mut next_b = Vec::with_capacity(b_acc.len());
        for b_op in &b_acc {
            let (_, b_prime) = transform(a_op, b_op, priority);
            next_b.extend(b_prime);
        }
        b_acc = next_b;
    }

    (a_acc, b_acc)
}

/// True when `a` and `b` affect disjoint regions of the document, i.e. applying
/// them in either order needs no transform at all. Two zero-length operations
/// (or an insert and a zero-length delete) at the same position still count as
/// concurrent-but-independent only if neither actually touches document content;
/// an `Insert` always "touches" its anchor point.
#[must_use]
pub fn can_apply_concurrently(a: &PositionedOperation, b: &PositionedOperation) -> bool {
    if a.operation.is_no_op() || b.operation.is_no_op() {
        return true;
    }
    let a_touches_point = matches!(a.operation, Operation::Insert(_));
    let b_touches_point = matches!(b.operation, Operation::Insert(_));

    let (a_start, a_end) = (a.position, a.end().max(a.position + usize::from(a_touches_point)));
    let (b_start, b_end) = (b.position, b.end().max(b.position + usize::from(b_touches_point)));

    a_end <= b_start || b_end <= a_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use crate::sequence::apply_sequence;
    use pretty_assertions::assert_eq;

    fn pos(op: Operation, position: usize) -> PositionedOperation {
        PositionedOperation::new(op, position)
    }

    fn apply_single(document: &str, op: &PositionedOperation) -> String {
        apply_sequence(document, &vec![op.operation.clone()], op.position).unwrap()
    }

    fn converges(document: &str, a: &PositionedOperation, b: &PositionedOperation, priority: Priority) {
        let (a_primes, b_primes) = transform(a, b, priority);

        let mut left = apply_single(document, a);
        for b_prime in &b_primes {
            left = apply_single(&left, b_prime);
        }

        let mut right = apply_single(document, b);
        for a_prime in &a_primes {
            right = apply_single(&right, a_prime);
        }

        assert_eq!(left, right, "TP1 convergence violated");
    }

    #[test]
    fn concurrent_inserts_at_different_positions_converge() {
        let doc = "hello world";
        let a = pos(Operation::Insert("X".into()), 2);
        let b = pos(Operation::Insert("Y".into()), 8);
        converges(doc, &a, &b, Priority::Left);
    }

    #[test]
    fn concurrent_inserts_at_same_position_break_tie_by_priority() {
        let doc = "ab";
        let a = pos(Operation::Insert("X".into()), 1);
        let b = pos(Operation::Insert("Y".into()), 1);
        converges(doc, &a, &b, Priority::Left);
        converges(doc, &a, &b, Priority::Right);

        let (a_prime, b_prime) = transform(&a, &b, Priority::Left);
        assert_eq!(a_prime[0].position, 1);
        assert_eq!(b_prime[0].position, 2);
    }

    #[test]
    fn overlapping_deletes_collapse_to_shared_remainder() {
        let doc = "abcdefgh";
        let a = pos(Operation::Delete(4), 0); // removes "abcd"
        let b = pos(Operation::Delete(4), 2); // removes "cdef"
        converges(doc, &a, &b, Priority::Left);
    }

    #[test]
    fn partially_overlapping_deletes_with_a_nonzero_earlier_start_converge() {
        let doc = "abcdefgh";
        let a = pos(Operation::Delete(3), 3); // removes "def"
        let b = pos(Operation::Delete(3), 1); // removes "bcd", starts before a but not at 0
        converges(doc, &a, &b, Priority::Left);

        let (a_prime, b_prime) = transform(&a, &b, Priority::Left);
        assert_eq!(a_prime, vec![pos(Operation::Delete(2), 1)]);
        assert_eq!(b_prime, vec![pos(Operation::Delete(2), 1)]);
    }

    #[test]
    fn disjoint_deletes_converge() {
        let doc = "abcdefgh";
        let a = pos(Operation::Delete(2), 0);
        let b = pos(Operation::Delete(2), 5);
        converges(doc, &a, &b, Priority::Left);
    }

    #[test]
    fn insert_strictly_inside_delete_range_splits_the_delete() {
        let doc = "abcdef";
        let insert = pos(Operation::Insert("X".into()), 2);
        let delete = pos(Operation::Delete(3), 1); // removes "bcd"
        converges(doc, &insert, &delete, Priority::Left);

        let (delete_prime, _) = transform(&insert, &delete, Priority::Left);
        assert_eq!(delete_prime.len(), 2, "delete must split around the surviving insert");
    }

    #[test]
    fn insert_before_delete_range_shifts_delete_right() {
        let doc = "abcdef";
        let insert = pos(Operation::Insert("XY".into()), 0);
        let delete = pos(Operation::Delete(2), 2);
        converges(doc, &insert, &delete, Priority::Left);
    }

    #[test]
    fn insert_after_delete_range_shifts_insert_left() {
        let doc = "abcdef";
        let insert = pos(Operation::Insert("XY".into()), 5);
        let delete = pos(Operation::Delete(2), 0);
        converges(doc, &insert, &delete, Priority::Left);
    }

    #[test]
    fn can_apply_concurrently_detects_overlap() {
        let a = pos(Operation::Delete(3), 0);
        let b = pos(Operation::Delete(3), 1);
        assert!(!can_apply_concurrently(&a, &b));

        let c = pos(Operation::Delete(2), 0);
        let d = pos(Operation::Delete(2), 2);
        assert!(can_apply_concurrently(&c, &d));
    }

    #[test]
    fn transform_sequence_folds_multiple_concurrent_ops() {
        let doc = "abcdefgh";
        let seq_a = vec![pos(Operation::Insert("X".into()), 2)];
        let seq_b = vec![
            pos(Operation::Delete(1), 0),
            pos(Operation::Insert("Y".into()), 6),
        ];

        let (a_prime, b_prime) = transform_sequence(&seq_a, &seq_b, Priority::Left);

        let mut left = doc.to_string();
        for op in &seq_a {
            left = apply_single(&left, op);
        }
        for op in &b_prime {
            left = apply_single(&left, op);
        }

        let mut right = doc.to_string();
        for op in &seq_b {
            right = apply_single(&right, op);
        }
        for op in &a_prime {
            right = apply_single(&right, op);
        }

        assert_eq!(left, right);
    }
}
