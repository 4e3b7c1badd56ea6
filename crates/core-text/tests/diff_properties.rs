//! Property-based tests for the block diff and group inverse.

use core_text::{
    EditOperation, Eol, LineBuffer, Position, Range, TextError, apply_edits, compute_edits,
};
use proptest::prelude::*;

fn eol_strategy() -> impl Strategy<Value = Eol> {
    prop_oneof![Just(Eol::Lf), Just(Eol::Crlf)]
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-c]{0,3}", 1..8)
}

/// Apply `ops`; a carriage return stranded before an LF break must be refused
/// without touching the buffer. `None` means refused.
fn apply_or_refused(
    buffer: &mut LineBuffer,
    ops: &[EditOperation],
) -> Result<Option<Vec<EditOperation>>, TestCaseError> {
    let before = buffer.value();
    match apply_edits(buffer, ops) {
        Ok(inverse) => Ok(Some(inverse)),
        Err(TextError::CarriageReturnBeforeLineFeed { .. }) => {
            prop_assert_eq!(buffer.eol(), Eol::Lf);
            prop_assert_eq!(buffer.value(), before);
            Ok(None)
        }
        Err(err) => Err(TestCaseError::fail(err.to_string())),
    }
}

proptest! {
    // Applying the computed edits reproduces the target's lines for any EOL pairing
    #[test]
    fn edits_transform_old_into_new(
        a in lines_strategy(),
        b in lines_strategy(),
        eol_a in eol_strategy(),
        eol_b in eol_strategy(),
    ) {
        let mut old = LineBuffer::from_lines(&a, eol_a);
        let new = LineBuffer::from_lines(&b, eol_b);
        let edits = compute_edits(&old, &new);
        prop_assert!(edits.len() <= 1);
        apply_edits(&mut old, &edits).unwrap();
        prop_assert_eq!(old.lines_content(), b);
        prop_assert_eq!(old.eol(), eol_a);
    }

    // A buffer diffed against itself under any EOL is empty
    #[test]
    fn self_diff_is_empty(a in lines_strategy(), eol_a in eol_strategy(), eol_b in eol_strategy()) {
        let old = LineBuffer::from_lines(&a, eol_a);
        let new = LineBuffer::from_lines(&a, eol_b);
        prop_assert!(compute_edits(&old, &new).is_empty());
    }

    // Any single valid replacement is undone byte-for-byte by its inverse
    #[test]
    fn inverse_restores_exact_bytes(
        a in lines_strategy(),
        eol in eol_strategy(),
        l1 in 0usize..8, c1 in 0usize..5, l2 in 0usize..8, c2 in 0usize..5,
        text in "[a-c\r\n]{0,6}",
    ) {
        let mut buffer = LineBuffer::from_lines(&a, eol);
        let before = buffer.value();
        let range = buffer.validate_range(Range::new(l1 + 1, c1 + 1, l2 + 1, c2 + 1));
        let Some(inverse) = apply_or_refused(&mut buffer, &[EditOperation::replace(range, text)])? else {
            return Ok(());
        };
        apply_edits(&mut buffer, &inverse).unwrap();
        prop_assert_eq!(buffer.value(), before);
    }

    // After any accepted edit, reading `value()` back gives the same lines and EOL
    #[test]
    fn value_reparses_to_same_lines(
        a in lines_strategy(),
        eol in eol_strategy(),
        l1 in 0usize..8, c1 in 0usize..5, l2 in 0usize..8, c2 in 0usize..5,
        text in "[a-c\r\n]{0,6}",
    ) {
        let mut buffer = LineBuffer::from_lines(&a, eol);
        let range = buffer.validate_range(Range::new(l1 + 1, c1 + 1, l2 + 1, c2 + 1));
        if apply_or_refused(&mut buffer, &[EditOperation::replace(range, text)])?.is_none() {
            return Ok(());
        }
        let reparsed = LineBuffer::new(&buffer.value(), buffer.eol());
        prop_assert_eq!(reparsed.lines_content(), buffer.lines_content());
        prop_assert_eq!(reparsed.eol(), buffer.eol());
        prop_assert_eq!(reparsed.fingerprint(), buffer.fingerprint());
    }

    // Two disjoint inserts on different lines undo together
    #[test]
    fn group_inverse_restores(a in prop::collection::vec("[a-c]{0,3}", 2..8), t1 in "[xy\r\n]{0,3}", t2 in "[xy\r\n]{0,3}") {
        let mut buffer = LineBuffer::from_lines(&a, Eol::Lf);
        let before = buffer.value();
        let last = buffer.line_count();
        let ops = [
            EditOperation::insert(Position::new(last, 1), t2),
            EditOperation::insert(Position::new(1, 1), t1),
        ];
        let Some(inverse) = apply_or_refused(&mut buffer, &ops)? else {
            return Ok(());
        };
        apply_edits(&mut buffer, &inverse).unwrap();
        prop_assert_eq!(buffer.value(), before);
    }
}
