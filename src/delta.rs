//! Text delta engine
//!
//! Computes the retain/delete/insert operations that turn one text state
//! into another, plus the exact inverse. Uses a common prefix/suffix scan:
//! O(n), and minimal for a single contiguous edit (insert, delete or
//! replace of one span). Scattered edits collapse into one replaced span.
//!
//! Counts are in `char`s (Unicode scalar values), so a delta can never
//! split a code point.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};
use crate::hash::{hash_content, ContentHash};

/// Single delta operation, applied against a source cursor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeltaOp {
    /// Copy `n` chars from the source and advance the cursor
    Retain(usize),
    /// Skip `n` chars of the source
    Delete(usize),
    /// Append literal text; the cursor does not move
    Insert(String),
}

/// Recipe that transforms the text hashing to `before_hash` into the text
/// hashing to `after_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentDelta {
    pub ops: Vec<DeltaOp>,
    pub before_hash: ContentHash,
    pub after_hash: ContentHash,
}

impl ContentDelta {
    /// True if the delta only retains (no text changes).
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, DeltaOp::Retain(_)))
    }

    /// Number of chars inserted by this delta.
    pub fn inserted_chars(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Insert(text) => text.chars().count(),
                _ => 0,
            })
            .sum()
    }

    /// Number of source chars deleted by this delta.
    pub fn deleted_chars(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DeltaOp::Delete(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

/// Forward and backward deltas between two text states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaPair {
    /// `before` -> `after`
    pub forward: ContentDelta,
    /// `after` -> `before`
    pub backward: ContentDelta,
}

/// Compute the forward and backward deltas between `before` and `after`.
///
/// 1. Identical inputs short-circuit to a single `Retain(len)` both ways.
/// 2. Otherwise find the common prefix `p`, then the common suffix `s` of
///    what remains (bounded so it never overlaps the prefix).
/// 3. Forward is `Retain(p) Delete(old span) Insert(new span) Retain(s)`,
///    skipping empty parts; backward swaps the two spans.
pub fn compute_deltas(before: &str, after: &str) -> DeltaPair {
    let before_hash = hash_content(before);
    let after_hash = hash_content(after);

    if before == after {
        let delta = ContentDelta {
            ops: vec![DeltaOp::Retain(before.chars().count())],
            before_hash,
            after_hash,
        };
        return DeltaPair {
            forward: delta.clone(),
            backward: delta,
        };
    }

    let before_len = before.chars().count();
    let after_len = after.chars().count();

    let prefix = before
        .chars()
        .zip(after.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = before_len.min(after_len) - prefix;
    let suffix = before
        .chars()
        .rev()
        .zip(after.chars().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let before_changed = char_slice(before, prefix, before_len - suffix);
    let after_changed = char_slice(after, prefix, after_len - suffix);

    DeltaPair {
        forward: ContentDelta {
            ops: build_ops(
                prefix,
                before_len - suffix - prefix,
                after_changed,
                suffix,
            ),
            before_hash,
            after_hash,
        },
        backward: ContentDelta {
            ops: build_ops(prefix, after_len - suffix - prefix, before_changed, suffix),
            before_hash: after_hash,
            after_hash: before_hash,
        },
    }
}

fn build_ops(prefix: usize, delete: usize, insert: &str, suffix: usize) -> Vec<DeltaOp> {
    let mut ops = Vec::with_capacity(4);
    if prefix > 0 {
        ops.push(DeltaOp::Retain(prefix));
    }
    if delete > 0 {
        ops.push(DeltaOp::Delete(delete));
    }
    if !insert.is_empty() {
        ops.push(DeltaOp::Insert(String::from(insert)));
    }
    if suffix > 0 {
        ops.push(DeltaOp::Retain(suffix));
    }
    if ops.is_empty() {
        ops.push(DeltaOp::Retain(0));
    }
    ops
}

/// Substring by char positions `[start, end)`.
fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(s, start);
    let end_byte = byte_offset(s, end);
    &s[start_byte..end_byte]
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(offset, _)| offset)
}

/// Apply `delta` to `content`.
///
/// Fails with [`HistoryError::ContentHashMismatch`] if `content` is not the
/// text the delta was computed against. Any source left uncovered once the
/// ops run out is copied verbatim.
pub fn apply_delta(content: &str, delta: &ContentDelta) -> Result<String> {
    let actual = hash_content(content);
    if actual != delta.before_hash {
        return Err(HistoryError::ContentHashMismatch {
            expected: delta.before_hash,
            actual,
        });
    }

    let mut out = String::with_capacity(content.len());
    let mut source = content.chars();
    for op in &delta.ops {
        match op {
            DeltaOp::Retain(n) => out.extend(source.by_ref().take(*n)),
            DeltaOp::Delete(n) => source.by_ref().take(*n).for_each(drop),
            DeltaOp::Insert(text) => out.push_str(text),
        }
    }
    out.push_str(source.as_str());
    Ok(out)
}

/// Non-failing precheck for [`apply_delta`].
#[inline]
pub fn can_apply_delta(content: &str, delta: &ContentDelta) -> bool {
    hash_content(content) == delta.before_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(a: &str, b: &str) {
        let pair = compute_deltas(a, b);
        assert_eq!(apply_delta(a, &pair.forward).unwrap(), b);
        assert_eq!(apply_delta(b, &pair.backward).unwrap(), a);
    }

    #[test]
    fn test_identical_is_single_retain() {
        let pair = compute_deltas("hello", "hello");
        assert_eq!(pair.forward.ops, vec![DeltaOp::Retain(5)]);
        assert_eq!(pair.backward.ops, vec![DeltaOp::Retain(5)]);
        assert_eq!(pair.forward.before_hash, pair.forward.after_hash);
        assert!(pair.forward.is_identity());
    }

    #[test]
    fn test_identical_empty() {
        let pair = compute_deltas("", "");
        assert_eq!(pair.forward.ops, vec![DeltaOp::Retain(0)]);
        assert_eq!(apply_delta("", &pair.forward).unwrap(), "");
    }

    #[test]
    fn test_append() {
        let pair = compute_deltas("A", "AB");
        assert_eq!(
            pair.forward.ops,
            vec![DeltaOp::Retain(1), DeltaOp::Insert(String::from("B"))]
        );
        assert_eq!(pair.backward.ops, vec![DeltaOp::Retain(1), DeltaOp::Delete(1)]);
        roundtrip("A", "AB");
    }

    #[test]
    fn test_prepend() {
        let pair = compute_deltas("world", "hello world");
        assert_eq!(
            pair.forward.ops,
            vec![DeltaOp::Insert(String::from("hello ")), DeltaOp::Retain(5)]
        );
        roundtrip("world", "hello world");
    }

    #[test]
    fn test_replace_middle() {
        let pair = compute_deltas("the cat sat", "the dog sat");
        assert_eq!(
            pair.forward.ops,
            vec![
                DeltaOp::Retain(4),
                DeltaOp::Delete(3),
                DeltaOp::Insert(String::from("dog")),
                DeltaOp::Retain(4),
            ]
        );
        assert_eq!(
            pair.backward.ops,
            vec![
                DeltaOp::Retain(4),
                DeltaOp::Delete(3),
                DeltaOp::Insert(String::from("cat")),
                DeltaOp::Retain(4),
            ]
        );
    }

    #[test]
    fn test_delete_everything() {
        let pair = compute_deltas("abc", "");
        assert_eq!(pair.forward.ops, vec![DeltaOp::Delete(3)]);
        assert_eq!(pair.backward.ops, vec![DeltaOp::Insert(String::from("abc"))]);
        roundtrip("abc", "");
    }

    #[test]
    fn test_suffix_does_not_overlap_prefix() {
        // "aa" -> "aaa": prefix covers 2, suffix must be bounded to 0
        let pair = compute_deltas("aa", "aaa");
        assert_eq!(
            pair.forward.ops,
            vec![DeltaOp::Retain(2), DeltaOp::Insert(String::from("a"))]
        );
        roundtrip("aa", "aaa");
        roundtrip("aaa", "aa");
        roundtrip("abab", "ab");
    }

    #[test]
    fn test_hashes_are_swapped_on_backward() {
        let pair = compute_deltas("x", "y");
        assert_eq!(pair.forward.before_hash, hash_content("x"));
        assert_eq!(pair.forward.after_hash, hash_content("y"));
        assert_eq!(pair.backward.before_hash, hash_content("y"));
        assert_eq!(pair.backward.after_hash, hash_content("x"));
    }

    #[test]
    fn test_multibyte_chars() {
        roundtrip("caf\u{e9}", "caf\u{e9}s");
        roundtrip("\u{1F600} smile", "\u{1F601} smile");
        let pair = compute_deltas("\u{e9}a", "\u{e9}b");
        assert_eq!(pair.forward.ops[0], DeltaOp::Retain(1));
    }

    #[test]
    fn test_scattered_edit_collapses_to_one_span() {
        let pair = compute_deltas("a-b-c", "A-b-C");
        assert_eq!(pair.forward.deleted_chars(), 5);
        assert_eq!(pair.forward.inserted_chars(), 5);
        roundtrip("a-b-c", "A-b-C");
    }

    #[test]
    fn test_apply_rejects_wrong_base() {
        let pair = compute_deltas("base", "based");
        let err = apply_delta("other", &pair.forward).unwrap_err();
        assert_eq!(
            err,
            HistoryError::ContentHashMismatch {
                expected: hash_content("base"),
                actual: hash_content("other"),
            }
        );
    }

    #[test]
    fn test_can_apply_delta() {
        let pair = compute_deltas("one", "two");
        assert!(can_apply_delta("one", &pair.forward));
        assert!(!can_apply_delta("two", &pair.forward));
        assert!(can_apply_delta("two", &pair.backward));
    }

    #[test]
    fn test_apply_copies_uncovered_remainder() {
        let delta = ContentDelta {
            ops: vec![DeltaOp::Retain(2), DeltaOp::Insert(String::from("-"))],
            before_hash: hash_content("abcd"),
            after_hash: hash_content("ab-cd"),
        };
        assert_eq!(apply_delta("abcd", &delta).unwrap(), "ab-cd");
    }

    #[test]
    fn test_apply_retain_past_end_is_clamped() {
        let delta = ContentDelta {
            ops: vec![DeltaOp::Retain(99)],
            before_hash: hash_content("ab"),
            after_hash: hash_content("ab"),
        };
        assert_eq!(apply_delta("ab", &delta).unwrap(), "ab");
    }

    #[test]
    fn test_multiline_story_edit() {
        let before = "=== start ===\nHello.\n* [Go] -> next\n";
        let after = "=== start ===\nHello there.\n* [Go] -> next\n";
        let pair = compute_deltas(before, after);
        assert_eq!(pair.forward.inserted_chars(), 6);
        assert_eq!(pair.forward.deleted_chars(), 0);
        roundtrip(before, after);
    }
}
