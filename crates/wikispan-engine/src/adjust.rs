//! How a single edit moves the spans around it.
//!
//! An edit replaces the byte range `removed` with `inserted` bytes. Every
//! registered span is either kept (possibly moved or resized) or removed,
//! and the dirty ranges of the discovery stages are carried along.

use std::ops::Range;

/// One replacement in the buffer, in pre-edit offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub(crate) removed: Range<usize>,
    pub(crate) inserted: usize,
}

impl Edit {
    pub(crate) fn new(removed: Range<usize>, inserted: usize) -> Self {
        Self { removed, inserted }
    }

    pub(crate) fn is_insertion(&self) -> bool {
        self.removed.is_empty()
    }

    /// Move an offset at or after the removed range.
    fn shift(&self, offset: usize) -> usize {
        offset - self.removed.len() + self.inserted
    }

    /// The inserted text, in post-edit offsets.
    pub(crate) fn inserted_range(&self) -> Range<usize> {
        self.removed.start..self.removed.start + self.inserted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Adjusted {
    Kept(Range<usize>),
    Removed,
}

/// Adjust one span for an edit.
///
/// `owns_edit` is true when the span is the view the edit was made through
/// or one of its ancestors; only those grow when text is inserted exactly at
/// one of their boundaries.
pub(crate) fn adjust(span: Range<usize>, edit: &Edit, owns_edit: bool) -> Adjusted {
    let (s, e) = (span.start, span.end);
    let (a, b) = (edit.removed.start, edit.removed.end);
    let n = edit.inserted;

    if edit.is_insertion() {
        let p = a;
        let kept = if s < p && p < e {
            s..e + n
        } else if (s == p || e == p) && owns_edit {
            s..e + n
        } else if s >= p {
            s + n..e + n
        } else {
            span
        };
        return Adjusted::Kept(kept);
    }

    if e <= a {
        Adjusted::Kept(span)
    } else if s >= b {
        Adjusted::Kept(edit.shift(s)..edit.shift(e))
    } else if s == a && e == b {
        if n == 0 {
            Adjusted::Removed
        } else {
            Adjusted::Kept(s..s + n)
        }
    } else if s <= a && b <= e {
        Adjusted::Kept(s..edit.shift(e))
    } else {
        // Inside the removed range, or crossing one of its ends.
        Adjusted::Removed
    }
}

/// Carry a dirty range through an edit. Offsets inside the removed range
/// collapse onto the inserted text.
pub(crate) fn map_dirty(range: Range<usize>, edit: &Edit) -> Range<usize> {
    let (a, b) = (edit.removed.start, edit.removed.end);
    let map = |offset: usize, inside: usize| {
        if offset <= a {
            offset
        } else if offset >= b {
            edit.shift(offset)
        } else {
            inside
        }
    };
    let start = map(range.start, a);
    let end = map(range.end, a + edit.inserted).max(start);
    start..end
}

/// Sort and merge overlapping or touching ranges.
pub(crate) fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kept(range: Range<usize>) -> Adjusted {
        Adjusted::Kept(range)
    }

    #[rstest]
    // Before the edit.
    #[case(0..2, 3..5, 1, kept(0..2))]
    #[case(0..3, 3..5, 1, kept(0..3))]
    // After the edit.
    #[case(5..8, 3..5, 1, kept(4..7))]
    #[case(6..8, 3..5, 4, kept(8..10))]
    // Containing the edit.
    #[case(0..10, 3..5, 0, kept(0..8))]
    #[case(3..10, 3..5, 0, kept(3..8))]
    #[case(0..5, 3..5, 3, kept(0..6))]
    // Exactly the edit.
    #[case(3..5, 3..5, 1, kept(3..4))]
    #[case(3..5, 3..5, 0, Adjusted::Removed)]
    // Inside the edit.
    #[case(4..5, 3..5, 1, Adjusted::Removed)]
    #[case(3..4, 3..5, 7, Adjusted::Removed)]
    // Crossing an end of the edit.
    #[case(1..4, 3..5, 1, Adjusted::Removed)]
    #[case(4..8, 3..5, 1, Adjusted::Removed)]
    #[case(3..8, 3..9, 1, Adjusted::Removed)]
    fn removal_rules(
        #[case] span: Range<usize>,
        #[case] removed: Range<usize>,
        #[case] inserted: usize,
        #[case] expected: Adjusted,
    ) {
        assert_eq!(adjust(span, &Edit::new(removed, inserted), false), expected);
    }

    #[rstest]
    #[case(0..4, 2, false, 0..7)]
    #[case(0..2, 2, false, 0..2)]
    #[case(0..2, 2, true, 0..5)]
    #[case(2..4, 2, false, 5..7)]
    #[case(2..4, 2, true, 2..7)]
    #[case(2..2, 2, false, 5..5)]
    #[case(2..2, 2, true, 2..5)]
    #[case(4..6, 2, true, 7..9)]
    fn insertion_rules(
        #[case] span: Range<usize>,
        #[case] at: usize,
        #[case] owns_edit: bool,
        #[case] expected: Range<usize>,
    ) {
        assert_eq!(
            adjust(span, &Edit::new(at..at, 3), owns_edit),
            kept(expected)
        );
    }

    #[rstest]
    #[case(0..2, 5..6, 2, 0..2)]
    #[case(8..9, 5..6, 2, 9..10)]
    #[case(0..10, 5..6, 2, 0..11)]
    #[case(5..6, 5..6, 0, 5..5)]
    #[case(4..6, 5..8, 0, 4..5)]
    #[case(6..7, 2..2, 3, 9..10)]
    fn dirty_ranges_follow_edits(
        #[case] range: Range<usize>,
        #[case] removed: Range<usize>,
        #[case] inserted: usize,
        #[case] expected: Range<usize>,
    ) {
        assert_eq!(map_dirty(range, &Edit::new(removed, inserted)), expected);
    }

    #[test]
    fn merging_ranges() {
        assert_eq!(
            merge_ranges(vec![5..6, 0..2, 1..3, 6..9, 12..12]),
            vec![0..3, 5..9, 12..12]
        );
    }
}
