//! The shared text buffer every view of a document reads from and writes to.

use std::borrow::Cow;
use std::ops::Range;

use xi_rope::{LinesMetric, Rope};
use xi_rope::delta::Builder;

/// xi-rope buffer holding the whole document as UTF-8.
#[derive(Clone)]
pub(crate) struct Buffer {
    rope: Rope,
}

impl Buffer {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rope.len()
    }

    pub(crate) fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Read a range, clamped to the buffer.
    pub(crate) fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let len = self.rope.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.rope.slice_to_cow(start..end)
    }

    pub(crate) fn is_char_boundary(&self, offset: usize) -> bool {
        match offset.cmp(&self.rope.len()) {
            std::cmp::Ordering::Less => self.rope.byte_at(offset) & 0xC0 != 0x80,
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Greater => false,
        }
    }

    /// Offset of the start of the line holding `offset`.
    pub(crate) fn line_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len());
        self.rope.offset_of_line(self.rope.line_of_offset(offset))
    }

    /// Offset of the newline ending the line holding `offset`, or the end of
    /// the buffer on the last line.
    pub(crate) fn line_end(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len());
        let line = self.rope.line_of_offset(offset);
        if line == self.rope.measure::<LinesMetric>() {
            self.rope.len()
        } else {
            self.rope.offset_of_line(line + 1) - 1
        }
    }

    /// Replace `range` with `text`.
    pub(crate) fn splice(&mut self, range: Range<usize>, text: &str) {
        let mut builder = Builder::new(self.rope.len());
        if text.is_empty() {
            builder.delete(range);
        } else {
            builder.replace(range, Rope::from(text));
        }
        self.rope = builder.build().apply(&self.rope);
    }
}
