//! Sequence-style addressing of a view's text.
//!
//! Offsets are bytes relative to the view. Negative offsets count from the
//! end. Writes resolve strictly ([`TextRange::resolve`]); reads clamp like
//! slicing ([`TextRange::resolve_lenient`]).

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::EditError;

/// Something that addresses a part of a view's text.
pub trait TextRange {
    /// The byte range addressed in `text`, or an error if an endpoint is out
    /// of bounds or inside a character.
    fn resolve(&self, text: &str) -> Result<Range<usize>, EditError>;

    /// The byte range addressed in `text`, clamped to it.
    fn resolve_lenient(&self, text: &str) -> Range<usize>;
}

/// Resolve one slice endpoint, valid in `-len..=len`.
fn endpoint(index: isize, len: usize) -> Result<usize, EditError> {
    let wrapped = if index < 0 {
        len as isize + index
    } else {
        index
    };
    if wrapped < 0 || wrapped as usize > len {
        return Err(EditError::OutOfRange { index, len });
    }
    Ok(wrapped as usize)
}

fn clamp_endpoint(index: isize, len: usize) -> usize {
    let wrapped = if index < 0 {
        len as isize + index
    } else {
        index
    };
    wrapped.clamp(0, len as isize) as usize
}

fn check_boundary(text: &str, offset: usize) -> Result<usize, EditError> {
    if text.is_char_boundary(offset) {
        Ok(offset)
    } else {
        Err(EditError::NotCharBoundary { offset })
    }
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Resolve a strict slice. A start after the stop addresses the empty range
/// at the start.
fn resolve_slice(text: &str, start: isize, stop: isize) -> Result<Range<usize>, EditError> {
    let start = check_boundary(text, endpoint(start, text.len())?)?;
    let stop = check_boundary(text, endpoint(stop, text.len())?)?;
    Ok(start..stop.max(start))
}

fn clamp_slice(text: &str, start: isize, stop: isize) -> Range<usize> {
    let start = floor_boundary(text, clamp_endpoint(start, text.len()));
    let stop = floor_boundary(text, clamp_endpoint(stop, text.len()));
    start..stop.max(start)
}

/// A single index addresses the character starting at it.
impl TextRange for isize {
    fn resolve(&self, text: &str) -> Result<Range<usize>, EditError> {
        let len = text.len();
        let wrapped = if *self < 0 { len as isize + self } else { *self };
        if wrapped < 0 || wrapped as usize >= len {
            return Err(EditError::OutOfRange { index: *self, len });
        }
        let start = check_boundary(text, wrapped as usize)?;
        let width = text[start..].chars().next().map_or(0, char::len_utf8);
        Ok(start..start + width)
    }

    fn resolve_lenient(&self, text: &str) -> Range<usize> {
        self.resolve(text).unwrap_or(0..0)
    }
}

impl TextRange for Range<isize> {
    fn resolve(&self, text: &str) -> Result<Range<usize>, EditError> {
        resolve_slice(text, self.start, self.end)
    }

    fn resolve_lenient(&self, text: &str) -> Range<usize> {
        clamp_slice(text, self.start, self.end)
    }
}

impl TextRange for RangeFrom<isize> {
    fn resolve(&self, text: &str) -> Result<Range<usize>, EditError> {
        resolve_slice(text, self.start, text.len() as isize)
    }

    fn resolve_lenient(&self, text: &str) -> Range<usize> {
        clamp_slice(text, self.start, text.len() as isize)
    }
}

impl TextRange for RangeTo<isize> {
    fn resolve(&self, text: &str) -> Result<Range<usize>, EditError> {
        resolve_slice(text, 0, self.end)
    }

    fn resolve_lenient(&self, text: &str) -> Range<usize> {
        clamp_slice(text, 0, self.end)
    }
}

impl TextRange for RangeFull {
    fn resolve(&self, text: &str) -> Result<Range<usize>, EditError> {
        Ok(0..text.len())
    }

    fn resolve_lenient(&self, text: &str) -> Range<usize> {
        0..text.len()
    }
}

/// Clamp an insertion point: past the end appends, before the start prepends.
pub(crate) fn insertion_point(text: &str, index: isize) -> Result<usize, EditError> {
    check_boundary(text, clamp_endpoint(index, text.len()))
}
