//! Tables (`{| ... |}`) and their cell layout.
//!
//! Discovery is line based: a table opens at a `{|` that is preceded on its
//! line only by whitespace and `:` indentation, and closes at the next `|}`
//! that starts a line. Nested tables close first.
//!
//! [`layout`] follows the MediaWiki table rules for a single table's own
//! text: `|+` caption, `|-` row separators, `|` and `!` cell lines split on
//! `||` (header lines also on `!!`), a single `|` separating attributes from
//! the cell value, and continuation lines extending the previous cell.

use std::ops::Range;

/// Iterate `(start, end)` of each line, `end` excluding the line break.
fn lines(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        if pos > text.len() {
            return None;
        }
        let start = pos;
        let end = text[start..].find('\n').map_or(text.len(), |i| start + i);
        pos = end + 1;
        Some((start, end))
    })
}

/// All tables in a shadow (comments blanked, opaque tag bodies hidden),
/// sorted outer-first.
pub fn scan(shadow: &str) -> Vec<Range<usize>> {
    let mut open: Vec<usize> = Vec::new();
    let mut found = Vec::new();
    for (start, end) in lines(shadow) {
        let line = &shadow[start..end];
        let indented = line.trim_start_matches([' ', '\t', ':']);
        if indented.starts_with("{|") {
            open.push(end - indented.len());
            continue;
        }
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.starts_with("|}")
            && let Some(table_start) = open.pop()
        {
            let close = end - trimmed.len();
            found.push(table_start..close + 2);
        }
    }
    crate::kind::sort_outer_first(&mut found);
    found
}

/// Whether every table line of `shadow` has its partner inside it, so the
/// tables found there are the same inside a longer text.
pub fn is_self_contained(shadow: &str) -> bool {
    let mut depth = 0usize;
    for (start, end) in lines(shadow) {
        let line = &shadow[start..end];
        if line.trim_start_matches([' ', '\t', ':']).starts_with("{|") {
            depth += 1;
        } else if line.trim_start_matches([' ', '\t']).starts_with("|}") {
            let Some(rest) = depth.checked_sub(1) else {
                return false;
            };
            depth = rest;
        }
    }
    depth == 0
}

/// One cell of a table, relative to the table's own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLayout {
    /// From the cell's delimiter (including a leading line break) to its end.
    pub range: Range<usize>,
    pub header: bool,
    pub attrs: Option<Range<usize>>,
    pub value: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLayout {
    pub range: Range<usize>,
    pub attrs: Option<Range<usize>>,
    pub value: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableLayout {
    /// Attribute text on the opening `{|` line.
    pub attrs: Range<usize>,
    /// End of the opening line (where a new caption would be inserted).
    pub head_end: usize,
    pub caption: Option<CaptionLayout>,
    pub rows: Vec<Vec<CellLayout>>,
}

impl TableLayout {
    pub fn cells(&self) -> impl Iterator<Item = &CellLayout> {
        self.rows.iter().flatten()
    }
}

#[derive(PartialEq)]
enum Extending {
    Nothing,
    Caption,
    Cell,
}

/// Split a value segment at its first `|` into attributes and value.
fn split_attrs(shadow: &str, segment: Range<usize>) -> (Option<Range<usize>>, Range<usize>) {
    match shadow[segment.clone()].find('|') {
        Some(i) => (
            Some(segment.start..segment.start + i),
            segment.start + i + 1..segment.end,
        ),
        None => (None, segment),
    }
}

/// Lay out a table's own text, shadowed with [`crate::Purpose::Parts`].
pub fn layout(shadow: &str) -> TableLayout {
    let mut table = TableLayout::default();
    let mut lines = lines(shadow);
    let Some((first_start, first_end)) = lines.next() else {
        return table;
    };
    let attrs_start = shadow[first_start..first_end]
        .find("{|")
        .map_or(first_start, |i| first_start + i + 2);
    table.attrs = attrs_start.min(first_end)..first_end;
    table.head_end = first_end;

    let mut rows: Vec<Vec<CellLayout>> = Vec::new();
    let mut current: Vec<CellLayout> = Vec::new();
    let mut extending = Extending::Nothing;

    for (start, end) in lines {
        let line = &shadow[start..end];
        let rest = line.trim_start_matches([' ', '\t']);
        let marker = end - rest.len();
        // Every line after the first follows a line break.
        let line_break = start - 1;

        if rest.starts_with("|}") {
            break;
        } else if rest.starts_with("|+") {
            if table.caption.is_none() && rows.is_empty() && current.is_empty() {
                let (attrs, value) = split_attrs(shadow, marker + 2..end);
                table.caption = Some(CaptionLayout {
                    range: line_break..end,
                    attrs,
                    value,
                });
                extending = Extending::Caption;
            } else {
                extending = Extending::Nothing;
            }
        } else if rest.starts_with("|-") {
            if !current.is_empty() {
                rows.push(std::mem::take(&mut current));
            }
            extending = Extending::Nothing;
        } else if rest.starts_with('|') || rest.starts_with('!') {
            let header = rest.starts_with('!');
            let content = marker + 1..end;
            let work = if header {
                shadow[content.clone()].replace("!!", "||")
            } else {
                shadow[content.clone()].to_owned()
            };
            let shift = |r: Range<usize>| content.start + r.start..content.start + r.end;
            let mut segment_start = 0;
            let mut cell_start = line_break;
            loop {
                let sep = work[segment_start..].find("||").map(|i| segment_start + i);
                let segment_end = sep.unwrap_or(work.len());
                let (attrs, value) = split_attrs(&work, segment_start..segment_end);
                current.push(CellLayout {
                    range: cell_start..content.start + segment_end,
                    header,
                    attrs: attrs.map(shift),
                    value: shift(value),
                });
                match sep {
                    Some(sep) => {
                        cell_start = content.start + sep;
                        segment_start = sep + 2;
                    }
                    None => break,
                }
            }
            extending = Extending::Cell;
        } else {
            match extending {
                Extending::Cell => {
                    if let Some(cell) = current.last_mut() {
                        cell.range.end = end;
                        cell.value.end = end;
                    }
                }
                Extending::Caption => {
                    if let Some(caption) = table.caption.as_mut() {
                        caption.range.end = end;
                        caption.value.end = end;
                    }
                }
                Extending::Nothing => {}
            }
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }
    table.rows = rows;
    table
}
