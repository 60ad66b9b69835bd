//! Lists: runs of lines starting with `*`, `#`, `:` or `;`.

use std::ops::Range;

/// The marker group of a line's first character, if it starts a list line.
fn group(line: &str) -> Option<u8> {
    match line.as_bytes().first()? {
        b'*' => Some(0),
        b'#' => Some(1),
        b':' | b';' => Some(2),
        _ => None,
    }
}

fn is_marker(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b':' | b';')
}

/// All lists in `region` of a shadow in which comments, templates and tag
/// markup are masked (so their line breaks do not end an item).
///
/// A list runs over consecutive lines of the same marker group and does not
/// include the final line break.
pub fn scan(shadow: &str, region: Range<usize>) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut current: Option<(u8, Range<usize>)> = None;
    let mut pos = region.start;
    while pos < region.end {
        let line_end = shadow[pos..region.end]
            .find('\n')
            .map_or(region.end, |i| pos + i);
        let line_group = group(&shadow[pos..line_end]);
        current = match (current.take(), line_group) {
            (Some((g, range)), Some(lg)) if g == lg => Some((g, range.start..line_end)),
            (previous, next) => {
                if let Some((_, range)) = previous {
                    found.push(range);
                }
                next.map(|g| (g, pos..line_end))
            }
        };
        pos = line_end + 1;
    }
    if let Some((_, range)) = current {
        found.push(range);
    }
    found
}

/// The first-level items of one list's own text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListParts {
    /// Item text without its marker.
    pub items: Vec<Range<usize>>,
    /// Item text with its marker.
    pub fullitems: Vec<Range<usize>>,
}

pub fn parse(shadow: &str) -> ListParts {
    let mut parts = ListParts::default();
    let mut pos = 0;
    while pos <= shadow.len() {
        let line_end = shadow[pos..].find('\n').map_or(shadow.len(), |i| pos + i);
        let line = &shadow.as_bytes()[pos..line_end];
        let depth = line.iter().take_while(|b| is_marker(**b)).count();
        if depth == 1 {
            let body = pos + 1..line_end;
            let colon = (line[0] == b';')
                .then(|| shadow[body.clone()].find(':'))
                .flatten();
            match colon {
                Some(c) => {
                    let c = body.start + c;
                    parts.items.push(body.start..c);
                    parts.fullitems.push(pos..c);
                    parts.items.push(c + 1..line_end);
                    parts.fullitems.push(c..line_end);
                }
                None => {
                    parts.items.push(body);
                    parts.fullitems.push(pos..line_end);
                }
            }
        }
        pos = line_end + 1;
    }
    parts
}
