//! Sections and their headings.

use std::ops::Range;

/// A heading line, in absolute offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// The heading line, including its line break if any.
    pub line: Range<usize>,
    pub level: usize,
    pub title: Range<usize>,
}

/// Parse one line (without its line break) as a heading.
fn heading(line: &str) -> Option<(usize, Range<usize>)> {
    let trimmed = line.trim_end_matches([' ', '\t']);
    if !trimmed.starts_with('=') || !trimmed.ends_with('=') {
        return None;
    }
    let lead = trimmed.len() - trimmed.trim_start_matches('=').len();
    let trail = trimmed.len() - trimmed.trim_end_matches('=').len();
    let level = if lead == trimmed.len() {
        // A line of only `=`: the middle ones are the title.
        if trimmed.len() < 3 {
            return None;
        }
        (trimmed.len() - 1) / 2
    } else {
        lead.min(trail)
    };
    let level = level.min(6);
    Some((level, level..trimmed.len() - level))
}

/// The sections of one region of a shadow (comments blanked).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionScan {
    pub headings: Vec<Heading>,
    /// From the region start to the first heading.
    pub lead: Range<usize>,
    /// Each heading up to the next heading of the same or a higher level.
    pub deep: Vec<Range<usize>>,
    /// Each heading up to the next heading of any level.
    pub shallow: Vec<Range<usize>>,
}

impl SectionScan {
    /// Every distinct range this scan produced, lead first.
    pub fn all(&self) -> Vec<Range<usize>> {
        let mut all = vec![self.lead.clone()];
        for range in self.deep.iter().chain(&self.shallow) {
            if !all.contains(range) {
                all.push(range.clone());
            }
        }
        all
    }
}

pub fn scan(shadow: &str, region: Range<usize>) -> SectionScan {
    let mut headings = Vec::new();
    let mut pos = region.start;
    while pos < region.end {
        let line_end = shadow[pos..region.end]
            .find('\n')
            .map_or(region.end, |i| pos + i);
        if let Some((level, title)) = heading(&shadow[pos..line_end]) {
            headings.push(Heading {
                line: pos..(line_end + 1).min(region.end),
                level,
                title: pos + title.start..pos + title.end,
            });
        }
        pos = line_end + 1;
    }

    let lead = region.start..headings.first().map_or(region.end, |h| h.line.start);
    let mut deep = Vec::with_capacity(headings.len());
    let mut shallow = Vec::with_capacity(headings.len());
    for (i, h) in headings.iter().enumerate() {
        let next = headings.get(i + 1).map_or(region.end, |n| n.line.start);
        shallow.push(h.line.start..next);
        let end = headings[i + 1..]
            .iter()
            .find(|n| n.level <= h.level)
            .map_or(region.end, |n| n.line.start);
        deep.push(h.line.start..end);
    }
    SectionScan {
        headings,
        lead,
        deep,
        shallow,
    }
}

/// The parts of one section's own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionParts {
    /// 0 for a lead section.
    pub level: usize,
    pub title: Option<Range<usize>>,
    /// Everything after the heading line.
    pub contents: Range<usize>,
}

pub fn parse(shadow: &str) -> SectionParts {
    let line_end = shadow.find('\n').unwrap_or(shadow.len());
    match heading(&shadow[..line_end]) {
        Some((level, title)) => SectionParts {
            level,
            title: Some(title),
            contents: (line_end + 1).min(shadow.len())..shadow.len(),
        },
        None => SectionParts {
            level: 0,
            title: None,
            contents: 0..shadow.len(),
        },
    }
}
