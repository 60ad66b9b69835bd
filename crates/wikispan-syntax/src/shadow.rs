//! Shadow copies of text with opaque regions blanked out.
//!
//! Recognizers never see the inside of constructs that hide their contents
//! from the rest of the markup (comments, `<nowiki>` bodies, nested templates
//! when splitting arguments, ...). Instead of threading "skip this range"
//! logic through every scanner, callers build a *shadow*: a same-length copy
//! of the text where each masked byte is replaced by an ASCII filler. Offsets
//! into the shadow are offsets into the original.
//!
//! [`Layers`] bundles the opaque constructs of a piece of text and knows which
//! of them each recognizer must be blind to.

use std::ops::Range;

use crate::brackets;
use crate::comment;
use crate::kind::{ConstructKind, Found};
use crate::tables;
use crate::tag::{self, OpaqueTags, TagMatch};

/// How a masked range is overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Spaces. Keeps line-start checks working across the masked range.
    Blank,
    /// Underscores. Keeps the masked range glued to its neighbours.
    Opaque,
}

impl Fill {
    fn byte(self) -> u8 {
        match self {
            Fill::Blank => b' ',
            Fill::Opaque => b'_',
        }
    }
}

/// Build a shadow of `text`: every byte inside a mask is replaced by its fill.
///
/// Mask ranges are widened to character boundaries so the result is always
/// valid UTF-8 of the same byte length.
pub fn shadow(text: &str, masks: &[(Range<usize>, Fill)]) -> String {
    if masks.is_empty() {
        return text.to_owned();
    }
    let mut bytes = text.as_bytes().to_vec();
    for (range, fill) in masks {
        let mut start = range.start.min(text.len());
        let mut end = range.end.min(text.len());
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }
        while end < text.len() && !text.is_char_boundary(end) {
            end += 1;
        }
        bytes[start..end].fill(fill.byte());
    }
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

/// `text` without an `open`-byte prefix and a `close`-byte suffix, narrowed
/// to character boundaries. Empty when the delimiters overlap.
pub fn inner_range(text: &str, open: usize, close: usize) -> Range<usize> {
    let mut start = open.min(text.len());
    while !text.is_char_boundary(start) {
        start += 1;
    }
    let mut end = text.len().saturating_sub(close);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    start..end.max(start)
}

/// What a shadow is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Tags,
    Brackets,
    ExternalLinks,
    Tables,
    Sections,
    Lists,
    /// Splitting a construct's own text into parts (names, arguments, cells).
    Parts,
}

/// The opaque constructs of one piece of text, in offsets relative to it.
#[derive(Debug, Clone, Default)]
pub struct Layers {
    pub comments: Vec<Range<usize>>,
    pub tags: Vec<TagMatch>,
    pub brackets: Vec<Found>,
    pub tables: Vec<Range<usize>>,
}

impl Layers {
    /// Recognize every opaque layer of a standalone text.
    pub fn scan(text: &str, opaque: &OpaqueTags) -> Self {
        let mut layers = Layers {
            comments: comment::scan(text),
            ..Layers::default()
        };
        layers.tags = tag::scan(&layers.shadow(text, Purpose::Tags), opaque);
        layers.brackets = brackets::scan(&layers.shadow(text, Purpose::Brackets));
        layers.tables = tables::scan(&layers.shadow(text, Purpose::Tables));
        layers
    }

    /// Build the shadow of `text` a recognizer for `purpose` runs on.
    ///
    /// Bracket constructs and tables that cover the whole text are the
    /// construct being taken apart, so they are never masked.
    pub fn shadow(&self, text: &str, purpose: Purpose) -> String {
        let whole = 0..text.len();
        let mut masks: Vec<(Range<usize>, Fill)> = Vec::new();

        let comment_fill = match purpose {
            Purpose::ExternalLinks | Purpose::Lists => Fill::Opaque,
            _ => Fill::Blank,
        };
        masks.extend(self.comments.iter().map(|r| (r.clone(), comment_fill)));
        if purpose == Purpose::Tags {
            return shadow(text, &masks);
        }

        for tag in &self.tags {
            match purpose {
                Purpose::Parts if tag.is_extension() && tag.range != whole => {
                    masks.push((tag.range.clone(), Fill::Opaque));
                }
                Purpose::Lists => {
                    masks.push((tag.start_tag.clone(), Fill::Opaque));
                    if let Some(end_tag) = &tag.end_tag {
                        masks.push((end_tag.clone(), Fill::Opaque));
                    }
                }
                _ => {}
            }
            if tag.opaque
                && let Some(body) = tag.body()
            {
                masks.push((body, Fill::Opaque));
            }
        }

        match purpose {
            Purpose::Lists => {
                masks.extend(
                    self.brackets
                        .iter()
                        .filter(|found| found.range != whole)
                        .map(|found| (found.range.clone(), Fill::Opaque)),
                );
            }
            Purpose::Parts => {
                masks.extend(
                    self.brackets
                        .iter()
                        .filter(|found| found.range != whole)
                        .map(|found| (found.range.clone(), Fill::Opaque)),
                );
                masks.extend(
                    self.tables
                        .iter()
                        .filter(|range| **range != whole)
                        .map(|range| (range.clone(), Fill::Opaque)),
                );
            }
            _ => {}
        }
        shadow(text, &masks)
    }

    /// Bracket constructs of one kind.
    pub fn brackets_of(&self, kind: ConstructKind) -> impl Iterator<Item = &Range<usize>> {
        self.brackets
            .iter()
            .filter(move |found| found.kind == kind)
            .map(|found| &found.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shadow_keeps_length_and_offsets() {
        let text = "a<!--x-->b";
        let out = shadow(text, &[(1..9, Fill::Blank)]);
        assert_eq!(out, "a        b");
        assert_eq!(out.len(), text.len());
    }

    #[test]
    fn shadow_widens_to_char_boundaries() {
        let text = "xéy";
        // 'é' is two bytes; a mask covering half of it covers all of it
        let out = shadow(text, &[(1..2, Fill::Opaque)]);
        assert_eq!(out, "x__y");
    }

    #[test]
    fn inner_range_stays_on_char_boundaries() {
        assert_eq!(inner_range("{{a}}", 2, 2), 2..3);
        assert_eq!(inner_range("Zürich", 2, 2), 3..5);
        assert_eq!(inner_range("aé", 2, 2), 3..3);
        assert_eq!(inner_range("ü", 1, 0), 2..2);
        assert_eq!(inner_range("", 2, 2), 0..0);
    }

    #[test]
    fn parts_shadow_hides_nested_brackets_only() {
        let text = "{{a|{{b|c}}|d}}";
        let layers = Layers::scan(text, &OpaqueTags::default());
        assert_eq!(layers.shadow(text, Purpose::Parts), "{{a|_______|d}}");
    }

    #[test]
    fn opaque_tag_bodies_are_hidden_from_brackets() {
        let text = "<nowiki>{{a}}</nowiki>{{b}}";
        let layers = Layers::scan(text, &OpaqueTags::default());
        let templates: Vec<_> = layers.brackets_of(ConstructKind::Template).collect();
        assert_eq!(templates, vec![&(22..27)]);
    }
}
