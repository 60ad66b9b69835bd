//! Sections: the lead and one section per heading.

use std::iter;
use std::ops::Range;

use wikispan_syntax::{ConstructKind, Purpose, sections};

use super::{own_shadow, typed_view};
use crate::discovery::{self, ScopedScan};
use crate::{EditError, WikiText};

typed_view!(
    /// A heading and the text up to the next heading that ends it, or the
    /// lead text before the first heading.
    Section,
    ConstructKind::Section,
    standalone
);

/// Scan the sections of `view` and return the requested ones.
///
/// Only the returned sections are registered, but none the scan still
/// produces is pruned, so asking for deep and then shallow sections (or for
/// one level) does not churn identities.
pub(crate) fn scan_sections(
    view: &WikiText,
    include_subsections: bool,
    level: Option<usize>,
) -> Vec<Section> {
    let Some(span) = view.span() else {
        return Vec::new();
    };
    let (text, shadow, _) = own_shadow(view, Purpose::Sections);
    let scan = sections::scan(&shadow, 0..text.len());
    let shift = |r: &Range<usize>| span.start + r.start..span.start + r.end;

    let chosen = if include_subsections {
        &scan.deep
    } else {
        &scan.shallow
    };
    let picked: Vec<Range<usize>> = match level {
        Some(level) => scan
            .headings
            .iter()
            .zip(chosen)
            .filter(|(heading, _)| heading.level == level)
            .map(|(_, range)| shift(range))
            .collect(),
        None => iter::once(&scan.lead).chain(chosen).map(shift).collect(),
    };
    let valid: Vec<Range<usize>> = scan.all().iter().map(shift).collect();

    let ids = discovery::reconcile_scoped(
        &mut view.document().borrow_mut(),
        &ScopedScan {
            kind: ConstructKind::Section,
            region: span,
            found: &picked,
            valid: &valid,
            foreign: &[],
        },
    );
    ids.into_iter()
        .map(|id| Section::from_view(view.sibling(id)))
        .collect()
}

impl Section {
    fn parts(&self) -> (String, sections::SectionParts) {
        let (text, shadow, _) = own_shadow(self, Purpose::Sections);
        let parts = sections::parse(&shadow);
        (text, parts)
    }

    /// The heading level; 0 for a lead section.
    pub fn level(&self) -> usize {
        self.parts().1.level
    }

    /// The heading text between the `=` runs, `None` for a lead section.
    pub fn title(&self) -> Option<String> {
        let (text, parts) = self.parts();
        parts.title.map(|range| text[range].to_owned())
    }

    pub fn set_title(&self, title: &str) -> Result<(), EditError> {
        match self.parts().1.title {
            Some(range) => self.splice_local(range, title),
            None => Err(EditError::NoHeading),
        }
    }

    /// Everything after the heading line.
    pub fn contents(&self) -> String {
        let (text, parts) = self.parts();
        text[parts.contents].to_owned()
    }

    pub fn set_contents(&self, contents: &str) -> Result<(), EditError> {
        self.splice_local(self.parts().1.contents, contents)
    }
}
