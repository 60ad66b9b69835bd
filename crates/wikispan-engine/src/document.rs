//! The document root: one buffer, one span table, one discovery record.
//!
//! Every view of a document holds an `Rc<RefCell<Document>>` plus its own
//! [`SpanId`]. Views are cheap handles; all state lives here.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use log::{debug, trace};
use wikispan_syntax::tag::DEFAULT_OPAQUE_TAGS;
use wikispan_syntax::{ConstructKind, OpaqueTags};

use crate::EditError;
use crate::adjust::{self, Edit};
use crate::buffer::Buffer;
use crate::discovery::{self, Discovery};
use crate::span::{SpanId, SpanTable};

/// Construction-time parse options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Tag names whose contents are opaque to every other construct. Names
    /// missing here are still taken from the built-in set.
    pub opaque_tags: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            opaque_tags: DEFAULT_OPAQUE_TAGS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl ParseOptions {
    /// The built-in opaque tags plus `extra`.
    pub fn with_extra_opaque_tags<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        for name in extra {
            let name = name.into();
            if !options.opaque_tags.contains(&name) {
                options.opaque_tags.push(name);
            }
        }
        options
    }
}

pub(crate) type SharedDocument = Rc<RefCell<Document>>;

pub(crate) struct Document {
    pub(crate) buffer: Buffer,
    pub(crate) spans: SpanTable,
    pub(crate) discovery: Discovery,
    pub(crate) opaque: OpaqueTags,
}

impl Document {
    pub(crate) fn new(text: &str, root_kind: Option<ConstructKind>, options: &ParseOptions) -> Self {
        let buffer = Buffer::new(text);
        let spans = SpanTable::new(root_kind, buffer.len());
        Self {
            spans,
            discovery: Discovery::default(),
            buffer,
            opaque: OpaqueTags::with_extra(&options.opaque_tags),
        }
    }

    pub(crate) fn shared(text: &str, root_kind: Option<ConstructKind>, options: &ParseOptions) -> SharedDocument {
        Rc::new(RefCell::new(Self::new(text, root_kind, options)))
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// The current text of a span; empty once detached.
    pub(crate) fn text_of(&self, id: SpanId) -> String {
        self.spans
            .range(id)
            .map(|range| self.buffer.slice(range).into_owned())
            .unwrap_or_default()
    }

    pub(crate) fn range_of(&self, id: SpanId) -> Result<Range<usize>, EditError> {
        self.spans.range(id).ok_or(EditError::Detached)
    }

    /// Replace the absolute `range` with `text` on behalf of the view `owner`.
    pub(crate) fn splice(&mut self, owner: SpanId, range: Range<usize>, text: &str) -> Result<(), EditError> {
        self.range_of(owner)?;
        let len = self.buffer.len();
        if range.start > range.end || range.end > len {
            return Err(EditError::OutOfRange {
                index: range.end as isize,
                len,
            });
        }
        for offset in [range.start, range.end] {
            if !self.buffer.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        if range.is_empty() && text.is_empty() {
            return Ok(());
        }

        trace!("splice {:?} with {} bytes", range, text.len());
        let edit = Edit::new(range, text.len());
        self.buffer.splice(edit.removed.clone(), text);
        let removed = self.spans.apply_edit(&edit, owner, self.buffer.len());
        if !removed.is_empty() {
            debug!("edit at {:?} invalidated {} spans", edit.removed, removed.len());
        }
        self.discovery.record_edit(&edit);
        for (_, old_range) in removed {
            // Whatever a removed construct covered may now parse differently.
            self.discovery
                .mark_all_dirty(adjust::map_dirty(old_range, &edit));
        }
        Ok(())
    }

    /// Make sure every span of a globally discovered kind is up to date.
    pub(crate) fn ensure(&mut self, kind: ConstructKind) {
        discovery::ensure(self, kind);
    }

    /// Bring every globally discovered kind up to date.
    pub(crate) fn ensure_all(&mut self) {
        for kind in ConstructKind::GLOBAL {
            discovery::ensure(self, kind);
        }
    }

    /// Globally discovered spans that contain `id`, innermost first.
    pub(crate) fn ancestors_of(&mut self, id: SpanId) -> Vec<SpanId> {
        if self.spans.is_root(id) {
            return Vec::new();
        }
        let Some(range) = self.spans.range(id) else {
            return Vec::new();
        };
        self.ensure_all();
        let mut containing: Vec<(SpanId, Range<usize>)> = self
            .spans
            .containing(&range)
            .into_iter()
            .filter(|(other, _)| {
                *other != id && other.kind().is_some_and(|kind| ConstructKind::GLOBAL.contains(&kind))
            })
            .collect();
        containing.sort_by(|(_, a), (_, b)| a.len().cmp(&b.len()).then(b.start.cmp(&a.start)));
        containing.into_iter().map(|(other, _)| other).collect()
    }
}
