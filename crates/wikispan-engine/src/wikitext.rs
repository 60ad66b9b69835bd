//! [`WikiText`]: the base view every construct view derefs to.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use wikispan_syntax::{ConstructKind, Found, Layers, OpaqueTags, SyntaxNode, build_tree};

use crate::EditError;
use crate::document::{Document, ParseOptions, SharedDocument};
use crate::range::{TextRange, insertion_point};
use crate::span::SpanId;
use crate::views::{
    Argument, Comment, ExternalLink, Parameter, ParserFunction, Section, Table, Tag,
    Template, WikiLink, WikiList, lists, sections, template,
};

/// A handle on one span of a shared document.
///
/// Cloning a view clones the handle, not the text: every clone, and every
/// other view taken from the same document, reads and edits the same buffer.
/// Two views are equal when they are the same construct of the same
/// document.
#[derive(Clone)]
pub struct WikiText {
    doc: SharedDocument,
    id: SpanId,
}

impl PartialEq for WikiText {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc) && self.id == other.id
    }
}

impl Eq for WikiText {}

impl fmt::Debug for WikiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().map_or("WikiText", |k| k.name());
        write!(f, "{kind}({:?})", self.text())
    }
}

impl fmt::Display for WikiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl WikiText {
    /// Parse `text` into a new, independent document.
    pub fn new(text: &str) -> Self {
        Self::with_options(text, &ParseOptions::default())
    }

    pub fn with_options(text: &str, options: &ParseOptions) -> Self {
        let doc = Document::shared(text, None, options);
        let id = doc.borrow().spans.root();
        Self { doc, id }
    }

    /// A new document whose root span is registered as `kind`.
    pub(crate) fn typed_root(text: &str, kind: ConstructKind, options: &ParseOptions) -> Self {
        let doc = Document::shared(text, Some(kind), options);
        let id = doc.borrow().spans.root();
        Self { doc, id }
    }

    /// Another view of the same document.
    pub(crate) fn sibling(&self, id: SpanId) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            id,
        }
    }

    pub(crate) fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn id(&self) -> SpanId {
        self.id
    }

    /// The construct kind of this view; `None` for a plain document.
    pub fn kind(&self) -> Option<ConstructKind> {
        self.id.kind()
    }

    pub fn text(&self) -> String {
        self.doc.borrow().text_of(self.id)
    }

    pub fn set_text(&self, text: &str) -> Result<(), EditError> {
        self.replace(.., text)
    }

    pub fn len(&self) -> usize {
        self.span().map_or(0, |r| r.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute byte range in the document; `None` once detached.
    pub fn span(&self) -> Option<Range<usize>> {
        self.doc.borrow().spans.range(self.id)
    }

    /// Whether an edit has removed this construct.
    pub fn is_detached(&self) -> bool {
        self.span().is_none()
    }

    /// Read part of the text, clamping out-of-range offsets.
    pub fn substring(&self, range: impl TextRange) -> String {
        let text = self.text();
        text[range.resolve_lenient(&text)].to_owned()
    }

    /// Replace part of the text.
    pub fn replace(&self, range: impl TextRange, text: &str) -> Result<(), EditError> {
        let own = self.text();
        if self.is_detached() {
            return Err(EditError::Detached);
        }
        let local = range.resolve(&own)?;
        self.splice_local(local, text)
    }

    /// Insert at `index`; out-of-range indexes append or prepend.
    pub fn insert(&self, index: isize, text: &str) -> Result<(), EditError> {
        let own = self.text();
        if self.is_detached() {
            return Err(EditError::Detached);
        }
        let at = insertion_point(&own, index)?;
        self.splice_local(at..at, text)
    }

    /// Delete the whole construct. The view is detached afterwards (unless it
    /// is the root of its document, which just becomes empty).
    pub fn delete(&self) -> Result<(), EditError> {
        self.replace(.., "")
    }

    pub fn delete_range(&self, range: impl TextRange) -> Result<(), EditError> {
        self.replace(range, "")
    }

    /// Replace a range given in this view's own byte offsets.
    pub(crate) fn splice_local(&self, local: Range<usize>, text: &str) -> Result<(), EditError> {
        let mut doc = self.doc.borrow_mut();
        let span = doc.range_of(self.id)?;
        if local.end > span.len() {
            return Err(EditError::OutOfRange {
                index: local.end as isize,
                len: span.len(),
            });
        }
        doc.splice(self.id, span.start + local.start..span.start + local.end, text)
    }

    /// Whether `other` is a construct of the same document nested in this one.
    /// A construct with the same range is only contained by the document
    /// root.
    pub fn contains(&self, other: &WikiText) -> bool {
        if !Rc::ptr_eq(&self.doc, &other.doc) || self.id == other.id {
            return false;
        }
        let doc = self.doc.borrow();
        match (doc.spans.range(self.id), doc.spans.range(other.id)) {
            (Some(outer), Some(inner)) => {
                outer.start <= inner.start
                    && inner.end <= outer.end
                    && (outer != inner || doc.spans.is_root(self.id))
            }
            _ => false,
        }
    }

    pub fn contains_str(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// The constructs containing this one, innermost first.
    pub fn ancestors(&self, kind: Option<ConstructKind>) -> Vec<WikiText> {
        let ids = self.doc.borrow_mut().ancestors_of(self.id);
        ids.into_iter()
            .filter(|id| kind.is_none() || id.kind() == kind)
            .map(|id| self.sibling(id))
            .collect()
    }

    pub fn parent(&self, kind: Option<ConstructKind>) -> Option<WikiText> {
        self.ancestors(kind).into_iter().next()
    }

    /// How deeply this construct sits in templates and parser functions,
    /// counting itself.
    pub fn nesting_level(&self) -> usize {
        let is_invocation = |kind: Option<ConstructKind>| {
            matches!(
                kind,
                Some(ConstructKind::Template | ConstructKind::ParserFunction)
            )
        };
        let enclosing = self
            .ancestors(None)
            .iter()
            .filter(|a| is_invocation(a.kind()))
            .count();
        enclosing + usize::from(is_invocation(self.kind()))
    }

    /// The constructs of `kind` inside this one, outer first.
    pub fn children_of_type(&self, kind: ConstructKind) -> Vec<WikiText> {
        match kind {
            ConstructKind::Section => self.sections().into_iter().map(Into::into).collect(),
            ConstructKind::List => self.lists().into_iter().map(Into::into).collect(),
            ConstructKind::Argument => {
                let mut owners: Vec<WikiText> = Vec::new();
                if self.kind().is_some_and(ConstructKind::is_invocation) {
                    owners.push(self.clone());
                }
                for owner_kind in [
                    ConstructKind::Template,
                    ConstructKind::ParserFunction,
                    ConstructKind::Parameter,
                ] {
                    owners.extend(self.global_children(owner_kind));
                }
                let mut arguments: Vec<WikiText> = owners
                    .iter()
                    .flat_map(template::arguments_of)
                    .map(Into::into)
                    .collect();
                sort_views(&mut arguments);
                arguments
            }
            ConstructKind::TableCell => {
                let mut tables: Vec<WikiText> = Vec::new();
                if self.kind() == Some(ConstructKind::Table) {
                    tables.push(self.clone());
                }
                tables.extend(self.global_children(ConstructKind::Table));
                let mut cells: Vec<WikiText> = tables
                    .into_iter()
                    .flat_map(|table| Table::from_view(table).cells())
                    .flatten()
                    .map(Into::into)
                    .collect();
                sort_views(&mut cells);
                cells
            }
            _ => self.global_children(kind),
        }
    }

    /// Globally discovered constructs of `kind` within this view.
    fn global_children(&self, kind: ConstructKind) -> Vec<WikiText> {
        let ids = {
            let mut doc = self.doc.borrow_mut();
            let Some(range) = doc.spans.range(self.id) else {
                return Vec::new();
            };
            doc.ensure(kind);
            doc.spans.ids_within(kind, &range)
        };
        ids.into_iter()
            .filter(|id| *id != self.id)
            .map(|id| self.sibling(id))
            .collect()
    }

    pub fn templates(&self) -> Vec<Template> {
        self.global_children(ConstructKind::Template)
            .into_iter()
            .map(Template::from_view)
            .collect()
    }

    pub fn parser_functions(&self) -> Vec<ParserFunction> {
        self.global_children(ConstructKind::ParserFunction)
            .into_iter()
            .map(ParserFunction::from_view)
            .collect()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.global_children(ConstructKind::Parameter)
            .into_iter()
            .map(Parameter::from_view)
            .collect()
    }

    /// Arguments of every template, parser function and parameter in this view.
    pub fn arguments_within(&self) -> Vec<Argument> {
        self.children_of_type(ConstructKind::Argument)
            .into_iter()
            .map(Argument::from_view)
            .collect()
    }

    pub fn wikilinks(&self) -> Vec<WikiLink> {
        self.global_children(ConstructKind::WikiLink)
            .into_iter()
            .map(WikiLink::from_view)
            .collect()
    }

    pub fn external_links(&self) -> Vec<ExternalLink> {
        self.global_children(ConstructKind::ExternalLink)
            .into_iter()
            .map(ExternalLink::from_view)
            .collect()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.global_children(ConstructKind::Comment)
            .into_iter()
            .map(Comment::from_view)
            .collect()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.global_children(ConstructKind::Tag)
            .into_iter()
            .map(Tag::from_view)
            .collect()
    }

    /// Tags named `name` (case-insensitive).
    pub fn get_tags(&self, name: &str) -> Vec<Tag> {
        self.tags()
            .into_iter()
            .filter(|tag| tag.name().eq_ignore_ascii_case(name))
            .collect()
    }

    /// Every table, nested ones included.
    pub fn tables(&self) -> Vec<Table> {
        self.get_tables(true)
    }

    /// Tables in this view; without `recursive`, only those not nested in
    /// another table of this view.
    pub fn get_tables(&self, recursive: bool) -> Vec<Table> {
        let tables: Vec<WikiText> = self.global_children(ConstructKind::Table);
        let top_level: Vec<WikiText> = if recursive {
            tables
        } else {
            let spans: Vec<Option<Range<usize>>> = tables.iter().map(WikiText::span).collect();
            tables
                .iter()
                .zip(&spans)
                .filter(|(_, span)| {
                    let Some(span) = span else { return false };
                    !spans.iter().flatten().any(|outer| {
                        outer != span && outer.start <= span.start && span.end <= outer.end
                    })
                })
                .map(|(table, _)| table.clone())
                .collect()
        };
        top_level.into_iter().map(Table::from_view).collect()
    }

    /// The lead section followed by one section per heading, each running
    /// up to the next heading of the same or a higher level.
    pub fn sections(&self) -> Vec<Section> {
        sections::scan_sections(self, true, None)
    }

    /// Sections of this view. Without `include_subsections` each section
    /// stops at the next heading of any level. With a `level`, only the
    /// sections of headings of that level are returned.
    pub fn get_sections(&self, include_subsections: bool, level: Option<usize>) -> Vec<Section> {
        sections::scan_sections(self, include_subsections, level)
    }

    pub fn lists(&self) -> Vec<WikiList> {
        lists::scan_lists(self)
    }

    /// A lossless tree of this view's text with one node per registered
    /// construct inside it.
    pub fn syntax_tree(&self) -> SyntaxNode {
        let (text, found) = {
            let mut doc = self.doc.borrow_mut();
            doc.ensure_all();
            let Some(range) = doc.spans.range(self.id) else {
                return build_tree("", &[]);
            };
            let found: Vec<Found> = doc
                .spans
                .within(&range)
                .into_iter()
                .filter(|(id, _)| *id != self.id)
                .filter_map(|(id, span)| {
                    Some(Found::new(id.kind()?, span.start - range.start..span.end - range.start))
                })
                .collect();
            (doc.text_of(self.id), found)
        };
        build_tree(&text, &found)
    }

    /// This view's text with standalone layers, for splitting it into parts.
    pub(crate) fn own_layers(&self) -> (String, Layers) {
        let text = self.text();
        let opaque: OpaqueTags = self.doc.borrow().opaque.clone();
        let layers = Layers::scan(&text, &opaque);
        (text, layers)
    }
}

/// Sort views outer first.
pub(crate) fn sort_views(views: &mut [WikiText]) {
    views.sort_by_key(|view| {
        let span = view.span().unwrap_or(0..0);
        (span.start, std::cmp::Reverse(span.end))
    });
}
