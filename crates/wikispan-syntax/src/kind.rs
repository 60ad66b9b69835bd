//! Construct kinds and the ranges recognizers report for them.

use std::fmt;
use std::ops::Range;

/// Every structural construct the engine tracks spans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstructKind {
    Template,
    ParserFunction,
    Parameter,
    Argument,
    WikiLink,
    ExternalLink,
    Comment,
    Tag,
    Table,
    TableCell,
    Section,
    List,
}

impl ConstructKind {
    pub const ALL: [ConstructKind; 12] = [
        ConstructKind::Template,
        ConstructKind::ParserFunction,
        ConstructKind::Parameter,
        ConstructKind::Argument,
        ConstructKind::WikiLink,
        ConstructKind::ExternalLink,
        ConstructKind::Comment,
        ConstructKind::Tag,
        ConstructKind::Table,
        ConstructKind::TableCell,
        ConstructKind::Section,
        ConstructKind::List,
    ];

    /// Kinds found by whole-document scans and tracked with dirty regions.
    pub const GLOBAL: [ConstructKind; 8] = [
        ConstructKind::Comment,
        ConstructKind::Tag,
        ConstructKind::Template,
        ConstructKind::ParserFunction,
        ConstructKind::Parameter,
        ConstructKind::WikiLink,
        ConstructKind::ExternalLink,
        ConstructKind::Table,
    ];

    /// Owner-scoped kinds are rescanned over a view's own region on demand.
    #[must_use]
    pub fn is_owner_scoped(self) -> bool {
        matches!(
            self,
            Self::Argument | Self::TableCell | Self::Section | Self::List
        )
    }

    /// Kinds produced by the single bracket-matching pass.
    #[must_use]
    pub fn is_bracket(self) -> bool {
        matches!(
            self,
            Self::Template | Self::ParserFunction | Self::Parameter | Self::WikiLink
        )
    }

    /// Kinds that own an argument list.
    #[must_use]
    pub fn is_invocation(self) -> bool {
        matches!(self, Self::Template | Self::ParserFunction | Self::Parameter)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Template => "Template",
            Self::ParserFunction => "ParserFunction",
            Self::Parameter => "Parameter",
            Self::Argument => "Argument",
            Self::WikiLink => "WikiLink",
            Self::ExternalLink => "ExternalLink",
            Self::Comment => "Comment",
            Self::Tag => "Tag",
            Self::Table => "Table",
            Self::TableCell => "TableCell",
            Self::Section => "Section",
            Self::List => "List",
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A construct occurrence reported by a recognizer, in absolute byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub kind: ConstructKind,
    pub range: Range<usize>,
}

impl Found {
    pub fn new(kind: ConstructKind, range: Range<usize>) -> Self {
        Self { kind, range }
    }
}

/// Sort ranges outer-first: ascending start, then descending end.
pub fn sort_outer_first(ranges: &mut [Range<usize>]) {
    ranges.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
}
