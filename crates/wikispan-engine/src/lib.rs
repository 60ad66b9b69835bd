//! # wikispan-engine
//!
//! Mutable wikitext with live views. A [`WikiText`] owns a shared document
//! (a rope buffer plus a table of registered spans); every construct you
//! ask for comes back as a view onto that same document. Editing through
//! any view edits the buffer, and every other view sees the change on its
//! next read:
//!
//! - spans ending before an edit stay put, spans after it shift;
//! - a span containing an edit grows or shrinks with it;
//! - a span an edit partially overlaps, or swallows whole, is detached.
//!
//! Discovery is lazy. The first call for a construct kind scans the whole
//! buffer; later calls only rescan the regions edits have touched, and keep
//! handing out the views (and [`SpanId`]s) of constructs that survived.
//!
//! ## Quick Start
//!
//! ```
//! use wikispan_engine::WikiText;
//!
//! let page = WikiText::new("{{cite|title=Old}} see [[Main Page|home]]");
//! let cite = page.templates().remove(0);
//! let link = page.wikilinks().remove(0);
//!
//! cite.set_arg("title", "Newer").unwrap();
//! assert_eq!(page.text(), "{{cite|title=Newer}} see [[Main Page|home]]");
//!
//! // The link was after the edit: it shifted but is still the same view.
//! assert_eq!(link.target(), "Main Page");
//! assert_eq!(page.wikilinks().remove(0), link);
//! ```

mod adjust;
mod buffer;
mod discovery;
mod document;
mod error;
mod range;
mod span;
mod views;
mod wikitext;

pub use document::ParseOptions;
pub use error::EditError;
pub use range::TextRange;
pub use span::SpanId;
pub use views::{
    Argument, AttrRegion, Cell, Comment, DataOptions, ExternalLink, HasAttributes, Parameter,
    ParserFunction, Section, Table, Tag, Template, WikiLink, WikiList,
};
pub use wikitext::WikiText;

pub use wikispan_syntax::{ConstructKind, SyntaxNode, format_tree};
