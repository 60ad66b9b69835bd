//! # wikispan-syntax
//!
//! Pure, text-only recognizers for wikitext constructs, plus a lossless
//! [Rowan] tree built from their results. Nothing here holds mutable state:
//! every function takes text (usually a *shadow*, see [`shadow`]) and returns
//! byte ranges. The incremental engine in `wikispan-engine` decides *when*
//! and *where* to call them.
//!
//! [Rowan]: https://docs.rs/rowan
//!
//! ## Recognizers
//!
//! | module        | constructs                                        |
//! |---------------|---------------------------------------------------|
//! | [`comment`]   | `<!-- ... -->`                                    |
//! | [`tag`]       | HTML and extension tags, opaque tag bodies        |
//! | [`brackets`]  | templates, parser functions, parameters, wikilinks |
//! | [`ext_link`]  | bracketed and bare external links                 |
//! | [`tables`]    | `{| ... |}` and the cell layout of one table      |
//! | [`sections`]  | headings, lead/deep/shallow sections              |
//! | [`lists`]     | `*`, `#`, `:`/`;` lists and their items           |
//! | [`attrs`]     | `name="value"` attribute lists                    |
//!
//! Order matters: comments hide everything, opaque tags hide their bodies
//! from the bracket pass, and so on. [`Layers::scan`] runs the opaque
//! recognizers in that order over a standalone text and
//! [`Layers::shadow`] produces the input each later recognizer expects.
//!
//! ## Quick Start
//!
//! ```
//! use wikispan_syntax::{ConstructKind, Layers, OpaqueTags, Purpose, ext_link};
//!
//! let text = "{{a|[http://example.com<!-- c -->/x y]}}";
//! let layers = Layers::scan(text, &OpaqueTags::default());
//! assert_eq!(layers.brackets_of(ConstructKind::Template).count(), 1);
//!
//! let links = ext_link::scan(&layers.shadow(text, Purpose::ExternalLinks));
//! assert_eq!(&text[links[0].clone()], "[http://example.com<!-- c -->/x y]");
//! ```

pub mod attrs;
pub mod brackets;
pub mod comment;
pub mod ext_link;
pub mod kind;
pub mod lexer;
pub mod lists;
pub mod sections;
pub mod shadow;
pub mod syntax_kind;
pub mod tables;
pub mod tag;
pub mod tree;

pub use kind::{ConstructKind, Found, sort_outer_first};
pub use shadow::{Fill, Layers, Purpose, shadow};
pub use syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, WikitextLang};
pub use tag::OpaqueTags;
pub use tree::{build_tree, format_tree};
