//! Typed views over [`WikiText`].
//!
//! Each view is a [`WikiText`] whose span is registered under one
//! [`ConstructKind`](wikispan_syntax::ConstructKind); it derefs to [`WikiText`] for everything generic and
//! adds the accessors of its construct. Accessors that split a construct
//! into parts (names, values, attributes) rescan the view's own text on
//! every call, so they always reflect the current buffer.

use wikispan_syntax::{Layers, Purpose};

use crate::WikiText;

mod attributes;
pub(crate) mod lists;
mod link;
mod markup;
pub(crate) mod sections;
mod table;
pub(crate) mod template;

pub use attributes::{AttrRegion, HasAttributes};
pub use link::{ExternalLink, WikiLink};
pub use lists::WikiList;
pub use markup::{Comment, Tag};
pub use sections::Section;
pub use table::{Cell, DataOptions, Table};
pub use template::{Argument, Parameter, ParserFunction, Template};

/// Declare a typed view: a newtype over [`WikiText`] with conversions.
///
/// The `standalone` form also gets `new`/`with_options`, which parse a text
/// into a private document whose root is the construct itself.
macro_rules! typed_view {
    ($(#[$meta:meta])* $name:ident, $kind:expr, standalone) => {
        typed_view!($(#[$meta])* $name, $kind);

        impl $name {
            /// Parse `text` as this construct, in a document of its own.
            pub fn new(text: &str) -> Self {
                Self::with_options(text, &$crate::ParseOptions::default())
            }

            pub fn with_options(text: &str, options: &$crate::ParseOptions) -> Self {
                Self($crate::WikiText::typed_root(text, Self::KIND, options))
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name($crate::WikiText);

        impl $name {
            pub const KIND: ::wikispan_syntax::ConstructKind = $kind;

            pub(crate) fn from_view(view: $crate::WikiText) -> Self {
                Self(view)
            }

            pub fn as_wikitext(&self) -> &$crate::WikiText {
                &self.0
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::WikiText;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.0, f)
            }
        }

        impl From<$name> for $crate::WikiText {
            fn from(view: $name) -> Self {
                view.0
            }
        }

        impl TryFrom<$crate::WikiText> for $name {
            type Error = $crate::WikiText;

            /// Succeeds when the view's span is registered as this kind.
            fn try_from(view: $crate::WikiText) -> Result<Self, Self::Error> {
                if view.kind() == Some(Self::KIND) {
                    Ok(Self(view))
                } else {
                    Err(view)
                }
            }
        }
    };
}

pub(crate) use typed_view;

/// A view's own text and the shadow of it a part splitter runs on.
pub(crate) fn own_shadow(view: &WikiText, purpose: Purpose) -> (String, String, Layers) {
    let (text, layers) = view.own_layers();
    let shadow = layers.shadow(&text, purpose);
    (text, shadow, layers)
}

/// Nested constructs of `layers` (not the whole text), moved to absolute
/// offsets.
pub(crate) fn nested_brackets(layers: &Layers, len: usize, base: usize) -> Vec<std::ops::Range<usize>> {
    layers
        .brackets
        .iter()
        .filter(|found| found.range != (0..len))
        .map(|found| base + found.range.start..base + found.range.end)
        .collect()
}
