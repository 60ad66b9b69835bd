//! SyntaxKind enum for the lossless construct tree.
//!
//! Following the rust-analyzer model, tokens and nodes share a single enum.
//! Construct nodes mirror [`ConstructKind`]; the text between and inside them
//! is carried by `TEXT` tokens so every byte of the source appears in the tree.

use crate::kind::ConstructKind;

/// All syntax kinds of the construct tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens ===
    /// Text not covered by a more specific node
    TEXT,

    // === Composite Nodes ===
    /// Root of a document
    ROOT,
    TEMPLATE,
    PARSER_FUNCTION,
    PARAMETER,
    ARGUMENT,
    WIKILINK,
    EXTERNAL_LINK,
    COMMENT,
    TAG,
    TABLE,
    TABLE_CELL,
    SECTION,
    LIST,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token.
    pub fn is_token(self) -> bool {
        self == Self::TEXT
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }
}

impl From<ConstructKind> for SyntaxKind {
    fn from(kind: ConstructKind) -> Self {
        match kind {
            ConstructKind::Template => Self::TEMPLATE,
            ConstructKind::ParserFunction => Self::PARSER_FUNCTION,
            ConstructKind::Parameter => Self::PARAMETER,
            ConstructKind::Argument => Self::ARGUMENT,
            ConstructKind::WikiLink => Self::WIKILINK,
            ConstructKind::ExternalLink => Self::EXTERNAL_LINK,
            ConstructKind::Comment => Self::COMMENT,
            ConstructKind::Tag => Self::TAG,
            ConstructKind::Table => Self::TABLE,
            ConstructKind::TableCell => Self::TABLE_CELL,
            ConstructKind::Section => Self::SECTION,
            ConstructKind::List => Self::LIST,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WikitextLang {}

impl rowan::Language for WikitextLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::LIST as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<WikitextLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<WikitextLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<WikitextLang>;
