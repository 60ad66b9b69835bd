//! # Lexer - Delimiter Runs
//!
//! The bracket pass only cares about runs of `{`, `}`, `[` and `]`; everything
//! else is opaque text. [Logos] turns the (shadowed) input into a flat list of
//! such runs with their byte spans.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Every byte of the input lands in exactly one token, so the token spans
//! tile the text:
//!
//! ```
//! use wikispan_syntax::lexer::{lex, Delim};
//!
//! let tokens = lex("{{a|[[b]]}}");
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [Delim::OpenBraces, Delim::Text, Delim::OpenBrackets, Delim::Text,
//!      Delim::CloseBrackets, Delim::CloseBraces],
//! );
//! ```

use std::ops::Range;

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// A run of `{`
    #[regex(r"\{+")]
    OpenBraces,

    /// A run of `}`
    #[regex(r"\}+")]
    CloseBraces,

    /// A run of `[`
    #[regex(r"\[+")]
    OpenBrackets,

    /// A run of `]`
    #[regex(r"\]+")]
    CloseBrackets,

    /// Anything else
    #[regex(r"[^{}\[\]]+")]
    Text,
}

impl Delim {
    pub fn is_open(self) -> bool {
        matches!(self, Delim::OpenBraces | Delim::OpenBrackets)
    }

    pub fn is_close(self) -> bool {
        matches!(self, Delim::CloseBraces | Delim::CloseBrackets)
    }
}

/// A lexed delimiter run with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Delim,
    pub span: Range<usize>,
}

impl Token {
    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Lex the input into delimiter runs and text.
pub fn lex(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = Delim::lexer(input);

    while let Some(result) = lexer.next() {
        // The rules cover every character, so an error can only be a stray
        // byte sequence; keep it as text.
        let kind = result.unwrap_or(Delim::Text);
        tokens.push(Token {
            kind,
            span: lexer.span(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_tile_the_input() {
        let input = "a{{{b}}}[c]] é";
        let tokens = lex(input);
        let mut pos = 0;
        for token in &tokens {
            assert_eq!(token.span.start, pos);
            pos = token.span.end;
        }
        assert_eq!(pos, input.len());
    }

    #[test]
    fn runs_are_single_tokens() {
        let tokens = lex("{{{x}}}");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].len(), 3);
        assert_eq!(tokens[2].len(), 3);
    }
}
