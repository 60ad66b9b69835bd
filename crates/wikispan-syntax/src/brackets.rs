//! The bracket pass: templates, parser functions, parameters and wikilinks.
//!
//! Braces and square brackets share one stack, the way the MediaWiki
//! preprocessor matches them:
//!
//! - an opening run of two or more pushes one stack entry;
//! - a closing run only pairs with the top entry, and only if the top is of
//!   the same bracket type (otherwise the run is plain text);
//! - brace pairs take three when both runs have at least three (a
//!   parameter), else two (a template or parser function); leftovers of one
//!   brace fall back to text;
//! - bracket pairs always take two (a wikilink candidate).
//!
//! Candidates are classified afterwards by looking at their top-level text.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::kind::{ConstructKind, Found};
use crate::lexer::{self, Delim};
use crate::shadow::inner_range;

/// Magic words that turn `{{name:...}}` into a parser function.
const MAGIC_WORDS: &[&str] = &[
    "anchorencode", "basepagename", "canonicalurl", "defaultsort", "displaytitle",
    "filepath", "formatdate", "formatnum", "fullpagename", "fullurl", "gender", "grammar",
    "int", "lc", "lcfirst", "localurl", "msg", "msgnw", "namespace", "ns", "nse",
    "numberingroup", "numberofpages", "padleft", "padright", "pagename", "pagesincategory",
    "pagesize", "plural", "protectionlevel", "raw", "special", "speciale", "subjectspace",
    "subpagename", "tag", "talkspace", "uc", "ucfirst", "urlencode",
];

struct Open {
    brace: bool,
    start: usize,
    count: usize,
}

/// Everything one bracket pass saw, including the pairs and openers that did
/// not become constructs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketScan {
    /// Constructs, sorted outer-first.
    pub found: Vec<Found>,
    /// Bracket pairs that are not wikilinks, such as `[[http://x]]`.
    pub unclassified: Vec<Range<usize>>,
    /// Opening runs still on the stack at the end.
    pub unmatched: Vec<Range<usize>>,
    /// Closing runs of two or more that found the stack empty.
    pub stray_closers: usize,
}

impl BracketScan {
    /// Whether the scanned text leaves the stack as it found it, so it scans
    /// the same inside any longer text.
    pub fn is_self_contained(&self) -> bool {
        self.unmatched.is_empty() && self.stray_closers == 0
    }
}

/// Run the bracket pass over a shadow in which comments and opaque tag
/// bodies are already masked. Results are sorted outer-first.
pub fn scan(shadow: &str) -> Vec<Found> {
    scan_all(shadow).found
}

/// [`scan`], keeping what the pass left unresolved.
pub fn scan_all(shadow: &str) -> BracketScan {
    let mut stack: Vec<Open> = Vec::new();
    let mut candidates: Vec<(bool, usize, Range<usize>)> = Vec::new();
    let mut stray_closers = 0;

    for token in lexer::lex(shadow) {
        match token.kind {
            Delim::OpenBraces | Delim::OpenBrackets => {
                if token.len() >= 2 {
                    stack.push(Open {
                        brace: token.kind == Delim::OpenBraces,
                        start: token.span.start,
                        count: token.len(),
                    });
                }
            }
            Delim::CloseBraces | Delim::CloseBrackets => {
                let brace = token.kind == Delim::CloseBraces;
                let mut cursor = token.span.start;
                let mut remaining = token.len();
                while remaining >= 2 {
                    let Some(top) = stack.last_mut() else { break };
                    if top.brace != brace {
                        break;
                    }
                    let available = remaining.min(top.count);
                    let take = match (brace, available) {
                        (true, n) if n >= 3 => 3,
                        (_, n) if n >= 2 => 2,
                        _ => break,
                    };
                    let start = top.start + top.count - take;
                    candidates.push((brace, take, start..cursor + take));
                    top.count -= take;
                    if top.count < 2 {
                        stack.pop();
                    }
                    cursor += take;
                    remaining -= take;
                }
                if remaining >= 2 && stack.is_empty() {
                    stray_closers += 1;
                }
            }
            Delim::Text => {}
        }
    }

    let mut ranges: Vec<Range<usize>> = candidates.iter().map(|(_, _, r)| r.clone()).collect();
    crate::kind::sort_outer_first(&mut ranges);

    let mut found = Vec::with_capacity(candidates.len());
    let mut unclassified = Vec::new();
    for (brace, take, range) in &candidates {
        let inner = nested_in(&ranges, range);
        let kind = if *brace && *take == 3 {
            Some(ConstructKind::Parameter)
        } else if *brace {
            Some(classify_invocation(shadow, range, &inner))
        } else if is_wikilink(shadow, range, &inner) {
            Some(ConstructKind::WikiLink)
        } else {
            None
        };
        match kind {
            Some(kind) => found.push(Found::new(kind, range.clone())),
            None => unclassified.push(range.clone()),
        }
    }
    found.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });
    BracketScan {
        found,
        unclassified,
        unmatched: stack
            .iter()
            .map(|open| open.start..open.start + open.count)
            .collect(),
        stray_closers,
    }
}

/// Candidate ranges strictly inside `outer`, from an outer-first sorted list.
fn nested_in(sorted: &[Range<usize>], outer: &Range<usize>) -> Vec<Range<usize>> {
    let first = sorted.partition_point(|r| r.start < outer.start);
    sorted[first..]
        .iter()
        .take_while(|r| r.start < outer.end)
        .filter(|r| *r != outer && r.end <= outer.end)
        .cloned()
        .collect()
}

/// Byte offset of the first `needle` in `range` that is not inside `inner`.
pub(crate) fn find_top_level(
    shadow: &str,
    range: Range<usize>,
    inner: &[Range<usize>],
    needle: impl Fn(u8) -> bool,
) -> Option<usize> {
    let bytes = shadow.as_bytes();
    let mut i = range.start;
    while i < range.end {
        if let Some(skip) = inner.iter().find(|r| r.start <= i && i < r.end) {
            i = skip.end;
            continue;
        }
        if needle(bytes[i]) {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn classify_invocation(
    shadow: &str,
    range: &Range<usize>,
    inner: &[Range<usize>],
) -> ConstructKind {
    let body = range.start + 2..range.end - 2;
    let name_end = find_top_level(shadow, body.clone(), inner, |b| b == b'|').unwrap_or(body.end);
    let Some(colon) = find_top_level(shadow, body.start..name_end, inner, |b| b == b':') else {
        return ConstructKind::Template;
    };
    let name = shadow[body.start..colon].trim();
    if name.starts_with('#') || MAGIC_WORDS.iter().any(|m| name.eq_ignore_ascii_case(m)) {
        ConstructKind::ParserFunction
    } else {
        ConstructKind::Template
    }
}

fn url_scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^(?:{}|//)", crate::ext_link::SCHEMES))
            .expect("valid scheme regex")
    })
}

fn is_wikilink(shadow: &str, range: &Range<usize>, inner: &[Range<usize>]) -> bool {
    let body = range.start + 2..range.end - 2;
    let target_end =
        find_top_level(shadow, body.clone(), inner, |b| b == b'|').unwrap_or(body.end);
    let target = &shadow[body.start..target_end];
    if url_scheme_regex().is_match(target.trim_start()) {
        return false;
    }
    find_top_level(shadow, body.start..target_end, inner, |b| b == b'\n').is_none()
}

/// The parts of a template, parser function or parameter's own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The name, between the opening braces and the first separator.
    pub name: Range<usize>,
    /// Each argument including its leading `|` (or `:` for the first
    /// argument of a parser function).
    pub arguments: Vec<Range<usize>>,
}

/// Split an invocation's own text (shadowed with [`crate::Purpose::Parts`]).
pub fn split_invocation(shadow: &str, kind: ConstructKind) -> Invocation {
    let bytes = shadow.as_bytes();
    let open = if kind == ConstructKind::Parameter { 3 } else { 2 };
    let close = if shadow.len() >= 2 * open { open } else { 0 };
    let body = inner_range(shadow, open, close);

    let mut separators: Vec<usize> = body
        .clone()
        .filter(|&i| bytes[i] == b'|')
        .collect();
    if kind == ConstructKind::ParserFunction {
        let first_pipe = separators.first().copied().unwrap_or(body.end);
        if let Some(colon) = shadow[body.start..first_pipe].find(':') {
            separators.insert(0, body.start + colon);
        }
    }

    let name = body.start..separators.first().copied().unwrap_or(body.end);
    let arguments = separators
        .iter()
        .enumerate()
        .map(|(i, &sep)| sep..separators.get(i + 1).copied().unwrap_or(body.end))
        .collect();
    Invocation { name, arguments }
}

/// The parts of one argument's own text (including its separator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentParts {
    /// `None` for positional arguments.
    pub name: Option<Range<usize>>,
    pub value: Range<usize>,
}

/// Split an argument at its first top-level `=`.
pub fn split_argument(shadow: &str) -> ArgumentParts {
    let body = inner_range(shadow, 1, 0);
    match shadow[body.clone()].find('=') {
        Some(eq) => ArgumentParts {
            name: Some(body.start..body.start + eq),
            value: body.start + eq + 1..body.end,
        },
        None => ArgumentParts {
            name: None,
            value: body,
        },
    }
}

/// The parts of a wikilink's own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParts {
    pub target: Range<usize>,
    /// The display text after the first top-level `|`.
    pub text: Option<Range<usize>>,
}

pub fn split_wikilink(shadow: &str) -> LinkParts {
    let body = inner_range(shadow, 2, 2);
    match shadow[body.clone()].find('|') {
        Some(pipe) => LinkParts {
            target: body.start..body.start + pipe,
            text: Some(body.start + pipe + 1..body.end),
        },
        None => LinkParts {
            target: body,
            text: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<(ConstructKind, &str)> {
        scan(text)
            .into_iter()
            .map(|f| (f.kind, &text[f.range]))
            .collect()
    }

    #[test]
    fn nested_templates_and_parser_functions() {
        let text = "{{a|{{#if:{{b{{c}}}}}}}}";
        assert_eq!(
            kinds(text),
            vec![
                (ConstructKind::Template, text),
                (ConstructKind::ParserFunction, "{{#if:{{b{{c}}}}}}"),
                (ConstructKind::Template, "{{b{{c}}}}"),
                (ConstructKind::Template, "{{c}}"),
            ]
        );
    }

    #[test]
    fn parameter_takes_three_braces() {
        assert_eq!(
            kinds("{{{{a}}}}"),
            vec![(ConstructKind::Parameter, "{{{a}}}")]
        );
        assert_eq!(
            kinds("{{{{{a}}}}}"),
            vec![
                (ConstructKind::Template, "{{{{{a}}}}}"),
                (ConstructKind::Parameter, "{{{a}}}"),
            ]
        );
    }

    #[test]
    fn mismatched_close_is_text() {
        assert_eq!(
            kinds("{{a|[[b}}]]"),
            vec![(ConstructKind::WikiLink, "[[b}}]]")]
        );
    }

    #[test]
    fn magic_words_and_language_prefixes() {
        assert_eq!(kinds("{{uc:a}}"), vec![(ConstructKind::ParserFunction, "{{uc:a}}")]);
        assert_eq!(kinds("{{en:text|a}}"), vec![(ConstructKind::Template, "{{en:text|a}}")]);
        assert_eq!(
            kinds("{{ #if: a | b }}"),
            vec![(ConstructKind::ParserFunction, "{{ #if: a | b }}")]
        );
    }

    #[test]
    fn url_targets_are_not_wikilinks() {
        assert_eq!(kinds("[[http://example.com foo]]"), vec![]);
        assert_eq!(kinds("[[a|http://example.com]]").len(), 1);
    }

    #[test]
    fn split_template_arguments() {
        let text = "{{a|b=c|d}}";
        let parts = split_invocation(text, ConstructKind::Template);
        assert_eq!(&text[parts.name], "a");
        let args: Vec<_> = parts.arguments.into_iter().map(|r| &text[r]).collect();
        assert_eq!(args, vec!["|b=c", "|d"]);
    }

    #[test]
    fn split_parser_function_arguments() {
        let text = "{{#if:a|b|c}}";
        let parts = split_invocation(text, ConstructKind::ParserFunction);
        assert_eq!(&text[parts.name], "#if");
        let args: Vec<_> = parts.arguments.into_iter().map(|r| &text[r]).collect();
        assert_eq!(args, vec![":a", "|b", "|c"]);
    }

    #[test]
    fn split_parameter() {
        let text = "{{{p|d}}}";
        let parts = split_invocation(text, ConstructKind::Parameter);
        assert_eq!(&text[parts.name], "p");
        assert_eq!(parts.arguments, vec![4..6]);
    }

    #[test]
    fn split_arguments_and_links() {
        let arg = split_argument("| n = v ");
        assert_eq!(arg.name, Some(1..4));
        assert_eq!(arg.value, 5..8);
        assert_eq!(split_argument("|v").name, None);

        let link = split_wikilink("[[a|b]]");
        assert_eq!(link.target, 2..3);
        assert_eq!(link.text, Some(4..5));
        assert_eq!(split_wikilink("[[a]]").text, None);
    }

    #[test]
    fn splitting_edited_text_never_cuts_a_character() {
        let text = "Zürich";
        let parts = split_invocation(text, ConstructKind::Template);
        assert_eq!(&text[parts.name], "ri");
        assert!(parts.arguments.is_empty());

        let arg = split_argument("é=1");
        assert_eq!(arg.name, Some(2..2));
        assert_eq!(arg.value, 3..4);

        let link = split_wikilink("aé");
        assert_eq!(link.target, 3..3);
        assert_eq!(split_wikilink("[[é|ü]]").text, Some(5..7));
    }

    #[test]
    fn unresolved_brackets_are_reported() {
        let text = "{{a\n[[\n}}";
        let scan = scan_all(text);
        assert!(scan.found.is_empty());
        assert_eq!(scan.unmatched, vec![0..2, 4..6]);
        assert_eq!(scan.stray_closers, 0);
        assert!(!scan.is_self_contained());

        let scan = scan_all("[[http://x]] {{b}}");
        assert_eq!(scan.unclassified, vec![0..12]);
        assert!(scan.is_self_contained());

        let scan = scan_all("a}} {{b}}]]");
        assert_eq!(scan.stray_closers, 2);
        assert!(scan.unmatched.is_empty());
        assert!(!scan.is_self_contained());

        assert!(scan_all("{{a|[[b]]}}}").is_self_contained());
        assert!(scan_all("{{a|]]}}").is_self_contained());
    }
}
