//! HTML and extension tags.
//!
//! Only known tag names are recognized, so `<abc>` or `a < b > c` stay plain
//! text. Ordinary tags of the same name nest and are matched with a stack; a
//! start tag that never finds its end tag is reported on its own (a
//! "start-only" tag such as a bare `<li>`). Opaque extension tags
//! (`<nowiki>`, `<pre>`, `<math>`, ...) instead run to the first matching end
//! tag and their bodies are hidden from every other recognizer.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// HTML tag names allowed in wikitext.
const HTML_TAGS: &[&str] = &[
    "abbr", "b", "bdi", "bdo", "big", "blockquote", "br", "caption", "center", "cite", "code",
    "data", "dd", "del", "dfn", "div", "dl", "dt", "em", "font", "h1", "h2", "h3", "h4", "h5",
    "h6", "hr", "i", "ins", "kbd", "li", "link", "mark", "meta", "ol", "p", "q", "rb", "rp",
    "rt", "rtc", "ruby", "s", "samp", "small", "span", "strike", "strong", "sub", "sup",
    "table", "td", "th", "time", "tr", "tt", "u", "ul", "var", "wbr",
];

/// Extension tags whose contents are still wikitext.
const PARSED_EXTENSION_TAGS: &[&str] = &[
    "ref", "references", "gallery", "poem", "indicator", "section", "templatestyles",
    "quiz", "langconvert",
];

/// Extension tags whose contents are opaque to every other construct.
pub const DEFAULT_OPAQUE_TAGS: &[&str] = &[
    "nowiki", "pre", "source", "syntaxhighlight", "math", "chem", "ce", "score", "graph",
    "hiero", "templatedata", "timeline", "inputbox", "categorytree", "charinsert",
    "imagemap", "mapframe", "maplink",
];

/// Transclusion control tags; known, but never opaque.
const INCLUSION_TAGS: &[&str] = &["includeonly", "noinclude", "onlyinclude"];

/// The set of tag names treated as opaque extension tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueTags {
    names: Vec<String>,
}

impl Default for OpaqueTags {
    fn default() -> Self {
        Self {
            names: DEFAULT_OPAQUE_TAGS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl OpaqueTags {
    /// The built-in set plus extra names (matched case-insensitively).
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = Self::default();
        for name in extra {
            let name = name.as_ref().trim().to_ascii_lowercase();
            if !name.is_empty() && !tags.names.contains(&name) {
                tags.names.push(name);
            }
        }
        tags
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

fn is_known(name: &str, opaque: &OpaqueTags) -> bool {
    let name = name.to_ascii_lowercase();
    let name = name.as_str();
    HTML_TAGS.contains(&name)
        || PARSED_EXTENSION_TAGS.contains(&name)
        || INCLUSION_TAGS.contains(&name)
        || opaque.contains(name)
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([\s/][^<>]*)?>").expect("valid tag regex")
    })
}

fn start_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^<([A-Za-z][A-Za-z0-9]*)([\s/][^<>]*)?>").expect("valid start tag regex")
    })
}

fn end_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</([A-Za-z][A-Za-z0-9]*)\s*>$").expect("valid end tag regex")
    })
}

/// A tag occurrence, in offsets relative to the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    pub range: Range<usize>,
    /// Lower-cased tag name.
    pub name: String,
    pub start_tag: Range<usize>,
    pub end_tag: Option<Range<usize>>,
    pub self_closing: bool,
    pub opaque: bool,
}

impl TagMatch {
    /// The region between the start and the end tag, if both exist.
    pub fn body(&self) -> Option<Range<usize>> {
        self.end_tag
            .as_ref()
            .map(|end| self.start_tag.end..end.start)
    }

    /// Extension tags hide their whole extent from argument and cell splitting.
    pub fn is_extension(&self) -> bool {
        self.opaque || PARSED_EXTENSION_TAGS.contains(&self.name.as_str())
    }
}

struct OpenTag {
    name: String,
    start_tag: Range<usize>,
}

/// All tags in a comment-shadowed text, outer tags first.
pub fn scan(shadow: &str, opaque: &OpaqueTags) -> Vec<TagMatch> {
    scan_counting_strays(shadow, opaque).0
}

/// Whether the tags of `shadow` scan the same inside a longer text: every
/// tag is closed (or self-closing), no end tag is left without its start,
/// and no tag can straddle either end.
pub fn is_self_contained(shadow: &str, opaque: &OpaqueTags) -> bool {
    let first_open = shadow.find('<').unwrap_or(shadow.len());
    if shadow[..first_open].contains('>') {
        return false;
    }
    if let Some(last_open) = shadow.rfind('<')
        && !shadow[last_open..].contains('>')
    {
        return false;
    }
    let (found, strays) = scan_counting_strays(shadow, opaque);
    strays == 0 && found.iter().all(|t| t.self_closing || t.end_tag.is_some())
}

/// The tags of `shadow` and the number of known end tags without a start.
fn scan_counting_strays(shadow: &str, opaque: &OpaqueTags) -> (Vec<TagMatch>, usize) {
    let re = tag_regex();
    let mut open: Vec<OpenTag> = Vec::new();
    let mut found = Vec::new();
    let mut strays = 0;
    let mut pos = 0;

    while let Some(caps) = re.captures_at(shadow, pos) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            break;
        };
        if !is_known(name.as_str(), opaque) {
            pos = whole.start() + 1;
            continue;
        }
        pos = whole.end();
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|c| !c.is_empty());

        if closing {
            if let Some(idx) = open.iter().rposition(|o| o.name == name) {
                let start = open.remove(idx);
                found.push(TagMatch {
                    range: start.start_tag.start..whole.end(),
                    name,
                    start_tag: start.start_tag,
                    end_tag: Some(whole.range()),
                    self_closing: false,
                    opaque: false,
                });
            } else {
                strays += 1;
            }
            continue;
        }

        let self_closing = caps
            .get(3)
            .is_some_and(|attrs| attrs.as_str().trim_end().ends_with('/'));
        let is_opaque = opaque.contains(&name);
        if self_closing {
            found.push(TagMatch {
                range: whole.range(),
                name,
                start_tag: whole.range(),
                end_tag: None,
                self_closing,
                opaque: is_opaque,
            });
            continue;
        }

        if is_opaque {
            let end_tag = find_end_tag(shadow, whole.end(), &name);
            if let Some(end) = &end_tag {
                pos = end.end;
            }
            found.push(TagMatch {
                range: whole.start()..end_tag.as_ref().map_or(whole.end(), |e| e.end),
                name,
                start_tag: whole.range(),
                end_tag,
                self_closing: false,
                opaque: true,
            });
            continue;
        }

        open.push(OpenTag {
            name,
            start_tag: whole.range(),
        });
    }

    found.extend(open.into_iter().map(|start| TagMatch {
        range: start.start_tag.clone(),
        opaque: opaque.contains(&start.name),
        name: start.name,
        start_tag: start.start_tag,
        end_tag: None,
        self_closing: false,
    }));
    found.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });
    (found, strays)
}

fn find_end_tag(shadow: &str, from: usize, name: &str) -> Option<Range<usize>> {
    let re = tag_regex();
    let mut pos = from;
    while let Some(caps) = re.captures_at(shadow, pos) {
        let whole = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|c| !c.is_empty());
        if closing && caps.get(2).is_some_and(|n| n.as_str().eq_ignore_ascii_case(name)) {
            return Some(whole.range());
        }
        pos = whole.start() + 1;
    }
    None
}

/// The parts of a single tag's own (comment-shadowed) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParts {
    pub name: Range<usize>,
    /// Attribute text, excluding a self-closing `/`.
    pub attrs: Range<usize>,
    pub start_tag: Range<usize>,
    pub contents: Option<Range<usize>>,
    pub end_tag: Option<Range<usize>>,
    pub self_closing: bool,
}

/// Split a tag's own text into its parts.
pub fn parse(shadow: &str) -> Option<TagParts> {
    let caps = start_tag_regex().captures(shadow)?;
    let start_tag = caps.get(0)?.range();
    let name = caps.get(1)?;
    let (attrs, self_closing) = match caps.get(2) {
        Some(attrs) => {
            let trimmed = attrs.as_str().trim_end();
            if let Some(without) = trimmed.strip_suffix('/') {
                (attrs.start()..attrs.start() + without.len(), true)
            } else {
                (attrs.range(), false)
            }
        }
        None => (name.end()..name.end(), false),
    };

    let mut contents = None;
    let mut end_tag = None;
    if !self_closing
        && let Some(end) = end_tag_regex().captures(&shadow[start_tag.end..])
        && let (Some(whole), Some(end_name)) = (end.get(0), end.get(1))
        && end_name.as_str().eq_ignore_ascii_case(name.as_str())
    {
        let end_range = start_tag.end + whole.start()..start_tag.end + whole.end();
        contents = Some(start_tag.end..end_range.start);
        end_tag = Some(end_range);
    }

    Some(TagParts {
        name: name.range(),
        attrs,
        start_tag,
        contents,
        end_tag,
        self_closing,
    })
}

impl TagParts {
    /// Re-anchor these parts as a [`TagMatch`] at `offset` in a larger text.
    pub fn to_match(&self, text: &str, offset: usize, opaque: &OpaqueTags) -> TagMatch {
        let shift = |r: &Range<usize>| r.start + offset..r.end + offset;
        let name = text[self.name.clone()].to_ascii_lowercase();
        let end = self
            .end_tag
            .as_ref()
            .map_or(self.start_tag.end, |e| e.end);
        TagMatch {
            range: offset..offset + end,
            opaque: opaque.contains(&name),
            name,
            start_tag: shift(&self.start_tag),
            end_tag: self.end_tag.as_ref().map(shift),
            self_closing: self.self_closing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(text: &str) -> Vec<Range<usize>> {
        scan(text, &OpaqueTags::default())
            .into_iter()
            .map(|t| t.range)
            .collect()
    }

    #[test]
    fn same_name_tags_nest() {
        let text = "<s><s>a</s></s>";
        assert_eq!(spans(text), vec![0..15, 3..11]);
    }

    #[test]
    fn adjacent_same_tags() {
        let text = "<s></s><s></s>";
        assert_eq!(spans(text), vec![0..7, 7..14]);
    }

    #[test]
    fn start_only_and_self_closing() {
        let text = "<br><s / ><li>x";
        let tags = scan(text, &OpaqueTags::default());
        assert_eq!(tags.len(), 3);
        assert_eq!(&text[tags[0].range.clone()], "<br>");
        assert!(tags[1].self_closing);
        assert_eq!(&text[tags[2].range.clone()], "<li>");
    }

    #[test]
    fn self_contained_regions() {
        let opaque = OpaqueTags::default();
        assert!(is_self_contained("a <b>x</b> <br/> c", &opaque));
        assert!(is_self_contained("plain", &opaque));
        assert!(!is_self_contained("<b>x", &opaque));
        assert!(!is_self_contained("x</b>", &opaque));
        assert!(!is_self_contained("<nowiki>x", &opaque));
        assert!(!is_self_contained("name=a>x", &opaque));
        assert!(!is_self_contained("x <ref name", &opaque));
    }

    #[test]
    fn unknown_names_are_text() {
        assert_eq!(spans("<abc>x</abc> a < b > c"), Vec::<Range<usize>>::new());
    }

    #[test]
    fn opaque_tags_do_not_nest() {
        let text = "<nowiki><nowiki>a</nowiki></nowiki>";
        let tags = scan(text, &OpaqueTags::default());
        assert_eq!(tags.len(), 1);
        assert_eq!(&text[tags[0].range.clone()], "<nowiki><nowiki>a</nowiki>");
        assert_eq!(tags[0].body(), Some(8..17));
    }

    #[test]
    fn extra_opaque_tags() {
        let opaque = OpaqueTags::with_extra(["Kbd"]);
        let tags = scan("<kbd><s></s></kbd>", &opaque);
        assert_eq!(tags.len(), 1);
        assert!(tags[0].opaque);
    }

    #[test]
    fn markup_may_span_lines() {
        assert_eq!(spans("<s\n>x</s\n>"), vec![0..10]);
    }

    #[test]
    fn parse_parts() {
        let text = "<ref name=\"a\">body</ref>";
        let parts = parse(text).unwrap();
        assert_eq!(&text[parts.name.clone()], "ref");
        assert_eq!(&text[parts.attrs.clone()], " name=\"a\"");
        assert_eq!(parts.contents.map(|r| &text[r]), Some("body"));
        assert!(!parts.self_closing);
    }

    #[test]
    fn parse_self_closing_excludes_slash() {
        let text = "<ref name=a />";
        let parts = parse(text).unwrap();
        assert!(parts.self_closing);
        assert_eq!(&text[parts.attrs], " name=a ");
        assert_eq!(parts.contents, None);
    }
}
