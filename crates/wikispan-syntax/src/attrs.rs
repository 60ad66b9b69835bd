//! HTML-style attributes (`name`, `name=value`, `name="value"`,
//! `name='value'`) as found in tags, table heads, captions and cells.
//!
//! Parsing yields byte ranges; the update helpers turn a change into splices
//! over those ranges so callers can apply them through their own buffer.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s/>="']+)(?:\s*=\s*(?:"([^"]*)"?|'([^']*)'?|([^\s"'>]*)))?"#)
            .expect("valid attribute regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// The whole attribute, from its name to the end of its value.
    pub range: Range<usize>,
    pub name: Range<usize>,
    /// The value without quotes; `None` for a bare name.
    pub value: Option<Range<usize>>,
}

/// Parse the attributes in `region` of `text`.
pub fn parse(text: &str, region: Range<usize>) -> Vec<Attr> {
    let base = region.start;
    attr_regex()
        .captures_iter(&text[region])
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            let value = caps.get(2).or(caps.get(3)).or(caps.get(4));
            Some(Attr {
                range: base + whole.start()..base + whole.end(),
                name: base + name.start()..base + name.end(),
                value: value.map(|v| base + v.start()..base + v.end()),
            })
        })
        .collect()
}

/// The last attribute named `name` (later attributes win).
pub fn find<'a>(text: &str, attrs: &'a [Attr], name: &str) -> Option<&'a Attr> {
    attrs
        .iter()
        .rev()
        .find(|a| text[a.name.clone()].eq_ignore_ascii_case(name))
}

/// A single splice: replace `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub range: Range<usize>,
    pub text: String,
}

fn quoted(value: &str) -> String {
    if value.contains('"') {
        format!("'{value}'")
    } else {
        format!("\"{value}\"")
    }
}

/// The splice that gives attribute `name` the value `value` within `region`.
pub fn set(text: &str, region: Range<usize>, name: &str, value: &str) -> Splice {
    let attrs = parse(text, region.clone());
    if let Some(attr) = find(text, &attrs, name) {
        return Splice {
            range: attr.name.end..attr.range.end,
            text: format!("={}", quoted(value)),
        };
    }
    let needs_space = !text[region.clone()].ends_with(char::is_whitespace) || region.is_empty();
    Splice {
        range: region.end..region.end,
        text: format!(
            "{}{name}={}",
            if needs_space { " " } else { "" },
            quoted(value)
        ),
    }
}

/// The splices that remove every attribute named `name`, back to front.
pub fn delete(text: &str, region: Range<usize>, name: &str) -> Vec<Splice> {
    let attrs = parse(text, region.clone());
    let mut splices: Vec<Splice> = attrs
        .iter()
        .filter(|a| text[a.name.clone()].eq_ignore_ascii_case(name))
        .map(|a| {
            let before = &text[region.start..a.range.start];
            let ws = before.len() - before.trim_end().len();
            Splice {
                range: a.range.start - ws..a.range.end,
                text: String::new(),
            }
        })
        .collect();
    splices.reverse();
    splices
}
