//! External links: bracketed `[url text]` and bare URLs.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// URL schemes recognized in running text, as a regex alternation.
pub const SCHEMES: &str = "bitcoin:|ftp://|ftps://|geo:|git://|gopher://|http://|https://|\
irc://|ircs://|magnet:|mailto:|mms://|news:|nntp://|redis://|sftp://|sip:|sips:|sms:|ssh://|\
svn://|tel:|telnet://|urn:|worldwind://|xmpp:";

/// Characters that end a URL.
const URL_CHARS: &str = r#"[^\s\[\]<>"{}]"#;
const IPV6_HOST: &str = r"\[[0-9A-Fa-f:.]+\]";

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let url_tail = format!("(?:{IPV6_HOST}{URL_CHARS}*|{URL_CHARS}+)");
        let pattern = format!(
            r"(?i)\[(?P<burl>(?:{SCHEMES}|//){url_tail})(?P<text>[^\]\n]*)\]|\b(?P<url>(?:{SCHEMES}){url_tail})"
        );
        Regex::new(&pattern).expect("valid external link regex")
    })
}

fn url_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern =
            format!(r"(?i)^(?:{SCHEMES}|//)(?:{IPV6_HOST}{URL_CHARS}*|{URL_CHARS}+)");
        Regex::new(&pattern).expect("valid url regex")
    })
}

/// Trailing punctuation is not part of a bare URL.
fn trim_bare_url(url: &str) -> usize {
    let mut end = url.len();
    loop {
        let Some(last) = url[..end].chars().last() else {
            break;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' => true,
            ')' => !url[..end].contains('('),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    end
}

/// All external links in a shadow where comments are masked opaquely
/// (so a URL can run through a comment) and opaque tag bodies are hidden.
pub fn scan(shadow: &str) -> Vec<Range<usize>> {
    let re = link_regex();
    let mut found = Vec::new();
    for caps in re.captures_iter(shadow) {
        let Some(whole) = caps.get(0) else { continue };
        if caps.name("burl").is_some() {
            found.push(whole.range());
        } else if let Some(url) = caps.name("url") {
            let end = url.start() + trim_bare_url(url.as_str());
            // A scheme alone is not a link.
            if url_prefix_regex().is_match(&shadow[url.start()..end]) {
                found.push(url.start()..end);
            }
        }
    }
    found
}

/// The parts of an external link's own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtLinkParts {
    pub url: Range<usize>,
    pub text: Option<Range<usize>>,
    pub in_brackets: bool,
}

pub fn parse(shadow: &str) -> ExtLinkParts {
    if !shadow.starts_with('[') {
        return ExtLinkParts {
            url: 0..shadow.len(),
            text: None,
            in_brackets: false,
        };
    }
    let inner_end = if shadow.len() > 1 && shadow.ends_with(']') {
        shadow.len() - 1
    } else {
        shadow.len()
    };
    let url_len = url_prefix_regex()
        .find(&shadow[1..inner_end])
        .map_or(0, |m| m.end());
    let url = 1..1 + url_len;
    let rest = &shadow[url.end..inner_end];
    let text = if rest.is_empty() {
        None
    } else {
        let skipped = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        Some(url.end + skipped..inner_end)
    };
    ExtLinkParts {
        url,
        text,
        in_brackets: true,
    }
}
