//! Wikilinks and external links.

use std::ops::Range;

use wikispan_syntax::{ConstructKind, Purpose, brackets, ext_link};

use super::{own_shadow, typed_view};
use crate::EditError;

typed_view!(
    /// `[[target|text]]`.
    WikiLink,
    ConstructKind::WikiLink,
    standalone
);

typed_view!(
    /// `[url text]` or a bare URL.
    ExternalLink,
    ConstructKind::ExternalLink,
    standalone
);

impl WikiLink {
    fn parts(&self) -> (String, brackets::LinkParts) {
        let (text, shadow, _) = own_shadow(self, Purpose::Parts);
        let parts = brackets::split_wikilink(&shadow);
        (text, parts)
    }

    pub fn target(&self) -> String {
        let (text, parts) = self.parts();
        text[parts.target].to_owned()
    }

    pub fn set_target(&self, target: &str) -> Result<(), EditError> {
        self.splice_local(self.parts().1.target, target)
    }

    /// The text after the first `|`, if any.
    pub fn display_text(&self) -> Option<String> {
        let (text, parts) = self.parts();
        parts.text.map(|range| text[range].to_owned())
    }

    /// Replace the display text; `None` removes it together with its `|`.
    pub fn set_display_text(&self, display: Option<&str>) -> Result<(), EditError> {
        let (_, parts) = self.parts();
        match (parts.text, display) {
            (Some(range), Some(display)) => self.splice_local(range, display),
            (Some(range), None) => self.splice_local(range.start - 1..range.end, ""),
            (None, Some(display)) => {
                let at = parts.target.end;
                self.splice_local(at..at, &format!("|{display}"))
            }
            (None, None) => Ok(()),
        }
    }
}

impl ExternalLink {
    fn parts(&self) -> (String, ext_link::ExtLinkParts) {
        let (text, shadow, _) = own_shadow(self, Purpose::ExternalLinks);
        let parts = ext_link::parse(&shadow);
        (text, parts)
    }

    pub fn url(&self) -> String {
        let (text, parts) = self.parts();
        text[parts.url].to_owned()
    }

    pub fn set_url(&self, url: &str) -> Result<(), EditError> {
        self.splice_local(self.parts().1.url, url)
    }

    pub fn display_text(&self) -> Option<String> {
        let (text, parts) = self.parts();
        parts.text.map(|range| text[range].to_owned())
    }

    /// Replace the display text. `None` removes it; giving a bare URL a
    /// display text puts it in brackets.
    pub fn set_display_text(&self, display: Option<&str>) -> Result<(), EditError> {
        let (text, parts) = self.parts();
        let inner_end = |url: &Range<usize>| {
            if text.len() > url.end && text.ends_with(']') {
                text.len() - 1
            } else {
                text.len()
            }
        };
        match (parts.in_brackets, parts.text, display) {
            (true, Some(range), Some(display)) => self.splice_local(range, display),
            (true, Some(_), None) => {
                let end = inner_end(&parts.url);
                self.splice_local(parts.url.end..end, "")
            }
            (true, None, Some(display)) => {
                let at = parts.url.end;
                self.splice_local(at..at, &format!(" {display}"))
            }
            (false, _, Some(display)) => {
                let url = &text[parts.url];
                self.splice_local(0..text.len(), &format!("[{url} {display}]"))
            }
            (_, _, None) => Ok(()),
        }
    }

    pub fn in_brackets(&self) -> bool {
        self.parts().1.in_brackets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WikiText;
    use pretty_assertions::assert_eq;

    #[test]
    fn wikilink_parts() {
        let link = WikiLink::new("[[a|b]]");
        assert_eq!(link.target(), "a");
        assert_eq!(link.display_text().as_deref(), Some("b"));
        link.set_target("c").unwrap();
        link.set_display_text(Some("d")).unwrap();
        assert_eq!(link.text(), "[[c|d]]");
        link.set_display_text(None).unwrap();
        assert_eq!(link.text(), "[[c]]");
        link.set_display_text(Some("e")).unwrap();
        assert_eq!(link.text(), "[[c|e]]");
    }

    #[test]
    fn pipes_inside_templates_do_not_split_the_link() {
        let link = WikiLink::new("[[a{{b|c}}|d]]");
        assert_eq!(link.target(), "a{{b|c}}");
        assert_eq!(link.display_text().as_deref(), Some("d"));
    }

    #[test]
    fn external_link_parts() {
        let link = ExternalLink::new("[http://a.b c d]");
        assert!(link.in_brackets());
        assert_eq!(link.url(), "http://a.b");
        assert_eq!(link.display_text().as_deref(), Some("c d"));
        link.set_url("https://x.y").unwrap();
        link.set_display_text(Some("e")).unwrap();
        assert_eq!(link.text(), "[https://x.y e]");
        link.set_display_text(None).unwrap();
        assert_eq!(link.text(), "[https://x.y]");
        link.set_display_text(Some("f")).unwrap();
        assert_eq!(link.text(), "[https://x.y f]");
    }

    #[test]
    fn bare_links_gain_brackets() {
        let link = ExternalLink::new("http://a.b");
        assert!(!link.in_brackets());
        assert_eq!(link.display_text(), None);
        link.set_display_text(Some("t")).unwrap();
        assert_eq!(link.text(), "[http://a.b t]");
        assert!(link.in_brackets());
    }

    #[test]
    fn insertion_before_a_link_keeps_the_view() {
        let wt = WikiText::new("text1 [http://a.b link] text2");
        let link = wt.external_links().remove(0);
        wt.insert(0, "t [http://a.a a]").unwrap();
        assert_eq!(link.text(), "[http://a.b link]");
        assert_eq!(wt.external_links()[1], link);
        link.delete().unwrap();
        assert_eq!(wt.text(), "t [http://a.a a]text1  text2");
    }

    #[test]
    fn double_brackets_around_a_url_are_an_external_link() {
        let wt = WikiText::new("[[http://example.com foo bar]]");
        assert!(wt.wikilinks().is_empty());
        let link = wt.external_links().remove(0);
        assert_eq!(link.text(), "[http://example.com foo bar]");
        assert_eq!(link.display_text().as_deref(), Some("foo bar"));
    }
}
