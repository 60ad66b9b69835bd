//! Comments and tags.

use std::ops::Range;

use wikispan_syntax::{ConstructKind, Purpose, comment, tag};

use super::attributes::{AttrRegion, HasAttributes};
use super::{own_shadow, typed_view};
use crate::{EditError, WikiText};

typed_view!(
    /// `<!-- ... -->`.
    Comment,
    ConstructKind::Comment,
    standalone
);

typed_view!(
    /// An HTML or extension tag with its contents.
    Tag,
    ConstructKind::Tag,
    standalone
);

impl Comment {
    /// The text between `<!--` and `-->`.
    pub fn contents(&self) -> String {
        let text = self.text();
        text[comment::contents(&text)].to_owned()
    }
}

impl Tag {
    fn parts(&self) -> Option<(String, String, tag::TagParts)> {
        let (text, shadow, _) = own_shadow(self, Purpose::Tags);
        let parts = tag::parse(&shadow)?;
        Some((text, shadow, parts))
    }

    /// The tag name as written.
    pub fn name(&self) -> String {
        self.parts()
            .map(|(text, _, parts)| text[parts.name].to_owned())
            .unwrap_or_default()
    }

    /// Text between the start and end tag; `None` without an end tag.
    pub fn contents(&self) -> Option<String> {
        let (text, _, parts) = self.parts()?;
        parts.contents.map(|range| text[range].to_owned())
    }

    /// Replace the contents, adding an end tag if there is none.
    pub fn set_contents(&self, contents: &str) -> Result<(), EditError> {
        let Some((text, _, parts)) = self.parts() else {
            return Err(EditError::Detached);
        };
        let name = &text[parts.name.clone()];
        match parts.contents {
            Some(range) => self.splice_local(range, contents),
            None if parts.self_closing => self.splice_local(
                parts.attrs.end..parts.start_tag.end,
                &format!(">{contents}</{name}>"),
            ),
            None => {
                let at = parts.start_tag.end;
                self.splice_local(at..at, &format!("{contents}</{name}>"))
            }
        }
    }

    pub fn is_self_closing(&self) -> bool {
        self.parts().is_some_and(|(_, _, parts)| parts.self_closing)
    }
}

impl HasAttributes for Tag {
    fn attr_owner(&self) -> &WikiText {
        self
    }

    fn attr_region(&self) -> AttrRegion {
        match self.parts() {
            Some((text, shadow, parts)) => AttrRegion {
                text,
                shadow,
                range: parts.attrs,
                missing: false,
            },
            None => AttrRegion {
                text: String::new(),
                shadow: String::new(),
                range: Range::default(),
                missing: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comment_contents() {
        assert_eq!(Comment::new("<!-- c -->").contents(), " c ");
        assert_eq!(Comment::new("<!-- open").contents(), " open");
        let wt = WikiText::new("a<!--b-->c");
        assert_eq!(wt.comments()[0].contents(), "b");
    }

    #[test]
    fn tag_parts() {
        let tag = Tag::new(r#"<ref name="a">x</ref>"#);
        assert_eq!(tag.name(), "ref");
        assert_eq!(tag.contents().as_deref(), Some("x"));
        assert_eq!(tag.get_attr("name").as_deref(), Some("a"));
        assert!(!tag.is_self_closing());
        tag.set_contents("yz").unwrap();
        assert_eq!(tag.text(), r#"<ref name="a">yz</ref>"#);
    }

    #[test]
    fn tag_attributes() {
        let tag = Tag::new("<span a=1 b>x</span>");
        assert_eq!(
            tag.attrs(),
            vec![("a".to_owned(), "1".to_owned()), ("b".to_owned(), String::new())]
        );
        assert!(tag.has_attr("b"));
        tag.set_attr("a", "2").unwrap();
        tag.del_attr("b").unwrap();
        tag.set_attr("c", "3").unwrap();
        assert_eq!(tag.text(), r#"<span a="2" c="3">x</span>"#);
    }

    #[test]
    fn self_closing_tags_open_up() {
        let tag = Tag::new("<ref name=a/>");
        assert!(tag.is_self_closing());
        assert_eq!(tag.contents(), None);
        tag.set_contents("c").unwrap();
        assert_eq!(tag.text(), "<ref name=a>c</ref>");
    }

    #[test]
    fn get_tags_by_name() {
        let wt = WikiText::new("<b>1</b><ref>2</ref><B>3</B>");
        let bold: Vec<String> = wt.get_tags("b").iter().map(|t| t.text()).collect();
        assert_eq!(bold, vec!["<b>1</b>", "<B>3</B>"]);
    }
}
