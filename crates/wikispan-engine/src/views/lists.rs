//! Lists of `*`, `#`, `:` and `;` lines.

use std::ops::Range;

use wikispan_syntax::{ConstructKind, Purpose, lists};

use super::{nested_brackets, own_shadow, typed_view};
use crate::WikiText;
use crate::discovery::{self, ScopedScan};

typed_view!(
    /// A run of list lines sharing one marker group.
    WikiList,
    ConstructKind::List,
    standalone
);

pub(crate) fn scan_lists(view: &WikiText) -> Vec<WikiList> {
    let Some(span) = view.span() else {
        return Vec::new();
    };
    let (text, shadow, layers) = own_shadow(view, Purpose::Lists);
    let found: Vec<Range<usize>> = lists::scan(&shadow, 0..text.len())
        .into_iter()
        .map(|r| span.start + r.start..span.start + r.end)
        .collect();
    // Lists inside templates belong to the template's own scans.
    let foreign = nested_brackets(&layers, text.len(), span.start);
    let ids = discovery::reconcile_scoped(
        &mut view.document().borrow_mut(),
        &ScopedScan {
            kind: ConstructKind::List,
            region: span,
            found: &found,
            valid: &[],
            foreign: &foreign,
        },
    );
    ids.into_iter()
        .map(|id| WikiList::from_view(view.sibling(id)))
        .collect()
}

impl WikiList {
    fn item_ranges(&self) -> (String, lists::ListParts) {
        let (text, shadow, _) = own_shadow(self, Purpose::Lists);
        let parts = lists::parse(&shadow);
        (text, parts)
    }

    /// First-level items without their markers.
    pub fn items(&self) -> Vec<String> {
        let (text, parts) = self.item_ranges();
        parts.items.into_iter().map(|r| text[r].to_owned()).collect()
    }

    /// First-level items with their markers.
    pub fn fullitems(&self) -> Vec<String> {
        let (text, parts) = self.item_ranges();
        parts.fullitems.into_iter().map(|r| text[r].to_owned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn marker_groups_make_separate_lists() {
        let lists = WikiText::new("*a\n;c:d\n#b").lists();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[1].items(), vec!["c", "d"]);
        assert_eq!(lists[1].fullitems(), vec![";c", ":d"]);
    }

    #[test]
    fn multiline_tags_do_not_end_items() {
        let lists = WikiText::new("#1<br\n/>{{note}}\n#2<s\n>s</s\n>\n#3").lists();
        assert_eq!(
            lists[0].items(),
            vec!["1<br\n/>{{note}}", "2<s\n>s</s\n>", "3"]
        );
        let broken = WikiText::new("#1<br/\n>\n#2<abc\n>\n#3").lists();
        assert_eq!(broken[0].items().len(), 2);
    }

    #[test]
    fn lists_in_templates_survive_document_scans() {
        let wt = WikiText::new("{{t|\n* a\n* b\n}}\n* c");
        let template = wt.templates().remove(0);
        let inner = template.lists().remove(0);
        assert_eq!(inner.items(), vec![" a", " b"]);
        let outer = wt.lists();
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].text(), "* c");
        assert!(!inner.is_detached());
    }
}
