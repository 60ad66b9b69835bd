//! End-to-end checks of the recognizers over standalone texts.

use pretty_assertions::assert_eq;
use rstest::rstest;
use wikispan_syntax::{
    ConstructKind, Layers, OpaqueTags, Purpose, ext_link, lists, sections, tables,
};

fn layers(text: &str) -> Layers {
    Layers::scan(text, &OpaqueTags::default())
}

#[rstest]
#[case("{{a<!-- }} -->}}", vec!["{{a<!-- }} -->}}"])]
#[case("<nowiki>{{a}}</nowiki>", vec![])]
#[case("<ref>{{a}}</ref>", vec!["{{a}}"])]
#[case("{{a|{{b}}}}", vec!["{{a|{{b}}}}", "{{b}}"])]
fn templates_respect_opaque_layers(#[case] text: &str, #[case] expected: Vec<&str>) {
    let found: Vec<_> = layers(text)
        .brackets_of(ConstructKind::Template)
        .map(|r| &text[r.clone()])
        .collect();
    assert_eq!(found, expected);
}

#[rstest]
#[case("[http://example.com/foo<!-- comment -->bar]", "[http://example.com/foo<!-- comment -->bar]")]
#[case("[http://example<!-- c -->.com t]", "[http://example<!-- c -->.com t]")]
fn urls_run_through_comments(#[case] text: &str, #[case] expected: &str) {
    let found = ext_link::scan(&layers(text).shadow(text, Purpose::ExternalLinks));
    assert_eq!(found.len(), 1);
    assert_eq!(&text[found[0].clone()], expected);
}

#[test]
fn comment_before_table_start() {
    let text = " <!-- c -->::{|class=wikitable\n|a\n|}";
    let found = tables::scan(&layers(text).shadow(text, Purpose::Tables));
    assert_eq!(found.len(), 1);
    assert!(text[found[0].clone()].starts_with("{|class"));
}

#[test]
fn commented_table_end_is_ignored() {
    let text = "{|\n|a \n<!-- \n|} \n-->\n|b\n|}";
    let found = tables::scan(&layers(text).shadow(text, Purpose::Tables));
    assert_eq!(found, vec![0..text.len()]);
}

#[test]
fn template_newline_does_not_end_table_head() {
    let text = "{| class=wikitable |b style=\"color: {{text| 1 =\nred}};\"\n| cell\n|}\n";
    let table_end = text.len() - 1;
    let own = &text[..table_end];
    let layout = tables::layout(&layers(own).shadow(own, Purpose::Parts));
    assert!(own[layout.attrs.clone()].ends_with("red}};\""));
    assert_eq!(layout.rows.len(), 1);
}

#[test]
fn multiline_markup_does_not_break_list_items() {
    let text = "#1<br\n/>{{note}}\n#2<s\n>s</s\n>\n#3";
    let shadow = layers(text).shadow(text, Purpose::Lists);
    let found = lists::scan(&shadow, 0..text.len());
    assert_eq!(found, vec![0..text.len()]);
    let parts = lists::parse(&shadow);
    let items: Vec<_> = parts.items.iter().map(|r| &text[r.clone()]).collect();
    assert_eq!(items, vec!["1<br\n/>{{note}}", "2<s\n>s</s\n>", "3"]);
}

#[test]
fn headings_inside_comments_are_ignored() {
    let text = "a\n<!--\n== x ==\n-->\n== y ==\n";
    let shadow = layers(text).shadow(text, Purpose::Sections);
    let scan = sections::scan(&shadow, 0..text.len());
    assert_eq!(scan.headings.len(), 1);
    assert_eq!(&text[scan.headings[0].title.clone()], " y ");
}
