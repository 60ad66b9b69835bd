//! Random edits: whatever discovery finds after a run of edits must match a
//! fresh parse of the resulting text.

use std::ops::Range;

use fastrand::Rng;
use pretty_assertions::assert_eq;
use wikispan_engine::{ConstructKind, WikiText};

const FRAGMENTS: &[&str] = &[
    "a", "bc", " ", "\n", "\n\n", "|", "=", ":", "é", "ü",
    "{{", "}}", "{{{", "}}}", "{", "}", "[[", "]]", "[", "]",
    "#if:", "x|y", "{{t|a=1}}", "[[l|t]]", "{{{p}}}",
    "<!--", "-->", "<!-- c -->",
    "<", ">", "<b>", "</b>", "<br/>", "<ref name=r>", "</ref>", "<nowiki>", "</nowiki>",
    "{|", "|}", "\n{|\n|x\n|}\n", "\n|-\n", "||",
    "http://e.org", "[http://e.org t]", "[//e.org]",
];

fn snap(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn random_text(rng: &mut Rng, pieces: usize) -> String {
    (0..pieces)
        .map(|_| FRAGMENTS[rng.usize(..FRAGMENTS.len())])
        .collect()
}

fn spans(page: &WikiText, kind: ConstructKind) -> Vec<Range<usize>> {
    page.children_of_type(kind)
        .iter()
        .filter_map(WikiText::span)
        .collect()
}

fn assert_matches_fresh_parse(page: &WikiText, kinds: &[ConstructKind], context: &str) {
    let fresh = WikiText::new(&page.text());
    for kind in kinds {
        assert_eq!(
            spans(page, *kind),
            spans(&fresh, *kind),
            "{kind} after {context} in {:?}",
            page.text()
        );
    }
}

/// Replace a random part of `view` with random fragments, in the view's own
/// offsets.
fn random_edit(rng: &mut Rng, view: &WikiText) -> String {
    let own = view.text();
    let a = snap(&own, rng.usize(..=own.len()));
    let b = snap(&own, rng.usize(..=own.len()));
    let (start, end) = (a.min(b), a.max(b));
    let end = if rng.bool() { start + (end - start).min(3) } else { end };
    let end = snap(&own, end);
    let len = rng.usize(..3);
    let inserted = random_text(rng, len);
    let described = format!("replacing {start}..{end} with {inserted:?}");
    // The range is on character boundaries, so this only fails for a view
    // an earlier edit detached.
    let _ = view.replace(start as isize..end as isize, &inserted);
    described
}

fn random_view(rng: &mut Rng, page: &WikiText) -> WikiText {
    if rng.usize(..4) > 0 {
        return page.clone();
    }
    let kind = ConstructKind::GLOBAL[rng.usize(..ConstructKind::GLOBAL.len())];
    let mut views = page.children_of_type(kind);
    if views.is_empty() {
        page.clone()
    } else {
        views.swap_remove(rng.usize(..views.len()))
    }
}

#[test]
fn incremental_discovery_matches_a_fresh_parse() {
    for seed in 0..300 {
        let mut rng = Rng::with_seed(seed);
        let len = rng.usize(4..16);
        let text = random_text(&mut rng, len);
        let page = WikiText::new(&text);
        assert_matches_fresh_parse(&page, &ConstructKind::GLOBAL, &format!("seed {seed}"));

        for step in 0..20 {
            let view = random_view(&mut rng, &page);
            let edit = random_edit(&mut rng, &view);
            let context = format!("seed {seed} step {step}: {edit}");
            // Let edits pile up between queries, and query kinds in any order.
            if rng.usize(..3) == 0 {
                let mut kinds = ConstructKind::GLOBAL.to_vec();
                rng.shuffle(&mut kinds);
                kinds.truncate(rng.usize(1..=kinds.len()));
                assert_matches_fresh_parse(&page, &kinds, &context);
            }
        }
        assert_matches_fresh_parse(&page, &ConstructKind::GLOBAL, &format!("seed {seed}"));
    }
}

#[test]
fn edits_around_blocking_brackets_match_a_fresh_parse() {
    let cases: &[(&str, Range<isize>, &str)] = &[
        ("{{a\n[[\n}}", 4..6, ""),
        ("{{a|[[b}}\nx", 7..7, "]]"),
        ("x\n{{a\n\ny}}", 0..0, "{{"),
        ("{{a\n<!--\n[[\n-->\n}}", 4..8, ""),
        ("[[a\n{{b\n]]\n}}", 4..6, "{{{"),
        ("<nowiki>\n{{a\n</nowiki>\n}}", 0..8, ""),
    ];
    for (text, range, inserted) in cases {
        let page = WikiText::new(text);
        assert_matches_fresh_parse(&page, &ConstructKind::GLOBAL, "parsing");
        page.replace(range.clone(), inserted).unwrap();
        assert_matches_fresh_parse(&page, &ConstructKind::GLOBAL, &format!("editing {text:?}"));
    }
}
