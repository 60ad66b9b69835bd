//! Builds a lossless Rowan tree from recognized construct ranges.
//!
//! Ranges that cross an already opened node (possible between independently
//! recognized kinds, e.g. `<b>[[a</b>]]`) are left out; the tree keeps
//! strict nesting and always reproduces the text byte for byte.

use rowan::GreenNodeBuilder;

use crate::kind::Found;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

struct TreeSink<'a> {
    builder: GreenNodeBuilder<'static>,
    text: &'a str,
    pos: usize,
}

impl TreeSink<'_> {
    fn text_until(&mut self, end: usize) {
        if end > self.pos {
            self.builder
                .token(SyntaxKind::TEXT.into(), &self.text[self.pos..end]);
            self.pos = end;
        }
    }
}

/// Build the tree of `text` with one node per (properly nested) construct.
pub fn build_tree(text: &str, constructs: &[Found]) -> SyntaxNode {
    let mut sorted: Vec<&Found> = constructs.iter().collect();
    sorted.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
            .then(a.kind.cmp(&b.kind))
    });

    let mut sink = TreeSink {
        builder: GreenNodeBuilder::new(),
        text,
        pos: 0,
    };
    sink.builder.start_node(SyntaxKind::ROOT.into());
    let mut open: Vec<usize> = Vec::new();

    for found in sorted {
        let range = found.range.start.min(text.len())..found.range.end.min(text.len());
        if range.is_empty() || range.start < sink.pos {
            continue;
        }
        while let Some(&end) = open.last() {
            if end > range.start {
                break;
            }
            sink.text_until(end);
            sink.builder.finish_node();
            open.pop();
        }
        if open.last().is_some_and(|&end| range.end > end) {
            continue;
        }
        sink.text_until(range.start);
        sink.builder.start_node(SyntaxKind::from(found.kind).into());
        open.push(range.end);
    }

    while let Some(end) = open.pop() {
        sink.text_until(end);
        sink.builder.finish_node();
    }
    sink.text_until(text.len());
    sink.builder.finish_node();
    SyntaxNode::new_root(sink.builder.finish())
}

/// Render a tree one element per line, for debugging and snapshots.
pub fn format_tree(node: &SyntaxNode) -> String {
    fn walk(node: &SyntaxNode, indent: usize, out: &mut String) {
        let prefix = "  ".repeat(indent);
        out.push_str(&format!("{}{:?}@{:?}\n", prefix, node.kind(), node.text_range()));
        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => walk(&n, indent + 1, out),
                rowan::NodeOrToken::Token(t) => {
                    let text = t.text().replace('\n', "\\n");
                    out.push_str(&format!("{}  {:?} {:?}\n", prefix, t.kind(), text));
                }
            }
        }
    }
    let mut out = String::new();
    walk(node, 0, &mut out);
    out
}
