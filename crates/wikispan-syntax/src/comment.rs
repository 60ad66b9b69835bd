//! HTML comments: `<!--` up to the next `-->`, or to the end of the text.

use std::ops::Range;

use crate::shadow::inner_range;

pub const OPEN: &str = "<!--";
pub const CLOSE: &str = "-->";

/// All comments in `text`, in order. Comments never nest.
pub fn scan(text: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(OPEN) {
        let start = pos + rel;
        let body = start + OPEN.len();
        let end = match text[body..].find(CLOSE) {
            Some(close) => body + close + CLOSE.len(),
            None => text.len(),
        };
        found.push(start..end);
        pos = end;
    }
    found
}

/// Whether a comment's own text ends with its closing delimiter.
pub fn is_closed(comment: &str) -> bool {
    comment.len() >= OPEN.len() + CLOSE.len() && comment.ends_with(CLOSE)
}

/// The contents between the delimiters of a comment's own text.
pub fn contents(comment: &str) -> Range<usize> {
    let start = inner_range(comment, OPEN.len(), 0).start;
    let end = if comment.len() >= start + CLOSE.len() && comment.ends_with(CLOSE) {
        comment.len() - CLOSE.len()
    } else {
        comment.len()
    };
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a<!-- b -->c", vec![1..11])]
    #[case("<!---->", vec![0..7])]
    #[case("<!-- unterminated", vec![0..17])]
    #[case("<!--a--><!--b-->", vec![0..8, 8..16])]
    #[case("no comments -->", vec![])]
    fn scan_comments(#[case] text: &str, #[case] expected: Vec<Range<usize>>) {
        assert_eq!(scan(text), expected);
    }

    #[rstest]
    #[case("<!-- c -->", " c ")]
    #[case("<!---->", "")]
    #[case("<!-- open", " open")]
    #[case("aéé", "")]
    fn comment_contents(#[case] comment: &str, #[case] expected: &str) {
        assert_eq!(&comment[contents(comment)], expected);
    }

    #[rstest]
    #[case("<!-- c -->", true)]
    #[case("<!---->", true)]
    #[case("<!-->", false)]
    #[case("<!-- open", false)]
    fn closed_comments(#[case] comment: &str, #[case] expected: bool) {
        assert_eq!(is_closed(comment), expected);
    }
}
