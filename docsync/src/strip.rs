//! Remove every javadoc comment from a source file.

use crate::syntax::JavaSource;
use std::ops::Range;

/// Text of `source` without javadoc comments, or `None` if it has none.
/// A comment alone on its lines takes those lines with it.
pub fn strip(source: &JavaSource) -> Option<String> {
    let comments = source.javadoc_comments();
    if comments.is_empty() {
        return None;
    }

    let mut text = source.text().to_string();
    for comment in comments.iter().rev() {
        let range = removal_range(source.text(), comment.range.clone());
        text.replace_range(range, "");
    }
    Some(text)
}

fn removal_range(text: &str, comment: Range<usize>) -> Range<usize> {
    let line_start = text[..comment.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[comment.end..]
        .find('\n')
        .map_or(text.len(), |i| comment.end + i + 1);

    let before = &text[line_start..comment.start];
    let after = &text[comment.end..line_end];
    if before.trim().is_empty() && after.trim().is_empty() {
        line_start..line_end
    } else {
        comment
    }
}
