//! Raw comment text → [`Javadoc`].
//!
//! Input is the text between `/**` and `*/`. Each line loses its leading
//! whitespace and `*` margin; the first line starting with `@` opens the block
//! tag section, everything before it is the description.

use crate::{BlockTag, Javadoc};
use regex::Regex;
use std::sync::LazyLock;

/// Comment content marking an element as intentionally undocumented.
pub const EMPTY_SENTINEL: &str = "empty";

static RE_BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@([^\s{}]+)(?:\s(.*))?$").unwrap());

/// Parse comment content. Returns `None` for the `empty` sentinel and for
/// comments with neither description nor tags.
pub fn parse_comment(content: &str) -> Option<Javadoc> {
    if content == EMPTY_SENTINEL {
        return None;
    }

    let lines = clean_lines(content);
    let mut description: Vec<&str> = Vec::new();
    let mut blocks: Vec<(String, Vec<String>)> = Vec::new();

    for line in &lines {
        if let Some(caps) = RE_BLOCK_TAG.captures(line) {
            let first = caps.get(2).map_or("", |m| m.as_str());
            blocks.push((caps[1].to_string(), vec![first.to_string()]));
        } else if let Some((_, body)) = blocks.last_mut() {
            body.push(line.clone());
        } else {
            description.push(line);
        }
    }

    let description_text = description.join("\n");
    let description_text = description_text.trim();
    let description = if description_text.is_empty() {
        Vec::new()
    } else {
        description_text.split('\n').map(str::to_string).collect()
    };

    let tags = blocks
        .into_iter()
        .map(|(tag, body)| BlockTag::new(&tag, &body.join("\n")))
        .collect();

    let javadoc = Javadoc::new(description, tags);
    if javadoc.is_empty() {
        None
    } else {
        Some(javadoc)
    }
}

/// Strip the `*` margin, blank out whitespace-only lines and drop empty lines
/// at both ends.
fn clean_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content
        .lines()
        .map(strip_margin)
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.to_string()
            }
        })
        .collect();

    if let Some(first) = lines.first_mut() {
        if first.starts_with([' ', '\t']) {
            first.remove(0);
        }
    }

    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines.drain(end..);
    lines.drain(..start);
    lines
}

fn strip_margin(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix([' ', '\t']).unwrap_or(rest),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_discarded() {
        assert_eq!(parse_comment("empty"), None);
    }

    #[test]
    fn sentinel_must_match_exactly() {
        let doc = parse_comment(" empty ").unwrap();
        assert_eq!(doc.description, vec!["empty"]);
    }

    #[test]
    fn blank_comment_is_discarded() {
        assert_eq!(parse_comment("\n     *\n     "), None);
        assert_eq!(parse_comment(""), None);
    }

    #[test]
    fn single_line_comment() {
        let doc = parse_comment(" Does X. ").unwrap();
        assert_eq!(doc.description, vec!["Does X."]);
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn multi_line_description_and_tags() {
        let content = "\n     * Runs it.\n     *\n     * Second paragraph.\n     *\n     * @param x the x\n     * @return none\n     ";
        let doc = parse_comment(content).unwrap();
        assert_eq!(doc.description, vec!["Runs it.", "", "Second paragraph."]);
        assert_eq!(doc.tags.len(), 2);
        assert_eq!(doc.tags[0].key(), "param x");
        assert_eq!(doc.tags[0].content, "the x");
        assert_eq!(doc.tags[1].key(), "return");
        assert_eq!(doc.tags[1].content, "none");
    }

    #[test]
    fn tag_continuation_lines() {
        let content = "\n * @param value first line\n *        continued here\n * @since 1.2\n ";
        let doc = parse_comment(content).unwrap();
        assert!(doc.description.is_empty());
        assert_eq!(doc.tags[0].content, "first line\n       continued here");
        assert!(doc.tags[0].is_multiline());
        assert_eq!(doc.tags[1].key(), "since");
    }

    #[test]
    fn inline_tags_stay_in_description() {
        let doc = parse_comment("\n * Uses {@link Other} and {@code x}.\n ").unwrap();
        assert_eq!(doc.description, vec!["Uses {@link Other} and {@code x}."]);
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn tag_without_content() {
        let doc = parse_comment("\n * Old.\n * @deprecated\n ").unwrap();
        assert_eq!(doc.tags[0].tag, "deprecated");
        assert_eq!(doc.tags[0].content, "");
    }

    #[test]
    fn repeated_tags_keep_order() {
        let doc = parse_comment("\n * @see A\n * @see B\n ").unwrap();
        let seen: Vec<_> = doc.tags.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(seen, vec!["A", "B"]);
    }
}
