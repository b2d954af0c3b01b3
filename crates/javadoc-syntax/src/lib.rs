//! Javadoc comment syntax.
//!
//! A structured comment is an ordered list of description lines followed by an
//! ordered list of block tags (`@param`, `@return`, ...). This crate parses the
//! raw text found between `/**` and `*/`, renders a structured comment back to
//! comment text, and owns the JSON shape used by sidecar files.

mod json;
mod parse;
mod render;

pub use parse::{parse_comment, EMPTY_SENTINEL};

/// Tags whose first content word is an argument name (`@param name text`).
const NAMED_TAGS: &[&str] = &["param", "throws", "exception"];

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Javadoc {
    pub description: Vec<String>,
    pub tags: Vec<BlockTag>,
}

impl Javadoc {
    pub fn new(description: Vec<String>, tags: Vec<BlockTag>) -> Self {
        Self { description, tags }
    }

    /// A comment with no description and no tags carries nothing worth keeping.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.tags.is_empty()
    }
}

/// A single `@tag` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTag {
    /// Tag name without the `@`.
    pub tag: String,
    /// Argument name for `param`/`throws`/`exception`.
    pub name: Option<String>,
    /// Tag text, possibly spanning several lines.
    pub content: String,
}

impl BlockTag {
    /// Build a tag from its name and raw content, splitting off the argument
    /// name for tags that carry one.
    pub fn new(tag: &str, content: &str) -> Self {
        let content = content.trim();
        if NAMED_TAGS.contains(&tag) && !content.is_empty() {
            let (name, rest) = match content.split_once(char::is_whitespace) {
                Some((name, rest)) => (name, rest.trim_start()),
                None => (content, ""),
            };
            return Self {
                tag: tag.to_string(),
                name: Some(name.to_string()),
                content: rest.to_string(),
            };
        }
        Self {
            tag: tag.to_string(),
            name: None,
            content: content.to_string(),
        }
    }

    /// Sidecar key: `"param x"` for named tags, `"return"` otherwise.
    pub fn key(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.tag, name),
            None => self.tag.clone(),
        }
    }

    /// Inverse of [`BlockTag::key`].
    pub fn from_key(key: &str, content: String) -> Self {
        let (tag, name) = match key.split_once(' ') {
            Some((tag, name)) => (tag.to_string(), Some(name.to_string())),
            None => (key.to_string(), None),
        };
        Self { tag, name, content }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub fn is_multiline(&self) -> bool {
        self.content.contains('\n')
    }
}
