//! [`Javadoc`] → comment text.

use crate::{BlockTag, Javadoc};

impl Javadoc {
    /// Body lines of the comment, without the `*` margin.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.description.clone();
        if !self.description.is_empty() && !self.tags.is_empty() {
            lines.push(String::new());
        }
        for tag in &self.tags {
            lines.extend(tag_lines(tag));
        }
        lines
    }

    /// Render as a `/** ... */` block. `indent` prefixes every line after the
    /// first, so the result can be placed at a column that already carries it.
    /// Lines end with `newline` (`"\n"` or `"\r\n"`).
    pub fn to_comment(&self, indent: &str, newline: &str) -> String {
        let mut out = String::from("/**");
        out.push_str(newline);
        for line in self.to_lines() {
            out.push_str(indent);
            if line.is_empty() {
                out.push_str(" *");
            } else {
                out.push_str(" * ");
                out.push_str(&line);
            }
            out.push_str(newline);
        }
        out.push_str(indent);
        out.push_str(" */");
        out
    }
}

fn tag_lines(tag: &BlockTag) -> Vec<String> {
    let mut head = format!("@{}", tag.tag);
    if let Some(name) = &tag.name {
        head.push(' ');
        head.push_str(name);
    }

    let mut lines = tag.lines();
    let first = lines.next().unwrap_or("");
    if !first.is_empty() {
        head.push(' ');
        head.push_str(first);
    }

    let mut out = vec![head];
    out.extend(lines.map(str::to_string));
    out
}
