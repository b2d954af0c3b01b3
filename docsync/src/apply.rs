//! Document model → javadoc comments in a source file.
//!
//! Only comment text is touched: an existing javadoc is replaced in place,
//! otherwise the rendered comment is inserted on its own line before the
//! declaration, at the declaration's indentation.

use crate::error::Result;
use crate::model::{DocInfo, PackageInfo};
use crate::resolve::TypeResolver;
use crate::syntax::JavaSource;
use crate::walker::{self, Declaration, DeclarationVisitor, Element};
use javadoc_syntax::Javadoc;
use std::ops::Range;
use tree_sitter::Node;

struct Edit {
    range: Range<usize>,
    text: String,
}

/// Apply `docs` to `source`. Returns the new text, or `None` when nothing
/// changed.
pub fn apply(
    source: &JavaSource,
    resolver: &dyn TypeResolver,
    docs: &DocInfo,
) -> Result<Option<String>> {
    let mut applier = Applier {
        docs,
        edits: Vec::new(),
    };
    walker::walk(source, resolver, &mut applier)?;
    Ok(finish(source, applier.edits))
}

/// Apply package documentation to a `package-info.java` file.
pub fn apply_package(source: &JavaSource, info: &PackageInfo) -> Option<String> {
    let javadoc = info.javadoc.as_ref().filter(|j| !j.is_empty())?;
    let decl = source.package_declaration()?;
    finish(source, vec![edit_for(source, decl, javadoc)])
}

struct Applier<'d> {
    docs: &'d DocInfo,
    edits: Vec<Edit>,
}

impl DeclarationVisitor for Applier<'_> {
    fn visit(&mut self, source: &JavaSource, decl: &Declaration<'_>) -> Result<()> {
        let Some(class) = self.docs.class(decl.class.as_str()) else {
            return Ok(());
        };
        let javadoc = match &decl.element {
            Element::Class => class.javadoc.as_ref(),
            Element::Field(_) | Element::Method { .. } => decl
                .member_key()
                .and_then(|key| class.member_doc(&key)),
        };
        let Some(javadoc) = javadoc.filter(|j| !j.is_empty()) else {
            return Ok(());
        };

        tracing::debug!(class = %decl.class, "applying javadoc to {}", decl.label);
        self.edits.push(edit_for(source, decl.node, javadoc));
        Ok(())
    }
}

fn edit_for(source: &JavaSource, node: Node, javadoc: &Javadoc) -> Edit {
    let start = node.start_byte();
    let indent = source.line_indent(start);
    let newline = source.line_ending();
    let comment = javadoc.to_comment(indent, newline);
    match source.javadoc_before(node) {
        Some(existing) => Edit {
            range: existing.range,
            text: comment,
        },
        None => Edit {
            range: start..start,
            text: format!("{comment}{newline}{indent}"),
        },
    }
}

fn finish(source: &JavaSource, mut edits: Vec<Edit>) -> Option<String> {
    if edits.is_empty() {
        return None;
    }
    edits.sort_by_key(|e| std::cmp::Reverse(e.range.start));

    let mut text = source.text().to_string();
    for edit in edits {
        text.replace_range(edit.range, &edit.text);
    }
    (text != source.text()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, extract_package};
    use crate::resolve::{SourceResolver, TypeIndex};
    use crate::strip::strip;

    fn docs_of(text: &str) -> DocInfo {
        let source = JavaSource::parse(text).unwrap();
        let index = TypeIndex::with_jdk();
        extract(&source, &SourceResolver::new(&index, &source)).unwrap()
    }

    fn apply_to(text: &str, docs: &DocInfo) -> Option<String> {
        let source = JavaSource::parse(text).unwrap();
        let index = TypeIndex::with_jdk();
        apply(&source, &SourceResolver::new(&index, &source), docs).unwrap()
    }

    const DOCUMENTED: &str = r#"package pkg;

import java.util.List;

/**
 * Does X.
 */
public class A {
    /**
     * Items.
     */
    private List<String> items;

    /**
     * Runs it.
     *
     * @return none
     */
    @Deprecated
    public void run() {}

    /**
     * Adds.
     *
     * @param x the value
     * @throws IllegalStateException when full
     */
    public void add(int x) {}

    public void add(String s) {}

    enum Mode {
        /**
         * Fast.
         */
        FAST,
        SLOW
    }

    Runnable task = new Runnable() {
        /**
         * Anonymous run.
         */
        public void run() {}
    };
}
"#;

    #[test]
    fn round_trips_through_strip() {
        let docs = docs_of(DOCUMENTED);
        let stripped = strip(&JavaSource::parse(DOCUMENTED).unwrap()).unwrap();
        assert!(!stripped.contains("/**"));
        assert_eq!(apply_to(&stripped, &docs).unwrap(), DOCUMENTED);
    }

    #[test]
    fn tolerates_reformatting() {
        let docs = docs_of(DOCUMENTED);
        let reformatted = "package pkg;\nimport java.util.List;\npublic class A {\n  private List<String> items;\n  @Deprecated public void run() {}\n  public void add(String s) {}\n  public void add(int x) {}\n  enum Mode { FAST, SLOW }\n  Runnable task = new Runnable() { public void run() {} };\n}\n";
        let out = apply_to(reformatted, &docs).unwrap();
        assert!(out.contains("  /**\n   * Items.\n   */\n  private List<String> items;"));
        assert!(out.contains("  /**\n   * Runs it.\n   *\n   * @return none\n   */\n  @Deprecated public void run() {}"));
        assert!(out.contains(
            "   * @param x the value\n   * @throws IllegalStateException when full\n   */\n  public void add(int x) {}"
        ));
        assert!(out.contains("  public void add(String s) {}"));
        assert_eq!(out.matches("/**").count(), 6);
    }

    #[test]
    fn replaces_existing_comment() {
        let docs = docs_of("/** New text. */\nclass A {}\n");
        let out = apply_to("/** Old text. */\nclass A {}\n", &docs).unwrap();
        assert_eq!(out, "/**\n * New text.\n */\nclass A {}\n");
    }

    #[test]
    fn keeps_crlf_line_endings() {
        let documented = "class A {\r\n    /**\r\n     * Runs.\r\n     */\r\n    void run() {}\r\n}\r\n";
        let docs = docs_of(documented);
        let stripped = strip(&JavaSource::parse(documented).unwrap()).unwrap();
        assert_eq!(stripped, "class A {\r\n    void run() {}\r\n}\r\n");

        let out = apply_to(&stripped, &docs).unwrap();
        assert_eq!(out, documented);
        assert_eq!(out.matches('\n').count(), out.matches("\r\n").count());
    }

    #[test]
    fn unchanged_text_is_not_reported() {
        let canonical = "/**\n * Same.\n */\nclass A {}\n";
        let docs = docs_of(canonical);
        assert_eq!(apply_to(canonical, &docs), None);
    }

    #[test]
    fn ignores_keys_missing_from_either_side() {
        let docs = docs_of("class A {\n    /** Gone. */\n    void removed() {}\n}\n");
        assert_eq!(apply_to("class A {\n    void kept() {}\n}\n", &docs), None);
        assert_eq!(apply_to("class B {}\n", &DocInfo::new()), None);
    }

    #[test]
    fn applies_package_documentation() {
        let original = "/**\n * Utilities.\n */\npackage com.acme;\n";
        let info = extract_package(&JavaSource::parse(original).unwrap());
        let stripped = JavaSource::parse("package com.acme;\n").unwrap();
        assert_eq!(apply_package(&stripped, &info).unwrap(), original);
        assert_eq!(apply_package(&stripped, &PackageInfo::default()), None);
    }
}
