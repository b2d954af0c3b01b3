//! Javadoc → document model.

use crate::error::{Error, Result};
use crate::model::{DocInfo, FieldInfo, MethodInfo, PackageInfo};
use crate::resolve::TypeResolver;
use crate::syntax::JavaSource;
use crate::walker::{self, Declaration, DeclarationVisitor, Element};
use javadoc_syntax::parse_comment;
use std::collections::HashMap;

/// Collect the javadoc of every declaration in `source`.
pub fn extract(source: &JavaSource, resolver: &dyn TypeResolver) -> Result<DocInfo> {
    let mut extractor = Extractor::default();
    walker::walk(source, resolver, &mut extractor)?;
    Ok(extractor.doc)
}

/// Package documentation of a `package-info.java` file.
pub fn extract_package(source: &JavaSource) -> PackageInfo {
    let javadoc = source
        .package_declaration()
        .and_then(|decl| source.javadoc_before(decl))
        .and_then(|comment| parse_comment(&comment.content));
    PackageInfo { javadoc }
}

#[derive(Default)]
struct Extractor {
    doc: DocInfo,
    /// (class key, member key) → label of the first declaration seen.
    seen: HashMap<(String, Option<String>), String>,
}

impl DeclarationVisitor for Extractor {
    fn visit(&mut self, source: &JavaSource, decl: &Declaration<'_>) -> Result<()> {
        let class = decl.class.to_string();
        let member = decl.member_key();
        if let Some(first) = self.seen.get(&(class.clone(), member.clone())) {
            return Err(Error::DuplicateKey {
                key: member.unwrap_or_else(|| class.clone()),
                class,
                first: first.clone(),
                second: decl.label.clone(),
            });
        }
        self.seen.insert((class.clone(), member), decl.label.clone());

        let Some(javadoc) = source
            .javadoc_before(decl.node)
            .and_then(|comment| parse_comment(&comment.content))
        else {
            return Ok(());
        };
        tracing::debug!(class = %class, "javadoc on {}", decl.label);

        let info = self.doc.class_mut(&class);
        match &decl.element {
            Element::Class => info.javadoc = Some(javadoc),
            Element::Field(name) => {
                info.fields
                    .get_or_insert_with(name, || FieldInfo {
                        name: name.clone(),
                        javadoc: None,
                    })
                    .javadoc = Some(javadoc);
            }
            Element::Method { name, descriptor } => {
                let key = crate::identity::member_key(name, descriptor);
                info.methods
                    .get_or_insert_with(&key, || MethodInfo {
                        name: name.clone(),
                        descriptor: descriptor.clone(),
                        javadoc: None,
                    })
                    .javadoc = Some(javadoc);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::to_json;
    use crate::resolve::{SourceResolver, TypeIndex};

    fn run(text: &str) -> Result<DocInfo> {
        let source = JavaSource::parse(text)?;
        let index = TypeIndex::with_jdk();
        let resolver = SourceResolver::new(&index, &source);
        extract(&source, &resolver)
    }

    #[test]
    fn extracts_example_class() {
        let doc = run(r#"package pkg;

/**
 * Does X.
 */
public class A {
    /**
     * Runs it.
     *
     * @return none
     */
    public void run() {}
}
"#)
        .unwrap();
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"[{"name":"pkg.A","javadoc":{"description":["Does X."]},"methods":[{"name":"run","descriptor":"()V","javadoc":{"description":["Runs it."],"tags":{"return":"none"}}}]}]"#
        );
    }

    #[test]
    fn undocumented_classes_are_absent() {
        let doc = run(r#"class Plain {
    int x;
    void f() {}
    static class Documented {
        /** Counter. */
        int count;
    }
}
"#)
        .unwrap();
        let keys: Vec<&str> = doc.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, vec!["Plain$Documented"]);
        let class = doc.class("Plain$Documented").unwrap();
        assert!(class.javadoc.is_none());
        assert!(class.methods.is_empty());
        assert_eq!(class.fields.iter().count(), 1);
    }

    #[test]
    fn sentinel_and_empty_comments_are_dropped() {
        let doc = run("/**empty*/\nclass A {\n    /** */\n    void f() {}\n    /**\n     *\n     */\n    int x;\n}\n")
            .unwrap();
        assert!(doc.is_empty());
        assert_eq!(to_json(&doc).unwrap(), b"[]\n");
    }

    #[test]
    fn overloads_are_distinct_members() {
        let doc = run(r#"class A {
    /** No args. */
    void f() {}
    /** Int. */
    void f(int x) {}
    /** Strings. */
    void f(String... xs) {}
}
"#)
        .unwrap();
        let class = doc.class("A").unwrap();
        let keys: Vec<String> = class
            .methods
            .iter()
            .map(|m| format!("{} {}", m.name, m.descriptor))
            .collect();
        assert_eq!(keys, vec!["f ()V", "f (I)V", "f ([Ljava/lang/String;)V"]);
    }

    #[test]
    fn anonymous_members_get_their_own_class() {
        let doc = run(r#"package p;
class A {
    Runnable r = new Runnable() {
        /** Does the work. */
        public void run() {}
    };
}
"#)
        .unwrap();
        let class = doc.class("p.A$1").unwrap();
        assert!(class.member_doc("run ()V").is_some());
        assert!(doc.class("p.A").is_none());
    }

    #[test]
    fn enum_constants_are_fields() {
        let doc = run("enum E {\n    /** First. */\n    ONE,\n    TWO\n}\n").unwrap();
        let class = doc.class("E").unwrap();
        assert_eq!(class.member_doc("ONE").unwrap().description, vec!["First."]);
        assert!(class.member_doc("TWO").is_none());
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let err = run("class A {\n    void f() {}\n    void f() {}\n}\n").unwrap_err();
        match err {
            Error::DuplicateKey {
                class,
                key,
                first,
                second,
            } => {
                assert_eq!(class, "A");
                assert_eq!(key, "f ()V");
                assert_eq!(first, "method `f` (line 2)");
                assert_eq!(second, "method `f` (line 3)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let err = run("class A {}\nclass A {}\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn package_documentation() {
        let source = JavaSource::parse("/**\n * Utilities.\n */\npackage com.acme.util;\n").unwrap();
        let info = extract_package(&source);
        assert_eq!(info.javadoc.unwrap().description, vec!["Utilities."]);

        let bare = JavaSource::parse("package com.acme.util;\n").unwrap();
        assert!(extract_package(&bare).is_empty());
    }
}
