//! Declaration walker shared by extraction and application.
//!
//! Both passes see the same sequence of [`Declaration`]s for structurally
//! equivalent sources, so a key produced while extracting is found again
//! while applying. Anonymous bodies are discovered by scanning initializers,
//! bodies, constant arguments and annotation defaults in source order; a body
//! is numbered when its creation expression is reached, before the
//! expression's arguments are scanned. Local classes are skipped entirely.

use crate::descriptor;
use crate::error::{Error, Result};
use crate::identity::{member_key, ClassKey, ClassScope};
use crate::resolve::{ResolvedType, TypeContext, TypeParam, TypeResolver};
use crate::syntax::{body_members, dimensions, is_type_declaration, line_of, syntax_error, JavaSource, TypeSyntax};
use tree_sitter::Node;

/// What a declaration documents within its class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Class,
    /// Field or enum constant.
    Field(String),
    /// Method, constructor or annotation element.
    Method { name: String, descriptor: String },
}

pub struct Declaration<'t> {
    pub class: ClassKey,
    pub element: Element,
    pub node: Node<'t>,
    /// Human-readable name for messages, e.g. ``method `run` (line 4)``.
    pub label: String,
}

impl Declaration<'_> {
    /// Key within the class's field or method registry.
    pub fn member_key(&self) -> Option<String> {
        match &self.element {
            Element::Class => None,
            Element::Field(name) => Some(name.clone()),
            Element::Method { name, descriptor } => Some(member_key(name, descriptor)),
        }
    }
}

pub trait DeclarationVisitor {
    fn visit(&mut self, source: &JavaSource, decl: &Declaration<'_>) -> Result<()>;
}

/// Walk every documentable declaration of `source` in source order.
pub fn walk(
    source: &JavaSource,
    resolver: &dyn TypeResolver,
    visitor: &mut dyn DeclarationVisitor,
) -> Result<()> {
    let package = source.package();
    let mut walker = Walker {
        source,
        resolver,
        visitor,
    };
    for node in source.top_level_types() {
        let name = walker.name_of(node)?;
        let scope = ClassScope::top_level(&package, &name);
        walker.walk_type(node, scope, &TypeContext::new(), Some(name))?;
    }
    Ok(())
}

struct Walker<'t, 'v> {
    source: &'t JavaSource,
    resolver: &'t dyn TypeResolver,
    visitor: &'v mut dyn DeclarationVisitor,
}

impl<'t> Walker<'t, '_> {
    /// `path` is the dotted member-type path used for name resolution; types
    /// inside anonymous bodies have none.
    fn walk_type(
        &mut self,
        node: Node<'t>,
        mut scope: ClassScope,
        outer: &TypeContext,
        path: Option<String>,
    ) -> Result<()> {
        let params = self.type_params(node.child_by_field_name("type_parameters"))?;
        let ctx = match &path {
            Some(path) => outer.enter_type(path.clone(), params),
            None => outer.with_type_params(params),
        };

        let label = format!(
            "{} `{}` (line {})",
            kind_word(node.kind()),
            scope.key(),
            line_of(node)
        );
        self.emit(&scope, Element::Class, node, label)?;

        let header = (node.kind() == "record_declaration")
            .then(|| node.child_by_field_name("parameters"))
            .flatten();
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_body(body, &mut scope, &ctx, path.as_deref(), header)?;
        }
        Ok(())
    }

    fn walk_body(
        &mut self,
        body: Node<'t>,
        scope: &mut ClassScope,
        ctx: &TypeContext,
        path: Option<&str>,
        record_header: Option<Node<'t>>,
    ) -> Result<()> {
        for member in body_members(body) {
            match member.kind() {
                kind if is_type_declaration(kind) => {
                    let name = self.name_of(member)?;
                    let nested = scope.nested(&name);
                    let nested_path = path.map(|p| format!("{p}.{name}"));
                    self.walk_type(member, nested, ctx, nested_path)?;
                }
                "field_declaration" | "constant_declaration" => self.walk_field(member, scope, ctx)?,
                "enum_constant" => self.walk_enum_constant(member, scope, ctx)?,
                "method_declaration" => self.walk_method(member, scope, ctx)?,
                "constructor_declaration" => self.walk_constructor(member, scope, ctx)?,
                "compact_constructor_declaration" => {
                    let header = record_header.ok_or_else(|| syntax_error(member))?;
                    self.walk_compact_constructor(member, header, scope, ctx)?;
                }
                "annotation_type_element_declaration" => {
                    self.walk_annotation_element(member, scope, ctx)?
                }
                "static_initializer" | "block" => self.scan(member, scope, ctx)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn walk_field(&mut self, node: Node<'t>, scope: &mut ClassScope, ctx: &TypeContext) -> Result<()> {
        let mut cursor = node.walk();
        let declarators: Vec<Node<'t>> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        let first = declarators.first().ok_or_else(|| syntax_error(node))?;
        let name = self.name_of(*first)?;

        let label = format!("field `{name}` (line {})", line_of(node));
        self.emit(scope, Element::Field(name), node, label)?;

        for declarator in declarators {
            if let Some(value) = declarator.child_by_field_name("value") {
                self.scan(value, scope, ctx)?;
            }
        }
        Ok(())
    }

    fn walk_enum_constant(
        &mut self,
        node: Node<'t>,
        scope: &mut ClassScope,
        ctx: &TypeContext,
    ) -> Result<()> {
        let name = self.name_of(node)?;
        let label = format!("enum constant `{name}` (line {})", line_of(node));
        self.emit(scope, Element::Field(name), node, label)?;

        let body = node.child_by_field_name("body");
        let anonymous = body.map(|_| scope.next_anonymous());
        if let Some(arguments) = node.child_by_field_name("arguments") {
            self.scan(arguments, scope, ctx)?;
        }
        if let (Some(body), Some(anonymous)) = (body, anonymous) {
            self.walk_anonymous(body, anonymous, ctx)?;
        }
        Ok(())
    }

    fn walk_method(&mut self, node: Node<'t>, scope: &mut ClassScope, ctx: &TypeContext) -> Result<()> {
        let name = self.name_of(node)?;
        let label = format!("method `{name}` (line {})", line_of(node));
        let inner = ctx.with_type_params(self.type_params(node.child_by_field_name("type_parameters"))?);

        let params = self.parameters(node.child_by_field_name("parameters"), &inner, &label)?;
        let ret = node.child_by_field_name("type").ok_or_else(|| syntax_error(node))?;
        let ret = self
            .source
            .type_syntax(ret)?
            .array_of(dimensions(node.child_by_field_name("dimensions")));
        let ret = self.resolve(&inner, &ret, &label)?;

        let descriptor = descriptor::method(&params, &ret);
        self.emit(scope, Element::Method { name, descriptor }, node, label)?;

        if let Some(body) = node.child_by_field_name("body") {
            self.scan(body, scope, ctx)?;
        }
        Ok(())
    }

    fn walk_constructor(
        &mut self,
        node: Node<'t>,
        scope: &mut ClassScope,
        ctx: &TypeContext,
    ) -> Result<()> {
        let name = self.name_of(node)?;
        let label = format!("constructor `{name}` (line {})", line_of(node));
        let inner = ctx.with_type_params(self.type_params(node.child_by_field_name("type_parameters"))?);

        let params = self.parameters(node.child_by_field_name("parameters"), &inner, &label)?;
        let descriptor = descriptor::constructor(&params);
        self.emit(scope, Element::Method { name, descriptor }, node, label)?;

        if let Some(body) = node.child_by_field_name("body") {
            self.scan(body, scope, ctx)?;
        }
        Ok(())
    }

    /// A record's compact constructor takes the record components.
    fn walk_compact_constructor(
        &mut self,
        node: Node<'t>,
        header: Node<'t>,
        scope: &mut ClassScope,
        ctx: &TypeContext,
    ) -> Result<()> {
        let name = self.name_of(node)?;
        let label = format!("constructor `{name}` (line {})", line_of(node));
        let params = self.parameters(Some(header), ctx, &label)?;
        let descriptor = descriptor::constructor(&params);
        self.emit(scope, Element::Method { name, descriptor }, node, label)?;

        if let Some(body) = node.child_by_field_name("body") {
            self.scan(body, scope, ctx)?;
        }
        Ok(())
    }

    fn walk_annotation_element(
        &mut self,
        node: Node<'t>,
        scope: &mut ClassScope,
        ctx: &TypeContext,
    ) -> Result<()> {
        let name = self.name_of(node)?;
        let label = format!("annotation element `{name}` (line {})", line_of(node));
        let ty = node.child_by_field_name("type").ok_or_else(|| syntax_error(node))?;
        let ty = self
            .source
            .type_syntax(ty)?
            .array_of(dimensions(node.child_by_field_name("dimensions")));
        let ty = self.resolve(ctx, &ty, &label)?;

        let descriptor = descriptor::annotation_element(&ty);
        self.emit(scope, Element::Method { name, descriptor }, node, label)?;

        if let Some(default) = node.child_by_field_name("value") {
            self.scan(default, scope, ctx)?;
        }
        Ok(())
    }

    fn walk_anonymous(&mut self, body: Node<'t>, mut scope: ClassScope, ctx: &TypeContext) -> Result<()> {
        tracing::trace!(key = %scope.key(), "anonymous body");
        self.walk_body(body, &mut scope, ctx, None, None)
    }

    /// Find anonymous bodies below `node`, numbering them in `scope`.
    fn scan(&mut self, node: Node<'t>, scope: &mut ClassScope, ctx: &TypeContext) -> Result<()> {
        if is_type_declaration(node.kind()) {
            return Ok(());
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();

        let body = (node.kind() == "object_creation_expression")
            .then(|| children.iter().copied().find(|c| c.kind() == "class_body"))
            .flatten();
        let anonymous = body.map(|_| scope.next_anonymous());

        for child in children {
            if Some(child) != body {
                self.scan(child, scope, ctx)?;
            }
        }
        if let (Some(body), Some(anonymous)) = (body, anonymous) {
            self.walk_anonymous(body, anonymous, ctx)?;
        }
        Ok(())
    }

    fn parameters(
        &self,
        node: Option<Node<'t>>,
        ctx: &TypeContext,
        label: &str,
    ) -> Result<Vec<ResolvedType>> {
        let Some(node) = node else {
            return Ok(Vec::new());
        };
        let mut cursor = node.walk();
        let params: Vec<Node<'t>> = node.named_children(&mut cursor).collect();

        let mut out = Vec::new();
        for param in params {
            let ty = match param.kind() {
                "formal_parameter" => {
                    let ty = param.child_by_field_name("type").ok_or_else(|| syntax_error(param))?;
                    self.source
                        .type_syntax(ty)?
                        .array_of(dimensions(param.child_by_field_name("dimensions")))
                }
                "spread_parameter" => {
                    let mut cursor = param.walk();
                    let parts: Vec<Node<'t>> = param.named_children(&mut cursor).collect();
                    let ty = parts
                        .iter()
                        .find(|n| {
                            !matches!(
                                n.kind(),
                                "modifiers"
                                    | "annotation"
                                    | "marker_annotation"
                                    | "variable_declarator"
                                    | "block_comment"
                                    | "line_comment"
                            )
                        })
                        .ok_or_else(|| syntax_error(param))?;
                    let extra = parts
                        .iter()
                        .find(|n| n.kind() == "variable_declarator")
                        .map_or(0, |d| dimensions(d.child_by_field_name("dimensions")));
                    self.source.type_syntax(*ty)?.array_of(1 + extra)
                }
                _ => continue,
            };
            out.push(self.resolve(ctx, &ty, label)?);
        }
        Ok(out)
    }

    fn type_params(&self, node: Option<Node<'t>>) -> Result<Vec<TypeParam>> {
        let Some(node) = node else {
            return Ok(Vec::new());
        };
        let mut cursor = node.walk();
        let params: Vec<Node<'t>> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "type_parameter")
            .collect();

        let mut out = Vec::new();
        for param in params {
            let mut cursor = param.walk();
            let parts: Vec<Node<'t>> = param.named_children(&mut cursor).collect();
            let name = parts
                .iter()
                .find(|n| matches!(n.kind(), "type_identifier" | "identifier"))
                .ok_or_else(|| syntax_error(param))?;
            let bound = match parts.iter().find(|n| n.kind() == "type_bound") {
                Some(bound) => {
                    let mut cursor = bound.walk();
                    let first = bound.named_children(&mut cursor).next();
                    match first {
                        Some(first) => Some(self.source.type_syntax(first)?),
                        None => None,
                    }
                }
                None => None,
            };
            out.push(TypeParam {
                name: self.source.node_text(*name).to_string(),
                bound,
            });
        }
        Ok(out)
    }

    fn resolve(&self, ctx: &TypeContext, ty: &TypeSyntax, label: &str) -> Result<ResolvedType> {
        self.resolver
            .resolve(ctx, ty)
            .map_err(|unresolved| Error::Resolution {
                element: label.to_string(),
                name: unresolved.name,
            })
    }

    fn name_of(&self, node: Node<'t>) -> Result<String> {
        self.source
            .declared_name(node)
            .map(str::to_string)
            .ok_or_else(|| syntax_error(node))
    }

    fn emit(&mut self, scope: &ClassScope, element: Element, node: Node<'t>, label: String) -> Result<()> {
        let decl = Declaration {
            class: scope.key().clone(),
            element,
            node,
            label,
        };
        tracing::trace!(class = %decl.class, "{}", decl.label);
        self.visitor.visit(self.source, &decl)
    }
}

fn kind_word(kind: &str) -> &'static str {
    match kind {
        "interface_declaration" => "interface",
        "enum_declaration" => "enum",
        "annotation_type_declaration" => "annotation",
        "record_declaration" => "record",
        _ => "class",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{SourceResolver, TypeIndex};

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl DeclarationVisitor for Recorder {
        fn visit(&mut self, _: &JavaSource, decl: &Declaration<'_>) -> Result<()> {
            let entry = match decl.member_key() {
                Some(member) => format!("{} {member}", decl.class),
                None => decl.class.to_string(),
            };
            self.0.push(entry);
            Ok(())
        }
    }

    fn record(text: &str) -> Vec<String> {
        let source = JavaSource::parse(text).unwrap();
        let mut index = TypeIndex::with_jdk();
        index.add_source(&source);
        let resolver = SourceResolver::new(&index, &source);
        let mut recorder = Recorder::default();
        walk(&source, &resolver, &mut recorder).unwrap();
        recorder.0
    }

    #[test]
    fn keys_members_with_descriptors() {
        let keys = record(
            r#"package pkg;
import java.util.List;
public class A {
    int a, b;
    A() {}
    A(String s) {}
    void run() {}
    int run(int x, long[] y) { return 0; }
    static void many(String... args) {}
    <T> T pick(List<T> items, T fallback) { return fallback; }
    <N extends Number> void sum(N[] values) {}
    int legacy()[] { return null; }
    void old(int grid[][]) {}
    class Inner { Inner(A outer) {} }
}
"#,
        );
        assert_eq!(
            keys,
            vec![
                "pkg.A",
                "pkg.A a",
                "pkg.A A ()V",
                "pkg.A A (Ljava/lang/String;)V",
                "pkg.A run ()V",
                "pkg.A run (I[J)I",
                "pkg.A many ([Ljava/lang/String;)V",
                "pkg.A pick (Ljava/util/List;Ljava/lang/Object;)Ljava/lang/Object;",
                "pkg.A sum ([Ljava/lang/Number;)V",
                "pkg.A legacy ()[I",
                "pkg.A old ([[I)V",
                "pkg.A$Inner",
                "pkg.A$Inner Inner (Lpkg/A;)V",
            ]
        );
    }

    #[test]
    fn numbers_anonymous_bodies_in_source_order() {
        let keys = record(
            r#"package pkg;
class A {
    Runnable first = new Runnable() { public void run() {} };
    static class Nested {
        Object x = new Object() { int inNested; };
    }
    void m() {
        wrap(new Runnable() {
            public void run() {
                Object deep = new Object() { int deepest; };
            }
        }, new Object() { int third; });
        class Local {
            Object skipped = new Object() { int hidden; };
        }
        Runnable r = () -> new Object() { int fourth; };
    }
    void wrap(Object a, Object b) {}
}
"#,
        );
        assert_eq!(
            keys,
            vec![
                "pkg.A",
                "pkg.A first",
                "pkg.A$1 run ()V",
                "pkg.A$Nested",
                "pkg.A$Nested x",
                "pkg.A$Nested$1 inNested",
                "pkg.A m ()V",
                "pkg.A$2 run ()V",
                "pkg.A$2$1 deepest",
                "pkg.A$3 third",
                "pkg.A$4 fourth",
                "pkg.A wrap (Ljava/lang/Object;Ljava/lang/Object;)V",
            ]
        );
    }

    #[test]
    fn creation_is_numbered_before_its_arguments() {
        let keys = record(
            r#"class A {
    Object o = new Holder(new Object() { int inner; }) { int outer; };
    static class Holder { Holder(Object o) {} }
}
"#,
        );
        assert!(keys.contains(&"A$1 outer".to_string()));
        assert!(keys.contains(&"A$2 inner".to_string()));
    }

    #[test]
    fn enum_constants_with_bodies() {
        let keys = record(
            r#"package pkg;
enum Op {
    PLUS(new Object() { int arg; }) { int apply() { return 1; } },
    MINUS(null);
    Op(Object o) {}
    int apply() { return 0; }
}
"#,
        );
        assert_eq!(
            keys,
            vec![
                "pkg.Op",
                "pkg.Op PLUS",
                "pkg.Op$2 arg",
                "pkg.Op$1 apply ()I",
                "pkg.Op MINUS",
                "pkg.Op Op (Ljava/lang/Object;)V",
                "pkg.Op apply ()I",
            ]
        );
    }

    #[test]
    fn annotations_records_and_interfaces() {
        let keys = record(
            r#"package pkg;
@interface Tag {
    String value() default "";
    int[] codes();
    Class<?> type() default Object.class;
}
record Point(int x, int y) {
    Point {}
    static Point origin() { return new Point(0, 0); }
}
interface Shape<T extends Comparable<T>> {
    double AREA = 0;
    T max(T a, T b);
    interface Visitor { void visit(Shape<?> s); }
}
"#,
        );
        assert_eq!(
            keys,
            vec![
                "pkg.Tag",
                "pkg.Tag value ()Ljava/lang/String;",
                "pkg.Tag codes ()[I",
                "pkg.Tag type ()Ljava/lang/Class;",
                "pkg.Point",
                "pkg.Point Point (II)V",
                "pkg.Point origin ()Lpkg/Point;",
                "pkg.Shape",
                "pkg.Shape AREA",
                "pkg.Shape max (Ljava/lang/Comparable;Ljava/lang/Comparable;)Ljava/lang/Comparable;",
                "pkg.Shape$Visitor",
                "pkg.Shape$Visitor visit (Lpkg/Shape;)V",
            ]
        );
    }

    #[test]
    fn named_type_inside_anonymous_body() {
        let keys = record(
            r#"class A {
    Object o = new Object() {
        class Helper { void help() {} }
    };
}
"#,
        );
        assert_eq!(
            keys,
            vec!["A", "A o", "A$1$Helper", "A$1$Helper help ()V"]
        );
    }

    #[test]
    fn inherited_member_types_resolve() {
        let base = JavaSource::parse(
            "package p;\npublic class Base implements Shape {\n    public static class Node {}\n}\n",
        )
        .unwrap();
        let shape = JavaSource::parse("package p;\ninterface Shape {\n    enum Kind { ROUND }\n}\n").unwrap();
        let sub = JavaSource::parse(
            r#"package p;
class Sub extends Base {
    void add(Node n) {}
    void kind(Kind k) {}
    class Inner {
        Node first() { return null; }
    }
}
"#,
        )
        .unwrap();
        let mut index = TypeIndex::with_jdk();
        for source in [&base, &shape, &sub] {
            index.add_source(source);
        }

        let resolver = SourceResolver::new(&index, &sub);
        let mut recorder = Recorder::default();
        walk(&sub, &resolver, &mut recorder).unwrap();
        assert_eq!(
            recorder.0,
            vec![
                "p.Sub",
                "p.Sub add (Lp/Base$Node;)V",
                "p.Sub kind (Lp/Shape$Kind;)V",
                "p.Sub$Inner",
                "p.Sub$Inner first ()Lp/Base$Node;",
            ]
        );
    }

    #[test]
    fn cyclic_supertypes_do_not_loop() {
        let source = JavaSource::parse(
            "class A extends B {\n  void f(Missing m) {}\n}\nclass B extends A {}\n",
        )
        .unwrap();
        let mut index = TypeIndex::with_jdk();
        index.add_source(&source);
        let resolver = SourceResolver::new(&index, &source);
        let err = walk(&source, &resolver, &mut Recorder::default()).unwrap_err();
        assert!(err.to_string().contains("`Missing`"), "{err}");
    }

    #[test]
    fn unresolved_type_names_the_element() {
        let source = JavaSource::parse("class A {\n  void f(Missing m) {}\n}\n").unwrap();
        let index = TypeIndex::with_jdk();
        let resolver = SourceResolver::new(&index, &source);
        let err = walk(&source, &resolver, &mut Recorder::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot resolve type `Missing` in method `f` (line 2)"
        );
    }
}
