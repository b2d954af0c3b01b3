//! Java front end on top of tree-sitter.
//!
//! Wraps a parsed compilation unit and exposes the handful of syntactic facts
//! the rest of the crate needs: package, imports, declared member types,
//! attached javadoc comments, and type references converted to
//! [`TypeSyntax`].

use crate::error::{Error, Result};
use std::ops::Range;
use tree_sitter::{Node, Parser, Tree};

/// Node kinds that declare a named class-like type.
pub const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "annotation_type_declaration",
    "record_declaration",
];

pub fn is_type_declaration(kind: &str) -> bool {
    TYPE_DECLARATIONS.contains(&kind)
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "block_comment" | "line_comment" | "comment")
}

/// Content between `/**` and `*/`, if `text` is a javadoc comment.
pub fn javadoc_content(text: &str) -> Option<&str> {
    text.strip_prefix("/**")?.strip_suffix("*/")
}

/// Primitive Java types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }
}

/// A type reference as written, with generic arguments and annotations erased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntax {
    Primitive(Primitive),
    Void,
    /// Dotted name segments, e.g. `Map.Entry` → `["Map", "Entry"]`.
    Named(Vec<String>),
    Array(Box<TypeSyntax>),
}

impl TypeSyntax {
    pub fn array_of(self, dimensions: usize) -> Self {
        (0..dimensions).fold(self, |ty, _| TypeSyntax::Array(Box::new(ty)))
    }
}

/// An `import` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub on_demand: bool,
    pub is_static: bool,
}

/// A javadoc comment found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub range: Range<usize>,
    pub content: String,
}

/// A parsed Java compilation unit.
pub struct JavaSource {
    text: String,
    tree: Tree,
}

impl JavaSource {
    /// Parse `text`. Any error or missing node in the tree is a syntax error.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .map_err(|e| Error::Parser(e.to_string()))?;
        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| Error::Parser("parser returned no tree".to_string()))?;

        if let Some(node) = first_error(tree.root_node()) {
            return Err(Error::Syntax {
                line: line_of(node),
            });
        }
        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn node_text(&self, node: Node) -> &str {
        &self.text[node.byte_range()]
    }

    /// Declared package, empty for the default package.
    pub fn package(&self) -> String {
        let root = self.root();
        let mut cursor = root.walk();
        let package = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_declaration");
        let Some(package) = package else {
            return String::new();
        };

        let mut cursor = package.walk();
        let name = package
            .named_children(&mut cursor)
            .find(|n| matches!(n.kind(), "identifier" | "scoped_identifier"));
        name.map(|n| compact(self.node_text(n))).unwrap_or_default()
    }

    pub fn package_declaration(&self) -> Option<Node<'_>> {
        let root = self.root();
        let mut cursor = root.walk();
        let found = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_declaration");
        found
    }

    pub fn imports(&self) -> Vec<Import> {
        let root = self.root();
        let mut cursor = root.walk();
        let imports = root
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "import_declaration")
            .filter_map(|decl| {
                let mut import = Import {
                    path: String::new(),
                    on_demand: false,
                    is_static: false,
                };
                let mut cursor = decl.walk();
                for child in decl.children(&mut cursor) {
                    match child.kind() {
                        "static" => import.is_static = true,
                        "asterisk" => import.on_demand = true,
                        "identifier" | "scoped_identifier" => {
                            import.path = compact(self.node_text(child))
                        }
                        _ => {}
                    }
                }
                (!import.path.is_empty()).then_some(import)
            })
            .collect();
        imports
    }

    /// Top-level type declarations in source order.
    pub fn top_level_types(&self) -> Vec<Node<'_>> {
        let root = self.root();
        let mut cursor = root.walk();
        let types = root
            .named_children(&mut cursor)
            .filter(|n| is_type_declaration(n.kind()))
            .collect();
        types
    }

    /// Dotted paths (`Outer`, `Outer.Inner`) of every named member type in
    /// the file. Local classes and types inside anonymous bodies are not
    /// member types and are skipped.
    pub fn declared_types(&self) -> Vec<String> {
        self.declared_type_nodes()
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    /// [`JavaSource::declared_types`] with their declaration nodes.
    pub fn declared_type_nodes(&self) -> Vec<(String, Node<'_>)> {
        let mut out = Vec::new();
        for node in self.top_level_types() {
            self.collect_types(node, None, &mut out);
        }
        out
    }

    fn collect_types<'t>(&self, node: Node<'t>, outer: Option<&str>, out: &mut Vec<(String, Node<'t>)>) {
        let Some(name) = self.declared_name(node) else {
            return;
        };
        let path = match outer {
            Some(outer) => format!("{outer}.{name}"),
            None => name.to_string(),
        };
        out.push((path.clone(), node));
        if let Some(body) = node.child_by_field_name("body") {
            for member in body_members(body) {
                if is_type_declaration(member.kind()) {
                    self.collect_types(member, Some(&path), out);
                }
            }
        }
    }

    /// Types named in the `extends` and `implements` clauses of a type
    /// declaration. Clauses that do not convert are left out.
    pub fn supertypes(&self, node: Node) -> Vec<TypeSyntax> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            if !matches!(clause.kind(), "superclass" | "super_interfaces" | "extends_interfaces") {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for child in clause.named_children(&mut clause_cursor) {
                if child.kind() == "type_list" {
                    let mut list_cursor = child.walk();
                    out.extend(
                        child
                            .named_children(&mut list_cursor)
                            .filter_map(|ty| self.type_syntax(ty).ok()),
                    );
                } else if let Ok(ty) = self.type_syntax(child) {
                    out.push(ty);
                }
            }
        }
        out
    }

    /// The `name` field of a declaration.
    pub fn declared_name(&self, node: Node) -> Option<&str> {
        node.child_by_field_name("name").map(|n| self.node_text(n))
    }

    /// The javadoc comment directly preceding `node`, if any.
    pub fn javadoc_before(&self, node: Node) -> Option<Comment> {
        let prev = node.prev_sibling()?;
        if !is_comment(prev.kind()) {
            return None;
        }
        let content = javadoc_content(self.node_text(prev))?;
        Some(Comment {
            range: prev.byte_range(),
            content: content.to_string(),
        })
    }

    /// Every javadoc comment in the file, in source order.
    pub fn javadoc_comments(&self) -> Vec<Comment> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if is_comment(node.kind()) {
                if let Some(content) = javadoc_content(self.node_text(node)) {
                    out.push(Comment {
                        range: node.byte_range(),
                        content: content.to_string(),
                    });
                }
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Line terminator of the file: `\r\n` if its first line ends with one.
    pub fn line_ending(&self) -> &'static str {
        match self.text.find('\n') {
            Some(i) if self.text[..i].ends_with('\r') => "\r\n",
            _ => "\n",
        }
    }

    /// Leading whitespace of the line containing byte `pos`.
    pub fn line_indent(&self, pos: usize) -> &str {
        let line_start = self.text[..pos].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.text[line_start..];
        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..width.min(pos - line_start)]
    }

    /// Convert a type node into [`TypeSyntax`].
    pub fn type_syntax(&self, node: Node) -> Result<TypeSyntax> {
        let ty = match node.kind() {
            "void_type" => TypeSyntax::Void,
            "boolean_type" => TypeSyntax::Primitive(Primitive::Boolean),
            "integral_type" | "floating_point_type" => Primitive::from_keyword(self.node_text(node).trim())
                .map(TypeSyntax::Primitive)
                .ok_or_else(|| syntax_error(node))?,
            "type_identifier" | "identifier" => TypeSyntax::Named(vec![self.node_text(node).to_string()]),
            "scoped_type_identifier" => TypeSyntax::Named(self.scoped_segments(node)?),
            "generic_type" => {
                let mut cursor = node.walk();
                let raw = node
                    .named_children(&mut cursor)
                    .find(|n| matches!(n.kind(), "type_identifier" | "scoped_type_identifier"))
                    .ok_or_else(|| syntax_error(node))?;
                self.type_syntax(raw)?
            }
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .ok_or_else(|| syntax_error(node))?;
                self.type_syntax(element)?
                    .array_of(dimensions(node.child_by_field_name("dimensions")))
            }
            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|n| !matches!(n.kind(), "annotation" | "marker_annotation"))
                    .last()
                    .ok_or_else(|| syntax_error(node))?;
                self.type_syntax(inner)?
            }
            _ => return Err(syntax_error(node)),
        };
        Ok(ty)
    }

    fn scoped_segments(&self, node: Node) -> Result<Vec<String>> {
        let mut segments = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "type_identifier" | "identifier" => segments.push(self.node_text(child).to_string()),
                "scoped_type_identifier" | "generic_type" => match self.type_syntax(child)? {
                    TypeSyntax::Named(inner) => segments.extend(inner),
                    _ => return Err(syntax_error(child)),
                },
                _ => {}
            }
        }
        Ok(segments)
    }
}

/// Members of a class/interface/enum/annotation body, with the declarations
/// after an enum's constant list flattened in.
pub fn body_members(body: Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            out.extend(child.named_children(&mut inner).filter(|n| !is_comment(n.kind())));
        } else if !is_comment(child.kind()) {
            out.push(child);
        }
    }
    out
}

/// Number of `[]` pairs in an optional `dimensions` node.
pub fn dimensions(node: Option<Node>) -> usize {
    let Some(node) = node else {
        return 0;
    };
    let mut cursor = node.walk();
    let count = node.children(&mut cursor).filter(|n| n.kind() == "[").count();
    count
}

pub fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

pub fn syntax_error(node: Node) -> Error {
    Error::Syntax {
        line: line_of(node),
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
