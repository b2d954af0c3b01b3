//! Type resolution behind the [`TypeResolver`] seam.
//!
//! [`SourceResolver`] resolves type names the way `javac` would for the common
//! cases: type parameters in scope, member types of the enclosing classes and
//! of their supertypes, types declared in the file, imports, the current
//! package and `java.lang`. Names it cannot place against the [`TypeIndex`]
//! are reported, never guessed, except for explicitly qualified names which
//! are taken as written.

mod index;

pub use index::TypeIndex;

use crate::syntax::{Import, JavaSource, Primitive, TypeSyntax};
use std::collections::{HashMap, HashSet};

/// Bound and supertype chains longer than this are cut off.
const MAX_DEPTH: usize = 16;

/// A fully qualified class: package plus binary class path (`Outer$Inner`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName {
    pub package: String,
    pub binary: String,
}

impl ClassName {
    pub fn new(package: impl Into<String>, binary: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            binary: binary.into(),
        }
    }

    /// From a dotted member-type path such as `Map.Entry`.
    pub fn from_path(package: &str, path: &str) -> Self {
        Self::new(package, path.replace('.', "$"))
    }

    /// Dotted member-type path, the inverse of [`ClassName::from_path`].
    pub fn path(&self) -> String {
        self.binary.replace('$', ".")
    }

    fn nested(mut self, names: &[String]) -> Self {
        for name in names {
            self.binary.push('$');
            self.binary.push_str(name);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(Primitive),
    Void,
    Class(ClassName),
    Array(Box<ResolvedType>),
    /// A type variable and its first bound, if it declares one.
    TypeVariable {
        name: String,
        bound: Option<Box<ResolvedType>>,
    },
}

/// A type parameter declared on a class, method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<TypeSyntax>,
}

/// Lexical scope a type reference is resolved in.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    /// Dotted paths of the enclosing named types, outermost first.
    enclosing: Vec<String>,
    /// Type parameters in scope, innermost last.
    type_params: Vec<TypeParam>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope inside the named type at `path`.
    pub fn enter_type(&self, path: impl Into<String>, params: Vec<TypeParam>) -> Self {
        let mut ctx = self.clone();
        ctx.enclosing.push(path.into());
        ctx.type_params.extend(params);
        ctx
    }

    /// Scope with extra type parameters, e.g. those of a generic method.
    pub fn with_type_params(&self, params: Vec<TypeParam>) -> Self {
        let mut ctx = self.clone();
        ctx.type_params.extend(params);
        ctx
    }

    pub fn type_param(&self, name: &str) -> Option<&TypeParam> {
        self.type_params.iter().rev().find(|p| p.name == name)
    }

    /// Scope of the `extends`/`implements` clause of the type at `path`:
    /// inside its enclosing types, but not inside the type itself.
    fn header_of(path: &str) -> Self {
        let mut ctx = Self::new();
        let mut prefix = String::new();
        let segments: Vec<&str> = path.split('.').collect();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            ctx.enclosing.push(prefix.clone());
        }
        ctx
    }
}

/// Unresolvable type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub name: String,
}

pub trait TypeResolver {
    fn resolve(&self, ctx: &TypeContext, ty: &TypeSyntax) -> Result<ResolvedType, Unresolved>;
}

#[derive(Debug, Clone)]
struct SingleImport {
    path: String,
    is_static: bool,
}

/// Names visible at the top of one compilation unit, plus the supertype
/// clauses of the types it declares.
#[derive(Debug, Clone, Default)]
pub struct UnitScope {
    package: String,
    declared: HashSet<String>,
    single_imports: HashMap<String, SingleImport>,
    on_demand: Vec<String>,
    supertypes: HashMap<String, Vec<TypeSyntax>>,
}

impl UnitScope {
    pub fn new(source: &JavaSource) -> Self {
        let mut scope = Self {
            package: source.package(),
            ..Self::default()
        };
        for Import {
            path,
            on_demand,
            is_static,
        } in source.imports()
        {
            if on_demand {
                scope.on_demand.push(path);
                continue;
            }
            let name = path.rsplit_once('.').map_or(path.as_str(), |(_, name)| name);
            // A static import only names a type if it names a member type.
            if is_static && !starts_upper(name) {
                continue;
            }
            scope
                .single_imports
                .insert(name.to_string(), SingleImport { path: path.clone(), is_static });
        }
        for (path, node) in source.declared_type_nodes() {
            let supertypes = source.supertypes(node);
            if !supertypes.is_empty() {
                scope.supertypes.insert(path.clone(), supertypes);
            }
            scope.declared.insert(path);
        }
        scope
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Dotted paths of the member types this unit declares.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    pub fn has_supertypes(&self, path: &str) -> bool {
        self.supertypes.contains_key(path)
    }
}

/// Resolver for one compilation unit.
pub struct SourceResolver<'a> {
    index: &'a TypeIndex,
    unit: UnitScope,
}

impl<'a> SourceResolver<'a> {
    pub fn new(index: &'a TypeIndex, source: &JavaSource) -> Self {
        Self {
            index,
            unit: UnitScope::new(source),
        }
    }

    fn lookup(&self) -> Lookup<'_> {
        Lookup {
            index: self.index,
            unit: &self.unit,
            origin: &self.unit,
        }
    }
}

impl TypeResolver for SourceResolver<'_> {
    fn resolve(&self, ctx: &TypeContext, ty: &TypeSyntax) -> Result<ResolvedType, Unresolved> {
        self.lookup().resolve_at(ctx, ty, 0)
    }
}

/// Name lookup inside `unit`. `origin` is the unit being processed, which
/// may not be in the index yet.
#[derive(Clone, Copy)]
struct Lookup<'a> {
    index: &'a TypeIndex,
    unit: &'a UnitScope,
    origin: &'a UnitScope,
}

impl<'a> Lookup<'a> {
    fn resolve_at(
        &self,
        ctx: &TypeContext,
        ty: &TypeSyntax,
        depth: usize,
    ) -> Result<ResolvedType, Unresolved> {
        match ty {
            TypeSyntax::Primitive(p) => Ok(ResolvedType::Primitive(*p)),
            TypeSyntax::Void => Ok(ResolvedType::Void),
            TypeSyntax::Array(inner) => Ok(ResolvedType::Array(Box::new(
                self.resolve_at(ctx, inner, depth)?,
            ))),
            TypeSyntax::Named(segments) => {
                if let [name] = segments.as_slice() {
                    if let Some(param) = ctx.type_param(name) {
                        let bound = match &param.bound {
                            Some(bound) if depth < MAX_DEPTH => {
                                Some(Box::new(self.resolve_at(ctx, bound, depth + 1)?))
                            }
                            _ => None,
                        };
                        return Ok(ResolvedType::TypeVariable {
                            name: name.clone(),
                            bound,
                        });
                    }
                }
                self.resolve_class(ctx, segments, depth)
                    .map(ResolvedType::Class)
                    .ok_or_else(|| Unresolved {
                        name: segments.join("."),
                    })
            }
        }
    }

    fn resolve_class(&self, ctx: &TypeContext, segments: &[String], depth: usize) -> Option<ClassName> {
        let (first, rest) = segments.split_first()?;
        if let Some(head) = self.resolve_simple(ctx, first, depth) {
            return Some(head.nested(rest));
        }
        if rest.is_empty() {
            return None;
        }
        Some(self.index.split_qualified(&segments.join(".")))
    }

    fn resolve_simple(&self, ctx: &TypeContext, name: &str, depth: usize) -> Option<ClassName> {
        let unit = self.unit;
        for outer in ctx.enclosing.iter().rev() {
            let path = format!("{outer}.{name}");
            if unit.declared.contains(&path) {
                return Some(ClassName::from_path(&unit.package, &path));
            }
            let owner = ClassName::from_path(&unit.package, outer);
            if let Some(found) = self.inherited_member(&owner, name, depth, &mut HashSet::new()) {
                return Some(found);
            }
        }
        if unit.declared.contains(name) {
            return Some(ClassName::from_path(&unit.package, name));
        }
        if let Some(import) = unit.single_imports.get(name) {
            if !import.is_static {
                return Some(self.index.split_qualified(&import.path));
            }
            if let Some(class) = self.index.class_for(&import.path) {
                return Some(class);
            }
        }
        if self.index.contains(&unit.package, name) {
            return Some(ClassName::from_path(&unit.package, name));
        }
        for prefix in &unit.on_demand {
            if self.index.contains(prefix, name) {
                return Some(ClassName::from_path(prefix, name));
            }
            // `import pkg.Outer.*;` brings in Outer's member types.
            if let Some(owner) = self.index.class_for(prefix) {
                let path = format!("{}.{name}", owner.path());
                if self.index.contains(&owner.package, &path) {
                    return Some(ClassName::from_path(&owner.package, &path));
                }
            }
        }
        if self.index.contains("java.lang", name) {
            return Some(ClassName::from_path("java.lang", name));
        }
        None
    }

    /// A member type `name` that `owner` inherits from one of its supertypes,
    /// searched depth first through source-declared supertypes.
    fn inherited_member(
        &self,
        owner: &ClassName,
        name: &str,
        depth: usize,
        visited: &mut HashSet<ClassName>,
    ) -> Option<ClassName> {
        if depth >= MAX_DEPTH || !visited.insert(owner.clone()) {
            return None;
        }
        let owner_path = owner.path();
        let unit = self.unit_of(owner, &owner_path)?;
        let supertypes = unit.supertypes.get(&owner_path)?;
        let header = Lookup { unit, ..*self };
        let ctx = TypeContext::header_of(&owner_path);
        for ty in supertypes {
            let TypeSyntax::Named(segments) = ty else {
                continue;
            };
            let Some(parent) = header.resolve_class(&ctx, segments, depth + 1) else {
                continue;
            };
            let member = format!("{}.{name}", parent.path());
            if self.knows(&parent.package, &member) {
                return Some(ClassName::from_path(&parent.package, &member));
            }
            if let Some(found) = self.inherited_member(&parent, name, depth + 1, visited) {
                return Some(found);
            }
        }
        None
    }

    /// The unit that declares `class`, if it was declared in source.
    fn unit_of(&self, class: &ClassName, path: &str) -> Option<&'a UnitScope> {
        if class.package == self.origin.package && self.origin.declared.contains(path) {
            return Some(self.origin);
        }
        self.index.unit_for(class)
    }

    fn knows(&self, package: &str, path: &str) -> bool {
        self.index.contains(package, path)
            || (package == self.origin.package && self.origin.declared.contains(path))
    }
}

fn starts_upper(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(path: &str) -> TypeSyntax {
        TypeSyntax::Named(path.split('.').map(str::to_string).collect())
    }

    fn class(package: &str, binary: &str) -> ResolvedType {
        ResolvedType::Class(ClassName::new(package, binary))
    }

    const SOURCE: &str = r#"package com.acme;

import java.util.*;
import java.util.concurrent.Future;
import org.other.Widget;

class Outer {
    class Inner {
        class Deep {}
    }
    enum Mode { ON }
}
"#;

    fn index() -> TypeIndex {
        let mut index = TypeIndex::with_jdk();
        index.insert("com.acme", "Sibling");
        index
    }

    #[test]
    fn resolves_through_each_scope() {
        let index = index();
        let src = JavaSource::parse(SOURCE).unwrap();
        let resolver = SourceResolver::new(&index, &src);
        let ctx = TypeContext::new().enter_type("Outer", vec![]).enter_type("Outer.Inner", vec![]);

        let cases = [
            ("Deep", class("com.acme", "Outer$Inner$Deep")),
            ("Mode", class("com.acme", "Outer$Mode")),
            ("Outer", class("com.acme", "Outer")),
            ("Inner.Deep", class("com.acme", "Outer$Inner$Deep")),
            ("Future", class("java.util.concurrent", "Future")),
            ("Widget", class("org.other", "Widget")),
            ("Sibling", class("com.acme", "Sibling")),
            ("List", class("java.util", "List")),
            ("Map.Entry", class("java.util", "Map$Entry")),
            ("String", class("java.lang", "String")),
            ("java.util.Map.Entry", class("java.util", "Map$Entry")),
            ("org.unknown.Thing", class("org.unknown", "Thing")),
        ];
        for (name, expected) in cases {
            assert_eq!(resolver.resolve(&ctx, &named(name)), Ok(expected), "{name}");
        }
    }

    #[test]
    fn reports_unknown_simple_names() {
        let index = index();
        let src = JavaSource::parse(SOURCE).unwrap();
        let resolver = SourceResolver::new(&index, &src);
        let err = resolver.resolve(&TypeContext::new(), &named("Nowhere")).unwrap_err();
        assert_eq!(err.name, "Nowhere");
    }

    #[test]
    fn type_variables_carry_their_bound() {
        let index = index();
        let src = JavaSource::parse(SOURCE).unwrap();
        let resolver = SourceResolver::new(&index, &src);
        let ctx = TypeContext::new().with_type_params(vec![
            TypeParam {
                name: "T".into(),
                bound: None,
            },
            TypeParam {
                name: "N".into(),
                bound: Some(named("Number")),
            },
        ]);

        assert_eq!(
            resolver.resolve(&ctx, &named("T")),
            Ok(ResolvedType::TypeVariable {
                name: "T".into(),
                bound: None
            })
        );
        assert_eq!(
            resolver.resolve(&ctx, &TypeSyntax::Array(Box::new(named("N")))),
            Ok(ResolvedType::Array(Box::new(ResolvedType::TypeVariable {
                name: "N".into(),
                bound: Some(Box::new(class("java.lang", "Number"))),
            })))
        );
    }

    #[test]
    fn inner_type_parameter_shadows_outer() {
        let index = index();
        let src = JavaSource::parse(SOURCE).unwrap();
        let resolver = SourceResolver::new(&index, &src);
        let ctx = TypeContext::new()
            .enter_type(
                "Outer",
                vec![TypeParam {
                    name: "T".into(),
                    bound: Some(named("Number")),
                }],
            )
            .with_type_params(vec![TypeParam {
                name: "T".into(),
                bound: None,
            }]);
        assert_eq!(
            resolver.resolve(&ctx, &named("T")),
            Ok(ResolvedType::TypeVariable {
                name: "T".into(),
                bound: None
            })
        );
    }

    #[test]
    fn member_paths_become_binary_names() {
        assert_eq!(ClassName::from_path("", "A.B"), ClassName::new("", "A$B"));
        assert_eq!(ClassName::from_path("p.q", "A.B").path(), "A.B");
    }
}
