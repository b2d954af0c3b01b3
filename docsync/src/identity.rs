//! Identity keys for documentable declarations.
//!
//! A class key is the binary name of the declaration (`pkg.Outer$Inner`).
//! Anonymous bodies take `<enclosing>$<N>`, where `N` counts anonymous bodies
//! of one class-like declaration in source order, starting at 1. Every class
//! scope owns its own counter, so a named nested class never disturbs the
//! numbering of its enclosing class.

use std::fmt;

/// Key of one class-like declaration in a sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassKey(String);

impl ClassKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Naming state of one class-like declaration during a traversal.
#[derive(Debug)]
pub struct ClassScope {
    key: ClassKey,
    next_anonymous: u32,
}

impl ClassScope {
    /// Scope of a top-level type.
    pub fn top_level(package: &str, simple_name: &str) -> Self {
        let key = if package.is_empty() {
            simple_name.to_string()
        } else {
            format!("{package}.{simple_name}")
        };
        Self::with_key(key)
    }

    fn with_key(key: String) -> Self {
        Self {
            key: ClassKey(key),
            next_anonymous: 1,
        }
    }

    /// Scope of a named member type declared in this scope.
    pub fn nested(&self, simple_name: &str) -> Self {
        Self::with_key(format!("{}${simple_name}", self.key))
    }

    /// Scope of the next anonymous body of this scope.
    pub fn next_anonymous(&mut self) -> Self {
        let n = self.next_anonymous;
        self.next_anonymous += 1;
        Self::with_key(format!("{}${n}", self.key))
    }

    pub fn key(&self) -> &ClassKey {
        &self.key
    }
}

/// Key of a method, constructor or annotation element within its class.
pub fn member_key(name: &str, descriptor: &str) -> String {
    format!("{name} {descriptor}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_keys() {
        assert_eq!(ClassScope::top_level("a.b", "C").key().as_str(), "a.b.C");
        assert_eq!(ClassScope::top_level("", "C").key().as_str(), "C");
    }

    #[test]
    fn anonymous_counters_are_per_scope() {
        let mut outer = ClassScope::top_level("p", "A");
        let first = outer.next_anonymous();
        let mut inner = outer.nested("In");
        let inner_anon = inner.next_anonymous();
        let second = outer.next_anonymous();
        let mut first = first;
        let nested_anon = first.next_anonymous();

        assert_eq!(first.key().as_str(), "p.A$1");
        assert_eq!(second.key().as_str(), "p.A$2");
        assert_eq!(inner_anon.key().as_str(), "p.A$In$1");
        assert_eq!(nested_anon.key().as_str(), "p.A$1$1");
    }

    #[test]
    fn named_type_inside_anonymous_body() {
        let mut outer = ClassScope::top_level("p", "A");
        let anon = outer.next_anonymous();
        assert_eq!(anon.nested("Helper").key().as_str(), "p.A$1$Helper");
    }

    #[test]
    fn member_keys() {
        assert_eq!(member_key("run", "()V"), "run ()V");
    }
}
