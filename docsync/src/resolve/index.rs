use super::{ClassName, UnitScope};
use crate::error::{Error, Result};
use crate::syntax::JavaSource;
use crate::workspace::java_files;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const JDK_TYPES: &str = include_str!("jdk_types.txt");

/// Known types, by package, as dotted member-type paths (`Map.Entry`).
/// Source-declared types with supertypes also keep the scope of the unit
/// that declares them, so inherited member types can be looked up.
#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    packages: HashMap<String, HashSet<String>>,
    units: HashMap<ClassName, Arc<UnitScope>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index preloaded with the common JDK types.
    pub fn with_jdk() -> Self {
        let mut index = Self::new();
        index.insert_type_list(JDK_TYPES);
        index
    }

    pub fn insert(&mut self, package: &str, path: &str) {
        self.packages
            .entry(package.to_string())
            .or_default()
            .insert(path.to_string());
    }

    /// Insert a binary name such as `java.util.Map$Entry`.
    pub fn insert_binary(&mut self, binary: &str) {
        let (package, class) = binary.rsplit_once('.').unwrap_or(("", binary));
        self.insert(package, &class.replace('$', "."));
    }

    pub fn contains(&self, package: &str, path: &str) -> bool {
        self.packages
            .get(package)
            .is_some_and(|types| types.contains(path))
    }

    pub fn len(&self) -> usize {
        self.packages.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The known class a dotted name denotes, if any.
    pub fn class_for(&self, dotted: &str) -> Option<ClassName> {
        let segments: Vec<&str> = dotted.split('.').collect();
        (0..segments.len()).rev().find_map(|split| {
            let package = segments[..split].join(".");
            let path = segments[split..].join(".");
            self.contains(&package, &path)
                .then(|| ClassName::from_path(&package, &path))
        })
    }

    /// Split a qualified name into package and class. Falls back to the
    /// naming convention (first capitalised segment starts the class) for
    /// types the index does not know.
    pub fn split_qualified(&self, dotted: &str) -> ClassName {
        if let Some(class) = self.class_for(dotted) {
            return class;
        }
        let segments: Vec<&str> = dotted.split('.').collect();
        let split = segments
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_uppercase()))
            .unwrap_or(segments.len().saturating_sub(1));
        ClassName::from_path(&segments[..split].join("."), &segments[split..].join("."))
    }

    /// The unit scope of a source-declared type that has supertypes.
    pub fn unit_for(&self, class: &ClassName) -> Option<&UnitScope> {
        self.units.get(class).map(Arc::as_ref)
    }

    /// Record every member type declared by `source`.
    pub fn add_source(&mut self, source: &JavaSource) {
        let unit = Arc::new(UnitScope::new(source));
        for path in unit.declared() {
            self.insert(unit.package(), path);
            if unit.has_supertypes(path) {
                self.units
                    .insert(ClassName::from_path(unit.package(), path), Arc::clone(&unit));
            }
        }
    }

    pub fn merge(&mut self, other: TypeIndex) {
        for (package, types) in other.packages {
            self.packages.entry(package).or_default().extend(types);
        }
        self.units.extend(other.units);
    }

    fn insert_type_list(&mut self, list: &str) {
        for line in list.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.insert_binary(line);
        }
    }

    /// Load a type-list file: one binary name per line, `#` comments.
    pub fn load_type_list(&mut self, path: &Path) -> Result<()> {
        let list = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.insert_type_list(&list);
        Ok(())
    }

    /// Index every type declared under a Java source root. Files that do not
    /// parse are skipped here; they fail on their own when processed.
    pub fn scan_sources(&mut self, root: &Path) -> Result<()> {
        let files = java_files(root)?;
        let scanned: Vec<TypeIndex> = files
            .par_iter()
            .filter_map(|file| {
                let text = match fs::read_to_string(file) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("not indexing {}: {e}", file.display());
                        return None;
                    }
                };
                match JavaSource::parse(text) {
                    Ok(source) => {
                        let mut index = TypeIndex::new();
                        index.add_source(&source);
                        Some(index)
                    }
                    Err(e) => {
                        tracing::debug!("not indexing {}: {e}", file.display());
                        None
                    }
                }
            })
            .collect();
        for index in scanned {
            self.merge(index);
        }
        tracing::debug!("indexed {} files under {}", files.len(), root.display());
        Ok(())
    }

    /// A classpath entry is either a source directory or a type-list file.
    pub fn add_classpath_entry(&mut self, path: &Path) -> Result<()> {
        if path.is_dir() {
            self.scan_sources(path)
        } else {
            self.load_type_list(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jdk_table_has_nested_types() {
        let index = TypeIndex::with_jdk();
        assert!(index.contains("java.util", "Map.Entry"));
        assert!(index.contains("java.lang", "String"));
        assert!(index.contains("java.util.function", "Function"));
        assert!(!index.contains("java.util", "Entry"));
    }

    #[test]
    fn splits_known_and_conventional_names() {
        let index = TypeIndex::with_jdk();
        assert_eq!(
            index.split_qualified("java.util.Map.Entry"),
            ClassName::new("java.util", "Map$Entry")
        );
        assert_eq!(
            index.split_qualified("org.acme.Outer.Inner"),
            ClassName::new("org.acme", "Outer$Inner")
        );
        assert_eq!(index.split_qualified("lower.case"), ClassName::new("lower", "case"));
        assert_eq!(index.class_for("java.util"), None);
    }

    #[test]
    fn loads_type_lists_and_sources() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("types.txt");
        fs::write(&list, "# extra\norg.lib.Thing$Part\n\n").unwrap();
        let src = dir.path().join("src/p");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("A.java"), "package p;\nclass A { interface B {} }\n").unwrap();
        fs::write(src.join("Broken.java"), "class {").unwrap();

        let mut index = TypeIndex::new();
        index.add_classpath_entry(&list).unwrap();
        index.add_classpath_entry(&dir.path().join("src")).unwrap();

        assert!(index.contains("org.lib", "Thing.Part"));
        assert!(index.contains("p", "A"));
        assert!(index.contains("p", "A.B"));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn missing_type_list_is_an_io_error() {
        let mut index = TypeIndex::new();
        let err = index.load_type_list(Path::new("/nonexistent/types.txt")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
