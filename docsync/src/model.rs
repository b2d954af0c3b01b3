//! Sidecar document model: per-class documentation keyed by member identity.

use crate::error::{Error, Result};
use javadoc_syntax::Javadoc;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Entries that are addressed by a string key inside a [`Registry`].
pub trait Keyed {
    fn key(&self) -> String;
}

/// Insertion-ordered map with a key index. Serialized as a JSON array;
/// duplicate keys in the input are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    /// Add `item`, or hand it back if its key is already taken.
    pub fn insert(&mut self, item: T) -> std::result::Result<(), T> {
        let key = item.key();
        if self.index.contains_key(&key) {
            return Err(item);
        }
        self.index.insert(key, self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Existing entry for `key`, or a new one appended from `make`.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.index.insert(key.to_string(), self.items.len());
                self.items.push(make());
                self.items.len() - 1
            }
        };
        &mut self.items[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Serialize> Serialize for Registry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl<'de, T: Keyed + Deserialize<'de>> Deserialize<'de> for Registry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut registry = Registry::new();
        for item in items {
            if let Err(dup) = registry.insert(item) {
                return Err(de::Error::custom(format!("duplicate entry `{}`", dup.key())));
            }
        }
        Ok(registry)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javadoc: Option<Javadoc>,
}

impl Keyed for FieldInfo {
    fn key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub descriptor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javadoc: Option<Javadoc>,
}

impl Keyed for MethodInfo {
    fn key(&self) -> String {
        crate::identity::member_key(&self.name, &self.descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javadoc: Option<Javadoc>,
    #[serde(default, skip_serializing_if = "Registry::is_empty")]
    pub fields: Registry<FieldInfo>,
    #[serde(default, skip_serializing_if = "Registry::is_empty")]
    pub methods: Registry<MethodInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            javadoc: None,
            fields: Registry::new(),
            methods: Registry::new(),
        }
    }

    /// Documentation recorded for a field or method registry key.
    pub fn member_doc(&self, key: &str) -> Option<&Javadoc> {
        self.fields
            .get(key)
            .and_then(|f| f.javadoc.as_ref())
            .or_else(|| self.methods.get(key).and_then(|m| m.javadoc.as_ref()))
    }
}

impl Keyed for ClassInfo {
    fn key(&self) -> String {
        self.name.clone()
    }
}

/// Sidecar of one source file: its documented classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocInfo {
    classes: Registry<ClassInfo>,
}

impl DocInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, key: &str) -> Option<&ClassInfo> {
        self.classes.get(key)
    }

    pub fn class_mut(&mut self, key: &str) -> &mut ClassInfo {
        self.classes.get_or_insert_with(key, || ClassInfo::new(key))
    }

    pub fn classes(&self) -> std::slice::Iter<'_, ClassInfo> {
        self.classes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Sidecar of a `package-info.java` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javadoc: Option<Javadoc>,
}

impl PackageInfo {
    pub fn is_empty(&self) -> bool {
        self.javadoc.as_ref().map_or(true, Javadoc::is_empty)
    }
}

/// Pretty JSON with four-space indentation and a trailing newline.
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| Error::MalformedSidecar {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a sidecar, creating parent directories. Never overwrites.
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_json(value).map_err(|e| Error::io(path, io::Error::other(e)))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::DestinationExists {
                path: path.to_path_buf(),
            },
            _ => Error::io(path, e),
        })?;
    file.write_all(&bytes).map_err(|e| Error::io(path, e))
}
