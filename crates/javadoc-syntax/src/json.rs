//! JSON shape of a [`Javadoc`]:
//!
//! ```json
//! { "description": ["line"], "tags": { "param x": "text", "see": ["l1", "l2"] } }
//! ```
//!
//! Both keys are omitted when empty. Tag order is kept, including repeated
//! keys, so the tags object is (de)serialized by hand.

use crate::{BlockTag, Javadoc};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

impl Serialize for Javadoc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(!self.description.is_empty()) + usize::from(!self.tags.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.description.is_empty() {
            map.serialize_entry("description", &self.description)?;
        }
        if !self.tags.is_empty() {
            map.serialize_entry("tags", &Tags(&self.tags))?;
        }
        map.end()
    }
}

struct Tags<'a>(&'a [BlockTag]);

impl Serialize for Tags<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for tag in self.0 {
            if tag.is_multiline() {
                let lines: Vec<&str> = tag.lines().collect();
                map.serialize_entry(&tag.key(), &lines)?;
            } else {
                map.serialize_entry(&tag.key(), &tag.content)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Javadoc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            description: Vec<String>,
            #[serde(default)]
            tags: TagList,
        }

        let wire = Wire::deserialize(deserializer)?;
        Ok(Javadoc::new(wire.description, wire.tags.0))
    }
}

#[derive(Default)]
struct TagList(Vec<BlockTag>);

#[derive(Deserialize)]
#[serde(untagged)]
enum TagContent {
    Line(String),
    Lines(Vec<String>),
}

impl TagContent {
    fn into_text(self) -> String {
        match self {
            TagContent::Line(line) => line,
            TagContent::Lines(lines) => lines.join("\n"),
        }
    }
}

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TagListVisitor)
    }
}

struct TagListVisitor;

impl<'de> Visitor<'de> for TagListVisitor {
    type Value = TagList;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping tag names to a string or an array of lines")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TagList, A::Error> {
        let mut tags = Vec::new();
        while let Some((key, content)) = map.next_entry::<String, TagContent>()? {
            tags.push(BlockTag::from_key(&key, content.into_text()));
        }
        Ok(TagList(tags))
    }
}
