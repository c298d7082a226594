//! Spec layer: catalogue entries and their addressable collection.
//!
//! This module owns:
//! - Path (spec id) and Pattern (anchored path regex)
//! - Tag (type-erased enumeration member)
//! - Spec (one entry) and Specs (ordered arena + query views)

pub mod path;
pub mod specs;
pub mod tag;

pub use path::{Path, Pattern};
pub use specs::{Selector, Specs, View};
pub use tag::{Tag, TagKind};

use crate::model::{Type, Value};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spec {
    pub id: Path,
    /// Display name; the last id segment unless a Name directive renamed it.
    pub name: String,
    pub tags: Vec<Tag>,
    #[serde(rename = "type")]
    pub ty: Type,
    /// Empty for schema-only nodes.
    pub data: Option<Value>,
}

impl Spec {
    pub fn new(id: Path, ty: Type) -> Self {
        Self {
            name: id.name().to_string(),
            id,
            tags: Vec::new(),
            ty,
            data: None,
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<Tag>>) -> Self {
        for tag in tags {
            tag::push_unique(&mut self.tags, tag.into());
        }
        self
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_family<K: TagKind>(&self) -> bool {
        self.tags.iter().any(Tag::is::<K>)
    }

    pub fn attr(&self, attr: Attr) -> AttrValue {
        match attr {
            Attr::Id => AttrValue::Id(self.id.clone()),
            Attr::Name => AttrValue::Name(self.name.clone()),
            Attr::Tags => AttrValue::Tags(self.tags.clone()),
            Attr::Type => AttrValue::Type(self.ty.clone()),
            Attr::Data => AttrValue::Data(self.data.clone()),
        }
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.id, self.name, self.ty)?;
        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().map(Tag::to_string).collect();
            write!(f, " [{}]", tags.join(", "))?;
        }
        match &self.data {
            Some(data) => write!(f, " = {}", data),
            None => Ok(()),
        }
    }
}

/// Spec attributes addressable by grouping and by directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Attr {
    Id,
    Name,
    Tags,
    Type,
    Data,
}

impl Attr {
    pub fn as_str(self) -> &'static str {
        match self {
            Attr::Id => "id",
            Attr::Name => "name",
            Attr::Tags => "tags",
            Attr::Type => "type",
            Attr::Data => "data",
        }
    }
}

impl FromStr for Attr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(Attr::Id),
            "name" => Ok(Attr::Name),
            "tags" => Ok(Attr::Tags),
            "type" => Ok(Attr::Type),
            "data" => Ok(Attr::Data),
            _ => Err(Error::InvalidSelector {
                name: s.to_string(),
                reason: "expected one of id, name, tags, type, data",
            }),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute value compared by equality (used as a grouping key).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Id(Path),
    Name(String),
    Tags(Vec<Tag>),
    Type(Type),
    Data(Option<Value>),
}
