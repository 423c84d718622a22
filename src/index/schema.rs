use crate::error::{FacetryError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Text,
    Number,
    Boolean,
    Tags,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Text => "text",
            AttributeKind::Number => "number",
            AttributeKind::Boolean => "boolean",
            AttributeKind::Tags => "tags",
        }
    }

    /// Text and tag attributes take part in free-text matching by default.
    pub fn is_textual(self) -> bool {
        matches!(self, AttributeKind::Text | AttributeKind::Tags)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub name: String,
    pub kind: AttributeKind,
}

/// Fixed map from attribute name to kind, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: IndexMap<String, AttributeKind>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<AttributeKind> {
        self.attributes.get(name).copied()
    }

    /// Like [`Schema::get`], but an unknown name is an
    /// [`FacetryError::UnknownAttribute`].
    pub fn require(&self, name: &str) -> Result<AttributeKind> {
        self.get(name)
            .ok_or_else(|| FacetryError::UnknownAttribute(name.to_string()))
    }

    pub fn attributes(&self) -> impl Iterator<Item = AttributeDefinition> + '_ {
        self.attributes.iter().map(|(name, kind)| AttributeDefinition {
            name: name.clone(),
            kind: *kind,
        })
    }

    pub fn textual_attributes(&self) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, kind)| kind.is_textual())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

pub struct SchemaBuilder {
    attributes: IndexMap<String, AttributeKind>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder {
            attributes: IndexMap::new(),
        }
    }

    pub fn add_attribute(mut self, name: &str, kind: AttributeKind) -> Self {
        self.attributes.insert(name.to_string(), kind);
        self
    }

    pub fn add_text_field(self, name: &str) -> Self {
        self.add_attribute(name, AttributeKind::Text)
    }

    pub fn add_number_field(self, name: &str) -> Self {
        self.add_attribute(name, AttributeKind::Number)
    }

    pub fn add_boolean_field(self, name: &str) -> Self {
        self.add_attribute(name, AttributeKind::Boolean)
    }

    pub fn add_tags_field(self, name: &str) -> Self {
        self.add_attribute(name, AttributeKind::Tags)
    }

    pub fn build(self) -> Schema {
        Schema {
            attributes: self.attributes,
        }
    }
}

impl FromIterator<(String, AttributeKind)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, AttributeKind)>>(iter: I) -> Self {
        Schema {
            attributes: iter.into_iter().collect(),
        }
    }
}
