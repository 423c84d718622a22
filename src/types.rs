use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Record identifier, unique within a [`RecordStore`](crate::RecordStore).
pub type RecordId = String;

/// Facet value to record count, in the facet's legal-value order.
pub type FacetCounts = IndexMap<String, usize>;

/// A record with an id and a set of named, typed attributes.
///
/// Records are immutable once loaded into a store. Use [`Record::from_json`]
/// to parse one from a JSON object, or [`Record::new`] plus
/// [`Record::with`] to build one in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub attributes: HashMap<String, AttributeValue>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Record {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Parse a [`Record`] from a JSON object.
    ///
    /// The identifier is read from `"id"`, `"objectID"` or `"_id"` (first
    /// present wins) and must be a string or an integer. Every other key is
    /// converted with [`json_value_to_attribute`]; `null` and empty arrays are
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`FacetryError::MissingField`](crate::FacetryError::MissingField) if no
    /// identifier is present, or
    /// [`FacetryError::InvalidDocument`](crate::FacetryError::InvalidDocument)
    /// if the value is not an object or holds an attribute with no
    /// [`AttributeValue`] representation.
    pub fn from_json(json: &serde_json::Value) -> crate::error::Result<Self> {
        use crate::error::FacetryError;

        let obj = json
            .as_object()
            .ok_or_else(|| FacetryError::InvalidDocument("Expected JSON object".to_string()))?;

        let id_value = ID_KEYS
            .iter()
            .find_map(|k| obj.get(*k))
            .ok_or_else(|| FacetryError::MissingField("id".to_string()))?;
        let id = match id_value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            other => {
                return Err(FacetryError::InvalidDocument(format!(
                    "Record id must be a string or integer, got {}",
                    other
                )))
            }
        };

        let mut attributes = HashMap::new();
        for (key, val) in obj {
            if ID_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(value) = json_value_to_attribute(key, val)? {
                attributes.insert(key.clone(), value);
            }
        }

        Ok(Record { id, attributes })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), serde_json::Value::String(self.id.clone()));
        let mut keys: Vec<&String> = self.attributes.keys().collect();
        keys.sort();
        for key in keys {
            map.insert(key.clone(), attribute_to_json_value(&self.attributes[key]));
        }
        serde_json::Value::Object(map)
    }
}

const ID_KEYS: [&str; 3] = ["id", "objectID", "_id"];

pub fn json_value_to_attribute(
    key: &str,
    val: &serde_json::Value,
) -> crate::error::Result<Option<AttributeValue>> {
    use crate::error::FacetryError;

    match val {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(AttributeValue::Text(s.clone()))),
        serde_json::Value::Bool(b) => Ok(Some(AttributeValue::Boolean(*b))),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(|f| Some(AttributeValue::Number(f)))
            .ok_or_else(|| {
                FacetryError::InvalidDocument(format!("Attribute '{}' is not a finite number", key))
            }),
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                return Ok(None);
            }
            let mut tags = BTreeSet::new();
            for item in items {
                match item.as_str() {
                    Some(s) => {
                        tags.insert(s.to_string());
                    }
                    None => {
                        return Err(FacetryError::InvalidDocument(format!(
                            "Attribute '{}' must be an array of strings",
                            key
                        )))
                    }
                }
            }
            Ok(Some(AttributeValue::Tags(tags)))
        }
        serde_json::Value::Object(_) => Err(FacetryError::InvalidDocument(format!(
            "Attribute '{}' is a nested object",
            key
        ))),
    }
}

pub fn attribute_to_json_value(value: &AttributeValue) -> serde_json::Value {
    match value {
        AttributeValue::Text(s) => serde_json::Value::String(s.clone()),
        AttributeValue::Number(n) => serde_json::json!(n),
        AttributeValue::Boolean(b) => serde_json::Value::Bool(*b),
        AttributeValue::Tags(tags) => {
            serde_json::Value::Array(tags.iter().cloned().map(serde_json::Value::String).collect())
        }
    }
}

/// A typed attribute value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Tags(BTreeSet<String>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttributeValue::Tags(t) => Some(t),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Number(n as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl<const N: usize> From<[&str; N]> for AttributeValue {
    fn from(tags: [&str; N]) -> Self {
        AttributeValue::Tags(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(tags: Vec<String>) -> Self {
        AttributeValue::Tags(tags.into_iter().collect())
    }
}

/// A facet value matched by
/// [`QueryEngine::search_facet_values`](crate::QueryEngine::search_facet_values).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetHit {
    pub value: String,
    pub highlighted: String,
    pub count: usize,
}

/// Snapshot returned by [`QueryEngine::execute`](crate::QueryEngine::execute).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Matching record ids in sort order.
    pub ids: Vec<RecordId>,
    pub total: usize,
    /// Counts-excluding-self tables keyed by facet id, in definition order.
    pub facets: IndexMap<String, FacetCounts>,
    pub active_filter_count: usize,
    #[serde(rename = "processingTimeMS")]
    pub processing_time_ms: u64,
}
