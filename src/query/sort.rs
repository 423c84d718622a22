//! Sort specification and the typed comparators behind it.

use crate::error::{FacetryError, Result};
use crate::index::schema::{AttributeKind, Schema};
use crate::types::{AttributeValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Attribute name that selects record-store order.
pub const STORE_ORDER: &str = "_store";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = FacetryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(FacetryError::Config(format!(
                "unknown sort direction '{}'",
                other
            ))),
        }
    }
}

/// Attribute plus direction. Exactly one is active per engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub attribute: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(attribute: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            attribute: attribute.into(),
            direction,
        }
    }

    pub fn store_order() -> Self {
        Self::new(STORE_ORDER, SortDirection::Asc)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::store_order()
    }
}

/// Sort attribute resolved against the schema; selects the comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    StoreOrder,
    Text(String),
    Number(String),
    Boolean(String),
}

impl SortKey {
    pub fn resolve(attribute: &str, schema: &Schema) -> Result<Self> {
        if attribute == STORE_ORDER {
            return Ok(SortKey::StoreOrder);
        }
        match schema.require(attribute)? {
            AttributeKind::Text => Ok(SortKey::Text(attribute.to_string())),
            AttributeKind::Number => Ok(SortKey::Number(attribute.to_string())),
            AttributeKind::Boolean => Ok(SortKey::Boolean(attribute.to_string())),
            AttributeKind::Tags => Err(FacetryError::UnsortableAttribute(attribute.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortPolicy {
    spec: SortSpec,
    key: SortKey,
}

impl Default for SortPolicy {
    fn default() -> Self {
        SortPolicy {
            spec: SortSpec::store_order(),
            key: SortKey::StoreOrder,
        }
    }
}

impl SortPolicy {
    pub fn resolve(spec: SortSpec, schema: &Schema) -> Result<Self> {
        let key = SortKey::resolve(&spec.attribute, schema)?;
        Ok(SortPolicy { spec, key })
    }

    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }

    /// Order `records`, which must be in store order on entry.
    ///
    /// The sort is stable, so equal keys keep store order in both directions.
    /// Records without the attribute go last, also in both directions.
    pub fn apply<'a>(&self, mut records: Vec<&'a Record>) -> Vec<&'a Record> {
        let direction = self.spec.direction;
        match &self.key {
            SortKey::StoreOrder => {
                if direction == SortDirection::Desc {
                    records.reverse();
                }
            }
            SortKey::Text(attr) => records.sort_by(|a, b| {
                compare_present(
                    a.get(attr).and_then(AttributeValue::as_text),
                    b.get(attr).and_then(AttributeValue::as_text),
                    direction,
                    |x, y| x.cmp(y),
                )
            }),
            SortKey::Number(attr) => records.sort_by(|a, b| {
                compare_present(
                    a.get(attr).and_then(AttributeValue::as_number),
                    b.get(attr).and_then(AttributeValue::as_number),
                    direction,
                    |x, y| x.total_cmp(&y),
                )
            }),
            SortKey::Boolean(attr) => records.sort_by(|a, b| {
                compare_present(
                    a.get(attr).and_then(AttributeValue::as_bool),
                    b.get(attr).and_then(AttributeValue::as_bool),
                    direction,
                    |x, y| x.cmp(&y),
                )
            }),
        }
        records
    }
}

fn compare_present<T, F>(a: Option<T>, b: Option<T>, direction: SortDirection, cmp: F) -> Ordering
where
    F: Fn(T, T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(cmp(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
