use crate::error::{FacetryError, Result};
use crate::index::schema::{AttributeKind, Schema};
use crate::index::store::RecordStore;
use crate::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One filterable dimension of a record.
///
/// Serialised flat, with the kind as a tag:
///
/// ```json
/// {"id": "price", "attribute": "price", "kind": "numericRange", "min": 0, "max": 500}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetDefinition {
    pub id: String,
    pub attribute: String,
    #[serde(flatten)]
    pub kind: FacetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FacetKind {
    /// Single text value per record; selecting several values is a union.
    Categorical {
        #[serde(default)]
        values: ValueDomain,
    },
    /// Tag set per record; a record must carry every selected tag.
    Tags {
        #[serde(default)]
        values: ValueDomain,
    },
    Boolean,
    /// Inclusive `[min, max]` filter. `[min, max]` here is the full range,
    /// which is the neutral selection. Counts are reported per bucket.
    #[serde(rename_all = "camelCase")]
    NumericRange {
        min: f64,
        max: f64,
        #[serde(default)]
        buckets: Vec<RangeBucket>,
    },
    /// Minimum-value filter. Counts are reported per selectable threshold.
    #[serde(rename_all = "camelCase")]
    NumericThreshold {
        #[serde(default)]
        thresholds: Vec<f64>,
        #[serde(default)]
        floor: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBucket {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

/// Legal values of a categorical or tag facet.
///
/// `Closed` keeps the declared order and rejects anything else at selection
/// time. `Open` derives its values from the store, sorted ascending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Option<Vec<String>>")]
pub enum ValueDomain {
    #[default]
    Open,
    Closed(Vec<String>),
}

impl From<Option<Vec<String>>> for ValueDomain {
    fn from(values: Option<Vec<String>>) -> Self {
        match values {
            Some(v) => ValueDomain::Closed(v),
            None => ValueDomain::Open,
        }
    }
}

impl From<ValueDomain> for Option<Vec<String>> {
    fn from(domain: ValueDomain) -> Self {
        match domain {
            ValueDomain::Open => None,
            ValueDomain::Closed(v) => Some(v),
        }
    }
}

impl ValueDomain {
    pub fn admits(&self, value: &str) -> bool {
        match self {
            ValueDomain::Open => true,
            ValueDomain::Closed(values) => values.iter().any(|v| v == value),
        }
    }
}

/// Test applied to a record's attribute when counting one facet value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueProbe {
    Equals(String),
    HasTag(String),
    Is(bool),
    AtLeast(f64),
    Within(f64, f64),
}

impl ValueProbe {
    pub fn test(&self, value: Option<&AttributeValue>) -> bool {
        match (self, value) {
            (ValueProbe::Equals(v), Some(AttributeValue::Text(s))) => s == v,
            (ValueProbe::HasTag(t), Some(AttributeValue::Tags(tags))) => tags.contains(t),
            (ValueProbe::Is(b), Some(AttributeValue::Boolean(flag))) => flag == b,
            (ValueProbe::AtLeast(min), Some(AttributeValue::Number(n))) => *n >= *min,
            (ValueProbe::Within(lo, hi), Some(AttributeValue::Number(n))) => *n >= *lo && *n <= *hi,
            _ => false,
        }
    }
}

/// Display label for a numeric facet value: `4` rather than `4.0`.
pub fn number_label(n: f64) -> String {
    format!("{}", n)
}

impl FacetDefinition {
    pub fn categorical(id: &str, attribute: &str) -> Self {
        Self::new(id, attribute, FacetKind::Categorical { values: ValueDomain::Open })
    }

    pub fn tags(id: &str, attribute: &str) -> Self {
        Self::new(id, attribute, FacetKind::Tags { values: ValueDomain::Open })
    }

    pub fn boolean(id: &str, attribute: &str) -> Self {
        Self::new(id, attribute, FacetKind::Boolean)
    }

    pub fn numeric_range(id: &str, attribute: &str, min: f64, max: f64) -> Self {
        Self::new(
            id,
            attribute,
            FacetKind::NumericRange {
                min,
                max,
                buckets: Vec::new(),
            },
        )
    }

    pub fn numeric_threshold(id: &str, attribute: &str, thresholds: Vec<f64>) -> Self {
        Self::new(
            id,
            attribute,
            FacetKind::NumericThreshold {
                thresholds,
                floor: 0.0,
            },
        )
    }

    pub fn new(id: &str, attribute: &str, kind: FacetKind) -> Self {
        FacetDefinition {
            id: id.to_string(),
            attribute: attribute.to_string(),
            kind,
        }
    }

    /// Restrict a categorical or tag facet to a closed value set.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let closed = ValueDomain::Closed(values.into_iter().map(Into::into).collect());
        match &mut self.kind {
            FacetKind::Categorical { values } | FacetKind::Tags { values } => *values = closed,
            _ => {}
        }
        self
    }

    pub fn with_buckets(mut self, new_buckets: Vec<RangeBucket>) -> Self {
        if let FacetKind::NumericRange { buckets, .. } = &mut self.kind {
            *buckets = new_buckets;
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            FacetKind::Categorical { .. } => "categorical",
            FacetKind::Tags { .. } => "tags",
            FacetKind::Boolean => "boolean",
            FacetKind::NumericRange { .. } => "numericRange",
            FacetKind::NumericThreshold { .. } => "numericThreshold",
        }
    }

    fn required_attribute_kind(&self) -> AttributeKind {
        match self.kind {
            FacetKind::Categorical { .. } => AttributeKind::Text,
            FacetKind::Tags { .. } => AttributeKind::Tags,
            FacetKind::Boolean => AttributeKind::Boolean,
            FacetKind::NumericRange { .. } | FacetKind::NumericThreshold { .. } => {
                AttributeKind::Number
            }
        }
    }

    /// Check the definition against `schema`.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if self.id.is_empty() {
            return Err(FacetryError::invalid_facet(&self.id, "facet id is empty"));
        }
        let attribute_kind = schema.require(&self.attribute)?;
        if attribute_kind != self.required_attribute_kind() {
            return Err(FacetryError::IncompatibleFacet {
                facet: self.id.clone(),
                facet_kind: self.kind_name().to_string(),
                attribute: self.attribute.clone(),
                attribute_kind: attribute_kind.to_string(),
            });
        }

        match &self.kind {
            FacetKind::Categorical { values } | FacetKind::Tags { values } => {
                if let ValueDomain::Closed(values) = values {
                    let mut seen = HashSet::new();
                    if let Some(dup) = values.iter().find(|v| !seen.insert(v.as_str())) {
                        return Err(FacetryError::invalid_facet(
                            &self.id,
                            format!("value '{}' listed twice", dup),
                        ));
                    }
                }
            }
            FacetKind::Boolean => {}
            FacetKind::NumericRange { min, max, buckets } => {
                check_bounds(&self.id, *min, *max)?;
                let mut labels = HashSet::new();
                for bucket in buckets {
                    check_bounds(&self.id, bucket.min, bucket.max)?;
                    if !labels.insert(bucket.label.as_str()) {
                        return Err(FacetryError::invalid_facet(
                            &self.id,
                            format!("bucket '{}' listed twice", bucket.label),
                        ));
                    }
                }
            }
            FacetKind::NumericThreshold { thresholds, floor } => {
                if !floor.is_finite() || thresholds.iter().any(|t| !t.is_finite()) {
                    return Err(FacetryError::invalid_facet(
                        &self.id,
                        "thresholds must be finite numbers",
                    ));
                }
                let mut labels = HashSet::new();
                for t in thresholds {
                    let label = number_label(*t);
                    if !labels.insert(label.clone()) {
                        return Err(FacetryError::invalid_facet(
                            &self.id,
                            format!("threshold '{}' listed twice", label),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Every legal value of this facet with the probe that decides whether a
    /// record carries it.
    pub fn legal_values(&self, store: &RecordStore) -> Vec<(String, ValueProbe)> {
        match &self.kind {
            FacetKind::Categorical { values } => self
                .domain_values(values, store)
                .into_iter()
                .map(|v| (v.clone(), ValueProbe::Equals(v)))
                .collect(),
            FacetKind::Tags { values } => self
                .domain_values(values, store)
                .into_iter()
                .map(|v| (v.clone(), ValueProbe::HasTag(v)))
                .collect(),
            FacetKind::Boolean => vec![
                ("true".to_string(), ValueProbe::Is(true)),
                ("false".to_string(), ValueProbe::Is(false)),
            ],
            FacetKind::NumericRange { buckets, .. } => buckets
                .iter()
                .map(|b| (b.label.clone(), ValueProbe::Within(b.min, b.max)))
                .collect(),
            FacetKind::NumericThreshold { thresholds, .. } => thresholds
                .iter()
                .map(|t| (number_label(*t), ValueProbe::AtLeast(*t)))
                .collect(),
        }
    }

    fn domain_values(&self, domain: &ValueDomain, store: &RecordStore) -> Vec<String> {
        match domain {
            ValueDomain::Closed(values) => values.clone(),
            ValueDomain::Open => {
                let mut seen = BTreeSet::new();
                for record in store.all() {
                    match record.get(&self.attribute) {
                        Some(AttributeValue::Text(s)) => {
                            seen.insert(s.clone());
                        }
                        Some(AttributeValue::Tags(tags)) => seen.extend(tags.iter().cloned()),
                        _ => {}
                    }
                }
                if seen.is_empty() && !store.is_empty() {
                    tracing::warn!(
                        facet = %self.id,
                        attribute = %self.attribute,
                        "open facet has no values in the record store"
                    );
                }
                seen.into_iter().collect()
            }
        }
    }
}

fn check_bounds(facet: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(FacetryError::invalid_facet(facet, "range bounds must be finite"));
    }
    if min > max {
        return Err(FacetryError::invalid_facet(
            facet,
            format!("range min {} exceeds max {}", min, max),
        ));
    }
    Ok(())
}
