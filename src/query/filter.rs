use crate::error::{FacetryError, Result};
use crate::query::facet::{FacetDefinition, FacetKind, ValueDomain};
use crate::types::{AttributeValue, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Boolean facet selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

/// How several selected thresholds on one facet combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdPolicy {
    /// `>= min(selected)`: any selected threshold passing is enough.
    #[default]
    LeastRestrictive,
    /// `>= max(selected)`.
    MostRestrictive,
}

impl ThresholdPolicy {
    fn effective(self, thresholds: &[f64]) -> Option<f64> {
        let mut iter = thresholds.iter().copied();
        let first = iter.next()?;
        Some(match self {
            ThresholdPolicy::LeastRestrictive => iter.fold(first, f64::min),
            ThresholdPolicy::MostRestrictive => iter.fold(first, f64::max),
        })
    }
}

/// The currently chosen value(s) for one facet.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Categorical or tag values.
    Values { values: BTreeSet<String> },
    Range { min: f64, max: f64 },
    Thresholds { thresholds: Vec<f64> },
    Boolean { value: TriState },
}

impl Selection {
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Values {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Selection::Range { min, max }
    }

    pub fn thresholds<I: IntoIterator<Item = f64>>(thresholds: I) -> Self {
        Selection::Thresholds {
            thresholds: thresholds.into_iter().collect(),
        }
    }

    pub fn boolean(value: TriState) -> Self {
        Selection::Boolean { value }
    }

    /// Render in the body shape [`parse_selection`] accepts, so a reported
    /// selection can be sent back unchanged.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};
        match self {
            Selection::Values { values } => json!(values),
            Selection::Range { min, max } => json!({"min": min, "max": max}),
            Selection::Thresholds { thresholds } => json!(thresholds),
            Selection::Boolean { value } => match value {
                TriState::Any => Value::Null,
                TriState::Yes => Value::Bool(true),
                TriState::No => Value::Bool(false),
            },
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Selection::Values { .. } => "values",
            Selection::Range { .. } => "range",
            Selection::Thresholds { .. } => "thresholds",
            Selection::Boolean { .. } => "boolean",
        }
    }
}

/// A selection compiled against its facet definition.
#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    AnyOf(BTreeSet<String>),
    AllTags(BTreeSet<String>),
    Within(f64, f64),
    AtLeast(f64),
    Is(bool),
}

impl Constraint {
    fn test(&self, value: Option<&AttributeValue>) -> bool {
        match (self, value) {
            (Constraint::AnyOf(set), Some(AttributeValue::Text(s))) => set.contains(s),
            (Constraint::AllTags(wanted), Some(AttributeValue::Tags(tags))) => {
                wanted.is_subset(tags)
            }
            (Constraint::Within(lo, hi), Some(AttributeValue::Number(n))) => *n >= *lo && *n <= *hi,
            (Constraint::AtLeast(min), Some(AttributeValue::Number(n))) => *n >= *min,
            (Constraint::Is(b), Some(AttributeValue::Boolean(flag))) => flag == b,
            _ => false,
        }
    }
}

/// Validate `selection` for `def` and compile it.
///
/// Returns `Ok(None)` when the selection is the facet's neutral value.
fn compile(
    def: &FacetDefinition,
    selection: &Selection,
    policy: ThresholdPolicy,
) -> Result<Option<Constraint>> {
    let mismatch = || {
        FacetryError::invalid_selection(
            &def.id,
            format!(
                "{} facet does not accept a {} selection",
                def.kind_name(),
                selection.type_name()
            ),
        )
    };

    match (&def.kind, selection) {
        (FacetKind::Categorical { values: domain }, Selection::Values { values })
        | (FacetKind::Tags { values: domain }, Selection::Values { values }) => {
            check_domain(def, domain, values)?;
            if values.is_empty() {
                return Ok(None);
            }
            Ok(Some(match def.kind {
                FacetKind::Tags { .. } => Constraint::AllTags(values.clone()),
                _ => Constraint::AnyOf(values.clone()),
            }))
        }
        (
            FacetKind::NumericRange {
                min: full_min,
                max: full_max,
                ..
            },
            Selection::Range { min, max },
        ) => {
            if !min.is_finite() || !max.is_finite() {
                return Err(FacetryError::invalid_selection(
                    &def.id,
                    "range bounds must be finite numbers",
                ));
            }
            if min > max {
                return Err(FacetryError::invalid_selection(
                    &def.id,
                    format!("range min {} exceeds max {}", min, max),
                ));
            }
            if min == full_min && max == full_max {
                return Ok(None);
            }
            Ok(Some(Constraint::Within(*min, *max)))
        }
        (
            FacetKind::NumericThreshold {
                thresholds: allowed,
                floor,
            },
            Selection::Thresholds { thresholds },
        ) => {
            for t in thresholds {
                if !t.is_finite() {
                    return Err(FacetryError::invalid_selection(
                        &def.id,
                        "thresholds must be finite numbers",
                    ));
                }
                if !allowed.is_empty() && !allowed.contains(t) {
                    return Err(FacetryError::invalid_selection(
                        &def.id,
                        format!("{} is not a selectable threshold", t),
                    ));
                }
            }
            match policy.effective(thresholds) {
                Some(min) if min > *floor => Ok(Some(Constraint::AtLeast(min))),
                _ => Ok(None),
            }
        }
        (FacetKind::Boolean, Selection::Boolean { value }) => Ok(match value {
            TriState::Any => None,
            TriState::Yes => Some(Constraint::Is(true)),
            TriState::No => Some(Constraint::Is(false)),
        }),
        _ => Err(mismatch()),
    }
}

fn check_domain(def: &FacetDefinition, domain: &ValueDomain, values: &BTreeSet<String>) -> Result<()> {
    match values.iter().find(|v| !domain.admits(v)) {
        Some(v) => Err(FacetryError::invalid_selection(
            &def.id,
            format!("'{}' is not a legal value", v),
        )),
        None => Ok(()),
    }
}

/// Parse a JSON selection body for `def`.
///
/// Accepted shapes: a string or string array for categorical and tag facets,
/// `{"min": .., "max": ..}` or `[min, max]` for ranges, a number or number
/// array for thresholds, and `true`, `false`, `null` or `"any"` for booleans.
pub fn parse_selection(def: &FacetDefinition, json: &serde_json::Value) -> Result<Selection> {
    use serde_json::Value;

    let invalid = |what: &str| {
        FacetryError::invalid_selection(&def.id, format!("expected {}, got {}", what, json))
    };

    match &def.kind {
        FacetKind::Categorical { .. } | FacetKind::Tags { .. } => match json {
            Value::String(s) => Ok(Selection::values([s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<BTreeSet<String>>>()
                .map(|values| Selection::Values { values })
                .ok_or_else(|| invalid("a string or array of strings")),
            _ => Err(invalid("a string or array of strings")),
        },
        FacetKind::NumericRange { .. } => {
            let bounds = match json {
                Value::Object(obj) => obj
                    .get("min")
                    .and_then(Value::as_f64)
                    .zip(obj.get("max").and_then(Value::as_f64)),
                Value::Array(items) if items.len() == 2 => {
                    items[0].as_f64().zip(items[1].as_f64())
                }
                _ => None,
            };
            bounds
                .map(|(min, max)| Selection::range(min, max))
                .ok_or_else(|| invalid("{\"min\": number, \"max\": number} or [min, max]"))
        }
        FacetKind::NumericThreshold { .. } => match json {
            Value::Number(n) => n
                .as_f64()
                .map(|t| Selection::thresholds([t]))
                .ok_or_else(|| invalid("a number")),
            Value::Array(items) => items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .map(|thresholds| Selection::Thresholds { thresholds })
                .ok_or_else(|| invalid("a number or array of numbers")),
            _ => Err(invalid("a number or array of numbers")),
        },
        FacetKind::Boolean => match json {
            Value::Bool(true) => Ok(Selection::boolean(TriState::Yes)),
            Value::Bool(false) => Ok(Selection::boolean(TriState::No)),
            Value::Null => Ok(Selection::boolean(TriState::Any)),
            Value::String(s) if s.eq_ignore_ascii_case("any") => {
                Ok(Selection::boolean(TriState::Any))
            }
            _ => Err(invalid("true, false, null or \"any\"")),
        },
    }
}

#[derive(Debug, Clone)]
struct ActiveFilter {
    attribute: String,
    selection: Selection,
    constraint: Constraint,
}

/// The set of active facet selections plus the free-text query.
///
/// Only non-neutral selections are stored, so the number of entries is the
/// number of active facets.
#[derive(Debug, Clone)]
pub struct FilterSet {
    active: IndexMap<String, ActiveFilter>,
    free_text: String,
    free_text_lower: String,
    searchable: Vec<String>,
    policy: ThresholdPolicy,
}

impl FilterSet {
    pub fn new(searchable: Vec<String>, policy: ThresholdPolicy) -> Self {
        FilterSet {
            active: IndexMap::new(),
            free_text: String::new(),
            free_text_lower: String::new(),
            searchable,
            policy,
        }
    }

    /// Replace the selection for `def`. On error the previous selection is
    /// left in place.
    pub fn set_selection(&mut self, def: &FacetDefinition, selection: Selection) -> Result<()> {
        match compile(def, &selection, self.policy)? {
            Some(constraint) => {
                self.active.insert(
                    def.id.clone(),
                    ActiveFilter {
                        attribute: def.attribute.clone(),
                        selection,
                        constraint,
                    },
                );
            }
            None => {
                self.active.shift_remove(&def.id);
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, facet_id: &str) {
        self.active.shift_remove(facet_id);
    }

    /// Reset every facet selection and the free-text query.
    pub fn clear_all(&mut self) {
        self.active.clear();
        self.set_free_text("");
    }

    pub fn set_free_text(&mut self, query: &str) {
        self.free_text = query.to_string();
        self.free_text_lower = query.trim().to_lowercase();
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn selection(&self, facet_id: &str) -> Option<&Selection> {
        self.active.get(facet_id).map(|f| &f.selection)
    }

    pub fn is_active(&self, facet_id: &str) -> bool {
        self.active.contains_key(facet_id)
    }

    pub fn searchable_attributes(&self) -> &[String] {
        &self.searchable
    }

    pub fn threshold_policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Active facets plus one for a non-empty free-text query.
    pub fn active_count(&self) -> usize {
        self.active.len() + usize::from(!self.free_text_lower.is_empty())
    }

    /// AND of every active constraint and the free-text query. The facet
    /// named by `excluding` is skipped whether or not it is active.
    pub fn matches(&self, record: &Record, excluding: Option<&str>) -> bool {
        for (facet_id, filter) in &self.active {
            if excluding == Some(facet_id.as_str()) {
                continue;
            }
            if !filter.constraint.test(record.get(&filter.attribute)) {
                return false;
            }
        }
        self.matches_free_text(record)
    }

    fn matches_free_text(&self, record: &Record) -> bool {
        if self.free_text_lower.is_empty() {
            return true;
        }
        let needle = self.free_text_lower.as_str();
        self.searchable.iter().any(|attr| match record.get(attr) {
            Some(AttributeValue::Text(s)) => s.to_lowercase().contains(needle),
            Some(AttributeValue::Tags(tags)) => {
                let joined = tags.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
                joined.to_lowercase().contains(needle)
            }
            _ => false,
        })
    }
}
