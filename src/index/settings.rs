use crate::index::schema::{AttributeKind, Schema};
use crate::query::facet::FacetDefinition;
use crate::query::filter::ThresholdPolicy;
use crate::query::sort::SortSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_max_values_per_facet() -> u32 {
    100
}

const MAX_VALUES_PER_FACET_CAP: u32 = 1000;

/// Engine configuration, stored as `settings.json`.
///
/// ```json
/// {
///   "attributes": {"name": "text", "price": "number", "tags": "tags"},
///   "facets": [{"id": "price", "attribute": "price", "kind": "numericRange", "min": 0, "max": 500}],
///   "searchableAttributes": ["name", "tags"],
///   "thresholdPolicy": "leastRestrictive",
///   "defaultSort": {"attribute": "price", "direction": "asc"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub attributes: IndexMap<String, AttributeKind>,

    pub facets: Vec<FacetDefinition>,

    /// Attributes searched by the free-text query. `None` means every text
    /// and tag attribute, in schema order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,

    pub threshold_policy: ThresholdPolicy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<SortSpec>,

    #[serde(default = "default_max_values_per_facet")]
    pub max_values_per_facet: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            attributes: IndexMap::new(),
            facets: Vec::new(),
            searchable_attributes: None,
            threshold_policy: ThresholdPolicy::default(),
            default_sort: None,
            max_values_per_facet: default_max_values_per_facet(),
        }
    }
}

impl EngineSettings {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn schema(&self) -> Schema {
        self.attributes
            .iter()
            .map(|(name, kind)| (name.clone(), *kind))
            .collect()
    }

    pub fn searchable(&self) -> Vec<String> {
        match &self.searchable_attributes {
            Some(attrs) => attrs.clone(),
            None => self.schema().textual_attributes(),
        }
    }

    /// `maxValuesPerFacet`, capped at 1000.
    pub fn facet_value_limit(&self) -> usize {
        self.max_values_per_facet.min(MAX_VALUES_PER_FACET_CAP) as usize
    }
}
