mod facets;

use crate::error::{FacetryError, Result};
use crate::index::schema::Schema;
use crate::index::settings::EngineSettings;
use crate::index::store::RecordStore;
use crate::query::facet::FacetDefinition;
use crate::query::filter::{parse_selection, FilterSet, Selection, ThresholdPolicy};
use crate::query::sort::{SortDirection, SortPolicy, SortSpec};
use crate::types::{QueryResult, Record, RecordId};
use indexmap::IndexMap;
use std::collections::HashSet;

/// One session's filter-and-sort state over an immutable [`RecordStore`].
///
/// Every query method is a pure function of the current state: the result is
/// recomputed from the store on each call, never patched incrementally.
/// Mutations are synchronous and visible to the next call.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    schema: Schema,
    store: RecordStore,
    facets: IndexMap<String, FacetDefinition>,
    filters: FilterSet,
    sort: SortPolicy,
    max_values_per_facet: usize,
}

impl QueryEngine {
    /// Engine with an empty store, no facets, store-order sort, the least
    /// restrictive threshold policy and every text and tag attribute
    /// searchable.
    pub fn new(schema: Schema) -> Self {
        let searchable = schema.textual_attributes();
        QueryEngine {
            schema,
            store: RecordStore::default(),
            facets: IndexMap::new(),
            filters: FilterSet::new(searchable, ThresholdPolicy::default()),
            sort: SortPolicy::default(),
            max_values_per_facet: 100,
        }
    }

    /// Build an engine from `settings.json` contents: schema, searchable
    /// attributes, threshold policy, facets and default sort.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        let mut engine = QueryEngine::new(settings.schema())
            .with_threshold_policy(settings.threshold_policy);
        engine.set_searchable_attributes(settings.searchable())?;
        engine.define_facets(settings.facets.clone())?;
        if let Some(spec) = &settings.default_sort {
            engine.set_sort(&spec.attribute, spec.direction)?;
        }
        engine.max_values_per_facet = settings.facet_value_limit();
        Ok(engine)
    }

    /// Replace the threshold policy. Resets every selection and the
    /// free-text query.
    pub fn with_threshold_policy(mut self, policy: ThresholdPolicy) -> Self {
        let searchable = self.filters.searchable_attributes().to_vec();
        self.filters = FilterSet::new(searchable, policy);
        self
    }

    /// Replace the attributes searched by the free-text query. Every name
    /// must be a text or tag attribute. Current selections are kept.
    pub fn set_searchable_attributes(&mut self, attributes: Vec<String>) -> Result<()> {
        for attr in &attributes {
            if !self.schema.require(attr)?.is_textual() {
                return Err(FacetryError::Config(format!(
                    "searchable attribute '{}' is not a text or tags attribute",
                    attr
                )));
            }
        }
        let mut filters = FilterSet::new(attributes, self.filters.threshold_policy());
        for (facet_id, def) in &self.facets {
            if let Some(selection) = self.filters.selection(facet_id) {
                filters.set_selection(def, selection.clone())?;
            }
        }
        filters.set_free_text(self.filters.free_text());
        self.filters = filters;
        Ok(())
    }

    /// Replace the working set of records. Selections, free text and sort
    /// are kept.
    pub fn load_records(&mut self, records: Vec<Record>) -> Result<()> {
        self.store = RecordStore::load(records)?;
        Ok(())
    }

    /// Use an already loaded store, shared with other engines.
    pub fn use_store(&mut self, store: RecordStore) {
        self.store = store;
    }

    /// Replace the facet definitions. The whole set is validated first; on
    /// error the previous definitions stay in place. On success every facet
    /// selection is reset (the free-text query is kept).
    pub fn define_facets(&mut self, facets: Vec<FacetDefinition>) -> Result<()> {
        let mut seen = HashSet::new();
        for def in &facets {
            if !seen.insert(def.id.as_str()) {
                return Err(FacetryError::DuplicateFacet(def.id.clone()));
            }
            def.validate(&self.schema)?;
        }

        let free_text = self.filters.free_text().to_string();
        self.filters.clear_all();
        self.filters.set_free_text(&free_text);
        self.facets = facets.into_iter().map(|f| (f.id.clone(), f)).collect();
        tracing::info!(facets = self.facets.len(), "[FACETS] defined facets");
        Ok(())
    }

    fn facet(&self, facet_id: &str) -> Result<&FacetDefinition> {
        self.facets
            .get(facet_id)
            .ok_or_else(|| FacetryError::UnknownFacet(facet_id.to_string()))
    }

    /// Replace the selection for one facet. Invalid selections are rejected
    /// and leave the previous selection unchanged.
    pub fn set_filter(&mut self, facet_id: &str, selection: Selection) -> Result<()> {
        let def = self
            .facets
            .get(facet_id)
            .ok_or_else(|| FacetryError::UnknownFacet(facet_id.to_string()))?;
        self.filters.set_selection(def, selection)
    }

    /// [`QueryEngine::set_filter`] from a JSON selection body; see
    /// [`parse_selection`] for the accepted shapes.
    pub fn set_filter_json(&mut self, facet_id: &str, json: &serde_json::Value) -> Result<()> {
        let selection = parse_selection(self.facet(facet_id)?, json)?;
        self.set_filter(facet_id, selection)
    }

    pub fn clear_filter(&mut self, facet_id: &str) -> Result<()> {
        self.facet(facet_id)?;
        self.filters.clear(facet_id);
        Ok(())
    }

    /// Reset every facet selection and the free-text query.
    pub fn clear_all_filters(&mut self) {
        self.filters.clear_all();
    }

    pub fn set_free_text(&mut self, query: &str) {
        self.filters.set_free_text(query);
    }

    pub fn set_sort(&mut self, attribute: &str, direction: SortDirection) -> Result<()> {
        self.sort = SortPolicy::resolve(SortSpec::new(attribute, direction), &self.schema)?;
        Ok(())
    }

    /// Whether `record` passes every active filter and the free-text query.
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.matches(record, None)
    }

    /// Ids of every matching record, in sort order.
    pub fn run(&self) -> Vec<RecordId> {
        let t0 = std::time::Instant::now();
        let matching: Vec<&Record> = self
            .store
            .all()
            .iter()
            .filter(|r| self.filters.matches(r, None))
            .collect();
        let t1 = t0.elapsed();
        let ordered = self.sort.apply(matching);
        tracing::debug!(
            "[RUN] matched={} of {} filter={:?} sort={:?} ({} {})",
            ordered.len(),
            self.store.len(),
            t1,
            t0.elapsed().saturating_sub(t1),
            self.sort.spec().attribute,
            self.sort.spec().direction
        );
        ordered.into_iter().map(|r| r.id.clone()).collect()
    }

    /// Number of active facets, plus one for a non-empty free-text query.
    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count()
    }

    /// Result ids plus every facet's count table, computed from one state.
    pub fn execute(&self) -> QueryResult {
        let start = std::time::Instant::now();
        let ids = self.run();
        let facets = self.all_counts();
        QueryResult {
            total: ids.len(),
            ids,
            facets,
            active_filter_count: self.active_filter_count(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[Record] {
        self.store.all()
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.store.get(id)
    }

    pub fn facets(&self) -> impl Iterator<Item = &FacetDefinition> {
        self.facets.values()
    }

    pub fn selection(&self, facet_id: &str) -> Option<&Selection> {
        self.filters.selection(facet_id)
    }

    pub fn free_text(&self) -> &str {
        self.filters.free_text()
    }

    pub fn sort_spec(&self) -> &SortSpec {
        self.sort.spec()
    }

    pub fn threshold_policy(&self) -> ThresholdPolicy {
        self.filters.threshold_policy()
    }
}
