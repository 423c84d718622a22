use super::QueryEngine;
use crate::error::Result;
use crate::query::facet::FacetDefinition;
use crate::types::{FacetCounts, FacetHit};
use indexmap::IndexMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

impl QueryEngine {
    /// Counts-excluding-self for one facet: for each legal value, the number
    /// of records that pass every other active filter (and the free-text
    /// query) and carry that value.
    pub fn counts_for(&self, facet_id: &str) -> Result<FacetCounts> {
        let def = self.facet(facet_id)?;
        Ok(self.count_facet(def))
    }

    /// Alias of [`QueryEngine::counts_for`].
    pub fn counts(&self, facet_id: &str) -> Result<FacetCounts> {
        self.counts_for(facet_id)
    }

    /// Count tables for every defined facet, in definition order.
    pub fn all_counts(&self) -> IndexMap<String, FacetCounts> {
        let t0 = std::time::Instant::now();
        let defs: Vec<&FacetDefinition> = self.facets.values().collect();

        #[cfg(feature = "parallel")]
        let tables: Vec<FacetCounts> = defs.par_iter().map(|def| self.count_facet(def)).collect();
        #[cfg(not(feature = "parallel"))]
        let tables: Vec<FacetCounts> = defs.iter().map(|def| self.count_facet(def)).collect();

        tracing::debug!(
            "[FACETS] all_counts facets={} records={} elapsed={:?}",
            defs.len(),
            self.store.len(),
            t0.elapsed()
        );
        defs.into_iter()
            .map(|def| def.id.clone())
            .zip(tables)
            .collect()
    }

    fn count_facet(&self, def: &FacetDefinition) -> FacetCounts {
        let t0 = std::time::Instant::now();
        let probes = def.legal_values(&self.store);
        let mut counts: FacetCounts = probes.iter().map(|(label, _)| (label.clone(), 0)).collect();

        for record in self.store.all() {
            if !self.filters.matches(record, Some(&def.id)) {
                continue;
            }
            let value = record.get(&def.attribute);
            for (label, probe) in &probes {
                if probe.test(value) {
                    if let Some(count) = counts.get_mut(label) {
                        *count += 1;
                    }
                }
            }
        }

        tracing::debug!(
            "[FACETS] counted facet={} values={} elapsed={:?}",
            def.id,
            counts.len(),
            t0.elapsed()
        );
        counts
    }

    /// Search a facet's legal values for `query` (case-insensitive
    /// substring). Hits carry their counts-excluding-self and are ordered by
    /// count, highest first; ties keep the facet's value order. At most
    /// `max_hits` hits are returned, further capped by `maxValuesPerFacet`.
    pub fn search_facet_values(
        &self,
        facet_id: &str,
        query: &str,
        max_hits: usize,
    ) -> Result<Vec<FacetHit>> {
        let counts = self.counts_for(facet_id)?;
        let query_lower = query.to_lowercase();

        let mut hits: Vec<FacetHit> = counts
            .into_iter()
            .filter(|(value, _)| value.to_lowercase().contains(&query_lower))
            .map(|(value, count)| FacetHit {
                highlighted: highlight_facet_match(&value, query),
                value,
                count,
            })
            .collect();
        hits.sort_by(|a, b| b.count.cmp(&a.count));
        hits.truncate(max_hits.min(self.max_values_per_facet));
        Ok(hits)
    }
}

/// Wrap the first case-insensitive occurrence of `query` in `<em>` tags.
///
/// Matching runs on the lowercased value; every lowercased byte remembers the
/// original char it came from, so the tags land on the original text even
/// when lowercasing changes byte lengths.
fn highlight_facet_match(value: &str, query: &str) -> String {
    let query_lower = query.to_lowercase();
    if query_lower.is_empty() {
        return value.to_string();
    }

    let mut lowered = String::with_capacity(value.len());
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(value.len());
    for (start, ch) in value.char_indices() {
        let span = (start, start + ch.len_utf8());
        for lc in ch.to_lowercase() {
            lowered.push(lc);
            origin.extend(std::iter::repeat(span).take(lc.len_utf8()));
        }
    }

    let span = lowered.find(&query_lower).and_then(|pos| {
        let first = origin.get(pos)?;
        let last = origin.get(pos + query_lower.len() - 1)?;
        Some((first.0, last.1))
    });
    match span {
        Some((start, end)) => format!(
            "{}<em>{}</em>{}",
            &value[..start],
            &value[start..end],
            &value[end..]
        ),
        None => value.to_string(),
    }
}
