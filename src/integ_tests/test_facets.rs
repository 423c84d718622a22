//! Facet counting scenarios: counts-excluding-self across facet kinds, with
//! other selections and the free-text query narrowing the counted set.

use crate::query::facet::RangeBucket;
use crate::{
    FacetCounts, FacetDefinition, QueryEngine, Record, Schema, Selection, ThresholdPolicy,
    TriState,
};

// ============================================================
// Shared helpers
// ============================================================

fn abc_engine() -> QueryEngine {
    let schema = Schema::builder()
        .add_number_field("price")
        .add_text_field("category")
        .build();
    let mut e = QueryEngine::new(schema);
    e.load_records(vec![
        Record::new("A").with("price", 10.0).with("category", "X"),
        Record::new("B").with("price", 20.0).with("category", "Y"),
        Record::new("C").with("price", 30.0).with("category", "X"),
    ])
    .unwrap();
    e.define_facets(vec![
        FacetDefinition::categorical("category", "category"),
        FacetDefinition::numeric_range("price", "price", 0.0, 100.0),
    ])
    .unwrap();
    e
}

fn product(id: &str, name: &str, category: &str, price: f64) -> Record {
    Record::new(id)
        .with("name", name)
        .with("category", category)
        .with("price", price)
}

fn catalog_engine() -> QueryEngine {
    let schema = Schema::builder()
        .add_text_field("name")
        .add_text_field("category")
        .add_number_field("price")
        .add_number_field("rating")
        .add_boolean_field("in_stock")
        .add_tags_field("tags")
        .build();
    let mut e = QueryEngine::new(schema);
    e.load_records(vec![
        product("p1", "Trail Runner", "shoes", 120.0)
            .with("rating", 4.5)
            .with("in_stock", true)
            .with("tags", ["outdoor", "running"]),
        product("p2", "Road Runner", "shoes", 90.0)
            .with("rating", 3.8)
            .with("in_stock", false)
            .with("tags", ["running"]),
        product("p3", "Rain Jacket", "apparel", 150.0)
            .with("rating", 4.2)
            .with("in_stock", true)
            .with("tags", ["outdoor", "waterproof"]),
        product("p4", "Wool Socks", "apparel", 15.0)
            .with("rating", 4.8)
            .with("in_stock", true)
            .with("tags", ["outdoor"]),
        product("p5", "Water Bottle", "gear", 25.0).with("in_stock", false),
        product("p6", "Headlamp", "gear", 40.0)
            .with("rating", 4.0)
            .with("in_stock", true)
            .with("tags", ["outdoor"]),
    ])
    .unwrap();
    e.define_facets(vec![
        FacetDefinition::categorical("category", "category"),
        FacetDefinition::numeric_range("price", "price", 0.0, 200.0).with_buckets(vec![
            bucket("0-50", 0.0, 50.0),
            bucket("50-100", 50.0, 100.0),
            bucket("100-200", 100.0, 200.0),
        ]),
        FacetDefinition::numeric_threshold("rating", "rating", vec![3.0, 4.0, 4.5]),
        FacetDefinition::boolean("in_stock", "in_stock"),
        FacetDefinition::tags("tags", "tags"),
    ])
    .unwrap();
    e
}

fn bucket(label: &str, min: f64, max: f64) -> RangeBucket {
    RangeBucket {
        label: label.to_string(),
        min,
        max,
    }
}

fn pairs(counts: &FacetCounts) -> Vec<(&str, usize)> {
    counts.iter().map(|(k, v)| (k.as_str(), *v)).collect()
}

// ============================================================
// Worked examples
// ============================================================

#[test]
fn test_category_selection_counts_exclude_self() {
    let mut e = abc_engine();
    e.set_filter("category", Selection::values(["X"])).unwrap();
    assert_eq!(e.run(), vec!["A", "C"]);
    assert_eq!(pairs(&e.counts_for("category").unwrap()), vec![("X", 2), ("Y", 1)]);
}

#[test]
fn test_price_range_narrows_other_facet_counts() {
    let mut e = abc_engine();
    e.set_filter("category", Selection::values(["X"])).unwrap();
    e.set_filter("price", Selection::range(15.0, 100.0)).unwrap();
    assert_eq!(e.run(), vec!["C"]);
    // Category counts now see the price filter but not their own selection.
    assert_eq!(pairs(&e.counts_for("category").unwrap()), vec![("X", 1), ("Y", 1)]);
}

// ============================================================
// Catalog scenarios
// ============================================================

#[test]
fn test_neutral_catalog_counts() {
    let e = catalog_engine();
    assert_eq!(
        pairs(&e.counts_for("category").unwrap()),
        vec![("apparel", 2), ("gear", 2), ("shoes", 2)]
    );
    assert_eq!(
        pairs(&e.counts_for("price").unwrap()),
        vec![("0-50", 3), ("50-100", 1), ("100-200", 2)]
    );
    assert_eq!(
        pairs(&e.counts_for("rating").unwrap()),
        vec![("3", 5), ("4", 4), ("4.5", 2)]
    );
    assert_eq!(
        pairs(&e.counts_for("in_stock").unwrap()),
        vec![("true", 4), ("false", 2)]
    );
    assert_eq!(
        pairs(&e.counts_for("tags").unwrap()),
        vec![("outdoor", 4), ("running", 2), ("waterproof", 1)]
    );
}

#[test]
fn test_categorical_is_or_within_facet() {
    let mut e = catalog_engine();
    e.set_filter("category", Selection::values(["shoes", "gear"])).unwrap();
    assert_eq!(e.run(), vec!["p1", "p2", "p5", "p6"]);
}

#[test]
fn test_tags_are_and_within_facet() {
    let mut e = catalog_engine();
    e.set_filter("tags", Selection::values(["outdoor", "running"])).unwrap();
    // p2 has "running" only, p4 has "outdoor" only; both are excluded.
    assert_eq!(e.run(), vec!["p1"]);
    assert_eq!(
        pairs(&e.counts_for("tags").unwrap()),
        vec![("outdoor", 4), ("running", 2), ("waterproof", 1)]
    );
}

#[test]
fn test_facets_combine_with_and() {
    let mut e = catalog_engine();
    e.set_filter("in_stock", Selection::boolean(TriState::Yes)).unwrap();
    e.set_filter("tags", Selection::values(["outdoor"])).unwrap();
    e.set_filter("price", Selection::range(0.0, 100.0)).unwrap();
    assert_eq!(e.run(), vec!["p4", "p6"]);

    assert_eq!(
        pairs(&e.counts_for("category").unwrap()),
        vec![("apparel", 1), ("gear", 1), ("shoes", 0)]
    );
    // Price counts ignore the price selection itself.
    assert_eq!(
        pairs(&e.counts_for("price").unwrap()),
        vec![("0-50", 2), ("50-100", 0), ("100-200", 2)]
    );
    assert_eq!(
        pairs(&e.counts_for("in_stock").unwrap()),
        vec![("true", 2), ("false", 0)]
    );
}

#[test]
fn test_boolean_no_and_any() {
    let mut e = catalog_engine();
    e.set_filter("in_stock", Selection::boolean(TriState::No)).unwrap();
    assert_eq!(e.run(), vec!["p2", "p5"]);
    e.set_filter("in_stock", Selection::boolean(TriState::Any)).unwrap();
    assert_eq!(e.run().len(), 6);
    assert_eq!(e.active_filter_count(), 0);
}

#[test]
fn test_threshold_missing_rating_never_passes() {
    let mut e = catalog_engine();
    e.set_filter("rating", Selection::thresholds([3.0])).unwrap();
    assert!(!e.run().contains(&"p5".to_string()));
    assert_eq!(e.run().len(), 5);
}

#[test]
fn test_threshold_least_restrictive_by_default() {
    let mut e = catalog_engine();
    e.set_filter("rating", Selection::thresholds([4.5, 4.0])).unwrap();
    assert_eq!(e.run(), vec!["p1", "p3", "p4", "p6"]);
}

#[test]
fn test_threshold_most_restrictive_policy() {
    let mut e = catalog_engine().with_threshold_policy(ThresholdPolicy::MostRestrictive);
    e.set_filter("rating", Selection::thresholds([4.5, 4.0])).unwrap();
    assert_eq!(e.run(), vec!["p1", "p4"]);
}

#[test]
fn test_free_text_narrows_every_facet() {
    let mut e = catalog_engine();
    e.set_free_text("runner");
    assert_eq!(e.run(), vec!["p1", "p2"]);
    assert_eq!(
        pairs(&e.counts_for("category").unwrap()),
        vec![("apparel", 0), ("gear", 0), ("shoes", 2)]
    );
    assert_eq!(
        pairs(&e.counts_for("in_stock").unwrap()),
        vec![("true", 1), ("false", 1)]
    );
}

#[test]
fn test_free_text_matches_tags() {
    let mut e = catalog_engine();
    e.set_free_text("WATERPROOF");
    assert_eq!(e.run(), vec!["p3"]);
}

#[test]
fn test_self_exclusion_sweep_over_category() {
    let mut e = catalog_engine();
    e.set_filter("in_stock", Selection::boolean(TriState::Yes)).unwrap();
    let baseline = e.counts_for("category").unwrap();
    for selection in [
        vec![],
        vec!["apparel"],
        vec!["gear"],
        vec!["shoes"],
        vec!["apparel", "gear"],
        vec!["apparel", "gear", "shoes"],
    ] {
        e.set_filter("category", Selection::values(selection.clone())).unwrap();
        assert_eq!(
            e.counts_for("category").unwrap(),
            baseline,
            "selection {:?}",
            selection
        );
    }
}

#[test]
fn test_closed_domain_rejects_unknown_value_and_reports_zeros() {
    let mut e = catalog_engine();
    e.define_facets(vec![FacetDefinition::categorical("category", "category")
        .with_values(["shoes", "apparel", "gear", "toys"])])
        .unwrap();
    let err = e
        .set_filter("category", Selection::values(["books"]))
        .unwrap_err();
    assert!(matches!(err, crate::FacetryError::InvalidSelection { .. }));
    assert_eq!(
        pairs(&e.counts_for("category").unwrap()),
        vec![("shoes", 2), ("apparel", 2), ("gear", 2), ("toys", 0)]
    );
}

#[test]
fn test_execute_matches_individual_calls() {
    let mut e = catalog_engine();
    e.set_filter("tags", Selection::values(["outdoor"])).unwrap();
    e.set_free_text("a");
    let result = e.execute();
    assert_eq!(result.ids, e.run());
    assert_eq!(result.total, result.ids.len());
    assert_eq!(result.active_filter_count, 2);
    for def in e.facets() {
        assert_eq!(result.facets[&def.id], e.counts_for(&def.id).unwrap());
    }
}

#[test]
fn test_search_facet_values_uses_excluding_self_counts() {
    let mut e = catalog_engine();
    e.set_filter("in_stock", Selection::boolean(TriState::Yes)).unwrap();
    e.set_filter("category", Selection::values(["gear"])).unwrap();
    let hits = e.search_facet_values("category", "a", 10).unwrap();
    let got: Vec<(&str, usize)> = hits.iter().map(|h| (h.value.as_str(), h.count)).collect();
    assert_eq!(got, vec![("apparel", 2), ("gear", 1)]);
    assert_eq!(hits[1].highlighted, "ge<em>a</em>r");
}
