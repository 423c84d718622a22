//! Result-set scenarios: free-text matching, sort policy and active filter
//! bookkeeping.

use crate::{
    FacetDefinition, FacetryError, QueryEngine, Record, Schema, Selection, SortDirection,
    TriState, STORE_ORDER,
};

fn names_engine(names: &[&str]) -> QueryEngine {
    let schema = Schema::builder().add_text_field("name").build();
    let mut e = QueryEngine::new(schema);
    e.load_records(
        names
            .iter()
            .map(|n| Record::new(*n).with("name", *n))
            .collect(),
    )
    .unwrap();
    e
}

fn shelf_engine() -> QueryEngine {
    let schema = Schema::builder()
        .add_text_field("title")
        .add_text_field("genre")
        .add_number_field("year")
        .add_boolean_field("signed")
        .add_tags_field("labels")
        .build();
    let mut e = QueryEngine::new(schema);
    e.load_records(vec![
        Record::new("b1").with("title", "Dune").with("genre", "scifi").with("year", 1965.0),
        Record::new("b2")
            .with("title", "Emma")
            .with("genre", "classic")
            .with("year", 1815.0)
            .with("signed", true),
        Record::new("b3").with("title", "Neuromancer").with("genre", "scifi").with("year", 1984.0),
        Record::new("b4").with("title", "Persuasion").with("genre", "classic"),
        Record::new("b5")
            .with("title", "Hyperion")
            .with("genre", "scifi")
            .with("year", 1965.0)
            .with("signed", false)
            .with("labels", ["award", "series"]),
    ])
    .unwrap();
    e.define_facets(vec![
        FacetDefinition::categorical("genre", "genre"),
        FacetDefinition::numeric_range("year", "year", 1800.0, 2000.0),
        FacetDefinition::boolean("signed", "signed"),
        FacetDefinition::tags("labels", "labels"),
    ])
    .unwrap();
    e
}

// ============================================================
// Free text
// ============================================================

#[test]
fn test_free_text_substring_case_insensitive() {
    let mut e = names_engine(&["Axe", "Box", "Boy"]);
    e.set_free_text("x");
    assert_eq!(e.run(), vec!["Axe", "Box"]);
    e.set_free_text("BO");
    assert_eq!(e.run(), vec!["Box", "Boy"]);
}

#[test]
fn test_blank_free_text_is_neutral() {
    let mut e = names_engine(&["Axe", "Box", "Boy"]);
    e.set_free_text("   ");
    assert_eq!(e.run().len(), 3);
    assert_eq!(e.active_filter_count(), 0);
}

#[test]
fn test_free_text_no_match_is_empty_not_error() {
    let mut e = names_engine(&["Axe", "Box", "Boy"]);
    e.set_free_text("zebra");
    assert!(e.run().is_empty());
}

// ============================================================
// Sort
// ============================================================

#[test]
fn test_neutral_run_is_store_order() {
    let e = shelf_engine();
    assert_eq!(e.run(), vec!["b1", "b2", "b3", "b4", "b5"]);
}

#[test]
fn test_sort_by_year_stable_with_missing_last() {
    let mut e = shelf_engine();
    e.set_sort("year", SortDirection::Asc).unwrap();
    assert_eq!(e.run(), vec!["b2", "b1", "b5", "b3", "b4"]);
    e.set_sort("year", SortDirection::Desc).unwrap();
    // b1 and b5 tie on 1965 and keep store order; b4 has no year.
    assert_eq!(e.run(), vec!["b3", "b1", "b5", "b2", "b4"]);
}

#[test]
fn test_sort_by_title_and_boolean() {
    let mut e = shelf_engine();
    e.set_sort("title", SortDirection::Asc).unwrap();
    assert_eq!(e.run(), vec!["b1", "b2", "b5", "b3", "b4"]);
    e.set_sort("signed", SortDirection::Desc).unwrap();
    assert_eq!(e.run(), vec!["b2", "b5", "b1", "b3", "b4"]);
}

#[test]
fn test_store_order_descending() {
    let mut e = shelf_engine();
    e.set_sort(STORE_ORDER, SortDirection::Desc).unwrap();
    assert_eq!(e.run(), vec!["b5", "b4", "b3", "b2", "b1"]);
}

#[test]
fn test_sort_applies_after_filtering() {
    let mut e = shelf_engine();
    e.set_filter("genre", Selection::values(["scifi"])).unwrap();
    e.set_sort("year", SortDirection::Desc).unwrap();
    assert_eq!(e.run(), vec!["b3", "b1", "b5"]);
}

#[test]
fn test_unsortable_and_unknown_attributes() {
    let mut e = shelf_engine();
    assert_eq!(
        e.set_sort("labels", SortDirection::Asc).unwrap_err(),
        FacetryError::UnsortableAttribute("labels".into())
    );
    assert_eq!(
        e.set_sort("isbn", SortDirection::Asc).unwrap_err(),
        FacetryError::UnknownAttribute("isbn".into())
    );
}

// ============================================================
// Active filter count and mutations
// ============================================================

#[test]
fn test_active_filter_count_tracks_independent_facets() {
    let mut e = shelf_engine();
    assert_eq!(e.active_filter_count(), 0);
    e.set_filter("genre", Selection::values(["scifi"])).unwrap();
    assert_eq!(e.active_filter_count(), 1);
    e.set_filter("year", Selection::range(1900.0, 2000.0)).unwrap();
    assert_eq!(e.active_filter_count(), 2);
    e.set_filter("signed", Selection::boolean(TriState::No)).unwrap();
    assert_eq!(e.active_filter_count(), 3);
    e.set_filter("labels", Selection::values(["award"])).unwrap();
    assert_eq!(e.active_filter_count(), 4);
    e.set_free_text("hyp");
    assert_eq!(e.active_filter_count(), 5);

    e.clear_filter("genre").unwrap();
    assert_eq!(e.active_filter_count(), 4);
    e.clear_all_filters();
    assert_eq!(e.active_filter_count(), 0);
    assert_eq!(e.free_text(), "");
    assert_eq!(e.run().len(), 5);
}

#[test]
fn test_full_range_is_neutral() {
    let mut e = shelf_engine();
    e.set_filter("year", Selection::range(1800.0, 2000.0)).unwrap();
    assert_eq!(e.active_filter_count(), 0);
    // Neutral range keeps records without a year.
    assert!(e.run().contains(&"b4".to_string()));
    e.set_filter("year", Selection::range(1800.0, 1999.0)).unwrap();
    assert!(!e.run().contains(&"b4".to_string()));
}

#[test]
fn test_invalid_selection_leaves_state_unchanged() {
    let mut e = shelf_engine();
    e.set_filter("year", Selection::range(1900.0, 2000.0)).unwrap();
    let before = e.run();

    assert!(e.set_filter("year", Selection::range(1990.0, 1950.0)).is_err());
    assert!(e.set_filter("year", Selection::values(["old"])).is_err());
    assert!(e.set_filter("year", Selection::range(f64::NAN, 1950.0)).is_err());
    assert!(e
        .set_filter_json("year", &serde_json::json!("nineteen-eighty"))
        .is_err());

    assert_eq!(e.selection("year"), Some(&Selection::range(1900.0, 2000.0)));
    assert_eq!(e.run(), before);
}

#[test]
fn test_json_selections_per_kind() {
    let mut e = shelf_engine();
    e.set_filter_json("genre", &serde_json::json!(["classic"])).unwrap();
    e.set_filter_json("year", &serde_json::json!({"min": 1800, "max": 1900}))
        .unwrap();
    e.set_filter_json("signed", &serde_json::json!(true)).unwrap();
    assert_eq!(e.run(), vec!["b2"]);
    e.set_filter_json("signed", &serde_json::json!(null)).unwrap();
    assert_eq!(e.active_filter_count(), 2);
}

#[test]
fn test_results_all_match() {
    let mut e = shelf_engine();
    e.set_filter("genre", Selection::values(["scifi", "classic"])).unwrap();
    e.set_filter("year", Selection::range(1900.0, 1970.0)).unwrap();
    let ids = e.run();
    assert_eq!(ids, vec!["b1", "b5"]);
    for id in &ids {
        let record = e.record(id).unwrap();
        assert!(e.matches(record));
    }
}

#[test]
fn test_shared_store_sessions_are_isolated() {
    let base = shelf_engine();
    let mut first = base.clone();
    let mut second = QueryEngine::new(base.schema().clone());
    second.use_store(base.store().clone());
    second
        .define_facets(base.facets().cloned().collect())
        .unwrap();

    first.set_filter("genre", Selection::values(["classic"])).unwrap();
    second.set_free_text("dune");

    assert_eq!(first.run(), vec!["b2", "b4"]);
    assert_eq!(second.run(), vec!["b1"]);
    assert_eq!(base.run().len(), 5);
}
