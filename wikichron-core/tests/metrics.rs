//! Integration tests for dump loading and the metric catalog
//!
//! These tests load `tests/fixtures/small_wiki.csv`, a six month history
//! with a gap in April, and run the whole catalog over it.

use std::path::PathBuf;
use wikichron_core::analytics::{MetricOutput, MetricsEngine, RunStatus};
use wikichron_core::{Dataset, DatasetConfig, Month, RevisionLog};

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn small_wiki() -> Dataset {
    Dataset::load(&fixture_path("small_wiki.csv"), &DatasetConfig::default())
        .expect("failed to load fixture")
}

fn values(engine: &MetricsEngine, key: &str, dataset: &Dataset) -> Vec<f64> {
    let result = engine.run_metric(key, dataset).expect("unknown metric");
    match result.output {
        Some(MetricOutput::Series(set)) => {
            assert_eq!(set.series.len(), 1, "{key} should have one series");
            set.series[0].values.clone()
        }
        other => panic!("{key} did not produce a series: {other:?}"),
    }
}

fn totals(engine: &MetricsEngine, key: &str, dataset: &Dataset) -> Vec<f64> {
    let result = engine.run_metric(key, dataset).expect("unknown metric");
    match result.output {
        Some(MetricOutput::Series(set)) => set.totals(),
        other => panic!("{key} did not produce a series: {other:?}"),
    }
}

fn heatmap_month_totals(engine: &MetricsEngine, key: &str, dataset: &Dataset) -> Vec<f64> {
    let result = engine.run_metric(key, dataset).expect("unknown metric");
    match result.output {
        Some(MetricOutput::HeatMap(map)) => map.month_totals().into_iter().map(|n| n as f64).collect(),
        other => panic!("{key} did not produce a heatmap: {other:?}"),
    }
}

// ============================================
// Loading
// ============================================

#[test]
fn test_load_fixture() {
    let dataset = small_wiki();
    assert_eq!(dataset.name, "small_wiki");

    let summary = dataset.log.summary();
    assert_eq!(summary.revisions, 12);
    assert_eq!(summary.pages, 6);
    assert_eq!(summary.registered_contributors, 3);
    assert_eq!(summary.anonymous_contributors, 2);
    assert_eq!(summary.months, 6);

    // April has no edits but stays in the index
    assert_eq!(dataset.index.len(), 6);
    assert_eq!(dataset.index.first(), Month::new(2018, 1));
    assert_eq!(dataset.index.months()[3], Month::new(2018, 4).unwrap());

    // quoted content keeps its delimiter
    let quoted = dataset.log.iter().find(|r| r.revision_id == 7).unwrap();
    assert_eq!(quoted.edit_content, "[[A]]; [[B]] and [http://example.com]");
}

#[test]
fn test_load_with_custom_format() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("comma.csv");
    std::fs::write(
        &path,
        "revision_id,page_id,page_ns,contributor_id,contributor_name,timestamp,bytes,edit_content,factoids\n\
         1,1,0,5,Dana,2019-03-04 10:00:00,10,text,\"x,y\"\n",
    )
    .unwrap();

    let config = DatasetConfig {
        delimiter: ',',
        quote: '"',
        timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
    };
    let dataset = Dataset::load(&path, &config).unwrap();
    assert_eq!(dataset.log.len(), 1);
    assert_eq!(dataset.log.first().unwrap().factoids.len(), 2);
}

// ============================================
// Catalog over the fixture
// ============================================

#[test]
fn test_every_metric_aligns_with_index() {
    let dataset = small_wiki();
    let engine = MetricsEngine::default();
    let months = dataset.index.months().to_vec();

    for result in engine.run_all(&dataset) {
        assert_eq!(result.status, RunStatus::Success, "{} failed", result.code);
        let output = result.output.expect("successful run without output");
        assert_eq!(output.index(), months.as_slice(), "{}", result.code);
        match output {
            MetricOutput::Series(set) => {
                assert!(!set.series.is_empty(), "{} has no series", result.code);
                for series in &set.series {
                    assert_eq!(series.values.len(), months.len(), "{}", result.code);
                    assert!(series.values.iter().all(|v| v.is_finite()), "{}", result.code);
                }
            }
            MetricOutput::HeatMap(map) => {
                assert_eq!(map.buckets.len(), map.matrix.len(), "{}", result.code);
                for row in &map.matrix {
                    assert_eq!(row.len(), months.len(), "{}", result.code);
                }
            }
        }
    }
}

#[test]
fn test_edit_counts() {
    let dataset = small_wiki();
    let engine = MetricsEngine::default();

    assert_eq!(values(&engine, "edits", &dataset), vec![3.0, 3.0, 2.0, 0.0, 2.0, 2.0]);
    assert_eq!(
        values(&engine, "edits_accum", &dataset),
        vec![3.0, 6.0, 8.0, 8.0, 10.0, 12.0]
    );
    assert_eq!(
        values(&engine, "users_active_registered", &dataset),
        vec![2.0, 1.0, 2.0, 0.0, 2.0, 1.0]
    );
}

#[test]
fn test_factoids_in_articles() {
    let dataset = small_wiki();
    let engine = MetricsEngine::default();

    assert_eq!(
        values(&engine, "monthly_added_factoids", &dataset),
        vec![3.0, 1.0, 1.0, 0.0, 0.0, 2.0]
    );
    assert_eq!(
        values(&engine, "monthly_deleted_factoids", &dataset),
        vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
    );
}

#[test]
fn test_edit_cohorts_partition_registered_edits() {
    let dataset = small_wiki();
    let engine = MetricsEngine::default();
    let registered_edits = vec![3.0, 2.0, 2.0, 0.0, 2.0, 1.0];

    for key in [
        "number_of_edits_experience",
        "number_of_edits_tenure",
        "edits_by_current_streak",
        "number_of_edits_last_edit",
        "edition_on_type_pages",
    ] {
        assert_eq!(totals(&engine, key, &dataset), registered_edits, "{key}");
    }
}

#[test]
fn test_editor_cohorts_partition_active_editors() {
    let dataset = small_wiki();
    let engine = MetricsEngine::default();
    let active = values(&engine, "users_active_registered", &dataset);

    for key in ["users_first_edit", "users_last_edit", "users_edits_number_of_edits", "Current_streak"] {
        assert_eq!(totals(&engine, key, &dataset), active, "{key}");
    }
}

#[test]
fn test_heatmap_row_sums() {
    let dataset = small_wiki();
    let engine = MetricsEngine::default();

    // one observation per active registered editor
    let active = values(&engine, "users_active_registered", &dataset);
    assert_eq!(
        heatmap_month_totals(&engine, "edit_distributions_across_editors", &dataset),
        active
    );

    // one observation per page with registered edits that month
    assert_eq!(
        heatmap_month_totals(&engine, "edition_on_pages", &dataset),
        vec![2.0, 2.0, 2.0, 0.0, 2.0, 1.0]
    );
}

// ============================================
// Edge cases
// ============================================

#[test]
fn test_anonymous_only_log() {
    let csv = "revision_id;page_id;page_ns;contributor_id;contributor_name;timestamp;bytes;edit_content;factoids\n\
               1;1;0;10.0.0.1;Anonymous;2020-01-01T00:00:00Z;10;[[x]];a\n\
               2;1;0;10.0.0.2;Anonymous;2020-03-01T00:00:00Z;20;;a,b\n";
    let log = RevisionLog::from_reader(csv.as_bytes(), &DatasetConfig::default()).unwrap();
    let dataset = Dataset::new("anonymous", log);
    let engine = MetricsEngine::default();

    let results = engine.run_all(&dataset);
    assert!(results.iter().all(|r| r.status == RunStatus::Success));

    assert_eq!(values(&engine, "edits", &dataset), vec![1.0, 0.0, 1.0]);
    assert_eq!(values(&engine, "users_active_anonymous", &dataset), vec![1.0, 0.0, 1.0]);
    for key in ["users_active_registered", "users_new_registered", "gini_accum", "returning_new_editors"] {
        assert!(values(&engine, key, &dataset).iter().all(|v| *v == 0.0), "{key}");
    }
    assert!(totals(&engine, "number_of_edits_tenure", &dataset)
        .iter()
        .all(|v| *v == 0.0));
}

#[test]
fn test_empty_log_runs() {
    let dataset = Dataset::new("empty", RevisionLog::default());
    let engine = MetricsEngine::default();

    let results = engine.run_all(&dataset);
    assert_eq!(results.len(), engine.registry().len());
    for result in results {
        assert_eq!(result.status, RunStatus::Success, "{}", result.code);
        assert!(result.output.unwrap().index().is_empty());
    }
}
