//! Integration tests for the full variant pipeline.
//!
//! Fixtures are located in `tests/fixtures/`:
//! - `install_guide.html` mixes block markers, inline markers, exclusive
//!   markers, a list and an unprocessed table
//! - `no_markers.html` has a region without any marker

mod common;

use common::load_fixture;
use variantext::segmenter::SegmentKind;
use variantext::{
    ComparisonTable, SelectionState, VariantConfig, VariantLabel, VariantProcessor,
};

fn label(s: &str) -> VariantLabel {
    VariantLabel::parse(s).unwrap()
}

fn processed(fixture: &str) -> VariantProcessor {
    let mut processor = VariantProcessor::new(VariantConfig::default(), ()).unwrap();
    assert!(processor.process(&load_fixture(fixture)).unwrap());
    processor
}

fn visible_ids(processor: &VariantProcessor) -> Vec<usize> {
    processor
        .visibility()
        .iter()
        .filter(|(_, visible)| *visible)
        .map(|(id, _)| id.0)
        .collect()
}

#[test]
fn test_labels_are_collected_from_the_region_only() {
    let processor = processed("install_guide.html");
    let labels: Vec<&str> = processor
        .segmentation()
        .labels()
        .iter()
        .map(|l| l.as_str())
        .collect();

    assert_eq!(labels, vec!["1.0", "2.0", "3.0"]);
}

#[test]
fn test_segments_of_install_guide() {
    let processor = processed("install_guide.html");
    let segments = processor.segmentation().segments();
    assert_eq!(segments.len(), 10);

    let labels: Vec<&str> = segments.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["", "", "1.0", "2.0", "", "", "1.0", "", "2.0", "3.0"]
    );

    assert_eq!(segments[2].next_label, Some(label("2.0")));
    assert_eq!(segments[3].next_label, Some(VariantLabel::common()));
    assert_eq!(segments[4].content, "tool --version");

    assert_eq!(segments[6].kind, SegmentKind::Inline);
    assert!(segments[6].exclusive);
    assert_eq!(segments[6].content, "1.0 need a licence key. ");

    assert_eq!(segments[8].kind, SegmentKind::Block);
    assert_eq!(
        segments[8].content,
        "<li>Requires a 64-bit system</li><li>Works offline</li>"
    );
    assert_eq!(segments[8].next_label, Some(label("3.0")));
    assert!(segments[9].next_label.is_none());
}

#[test]
fn test_visibility_per_variant() {
    let mut processor = processed("install_guide.html");

    processor.select(label("1.0"));
    assert_eq!(visible_ids(&processor), vec![0, 1, 2, 4, 5, 6, 7]);

    processor.select(label("2.0"));
    assert_eq!(visible_ids(&processor), vec![0, 1, 3, 4, 5, 7, 8]);

    // The 2.0 run ended by returning to common content stays in effect.
    processor.select(label("3.0"));
    assert_eq!(visible_ids(&processor), vec![0, 1, 3, 4, 5, 7, 9]);

    processor.select(label("3.0"));
    assert!(processor.state().exclusive_view());
    assert_eq!(visible_ids(&processor), vec![9]);

    processor.select_all();
    assert_eq!(processor.visibility().hidden_count(), 0);
}

#[test]
fn test_unknown_selection_keeps_common_and_open_runs() {
    let mut processor = processed("install_guide.html");
    processor.select(label("9.9"));
    assert_eq!(visible_ids(&processor), vec![0, 1, 3, 4, 5, 7, 9]);
}

#[test]
fn test_rendered_page() {
    let mut processor = processed("install_guide.html");
    processor.select(label("2.0"));
    let page = processor.render_page().unwrap();

    assert!(page.contains(r#"[data-variant="3.0"] { background: #f9e6ff; color: #333; }"#));
    assert!(page.contains(r#"<div id="main-content" data-variant-root data-exclusive="0">"#));
    assert!(page.contains(
        r#"<ul data-variant="2.0" data-next-variant="3.0"><li>Requires a 64-bit system</li><li>Works offline</li></ul>"#
    ));
    assert!(page.contains(
        r#"<span data-variant="1.0" data-next-variant="" data-variant-exclusive hidden>1.0 need a licence key. </span>"#
    ));
    assert!(page.contains("<table><tbody><tr><td>##3.0 Not processed</td></tr></tbody></table>"));
    assert!(!page.contains("##nav"));
}

#[test]
fn test_exclusive_rule_does_not_depend_on_root_selector() {
    let mut processor = VariantProcessor::new(
        VariantConfig::from_yaml("root: \"aside, #main-content\"\n").unwrap(),
        (),
    )
    .unwrap();
    assert!(processor.process(&load_fixture("install_guide.html")).unwrap());
    processor.select(label("1.0"));
    processor.select(label("1.0"));
    let page = processor.render_page().unwrap();

    assert!(page.contains(r#"[data-variant-root][data-exclusive="1"] [data-variant=""] { display: none; }"#));
    assert!(page.contains(r#"<div id="main-content" data-variant-root data-exclusive="1">"#));
    assert!(!page.contains("aside, #main-content["));
}

#[test]
fn test_comparison_table_layout() {
    let processor = processed("install_guide.html");
    let table = ComparisonTable::new(processor.segmentation());

    assert_eq!(table.headers(), vec!["1.0", "2.0", "3.0"]);
    assert_eq!(table.rows().len(), 8);

    let spans: Vec<Vec<usize>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| cell.span).collect())
        .collect();
    assert_eq!(spans[2], vec![1, 2]);
    assert_eq!(spans[5], vec![1, 2]);
    assert_eq!(spans[7], vec![1, 1, 1]);
    assert!(table.rows()[7][0].segment.is_none());

    let terminal = table.to_terminal(Some(200));
    assert!(terminal.contains("Configure the tool."));
}

#[test]
fn test_page_without_markers() {
    let processor = processed("no_markers.html");
    assert!(processor.segmentation().labels().is_empty());
    assert_eq!(processor.segmentation().len(), 2);
    assert!(processor.segmentation().segments().iter().all(|s| s.is_common()));

    let controls = SelectionState::new().controls(processor.segmentation().labels());
    assert_eq!(controls.len(), 1);
    assert_eq!(controls[0].caption(), "All");
}

#[test]
fn test_missing_region() {
    let mut processor = VariantProcessor::new(
        VariantConfig::from_yaml("root: \"#elsewhere\"\n").unwrap(),
        (),
    )
    .unwrap();
    assert!(!processor.process(&load_fixture("install_guide.html")).unwrap());
    assert!(processor.render_page().is_none());
}
