//! Integration tests for Nodata.

use std::io::Write;
use tempfile::NamedTempFile;

use nodata::diagnostics::LayerKind;
use nodata::io::Writer;
use nodata::schema::{Column, Coord};
use nodata::{
    Cleaner, ColumnType, Dataset, ExportFormat, Geometry, NodataError, Row, Session, Value,
};

/// Helper to create a temporary file with given content and extension.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn numbers(dataset: &Dataset, column: &str) -> Vec<Option<f64>> {
    let idx = dataset.column_index(column).expect("column exists");
    dataset.column_values(idx).map(Value::as_f64).collect()
}

fn station_points() -> Dataset {
    let columns = vec![
        Column::new("station", ColumnType::Text),
        Column::new("rain", ColumnType::Float),
        Column::new("temp", ColumnType::Float),
    ];
    let values = [
        ("S1", -9999.0, 12.5),
        ("S2", 4.0, -9999.0),
        ("S3", -9999.0, 13.0),
        ("S4", 6.5, 14.0),
    ];
    let rows = values
        .iter()
        .enumerate()
        .map(|(i, (name, rain, temp))| {
            Row::new(
                i,
                vec![
                    Value::Text(name.to_string()),
                    Value::Number(*rain),
                    Value::Number(*temp),
                ],
            )
            .with_geometry(Geometry::Point(Coord::new(i as f64, (i * 2) as f64)))
        })
        .collect();
    Dataset::spatial(columns, rows)
}

// =============================================================================
// Delimited Input
// =============================================================================

#[test]
fn test_clean_csv_end_to_end() {
    let content = "id,rain,temp,site\n\
                   1,-9999,10.5,north\n\
                   2,3.2,-9999,south\n\
                   3,-9999,11.0,-9999\n\
                   4,4.8,12.0,east\n";
    let file = create_test_file(content, ".csv");

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(file.path()).expect("Load failed");

    assert_eq!(loaded.source.format, "csv");
    assert_eq!(loaded.source.row_count, 4);
    assert_eq!(loaded.sentinels.counts["rain"], 2);
    assert_eq!(loaded.sentinels.counts["temp"], 1);
    assert!(!loaded.sentinels.counts.contains_key("site"));

    let cleaned = cleaner.clean(&loaded);
    let data = cleaned.dataset();

    assert_eq!(numbers(data, "rain"), vec![None, Some(3.2), Some(3.2), Some(4.8)]);
    assert_eq!(numbers(data, "temp"), vec![Some(10.5), Some(10.5), Some(11.0), Some(12.0)]);

    let site = data.column_index("site").unwrap();
    assert_eq!(data.rows[2].values[site], Value::Text("-9999".to_string()));

    let summary = cleaned.summary();
    assert_eq!(summary.sentinels_replaced, 3);
    assert_eq!(summary.values_filled, 2);
    assert_eq!(summary.missing_after["rain"], 1);
    assert_eq!(summary.missing_after["temp"], 0);
}

#[test]
fn test_semicolon_csv_auto_detect() {
    let content = "a;b\n1;-9999\n2;5\n3;-9999\n";
    let file = create_test_file(content, ".csv");

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(file.path()).expect("Load failed");
    assert_eq!(loaded.dataset.column_count(), 2);

    let cleaned = cleaner.clean(&loaded);
    assert_eq!(numbers(cleaned.dataset(), "b"), vec![None, Some(5.0), Some(5.0)]);
}

#[test]
fn test_no_sentinels_is_noop() {
    let content = "x,y\n1,2\n3,4\n";
    let file = create_test_file(content, ".csv");

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(file.path()).unwrap();
    assert_eq!(loaded.sentinels.total(), 0);

    let cleaned = cleaner.clean(&loaded);
    assert_eq!(cleaned.dataset(), &loaded.dataset);
    assert_eq!(cleaned.summary().values_filled, 0);
}

#[test]
fn test_all_text_columns_pass_through() {
    let content = "name,code\nalpha,-9999\nbeta,x\n";
    let file = create_test_file(content, ".csv");

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(file.path()).unwrap();
    assert!(loaded.numeric.is_empty());

    let cleaned = cleaner.clean(&loaded);
    assert_eq!(cleaned.dataset(), &loaded.dataset);
}

#[test]
fn test_duplicate_headers_counted_separately() {
    let file = create_test_file("v,v\n-9999,1\n-9999,-9999\n3,-9999\n", ".csv");

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(file.path()).unwrap();
    assert_eq!(loaded.numeric.names(), &["v".to_string(), "v.1".to_string()]);
    assert_eq!(loaded.sentinels.counts["v"], 2);
    assert_eq!(loaded.sentinels.counts["v.1"], 2);
    assert_eq!(loaded.sentinels.total(), 4);

    let cleaned = cleaner.clean(&loaded);
    assert_eq!(numbers(cleaned.dataset(), "v"), vec![None, None, Some(3.0)]);
    assert_eq!(numbers(cleaned.dataset(), "v.1"), vec![Some(1.0); 3]);

    let report = cleaned.report();
    assert_eq!(report.columns.len(), 2);
    assert_eq!(report.sentinels_replaced(), 4);
    assert_eq!(report.column("v").unwrap().still_missing, 2);
    assert_eq!(report.column("v.1").unwrap().values_filled, 2);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unsupported_extension() {
    let file = create_test_file("{}", ".json");
    let result = Cleaner::new().load(file.path());
    assert!(matches!(result, Err(NodataError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let result = Cleaner::new().load("/nonexistent/stations.csv");
    assert!(matches!(result, Err(NodataError::Io { .. })));
}

#[test]
fn test_shapefile_export_of_table_fails() {
    let file = create_test_file("v\n1\n-9999\n", ".csv");
    let dir = tempfile::tempdir().unwrap();

    let cleaner = Cleaner::new();
    let cleaned = cleaner.clean(&cleaner.load(file.path()).unwrap());

    let result = cleaner.export(&cleaned, dir.path().join("out.shp"), ExportFormat::Shp);
    assert!(matches!(result, Err(NodataError::Export { .. })));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_csv_export_writes_empty_cells_for_nulls() {
    let file = create_test_file("a,b\n-9999,1\n2,-9999\n", ".csv");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cleaned.csv");

    let cleaner = Cleaner::new();
    let cleaned = cleaner.clean(&cleaner.load(file.path()).unwrap());
    cleaner.export(&cleaned, &out, ExportFormat::Csv).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, "a,b\n,1\n2,1\n");

    let reloaded = cleaner.load(&out).unwrap();
    assert_eq!(reloaded.sentinels.total(), 0);
    assert_eq!(numbers(&reloaded.dataset, "a"), vec![None, Some(2.0)]);
}

#[test]
fn test_xlsx_export_round_trip() {
    let file = create_test_file("site,depth\nA,-9999\nB,2.5\nC,-9999\n", ".csv");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cleaned.xlsx");

    let cleaner = Cleaner::new();
    let cleaned = cleaner.clean(&cleaner.load(file.path()).unwrap());
    cleaner.export(&cleaned, &out, ExportFormat::Xlsx).unwrap();

    let reloaded = cleaner.load(&out).unwrap();
    assert_eq!(reloaded.source.format, "xlsx");
    assert_eq!(numbers(&reloaded.dataset, "depth"), vec![None, Some(2.5), Some(2.5)]);
}

// =============================================================================
// Shapefiles
// =============================================================================

#[test]
fn test_shapefile_clean_and_visualize() {
    let dir = tempfile::tempdir().unwrap();
    let shp = dir.path().join("stations.shp");
    Writer::write(&station_points(), &shp, ExportFormat::Shp).unwrap();

    let cleaner = Cleaner::new();
    let loaded = cleaner.load(&shp).unwrap();
    assert!(loaded.dataset.has_geometry());
    assert_eq!(loaded.sentinels.counts["rain"], 2);
    assert_eq!(loaded.sentinels.counts["temp"], 1);

    let cleaned = cleaner.clean(&loaded);
    assert_eq!(
        numbers(cleaned.dataset(), "rain"),
        vec![None, Some(4.0), Some(4.0), Some(6.5)]
    );
    assert_eq!(cleaned.summary().rows_missing_before, Some(3));
    assert_eq!(cleaned.summary().rows_missing_after, Some(1));

    let diagnostics = cleaned.diagnostics();
    let kinds: Vec<LayerKind> = diagnostics.layers().iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![LayerKind::MissingBefore, LayerKind::CleanedAfter, LayerKind::PostFillCheck]
    );

    let plots = dir.path().join("plots");
    std::fs::create_dir(&plots).unwrap();
    let files = cleaner
        .visualize_at(&cleaned, Some(&plots), "20240101_120000")
        .unwrap();

    assert_eq!(files.len(), 3);
    assert!(files[0].ends_with("stations_missing_before_20240101_120000.png"));
    assert!(files[1].ends_with("stations_cleaned_after_20240101_120000.png"));
    assert!(files[2].ends_with("stations_post_fill_check_20240101_120000.png"));
    assert!(files.iter().all(|f| f.exists()));
}

#[test]
fn test_shapefile_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let shp = dir.path().join("input.shp");
    Writer::write(&station_points(), &shp, ExportFormat::Shp).unwrap();

    let cleaner = Cleaner::new();
    let cleaned = cleaner.clean(&cleaner.load(&shp).unwrap());

    let out = dir.path().join("input_cleaned.shp");
    cleaner.export(&cleaned, &out, ExportFormat::Shp).unwrap();

    let reloaded = cleaner.load(&out).unwrap();
    assert_eq!(reloaded.dataset.row_count(), 4);
    assert_eq!(reloaded.sentinels.total(), 0);
    assert_eq!(
        numbers(&reloaded.dataset, "temp"),
        vec![Some(12.5), Some(12.5), Some(13.0), Some(14.0)]
    );
    assert_eq!(
        reloaded.dataset.rows[3].geometry,
        Some(Geometry::Point(Coord::new(3.0, 6.0)))
    );
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn test_session_workflow() {
    let file = create_test_file("v,w\n-9999,1\n7,2\n-9999,3\n", ".csv");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");

    let mut session = Session::new();
    assert!(matches!(session.clean(), Err(NodataError::Precondition(_))));

    session.load(file.path()).unwrap();
    assert!(matches!(
        session.export(&out, ExportFormat::Csv),
        Err(NodataError::Precondition(_))
    ));

    session.clean().unwrap();
    let err = session.visualize(None).unwrap_err();
    assert!(err.is_informational());

    let bad = dir.path().join("out.shp");
    assert!(session.export(&bad, ExportFormat::Shp).is_err());
    assert!(session.cleaned().is_some());

    session.export(&out, ExportFormat::Csv).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "v,w\n,1\n7,2\n7,3\n");
}
