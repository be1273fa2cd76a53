//! Tests d'intégration: base zippée + table délimitée

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use footprint::{
    run, AttributeFilter, ConversionOptions, DelimitedSource, FeatureSource, FootprintError,
    GeodatabaseSource, RunOptions,
};
use geo::Geometry;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const HEADER: &str = "id;LLlat;LLlon;LRlat;LRlon;ULlat;ULlon;URlat;URlon;Column1;Notes";

const ROWS: &[&str] = &[
    "1;10;20;10;21;11;20;11;21;Arial;keep",
    "2;0;20;10;21;11;20;11;21;Arial;zero sentinel",
    "3;10;20;10;9999;11;20;11;21;Arial;placeholder sentinel",
    "4;10.5;20.5;10.5;21.5;11.5;20.5;11.5;21.5;Times;other font",
    "5;12;22;12;23;13;22;13;23;Arial;keep",
];

const LAYER: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"name": "a"},
     "geometry": {"type": "Point", "coordinates": [20.0, 10.0]}}
]}"#;

fn write_csv(dir: &Path, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join("footprints.csv");
    let mut content = String::from(header);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    std::fs::write(&path, content).unwrap();
    path
}

fn write_gdb_zip(dir: &Path, layer: &str) -> PathBuf {
    let path = dir.join("data.gdb.zip");
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    writer
        .add_directory("data.gdb/", SimpleFileOptions::default())
        .unwrap();
    writer
        .start_file(format!("data.gdb/{}.geojson", layer), SimpleFileOptions::default())
        .unwrap();
    writer.write_all(LAYER.as_bytes()).unwrap();
    writer.finish().unwrap();
    path
}

fn options() -> ConversionOptions {
    ConversionOptions {
        columns: vec!["Column1".to_string()],
        filter: Some(AttributeFilter::new("Column1", "Arial")),
        ..Default::default()
    }
}

#[test]
fn test_run_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, ROWS);
    let gdb = write_gdb_zip(dir.path(), "FOOTPRINTS");

    let summary = run(&RunOptions::new(&gdb, &csv, "FOOTPRINTS", options())).unwrap();

    assert_eq!(
        summary.to_string(),
        "csv_feature_class: FOOTPRINTS, features number: 2"
    );
    assert_eq!(summary.database_features, 1);
    assert_eq!(summary.stats.loaded, 5);
    assert_eq!(summary.stats.after_sentinels, 3);
    assert_eq!(summary.stats.after_attribute, 2);
    assert!(summary.feature_count() <= summary.stats.loaded);

    // Colonnes hors configuration abandonnées, coordonnées conservées
    let columns = summary.features.table().columns();
    assert!(columns.iter().any(|c| c == "URlon"));
    assert!(!columns.iter().any(|c| c == "Notes"));

    let ids: Vec<&str> = summary
        .features
        .features()
        .map(|(row, _)| row.get("LLlat").unwrap())
        .collect();
    assert_eq!(ids, vec!["10", "12"]);

    let Geometry::Polygon(polygon) = &summary.features.geometries()[0] else {
        panic!("Expected a polygon");
    };
    let coords: Vec<(f64, f64)> = polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
    assert_eq!(
        coords,
        vec![(20.0, 10.0), (21.0, 10.0), (21.0, 11.0), (20.0, 11.0), (20.0, 10.0)]
    );
}

#[test]
fn test_run_with_extracted_directory() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, ROWS);
    let gdb_dir = dir.path().join("data.gdb");
    std::fs::create_dir(&gdb_dir).unwrap();
    std::fs::write(gdb_dir.join("FOOTPRINTS.geojson"), LAYER).unwrap();

    let summary = run(&RunOptions::new(
        &gdb_dir,
        &csv,
        "FOOTPRINTS",
        ConversionOptions::default(),
    ))
    .unwrap();

    // Sans filtre d'attribut: seules les sentinelles retirent des lignes
    assert_eq!(summary.feature_count(), 3);
}

#[test]
fn test_missing_column_fails_before_filtering() {
    let dir = tempfile::tempdir().unwrap();
    let header = "LLlat;LLlon;LRlat;LRlon;ULlat;ULlon;URlat;Column1";
    let csv = write_csv(dir.path(), header, &["0;0;0;0;0;0;0;a"]);

    let source = DelimitedSource::new(&csv, "FOOTPRINTS", options());
    match source.load() {
        Err(FootprintError::SchemaMismatch { column, .. }) => assert_eq!(column, "URlon"),
        other => panic!("Expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_malformed_coordinate_fails_whole_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let rows = [ROWS[0], "6;10;abc;10;21;11;20;11;21;Arial;bad"];
    let csv = write_csv(dir.path(), HEADER, &rows);

    let source = DelimitedSource::new(&csv, "FOOTPRINTS", options());
    match source.load() {
        Err(FootprintError::ParseError { column, value, .. }) => {
            assert_eq!(column, "LLlon");
            assert_eq!(value, "abc");
        }
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_run_rejects_non_geodatabase_archive() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), HEADER, ROWS);

    let result = run(&RunOptions::new(
        dir.path().join("footprints.csv"),
        &csv,
        "FOOTPRINTS",
        options(),
    ));
    assert!(matches!(result, Err(FootprintError::NotAGeodatabase(_))));
}

#[test]
fn test_geodatabase_source_counts_layer() {
    let dir = tempfile::tempdir().unwrap();
    let gdb = write_gdb_zip(dir.path(), "PARCELS");
    let extracted = footprint::extract_archive(&gdb).unwrap();

    let source = GeodatabaseSource::new(&extracted, "PARCELS");
    assert_eq!(source.feature_count().unwrap(), 1);
    let table = source.load().unwrap();
    assert_eq!(table.table().row(0).unwrap().get("name"), Some("a"));
}
