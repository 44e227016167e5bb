use std::fs;

use agglom::cluster::agglomerate;
use agglom::report::{self, RunSummary};
use agglom::{AgglomConfig, AttributeTable, CorrelationMatrix, CorrelationSummary, CsvLoader, Error};

const GROCERIES: &str = "\
ID,Chips,Cereal,Fish,Beer
1,2,0,5,3
2,3,1,4,2
3,0,6,1,0
4,1,5,0,1
5,2,1,5,4
6,0,5,1,0
";

fn write_input(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("groceries.csv");
    fs::write(&path, GROCERIES).unwrap();
    path
}

#[test]
fn load_limit_cluster_and_write_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir);

    let mut config = AgglomConfig::from_ini_str("[loader]\nrow_limit = 4\n").unwrap();
    config.files.output_dir = dir.path().join("out");

    let table = CsvLoader::new(&config.loader).load_path(&input).unwrap();
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.columns().len(), 4);

    let clustered = table.head(config.loader.row_limit.unwrap());
    let outcome = agglomerate(&clustered, &config.cluster).unwrap();
    assert_eq!(outcome.merges, 3);
    assert_eq!(outcome.history.len(), 3);
    assert!(outcome.terminal.is_some());

    let matrix = CorrelationMatrix::compute(&table).rounded(2);
    let correlation = CorrelationSummary::from_matrix(&matrix, 0.1);
    let summary = RunSummary::new(&input, table.row_count(), &outcome, Some(correlation));
    let written = report::write_artifacts(&config, &summary, &outcome).unwrap();
    assert_eq!(written.len(), 2);

    let linkage = fs::read_to_string(config.files.output_dir.join("linkage.csv")).unwrap();
    let mut lines = linkage.lines();
    assert_eq!(lines.next(), Some("step,left_id,right_id,distance,size"));
    assert_eq!(lines.count(), 3);

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(config.files.output_dir.join("summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["rows_loaded"], 6);
    assert_eq!(json["rows_clustered"], 4);
    assert!(json["correlation"]["most_positive"].is_object());
}

#[test]
fn groceries_correlations() {
    let dir = tempfile::tempdir().unwrap();
    let table = CsvLoader::new(&Default::default())
        .load_path(write_input(&dir))
        .unwrap();
    let matrix = CorrelationMatrix::compute(&table).rounded(2);
    let summary = CorrelationSummary::from_matrix(&matrix, 0.1);

    // Chips, Fish and Beer move together against Cereal
    let most = summary.most_positive.unwrap();
    assert!(most.value > 0.8);
    assert!(most.first != "Cereal" && most.second != "Cereal");
    let least = summary.most_negative.unwrap();
    assert!(least.value < -0.8);
    assert!(least.first == "Cereal" || least.second == "Cereal");
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvLoader::new(&Default::default())
        .load_path(dir.path().join("nope.csv"))
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
