use pretty_assertions::assert_eq;
use smn_processor::models::TopicKey;
use smn_processor::processors::{Aggregator, IntegrityChecker};
use smn_processor::readers::StoreReader;
use smn_processor::writers::StoreWriter;
use smn_processor::ProcessingError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COLUMN_HEADER: &str =
    "AÑO\tENE\tFEB\tMAR\tABR\tMAY\tJUN\tJUL\tAGO\tSEP\tOCT\tNOV\tDIC\tACUM\tPROM\tMESES";

fn record_line(year: u32, base: f32) -> String {
    let mut fields = vec![year.to_string()];
    fields.extend((1..=12).map(|m| format!("{:.1}", base + m as f32)));
    fields.push(format!("{:.1}", base * 12.0));
    fields.push(format!("{:.1}", base));
    fields.push("12".to_string());
    fields.join("\t")
}

fn station_report(station: &str, rain_years: &[u32], temp_years: &[u32]) -> String {
    let mut lines = vec![
        "SERVICIO METEOROLÓGICO NACIONAL".to_string(),
        format!("ESTACIÓN : {}", station),
        "\t".to_string(),
        "LLUVIA TOTAL MENSUAL".to_string(),
        COLUMN_HEADER.to_string(),
    ];
    lines.extend(rain_years.iter().map(|y| record_line(*y, 50.0)));
    lines.push(String::new());
    lines.push("TEMPERATURA MEDIA MENSUAL".to_string());
    lines.push(COLUMN_HEADER.to_string());
    lines.extend(temp_years.iter().map(|y| record_line(*y, 20.0)));
    lines.push(String::new());

    lines.join("\r\n")
}

fn build(input: &Path, store: &Path, workers: usize) {
    let data = Aggregator::new(workers)
        .aggregate_directory(input, None)
        .unwrap();

    let mut writer = StoreWriter::create(store).unwrap();
    for topic in TopicKey::ALL {
        writer.write_dataset(topic, data.records(topic)).unwrap();
    }
    writer.finish(data.stations.len()).unwrap();
}

#[test]
fn test_directory_to_store_to_table() {
    let raw = TempDir::new().unwrap();
    fs::write(
        raw.path().join("11020.txt"),
        station_report("11020", &[1990, 1991, 1992], &[1990, 1991, 1992, 1993, 1994]),
    )
    .unwrap();
    fs::write(
        raw.path().join("11025.txt"),
        station_report("11025", &[2000], &[2000, 2001, 2002]),
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let store = out.path().join("meteodata");
    build(raw.path(), &store, 2);

    let reader = StoreReader::open(&store).unwrap();
    assert_eq!(reader.topics().len(), 8);

    let rain = reader.load("p").unwrap();
    assert_eq!(rain.num_rows(), 4);
    assert_eq!(rain.stations(), vec!["11020", "11025"]);

    let temperature = reader.load("t").unwrap();
    assert_eq!(temperature.num_rows(), 8);
    let first = temperature.row(0).unwrap();
    assert_eq!(first.len(), 17);
    assert_eq!(first[0], Some("1990"));
    assert_eq!(first[1], Some("21.0"));
    assert_eq!(first[16], Some("11020"));

    let evaporation = reader.load("evo").unwrap();
    assert!(evaporation.is_empty());

    let manifest = reader.manifest().unwrap().unwrap();
    assert_eq!(manifest.stations, 2);
    assert_eq!(manifest.total_records(), 12);
}

#[test]
fn test_rebuild_is_reproducible() {
    let raw = TempDir::new().unwrap();
    for (station, years) in [("00001", vec![1980, 1981]), ("00002", vec![1999])] {
        fs::write(
            raw.path().join(format!("{}.txt", station)),
            station_report(station, &years, &years),
        )
        .unwrap();
    }

    let out = TempDir::new().unwrap();
    let store = out.path().join("meteodata");

    build(raw.path(), &store, 1);
    let first = fs::read(store.join("p.parquet")).unwrap();

    // A stale topic file from an older layout must not survive a rebuild
    fs::write(store.join("stale.parquet"), b"old").unwrap();

    build(raw.path(), &store, 4);
    let second = fs::read(store.join("p.parquet")).unwrap();

    assert_eq!(first, second);
    assert!(!store.join("stale.parquet").exists());
}

#[test]
fn test_query_missing_topic_is_reported() {
    let out = TempDir::new().unwrap();
    let store = out.path().join("meteodata");

    let mut writer = StoreWriter::create(&store).unwrap();
    writer.write_dataset(TopicKey::TotalRainfall, &[]).unwrap();
    writer.finish(0).unwrap();

    let reader = StoreReader::open(&store).unwrap();

    let empty = reader.load("p").unwrap();
    assert_eq!(empty.num_rows(), 0);

    match reader.load("tmax_x") {
        Err(ProcessingError::TopicNotFound { topic }) => assert_eq!(topic, "tmax_x"),
        other => panic!("expected TopicNotFound, got {:?}", other),
    }
}

#[test]
fn test_aggregated_data_passes_integrity_check() {
    let raw = TempDir::new().unwrap();
    fs::write(
        raw.path().join("25010.txt"),
        station_report("25010", &[1970, 1971], &[1970]),
    )
    .unwrap();

    let data = Aggregator::new(1)
        .aggregate_directory(raw.path(), None)
        .unwrap();
    let report = IntegrityChecker::new().check_integrity(&data);

    assert_eq!(report.total_records, 3);
    assert_eq!(report.valid_records, 3);
    assert!(report.violations.is_empty());
    assert_eq!(data.stats.column_headers, 2);
    assert_eq!(data.stats.section_headers, 2);
}
