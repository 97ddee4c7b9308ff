//! Tests for the report output formats.

use std::path::PathBuf;

use meterscan::report::{CsvReporter, JsonReport, JsonReporter, Reporter, CSV_HEADER};
use meterscan::{Config, DirectoryProvider, Runner};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn render(reporter: &dyn Reporter) -> String {
    let testdata = testdata_path();
    let config = Config::parse_file(testdata.join("meterscan.yaml")).expect("should parse config");
    let provider = DirectoryProvider::new(testdata.join("src")).extensions(&config.extensions);
    let catalog = Runner::new(&config)
        .run(&provider)
        .expect("scan should succeed");

    let mut out = Vec::new();
    reporter.write(&catalog, &mut out).expect("report should render");
    String::from_utf8(out).expect("utf-8 output")
}

#[test]
fn test_csv_layout() {
    let csv = render(&CsvReporter);
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines.len(), 1 + 5 + 4);
    assert_eq!(lines[1], "meter,shop.orders.latency,timer,,,OrderService.kt");
    assert!(lines.contains(&"event,order.failed,,error,Throwable,OrderService.kt"));
    assert!(lines.contains(&"event,shop.orders.retry,,warn,\"Array<Object, Int>\",OrderService.kt"));

    let first_event = lines.iter().position(|l| l.starts_with("event,")).unwrap();
    assert!(lines[1..first_event].iter().all(|l| l.starts_with("meter,")));
}

#[test]
fn test_json_structure() {
    let json = render(&JsonReporter);
    let report: JsonReport = serde_json::from_str(&json).expect("valid json report");

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.meter_count, 5);
    assert_eq!(report.event_count, 4);
    assert_eq!(report.rows.len(), 9);
    assert!(report.unresolved.is_empty());

    let raw: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &raw["rows"][0];
    for key in CSV_HEADER {
        assert!(first.get(*key).is_some(), "missing column {}", key);
    }
}
