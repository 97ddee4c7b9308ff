//! Integration tests for the full scanning pipeline.
//!
//! These tests run the runner against the Kotlin fixtures under
//! `testdata/src` and check the aggregated catalog.

use std::collections::BTreeMap;
use std::path::PathBuf;

use meterscan::scan::{analyze, classify};
use meterscan::{
    Catalog, Category, Config, DirectoryProvider, EventSeverity, MeterKind, Runner,
};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Load the fixture config and scan the fixture sources.
fn run_catalog(with_config_overrides: bool) -> Catalog {
    let testdata = testdata_path();
    let mut config =
        Config::parse_file(testdata.join("meterscan.yaml")).expect("should parse config");
    if !with_config_overrides {
        config.overrides.clear();
    }

    let provider = DirectoryProvider::new(testdata.join("src"))
        .extensions(&config.extensions)
        .excluded_paths(&config.excluded_paths)
        .expect("valid exclude patterns");

    Runner::new(&config)
        .run(&provider)
        .expect("scan should succeed")
}

#[test]
fn test_catalog_meters() {
    let catalog = run_catalog(true);
    assert_eq!(catalog.files_scanned(), 3);

    let meters: Vec<_> = catalog
        .rows()
        .into_iter()
        .filter(|r| r.category == Category::Meter)
        .map(|r| (r.name, r.kind, r.source_file))
        .collect();

    let expected = vec![
        ("shop.orders.latency", "timer", "OrderService.kt"),
        ("shop.orders.placed", "counter", "OrderService.kt"),
        ("shop.orders.size.eu", "summary", "OrderService.kt"),
        ("payments.bytes", "throughput", "PaymentGateway.kt"),
        ("payments.charges", "rate", "PaymentGateway.kt"),
    ];
    let expected: Vec<_> = expected
        .into_iter()
        .map(|(n, k, f)| (n.to_string(), k.to_string(), f.to_string()))
        .collect();
    assert_eq!(meters, expected);
}

#[test]
fn test_catalog_events() {
    let catalog = run_catalog(true);

    let events: Vec<_> = catalog
        .events()
        .iter()
        .map(|e| (e.name.as_str(), e.severity, e.value_type.as_str()))
        .collect();

    assert!(events.contains(&("order.placed", EventSeverity::Info, "Int")));
    assert!(events.contains(&("order.failed", EventSeverity::Error, "Throwable")));
    assert!(events.contains(&(
        "shop.orders.retry",
        EventSeverity::Warn,
        "Array<Object, Int>"
    )));
    assert!(events.contains(&("payment.charged", EventSeverity::Debug, "Object")));
    // order.placed/info/Int from PaymentGateway collapses into the first one
    assert_eq!(events.len(), 4);
}

#[test]
fn test_commented_call_not_cataloged() {
    let catalog = run_catalog(true);
    assert!(catalog
        .meters()
        .iter()
        .all(|m| !m.name.contains("commented")));
    assert!(catalog.meters().iter().all(|m| m.kind != MeterKind::Gauge));
}

#[test]
fn test_unresolved_without_overrides() {
    let catalog = run_catalog(false);
    let unresolved: Vec<_> = catalog
        .unresolved()
        .into_iter()
        .map(|u| (u.name.as_str(), u.source_file.as_str()))
        .collect();
    assert_eq!(
        unresolved,
        vec![("shop.orders.size.$region", "OrderService.kt")]
    );

    let resolved = run_catalog(true);
    assert!(!resolved.has_unresolved());
}

#[test]
fn test_plain_file_has_no_entries() {
    let text = std::fs::read_to_string(testdata_path().join("src/Plain.kt")).unwrap();
    let result = analyze("Plain.kt", &text, &BTreeMap::new());
    assert!(result.meters.is_empty());
    assert!(result.events.is_empty());
}

#[test]
fn test_transitive_resolution() {
    let text = r#"
val a = "x"
val b = "$a-y"
fun f() = meterRegistry.gauge(scope, unit, b, tags)
"#;
    let result = analyze("F.kt", text, &BTreeMap::new());
    assert_eq!(result.meters.len(), 1);
    assert_eq!(result.meters[0].name, "x-y");
    assert!(result.meters[0].resolved);
}

#[test]
fn test_override_key_must_match_file() {
    let text = r#"meterRegistry.counter(a, b, "$missing.count", t)"#;

    let mut overrides = BTreeMap::new();
    overrides.insert("Other.missing".to_string(), "v".to_string());
    let result = analyze("Svc.kt", text, &overrides);
    assert_eq!(result.meters[0].name, "$missing.count");
    assert!(!result.meters[0].resolved);

    overrides.insert("Svc.missing".to_string(), "v".to_string());
    let result = analyze("Svc.kt", text, &overrides);
    assert_eq!(result.meters[0].name, "v.count");
    assert!(result.meters[0].resolved);
}

#[test]
fn test_classifier_examples() {
    let cases = [
        ("5L", "Long"),
        ("5.0", "Double"),
        ("5", "Int"),
        ("\"s\"", "String"),
        ("true", "Boolean"),
        ("e", "Throwable"),
        ("msg.size", "Int"),
        ("arrayOf(1, \"a\")", "Array<Int, String>"),
    ];
    for (expr, expected) in cases {
        assert_eq!(classify(expr), expected, "classifying {}", expr);
    }
}

#[test]
fn test_scan_is_deterministic() {
    let first = run_catalog(true).rows();
    let second = run_catalog(true).rows();
    assert_eq!(first, second);
}
