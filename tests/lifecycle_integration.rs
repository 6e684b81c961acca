//! Integration tests: config loading and the demo scenarios end to end.

use elemental::config::ElementalConfig;
use elemental::demo::{self, EventLine, Scenario};
use elemental_component::ident;
use serde_json::json;
use std::io::Write;

fn events(lines: &[EventLine]) -> Vec<&str> {
    lines.iter().map(|line| line.event.as_str()).collect()
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn load_reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[logging]
filter = "elemental=debug"

[defaults.x-counter]
start = 7
"#
    )
    .unwrap();

    let config = ElementalConfig::load(file.path());
    assert_eq!(config.logging.filter, "elemental=debug");
    assert_eq!(config.kind("x-counter").default_value("start"), Some(json!(7)));
}

#[test]
fn load_falls_back_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = ElementalConfig::load(&dir.path().join("absent.toml"));
    assert_eq!(config.logging.filter, "elemental=info");
}

#[test]
fn load_falls_back_on_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[logging\nfilter = ").unwrap();
    let config = ElementalConfig::load(file.path());
    assert!(!config.logging.json);
    assert!(config.defaults.is_empty());
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[tokio::test]
async fn mount_scenario_publishes_every_stage() {
    let lines = demo::run(Scenario::Mount, &ElementalConfig::default())
        .await
        .unwrap();
    assert_eq!(
        events(&lines),
        vec!["connecting", "props.set", "elements.set", "rendered", "connected"]
    );
    assert_eq!(lines[1].data, json!({"count": 0}));
}

#[tokio::test]
async fn mount_scenario_uses_configured_defaults() {
    let config = ElementalConfig::from_toml("[defaults.x-counter]\nstart = 4\n").unwrap();
    let lines = demo::run(Scenario::Mount, &config).await.unwrap();
    assert_eq!(lines[1].data, json!({"count": 4}));
    assert_eq!(lines.last().unwrap().data, json!({"count": 4}));
}

#[tokio::test]
async fn clone_scenario_hands_listeners_to_the_copy() {
    let lines = demo::run(Scenario::Clone, &ElementalConfig::default())
        .await
        .unwrap();
    assert_eq!(
        events(&lines),
        vec![
            "connecting",
            "props.set",
            "elements.set",
            "rendered",
            "connected",
            "cloned",
            "connected",
        ]
    );
    assert!(lines.iter().all(|line| line.listener == "original"));

    let cloned = &lines[5].data;
    assert_eq!(cloned["kind"], demo::COUNTER);
    assert!(ident::is_well_formed(cloned["identity"].as_str().unwrap()));
}

#[tokio::test]
async fn fail_scenario_reports_connect_error() {
    let lines = demo::run(Scenario::Fail, &ElementalConfig::default())
        .await
        .unwrap();
    assert_eq!(events(&lines), vec!["connecting", "error"]);

    let error = &lines[1].data;
    assert_eq!(error["action"], "connect");
    assert!(error["error"]
        .as_str()
        .unwrap()
        .contains("required option `source` is missing"));
}

#[tokio::test]
async fn attributes_scenario_defers_changed() {
    let lines = demo::run(Scenario::Attributes, &ElementalConfig::default())
        .await
        .unwrap();
    let names = events(&lines);
    assert_eq!(names.iter().filter(|e| **e == "attribute.changed").count(), 3);
    assert_eq!(names.iter().filter(|e| **e == "changed").count(), 3);
    // every `changed` comes after the last mutation returned
    assert_eq!(&names[names.len() - 3..], ["changed", "changed", "changed"]);

    let changed: Vec<_> = lines
        .iter()
        .filter(|line| line.event.as_str() == "changed")
        .map(|line| line.data.clone())
        .collect();
    assert!(changed.contains(&json!({"count": 1})));
    assert!(changed.contains(&json!({"count": 2})));
}

#[test]
fn event_lines_serialize_with_wire_names() {
    let line = EventLine {
        listener: "a".into(),
        event: elemental_core::Event::PropsSet,
        data: json!({"count": 1}),
    };
    assert_eq!(
        serde_json::to_value(&line).unwrap(),
        json!({"listener": "a", "event": "props.set", "data": {"count": 1}})
    );
}
