use std::fs;

use cyclistchart::chart::render;
use cyclistchart::config::{ChartConfig, Config, DEFAULT_DATA_URL};
use cyclistchart::data::{load_dataset_with_bytes, source_from_config, summarize, FetchError};
use cyclistchart::page::render_page;
use cyclistchart::tooltip::HideDisplay;
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/cyclist-data.json");

fn file_config(path: &str) -> Config {
    Config {
        data_url: DEFAULT_DATA_URL.to_string(),
        data_file: Some(path.to_string()),
        fetch_timeout_secs: 5,
        fetch_retries: 0,
        fetch_retry_base_ms: 1,
        hide_display: HideDisplay::None,
        out_path: "chart.html".to_string(),
    }
}

#[tokio::test]
async fn file_to_page() {
    let cfg = file_config(FIXTURE);
    let source = source_from_config(&cfg).unwrap();
    let (records, raw) = load_dataset_with_bytes(source.as_ref()).await.unwrap();

    let chart_cfg = cfg.chart();
    let chart = render(&records, &chart_cfg).unwrap();
    let html = render_page(&records, &chart, &chart_cfg);

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("chart.html");
    fs::write(&out, &html).unwrap();
    let written = fs::read_to_string(&out).unwrap();

    assert!(written.starts_with("<!DOCTYPE html>"));
    assert!(written.contains("<div id=\"chart\">"));
    assert!(written.contains("<g id=\"legend\""));
    assert_eq!(written.matches("class=\"dot\"").count(), records.len());

    let summary = summarize(FIXTURE, &records, &raw);
    assert_eq!(summary.records, 11);
    assert_eq!(summary.doping_allegations, 7);
    assert_eq!(summary.invalid_times, 0);
    assert_eq!(summary.year_min, Some(1994));
    assert_eq!(summary.year_max, Some(2015));
}

#[tokio::test]
async fn bare_svg_is_standalone() {
    let cfg = file_config(FIXTURE);
    let source = source_from_config(&cfg).unwrap();
    let (records, _) = load_dataset_with_bytes(source.as_ref()).await.unwrap();
    let svg = render(&records, &ChartConfig::default()).unwrap().svg.to_markup();
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\" height=\"500\">"));
    assert!(!svg.contains("tooltip"));
}

#[tokio::test]
async fn malformed_json_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{\"Time\": \"36:50\"").unwrap();
    let cfg = file_config(path.to_str().unwrap());
    let source = source_from_config(&cfg).unwrap();
    let err = load_dataset_with_bytes(source.as_ref()).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn bad_lap_times_still_render_the_rest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(
        &path,
        r#"[
            {"Time":"37:00","Name":"A","Year":2000,"Nationality":"ITA","Doping":""},
            {"Time":"3700","Name":"B","Year":2001,"Nationality":"ITA","Doping":""}
        ]"#,
    )
    .unwrap();
    let cfg = file_config(path.to_str().unwrap());
    let source = source_from_config(&cfg).unwrap();
    let (records, _) = load_dataset_with_bytes(source.as_ref()).await.unwrap();
    let chart = render(&records, &cfg.chart()).unwrap();
    assert_eq!(chart.dots().len(), 1);
    assert_eq!(chart.skipped, vec![1]);
    // Year extent still covers every record.
    assert_eq!(chart.x.domain(), (1999.0, 2002.0));
}

#[test]
fn summary_binary_writes_a_single_json_document() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("summary.json");
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_dataset_summary"))
        .arg(FIXTURE)
        .arg(&out)
        .env("LOG_LEVEL", "info")
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(&out).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(summary["records"], 11);
    assert_eq!(summary["doping_allegations"], 7);
    assert_eq!(summary["year_min"], 1994);
    assert!(summary.get("event").is_none());
}
