use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use cyclistchart::chart::render;
use cyclistchart::config::Config;
use cyclistchart::data::{load_dataset, source_from_config};
use cyclistchart::logging::{log, obj, v_str, Domain, Level};
use cyclistchart::page::render_page;

#[tokio::main]
async fn main() -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(out) = std::env::args().nth(1) {
        cfg.out_path = out;
    }
    cfg.validate()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("source", v_str(cfg.data_file.as_deref().unwrap_or(&cfg.data_url))),
            ("out", v_str(&cfg.out_path)),
        ]),
    );

    let source = source_from_config(&cfg)?;
    let records = load_dataset(source.as_ref())
        .await
        .with_context(|| format!("loading dataset from {}", source.describe()))?;

    let chart_cfg = cfg.chart();
    let chart = render(&records, &chart_cfg).context("rendering chart")?;

    let out = Path::new(&cfg.out_path);
    let body = match out.extension().and_then(|e| e.to_str()) {
        Some("svg") => chart.svg.to_markup(),
        _ => render_page(&records, &chart, &chart_cfg),
    };
    std::fs::write(out, &body).with_context(|| format!("writing {}", out.display()))?;

    log(
        Level::Info,
        Domain::System,
        "wrote_chart",
        obj(&[
            ("path", v_str(&cfg.out_path)),
            ("bytes", json!(body.len())),
            ("points", json!(chart.dots().len())),
        ]),
    );
    Ok(())
}
