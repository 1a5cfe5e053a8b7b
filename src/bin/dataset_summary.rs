use std::fs;
use std::path::PathBuf;

use cyclistchart::config::Config;
use cyclistchart::data::{default_summary_path, load_dataset_with_bytes, source_from_config, summarize};

#[tokio::main]
async fn main() {
    let mut cfg = Config::from_env();
    let mut args = std::env::args().skip(1);
    // A bare argument is a URL when it has a scheme, otherwise a file path.
    if let Some(arg) = args.next() {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            cfg.data_url = arg;
            cfg.data_file = None;
        } else {
            cfg.data_file = Some(arg);
        }
    }
    if let Err(err) = cfg.validate() {
        eprintln!("config invalid: {}", err);
        std::process::exit(1);
    }
    let source_name = cfg.data_file.clone().unwrap_or_else(|| cfg.data_url.clone());
    let out_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_summary_path(&source_name));

    let source = match source_from_config(&cfg) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("source setup failed: {}", err);
            std::process::exit(2);
        }
    };

    let (records, raw) = match load_dataset_with_bytes(source.as_ref()).await {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("load failed: {}", err);
            std::process::exit(3);
        }
    };

    // stdout carries the log stream, so the summary goes to its own file.
    let summary = summarize(&source.describe(), &records, &raw);
    let written = serde_json::to_string_pretty(&summary)
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(&out_path, json).map_err(|e| e.to_string()));
    if let Err(err) = written {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(4);
    }
    println!("wrote summary {}", out_path.display());
}
