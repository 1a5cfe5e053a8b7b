use anyhow::{anyhow, Result};
use url::Url;

use crate::tooltip::HideDisplay;

pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/freeCodeCamp/ProjectReferenceData/master/cyclist-data.json";

pub const CHART_TITLE: &str = "Doping in Professional Bicycle Racing";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendCategory {
    pub label: &'static str,
    pub color: &'static str,
}

/// Rendering constants. The plot area is the outer canvas minus margins.
#[derive(Clone, Debug)]
pub struct ChartConfig {
    pub outer_width: f64,
    pub outer_height: f64,
    pub margin: Margin,
    pub title: String,
    pub dot_radius: f64,
    pub clean_color: &'static str,
    pub doping_color: &'static str,
    pub grid_ticks: usize,
    pub legend_width: f64,
    pub legend_height: f64,
    pub legend_padding: f64,
    pub legend_swatch: f64,
    pub legend_row_spacing: f64,
    pub hide_display: HideDisplay,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            outer_width: 1200.0,
            outer_height: 500.0,
            margin: Margin {
                top: 70.0,
                right: 30.0,
                bottom: 40.0,
                left: 80.0,
            },
            title: CHART_TITLE.to_string(),
            dot_radius: 6.0,
            clean_color: "steelblue",
            doping_color: "orange",
            grid_ticks: 20,
            legend_width: 280.0,
            legend_height: 80.0,
            legend_padding: 20.0,
            legend_swatch: 15.0,
            legend_row_spacing: 30.0,
            hide_display: HideDisplay::None,
        }
    }
}

impl ChartConfig {
    pub fn width(&self) -> f64 {
        self.outer_width - self.margin.left - self.margin.right
    }

    pub fn height(&self) -> f64 {
        self.outer_height - self.margin.top - self.margin.bottom
    }

    /// Legend rows in draw order.
    pub fn legend_categories(&self) -> [LegendCategory; 2] {
        [
            LegendCategory {
                label: "No doping allegations",
                color: self.clean_color,
            },
            LegendCategory {
                label: "Riders with doping allegations",
                color: self.doping_color,
            },
        ]
    }
}

/// Process configuration for the binaries.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_url: String,
    pub data_file: Option<String>,
    pub fetch_timeout_secs: u64,
    pub fetch_retries: u32,
    pub fetch_retry_base_ms: u64,
    pub hide_display: HideDisplay,
    pub out_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_url: std::env::var("DATA_URL").unwrap_or_else(|_| DEFAULT_DATA_URL.to_string()),
            data_file: std::env::var("DATA_FILE").ok(),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30),
            fetch_retries: std::env::var("FETCH_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(3),
            fetch_retry_base_ms: std::env::var("FETCH_RETRY_BASE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(100),
            hide_display: std::env::var("TOOLTIP_HIDE_DISPLAY").ok().and_then(|v| HideDisplay::parse(&v)).unwrap_or(HideDisplay::None),
            out_path: std::env::var("CHART_OUT").unwrap_or_else(|_| "chart.html".to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_file.is_none() {
            let url = Url::parse(&self.data_url).map_err(|e| anyhow!("invalid DATA_URL {}: {}", self.data_url, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("DATA_URL must be http(s), got {}", url.scheme()));
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(anyhow!("FETCH_TIMEOUT_SECS must be positive"));
        }
        Ok(())
    }

    pub fn chart(&self) -> ChartConfig {
        ChartConfig {
            hide_display: self.hide_display,
            ..ChartConfig::default()
        }
    }
}
