pub mod axis;
pub mod chart;
pub mod config;
pub mod data;
pub mod logging;
pub mod page;
pub mod record;
pub mod retry;
pub mod scale;
pub mod svg;
pub mod tooltip;
