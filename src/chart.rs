use serde_json::json;
use std::fmt;

use crate::axis::{Axis, AxisScale, TickFormat};
use crate::config::ChartConfig;
use crate::logging::{log, obj, Domain, Level, ProfileScope};
use crate::record::Record;
use crate::scale::{x_scale_for, y_scale_for, LinearScale, TimeScale};
use crate::svg::{num, translate, Element};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    EmptyDataset,
    /// Every record had an unparseable lap time.
    NoValidTimes,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptyDataset => f.write_str("dataset is empty; no domain to draw"),
            RenderError::NoValidTimes => f.write_str("no record has a valid lap time"),
        }
    }
}

impl std::error::Error for RenderError {}

/// The built document plus the scales used to place everything.
#[derive(Debug, Clone)]
pub struct ChartHandles {
    pub svg: Element,
    pub x: LinearScale,
    pub y: TimeScale,
    /// Indices of records left out because their lap time is invalid.
    pub skipped: Vec<usize>,
}

impl ChartHandles {
    /// The translated plot group holding every chart layer.
    pub fn plot(&self) -> &Element {
        &self.svg.children[0]
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.svg.find_by_id(id)
    }

    pub fn dots(&self) -> Vec<&Element> {
        self.svg.select_all("dot")
    }

    pub fn grids(&self) -> Vec<&Element> {
        self.svg.select_all("grid")
    }
}

pub fn dot_color<'a>(record: &Record, config: &'a ChartConfig) -> &'a str {
    if record.has_doping_allegation() {
        config.doping_color
    } else {
        config.clean_color
    }
}

/// Build the complete chart for `records`. Append-only, run once.
pub fn render(records: &[Record], config: &ChartConfig) -> Result<ChartHandles, RenderError> {
    let _scope = ProfileScope::with_context("render", &[("records", json!(records.len()))]);
    if records.is_empty() {
        return Err(RenderError::EmptyDataset);
    }
    let width = config.width();
    let height = config.height();
    let x = x_scale_for(records, width).ok_or(RenderError::EmptyDataset)?;
    let y = y_scale_for(records, height).ok_or(RenderError::NoValidTimes)?;

    let mut plot = Element::new("g").attr("transform", translate(config.margin.left, config.margin.top));

    plot.push(
        Element::new("text")
            .attr("id", "title")
            .attr("x", num(width / 2.0))
            .attr("y", num(-config.margin.top / 2.0 + 25.0))
            .attr("text-anchor", "middle")
            .style("font-family", "sans-serif")
            .style("font-weight", "bold")
            .style("font-size", "2rem")
            .text(config.title.clone()),
    );

    plot.push(
        Axis::bottom(AxisScale::Linear(&x))
            .tick_format(TickFormat::Integer)
            .render(
                Element::new("g")
                    .attr("id", "x-axis")
                    .attr("transform", translate(0.0, height)),
            ),
    );
    plot.push(
        Axis::left(AxisScale::Time(&y))
            .tick_format(TickFormat::MinutesSeconds)
            .render(Element::new("g").attr("id", "y-axis")),
    );

    plot.push(
        Axis::left(AxisScale::Time(&y))
            .ticks(config.grid_ticks)
            .tick_format(TickFormat::Empty)
            .tick_size(-width)
            .render(Element::new("g").attr("class", "grid")),
    );
    plot.push(
        Axis::bottom(AxisScale::Linear(&x))
            .ticks(config.grid_ticks)
            .tick_format(TickFormat::Empty)
            .tick_size(height)
            .render(Element::new("g").attr("class", "grid")),
    );

    let mut skipped = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let Some(t) = rec.time.as_datetime() else {
            skipped.push(i);
            continue;
        };
        plot.push(
            Element::new("circle")
                .attr("class", "dot")
                .attr("fill", dot_color(rec, config))
                .attr("r", num(config.dot_radius))
                .attr("cx", num(x.apply(rec.year as f64)))
                .attr("cy", num(y.apply(t)))
                .attr("data-xvalue", rec.year)
                .attr("data-yvalue", rec.time.iso()),
        );
    }
    if !skipped.is_empty() {
        log(
            Level::Warn,
            Domain::Render,
            "points_skipped",
            obj(&[("count", json!(skipped.len()))]),
        );
    }

    plot.push(legend(config));

    let svg = Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("width", num(config.outer_width))
        .attr("height", num(config.outer_height))
        .child(plot);

    log(
        Level::Info,
        Domain::Render,
        "rendered",
        obj(&[
            ("points", json!(records.len() - skipped.len())),
            ("skipped", json!(skipped.len())),
        ]),
    );

    Ok(ChartHandles { svg, x, y, skipped })
}

fn legend(config: &ChartConfig) -> Element {
    let mut legend = Element::new("g").attr("id", "legend").attr(
        "transform",
        translate(
            config.width() - config.legend_width - config.margin.right,
            config.legend_height,
        ),
    );
    legend.push(
        Element::new("rect")
            .attr("width", num(config.legend_width))
            .attr("height", num(config.legend_height))
            .attr("stroke", "gray")
            .attr("fill", "#fff"),
    );
    for (i, category) in config.legend_categories().iter().enumerate() {
        legend.push(
            Element::new("g")
                .attr("class", "legend-item")
                .attr(
                    "transform",
                    translate(
                        config.legend_padding,
                        config.legend_padding + i as f64 * config.legend_row_spacing,
                    ),
                )
                .child(
                    Element::new("rect")
                        .attr("width", num(config.legend_swatch))
                        .attr("height", num(config.legend_swatch))
                        .attr("fill", category.color),
                )
                .child(
                    Element::new("text")
                        .attr("x", 25)
                        .attr("y", 12)
                        .style("font-family", "sans-serif")
                        .style("font-size", ".9rem")
                        .text(category.label),
                ),
        );
    }
    legend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LapTime, Record};

    fn rec(time: &str, year: i32, doping: &str) -> Record {
        Record {
            time: LapTime::parse(time),
            time_raw: time.to_string(),
            year,
            name: "Rider".to_string(),
            nationality: "USA".to_string(),
            doping: doping.to_string(),
            place: None,
            seconds: None,
            url: None,
        }
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = render(&[], &ChartConfig::default()).unwrap_err();
        assert_eq!(err, RenderError::EmptyDataset);
    }

    #[test]
    fn all_invalid_times_is_rejected() {
        let err = render(&[rec("bad", 2000, "")], &ChartConfig::default()).unwrap_err();
        assert_eq!(err, RenderError::NoValidTimes);
    }

    #[test]
    fn title_and_canvas() {
        let chart = render(&[rec("37:00", 2000, "")], &ChartConfig::default()).unwrap();
        assert_eq!(chart.svg.get_attr("width"), Some("1200"));
        assert_eq!(chart.svg.get_attr("height"), Some("500"));
        assert_eq!(chart.plot().get_attr("transform"), Some("translate(80, 70)"));
        let title = chart.by_id("title").unwrap();
        assert_eq!(title.get_text(), Some("Doping in Professional Bicycle Racing"));
        assert_eq!(title.get_attr("x"), Some("545"));
        assert_eq!(title.get_attr("y"), Some("-10"));
    }

    #[test]
    fn single_record_sits_mid_plot() {
        let chart = render(&[rec("37:00", 2000, "")], &ChartConfig::default()).unwrap();
        let dots = chart.dots();
        assert_eq!(dots.len(), 1);
        assert_eq!(dots[0].get_attr("cx"), Some("545"));
        assert_eq!(dots[0].get_attr("cy"), Some("195"));
    }

    #[test]
    fn invalid_records_are_skipped() {
        let records = vec![rec("37:00", 2000, ""), rec("3700", 2001, ""), rec("38:00", 2002, "x")];
        let chart = render(&records, &ChartConfig::default()).unwrap();
        assert_eq!(chart.dots().len(), 2);
        assert_eq!(chart.skipped, vec![1]);
    }

    #[test]
    fn legend_geometry() {
        let chart = render(&[rec("37:00", 2000, "")], &ChartConfig::default()).unwrap();
        let legend = chart.by_id("legend").unwrap();
        assert_eq!(legend.get_attr("transform"), Some("translate(780, 80)"));
        let items = legend.select_all("legend-item");
        assert_eq!(items[0].get_attr("transform"), Some("translate(20, 20)"));
        assert_eq!(items[1].get_attr("transform"), Some("translate(20, 50)"));
    }

    #[test]
    fn extreme_years_pad_without_overflow() {
        let records = vec![rec("37:00", i32::MIN, ""), rec("38:00", i32::MAX, "")];
        let chart = render(&records, &ChartConfig::default()).unwrap();
        assert_eq!(chart.x.domain(), (i32::MIN as f64 - 1.0, i32::MAX as f64 + 1.0));
        assert_eq!(chart.dots().len(), 2);
    }
}
