use chrono::{DateTime, Utc};

use crate::record::LapTime;
use crate::scale::{LinearScale, TimeScale};
use crate::svg::{num, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    /// `1994`
    Integer,
    /// `%M:%S`
    MinutesSeconds,
    /// Unlabeled (gridlines).
    Empty,
}

/// A format only labels the scale kind it names; other pairings are blank.
impl TickFormat {
    fn number(&self, v: f64) -> String {
        match self {
            TickFormat::Integer => format!("{}", v.round() as i64),
            TickFormat::MinutesSeconds | TickFormat::Empty => String::new(),
        }
    }

    fn instant(&self, t: DateTime<Utc>) -> String {
        match self {
            TickFormat::MinutesSeconds => LapTime::At(t).minutes_seconds(),
            TickFormat::Integer | TickFormat::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AxisScale<'a> {
    Linear(&'a LinearScale),
    Time(&'a TimeScale),
}

impl AxisScale<'_> {
    fn range(&self) -> (f64, f64) {
        match self {
            AxisScale::Linear(s) => s.range(),
            AxisScale::Time(s) => s.range(),
        }
    }

    fn ticks(&self, count: usize, format: TickFormat) -> Vec<(f64, String)> {
        match self {
            AxisScale::Linear(s) => s
                .ticks(count)
                .into_iter()
                .map(|v| (s.apply(v), format.number(v)))
                .collect(),
            AxisScale::Time(s) => s
                .ticks(count)
                .into_iter()
                .map(|t| (s.apply(t), format.instant(t)))
                .collect(),
        }
    }
}

/// Axis generator: a domain path plus one `g.tick` per tick value.
#[derive(Debug, Clone)]
pub struct Axis<'a> {
    orient: Orient,
    scale: AxisScale<'a>,
    tick_count: usize,
    tick_size_inner: f64,
    tick_size_outer: f64,
    tick_padding: f64,
    format: TickFormat,
}

impl<'a> Axis<'a> {
    pub fn bottom(scale: AxisScale<'a>) -> Self {
        Self::new(Orient::Bottom, scale)
    }

    pub fn left(scale: AxisScale<'a>) -> Self {
        Self::new(Orient::Left, scale)
    }

    fn new(orient: Orient, scale: AxisScale<'a>) -> Self {
        Self {
            orient,
            scale,
            tick_count: 10,
            tick_size_inner: 6.0,
            tick_size_outer: 6.0,
            tick_padding: 3.0,
            format: TickFormat::Integer,
        }
    }

    pub fn ticks(mut self, count: usize) -> Self {
        self.tick_count = count;
        self
    }

    pub fn tick_format(mut self, format: TickFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets both inner and outer tick size.
    pub fn tick_size(mut self, size: f64) -> Self {
        self.tick_size_inner = size;
        self.tick_size_outer = size;
        self
    }

    /// Tick positions and labels, in domain order.
    pub fn tick_values(&self) -> Vec<(f64, String)> {
        self.scale.ticks(self.tick_count, self.format)
    }

    /// Draw into `group`, returning it.
    pub fn render(&self, mut group: Element) -> Element {
        let k = match self.orient {
            Orient::Bottom => 1.0,
            Orient::Left => -1.0,
        };
        let (r0, r1) = self.scale.range();
        let outer = num(k * self.tick_size_outer);
        let domain_path = match self.orient {
            Orient::Bottom => format!("M{},{}V0H{}V{}", num(r0), outer, num(r1), outer),
            Orient::Left => format!("M{},{}H0V{}H{}", outer, num(r0), num(r1), outer),
        };

        group.set_attr("fill", "none");
        group.set_attr("font-size", 10);
        group.set_attr("font-family", "sans-serif");
        group.set_attr(
            "text-anchor",
            match self.orient {
                Orient::Bottom => "middle",
                Orient::Left => "end",
            },
        );
        group.push(
            Element::new("path")
                .attr("class", "domain")
                .attr("stroke", "currentColor")
                .attr("d", domain_path),
        );

        let spacing = self.tick_size_inner.max(0.0) + self.tick_padding;
        for (pos, label) in self.tick_values() {
            let (transform, line, text) = match self.orient {
                Orient::Bottom => (
                    format!("translate({},0)", num(pos)),
                    Element::new("line")
                        .attr("stroke", "currentColor")
                        .attr("y2", num(k * self.tick_size_inner)),
                    Element::new("text")
                        .attr("fill", "currentColor")
                        .attr("y", num(k * spacing))
                        .attr("dy", "0.71em"),
                ),
                Orient::Left => (
                    format!("translate(0,{})", num(pos)),
                    Element::new("line")
                        .attr("stroke", "currentColor")
                        .attr("x2", num(k * self.tick_size_inner)),
                    Element::new("text")
                        .attr("fill", "currentColor")
                        .attr("x", num(k * spacing))
                        .attr("dy", "0.32em"),
                ),
            };
            group.push(
                Element::new("g")
                    .attr("class", "tick")
                    .attr("opacity", 1)
                    .attr("transform", transform)
                    .child(line)
                    .child(text.text(label)),
            );
        }
        group
    }
}
