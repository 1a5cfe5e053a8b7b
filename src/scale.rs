//! Value → pixel scales and tick generation.
//!
//! Tick selection follows the conventional 1/2/5 × 10^k stepping for linear
//! domains and a fixed ladder of calendar-friendly durations for time
//! domains, so axis labels land on round numbers.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::record::{time_extent, year_extent, LapTime, Record};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Integer tick bounds `(i1, i2)` and increment. A negative increment means
/// "divide by -inc" and keeps sub-unit steps exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    let mut i1;
    let mut i2;
    let inc;
    if power < 0.0 {
        let k = 10f64.powf(-power) / factor;
        i1 = (start * k).round();
        i2 = (stop * k).round();
        if i1 / k < start {
            i1 += 1.0;
        }
        if i2 / k > stop {
            i2 -= 1.0;
        }
        inc = -k;
    } else {
        let k = 10f64.powf(power) * factor;
        i1 = (start / k).round();
        i2 = (stop / k).round();
        if i1 * k < start {
            i1 += 1.0;
        }
        if i2 * k > stop {
            i2 -= 1.0;
        }
        inc = k;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Evenly spaced round values covering `[start, stop]`, roughly `count` of them.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let count = count as f64;
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if !(i2 >= i1) {
        return Vec::new();
    }
    let n = (i2 - i1) as i64 + 1;
    let mut out: Vec<f64> = (0..n)
        .map(|i| {
            let i = i1 + i as f64;
            if inc < 0.0 {
                i / -inc
            } else {
                i * inc
            }
        })
        .collect();
    if reverse {
        out.reverse();
    }
    out
}

/// Positive tick step for `[start, stop]` (fractional steps returned as fractions).
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let (_, _, inc) = tick_spec(lo, hi, count as f64);
    if inc < 0.0 {
        1.0 / -inc
    } else {
        inc
    }
}

fn interpolate(range: (f64, f64), t: f64) -> f64 {
    range.0 + (range.1 - range.0) * t
}

fn normalize(domain: (f64, f64), v: f64) -> f64 {
    let span = domain.1 - domain.0;
    if span == 0.0 {
        0.5
    } else {
        (v - domain.0) / span
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn apply(&self, v: f64) -> f64 {
        interpolate(self.range, normalize(self.domain, v))
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Candidate time tick steps in milliseconds.
const TIME_STEPS: [i64; 14] = [
    SECOND,
    5 * SECOND,
    15 * SECOND,
    30 * SECOND,
    MINUTE,
    5 * MINUTE,
    15 * MINUTE,
    30 * MINUTE,
    HOUR,
    3 * HOUR,
    6 * HOUR,
    12 * HOUR,
    DAY,
    2 * DAY,
];

/// A fixed-length time interval aligned to the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub step_ms: i64,
}

impl TimeInterval {
    pub fn floor(&self, t: i64) -> i64 {
        t.div_euclid(self.step_ms) * self.step_ms
    }

    pub fn ceil(&self, t: i64) -> i64 {
        self.floor(t - 1) + self.step_ms
    }

    /// Aligned instants in `[start, stop]`.
    pub fn range(&self, start: i64, stop: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut t = self.ceil(start);
        while t <= stop {
            out.push(t);
            t += self.step_ms;
        }
        out
    }

    /// Pick the interval yielding about `count` ticks over `[start, stop]`.
    pub fn for_span(start: i64, stop: i64, count: usize) -> Self {
        let target = (stop - start).abs() as f64 / count.max(1) as f64;
        let i = TIME_STEPS.partition_point(|&step| (step as f64) <= target);
        let step_ms = if i == TIME_STEPS.len() {
            let days = tick_step(start as f64 / DAY as f64, stop as f64 / DAY as f64, count);
            ((days.max(1.0)) as i64) * DAY
        } else if i == 0 {
            (tick_step(start as f64, stop as f64, count).max(1.0)) as i64
        } else {
            let below = TIME_STEPS[i - 1] as f64;
            let above = TIME_STEPS[i] as f64;
            if target / below < above / target {
                TIME_STEPS[i - 1]
            } else {
                TIME_STEPS[i]
            }
        };
        Self { step_ms }
    }
}

/// Maps instants (epoch milliseconds) to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (i64, i64),
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> Self {
        Self {
            domain: (domain.0.timestamp_millis(), domain.1.timestamp_millis()),
            range,
        }
    }

    pub fn domain_ms(&self) -> (i64, i64) {
        self.domain
    }

    pub fn domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (to_datetime(self.domain.0), to_datetime(self.domain.1))
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Extend the domain outward to the boundaries of the 10-tick interval.
    pub fn nice(mut self) -> Self {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d1 < d0 { (d1, d0) } else { (d0, d1) };
        let interval = TimeInterval::for_span(lo, hi, 10);
        let (lo, hi) = (interval.floor(lo), interval.ceil(hi));
        self.domain = if d1 < d0 { (hi, lo) } else { (lo, hi) };
        self
    }

    pub fn apply_ms(&self, t: i64) -> f64 {
        interpolate(self.range, normalize((self.domain.0 as f64, self.domain.1 as f64), t as f64))
    }

    pub fn apply(&self, t: DateTime<Utc>) -> f64 {
        self.apply_ms(t.timestamp_millis())
    }

    pub fn ticks(&self, count: usize) -> Vec<DateTime<Utc>> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d1 < d0 { (d1, d0) } else { (d0, d1) };
        let mut out: Vec<DateTime<Utc>> = TimeInterval::for_span(lo, hi, count)
            .range(lo, hi)
            .into_iter()
            .map(to_datetime)
            .collect();
        if d1 < d0 {
            out.reverse();
        }
        out
    }
}

fn to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

/// Year → x. Domain is padded by one year on each side.
pub fn x_scale_for(records: &[Record], width: f64) -> Option<LinearScale> {
    let (lo, hi) = year_extent(records)?;
    let scale = LinearScale::new((lo as f64 - 1.0, hi as f64 + 1.0), (0.0, width));
    log(
        Level::Debug,
        Domain::Scale,
        "x_domain",
        obj(&[("min", json!(scale.domain.0)), ("max", json!(scale.domain.1))]),
    );
    Some(scale)
}

/// Lap time → y over the niced extent of valid times.
pub fn y_scale_for(records: &[Record], height: f64) -> Option<TimeScale> {
    let extent = time_extent(records)?;
    let scale = TimeScale::new(extent, (0.0, height)).nice();
    let (lo, hi) = scale.domain();
    log(
        Level::Debug,
        Domain::Scale,
        "y_domain",
        obj(&[
            ("min", v_str(&LapTime::At(lo).minutes_seconds())),
            ("max", v_str(&LapTime::At(hi).minutes_seconds())),
        ]),
    );
    Some(scale)
}
