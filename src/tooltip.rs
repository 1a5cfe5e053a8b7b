//! Hover tooltip state machine.
//!
//! The tooltip element belongs to the surrounding page; the handler only
//! restyles it and replaces its content.

use serde_json::json;

use crate::logging::{log, obj, Domain, Level};
use crate::record::Record;
use crate::svg::Element;

/// `display` value written on pointer leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideDisplay {
    /// `display: none`
    None,
    /// `display: hidden`. Not a valid `display` keyword: browsers ignore it
    /// and keep the previous `block`, leaving an invisible box under the
    /// pointer. Reproduces the historical page.
    Hidden,
}

impl HideDisplay {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Some(HideDisplay::None),
            "hidden" => Some(HideDisplay::Hidden),
            _ => None,
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            HideDisplay::None => "none",
            HideDisplay::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipState {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy)]
pub enum PointerEvent<'a> {
    Enter { x: f64, y: f64, record: &'a Record },
    Leave,
}

/// `{Name}: {Nationality}<br>Year: {Year}, Time: {MM:SS}` plus the allegation.
pub fn tooltip_html(record: &Record) -> String {
    let mut html = format!(
        "{}: {}<br>Year: {}, Time: {}",
        crate::svg::escape(&record.name),
        crate::svg::escape(&record.nationality),
        record.year,
        record.time.minutes_seconds()
    );
    if record.has_doping_allegation() {
        html.push_str(&format!("<p>{}</p>", crate::svg::escape(&record.doping)));
    }
    html
}

pub struct TooltipHandler<'a> {
    element: &'a mut Element,
    state: TooltipState,
    hide_display: HideDisplay,
}

impl<'a> TooltipHandler<'a> {
    /// Applies the base typography and starts hidden.
    pub fn attach(element: &'a mut Element, hide_display: HideDisplay) -> Self {
        element.set_style("font-family", "sans-serif");
        element.set_style("font-size", ".8rem");
        element.set_style("opacity", 0);
        Self {
            element,
            state: TooltipState::Hidden,
            hide_display,
        }
    }

    pub fn state(&self) -> TooltipState {
        self.state
    }

    pub fn element(&self) -> &Element {
        &*self.element
    }

    pub fn handle(&mut self, event: PointerEvent<'_>) -> TooltipState {
        match event {
            PointerEvent::Enter { x, y, record } => {
                self.element.set_style("opacity", 1);
                self.element.set_style("display", "block");
                self.element.set_html(tooltip_html(record));
                self.element.set_style("left", format!("{}px", x + 20.0));
                self.element.set_style("top", format!("{}px", y - 20.0));
                self.element.set_attr("data-year", record.year);
                self.state = TooltipState::Visible;
                log(
                    Level::Trace,
                    Domain::Tooltip,
                    "show",
                    obj(&[("year", json!(record.year)), ("x", json!(x)), ("y", json!(y))]),
                );
            }
            PointerEvent::Leave => {
                self.element.set_style("opacity", 0);
                self.element.set_style("display", self.hide_display.as_css());
                self.state = TooltipState::Hidden;
                log(Level::Trace, Domain::Tooltip, "hide", obj(&[]));
            }
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LapTime, Record};

    fn rider(year: i32, doping: &str) -> Record {
        Record {
            time: LapTime::parse("38:55"),
            time_raw: "38:55".to_string(),
            year,
            name: "Bjarne Riis".to_string(),
            nationality: "DEN".to_string(),
            doping: doping.to_string(),
            place: None,
            seconds: None,
            url: None,
        }
    }

    #[test]
    fn starts_hidden_with_base_style() {
        let mut el = Element::new("div").attr("id", "tooltip");
        let handler = TooltipHandler::attach(&mut el, HideDisplay::None);
        assert_eq!(handler.state(), TooltipState::Hidden);
        assert_eq!(handler.element().get_style("font-size"), Some(".8rem"));
        assert_eq!(handler.element().get_style("opacity"), Some("0"));
    }

    #[test]
    fn enter_then_leave() {
        let rec = rider(1996, "Confessed");
        let mut el = Element::new("div").attr("id", "tooltip");
        let mut handler = TooltipHandler::attach(&mut el, HideDisplay::None);

        assert_eq!(handler.handle(PointerEvent::Enter { x: 100.0, y: 50.0, record: &rec }), TooltipState::Visible);
        assert_eq!(handler.element().get_attr("data-year"), Some("1996"));
        assert_eq!(handler.element().get_style("opacity"), Some("1"));
        assert_eq!(handler.element().get_style("display"), Some("block"));
        assert_eq!(handler.element().get_style("left"), Some("120px"));
        assert_eq!(handler.element().get_style("top"), Some("30px"));

        assert_eq!(handler.handle(PointerEvent::Leave), TooltipState::Hidden);
        assert_eq!(handler.element().get_style("opacity"), Some("0"));
        assert_eq!(handler.element().get_style("display"), Some("none"));
        // data-year is left from the last hover
        assert_eq!(handler.element().get_attr("data-year"), Some("1996"));
    }

    #[test]
    fn literal_hidden_display_is_reproducible() {
        let mut el = Element::new("div");
        let mut handler = TooltipHandler::attach(&mut el, HideDisplay::Hidden);
        handler.handle(PointerEvent::Leave);
        assert_eq!(handler.element().get_style("display"), Some("hidden"));
    }

    #[test]
    fn content_includes_allegation_only_when_present() {
        let clean = tooltip_html(&rider(2004, ""));
        assert_eq!(clean, "Bjarne Riis: DEN<br>Year: 2004, Time: 38:55");
        let doped = tooltip_html(&rider(1996, "Confessed"));
        assert!(doped.ends_with("<p>Confessed</p>"));
    }

    #[test]
    fn parses_hide_display() {
        assert_eq!(HideDisplay::parse("NONE"), Some(HideDisplay::None));
        assert_eq!(HideDisplay::parse("hidden"), Some(HideDisplay::Hidden));
        assert_eq!(HideDisplay::parse("block"), None);
    }
}
