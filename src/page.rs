//! Standalone HTML page around a rendered chart.
//!
//! The page supplies the `#chart` container and the `#tooltip` element, and
//! wires pointer events on each `.dot` to the same transitions
//! [`TooltipHandler`] performs.

use serde_json::json;

use crate::chart::ChartHandles;
use crate::config::ChartConfig;
use crate::record::Record;
use crate::svg::{escape, Element};
use crate::tooltip::{tooltip_html, TooltipHandler};

const PAGE_CSS: &str = "body { margin: 0; padding: 1rem; background: #f4f4f4; }\n\
#chart { display: flex; justify-content: center; }\n\
#tooltip { position: absolute; pointer-events: none; padding: .5rem; \
background: rgba(255, 255, 255, .95); border: 1px solid #999; border-radius: 4px; }\n\
.grid line { stroke: #ddd; }\n\
.grid .domain { display: none; }\n";

/// The pre-existing tooltip element, styled as the handler leaves it at rest.
pub fn tooltip_element(config: &ChartConfig) -> Element {
    let mut el = Element::new("div").attr("id", "tooltip");
    TooltipHandler::attach(&mut el, config.hide_display);
    el.set_style("display", config.hide_display.as_css());
    el
}

fn hover_script(records: &[Record], chart: &ChartHandles, config: &ChartConfig) -> String {
    let tips: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|(i, _)| !chart.skipped.contains(i))
        .map(|(_, r)| json!({ "html": tooltip_html(r), "year": r.year }))
        .collect();
    let tips = serde_json::Value::Array(tips).to_string().replace("</", "<\\/");
    format!(
        "const tips = {tips};\n\
const tooltip = document.getElementById('tooltip');\n\
document.querySelectorAll('#chart .dot').forEach((dot, i) => {{\n\
  dot.addEventListener('mouseover', (event) => {{\n\
    tooltip.style.opacity = 1;\n\
    tooltip.style.display = 'block';\n\
    tooltip.innerHTML = tips[i].html;\n\
    tooltip.style.left = `${{event.pageX + 20}}px`;\n\
    tooltip.style.top = `${{event.pageY - 20}}px`;\n\
    tooltip.setAttribute('data-year', tips[i].year);\n\
  }});\n\
  dot.addEventListener('mouseout', () => {{\n\
    tooltip.style.opacity = 0;\n\
    tooltip.style.display = '{hide}';\n\
  }});\n\
}});\n",
        tips = tips,
        hide = config.hide_display.as_css(),
    )
}

/// Full HTML document: container, chart, tooltip, hover wiring.
pub fn render_page(records: &[Record], chart: &ChartHandles, config: &ChartConfig) -> String {
    let body = Element::new("body")
        .child(Element::new("div").attr("id", "chart").child(chart.svg.clone()))
        .child(tooltip_element(config));
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n{}<script>\n{}</script>\n</html>\n",
        escape(&config.title),
        PAGE_CSS,
        body.to_markup(),
        hover_script(records, chart, config),
    )
}
