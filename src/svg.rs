//! Minimal in-memory element tree with XML serialization.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: Option<String>,
    html: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            styles: Vec::new(),
            text: None,
            html: None,
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn style(mut self, name: &str, value: impl ToString) -> Self {
        self.set_style(name, value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn set_style(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.styles.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.styles.push((name.to_string(), value)),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.html = None;
        self.text = Some(text.into());
    }

    /// Raw markup content; serialized without escaping.
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.text = None;
        self.html = Some(html.into());
    }

    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn get_style(&self, name: &str) -> Option<&str> {
        self.styles.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn get_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn get_html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Depth-first search by `id`, including `self`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.get_attr("id") == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    /// All descendants (and `self`) carrying `class`, in document order.
    pub fn select_all(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_class(class, &mut out);
        out
    }

    fn collect_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            out.push(self);
        }
        for c in &self.children {
            c.collect_class(class, out);
        }
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out, 0);
        out
    }

    fn write_markup(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.tag);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape(v));
        }
        if !self.styles.is_empty() {
            let style = self
                .styles
                .iter()
                .map(|(k, v)| format!("{}: {};", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(out, " style=\"{}\"", escape(&style));
        }
        let inline = self.text.as_deref().map(escape).or_else(|| self.html.clone());
        match (inline, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(body), true) => {
                let _ = writeln!(out, ">{}</{}>", body, self.tag);
            }
            (body, false) => {
                out.push_str(">\n");
                if let Some(body) = body {
                    let _ = writeln!(out, "{}  {}", indent, body);
                }
                for c in &self.children {
                    c.write_markup(out, depth + 1);
                }
                let _ = writeln!(out, "{}</{}>", indent, self.tag);
            }
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `translate(x, y)` with trailing zeros trimmed.
pub fn translate(x: f64, y: f64) -> String {
    format!("translate({}, {})", num(x), num(y))
}

/// Shortest decimal form, as browsers print attribute numbers.
pub fn num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.6}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
