use time::Date;
use time::macros::format_description;

/// Render an upstream ISO date (`2020-01-15`, optionally followed by a time
/// part) as `15/01/2020`. Unparseable input is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    let parse_fmt = format_description!("[year]-[month]-[day]");
    let out_fmt = format_description!("[day]/[month]/[year]");
    match Date::parse(date_part, parse_fmt) {
        Ok(d) => d.format(out_fmt).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

/// `1234.5` -> `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, cents % 100)
}

pub fn escape_html(s: &str) -> String {
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

/// Tooltip fragment builder. Optional fields that are absent or blank are
/// left out entirely; required ones fall back to `N/A`.
pub struct TooltipHtml {
    html: String,
}

impl TooltipHtml {
    pub fn new(title: &str) -> Self {
        Self { html: format!("<strong>{}</strong>", escape_html(title)) }
    }

    pub fn subtitle(mut self, text: &str) -> Self {
        self.html.push_str(&format!("<br><em>{}</em>", escape_html(text)));
        self
    }

    pub fn field(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
        self
    }

    pub fn required(mut self, key: &str, value: &str) -> Self {
        let v = value.trim();
        self.push(key, if v.is_empty() { "N/A" } else { v });
        self
    }

    pub fn date(self, key: &str, value: Option<&str>) -> Self {
        let formatted = value.map(format_date);
        self.field(key, formatted.as_deref())
    }

    pub fn link(mut self, key: &str, url: Option<&str>) -> Self {
        if let Some(u) = url.map(str::trim).filter(|u| !u.is_empty()) {
            let u = escape_html(u);
            self.html.push_str(&format!("<br>{}: <a href=\"{}\" target=\"_blank\">{}</a>", escape_html(key), u, u));
        }
        self
    }

    fn push(&mut self, key: &str, value: &str) {
        self.html.push_str(&format!("<br>{}: {}", escape_html(key), escape_html(value)));
    }

    pub fn finish(self) -> String { self.html }
}
