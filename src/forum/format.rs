//! Message formats and rendering of post bodies for export.

use pulldown_cmark::{html, Event, Options, Parser};

/// Declared format of a post message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// Legacy auto-format: markup kept, line breaks honoured.
    Moodle,
    /// HTML.
    Html,
    /// Plain text.
    Plain,
    /// Markdown source.
    Markdown,
}

impl MessageFormat {
    /// Map a stored format value. Unknown values are treated as plain text.
    pub fn from_value(value: i64) -> Self {
        match value {
            0 => MessageFormat::Moodle,
            1 => MessageFormat::Html,
            4 => MessageFormat::Markdown,
            _ => MessageFormat::Plain,
        }
    }

    /// Stored value of this format.
    pub fn value(&self) -> i64 {
        match self {
            MessageFormat::Moodle => 0,
            MessageFormat::Html => 1,
            MessageFormat::Plain => 2,
            MessageFormat::Markdown => 4,
        }
    }

    /// Render a message as HTML for the export document.
    ///
    /// Markup from untrusted messages goes through an allow-list sanitizer.
    pub fn render(&self, text: &str, trusted: bool) -> String {
        match self {
            MessageFormat::Html => sanitize(text.to_string(), trusted),
            MessageFormat::Moodle => newlines_to_breaks(&sanitize(text.to_string(), trusted)),
            MessageFormat::Plain => newlines_to_breaks(&escape_html(text)),
            MessageFormat::Markdown => sanitize(markdown_to_html(text, trusted), trusted),
        }
    }
}

fn sanitize(html: String, trusted: bool) -> String {
    if trusted {
        html
    } else {
        ammonia::clean(&html)
    }
}

fn markdown_to_html(text: &str, trusted: bool) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // Raw HTML in untrusted Markdown is shown as text.
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) if !trusted => Event::Text(raw),
        event => event,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn newlines_to_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br />\n")
}
