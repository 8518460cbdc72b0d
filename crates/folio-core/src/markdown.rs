//! Markdown to HTML rendering.
//!
//! A thin, stateless wrapper around `pulldown-cmark`. The only policy knob is
//! what happens to raw HTML embedded in a document: by default it is escaped
//! and shows up as text, so an uploaded document cannot inject script into
//! the page.

use std::str::FromStr;

use pulldown_cmark::{CowStr, Event, Options, Parser, html};

/// Treatment of raw HTML blocks and inline tags inside markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawHtml {
    /// Render embedded HTML as escaped text.
    #[default]
    Escape,
    /// Pass embedded HTML through unchanged.
    Allow,
}

impl FromStr for RawHtml {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "escape" => Ok(Self::Escape),
            "allow" => Ok(Self::Allow),
            other => Err(format!("unknown raw HTML mode '{other}' (expected 'escape' or 'allow')")),
        }
    }
}

/// Markdown renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    raw_html: RawHtml,
}

impl Renderer {
    #[must_use]
    pub fn new(raw_html: RawHtml) -> Self {
        Self { raw_html }
    }

    /// Render markdown text to an HTML fragment.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);

        match self.raw_html {
            RawHtml::Allow => html::push_html(&mut out, parser),
            RawHtml::Escape => html::push_html(&mut out, parser.map(escape_raw_html)),
        }
        out
    }
}

fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

/// Escape a string for use as HTML text content.
///
/// Reuses the renderer's own text escaping so views and rendered documents
/// agree on what is safe.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, std::iter::once(Event::Text(CowStr::Borrowed(text))));
    out
}
