//! services/cms/src/render.rs
//!
//! Turns a document's raw content into something a browser can display,
//! based on the document's extension.

use cms_core::domain::{DocumentKind, DocumentName, NameError};
use pulldown_cmark::{html, Options, Parser};

/// A rendered document body and how it should be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    pub kind: DocumentKind,
}

/// Renders `content` according to the extension of `name`.
///
/// Markdown becomes HTML; plain text is passed through untouched.
pub fn render(name: &str, content: &str) -> Result<Rendered, NameError> {
    let kind = DocumentName::parse(name)?.kind();
    let body = match kind {
        DocumentKind::Markdown => markdown_to_html(content),
        DocumentKind::PlainText => content.to_string(),
    };
    Ok(Rendered { body, kind })
}

/// CommonMark to HTML, with tables and strikethrough enabled.
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
