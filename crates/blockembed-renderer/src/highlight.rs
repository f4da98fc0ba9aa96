//! Syntax highlighting for the editable source view.
//!
//! Produces class-based markup (`hl-*` classes) so the theme stylesheet decides
//! colours. Callers that only need something displayable use
//! [`highlight_or_escape`], which falls back to escaped plain text.

use std::sync::LazyLock;

use blockembed_common::HighlightLang;
use pulldown_cmark_escape::escape_html;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::RenderError;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Class prefix for highlighted tokens.
pub const CLASS_PREFIX: &str = "hl-";

/// Highlight `source` as `lang`, returning class-annotated HTML.
pub fn highlight(source: &str, lang: HighlightLang) -> Result<String, RenderError> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(lang.token())
        .ok_or(RenderError::UnknownLanguage(lang.token()))?;

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAX_SET,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );

    for line in LinesWithEndings::from(source) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| RenderError::Highlight(e.to_string()))?;
    }

    Ok(generator.finalize())
}

/// Highlight, or escape the source verbatim if the grammar is unavailable.
pub fn highlight_or_escape(source: &str, lang: HighlightLang) -> String {
    match highlight(source, lang) {
        Ok(html) => html,
        Err(e) => {
            tracing::debug!(target: "blockembed::highlight", lang = lang.token(), "falling back to plain text: {e}");
            escape_plain(source)
        }
    }
}

/// Escape source for display without highlighting.
pub fn escape_plain(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    // Writing to String can't fail
    let _ = escape_html(&mut out, source);
    out
}
