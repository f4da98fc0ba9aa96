//! LaTeX typesetting via pulldown-latex → MathML
//!
//! [`typeset`] renders a whole block source. Rendering never fails: malformed
//! input produces a marked error span in place of the broken segment.
//!
//! Only the commands in [`TRUSTED_COMMANDS`] may emit links or images, and only
//! for URLs whose scheme is allowed for that command. Everything else goes
//! through the MathML renderer, which cannot produce active content.

use pulldown_cmark_escape::{escape_href, escape_html};
use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};
use smol_str::SmolStr;
use url::Url;

/// Commands allowed to produce potentially unsafe output.
pub const TRUSTED_COMMANDS: [&str; 3] = ["url", "href", "includegraphics"];

/// Result of attempting to render LaTeX math
pub enum MathResult {
    /// Successfully rendered MathML
    Success(String),
    /// Rendering failed - contains fallback HTML with source and error message
    Error { html: String, message: String },
}

/// Render LaTeX math to MathML
///
/// # Arguments
/// * `latex` - The LaTeX source string (without delimiters like $ or $$)
/// * `display_mode` - If true, render as display math (block); if false, inline
pub fn render_math(latex: &str, display_mode: bool) -> MathResult {
    let storage = Storage::new();
    let parser = Parser::new(latex, &storage);
    let config = RenderConfig {
        display_mode: if display_mode {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };

    let mut mathml = String::new();

    let events: Vec<_> = parser.collect();
    let errors: Vec<String> = events
        .iter()
        .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
        .collect();

    if errors.is_empty() {
        if let Err(e) = push_mathml(&mut mathml, events.into_iter(), config) {
            return MathResult::Error {
                html: format_error_html(latex, &e.to_string(), display_mode),
                message: e.to_string(),
            };
        }
        MathResult::Success(mathml)
    } else {
        let error_msg = errors.join("; ");
        MathResult::Error {
            html: format_error_html(latex, &error_msg, display_mode),
            message: error_msg,
        }
    }
}

fn format_error_html(latex: &str, error: &str, display_mode: bool) -> String {
    let mode_class = mode_class(display_mode);
    let mut escaped_latex = String::new();
    let mut escaped_error = String::new();
    // These won't fail writing to String
    let _ = escape_html(&mut escaped_latex, latex);
    let _ = escape_html(&mut escaped_error, error);
    format!(
        r#"<span class="math math-error {mode_class}" title="{escaped_error}"><code>{escaped_latex}</code></span>"#
    )
}

fn mode_class(display_mode: bool) -> &'static str {
    if display_mode {
        "math-display"
    } else {
        "math-inline"
    }
}

/// Typeset output for a whole block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Typeset {
    /// Markup to mount in the preview.
    pub html: String,
    /// Every anchor href emitted, in document order.
    pub links: Vec<SmolStr>,
    /// Messages for segments that rendered as errors.
    pub errors: Vec<String>,
}

impl Typeset {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrustedCommand {
    Url,
    Href,
    IncludeGraphics,
}

impl TrustedCommand {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "url" => Some(Self::Url),
            "href" => Some(Self::Href),
            "includegraphics" => Some(Self::IncludeGraphics),
            _ => None,
        }
    }

    fn arity(&self) -> usize {
        match self {
            Self::Url | Self::IncludeGraphics => 1,
            Self::Href => 2,
        }
    }

    fn allows_scheme(&self, scheme: &str) -> bool {
        match self {
            Self::Url | Self::Href => matches!(scheme, "http" | "https" | "mailto"),
            Self::IncludeGraphics => matches!(scheme, "http" | "https"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Math(&'a str),
    Command {
        command: TrustedCommand,
        args: Vec<&'a str>,
        raw: &'a str,
    },
}

/// Typeset a block source in display mode, applying the trust policy.
pub fn typeset(latex: &str, display_mode: bool) -> Typeset {
    let mut out = Typeset::default();
    out.html.push_str(&format!(
        r#"<span class="math {}">"#,
        mode_class(display_mode)
    ));

    for segment in split_trusted(latex) {
        match segment {
            Segment::Math(src) => push_math(&mut out, src, display_mode),
            Segment::Command { command, args, raw } => {
                let Some(url) = trusted_url(command, args[0]) else {
                    let message = format!("untrusted URL in {}", raw.split('{').next().unwrap_or(raw));
                    tracing::debug!(target: "blockembed::latex", %raw, "rejected by trust policy");
                    out.html
                        .push_str(&format_error_html(raw, &message, display_mode));
                    out.errors.push(message);
                    continue;
                };
                push_command(&mut out, command, &url, &args);
            }
        }
    }

    out.html.push_str("</span>");
    out
}

fn push_math(out: &mut Typeset, src: &str, display_mode: bool) {
    if src.trim().is_empty() {
        return;
    }
    match render_math(src, display_mode) {
        MathResult::Success(mathml) => out.html.push_str(&mathml),
        MathResult::Error { html, message } => {
            out.html.push_str(&html);
            out.errors.push(message);
        }
    }
}

fn push_command(out: &mut Typeset, command: TrustedCommand, url: &Url, args: &[&str]) {
    let href = url.as_str();
    match command {
        TrustedCommand::Url => {
            out.html.push_str(r#"<a class="math-link" href=""#);
            let _ = escape_href(&mut out.html, href);
            out.html.push_str(r#"">"#);
            let _ = escape_html(&mut out.html, args[0].trim());
            out.html.push_str("</a>");
            out.links.push(SmolStr::new(href));
        }
        TrustedCommand::Href => {
            out.html.push_str(r#"<a class="math-link" href=""#);
            let _ = escape_href(&mut out.html, href);
            out.html.push_str(r#"">"#);
            push_math(out, args[1], false);
            out.html.push_str("</a>");
            out.links.push(SmolStr::new(href));
        }
        TrustedCommand::IncludeGraphics => {
            out.html.push_str(r#"<img class="math-image" alt="" src=""#);
            let _ = escape_href(&mut out.html, href);
            out.html.push_str(r#"">"#);
        }
    }
}

fn trusted_url(command: TrustedCommand, raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    command.allows_scheme(url.scheme()).then_some(url)
}

/// Split source into plain math and trusted-command segments.
///
/// A trusted command whose arguments are malformed stays in the surrounding
/// math segment, where the MathML renderer reports it as an error.
fn split_trusted(src: &str) -> Vec<Segment<'_>> {
    let bytes = src.as_bytes();
    let mut segments = Vec::new();
    let mut math_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }

        let name_start = i + 1;
        let mut name_end = name_start;
        while name_end < bytes.len() && bytes[name_end].is_ascii_alphabetic() {
            name_end += 1;
        }

        // Control symbol (`\\`, `\{`, ...): skip the escaped byte too.
        if name_end == name_start {
            i = name_start + 1;
            continue;
        }

        let Some(command) = TrustedCommand::from_name(&src[name_start..name_end]) else {
            i = name_end;
            continue;
        };

        match parse_args(src, name_end, command) {
            Some((args, end)) => {
                if math_start < i {
                    segments.push(Segment::Math(&src[math_start..i]));
                }
                segments.push(Segment::Command {
                    command,
                    args,
                    raw: &src[i..end],
                });
                math_start = end;
                i = end;
            }
            None => i = name_end,
        }
    }

    if math_start < src.len() {
        segments.push(Segment::Math(&src[math_start..]));
    }
    segments
}

fn parse_args(src: &str, mut pos: usize, command: TrustedCommand) -> Option<(Vec<&str>, usize)> {
    let bytes = src.as_bytes();
    pos = skip_whitespace(bytes, pos);

    // Optional `[width=...]` for images; its contents are ignored.
    if command == TrustedCommand::IncludeGraphics && bytes.get(pos) == Some(&b'[') {
        let close = src[pos..].find(']')?;
        pos = skip_whitespace(bytes, pos + close + 1);
    }

    let mut args = Vec::with_capacity(command.arity());
    for _ in 0..command.arity() {
        pos = skip_whitespace(bytes, pos);
        let (arg, end) = brace_group(src, pos)?;
        args.push(arg);
        pos = end;
    }
    Some((args, pos))
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Contents of the `{...}` group starting at `start`, and the offset after it.
fn brace_group(src: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&src[start + 1..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
