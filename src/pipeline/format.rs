//! On-screen formatting: classify the analysis text into display sections.
//!
//! The model answers in loosely structured plain text with light markdown
//! emphasis and a handful of marker glyphs. This stage turns that into a
//! section tree ([`Section`] / [`Block`]) and renders it to an HTML fragment
//! for embedding in a result panel.
//!
//! This transform is for the screen only; the printable report applies its
//! own, different line rules in [`crate::pipeline::report`].

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static LABEL_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z\s]+:$").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());

/// Marker glyphs that open a section header when they start a line.
const HEADER_GLYPHS: [char; 5] = ['❓', '📍', '🔎', '💡', '🎯'];

/// One body line inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A plain text line.
    Paragraph(String),
    /// A line that started with `-` or `•`, with the marker stripped.
    ListItem(String),
}

/// A visually grouped run of blocks, optionally headed by a title-like line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// `None` for body lines that appear before the first header.
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

/// Convert light emphasis markup and normalise marker glyphs.
///
/// `**x**` becomes `<strong>x</strong>`, `*x*` becomes `<em>x</em>` (bold
/// first, so the double marker is never half-consumed by the single one).
/// The model occasionally picks 📌 or 🔍 where the display expects 📍/🔎.
fn apply_markup(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "<strong>$1</strong>");
    let text = ITALIC_RE.replace_all(&text, "<em>$1</em>");
    text.replace('📌', "📍").replace('🔍', "🔎")
}

/// Does this trimmed line look like a section title?
///
/// Heuristics, in order: a line with no lowercase letters, a line starting
/// with one of the marker glyphs, a `Capitalized Words:` label, or a
/// `<digit>.` enumeration. The checks are independent; any match wins.
fn is_header_line(line: &str) -> bool {
    line.to_uppercase() == line
        || line.starts_with(HEADER_GLYPHS)
        || LABEL_HEADER_RE.is_match(line)
        || NUMBERED_RE.is_match(line)
}

/// Split the analysis text into display sections.
///
/// Blank lines are dropped. A header line closes the current section and
/// opens a new one; body lines before the first header land in a section
/// with no heading. When no line anywhere looks like a header, the whole
/// text becomes one unheaded section with its line breaks preserved.
pub fn format_sections(text: &str) -> Vec<Section> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let formatted = apply_markup(text);
    let mut sections: Vec<Section> = Vec::new();
    let mut saw_header = false;

    for line in formatted.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_header_line(trimmed) {
            saw_header = true;
            sections.push(Section {
                heading: Some(trimmed.to_string()),
                blocks: Vec::new(),
            });
        } else {
            let block = if let Some(rest) = trimmed.strip_prefix(['-', '•']) {
                Block::ListItem(rest.trim().to_string())
            } else {
                Block::Paragraph(trimmed.to_string())
            };
            match sections.last_mut() {
                Some(section) => section.blocks.push(block),
                None => sections.push(Section {
                    heading: None,
                    blocks: vec![block],
                }),
            }
        }
    }

    if !saw_header {
        // Breaks are preserved in this fallback so the raw structure of the
        // answer survives on screen.
        return vec![Section {
            heading: None,
            blocks: vec![Block::Paragraph(formatted.trim().to_string())],
        }];
    }

    sections
}

/// Render sections to an HTML fragment.
///
/// Empty input renders a fixed placeholder message.
pub fn render_html(sections: &[Section]) -> String {
    if sections.is_empty() {
        return "<p>No hay análisis disponible</p>".to_string();
    }

    let mut html = String::new();
    for section in sections {
        html.push_str("<div class=\"analysis-section\">");
        if let Some(ref heading) = section.heading {
            html.push_str("<h4>");
            html.push_str(heading);
            html.push_str("</h4>");
        }
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => {
                    html.push_str("<p>");
                    html.push_str(&text.replace('\n', "<br>"));
                    html.push_str("</p>");
                }
                Block::ListItem(text) => {
                    html.push_str("<ul><li>");
                    html.push_str(text);
                    html.push_str("</li></ul>");
                }
            }
        }
        html.push_str("</div>");
    }
    html
}

/// One-shot convenience: analysis text straight to an HTML fragment.
pub fn format_html(text: &str) -> String {
    render_html(&format_sections(text))
}
