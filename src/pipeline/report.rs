//! Printable report generation.
//!
//! Lays the analysis out as an A4 PDF: a coloured title, a metadata block
//! (date, model, source file, analysis type), the body text word-wrapped and
//! paginated, and a footer on every page. The body applies its own line
//! emphasis rules, independent of the on-screen heuristics in
//! [`crate::pipeline::format`] — here any line opening with a capital or an
//! enumeration number is set bold and coloured.
//!
//! Text is written with the built-in Helvetica fonts under WinAnsi encoding,
//! which covers the Spanish output the prompt templates request; characters
//! outside Latin-1 are replaced with `?`.

use crate::error::AnalyzeError;
use crate::output::AnalysisOutput;
use chrono::Local;
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static NUMBERED_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());

/// Points per millimetre (PDF user space is 1/72 inch).
const PT_PER_MM: f32 = 72.0 / 25.4;

// A4 geometry, in millimetres from the top-left corner.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;

/// A body line past this y starts a new page.
const BODY_BREAK_MM: f32 = 270.0;
/// An emphasised line past this y starts a new page, so a heading is never
/// stranded at the bottom with no body under it.
const HEADING_BREAK_MM: f32 = 250.0;
const FOOTER_PAGE_MM: f32 = 287.0;
const FOOTER_ATTRIBUTION_MM: f32 = 292.0;

const TITLE_SIZE: f32 = 18.0;
const META_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 8.0;

/// Accent colour used for the title and emphasised lines.
const ACCENT_RGB: (u8, u8, u8) = (66, 133, 244);
const META_GRAY: (u8, u8, u8) = (100, 100, 100);
const FOOTER_GRAY: (u8, u8, u8) = (150, 150, 150);
const BLACK: (u8, u8, u8) = (0, 0, 0);

const ATTRIBUTION: &str = "Generado por Analizador de Documentos con Gemini AI";

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Content stream under construction for one page.
struct PageContent {
    ops: Vec<u8>,
}

impl PageContent {
    fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Emit one text run at a position given in millimetres from top-left.
    fn text(&mut self, font: Font, size: f32, color: (u8, u8, u8), x_mm: f32, y_mm: f32, text: &str) {
        let x = x_mm * PT_PER_MM;
        let y = (PAGE_HEIGHT_MM - y_mm) * PT_PER_MM;
        let (r, g, b) = color;
        self.ops.extend_from_slice(
            format!(
                "BT\n/{} {:.1} Tf\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} Td\n(",
                font.resource_name(),
                size,
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
                x,
                y,
            )
            .as_bytes(),
        );
        self.ops.extend_from_slice(&encode_pdf_text(text));
        self.ops.extend_from_slice(b") Tj\nET\n");
    }

    /// Like [`text`](Self::text) but horizontally centred on the page.
    fn text_centered(&mut self, font: Font, size: f32, color: (u8, u8, u8), y_mm: f32, text: &str) {
        let width_mm = estimated_width_pt(text, size) / PT_PER_MM;
        let x_mm = ((PAGE_WIDTH_MM - width_mm) / 2.0).max(0.0);
        self.text(font, size, color, x_mm, y_mm, text);
    }
}

/// Encode text for a PDF literal string: Latin-1 bytes with the string
/// delimiters escaped. Characters outside Latin-1 degrade to `?`.
fn encode_pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' };
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

/// Rough Helvetica advance estimate: half the font size per character.
///
/// Good enough for wrapping and centring prose; exact metrics would need the
/// AFM tables and buy little for a text report.
fn estimated_width_pt(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Strip display markup down to printable plain text.
///
/// Emphasis markers disappear entirely; marker glyphs become ASCII so the
/// WinAnsi fonts can render them (`❓` reads as a question label).
fn strip_print_markup(text: &str) -> String {
    text.replace("**", "")
        .replace('*', "")
        .replace('📌', "•")
        .replace('🔍', "•")
        .replace('💡', "•")
        .replace('🎯', "•")
        .replace('❓', "P:")
}

/// Word-wrap one logical line to the printable width.
fn wrap_line(line: &str, size: f32) -> Vec<String> {
    let max_width_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * PT_PER_MM;
    let max_chars = ((max_width_pt / (size * 0.5)) as usize).max(1);

    if line.trim().is_empty() {
        return vec![String::new()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        // A single over-long word is hard-split.
        if word.chars().count() > max_chars {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            let mut chunk = String::new();
            for c in word.chars() {
                chunk.push(c);
                if chunk.chars().count() == max_chars {
                    wrapped.push(std::mem::take(&mut chunk));
                }
            }
            current = chunk;
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

/// An emphasised line is set bold, coloured, and given extra lead.
fn is_emphasized(line: &str) -> bool {
    NUMBERED_LINE_RE.is_match(line)
        || line.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// The suggested filename for an exported report.
pub fn report_filename(output: &AnalysisOutput) -> String {
    let stem = output
        .source_name
        .strip_suffix(".pdf")
        .or_else(|| output.source_name.strip_suffix(".PDF"))
        .unwrap_or(&output.source_name);
    format!("analisis-{}-{}.pdf", output.analysis_type.tag(), stem)
}

/// Render the analysis as a paginated A4 PDF report.
///
/// # Errors
/// [`AnalyzeError::ExportFailed`] when the document cannot be serialised.
pub fn render_report(output: &AnalysisOutput) -> Result<Vec<u8>, AnalyzeError> {
    let mut pages: Vec<PageContent> = Vec::new();
    let mut page = PageContent::new();
    let mut y = 20.0_f32;

    // Title and metadata block on the first page.
    {
        page.text_centered(
            Font::Bold,
            TITLE_SIZE,
            ACCENT_RGB,
            y,
            output.analysis_type.report_title(),
        );
        y += 15.0;

        let date = Local::now().format("%d/%m/%Y");
        let meta = [
            format!("Generado el: {date}"),
            format!("Modelo usado: {}", output.model),
            format!("Archivo: {}", output.source_name),
            format!("Tipo de análisis: {}", output.analysis_type.display_name()),
        ];
        for (i, line) in meta.iter().enumerate() {
            page.text(
                Font::Regular,
                META_SIZE,
                META_GRAY,
                MARGIN_MM,
                y + i as f32 * 5.0,
                line,
            );
        }
        y += 25.0;
    }

    // Body: wrap, then paginate line by line.
    let clean = strip_print_markup(&output.analysis);
    for logical in clean.lines() {
        for line in wrap_line(logical, BODY_SIZE) {
            if line.is_empty() {
                y += 6.0;
                continue;
            }

            let emphasized = is_emphasized(&line);
            let break_at = if emphasized { HEADING_BREAK_MM } else { BODY_BREAK_MM };
            if y > break_at {
                pages.push(std::mem::replace(&mut page, PageContent::new()));
                y = 20.0;
            }

            if emphasized {
                page.text(Font::Bold, BODY_SIZE, ACCENT_RGB, MARGIN_MM, y, &line);
                y += 8.0;
            } else {
                page.text(Font::Regular, BODY_SIZE, BLACK, MARGIN_MM, y, &line);
                y += 6.0;
            }
        }
    }

    pages.push(page);

    // Footers are stamped once the page count is final.
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.text_centered(
            Font::Regular,
            FOOTER_SIZE,
            FOOTER_GRAY,
            FOOTER_PAGE_MM,
            &format!("Página {} de {}", i + 1, total),
        );
        page.text_centered(
            Font::Regular,
            FOOTER_SIZE,
            FOOTER_GRAY,
            FOOTER_ATTRIBUTION_MM,
            ATTRIBUTION,
        );
    }

    debug!("Report laid out across {} pages", total);
    assemble_document(pages)
}

/// Assemble the page contents into a serialised PDF.
fn assemble_document(pages: Vec<PageContent>) -> Result<Vec<u8>, AnalyzeError> {
    let mut doc = PdfDocument::with_version("1.5");

    let f1 = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let f2 = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(f1),
            "F2" => Object::Reference(f2),
        },
    });

    let pages_id = doc.new_object_id();
    let count = pages.len() as i64;
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.ops));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(PAGE_WIDTH_MM * PT_PER_MM),
                Object::Real(PAGE_HEIGHT_MM * PT_PER_MM),
            ],
            "Resources" => Object::Reference(resources_id),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| AnalyzeError::ExportFailed {
            detail: e.to_string(),
        })?;
    Ok(buffer)
}

/// Write a rendered report to disk, atomically.
///
/// The bytes land in a sibling temp file first and are renamed into place,
/// so a crash mid-write never leaves a truncated report behind.
pub fn write_report(path: &Path, bytes: &[u8]) -> Result<(), AnalyzeError> {
    let tmp = path.with_extension("pdf.tmp");
    let write = || -> std::io::Result<()> {
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)
    };
    write().map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        AnalyzeError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}
