//! Plain text to PDF with `printpdf`, using the built-in Courier font.
//!
//! Text is laid out as one flowed block: long lines are word-wrapped to the page
//! width and a new A4 page starts whenever the bottom margin is reached. No markup
//! is interpreted.

use std::path::Path;

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem,
};
use tracing::{debug, info, warn};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const FONT_SIZE_PT: f32 = 10.0;
const LINE_HEIGHT_PT: f32 = 12.0;
// Courier advances every glyph by 600/1000 em.
const CHAR_WIDTH_PT: f32 = FONT_SIZE_PT * 0.6;
const PT_PER_MM: f32 = 72.0 / 25.4;
const TAB_WIDTH: usize = 4;

#[derive(Debug)]
pub enum CodeToPdfError {
    Io(std::io::Error),
    EmptyInput,
    Font(&'static str),
}

impl std::fmt::Display for CodeToPdfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeToPdfError::Io(e) => write!(f, "I/O error: {e}"),
            CodeToPdfError::EmptyInput => f.write_str("empty input"),
            CodeToPdfError::Font(desc) => write!(f, "font error: {desc}"),
        }
    }
}

impl std::error::Error for CodeToPdfError {}

impl From<std::io::Error> for CodeToPdfError {
    fn from(e: std::io::Error) -> Self {
        CodeToPdfError::Io(e)
    }
}

fn chars_per_line() -> usize {
    let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * PT_PER_MM;
    (usable_pt / CHAR_WIDTH_PT).floor() as usize
}

fn lines_per_page() -> usize {
    let usable_pt = (PAGE_HEIGHT_MM - 2.0 * MARGIN_MM) * PT_PER_MM;
    (usable_pt / LINE_HEIGHT_PT).floor() as usize
}

/// Render `text` into PDF bytes titled `title`.
pub fn text_to_pdf_bytes(text: &str, title: &str) -> Result<Vec<u8>, CodeToPdfError> {
    if text.trim().is_empty() {
        warn!("Attempted PDF generation with empty input");
        return Err(CodeToPdfError::EmptyInput);
    }

    let width = chars_per_line();
    let per_page = lines_per_page();
    if width == 0 || per_page == 0 {
        return Err(CodeToPdfError::Font("page too small for the chosen font size"));
    }

    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| wrap_line(&to_winansi(&expand_tabs(line)), width))
        .collect();

    let pages: Vec<PdfPage> = lines.chunks(per_page).map(page_for).collect();
    debug!(
        lines = lines.len(),
        pages = pages.len(),
        width,
        "Laid out text for PDF"
    );

    let mut doc = PdfDocument::new(title);
    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "printpdf reported warnings while saving");
    }
    Ok(bytes)
}

/// Render `text` and write the PDF to `output`.
pub fn text_to_pdf_file(text: &str, title: &str, output: &Path) -> Result<u64, CodeToPdfError> {
    let bytes = text_to_pdf_bytes(text, title)?;
    std::fs::write(output, &bytes)?;
    info!(path = %output.display(), size = bytes.len(), "Wrote text PDF");
    Ok(bytes.len() as u64)
}

fn page_for(lines: &[String]) -> PdfPage {
    let top = Mm(PAGE_HEIGHT_MM - MARGIN_MM - LINE_HEIGHT_PT / PT_PER_MM);
    let mut ops = vec![
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point::new(Mm(MARGIN_MM), top),
        },
        Op::SetFontSizeBuiltinFont {
            size: Pt(FONT_SIZE_PT),
            font: BuiltinFont::Courier,
        },
        Op::SetLineHeight {
            lh: Pt(LINE_HEIGHT_PT),
        },
    ];
    for line in lines {
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.clone())],
            font: BuiltinFont::Courier,
        });
        ops.push(Op::AddLineBreak);
    }
    ops.push(Op::EndTextSection);
    PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops)
}

fn expand_tabs(line: &str) -> String {
    line.replace('\t', &" ".repeat(TAB_WIDTH))
}

// Built-in fonts only cover Latin-1; anything else becomes '?'.
fn to_winansi(line: &str) -> String {
    line.chars()
        .map(|c| if (c as u32) < 0x100 && !c.is_control() { c } else { '?' })
        .collect()
}

/// Greedy word wrap to `width` characters. Words longer than a line are split.
///
/// Leading spaces are kept and repeated on continuation lines, capped at half
/// the line so deeply indented code still has room for text.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let body = line.trim_start_matches(' ');
    let indent = " ".repeat((line.len() - body.len()).min(width / 2));
    wrap_words(body, width - indent.len())
        .into_iter()
        .map(|l| format!("{indent}{l}"))
        .collect()
}

fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split(' ') {
        let mut word: Vec<char> = word.chars().collect();
        let sep = usize::from(current_len > 0);

        if current_len + sep + word.len() <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.extend(word.iter());
            current_len += sep + word.len();
            continue;
        }

        if current_len > 0 {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while word.len() > width {
            let rest = word.split_off(width);
            out.push(word.into_iter().collect());
            word = rest;
        }
        current.extend(word.iter());
        current_len = word.len();
    }
    out.push(current);
    out
}
