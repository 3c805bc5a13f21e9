//! PDF export with the built-in Helvetica faces, US Letter, 0.5in margins.
//!
//! Line breaking is a greedy word wrap over approximate Helvetica advance
//! widths. Good enough to keep text inside the margins; it is not typesetting.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::export::blocks::Block;
use crate::export::ExportError;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 12.7;
const BULLET_INDENT_MM: f32 = 5.0;
const PT_TO_MM: f32 = 25.4 / 72.0;
const LINE_SPACING: f32 = 1.25;

const BODY_PT: f32 = 10.5;
const HEADING_PT: [f32; 6] = [18.0, 13.0, 11.5, 10.5, 10.5, 10.5];

/// Vertical gap before a block, in points.
const BLOCK_GAP_PT: f32 = 3.0;
const HEADING_GAP_PT: f32 = 8.0;

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline cursor, measured from the bottom edge.
    y_mm: f32,
    pages: usize,
}

pub fn to_pdf(blocks: &[Block]) -> Result<Vec<u8>, ExportError> {
    let mut writer = PdfWriter::new()?;
    for block in blocks {
        writer.write_block(block);
    }
    writer.finish()
}

impl PdfWriter {
    fn new() -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new("Resume", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn write_block(&mut self, block: &Block) {
        let (size_pt, bold, indent_mm, gap_pt) = match block {
            Block::Heading { level, .. } => {
                let idx = usize::from((*level).clamp(1, 6)) - 1;
                (HEADING_PT[idx], true, 0.0, HEADING_GAP_PT)
            }
            Block::Paragraph(_) => (BODY_PT, false, 0.0, BLOCK_GAP_PT),
            Block::Bullet(_) => (BODY_PT, false, BULLET_INDENT_MM, 1.0),
        };

        let text = latin1(&block.plain_text());
        let width_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent_mm;
        let lines = wrap(&text, width_mm, size_pt, bold);
        let line_height_mm = size_pt * LINE_SPACING * PT_TO_MM;

        self.y_mm -= gap_pt * PT_TO_MM;
        for (idx, line) in lines.iter().enumerate() {
            if self.y_mm - line_height_mm < MARGIN_MM {
                self.new_page();
            }
            self.y_mm -= line_height_mm;
            if idx == 0 && matches!(block, Block::Bullet(_)) {
                self.layer.use_text(
                    "-",
                    size_pt,
                    Mm(MARGIN_MM + 1.0),
                    Mm(self.y_mm),
                    &self.regular,
                );
            }
            let font = if bold { &self.bold } else { &self.regular };
            self.layer.use_text(
                line.as_str(),
                size_pt,
                Mm(MARGIN_MM + indent_mm),
                Mm(self.y_mm),
                font,
            );
        }
    }

    fn new_page(&mut self) {
        let (page, layer) =
            self.doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ExportError::Pdf(e.to_string()))
    }
}

/// Greedy word wrap. A word wider than the line gets a line of its own.
fn wrap(text: &str, width_mm: f32, size_pt: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;
    let space = text_width_mm(" ", size_pt, bold);

    for word in text.split_whitespace() {
        let word_width = text_width_mm(word, size_pt, bold);
        if !current.is_empty() && current_width + space + word_width > width_mm {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space;
        }
        current.push_str(word);
        current_width += word_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn text_width_mm(text: &str, size_pt: f32, bold: bool) -> f32 {
    let em: f32 = text.chars().map(|c| char_width_em(c, bold)).sum();
    em * size_pt * PT_TO_MM
}

/// Coarse Helvetica advance widths in em.
fn char_width_em(c: char, bold: bool) -> f32 {
    let base = match c {
        ' ' | '!' | '\'' | ',' | '.' | ':' | ';' | '|' | 'i' | 'j' | 'l' | 'I' => 0.278,
        'f' | 't' | 'r' | '(' | ')' | '-' | '/' | '[' | ']' => 0.333,
        'm' | 'M' | 'W' => 0.833,
        'w' | '@' | '%' => 0.778,
        'A'..='Z' => 0.667,
        '0'..='9' | 'a'..='z' => 0.556,
        _ => 0.584,
    };
    if bold {
        base * 1.06
    } else {
        base
    }
}

/// The built-in fonts only cover WinAnsi; anything else prints as `?`.
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '-',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}
