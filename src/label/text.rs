//! First-page text extraction.
//!
//! Labels often draw several lines inside one `BT`/`ET` block and move
//! between them with text-positioning operators, so lines are rebuilt from
//! the content stream rather than taken from whole text objects.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

use crate::error::{LabelError, Result};

/// `TJ` adjustments at least this wide (thousandths of an em) read as a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Turns PDF bytes into the text lines of page 1.
pub trait TextExtractor {
    fn first_page_lines(&self, pdf: &[u8]) -> Result<Vec<String>>;
}

/// [`TextExtractor`] that walks the page content stream with lopdf.
///
/// A new line starts on `ET`, `T*`, `'`, `"`, on `Td`/`TD` with a vertical
/// offset, and on `Tm` when the baseline moves. Strings are decoded as
/// UTF-16BE when they carry a byte-order mark and as WinAnsi otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfText;

impl TextExtractor for LopdfText {
    fn first_page_lines(&self, pdf: &[u8]) -> Result<Vec<String>> {
        let doc = Document::load_mem(pdf)?;
        let page_id = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or_else(|| LabelError::Pdf("document has no pages".to_string()))?;
        let content = Content::decode(&doc.get_page_content(page_id)?)?;
        Ok(lines_from_operations(&content.operations))
    }
}

/// Rebuild visual lines from content-stream operations.
pub fn lines_from_operations(operations: &[Operation]) -> Vec<String> {
    let mut lines = LineBuilder::default();
    for op in operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "ET" | "T*" => lines.break_line(),
            "Td" | "TD" => {
                if operand(operands, 1).is_some_and(|ty| ty != 0.0) {
                    lines.break_line();
                }
            }
            "Tm" => lines.move_baseline(operand(operands, 5)),
            "Tj" => lines.show(operands.first()),
            "'" => {
                lines.break_line();
                lines.show(operands.first());
            }
            "\"" => {
                lines.break_line();
                lines.show(operands.get(2));
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match number(item) {
                            Some(adjust) if -adjust >= TJ_SPACE_THRESHOLD => lines.space(),
                            Some(_) => {}
                            None => lines.show(Some(item)),
                        }
                    }
                }
            }
            _ => {}
        }
    }
    lines.finish()
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<String>,
    current: String,
    baseline: Option<f32>,
}

impl LineBuilder {
    fn show(&mut self, text: Option<&Object>) {
        if let Some(Object::String(bytes, _)) = text {
            self.current.push_str(&decode_string(bytes));
        }
    }

    fn space(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    fn move_baseline(&mut self, y: Option<f32>) {
        if let (Some(prev), Some(y)) = (self.baseline, y) {
            if prev != y {
                self.break_line();
            }
        }
        self.baseline = y.or(self.baseline);
    }

    fn break_line(&mut self) {
        let line = self.current.trim_end();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}

fn operand(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(number)
}

#[allow(clippy::cast_precision_loss, clippy::unnecessary_cast)]
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Decode a PDF string operand.
pub fn decode_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| win_ansi(b)).collect()
}

/// WinAnsiEncoding: Latin-1 apart from the 0x80..=0x9F block.
fn win_ansi(byte: u8) -> char {
    const HIGH: [char; 32] = [
        '€', '\u{FFFD}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{FFFD}', 'Ž',
        '\u{FFFD}', '\u{FFFD}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ',
        '\u{FFFD}', 'ž', 'Ÿ',
    ];
    match byte {
        0x80..=0x9F => HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}
