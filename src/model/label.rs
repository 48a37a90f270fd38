//! Label document, parsed fields, and output artifact types.

use std::fmt;
use std::path::PathBuf;

/// A downloaded label: the raw PDF bytes and the text of its first page.
#[derive(Debug, Clone)]
pub struct LabelDocument {
    bytes: Vec<u8>,
    lines: Vec<String>,
}

impl LabelDocument {
    pub fn new(bytes: Vec<u8>, lines: Vec<String>) -> Self {
        Self { bytes, lines }
    }

    /// The document exactly as received from the network.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extracted text of page 1, one entry per visual line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// The two page layouts Deutsche Post produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelVariant {
    /// Warenpost/parcel label, carrying the extra "BÜWA" metadata line.
    Parcel,
    /// Standard letter stamp.
    Letter,
}

impl fmt::Display for LabelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parcel => f.write_str("parcel"),
            Self::Letter => f.write_str("letter"),
        }
    }
}

/// Shipment fields read from a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLabel {
    /// Tracking code with all whitespace removed. Never empty.
    pub tracking_code: String,
    /// Recipient name with whitespace replaced by `_`. Never empty.
    pub recipient: String,
    pub variant: LabelVariant,
}

impl ParsedLabel {
    /// `Briefmarke_{recipient}_{tracking}.pdf`, with `_resized` before the
    /// extension when the page geometry was trimmed.
    ///
    /// Both fields come from the document text, so path separators and
    /// control characters are replaced with `_`; the result is always a
    /// single path component.
    pub fn file_name(&self, resized: bool) -> String {
        let suffix = if resized { "_resized" } else { "" };
        format!(
            "Briefmarke_{}_{}{suffix}.pdf",
            file_name_part(&self.recipient),
            file_name_part(&self.tracking_code)
        )
    }
}

fn file_name_part(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// A page rectangle in PDF user-space units (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl PageBox {
    /// Points cut from the top edge when resizing.
    pub const TOP_TRIM: f32 = 50.0;
    /// Points cut from the bottom edge when resizing.
    pub const BOTTOM_TRIM: f32 = 10.0;

    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Move the top edge down and the bottom edge up.
    pub fn trimmed(self, top: f32, bottom: f32) -> Self {
        Self {
            top: self.top - top,
            bottom: self.bottom + bottom,
            ..self
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Where a label ended up and whether this run wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub status: WriteStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// A previous run already stored this label; nothing was touched.
    AlreadyDownloaded,
}
