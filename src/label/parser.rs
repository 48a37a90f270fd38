//! Positional field extraction from page-1 text.
//!
//! Deutsche Post labels come in two layouts. The parcel ("Warenpost") label
//! prints a `BÜWA` marker on line 2 and carries one extra metadata line, so
//! the recipient moves from line 4 to line 5. Each layout is a row in
//! [`LAYOUTS`]; detection walks the table in order and the first layout whose
//! marker matches (or that has no marker) wins.

use regex::Regex;
use tracing::debug;

use crate::error::{LabelError, Result};
use crate::model::label::{LabelVariant, ParsedLabel};

/// Line holding the tracking code in every layout.
pub const TRACKING_LINE: usize = 0;

/// A token expected on a fixed line.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub line: usize,
    pub token: &'static str,
}

/// Line offsets for one label layout.
#[derive(Debug, Clone, Copy)]
pub struct LabelLayout {
    pub variant: LabelVariant,
    /// `None` marks the fallback layout.
    pub marker: Option<Marker>,
    pub recipient_line: usize,
}

/// Known layouts, most specific first.
pub const LAYOUTS: &[LabelLayout] = &[
    LabelLayout {
        variant: LabelVariant::Parcel,
        marker: Some(Marker {
            line: 2,
            token: "BÜWA",
        }),
        recipient_line: 5,
    },
    LabelLayout {
        variant: LabelVariant::Letter,
        marker: None,
        recipient_line: 4,
    },
];

/// Read tracking code and recipient from the first-page text lines.
pub fn parse_label(lines: &[String]) -> Result<ParsedLabel> {
    let layout = detect_layout(lines)?;

    let tracking_code: String = line(lines, TRACKING_LINE, "tracking code")?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if tracking_code.is_empty() {
        return Err(parse_error("tracking code", TRACKING_LINE, lines));
    }

    let recipient = line(lines, layout.recipient_line, "recipient")?
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if recipient.is_empty() {
        return Err(parse_error("recipient", layout.recipient_line, lines));
    }

    debug!(variant = %layout.variant, tracking = %tracking_code, recipient = %recipient, "Parsed label");
    Ok(ParsedLabel {
        tracking_code,
        recipient,
        variant: layout.variant,
    })
}

/// Pick the layout for `lines`.
pub fn detect_layout(lines: &[String]) -> Result<&'static LabelLayout> {
    for layout in LAYOUTS {
        match layout.marker {
            None => return Ok(layout),
            Some(marker) => {
                let text = line(lines, marker.line, "format marker")?;
                if marker_matches(text, marker.token) {
                    return Ok(layout);
                }
            }
        }
    }
    Err(LabelError::Parse {
        field: "format marker",
        line: 0,
        available: lines.len(),
    })
}

/// Comparison form for marker text: uppercase ASCII letters and digits only.
///
/// Extraction libraries render the diaeresis inconsistently: as `Ü`, as a
/// decomposed `U` + U+0308, as UTF-8 read as Latin-1 or CP1252 (`Ã\u{9c}`,
/// `Ãœ`), as `?` or U+FFFD, or not at all. Dropping everything outside ASCII
/// alphanumerics turns all of those into the same residue.
pub fn canonical(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Whether `text` reads as `token` once damage to umlauts is allowed for.
///
/// Each umlaut in `token` may appear as its base letter, its `E`
/// transliteration, or vanish entirely; every other character must match
/// after [`canonical`].
pub fn marker_matches(text: &str, token: &str) -> bool {
    let mut pattern = String::from("^");
    for c in token.to_uppercase().chars() {
        match c {
            'Ä' => pattern.push_str("(?:AE?)?"),
            'Ö' => pattern.push_str("(?:OE?)?"),
            'Ü' => pattern.push_str("(?:UE?)?"),
            c if c.is_ascii_alphanumeric() => pattern.push(c),
            _ => {}
        }
    }
    pattern.push('$');
    Regex::new(&pattern).is_ok_and(|re| re.is_match(&canonical(text)))
}

fn line<'a>(lines: &'a [String], index: usize, field: &'static str) -> Result<&'a str> {
    lines
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| parse_error(field, index, lines))
}

fn parse_error(field: &'static str, line: usize, lines: &[String]) -> LabelError {
    LabelError::Parse {
        field,
        line,
        available: lines.len(),
    }
}
