//! Everything that looks inside the label PDF: text extraction, field
//! parsing, and page geometry.

pub mod geometry;
pub mod parser;
pub mod text;
