//! Data model: mail service messages and label artifacts.

pub mod label;
pub mod message;
