//! `warenpost-label` — fetch Deutsche Post Internetmarke labels from Gmail.
//!
//! The library resolves the newest label notification into a named PDF on
//! disk ([`pipeline::Pipeline`]); printing and the confirmation prompt are
//! separate stages used by the binary.

pub mod config;
pub mod error;
pub mod fetch;
pub mod label;
pub mod link;
pub mod mail;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod print;
pub mod prompt;
