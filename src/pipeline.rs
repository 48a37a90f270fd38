//! The label-resolution pipeline: notification → link → download → parse → write.
//!
//! Every collaborator is passed in explicitly, so the whole run can be driven
//! from tests with in-memory mailboxes and documents.

use std::path::PathBuf;

use tracing::{info, info_span};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::DocumentSource;
use crate::label::parser::parse_label;
use crate::label::text::TextExtractor;
use crate::link::extract_download_link;
use crate::mail::scanner::find_label_notification;
use crate::mail::MailSource;
use crate::model::label::{LabelDocument, OutputArtifact, ParsedLabel};
use crate::output::write_output;

/// Run parameters that do not come from a collaborator.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub sender: String,
    pub scan_limit: usize,
    pub output_dir: PathBuf,
    pub resize: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, resize: bool) -> Self {
        Self {
            sender: config.mail.sender.clone(),
            scan_limit: config.scan_limit(),
            output_dir: config.general.output_dir.clone(),
            resize,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// No notification from the sender among the scanned messages.
    NoMessages,
    /// A label was resolved and is on disk (possibly from an earlier run).
    Label {
        parsed: ParsedLabel,
        artifact: OutputArtifact,
    },
}

/// Explicit run context: collaborators plus settings.
pub struct Pipeline<'a> {
    pub mail: &'a dyn MailSource,
    pub documents: &'a dyn DocumentSource,
    pub text: &'a dyn TextExtractor,
    pub settings: PipelineSettings,
}

impl Pipeline<'_> {
    pub fn run(&self) -> Result<PipelineOutcome> {
        let _span = info_span!("pipeline", resize = self.settings.resize).entered();

        let ids = self.mail.list_message_ids()?;
        info!(count = ids.len(), limit = self.settings.scan_limit, "Scanning messages");
        let Some(body) = find_label_notification(
            self.mail,
            &ids,
            &self.settings.sender,
            self.settings.scan_limit,
        )?
        else {
            info!("No label notification found");
            return Ok(PipelineOutcome::NoMessages);
        };

        let url = extract_download_link(&body)?;
        let fetched = self.documents.fetch(&url)?;
        let lines = self.text.first_page_lines(&fetched.bytes)?;
        let document = LabelDocument::new(fetched.bytes, lines);

        let parsed = parse_label(document.lines())?;
        info!(
            variant = %parsed.variant,
            tracking = %parsed.tracking_code,
            recipient = %parsed.recipient,
            url = %fetched.url,
            url_name = %fetched.url_file_name,
            "Resolved label"
        );

        let artifact = write_output(
            &self.settings.output_dir,
            &document,
            &parsed,
            self.settings.resize,
        )?;
        Ok(PipelineOutcome::Label { parsed, artifact })
    }
}
