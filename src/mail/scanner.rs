//! Find the newest label notification and decode its HTML body.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::{debug, info};

use super::MailSource;
use crate::error::{LabelError, Result};
use crate::model::message::Message;

/// Location of the HTML alternative in a notification: second sub-part of
/// the first part.
pub const BODY_PART_PATH: [usize; 2] = [0, 1];

/// Gmail emits base64url both with and without trailing `=`.
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Scan the first `limit` ids and return the decoded body of the first
/// message whose `From` header equals `sender`.
///
/// Messages after the first match are never fetched. Fetch errors propagate
/// unchanged; a matching message with an unexpected shape is an error rather
/// than a reason to keep scanning.
pub fn find_label_notification(
    source: &dyn MailSource,
    ids: &[String],
    sender: &str,
    limit: usize,
) -> Result<Option<String>> {
    for id in ids.iter().take(limit) {
        let message = source.get_message(id)?;
        let from = message.header("From");
        debug!(id = %id, from = ?from, "Inspecting message");
        if from == Some(sender) {
            info!(id = %id, "Found label notification");
            return decode_body(&message).map(Some);
        }
    }
    Ok(None)
}

/// Decode the notification body at [`BODY_PART_PATH`] to UTF-8 text.
pub fn decode_body(message: &Message) -> Result<String> {
    let malformed = |reason: String| LabelError::MalformedMessage {
        id: message.id.clone(),
        reason,
    };

    let part = message
        .part_at(&BODY_PART_PATH)
        .ok_or_else(|| malformed("missing nested body part".to_string()))?;
    let data = part
        .body
        .data
        .as_deref()
        .ok_or_else(|| malformed("body part has no data".to_string()))?;
    let bytes = BASE64URL
        .decode(data.trim())
        .map_err(|e| malformed(format!("invalid base64url body: {e}")))?;
    String::from_utf8(bytes).map_err(|e| malformed(format!("body is not UTF-8: {e}")))
}
