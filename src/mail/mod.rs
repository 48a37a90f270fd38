//! Mailbox access: the [`MailSource`] seam, the Gmail implementation, and
//! the scanner that finds the label notification.

pub mod auth;
pub mod gmail;
pub mod scanner;

use crate::error::Result;
use crate::model::message::Message;

/// Read-only access to a mailbox.
///
/// Implementations return ids newest-first, the way the mail service lists
/// them; [`scanner::find_label_notification`] relies on that order.
pub trait MailSource {
    /// Ids of the messages in the mailbox.
    fn list_message_ids(&self) -> Result<Vec<String>>;

    /// Fetch one message with its full MIME payload.
    fn get_message(&self, id: &str) -> Result<Message>;
}
