//! Message shapes as returned by the Gmail REST API (`format=full`).
//!
//! Only the fields the scanner reads are modelled; everything else in the
//! JSON is ignored.

use serde::{Deserialize, Serialize};

/// Reference returned by `users.messages.list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

/// A full message with its MIME payload tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub payload: MessagePart,
}

/// One node of the MIME tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: PartBody,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

/// A single header in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Body of a part; `data` is base64url text when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl Message {
    /// Value of the first header called `name` (case-sensitive, as Gmail
    /// returns canonical casing).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    /// Follow `path` through nested `parts`, e.g. `[0, 1]` is the second
    /// sub-part of the first part.
    pub fn part_at(&self, path: &[usize]) -> Option<&MessagePart> {
        path.iter()
            .try_fold(&self.payload, |part, &idx| part.parts.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "18c1",
        "threadId": "18c1",
        "payload": {
            "mimeType": "multipart/mixed",
            "headers": [
                {"name": "Subject", "value": "Ihre Internetmarke"},
                {"name": "From", "value": "service-shop@deutschepost.de"}
            ],
            "body": {"size": 0},
            "parts": [{
                "mimeType": "multipart/alternative",
                "parts": [
                    {"mimeType": "text/plain", "body": {"size": 5, "data": "aGVsbG8"}},
                    {"mimeType": "text/html", "body": {"size": 12, "data": "PGI-aGk8L2I-"}}
                ]
            }]
        }
    }"#;

    #[test]
    fn test_deserialize_full_message() {
        let msg: Message = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(msg.id, "18c1");
        assert_eq!(msg.header("From"), Some("service-shop@deutschepost.de"));
        assert_eq!(msg.header("To"), None);
        let html = msg.part_at(&[0, 1]).unwrap();
        assert_eq!(html.mime_type, "text/html");
        assert_eq!(html.body.data.as_deref(), Some("PGI-aGk8L2I-"));
    }

    #[test]
    fn test_part_at_out_of_range() {
        let msg: Message = serde_json::from_str(SAMPLE).unwrap();
        assert!(msg.part_at(&[0, 2]).is_none());
        assert!(msg.part_at(&[1]).is_none());
    }
}
