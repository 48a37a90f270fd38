//! Locate the label download link in a notification body.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LabelError, Result};

static DOWNLOAD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"href="(https://internetmarke\.deutschepost\.de/PcfExtensionWeb/document\?keyphase=[^"]+)""#,
    )
    .expect("valid download link pattern")
});

/// Return the first Internetmarke document URL found in an `href` attribute.
///
/// HTML bodies escape `&` in attribute values; the returned URL has
/// `&amp;` decoded so it can be requested as-is.
pub fn extract_download_link(text: &str) -> Result<String> {
    let caps = DOWNLOAD_LINK
        .captures(text)
        .ok_or(LabelError::LinkNotFound)?;
    Ok(caps[1].replace("&amp;", "&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://internetmarke.deutschepost.de/PcfExtensionWeb/document?keyphase=XYZ";

    #[test]
    fn test_single_anchor() {
        let body = format!(r#"<p>Ihre Marke: <a href="{URL}">Download</a></p>"#);
        assert_eq!(extract_download_link(&body).unwrap(), URL);
    }

    #[test]
    fn test_first_match_wins() {
        let body = format!(
            r#"<a href="{URL}">one</a> <a href="{URL}2">two</a>"#
        );
        assert_eq!(extract_download_link(&body).unwrap(), URL);
    }

    #[test]
    fn test_no_anchor() {
        let err = extract_download_link("Vielen Dank für Ihren Einkauf").unwrap_err();
        assert!(matches!(err, LabelError::LinkNotFound));
    }

    #[test]
    fn test_other_domain_ignored() {
        let body = r#"<a href="https://example.com/PcfExtensionWeb/document?keyphase=XYZ">x</a>"#;
        assert!(matches!(
            extract_download_link(body),
            Err(LabelError::LinkNotFound)
        ));
    }

    #[test]
    fn test_bare_url_without_href_ignored() {
        assert!(extract_download_link(URL).is_err());
    }

    #[test]
    fn test_amp_entity_decoded() {
        let body = format!(r#"<a href="{URL}&amp;lang=de">x</a>"#);
        assert_eq!(
            extract_download_link(&body).unwrap(),
            format!("{URL}&lang=de")
        );
    }
}
