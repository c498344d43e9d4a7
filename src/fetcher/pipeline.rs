use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::fetcher::types::PageResponse;

/// How far into the body we look for a `<meta>` charset declaration.
const SNIFF_LEN: usize = 4096;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

// Matches both `<meta charset=..>` and the http-equiv Content-Type form.
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s[^>]*?charset\s*=\s*["']?([^"'\s;/>]+)"#).unwrap()
});

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    content_type: &str,
    body_raw: Bytes,
) -> PageResponse {
    let encoding = detect_encoding(content_type, &body_raw);
    let (decoded, _, had_errors) = encoding.decode(&body_raw);
    if had_errors {
        debug!(
            charset = encoding.name(),
            "body contained malformed sequences; replaced"
        );
    }

    PageResponse {
        url_final,
        status,
        body_utf8: decoded.into_owned(),
        body_raw,
        charset: encoding.name(),
    }
}

/// Content-Type header first, then an in-document `<meta>` declaration, then
/// chardetng's guess.
fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&HEADER_CHARSET, content_type) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(SNIFF_LEN)]);
    if let Some(encoding) = label_from(&META_CHARSET, &head) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let guessed = detector.guess(None, true);
    if guessed == UTF_8 || std::str::from_utf8(body).is_err() {
        guessed
    } else {
        // Pure ASCII/valid UTF-8 bodies decode the same either way.
        UTF_8
    }
}

fn label_from(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?;
    Encoding::for_label(label.as_str().trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_from_content_type() {
        let body = b"<html><head><title>Test</title></head></html>";
        let encoding = detect_encoding("text/html; charset=utf-8", body);
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_charset_from_meta_tag() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";
        // encoding_rs maps ISO-8859-1 to its windows-1252 superset
        assert_eq!(
            detect_encoding("text/html", body),
            encoding_rs::WINDOWS_1252
        );
    }

    #[test]
    fn test_charset_from_meta_http_equiv() {
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=shift_jis\"></head></html>";
        assert_eq!(detect_encoding("text/html", body), encoding_rs::SHIFT_JIS);
    }

    #[test]
    fn test_unknown_label_falls_through() {
        let body = "<p>Sale – 50%</p>".as_bytes();
        assert_eq!(detect_encoding("text/html; charset=bogus", body), UTF_8);
    }

    #[test]
    fn test_decodes_latin1_body() {
        let body = Bytes::from_static(b"<p>Caf\xe9 offers</p>");
        let page = process_response(
            Url::parse("https://example.com/").unwrap(),
            StatusCode::OK,
            "text/html; charset=iso-8859-1",
            body,
        );
        assert_eq!(page.body_utf8, "<p>Café offers</p>");
        assert_eq!(page.charset, "windows-1252");
    }
}
