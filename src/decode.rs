use std::io::{self, Read};

use crate::util::{declared_charset, is_latin_charset};

const DOCTYPE_HTML: &[u8] = b"<!doctype html";

/// Whether the server sent an HTML page where a data payload was expected.
///
/// Only bodies declared (or defaulted) as Latin/ISO text are inspected; the
/// BioPortal front end serves its JavaScript shell that way.
pub(crate) fn is_html_response(content_type: Option<&str>, body: &[u8]) -> bool {
    let Some(charset) = declared_charset(content_type) else {
        return false;
    };
    if !is_latin_charset(&charset) {
        return false;
    }

    // Latin-1 maps every byte to one char, so byte-wise comparison is exact.
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let body = &body[start..];
    body.len() >= DOCTYPE_HTML.len()
        && body[..DOCTYPE_HTML.len()].eq_ignore_ascii_case(DOCTYPE_HTML)
}

pub(crate) fn brotli_decompress(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len() * 4);
    brotli::Decompressor::new(body, 4096).read_to_end(&mut out)?;
    Ok(out)
}

/// Brotli-decodes `body`, or hands it back untouched when it is not a valid
/// Brotli stream.
pub(crate) fn decompress_or_plain(body: Vec<u8>) -> Vec<u8> {
    match brotli_decompress(&body) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, len = body.len(), "body is not Brotli, using it as-is");
            body
        }
    }
}
