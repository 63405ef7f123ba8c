pub(crate) fn urljoin(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Character encoding declared by a `Content-Type` header value.
///
/// Text media types without an explicit `charset` fall back to ISO-8859-1,
/// the HTTP/1.1 default.
pub(crate) fn declared_charset(content_type: Option<&str>) -> Option<String> {
    let content_type = content_type?;
    let mut parts = content_type.split(';');
    let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();

    for param in parts {
        if let Some((k, v)) = param.split_once('=') {
            if k.trim().eq_ignore_ascii_case("charset") {
                let v = v.trim().trim_matches('"').trim_matches('\'');
                if !v.is_empty() {
                    return Some(v.to_ascii_lowercase());
                }
            }
        }
    }

    if mime.starts_with("text/") {
        Some("iso-8859-1".to_string())
    } else {
        None
    }
}

pub(crate) fn is_latin_charset(charset: &str) -> bool {
    let c = charset.trim().to_ascii_lowercase();
    c.starts_with("iso-8859")
        || c.starts_with("iso8859")
        || c.starts_with("iso_8859")
        || c.starts_with("latin")
        || c == "l1"
        || c == "windows-1252"
        || c == "cp1252"
}
