use url::Url;

/// Parse `raw` as an absolute URL and return its hostname without a leading
/// `www.` label.
///
/// Returns `None` for anything that is not an absolute URL with a host
/// (relative paths, free text, `mailto:` and friends). Never panics.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    host_key(&url).map(str::to_owned)
}

/// Strip exactly one leading `www.` label.
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// The host of `url` in the form used for same-domain comparisons.
pub(crate) fn host_key(url: &Url) -> Option<&str> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(strip_www)
}
