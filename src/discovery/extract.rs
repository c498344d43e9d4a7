use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::discovery::domain::host_key;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to compile anchor selector"));

/// Collect every anchor in `html` that points back into the site `base_url`
/// belongs to.
///
/// Hrefs are resolved against `base_url`, so relative, protocol-relative and
/// absolute forms are all accepted. A link is kept when its host equals the
/// base host once a leading `www.` is stripped from both. Fragments are
/// removed and exact duplicates collapse to their first occurrence.
///
/// Hrefs that fail to resolve are skipped. An unparseable `base_url` yields
/// no links at all.
pub fn extract_internal_links(html: &str, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Some(base_host) = host_key(&base) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        if host_key(&resolved) != Some(base_host) {
            continue;
        }

        resolved.set_fragment(None);
        let resolved = String::from(resolved);
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    links
}
