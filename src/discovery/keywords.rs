/// Promotional keywords used when the caller supplies no tags of its own.
pub const DEFAULT_KEYWORDS: [&str; 10] = [
    "deal", "offer", "sale", "discount", "%", "festival", "coupon", "flat", "upto", "save",
];

/// Keep the links whose lower-cased form contains at least one keyword.
///
/// Matching is a plain substring test, not a word match. A non-empty `tags`
/// list is lower-cased and replaces [`DEFAULT_KEYWORDS`] as given, so an
/// empty-string tag matches every link. Input order is preserved.
pub fn filter_links_by_keywords(links: &[String], tags: Option<&[String]>) -> Vec<String> {
    let custom: Vec<String> = tags
        .unwrap_or_default()
        .iter()
        .map(|tag| tag.to_lowercase())
        .collect();

    let matches = |link: &str| {
        let lower = link.to_lowercase();
        if custom.is_empty() {
            DEFAULT_KEYWORDS.iter().any(|k| lower.contains(k))
        } else {
            custom.iter().any(|k| lower.contains(k.as_str()))
        }
    };

    links
        .iter()
        .filter(|link| matches(link.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_keywords() {
        let input = links(&[
            "https://shop.example.com/deals/shoes",
            "https://shop.example.com/about",
            "https://shop.example.com/50%-off",
            "https://shop.example.com/upto-70",
        ]);

        let kept = filter_links_by_keywords(&input, None);
        assert_eq!(
            kept,
            links(&[
                "https://shop.example.com/deals/shoes",
                "https://shop.example.com/50%-off",
                "https://shop.example.com/upto-70",
            ])
        );
    }

    #[test]
    fn test_empty_tags_fall_back_to_defaults() {
        let input = links(&["https://a.com/sale", "https://a.com/contact"]);
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            filter_links_by_keywords(&input, Some(empty.as_slice())),
            filter_links_by_keywords(&input, None)
        );

    }

    #[test]
    fn test_empty_string_tag_keeps_every_link() {
        let input = links(&["https://a.com/contact", "https://a.com/sale"]);
        let blank = links(&[""]);

        assert_eq!(filter_links_by_keywords(&input, Some(blank.as_slice())), input);
    }

    #[test]
    fn test_custom_tags_replace_defaults() {
        let input = links(&[
            "https://a.com/sale",
            "https://a.com/Black-Friday",
            "https://a.com/clearance",
        ]);
        let tags = links(&["FRIDAY", "clearance"]);

        assert_eq!(
            filter_links_by_keywords(&input, Some(tags.as_slice())),
            links(&["https://a.com/Black-Friday", "https://a.com/clearance"])
        );
    }

    #[test]
    fn test_case_insensitive_substring() {
        let input = links(&["https://a.com/MEGA-SALE", "https://a.com/wholesale"]);
        assert_eq!(filter_links_by_keywords(&input, None), input);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_links_by_keywords(&[], None).is_empty());
    }
}
