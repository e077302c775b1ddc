use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use xlgrid::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<t>\"x\"</t>"), "&lt;t&gt;&quot;x&quot;&lt;/t&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Decode raw (still escaped) XML text into a plain string.
///
/// Handles the five predefined entities and numeric character references.
pub fn unescape_xml(raw: &str) -> crate::common::Result<String> {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .map_err(|e| crate::common::Error::MalformedDocument(e.to_string()))
}

/// Whether a text node needs `xml:space="preserve"` to keep its whitespace.
#[inline]
pub fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(escape_xml("'&'"), "&apos;&amp;&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_unescape_entities_and_char_refs() {
        assert_eq!(unescape_xml("a &amp; b").unwrap(), "a & b");
        assert_eq!(unescape_xml("&#65;&#x42;").unwrap(), "AB");
        assert!(unescape_xml("&bogus;").is_err());
    }

    #[test]
    fn test_space_preserve() {
        assert!(needs_space_preserve(" lead"));
        assert!(needs_space_preserve("trail\n"));
        assert!(!needs_space_preserve("in side"));
        assert!(!needs_space_preserve(""));
    }
}
