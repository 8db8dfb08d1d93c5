//! Text helpers shared by the enricher

/// URL utilities for feed items
pub mod url {
    use url::Url;

    /// Hostname of `url_str` without a leading `www.`
    pub fn source_host(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let host = url.host_str()?;
        let host = host.strip_prefix("www.").unwrap_or(host);
        if host.is_empty() {
            None
        } else {
            Some(host.to_string())
        }
    }
}

/// Feed text cleanup
pub mod feed {
    /// Remove every `<...>` tag. An unterminated `<` is kept as text.
    pub fn strip_tags(html: &str) -> String {
        let mut text = String::with_capacity(html.len());
        let mut rest = html;

        while let Some(open) = rest.find('<') {
            text.push_str(&rest[..open]);
            match rest[open..].find('>') {
                Some(close) => rest = &rest[open + close + 1..],
                None => {
                    text.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        text.push_str(rest);
        text
    }

    /// Replace entity escapes such as `&amp;` or `&#8217;` with a single space.
    pub fn replace_entities(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
                .unwrap_or(after.len());

            if name_len > 0 && after[name_len..].starts_with(';') {
                out.push(' ');
                rest = &after[name_len + 1..];
            } else {
                out.push('&');
                rest = after;
            }
        }
        out.push_str(rest);
        out
    }

    /// Strip markup and entities, trim, and cap at `limit` characters.
    /// `...` is appended only when something was cut.
    pub fn clean_description(raw: &str, limit: usize) -> String {
        let cleaned = replace_entities(&strip_tags(raw));
        let cleaned = cleaned.trim();

        if cleaned.chars().count() > limit {
            let mut truncated: String = cleaned.chars().take(limit).collect();
            truncated.push_str("...");
            truncated
        } else {
            cleaned.to_string()
        }
    }

    /// Case-insensitive substring test
    pub fn contains_ignore_case(haystack_lower: &str, needle: &str) -> bool {
        !needle.is_empty() && haystack_lower.contains(&needle.to_lowercase())
    }

    /// Keyword test against lowercased text. The keyword is used as configured,
    /// so a keyword with capitals never matches.
    pub fn contains_keyword(haystack_lower: &str, keyword: &str) -> bool {
        !keyword.is_empty() && haystack_lower.contains(keyword)
    }
}

/// Article identifiers
pub mod id {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    /// 32-bit rolling hash over the UTF-16 units of `title + published`,
    /// rendered as the absolute value in base 36.
    pub fn article_id(title: &str, published: &str) -> String {
        let mut hash: i32 = 0;
        for unit in title.encode_utf16().chain(published.encode_utf16()) {
            hash = hash
                .wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit));
        }
        to_base36(i64::from(hash).unsigned_abs())
    }

    fn to_base36(mut n: u64) -> String {
        if n == 0 {
            return "0".to_string();
        }
        let mut digits = Vec::new();
        while n > 0 {
            digits.push(DIGITS[(n % 36) as usize] as char);
            n /= 36;
        }
        digits.iter().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::feed::*;
    use super::id::article_id;
    use super::url::source_host;

    #[test]
    fn id_matches_known_values() {
        assert_eq!(article_id("", ""), "0");
        assert_eq!(article_id("a", ""), "2p");
        assert_eq!(article_id("a", "b"), "2e9");
        assert_eq!(article_id("ab", ""), article_id("a", "b"));
    }

    #[test]
    fn id_wraps_without_panicking() {
        let long = "x".repeat(10_000);
        let id = article_id(&long, "2024-01-01T00:00:00+00:00");
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn strips_tags_and_entities() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("1 < 2"), "1 < 2");
        assert_eq!(replace_entities("Tom&amp;Jerry"), "Tom Jerry");
        assert_eq!(replace_entities("it&#8217;s"), "it s");
        assert_eq!(replace_entities("R&D; & more"), "R  & more");
        assert_eq!(replace_entities("a && b"), "a && b");
    }

    #[test]
    fn clean_description_truncates_with_marker() {
        let long = format!("<p>{}</p>", "a".repeat(250));
        let cleaned = clean_description(&long, 200);
        assert_eq!(cleaned.chars().count(), 203);
        assert!(cleaned.ends_with("..."));

        let exact = "b".repeat(200);
        assert_eq!(clean_description(&exact, 200), exact);

        assert_eq!(clean_description("  <i>short</i>  ", 200), "short");
    }

    #[test]
    fn keywords_match_as_configured() {
        assert!(contains_keyword("deutsche bank said profits rose", "bank"));
        assert!(!contains_keyword("deutsche bank said profits rose", "AI"));
        assert!(!contains_keyword("every level", "EV"));
        assert!(contains_ignore_case("sap results", "SAP"));
    }

    #[test]
    fn source_host_strips_www() {
        assert_eq!(source_host("https://www.reuters.com/x").as_deref(), Some("reuters.com"));
        assert_eq!(source_host("https://feeds.bloomberg.com/y").as_deref(), Some("feeds.bloomberg.com"));
        assert_eq!(source_host("not a url"), None);
    }
}
