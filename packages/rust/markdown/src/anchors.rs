//! Slug and heading-anchor generation.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Anchor used when a heading's text has no slug-safe characters.
const FALLBACK_ANCHOR: &str = "section";

/// Convert free text into a lowercase, dash-separated slug.
///
/// Alphanumerics (including non-ASCII letters) are kept; whitespace,
/// underscores and dashes become single dashes; everything else is dropped.
pub fn slugify(text: &str) -> String {
    static SEPARATOR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\s_\-]+").expect("valid regex"));

    let lowered = text.trim().to_lowercase();
    let dashed = SEPARATOR_RE.replace_all(&lowered, "-");

    let kept: String = dashed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();

    // Dropped punctuation can leave doubled or dangling dashes.
    SEPARATOR_RE
        .replace_all(&kept, "-")
        .trim_matches('-')
        .to_string()
}

/// Whether `slug` is already in canonical slug form.
pub fn is_valid_slug(slug: &str) -> bool {
    static SLUG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[\p{Ll}\p{Nd}\p{Lo}]+(?:-[\p{Ll}\p{Nd}\p{Lo}]+)*$").expect("valid regex"));

    SLUG_RE.is_match(slug)
}

/// Hands out anchors that are unique within one article.
///
/// Explicit anchors are reserved up front so a derived anchor never steals
/// one that an author assigned further down the page.
#[derive(Debug, Default)]
pub(crate) struct AnchorAllocator {
    taken: HashSet<String>,
}

impl AnchorAllocator {
    /// Reserve the explicit anchors. Returns the first duplicate, if any.
    pub(crate) fn reserve_explicit<'a>(
        &mut self,
        explicit: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), String> {
        for id in explicit {
            if !self.taken.insert(id.to_string()) {
                return Err(id.to_string());
            }
        }
        Ok(())
    }

    /// Derive an anchor from heading text, suffixing `-1`, `-2`, ... on collision.
    pub(crate) fn derive(&mut self, text: &str) -> String {
        let base = match slugify(text) {
            s if s.is_empty() => FALLBACK_ANCHOR.to_string(),
            s => s,
        };

        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_handles_common_patterns() {
        assert_eq!(slugify("Responsive Navbar"), "responsive-navbar");
        assert_eq!(slugify("  Step 2: Add the <nav> element!  "), "step-2-add-the-nav-element");
        assert_eq!(slugify("snake_case_file"), "snake-case-file");
        assert_eq!(slugify("Über Styling"), "über-styling");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn valid_slug_detection() {
        assert!(is_valid_slug("responsive-navbar"));
        assert!(is_valid_slug("part-2"));
        assert!(!is_valid_slug("Responsive-Navbar"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn derive_deduplicates() {
        let mut anchors = AnchorAllocator::default();
        assert_eq!(anchors.derive("Example"), "example");
        assert_eq!(anchors.derive("Example"), "example-1");
        assert_eq!(anchors.derive("Example"), "example-2");
        assert_eq!(anchors.derive("!!!"), "section");
        assert_eq!(anchors.derive("..."), "section-1");
    }

    #[test]
    fn derive_avoids_reserved_explicit_ids() {
        let mut anchors = AnchorAllocator::default();
        anchors.reserve_explicit(["setup"]).expect("reserve");
        assert_eq!(anchors.derive("Setup"), "setup-1");
    }

    #[test]
    fn reserve_reports_duplicates() {
        let mut anchors = AnchorAllocator::default();
        let err = anchors.reserve_explicit(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, "a");
    }
}
