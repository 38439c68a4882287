//! Text-to-slug transform used when a record is saved without a slug.
//!
//! Matches the conventional web-framework slug rules: the text is decomposed
//! (NFKD) and reduced to ASCII, lowercased, anything that is not a word
//! character, whitespace or hyphen is dropped, and runs of whitespace/hyphens
//! collapse into a single `-`. Leading and trailing `-`/`_` are trimmed.

use unicode_normalization::UnicodeNormalization;

/// Derive a slug from display text.
///
/// ```
/// use storefront_core::slug::slugify;
///
/// assert_eq!(slugify("Bilgisayar & Tablet"), "bilgisayar-tablet");
/// assert_eq!(slugify("  Çocuk Giyim  "), "cocuk-giyim");
/// ```
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;

    for ch in text.nfkd().filter(char::is_ascii) {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch);
        } else if ch == '-' || ch.is_ascii_whitespace() {
            pending_sep = true;
        }
        // Punctuation is removed without acting as a separator.
    }

    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Returns `true` when `text` is acceptable as an operator-supplied slug:
/// non-empty and made of ASCII letters, digits, hyphens or underscores.
pub fn is_valid_slug(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(slugify("Gaming Laptops"), "gaming-laptops");
        assert_eq!(slugify("Men's  Shoes"), "mens-shoes");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn folds_accents_and_drops_other_non_ascii() {
        assert_eq!(slugify("Ev & Yaşam"), "ev-yasam");
        assert_eq!(slugify("Crème brûlée"), "creme-brulee");
        assert_eq!(slugify("日本"), "");
    }

    #[test]
    fn trims_separators_and_underscores_at_edges() {
        assert_eq!(slugify("--hello world__"), "hello-world");
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn valid_slug_check() {
        assert!(is_valid_slug("fa-laptop_2"));
        assert!(!is_valid_slug(""));
        assert!(is_valid_slug("Custom-Slug"));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("ç"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: output only contains slug characters and never starts/ends with a separator.
            #[test]
            fn output_alphabet(text in "\\PC{0,60}") {
                let slug = slugify(&text);
                prop_assert!(slug.is_empty() || is_valid_slug(&slug));
                prop_assert_eq!(slug.to_lowercase(), slug.clone());
                prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }

            /// Property: slugifying a slug is a no-op.
            #[test]
            fn idempotent(text in "[A-Za-z0-9 '&-]{0,40}") {
                let once = slugify(&text);
                prop_assert_eq!(slugify(&once), once.clone());
            }
        }
    }
}
