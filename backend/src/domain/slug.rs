//! Slug validation and generation shared by volunteers and publications.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens, with no leading, trailing, or doubled hyphen
//! when generated by [`slugify`].

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Return `true` when `value` is a valid slug (`^[a-z0-9-]+$`).
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Convert free text into a slug.
///
/// Letters are lowercased and stripped of diacritics, every other character
/// becomes a hyphen, and runs of hyphens are collapsed and trimmed.
///
/// # Examples
/// ```
/// use pazanimal::domain::slugify;
///
/// assert_eq!(slugify("José  Núñez"), "jose-nunez");
/// assert_eq!(slugify("--¡Hola!--"), "hola");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.nfd().filter(|ch| !is_combining_mark(*ch)) {
        let lowered = ch.to_ascii_lowercase();
        if lowered.is_ascii_lowercase() || lowered.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(lowered);
        } else {
            pending_dash = true;
        }
    }
    slug
}
