//! Event slug derivation
//!
//! The slug is the Event's unique natural key. Both the server (when a write
//! omits or supplies a slug) and the scraper (at extraction time) derive it
//! with [`slugify`], so they agree on the document's eventual key.

/// Upper bound on slug length in bytes
pub const MAX_SLUG_LEN: usize = 80;

/// Derive a URL-safe slug from free text
///
/// Lowercases, drops everything except ASCII letters, digits, whitespace and
/// hyphens, joins whitespace runs with a single hyphen, truncates to
/// [`MAX_SLUG_LEN`] and trims hyphens from both ends.
///
/// Output only contains `[a-z0-9-]`, and `slugify(slugify(s)) == slugify(s)`.
pub fn slugify(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut slug = kept.split_whitespace().collect::<Vec<_>>().join("-");

    // Output is ASCII, so any byte index is a char boundary
    slug.truncate(MAX_SLUG_LEN);

    slug.trim_matches('-').to_string()
}

/// Normalise a client-supplied slug, rejecting one that reduces to nothing
pub fn normalize_slug(raw: Option<&str>) -> Option<String> {
    raw.map(slugify).filter(|s| !s.is_empty())
}
