use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::shared::validation::NON_SLUG_RUN_REGEX;

/// Derive a URL slug from a category name.
///
/// Lowercases, strips diacritics through canonical decomposition, collapses
/// every run outside `[a-z0-9]` into one hyphen and trims hyphens at both
/// ends. An empty result means the slug is unset.
pub fn derive_slug(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    NON_SLUG_RUN_REGEX
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}
