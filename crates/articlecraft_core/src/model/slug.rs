//! URL slug derivation.
//!
//! Turkish letters are transliterated to ASCII; every other run of
//! non-alphanumeric characters collapses to one `-`.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Derives a URL slug from a title.
///
/// Returns an empty string when the title has no alphanumeric content.
pub fn slugify(title: &str) -> String {
    let transliterated = title
        .chars()
        .map(transliterate)
        .collect::<String>()
        .to_lowercase();
    NON_SLUG_RE
        .replace_all(&transliterated, "-")
        .trim_matches('-')
        .to_string()
}

fn transliterate(c: char) -> char {
    match c {
        'ı' | 'İ' => 'i',
        'ş' | 'Ş' => 's',
        'ğ' | 'Ğ' => 'g',
        'ü' | 'Ü' => 'u',
        'ö' | 'Ö' => 'o',
        'ç' | 'Ç' => 'c',
        'â' | 'Â' => 'a',
        'î' | 'Î' => 'i',
        'û' | 'Û' => 'u',
        other => other,
    }
}
