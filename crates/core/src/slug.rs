//! Slug derivation.
//!
//! Titles are lower-cased, Cyrillic letters are latinised, every other symbol
//! is dropped and runs of whitespace and hyphens collapse into one hyphen.

use std::sync::LazyLock;

use regex::Regex;
use yatube_db::entities::group::SLUG_MAX_LEN;

#[allow(clippy::expect_used)]
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator pattern"));

#[allow(clippy::expect_used)]
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern"));

/// Derive a slug from a title, at most [`SLUG_MAX_LEN`] characters long.
///
/// May return an empty string when the title has nothing transliterable.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title
        .to_lowercase()
        .replace("&amp;", " and ")
        .replace('&', " and ");

    let mut latin = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if let Some(repl) = transliterate(c) {
            latin.push_str(repl);
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() {
            latin.push(c);
        }
    }

    let collapsed = SEPARATOR_RE.replace_all(latin.trim(), "-");
    collapsed.chars().take(SLUG_MAX_LEN).collect()
}

/// Check a user-supplied slug: latin letters, digits, hyphens and underscores.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    slug.chars().count() <= SLUG_MAX_LEN && SLUG_RE.is_match(slug)
}

const fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' | 'ґ' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' | 'і' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'ї' => "yi",
        'є' => "ye",
        _ => return None,
    };
    Some(latin)
}
