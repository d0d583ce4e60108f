//! Division name canonicalization.

/// Names whose correct casing differs from naive per-word capitalization,
/// keyed by the naive form. Covers every irregular name in the 2016 and 2019
/// federal division datasets.
const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("Mcmahon", "McMahon"),
    ("Eden-monaro", "Eden-Monaro"),
    ("Mcpherson", "McPherson"),
    ("Mcewen", "McEwen"),
    ("O'connor", "O'Connor"),
    ("Mcmillan", "McMillan"),
];

/// Canonicalizes a division name: each space-separated word gets an upper-case
/// first letter and lower-case remainder, then the override table is applied.
///
/// ```
/// use electorate_geocoder::electorate::normalize_electorate;
///
/// assert_eq!(normalize_electorate("KINGSFORD SMITH"), "Kingsford Smith");
/// assert_eq!(normalize_electorate("mcmahon"), "McMahon");
/// ```
pub fn normalize_electorate(name: &str) -> String {
    let titled = name
        .trim()
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    NAME_OVERRIDES
        .iter()
        .find(|(naive, _)| *naive == titled)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(titled)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
