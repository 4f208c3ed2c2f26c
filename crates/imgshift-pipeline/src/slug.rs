//! Filesystem- and URL-safe tokens from arbitrary catalog text.

/// Fixed substitution table, applied in order after lower-casing.
const SUBSTITUTIONS: [(char, &str); 6] = [
    ('|', " "),
    ('/', "-"),
    (',', ""),
    ('&', "and"),
    ('+', "-"),
    (' ', "-"),
];

/// Lower-cases `text`, applies the substitution table, collapses runs of `-`
/// and trims `-` from both ends.
///
/// Total over all strings; `normalize("")` is `""`.
///
/// ```
/// assert_eq!(
///     imgshift_pipeline::normalize("Wall & Floor | Tile/Grey"),
///     "wall-and-floor-tile-grey"
/// );
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut substituted = text.to_lowercase();
    for (from, to) in SUBSTITUTIONS {
        if substituted.contains(from) {
            substituted = substituted.replace(from, to);
        }
    }

    let mut collapsed = String::with_capacity(substituted.len());
    for ch in substituted.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }

    collapsed.trim_matches('-').to_owned()
}
