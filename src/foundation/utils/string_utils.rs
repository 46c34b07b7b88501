use std::path::is_separator;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Lowercases text and brings it into composed form (NFC).
///
/// File names and catalog titles may spell the same accented letter composed
/// or decomposed; both sides of a title comparison go through this function.
/// Composition only joins canonically equal sequences, so a letter without an
/// accent never matches one with it.
///
/// # Examples
///
/// ```
/// use ammg::foundation::utils::normalize_unicode;
///
/// assert_eq!(normalize_unicode("Café"), normalize_unicode("CAFE\u{301}"));
/// assert!(!normalize_unicode("Café del Mar").contains(&normalize_unicode("Cafe")));
/// ```
pub fn normalize_unicode(input: &str) -> String {
    input.to_lowercase().nfc().collect()
}

/// Returns the uppercased first character of a name, used as the top level
/// folder of the output tree.
///
/// The first grapheme cluster is taken so that a base letter keeps its
/// combining marks. Empty names map to `_`.
///
/// # Examples
///
/// ```
/// use ammg::foundation::utils::artist_initial;
///
/// assert_eq!(artist_initial("daft punk"), "D");
/// assert_eq!(artist_initial(""), "_");
/// ```
pub fn artist_initial(name: &str) -> String {
    name.trim()
        .graphemes(true)
        .next()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "_".to_string())
}

/// Makes a catalog name usable as a single path component. Separators become
/// `_`, and names that would point elsewhere (empty, `.`, `..`) become `_`.
pub fn sanitize_path_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if is_separator(c) || c == '\0' { '_' } else { c })
        .collect();

    match sanitized.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized,
    }
}

/// Substitutes the `{w}` and `{h}` placeholders of an artwork URL template.
pub fn fill_artwork_template(template: &str, width: u32, height: u32) -> String {
    template
        .replace("{w}", &width.to_string())
        .replace("{h}", &height.to_string())
}
