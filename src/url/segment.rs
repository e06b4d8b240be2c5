/// Turns remote data (an id, a relation name, a file name) into exactly one
/// safe path component
///
/// Separators and control characters become `_`, leading/trailing dots and
/// whitespace are stripped, and an empty result falls back to `fallback`.
/// The result can never be `.`, `..`, or contain a path separator.
pub fn sanitize_segment(raw: &str, fallback: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_matches('.').trim();

    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
