// Name tokenizing for manual entry and file import.
//
// Both entry points are plain delimiter splitters: no quoting, no escaping.

/// Split manually entered text on newlines and commas.
///
/// Tokens are trimmed and empty tokens are dropped. Order is preserved.
pub fn split_bulk(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split imported file content on newlines, commas and carriage returns.
///
/// Besides dropping empty tokens, any token equal to `name` (ignoring case)
/// is treated as a header cell and skipped.
pub fn split_import(content: &str) -> Vec<String> {
    content
        .split(['\n', ',', '\r'])
        .map(str::trim)
        .filter(|name| !name.is_empty() && !is_header_token(name))
        .map(str::to_string)
        .collect()
}

fn is_header_token(token: &str) -> bool {
    token.to_lowercase() == "name"
}
