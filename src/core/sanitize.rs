use crate::utils::error::{ImportError, Result};

/// Maps any string to `[a-z0-9_]*`: lower-cases ASCII letters and replaces
/// every other character with `_`.
///
/// Every table or column name interpolated into SQL text must go through
/// this function first.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}

/// Sanitizes a table name and rejects names with no letter or digit left.
pub fn sanitize_table_name(raw: &str) -> Result<String> {
    let sanitized = sanitize_identifier(raw);
    if sanitized.chars().all(|c| c == '_') {
        return Err(ImportError::InvalidTableName {
            raw: raw.to_string(),
            sanitized,
        });
    }
    Ok(sanitized)
}

/// Wraps an already-sanitized identifier in double quotes.
pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}
