//! Input sanitization and validation
//!
//! Everything here runs before a network call or query is issued: malformed
//! input is rejected (or normalized) client-side, and free text is escaped
//! against markup injection before persistence.

use crate::{Error, Result};

/// Maximum profile name length (after trimming)
pub const MAX_PROFILE_NAME_LEN: usize = 50;

/// Maximum search query length; longer queries are truncated, not rejected
pub const MAX_QUERY_LEN: usize = 100;

/// Page range accepted by the catalog API
pub const MAX_PAGE: u32 = 1000;

/// Escape markup-significant characters in free text
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Validate and sanitize a profile name: trimmed, 1-50 chars, markup escaped
pub fn sanitize_profile_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("profile name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_PROFILE_NAME_LEN {
        return Err(Error::Validation(format!(
            "profile name must be at most {} characters",
            MAX_PROFILE_NAME_LEN
        )));
    }
    Ok(escape_markup(trimmed))
}

/// Normalize a search query: trim, reject empty, cap at 100 characters
pub fn normalize_query(query: &str) -> Result<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("search query must not be empty".to_string()));
    }
    Ok(trimmed.chars().take(MAX_QUERY_LEN).collect())
}

/// Clamp a page number into the range the catalog API accepts
pub fn clamp_page(page: u32) -> u32 {
    page.clamp(1, MAX_PAGE)
}

/// Validate a catalog content id (positive integer)
pub fn validate_content_id(id: u32) -> Result<u32> {
    if id == 0 {
        return Err(Error::Validation("content id must be positive".to_string()));
    }
    Ok(id)
}

/// Replace digit runs in an endpoint path with `{id}` before logging
///
/// Keeps request logs free of catalog identifiers.
pub fn redact_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_digits = false;
    for c in path.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                out.push_str("{id}");
                in_digits = true;
            }
        } else {
            in_digits = false;
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_markup(r#"<b>Tom & "Jerry"</b>"#),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn profile_name_rejects_empty_and_oversized() {
        assert!(sanitize_profile_name("   ").is_err());
        assert!(sanitize_profile_name(&"x".repeat(51)).is_err());
        assert_eq!(sanitize_profile_name("  Kids  ").unwrap(), "Kids");
    }

    #[test]
    fn profile_name_escapes_injection_attempt() {
        let name = sanitize_profile_name("<script>hi</script>").unwrap();
        assert!(!name.contains('<'));
        assert!(name.contains("&lt;script&gt;"));
    }

    #[test]
    fn query_trims_rejects_empty_and_truncates() {
        assert!(normalize_query("").is_err());
        assert!(normalize_query("   ").is_err());
        assert_eq!(normalize_query("  dune  ").unwrap(), "dune");
        let long = "x".repeat(500);
        assert_eq!(normalize_query(&long).unwrap().len(), MAX_QUERY_LEN);
    }

    #[test]
    fn page_is_clamped_to_api_range() {
        assert_eq!(clamp_page(0), 1);
        assert_eq!(clamp_page(7), 7);
        assert_eq!(clamp_page(99_999), MAX_PAGE);
    }

    #[test]
    fn paths_are_redacted_before_logging() {
        assert_eq!(redact_path("/movie/550/credits"), "/movie/{id}/credits");
        assert_eq!(redact_path("/tv/1399/season/6/episode/9"), "/tv/{id}/season/{id}/episode/{id}");
        assert_eq!(redact_path("/trending/all/day"), "/trending/all/day");
    }
}
