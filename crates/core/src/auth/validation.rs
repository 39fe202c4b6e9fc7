/// Validates a `return_to` URL to prevent open redirects.
///
/// Returns `Some(url)` if the URL is a valid relative path, `None` otherwise.
///
/// # Security
///
/// This function prevents open redirect attacks by ensuring URLs:
/// - Start with a single `/` (relative path)
/// - Do not start with `//` (protocol-relative URLs like `//evil.com`)
/// - Do not contain control characters (potential injection)
/// - Do not contain `://` (absolute URLs with schemes like `https://`, `javascript:`)
///
/// # Examples
///
/// ```
/// use doorman_core::auth::validate_return_to;
///
/// // Valid relative paths
/// assert_eq!(validate_return_to("/protected"), Some("/protected"));
/// assert_eq!(validate_return_to("/"), Some("/"));
///
/// // Invalid: protocol-relative URL
/// assert_eq!(validate_return_to("//evil.com"), None);
///
/// // Invalid: absolute URL
/// assert_eq!(validate_return_to("https://evil.com"), None);
/// ```
pub fn validate_return_to(url: &str) -> Option<&str> {
    // Must start with /
    if !url.starts_with('/') {
        return None;
    }

    // Reject protocol-relative URLs (//evil.com)
    if url.starts_with("//") {
        return None;
    }

    // Reject control characters (potential injection attacks)
    if url.chars().any(|c| c.is_control()) {
        return None;
    }

    // Reject URLs with schemes (https://, javascript:, etc.)
    if url.contains("://") {
        return None;
    }

    Some(url)
}
