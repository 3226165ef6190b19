//! Resolution of hotfix resource paths against the hosting base URL.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("resource path must be relative: {0}")]
    NotRelative(String),

    #[error("resource path escapes the base URL: {0}")]
    EscapesBase(String),
}

/// Canonicalize the base URL hotfix resources are served from.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove query and fragment
/// 5. Ensure the path ends with `/` so relative joins stay below it
pub fn canonicalize_base(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }

    Ok(parsed)
}

/// Resolve a relative resource path such as `style/1.2.3.css` against `base`.
///
/// Absolute URLs, rooted paths and paths that climb out of the base are rejected.
pub fn resolve_resource_url(base: &url::Url, path: &str) -> Result<url::Url, UrlError> {
    let path = path.trim();

    if path.is_empty() {
        return Err(UrlError::Empty);
    }

    if path.contains("://") || path.starts_with('/') {
        return Err(UrlError::NotRelative(path.to_string()));
    }

    let resolved = base.join(path).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if !resolved.as_str().starts_with(base.as_str()) {
        return Err(UrlError::EscapesBase(path.to_string()));
    }

    Ok(resolved)
}
