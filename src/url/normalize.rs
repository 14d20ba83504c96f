use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL into its corpus identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than http and https
/// 3. Reject URLs without a host
/// 4. Lowercase the host (done by the parser for special schemes)
/// 5. Remove the fragment
/// 6. Remove an empty query string (trailing `?`)
///
/// Path and query are otherwise kept verbatim: two URLs that differ only in
/// query parameters are distinct pages.
///
/// # Examples
///
/// ```
/// use site_corpus::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.org/a.html?x=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.org/a.html?x=1");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already-parsed URL
pub fn normalize_parsed(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
