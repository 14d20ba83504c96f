use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_corpus::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.ORG/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether `host` belongs to the crawl scope of `domain`
///
/// A host is in scope when it equals the domain or is a subdomain of it.
/// A leading `www.` on the configured domain is treated as a label of the
/// site rather than a separate subdomain, so `www.example.org` also admits
/// `example.org` and its other subdomains.
///
/// # Examples
///
/// ```
/// use site_corpus::url::host_in_scope;
///
/// assert!(host_in_scope("example.org", "example.org"));
/// assert!(host_in_scope("news.example.org", "example.org"));
/// assert!(host_in_scope("example.org", "www.example.org"));
/// assert!(!host_in_scope("badexample.org", "example.org"));
/// assert!(!host_in_scope("example.org.evil.com", "example.org"));
/// ```
pub fn host_in_scope(host: &str, domain: &str) -> bool {
    let host = host.to_lowercase();
    let domain = domain.to_lowercase();
    let base = domain.strip_prefix("www.").unwrap_or(&domain);

    matches_base(&host, &domain) || matches_base(&host, base)
}

fn matches_base(host: &str, base: &str) -> bool {
    !base.is_empty() && (host == base || host.ends_with(&format!(".{}", base)))
}
