use crate::{UrlError, UrlResult};
use url::Url;

/// Tracking query parameters that never identify a distinct page
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Normalizes a page URL so that equivalent spellings compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove the fragment
/// 3. Collapse repeated slashes and remove the trailing slash (except for root)
/// 4. Remove tracking query parameters (`utm_*`, `fbclid`, ...)
/// 5. Sort remaining query parameters and drop an empty query string
///
/// The host is already lowercased by the URL parser. Scheme and `www.` are
/// left alone: they are part of the origin.
///
/// # Examples
///
/// ```
/// use linkscout::url::normalize_url;
///
/// let url = normalize_url("https://Example.com/about/?utm_source=x#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let path = normalize_path(url.path());
    url.set_path(&path);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    Ok(url)
}

/// Returns the key used to deduplicate page candidates
///
/// Falls back to the raw string when the URL cannot be normalized, so that
/// dedup never drops an entry just because it is unusual.
pub fn dedup_key(url: &Url) -> String {
    normalize_url(url.as_str())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.starts_with("utm_") && !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    params.sort();
    params
}
