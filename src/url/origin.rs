use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a seed URL supplied by a caller
///
/// Only absolute `http`/`https` URLs with a host are accepted. Surrounding
/// whitespace is ignored.
///
/// # Examples
///
/// ```
/// use linkscout::url::parse_seed_url;
///
/// assert!(parse_seed_url("https://example.com/about").is_ok());
/// assert!(parse_seed_url("ftp://example.com/").is_err());
/// assert!(parse_seed_url("example.com").is_err());
/// ```
pub fn parse_seed_url(input: &str) -> UrlResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("URL is empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// Returns true if both URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Returns the root (`/`) URL of the given URL's origin
pub fn homepage_of(url: &Url) -> Url {
    let mut home = url.clone();
    home.set_path("/");
    home.set_query(None);
    home.set_fragment(None);
    home
}
