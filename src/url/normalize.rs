use crate::UrlError;
use url::Url;

/// Parses a link href and upgrades it to https
///
/// The recruiting API advertises many of its own links as `http:` even though
/// only https is served, so every link is upgraded before it is followed or
/// downloaded. Nothing else about the URL is changed: path, query and
/// fragment are kept as advertised.
///
/// # Examples
///
/// ```
/// use talent_harvest::url::upgrade_to_https;
///
/// let url = upgrade_to_https("http://x.example.com/f/1").unwrap();
/// assert_eq!(url.as_str(), "https://x.example.com/f/1");
/// ```
pub fn upgrade_to_https(href: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(href.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "https" => {}
        "http" => {
            url.set_scheme("https")
                .map_err(|_| UrlError::InvalidScheme("http".to_string()))?;
        }
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
