use crate::url::Origin;
use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

/// Resolves a possibly-relative reference against the crawl origin
///
/// # Resolution Rules
///
/// 1. A reference with its own scheme is kept as parsed
/// 2. A reference without a scheme inherits the origin's scheme
/// 3. A reference without a host inherits the origin's host (and port)
/// 4. Path and query are otherwise left as written
///
/// Nothing else is canonicalized: the fragment is kept, the host is not
/// rewritten, query parameters are not reordered.
///
/// # Arguments
///
/// * `reference` - The raw attribute value (`href`, `src`)
/// * `origin` - The crawl origin
///
/// # Returns
///
/// * `Ok(Url)` - The absolute URL
/// * `Err(UrlError)` - The reference could not be parsed; callers skip it
///
/// # Examples
///
/// ```
/// use rumble_crawl::url::{resolve_reference, Origin};
///
/// let origin = Origin::parse("http://shop.example").unwrap();
/// let url = resolve_reference("/p/42", &origin).unwrap();
/// assert_eq!(url.as_str(), "http://shop.example/p/42");
///
/// let url = resolve_reference("//cdn.example/i.png", &origin).unwrap();
/// assert_eq!(url.as_str(), "http://cdn.example/i.png");
/// ```
pub fn resolve_reference(reference: &str, origin: &Origin) -> UrlResult<Url> {
    match Url::parse(reference) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => origin
            .as_url()
            .join(reference)
            .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e))),
        Err(e) => Err(UrlError::Parse(format!("{}: {}", reference, e))),
    }
}

/// Resolves an `<img src>` value and strips its volatile parts
///
/// The reference is resolved against the origin, then its query string and
/// fragment are cleared so cache-busting parameters never produce distinct
/// image URLs.
///
/// # Examples
///
/// ```
/// use rumble_crawl::url::{resolve_image_src, Origin};
///
/// let origin = Origin::parse("http://shop.example").unwrap();
/// let url = resolve_image_src("/i/1.png?x=1#f", &origin).unwrap();
/// assert_eq!(url.as_str(), "http://shop.example/i/1.png");
/// ```
pub fn resolve_image_src(src: &str, origin: &Origin) -> UrlResult<Url> {
    let mut url = resolve_reference(src, origin)?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Returns the extension of the last path segment, including the dot
///
/// The extension is returned exactly as written; `.JPG` and `.jpg` differ.
///
/// # Examples
///
/// ```
/// use rumble_crawl::url::file_extension;
/// use url::Url;
///
/// let url = Url::parse("http://shop.example/i/photo.large.JPG?w=100").unwrap();
/// assert_eq!(file_extension(&url), Some(".JPG"));
///
/// let url = Url::parse("http://shop.example/products/").unwrap();
/// assert_eq!(file_extension(&url), None);
/// ```
pub fn file_extension(url: &Url) -> Option<&str> {
    let path = url.path();
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').map(|i| &name[i..])
}

/// Returns true if a resolved link belongs to the crawl frontier
///
/// A link qualifies when its scheme is http or https and its host (and port)
/// equal the origin's exactly.
pub fn is_crawlable(url: &Url, origin: &Origin) -> bool {
    (url.scheme() == "http" || url.scheme() == "https") && origin.same_host(url)
}
