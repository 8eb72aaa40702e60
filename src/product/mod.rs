//! Product extraction and persistence
//!
//! A fetched page is a product page when its [`Document`] says so. The
//! candidate extracted from it carries everything needed to record the
//! product: a stable id derived from its URL, its title and its image URLs.

mod visitor;

pub use visitor::{ProductVisitor, VisitStats};

use crate::crawler::Document;
use crate::mirror::content_hash;
use crate::url::resolve_reference;
use std::collections::HashSet;
use url::Url;

/// Derives a product id from the page URL
///
/// The id is the content hash of the URL string, so the same page always maps
/// to the same product across runs.
pub fn product_id(url: &Url) -> String {
    content_hash(url.as_str().as_bytes())
}

/// A product found on a page, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCandidate {
    pub id: String,
    pub url: Url,
    pub title: String,
    /// Absolute http(s) image URLs, in document order, without duplicates
    pub images: Vec<Url>,
}

impl ProductCandidate {
    /// Extracts a candidate from a page, or None if it is not a product page
    pub fn from_document(url: &Url, document: &Document<'_>) -> Option<Self> {
        if !document.product_page() {
            return None;
        }

        let mut seen = HashSet::new();
        let mut images = Vec::new();

        for raw in document.images() {
            let image = match resolve_reference(&raw, document.origin()) {
                Ok(image) => image,
                Err(e) => {
                    tracing::debug!("Ignoring image {:?} on {}: {}", raw, url, e);
                    continue;
                }
            };

            if !matches!(image.scheme(), "http" | "https") {
                tracing::debug!("Ignoring non-HTTP image {} on {}", image, url);
                continue;
            }

            if seen.insert(image.to_string()) {
                images.push(image);
            }
        }

        Some(Self {
            id: product_id(url),
            url: url.clone(),
            title: document.title(),
            images,
        })
    }
}
