//! Content-addressed image mirroring
//!
//! Product images are copied into storage we control. Each object is named by
//! the hash of its bytes, so the same image found on several pages (or on a
//! later run) is stored once.

mod local;

pub use local::LocalMirror;

use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Number of digest bytes kept in a content hash
const HASH_BYTES: usize = 7;

/// Errors raised while mirroring an image
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid public base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Empty image body from {0}")]
    EmptyBody(String),
}

/// An image that has been copied into the mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredImage {
    /// Content hash, also the object name
    pub id: String,

    /// Where the image was downloaded from
    pub source_url: String,

    /// Public URL of the mirrored copy
    pub reference: String,

    /// Sniffed content type
    pub content_type: &'static str,

    /// Size in bytes
    pub size: usize,
}

/// Destination for downloaded product images
#[allow(async_fn_in_trait)]
pub trait ImageMirror {
    /// Stores `bytes` downloaded from `source`
    ///
    /// Storing bytes that are already mirrored is not an error and returns the
    /// existing object's identity.
    async fn store(&self, source: &Url, bytes: &[u8]) -> Result<MirroredImage, MirrorError>;

    /// Public reference for an object id
    fn reference(&self, id: &str) -> String;
}

/// Hex of the first seven bytes of the SHA-256 digest of `data`
///
/// Used both for image object names and for product ids.
pub fn content_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..HASH_BYTES])
}

/// Sniffs an image content type from its leading bytes
pub fn detect_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}
