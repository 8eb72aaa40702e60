use crate::config::MirrorConfig;
use crate::mirror::{content_hash, detect_content_type, ImageMirror, MirrorError, MirroredImage};
use std::path::{Path, PathBuf};
use url::Url;

/// Mirror backed by a local directory
///
/// Objects are written as `<directory>/<content hash>` and published under
/// `<public base url>/<content hash>`.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    directory: PathBuf,
    public_base_url: String,
}

impl LocalMirror {
    /// Creates a mirror writing into `directory`
    pub fn new(directory: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, MirrorError> {
        Url::parse(public_base_url)
            .map_err(|e| MirrorError::InvalidBaseUrl(format!("{}: {}", public_base_url, e)))?;

        Ok(Self {
            directory: directory.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a mirror from the `[mirror]` configuration section
    pub fn from_config(config: &MirrorConfig) -> Result<Self, MirrorError> {
        Self::new(&config.directory, &config.public_base_url)
    }

    /// Directory objects are written into
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the mirror directory if it does not exist yet
    pub async fn ensure_directory(&self) -> Result<(), MirrorError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    fn object_path(&self, id: &str) -> PathBuf {
        self.directory.join(id)
    }
}

impl ImageMirror for LocalMirror {
    async fn store(&self, source: &Url, bytes: &[u8]) -> Result<MirroredImage, MirrorError> {
        if bytes.is_empty() {
            return Err(MirrorError::EmptyBody(source.to_string()));
        }

        let id = content_hash(bytes);
        let path = self.object_path(&id);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!("Image {} already mirrored", id);
        } else {
            self.ensure_directory().await?;

            // Write then rename so a partial file never carries the final name
            let partial = self.directory.join(format!(".{}.partial", id));
            tokio::fs::write(&partial, bytes).await?;
            tokio::fs::rename(&partial, &path).await?;
            tracing::debug!("Mirrored {} as {} ({} bytes)", source, id, bytes.len());
        }

        Ok(MirroredImage {
            reference: self.reference(&id),
            id,
            source_url: source.to_string(),
            content_type: detect_content_type(bytes),
            size: bytes.len(),
        })
    }

    fn reference(&self, id: &str) -> String {
        format!("{}/{}", self.public_base_url, id)
    }
}
