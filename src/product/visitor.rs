use crate::crawler::{Document, Fetcher, PageVisitor};
use crate::mirror::{ImageMirror, MirroredImage};
use crate::product::ProductCandidate;
use crate::storage::ProductStore;
use crate::RumbleError;
use std::sync::Arc;
use url::Url;

/// Counters kept by a [`ProductVisitor`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitStats {
    /// Product pages recorded
    pub products_added: u64,

    /// Pages that were not product pages
    pub pages_skipped: u64,

    /// Images downloaded and mirrored
    pub images_mirrored: u64,

    /// Images that could not be downloaded or mirrored
    pub images_failed: u64,

    /// Product pages that could not be recorded
    pub store_errors: u64,
}

/// Records product pages and mirrors their images
///
/// Non-product pages are logged and ignored. Failures while recording one
/// product never stop the crawl.
pub struct ProductVisitor<S, M> {
    store: S,
    mirror: M,
    fetcher: Arc<Fetcher>,
    stats: VisitStats,
}

impl<S: ProductStore, M: ImageMirror> ProductVisitor<S, M> {
    /// Creates a visitor; images are downloaded through `fetcher`
    pub fn new(store: S, mirror: M, fetcher: Arc<Fetcher>) -> Self {
        Self {
            store,
            mirror,
            fetcher,
            stats: VisitStats::default(),
        }
    }

    pub fn stats(&self) -> VisitStats {
        self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Persists a product and attaches whichever of its images could be mirrored
    async fn record(&mut self, candidate: &ProductCandidate) -> Result<usize, RumbleError> {
        self.store
            .upsert_product(&candidate.id, candidate.url.as_str(), &candidate.title)?;

        let mut mirrored = Vec::with_capacity(candidate.images.len());
        for image in &candidate.images {
            match self.mirror_image(image).await {
                Ok(copy) => {
                    self.stats.images_mirrored += 1;
                    mirrored.push(copy);
                }
                Err(e) => {
                    tracing::warn!("Failed to mirror image {}: {}", image, e);
                    self.stats.images_failed += 1;
                }
            }
        }

        Ok(self.store.insert_images(&candidate.id, &mirrored)?)
    }

    async fn mirror_image(&self, image: &Url) -> Result<MirroredImage, RumbleError> {
        let body = self.fetcher.fetch(image).await.into_body(image)?;
        Ok(self.mirror.store(image, &body).await?)
    }
}

impl<S: ProductStore, M: ImageMirror> PageVisitor for ProductVisitor<S, M> {
    async fn visit(&mut self, url: &Url, document: &Document<'_>) {
        let Some(candidate) = ProductCandidate::from_document(url, document) else {
            tracing::info!("skipping {}", url.path());
            self.stats.pages_skipped += 1;
            return;
        };

        match self.record(&candidate).await {
            Ok(attached) => {
                tracing::info!("added: {}", candidate.title);
                tracing::debug!(
                    "Product {} has {} new images ({} found)",
                    candidate.id,
                    attached,
                    candidate.images.len()
                );
                self.stats.products_added += 1;
            }
            Err(e) => {
                tracing::error!("Failed to record product at {}: {}", url, e);
                self.stats.store_errors += 1;
            }
        }
    }
}
