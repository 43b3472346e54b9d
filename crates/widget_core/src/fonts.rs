//! Process-wide font preloading with an idempotent entry point, shared by
//! every widget the host embeds.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

#[async_trait]
pub trait FontLoader: Send + Sync {
    async fn load_all(&self) -> Result<()>;
}

/// Loader for hosts whose fonts are already available.
pub struct NoopFontLoader;

#[async_trait]
impl FontLoader for NoopFontLoader {
    async fn load_all(&self) -> Result<()> {
        Ok(())
    }
}

pub struct FontService {
    loader: Arc<dyn FontLoader>,
    loaded: OnceCell<()>,
}

impl FontService {
    pub fn new(loader: Arc<dyn FontLoader>) -> Arc<Self> {
        Arc::new(Self {
            loader,
            loaded: OnceCell::new(),
        })
    }

    /// Loads at most once for the service's lifetime; concurrent callers
    /// share the single underlying load. A failed load is not cached, so
    /// the next caller retries.
    pub async fn ensure_loaded(&self) -> Result<()> {
        self.loaded
            .get_or_try_init(|| async {
                self.loader.load_all().await?;
                info!("fonts loaded");
                Ok(())
            })
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "tests/fonts_tests.rs"]
mod tests;
