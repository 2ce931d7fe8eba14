//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::export::{JobOptions, JobRegistry};
use crate::shopify::{ShopifyClient, ShopifyError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    shopify: ShopifyClient,
    jobs: JobRegistry,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the Shopify client cannot be created.
    pub fn new(config: ServerConfig) -> Result<Self, ShopifyError> {
        let shopify = ShopifyClient::new(&config.shopify)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shopify,
                jobs: JobRegistry::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }

    #[must_use]
    pub fn jobs(&self) -> &JobRegistry {
        &self.inner.jobs
    }

    /// Job settings derived from the export configuration.
    #[must_use]
    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            sample_cap: self.inner.config.export.sample_cap,
            policy: self.inner.config.export.failure_policy,
        }
    }
}
