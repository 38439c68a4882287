use std::sync::Arc;

use storefront_admin::{AdminSite, catalog_site};
use storefront_core::ProductId;
use storefront_infra::{
    CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, SharedCatalogStore, StoreResult,
};

use crate::app::dto::ProductDetail;
use crate::app::lookups::Lookups;
use crate::config::AppConfig;

/// Everything a request handler needs: the store and the admin registry.
pub struct AppServices {
    pub store: SharedCatalogStore,
    pub site: AdminSite,
}

impl AppServices {
    pub fn new(store: SharedCatalogStore) -> Self {
        Self {
            store,
            site: catalog_site(),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCatalogStore::new()))
    }

    /// Postgres when `DATABASE_URL` is set (migrations applied), else in-memory.
    pub async fn from_config(config: &AppConfig) -> StoreResult<Self> {
        match &config.database_url {
            Some(url) => {
                let store = PostgresCatalogStore::connect(url, config.db_max_connections).await?;
                store.migrate().await?;
                tracing::info!(max_connections = config.db_max_connections, "using postgres catalog store");
                Ok(Self::new(Arc::new(store)))
            }
            None => Ok(Self::in_memory()),
        }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub async fn lookups(&self) -> StoreResult<Lookups> {
        Lookups::load(self.store()).await
    }

    /// Product with its inline children and derived prices.
    pub async fn product_detail(&self, id: ProductId) -> StoreResult<ProductDetail> {
        let store = self.store();
        let product = store.get_product(id).await?;
        let variants = store.list_variants(id).await?;
        let images = store.list_images(id).await?;
        let attributes = store.list_attributes().await?;
        let values = store.list_attribute_values(None).await?;
        let lookups = self.lookups().await?;
        Ok(ProductDetail::new(product, variants, images, &attributes, &values, &lookups))
    }
}
