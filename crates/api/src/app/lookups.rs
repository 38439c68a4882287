//! Display strings for foreign keys shown on admin screens.

use std::collections::HashMap;

use storefront_admin::Resolve;
use storefront_catalog::CategoryTree;
use storefront_core::CategoryId;
use storefront_infra::{CatalogStore, StoreResult};

/// Snapshot of the related records a list or detail page refers to.
#[derive(Debug, Default)]
pub struct Lookups {
    category_paths: HashMap<i64, String>,
    vendors: HashMap<i64, String>,
    brands: HashMap<i64, String>,
    attributes: HashMap<i64, String>,
}

impl Lookups {
    pub async fn load(store: &dyn CatalogStore) -> StoreResult<Self> {
        let categories = store.list_categories().await?;
        let vendors = store.list_vendors().await?;
        let brands = store.list_brands().await?;
        let attributes = store.list_attributes().await?;

        let tree = CategoryTree::new(&categories);
        let category_paths = categories
            .iter()
            .filter_map(|c| match tree.display_path(c.id) {
                Ok(path) => Some((c.id.get(), path)),
                Err(e) => {
                    tracing::warn!(category_id = %c.id, error = %e, "category path unavailable");
                    None
                }
            })
            .collect();

        Ok(Self {
            category_paths,
            vendors: vendors.into_iter().map(|v| (v.id.get(), v.name)).collect(),
            brands: brands.into_iter().map(|b| (b.id.get(), b.name)).collect(),
            attributes: attributes.into_iter().map(|a| (a.id.get(), a.name)).collect(),
        })
    }

    pub fn category_path(&self, id: CategoryId) -> Option<&str> {
        self.category_paths.get(&id.get()).map(String::as_str)
    }
}

impl Resolve for Lookups {
    fn display(&self, field: &str, id: i64) -> Option<String> {
        let names = match field {
            "parent" | "category" => &self.category_paths,
            "vendor" => &self.vendors,
            "brand" => &self.brands,
            "attribute" => &self.attributes,
            _ => return None,
        };
        names.get(&id).cloned()
    }
}
