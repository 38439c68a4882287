//! Admin site: the registry of model admins.

use serde::Serialize;

use crate::error::AdminError;
use crate::options::{InlineAdmin, ModelAdmin, Prepopulated};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminSite {
    models: Vec<ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, admin: ModelAdmin) -> Result<(), AdminError> {
        if self.models.iter().any(|m| m.model == admin.model || m.route == admin.route) {
            return Err(AdminError::AlreadyRegistered(admin.model));
        }
        self.models.push(admin);
        Ok(())
    }

    /// Look up by model key (`"product"`) or route (`"products"`).
    pub fn get(&self, key: &str) -> Result<&ModelAdmin, AdminError> {
        self.models
            .iter()
            .find(|m| m.model == key || m.route == key)
            .ok_or_else(|| AdminError::NotRegistered(key.to_string()))
    }

    pub fn models(&self) -> &[ModelAdmin] {
        &self.models
    }
}

pub const CATEGORY: ModelAdmin = ModelAdmin {
    model: "category",
    route: "categories",
    verbose_name_plural: "Categories",
    list_display: &["name", "slug", "parent", "icon_class"],
    search_fields: &["name"],
    list_filter: &["parent"],
    prepopulated_fields: &[Prepopulated { field: "slug", from: &["name"] }],
    inlines: &[],
    ordering: &["id"],
};

pub const ATTRIBUTE_VALUE_INLINE: InlineAdmin = InlineAdmin {
    model: "attribute_value",
    fk_field: "attribute",
    fields: &["value"],
    extra: 1,
    filter_horizontal: &[],
};

pub const ATTRIBUTE: ModelAdmin = ModelAdmin {
    model: "attribute",
    route: "attributes",
    verbose_name_plural: "Attributes",
    list_display: &["name"],
    search_fields: &[],
    list_filter: &[],
    prepopulated_fields: &[],
    inlines: &[ATTRIBUTE_VALUE_INLINE],
    ordering: &["id"],
};

pub const VARIANT_INLINE: InlineAdmin = InlineAdmin {
    model: "product_variant",
    fk_field: "product",
    fields: &["attribute_values", "stock", "price_delta", "image"],
    extra: 1,
    filter_horizontal: &["attribute_values"],
};

pub const IMAGE_INLINE: InlineAdmin = InlineAdmin {
    model: "product_image",
    fk_field: "product",
    fields: &["image", "variant"],
    extra: 3,
    filter_horizontal: &[],
};

pub const PRODUCT: ModelAdmin = ModelAdmin {
    model: "product",
    route: "products",
    verbose_name_plural: "Products",
    list_display: &["name", "category", "price", "discount_rate", "is_active", "vendor"],
    search_fields: &["name"],
    list_filter: &["category", "vendor", "is_active"],
    prepopulated_fields: &[Prepopulated { field: "slug", from: &["name"] }],
    inlines: &[VARIANT_INLINE, IMAGE_INLINE],
    ordering: &["-created_at"],
};

pub const VENDOR: ModelAdmin = ModelAdmin {
    model: "vendor",
    route: "vendors",
    verbose_name_plural: "Vendors",
    list_display: &["user", "name", "is_active", "created_at"],
    search_fields: &["name"],
    list_filter: &["is_active"],
    prepopulated_fields: &[],
    inlines: &[],
    ordering: &["id"],
};

pub const BRAND: ModelAdmin = ModelAdmin {
    model: "brand",
    route: "brands",
    verbose_name_plural: "Brands",
    list_display: &["name", "slug", "is_active"],
    search_fields: &["name"],
    list_filter: &["is_active"],
    prepopulated_fields: &[Prepopulated { field: "slug", from: &["name"] }],
    inlines: &[],
    ordering: &["id"],
};

/// The catalog's admin site with every model registered.
pub fn catalog_site() -> AdminSite {
    let mut site = AdminSite::new();
    for admin in [CATEGORY, ATTRIBUTE, PRODUCT, VENDOR, BRAND] {
        // The registrations above use distinct keys.
        let _ = site.register(admin);
    }
    site
}
