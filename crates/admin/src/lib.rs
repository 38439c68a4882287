//! Admin registration layer.
//!
//! Declarative, per-model metadata (list columns, search fields, filters,
//! prepopulated slugs, inlines) plus the small amount of logic needed to apply
//! it to records: substring search, exact-match filters, filter choices and row
//! rendering. No storage or HTTP here; the API layer feeds records in.

pub mod error;
pub mod field;
pub mod options;
pub mod query;
pub mod records;
pub mod site;

pub use error::AdminError;
pub use field::{AdminRecord, FieldValue, Resolve};
pub use options::{Cell, Choice, InlineAdmin, ModelAdmin, Prepopulated, Row};
pub use query::ListQuery;
pub use site::{AdminSite, catalog_site};

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use storefront_catalog::{Category, CategoryForm, Product, ProductForm, Vendor, VendorForm};
    use storefront_core::{CategoryId, ProductId, UserId, VendorId};

    use super::*;

    fn no_resolve(_field: &str, _id: i64) -> Option<String> {
        None
    }

    fn categories() -> Vec<Category> {
        vec![
            Category::new(CategoryId::new(1), CategoryForm::new("Electronics").clean().unwrap()),
            Category::new(
                CategoryId::new(2),
                CategoryForm::new("Computers").with_parent(CategoryId::new(1)).clean().unwrap(),
            ),
            Category::new(
                CategoryId::new(3),
                CategoryForm::new("Phones").with_parent(CategoryId::new(1)).clean().unwrap(),
            ),
        ]
    }

    fn products() -> Vec<Product> {
        let now = Utc::now();
        let mk = |id: i64, cat: i64, name: &str, active: bool| {
            let mut form = ProductForm::new(CategoryId::new(cat), VendorId::new(1), name, "10".parse().unwrap());
            form.is_active = active;
            Product::new(ProductId::new(id), form.clean().unwrap(), now)
        };
        vec![
            mk(1, 2, "Gaming Laptop", true),
            mk(2, 2, "Office Laptop", false),
            mk(3, 3, "Smart Phone", true),
        ]
    }

    #[test]
    fn catalog_site_registers_every_model_once() {
        let site = catalog_site();
        let keys: Vec<&str> = site.models().iter().map(|m| m.model).collect();
        assert_eq!(keys, vec!["category", "attribute", "product", "vendor", "brand"]);
        assert_eq!(site.get("products").unwrap().model, "product");
        assert!(matches!(site.get("orders"), Err(AdminError::NotRegistered(_))));

        let mut site = site;
        assert_eq!(site.register(site::BRAND), Err(AdminError::AlreadyRegistered("brand")));
    }

    #[test]
    fn product_inlines_match_registration() {
        let product = site::PRODUCT;
        let variants = product.inline("product_variant").unwrap();
        assert_eq!(variants.extra, 1);
        assert_eq!(variants.filter_horizontal, &["attribute_values"]);
        assert_eq!(product.inline("product_image").unwrap().extra, 3);
        assert_eq!(site::ATTRIBUTE.inline("attribute_value").unwrap().extra, 1);
    }

    #[test]
    fn search_is_case_insensitive_and_requires_every_term() {
        let rows = site::PRODUCT
            .list(&products(), &ListQuery::default().search("LAPTOP"), &no_resolve)
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

        let rows = site::PRODUCT
            .list(&products(), &ListQuery::default().search("gaming laptop"), &no_resolve)
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn filters_match_exact_values() {
        let query = ListQuery::default().filter("category", "2").filter("is_active", "true");
        let rows = site::PRODUCT.list(&products(), &query, &no_resolve).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);

        let roots = site::CATEGORY
            .list(&categories(), &ListQuery::default().filter("parent", "none"), &no_resolve)
            .unwrap();
        assert_eq!(roots.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn unknown_filters_are_rejected() {
        let err = site::PRODUCT
            .list(&products(), &ListQuery::default().filter("price", "10"), &no_resolve)
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownFilter { model: "product", .. }));
    }

    #[test]
    fn rows_resolve_foreign_keys() {
        let cats = categories();
        let tree = storefront_catalog::CategoryTree::new(&cats);
        let resolve = |field: &str, id: i64| match field {
            "category" | "parent" => tree.display_path(CategoryId::new(id)).ok(),
            _ => None,
        };
        let row = site::PRODUCT.render_row(&products()[0], &resolve);
        assert_eq!(row.cells["category"].display, "Electronics > Computers");
        assert_eq!(row.cells["vendor"].display, "1");
        assert_eq!(row.cells["price"].display, "10.00");
        assert_eq!(row.cells.len(), site::PRODUCT.list_display.len());
    }

    #[test]
    fn filter_choices_are_distinct() {
        let choices = site::PRODUCT.filter_choices(&products(), &no_resolve);
        let active: Vec<&str> = choices["is_active"].iter().map(|c| c.value.as_str()).collect();
        assert_eq!(active, vec!["false", "true"]);
        assert_eq!(choices["category"].len(), 2);
    }

    #[test]
    fn prepopulate_slugifies_sources() {
        let slug = site::BRAND.prepopulate("slug", |f| (f == "name").then(|| "Good Sound Co.".to_string()));
        assert_eq!(slug.as_deref(), Some("good-sound-co"));
        assert_eq!(site::VENDOR.prepopulate("slug", |_| None), None);
    }

    #[test]
    fn vendor_rows_show_user_and_flag() {
        let vendor = Vendor::new(
            VendorId::new(4),
            VendorForm::new(UserId::new(12), "Acme").clean().unwrap(),
            Utc::now(),
        );
        let row = site::VENDOR.render_row(&vendor, &no_resolve);
        assert_eq!(row.cells["user"].display, "12");
        assert_eq!(row.cells["is_active"].display, "false");
    }

    #[test]
    fn site_serializes_for_the_index_page() {
        let json = serde_json::to_value(catalog_site()).unwrap();
        let models = json["models"].as_array().unwrap();
        assert_eq!(models.len(), 5);
        assert_eq!(models[2]["ordering"], serde_json::json!(["-created_at"]));
        assert_eq!(models[2]["inlines"][1]["extra"], 3);
    }
}
