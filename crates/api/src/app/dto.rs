use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_admin::{Choice, ModelAdmin, Row};
use storefront_catalog::{
    Attribute, AttributeValue, Category, CategoryTree, Product, ProductImage, ProductVariant,
};

use crate::app::lookups::Lookups;

// -------------------------
// Request DTOs
// -------------------------

/// Query of the slug suggestion endpoint: the target field plus source values.
#[derive(Debug, Deserialize)]
pub struct PrepopulateQuery {
    #[serde(default = "default_slug_field")]
    pub field: String,
    #[serde(flatten)]
    pub sources: BTreeMap<String, String>,
}

fn default_slug_field() -> String {
    "slug".to_string()
}

// -------------------------
// Response DTOs
// -------------------------

/// One admin list screen.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub model: &'static str,
    pub verbose_name_plural: &'static str,
    pub columns: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub ordering: &'static [&'static str],
    pub count: usize,
    pub rows: Vec<Row>,
    pub filters: BTreeMap<&'static str, Vec<Choice>>,
}

impl ListResponse {
    pub fn new(admin: &ModelAdmin, rows: Vec<Row>, filters: BTreeMap<&'static str, Vec<Choice>>) -> Self {
        Self {
            model: admin.model,
            verbose_name_plural: admin.verbose_name_plural,
            columns: admin.list_display,
            search_fields: admin.search_fields,
            ordering: admin.ordering,
            count: rows.len(),
            rows,
            filters,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub path: String,
    pub children: Vec<Category>,
}

impl CategoryDetail {
    pub fn new(category: Category, all: &[Category]) -> Self {
        let tree = CategoryTree::new(all);
        let path = tree
            .display_path(category.id)
            .unwrap_or_else(|_| category.name.clone());
        let children = tree.children(category.id).into_iter().cloned().collect();
        Self {
            category,
            path,
            children,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttributeValueView {
    #[serde(flatten)]
    pub value: AttributeValue,
    /// `"<attribute>: <value>"`
    pub display: String,
}

impl AttributeValueView {
    pub fn new(value: AttributeValue, attribute: &Attribute) -> Self {
        let display = value.display_with(attribute);
        Self { value, display }
    }
}

#[derive(Debug, Serialize)]
pub struct AttributeDetail {
    #[serde(flatten)]
    pub attribute: Attribute,
    pub values: Vec<AttributeValueView>,
}

impl AttributeDetail {
    pub fn new(attribute: Attribute, values: Vec<AttributeValue>) -> Self {
        let values = values
            .into_iter()
            .map(|v| AttributeValueView::new(v, &attribute))
            .collect();
        Self { attribute, values }
    }
}

#[derive(Debug, Serialize)]
pub struct VariantView {
    #[serde(flatten)]
    pub variant: ProductVariant,
    pub effective_price: Decimal,
    pub label: String,
}

impl VariantView {
    pub fn new(
        variant: ProductVariant,
        product: &Product,
        attributes: &[Attribute],
        values: &[AttributeValue],
    ) -> Self {
        let label = variant.label(|id| {
            let value = values.iter().find(|v| v.id == id)?;
            let attribute = attributes.iter().find(|a| a.id == value.attribute_id)?;
            Some(value.display_with(attribute))
        });
        Self {
            effective_price: variant.effective_price(product),
            label,
            variant,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub sell_price: Decimal,
    pub category_path: Option<String>,
    pub vendor_name: Option<String>,
    pub variants: Vec<VariantView>,
    pub images: Vec<ProductImage>,
}

impl ProductDetail {
    pub fn new(
        product: Product,
        variants: Vec<ProductVariant>,
        images: Vec<ProductImage>,
        attributes: &[Attribute],
        values: &[AttributeValue],
        lookups: &Lookups,
    ) -> Self {
        use storefront_admin::Resolve;

        let variants = variants
            .into_iter()
            .map(|v| VariantView::new(v, &product, attributes, values))
            .collect();
        Self {
            sell_price: product.sell_price(),
            category_path: lookups.category_path(product.category_id).map(str::to_string),
            vendor_name: lookups.display("vendor", product.vendor_id.get()),
            variants,
            images,
            product,
        }
    }
}
