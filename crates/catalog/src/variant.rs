//! Product variants: purchasable combinations of attribute values.
//!
//! A variant tags any subset of attribute values. Nothing requires one value
//! per attribute, and two variants of a product may carry the same combination.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{AttributeValueId, DomainResult, Entity, ProductId, VariantId};

use crate::form::{self, Cleaned};
use crate::image::{ImageRef, UploadTo};
use crate::pricing;
use crate::product::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    /// Sorted, de-duplicated.
    pub attribute_value_ids: Vec<AttributeValueId>,
    pub stock: i32,
    /// Added to the product's sell price; may be negative.
    pub price_delta: Decimal,
    pub image: Option<ImageRef>,
}

impl ProductVariant {
    pub fn new(id: VariantId, product_id: ProductId, form: Cleaned<VariantForm>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            product_id,
            attribute_value_ids: form.attribute_value_ids,
            stock: form.stock,
            price_delta: form.price_delta,
            image: form.image,
        }
    }

    pub fn apply(&mut self, form: Cleaned<VariantForm>) {
        *self = Self::new(self.id, self.product_id, form);
    }

    /// Product sell price plus this variant's delta.
    pub fn effective_price(&self, product: &Product) -> Decimal {
        pricing::variant_price(product.sell_price(), self.price_delta)
    }

    /// Attribute value labels joined with `", "`, e.g. `"Color: Red, Size: XL"`.
    ///
    /// Values `display` can't resolve are skipped.
    pub fn label(&self, display: impl Fn(AttributeValueId) -> Option<String>) -> String {
        self.attribute_value_ids
            .iter()
            .filter_map(|id| display(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Entity for ProductVariant {
    type Id = VariantId;
    const MODEL: &'static str = "product_variant";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantForm {
    #[serde(default)]
    pub attribute_value_ids: Vec<AttributeValueId>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub price_delta: Decimal,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

impl VariantForm {
    pub fn new(attribute_value_ids: impl IntoIterator<Item = AttributeValueId>) -> Self {
        Self {
            attribute_value_ids: attribute_value_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_price_delta(mut self, delta: Decimal) -> Self {
        self.price_delta = delta;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(ImageRef::new(image));
        self
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        let mut ids = self.attribute_value_ids;
        ids.sort();
        ids.dedup();
        Ok(Cleaned::new(Self {
            attribute_value_ids: ids,
            stock: form::non_negative("stock", self.stock)?,
            price_delta: form::money("price_delta", self.price_delta)?,
            image: self
                .image
                .map(|image| image.clean(UploadTo::VariantImage))
                .transpose()?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_core::{CategoryId, VendorId};

    use crate::product::ProductForm;

    fn product(price: &str, rate: i32) -> Product {
        let form = ProductForm::new(CategoryId::new(1), VendorId::new(1), "Tee", price.parse().unwrap())
            .with_discount(rate)
            .clean()
            .unwrap();
        Product::new(ProductId::new(1), form, Utc::now())
    }

    #[test]
    fn effective_price_builds_on_sell_price() {
        let p = product("100.00", 20);
        let form = VariantForm::new([AttributeValueId::new(1)])
            .with_price_delta("5.25".parse().unwrap())
            .clean()
            .unwrap();
        let v = ProductVariant::new(VariantId::new(1), p.id, form);
        assert_eq!(v.effective_price(&p), "85.25".parse::<Decimal>().unwrap());
    }

    #[test]
    fn label_joins_resolved_values() {
        let form = VariantForm::new([AttributeValueId::new(2), AttributeValueId::new(1), AttributeValueId::new(9)])
            .clean()
            .unwrap();
        let v = ProductVariant::new(VariantId::new(1), ProductId::new(1), form);
        let label = v.label(|id| match id.get() {
            1 => Some("Color: Red".into()),
            2 => Some("Size: XL".into()),
            _ => None,
        });
        assert_eq!(label, "Color: Red, Size: XL");
    }

    #[test]
    fn clean_rejects_negative_stock_and_prefixes_image() {
        assert!(VariantForm::default().with_stock(-1).clean().is_err());
        let cleaned = VariantForm::default().with_image("red.png").clean().unwrap();
        assert_eq!(cleaned.image.as_ref().unwrap().as_str(), "products/variants/red.png");
        assert_eq!(cleaned.price_delta.to_string(), "0.00");
    }
}
