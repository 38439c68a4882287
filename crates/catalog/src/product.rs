//! Products: the sellable catalog entry, priced with an optional discount.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{BrandId, CategoryId, DomainError, DomainResult, Entity, ProductId, VendorId};

use crate::form::{self, Cleaned};
use crate::image::{ImageRef, UploadTo};
use crate::pricing;

pub const NAME_MAX_LEN: usize = 100;
pub const SLUG_MAX_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub vendor_id: VendorId,
    /// Cleared when the brand is deleted.
    pub brand_id: Option<BrandId>,
    pub name: String,
    /// Not unique; derived from `name` when left blank.
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<ImageRef>,
    /// Undiscounted list price.
    pub price: Decimal,
    /// Whole percent taken off `price`.
    pub discount_rate: i32,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: ProductId, form: Cleaned<ProductForm>, now: DateTime<Utc>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            category_id: form.category_id,
            vendor_id: form.vendor_id,
            brand_id: form.brand_id,
            name: form.name,
            slug: form.slug,
            description: form.description,
            image: form.image,
            price: form.price,
            discount_rate: form.discount_rate,
            stock: form.stock,
            is_active: form.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite editable fields; `created_at` is kept, `updated_at` bumped.
    pub fn apply(&mut self, form: Cleaned<ProductForm>, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Self::new(self.id, form, now);
        self.created_at = created_at;
    }

    /// Price after discount.
    pub fn sell_price(&self) -> Decimal {
        pricing::sell_price(self.price, self.discount_rate)
    }

    pub fn is_discounted(&self) -> bool {
        self.discount_rate > 0
    }
}

impl Entity for Product {
    type Id = ProductId;
    const MODEL: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub category_id: CategoryId,
    pub vendor_id: VendorId,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    pub price: Decimal,
    #[serde(default)]
    pub discount_rate: i32,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl ProductForm {
    pub fn new(
        category_id: CategoryId,
        vendor_id: VendorId,
        name: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            category_id,
            vendor_id,
            brand_id: None,
            name: name.into(),
            slug: String::new(),
            description: None,
            image: None,
            price,
            discount_rate: 0,
            stock: 0,
            is_active: true,
        }
    }

    pub fn with_brand(mut self, brand_id: BrandId) -> Self {
        self.brand_id = Some(brand_id);
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_discount(mut self, rate: i32) -> Self {
        self.discount_rate = rate;
        self
    }

    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        let name = form::required("name", &self.name, NAME_MAX_LEN)?;
        let slug = form::slug_or_derived("slug", &self.slug, &name, SLUG_MAX_LEN)?;
        let description = match self.description {
            Some(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        };
        let image = self
            .image
            .map(|image| image.clean(UploadTo::ProductMain))
            .transpose()?;
        let price = form::money("price", self.price)?;
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }

        Ok(Cleaned::new(Self {
            category_id: self.category_id,
            vendor_id: self.vendor_id,
            brand_id: self.brand_id,
            name,
            slug,
            description,
            image,
            price,
            discount_rate: pricing::validate_discount_rate(self.discount_rate)?,
            stock: form::non_negative("stock", self.stock)?,
            is_active: self.is_active,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str) -> ProductForm {
        ProductForm::new(CategoryId::new(1), VendorId::new(1), "Gaming Laptop X", price.parse().unwrap())
    }

    #[test]
    fn clean_derives_slug_and_normalizes_price() {
        let cleaned = form("1499.9").clean().unwrap();
        assert_eq!(cleaned.slug, "gaming-laptop-x");
        assert_eq!(cleaned.price.to_string(), "1499.90");
    }

    #[test]
    fn supplied_slug_is_preserved() {
        let cleaned = form("10").with_slug("GLX-2024").clean().unwrap();
        assert_eq!(cleaned.slug, "GLX-2024");
    }

    #[test]
    fn discount_outside_range_is_rejected() {
        assert!(matches!(form("10").with_discount(120).clean(), Err(DomainError::Validation(_))));
        assert!(form("10").with_discount(100).clean().is_ok());
    }

    #[test]
    fn negative_price_and_stock_are_rejected() {
        assert!(form("-1").clean().is_err());
        assert!(form("1").with_stock(-2).clean().is_err());
    }

    #[test]
    fn sell_price_applies_discount() {
        let now = Utc::now();
        let p = Product::new(ProductId::new(1), form("100.00").with_discount(20).clean().unwrap(), now);
        assert_eq!(p.sell_price(), "80.00".parse::<Decimal>().unwrap());
        assert!(p.is_discounted());

        let p = Product::new(ProductId::new(2), form("100.00").clean().unwrap(), now);
        assert_eq!(p.sell_price(), p.price);
    }

    #[test]
    fn apply_keeps_created_at_and_bumps_updated_at() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        let mut p = Product::new(ProductId::new(1), form("5").clean().unwrap(), t0);
        p.apply(form("6").clean().unwrap(), t1);
        assert_eq!(p.created_at, t0);
        assert_eq!(p.updated_at, t1);
        assert_eq!(p.price.to_string(), "6.00");
    }
}
