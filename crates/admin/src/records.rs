//! `AdminRecord` wiring for the catalog records.

use storefront_catalog::{
    Attribute, AttributeValue, Brand, Category, Product, ProductImage, ProductVariant, Vendor,
};

use crate::field::{AdminRecord, FieldValue};

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

fn opt_text(s: Option<&str>) -> FieldValue {
    s.map(text).unwrap_or(FieldValue::Null)
}

fn opt_ref(id: Option<i64>) -> FieldValue {
    id.map(FieldValue::Ref).unwrap_or(FieldValue::Null)
}

impl AdminRecord for Category {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "name" => text(&self.name),
            "slug" => text(&self.slug),
            "parent" => opt_ref(self.parent_id.map(|p| p.get())),
            "icon_class" => opt_text(self.icon_class.as_deref()),
            _ => return None,
        })
    }
}

impl AdminRecord for Vendor {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "user" => FieldValue::Ref(self.user_id.get()),
            "name" => text(&self.name),
            "is_active" => FieldValue::Bool(self.is_active),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

impl AdminRecord for Brand {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "name" => text(&self.name),
            "slug" => text(&self.slug),
            "is_active" => FieldValue::Bool(self.is_active),
            "logo" => opt_text(self.logo.as_ref().map(|l| l.as_str())),
            _ => return None,
        })
    }
}

impl AdminRecord for Attribute {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "name" => text(&self.name),
            _ => return None,
        })
    }
}

impl AdminRecord for AttributeValue {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "attribute" => FieldValue::Ref(self.attribute_id.get()),
            "value" => text(&self.value),
            _ => return None,
        })
    }
}

impl AdminRecord for Product {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "name" => text(&self.name),
            "slug" => text(&self.slug),
            "category" => FieldValue::Ref(self.category_id.get()),
            "vendor" => FieldValue::Ref(self.vendor_id.get()),
            "brand" => opt_ref(self.brand_id.map(|b| b.get())),
            "description" => opt_text(self.description.as_deref()),
            "image" => opt_text(self.image.as_ref().map(|i| i.as_str())),
            "price" => FieldValue::Decimal(self.price),
            "discount_rate" => FieldValue::Int(self.discount_rate.into()),
            "sell_price" => FieldValue::Decimal(self.sell_price()),
            "stock" => FieldValue::Int(self.stock.into()),
            "is_active" => FieldValue::Bool(self.is_active),
            "created_at" => FieldValue::Timestamp(self.created_at),
            "updated_at" => FieldValue::Timestamp(self.updated_at),
            _ => return None,
        })
    }
}

impl AdminRecord for ProductVariant {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "product" => FieldValue::Ref(self.product_id.get()),
            "stock" => FieldValue::Int(self.stock.into()),
            "price_delta" => FieldValue::Decimal(self.price_delta),
            "image" => opt_text(self.image.as_ref().map(|i| i.as_str())),
            _ => return None,
        })
    }
}

impl AdminRecord for ProductImage {
    fn pk(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Int(self.id.get()),
            "product" => FieldValue::Ref(self.product_id.get()),
            "variant" => opt_ref(self.variant_id.map(|v| v.get())),
            "image" => text(self.image.as_str()),
            _ => return None,
        })
    }
}
