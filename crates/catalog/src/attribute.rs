//! Attribute taxonomy: variation axes (Color, Size) and their values.

use serde::{Deserialize, Serialize};

use storefront_core::{AttributeId, AttributeValueId, CategoryId, DomainResult, Entity};

use crate::form::{self, Cleaned};

pub const NAME_MAX_LEN: usize = 50;
pub const VALUE_MAX_LEN: usize = 50;

/// A variation axis, applicable to any number of categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    /// Categories the attribute applies to, sorted and de-duplicated.
    pub category_ids: Vec<CategoryId>,
}

impl Attribute {
    pub fn new(id: AttributeId, form: Cleaned<AttributeForm>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            name: form.name,
            category_ids: form.category_ids,
        }
    }

    pub fn apply(&mut self, form: Cleaned<AttributeForm>) {
        *self = Self::new(self.id, form);
    }

    pub fn applies_to(&self, category_id: CategoryId) -> bool {
        self.category_ids.binary_search(&category_id).is_ok()
    }
}

impl Entity for Attribute {
    type Id = AttributeId;
    const MODEL: &'static str = "attribute";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Attribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeForm {
    pub name: String,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl AttributeForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category_ids: Vec::new(),
        }
    }

    pub fn with_categories(mut self, ids: impl IntoIterator<Item = CategoryId>) -> Self {
        self.category_ids.extend(ids);
        self
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        let mut category_ids = self.category_ids;
        category_ids.sort();
        category_ids.dedup();
        Ok(Cleaned::new(Self {
            name: form::required("name", &self.name, NAME_MAX_LEN)?,
            category_ids,
        }))
    }
}

/// One value on an attribute's axis, e.g. `Red` for `Color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: AttributeValueId,
    pub attribute_id: AttributeId,
    pub value: String,
}

impl AttributeValue {
    pub fn new(id: AttributeValueId, attribute_id: AttributeId, form: Cleaned<AttributeValueForm>) -> Self {
        Self {
            id,
            attribute_id,
            value: form.into_inner().value,
        }
    }

    pub fn apply(&mut self, form: Cleaned<AttributeValueForm>) {
        self.value = form.into_inner().value;
    }

    /// `"<attribute name>: <value>"`, e.g. `"Color: Red"`.
    pub fn display_with(&self, attribute: &Attribute) -> String {
        format!("{}: {}", attribute.name, self.value)
    }
}

impl Entity for AttributeValue {
    type Id = AttributeValueId;
    const MODEL: &'static str = "attribute_value";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValueForm {
    pub value: String,
}

impl AttributeValueForm {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        Ok(Cleaned::new(Self {
            value: form::required("value", &self.value, VALUE_MAX_LEN)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_display_prefixes_attribute_name() {
        let color = Attribute::new(AttributeId::new(1), AttributeForm::new("Color").clean().unwrap());
        let red = AttributeValue::new(
            AttributeValueId::new(10),
            color.id,
            AttributeValueForm::new(" Red ").clean().unwrap(),
        );
        assert_eq!(red.display_with(&color), "Color: Red");
    }

    #[test]
    fn category_links_are_sorted_and_unique() {
        let form = AttributeForm::new("Size")
            .with_categories([CategoryId::new(3), CategoryId::new(1), CategoryId::new(3)])
            .clean()
            .unwrap();
        let size = Attribute::new(AttributeId::new(2), form);
        assert_eq!(size.category_ids, vec![CategoryId::new(1), CategoryId::new(3)]);
        assert!(size.applies_to(CategoryId::new(3)));
        assert!(!size.applies_to(CategoryId::new(2)));
    }
}
