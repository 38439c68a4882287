//! Brands: named, sluggable manufacturers that products may point at.

use serde::{Deserialize, Serialize};

use storefront_core::{BrandId, DomainResult, Entity};

use crate::form::{self, Cleaned};
use crate::image::{ImageRef, UploadTo};

pub const NAME_MAX_LEN: usize = 100;
pub const SLUG_MAX_LEN: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    /// Unique across all brands.
    pub slug: String,
    pub is_active: bool,
    pub logo: Option<ImageRef>,
}

impl Brand {
    pub fn new(id: BrandId, form: Cleaned<BrandForm>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            name: form.name,
            slug: form.slug,
            is_active: form.is_active,
            logo: form.logo,
        }
    }

    pub fn apply(&mut self, form: Cleaned<BrandForm>) {
        *self = Self::new(self.id, form);
    }
}

impl Entity for Brand {
    type Id = BrandId;
    const MODEL: &'static str = "brand";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Brand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandForm {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub logo: Option<ImageRef>,
}

fn default_true() -> bool {
    true
}

impl BrandForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: String::new(),
            is_active: true,
            logo: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(ImageRef::new(logo));
        self
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        let name = form::required("name", &self.name, NAME_MAX_LEN)?;
        let slug = form::slug_or_derived("slug", &self.slug, &name, SLUG_MAX_LEN)?;
        let logo = self
            .logo
            .map(|logo| logo.clean(UploadTo::BrandLogo))
            .transpose()?;
        Ok(Cleaned::new(Self {
            name,
            slug,
            is_active: self.is_active,
            logo,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_defaults_from_name_and_logo_is_prefixed() {
        let brand = Brand::new(
            BrandId::new(1),
            BrandForm::new("Good Sound Co.").with_logo("gs.png").clean().unwrap(),
        );
        assert_eq!(brand.slug, "good-sound-co");
        assert_eq!(brand.logo.unwrap().as_str(), "brands/gs.png");
        assert!(brand.is_active);
    }
}
