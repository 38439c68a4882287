//! Stored image references and the gallery image record.
//!
//! Bytes live in external storage; the catalog only keeps the relative path.
//! Paths follow an upload-prefix convention per use, which `clean` applies to
//! bare file names.

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ImageId, ProductId, VariantId};

use crate::form;

pub const PATH_MAX_LEN: usize = 100;

/// Where an uploaded image is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTo {
    ProductMain,
    VariantImage,
    Gallery,
    BrandLogo,
}

impl UploadTo {
    pub fn prefix(self) -> &'static str {
        match self {
            UploadTo::ProductMain => "products/",
            UploadTo::VariantImage => "products/variants/",
            UploadTo::Gallery => "products/gallery/",
            UploadTo::BrandLogo => "brands/",
        }
    }
}

/// Relative path of a stored image, e.g. `products/gallery/red-1.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalize against the upload convention for `upload_to`.
    ///
    /// A bare file name gets the prefix; a path that already carries the prefix
    /// is kept as is. Parent-directory segments are rejected.
    pub fn clean(self, upload_to: UploadTo) -> DomainResult<Self> {
        let raw = form::required("image", &self.0, PATH_MAX_LEN)?;
        let path = raw.trim_start_matches('/');
        if path.split('/').any(|seg| seg == ".." || seg == ".") {
            return Err(DomainError::validation("image path cannot contain relative segments"));
        }
        if path.ends_with('/') {
            return Err(DomainError::validation("image path must name a file"));
        }

        let prefix = upload_to.prefix();
        let full = if path.starts_with(prefix) {
            path.to_string()
        } else {
            let file = path.rsplit('/').next().unwrap_or(path);
            format!("{prefix}{file}")
        };

        if full.chars().count() > PATH_MAX_LEN {
            return Err(DomainError::validation(format!(
                "image path is longer than {PATH_MAX_LEN} characters"
            )));
        }
        Ok(Self(full))
    }
}

impl core::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gallery image of a product, optionally tied to one of its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub product_id: ProductId,
    /// Cleared (not cascaded) when the variant is deleted.
    pub variant_id: Option<VariantId>,
    pub image: ImageRef,
}

impl ProductImage {
    pub fn new(id: ImageId, product_id: ProductId, form: form::Cleaned<ImageForm>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            product_id,
            variant_id: form.variant_id,
            image: form.image,
        }
    }

    pub fn apply(&mut self, form: form::Cleaned<ImageForm>) {
        *self = Self::new(self.id, self.product_id, form);
    }
}

impl Entity for ProductImage {
    type Id = ImageId;
    const MODEL: &'static str = "product_image";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageForm {
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub image: ImageRef,
}

impl ImageForm {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            variant_id: None,
            image: ImageRef::new(image),
        }
    }

    pub fn for_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }

    pub fn clean(self) -> DomainResult<form::Cleaned<Self>> {
        Ok(form::Cleaned::new(Self {
            variant_id: self.variant_id,
            image: self.image.clean(UploadTo::Gallery)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_names_get_the_upload_prefix() {
        let r = ImageRef::new("red.jpg").clean(UploadTo::Gallery).unwrap();
        assert_eq!(r.as_str(), "products/gallery/red.jpg");
        let r = ImageRef::new("tmp/uploads/red.jpg").clean(UploadTo::VariantImage).unwrap();
        assert_eq!(r.as_str(), "products/variants/red.jpg");
    }

    #[test]
    fn prefixed_paths_are_kept() {
        let r = ImageRef::new("/products/phone.png").clean(UploadTo::ProductMain).unwrap();
        assert_eq!(r.as_str(), "products/phone.png");
    }

    #[test]
    fn relative_segments_and_blank_paths_are_rejected() {
        assert!(ImageRef::new("../etc/passwd").clean(UploadTo::Gallery).is_err());
        assert!(ImageRef::new("  ").clean(UploadTo::Gallery).is_err());
        assert!(ImageRef::new("brands/").clean(UploadTo::BrandLogo).is_err());
    }

    #[test]
    fn image_form_scopes_to_variant() {
        let form = ImageForm::new("a.jpg").for_variant(VariantId::new(3)).clean().unwrap();
        let img = ProductImage::new(ImageId::new(1), ProductId::new(9), form);
        assert_eq!(img.variant_id, Some(VariantId::new(3)));
        assert_eq!(img.image.as_str(), "products/gallery/a.jpg");
    }
}
