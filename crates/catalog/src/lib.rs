//! Catalog domain module.
//!
//! Categories, vendors, brands, attributes, products, variants and images as
//! plain records, plus the forms that clean admin input into them. Pure
//! domain logic: no IO, no HTTP, no storage.

pub mod attribute;
pub mod brand;
pub mod category;
pub mod form;
pub mod image;
pub mod pricing;
pub mod product;
pub mod variant;
pub mod vendor;

pub use attribute::{Attribute, AttributeForm, AttributeValue, AttributeValueForm};
pub use brand::{Brand, BrandForm};
pub use category::{Category, CategoryForm, CategoryTree};
pub use form::Cleaned;
pub use image::{ImageForm, ImageRef, ProductImage, UploadTo};
pub use pricing::{sell_price, variant_price};
pub use product::{Product, ProductForm};
pub use variant::{ProductVariant, VariantForm};
pub use vendor::{Vendor, VendorForm};
