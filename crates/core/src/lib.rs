//! `storefront-core`: building blocks shared by every catalog crate.
//!
//! This crate contains **pure** primitives (no storage, no HTTP).

pub mod entity;
pub mod error;
pub mod id;
pub mod slug;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AttributeId, AttributeValueId, BrandId, CategoryId, ImageId, ProductId, UserId, VariantId,
    VendorId,
};
pub use slug::slugify;
