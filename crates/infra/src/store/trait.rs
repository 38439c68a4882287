use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::{
    Attribute, AttributeForm, AttributeValue, AttributeValueForm, Brand, BrandForm, Category,
    CategoryForm, Cleaned, ImageForm, Product, ProductForm, ProductImage, ProductVariant,
    VariantForm, Vendor, VendorForm,
};
use storefront_core::{
    AttributeId, AttributeValueId, BrandId, CategoryId, DomainError, ImageId, ProductId,
    VariantId, VendorId,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Catalog store operation error.
///
/// Field-level problems are caught while cleaning forms; the store reports
/// what only it can see: missing rows, uniqueness, references and backend
/// failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced row is missing, or the write would break the category tree.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Validation(DomainError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvariantViolation(msg) => StoreError::Integrity(msg),
            DomainError::Conflict(msg) => StoreError::Conflict(msg),
            other => StoreError::Validation(other),
        }
    }
}

/// Persistent home of the catalog.
///
/// Every method is one atomic unit: either the whole write (including its
/// cascades) lands or none of it does. Writes take cleaned forms only.
///
/// Delete policies:
/// - categories take their subtree and every product filed under it
/// - vendors take their products; products take their variants and images
/// - attributes take their values
/// - deleting a brand clears `brand_id` on its products
/// - deleting a variant clears `variant_id` on its images
/// - many-to-many links go with either end
///
/// Listings are ordered by ascending id, except products (newest first).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // -- categories --
    async fn create_category(&self, form: Cleaned<CategoryForm>) -> StoreResult<Category>;
    async fn update_category(&self, id: CategoryId, form: Cleaned<CategoryForm>) -> StoreResult<Category>;
    async fn get_category(&self, id: CategoryId) -> StoreResult<Category>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()>;

    // -- vendors --
    async fn create_vendor(&self, form: Cleaned<VendorForm>) -> StoreResult<Vendor>;
    async fn update_vendor(&self, id: VendorId, form: Cleaned<VendorForm>) -> StoreResult<Vendor>;
    async fn get_vendor(&self, id: VendorId) -> StoreResult<Vendor>;
    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>>;
    async fn delete_vendor(&self, id: VendorId) -> StoreResult<()>;

    // -- brands --
    async fn create_brand(&self, form: Cleaned<BrandForm>) -> StoreResult<Brand>;
    async fn update_brand(&self, id: BrandId, form: Cleaned<BrandForm>) -> StoreResult<Brand>;
    async fn get_brand(&self, id: BrandId) -> StoreResult<Brand>;
    async fn list_brands(&self) -> StoreResult<Vec<Brand>>;
    async fn delete_brand(&self, id: BrandId) -> StoreResult<()>;

    // -- attributes and their values --
    async fn create_attribute(&self, form: Cleaned<AttributeForm>) -> StoreResult<Attribute>;
    async fn update_attribute(&self, id: AttributeId, form: Cleaned<AttributeForm>) -> StoreResult<Attribute>;
    async fn get_attribute(&self, id: AttributeId) -> StoreResult<Attribute>;
    async fn list_attributes(&self) -> StoreResult<Vec<Attribute>>;
    async fn delete_attribute(&self, id: AttributeId) -> StoreResult<()>;

    async fn create_attribute_value(
        &self,
        attribute_id: AttributeId,
        form: Cleaned<AttributeValueForm>,
    ) -> StoreResult<AttributeValue>;
    async fn update_attribute_value(
        &self,
        attribute_id: AttributeId,
        id: AttributeValueId,
        form: Cleaned<AttributeValueForm>,
    ) -> StoreResult<AttributeValue>;
    /// Values of one attribute, or of every attribute when `None`.
    async fn list_attribute_values(&self, attribute_id: Option<AttributeId>) -> StoreResult<Vec<AttributeValue>>;
    async fn delete_attribute_value(&self, attribute_id: AttributeId, id: AttributeValueId) -> StoreResult<()>;

    // -- products --
    async fn create_product(&self, form: Cleaned<ProductForm>) -> StoreResult<Product>;
    async fn update_product(&self, id: ProductId, form: Cleaned<ProductForm>) -> StoreResult<Product>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Product>;
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    // -- variants --
    async fn create_variant(&self, product_id: ProductId, form: Cleaned<VariantForm>) -> StoreResult<ProductVariant>;
    async fn update_variant(
        &self,
        product_id: ProductId,
        id: VariantId,
        form: Cleaned<VariantForm>,
    ) -> StoreResult<ProductVariant>;
    async fn list_variants(&self, product_id: ProductId) -> StoreResult<Vec<ProductVariant>>;
    async fn delete_variant(&self, product_id: ProductId, id: VariantId) -> StoreResult<()>;

    // -- gallery images --
    async fn create_image(&self, product_id: ProductId, form: Cleaned<ImageForm>) -> StoreResult<ProductImage>;
    async fn update_image(
        &self,
        product_id: ProductId,
        id: ImageId,
        form: Cleaned<ImageForm>,
    ) -> StoreResult<ProductImage>;
    async fn list_images(&self, product_id: ProductId) -> StoreResult<Vec<ProductImage>>;
    async fn delete_image(&self, product_id: ProductId, id: ImageId) -> StoreResult<()>;
}
