//! Postgres-backed catalog store.
//!
//! Uniqueness, references and delete policies live in the schema
//! (`migrations/0001_catalog.sql`): cascades and `SET NULL` are declared on
//! the foreign keys, so deletes are single statements. Multi-row writes
//! (many-to-many links) run in one transaction.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` | `Conflict` | duplicate `(slug, parent)`, brand slug, or vendor user |
//! | `23503` | `Integrity` | referenced category, vendor, brand or value missing |
//! | `23514` | `Validation` | CHECK constraint (price, stock, discount range) |
//! | other / non-database | `Storage` | connection failures, decode errors |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use tracing::instrument;

use storefront_catalog::{
    Attribute, AttributeForm, AttributeValue, AttributeValueForm, Brand, BrandForm, Category,
    CategoryForm, Cleaned, ImageForm, ImageRef, Product, ProductForm, ProductImage,
    ProductVariant, VariantForm, Vendor, VendorForm,
};
use storefront_core::{
    AttributeId, AttributeValueId, BrandId, CategoryId, DomainError, Entity, ImageId, ProductId,
    UserId, VariantId, VendorId,
};

use super::r#trait::{CatalogStore, StoreError, StoreResult};

const ATTRIBUTE_SELECT: &str = r#"
    SELECT a.id, a.name,
           ARRAY(SELECT ac.category_id FROM attribute_categories ac
                 WHERE ac.attribute_id = a.id ORDER BY ac.category_id) AS category_ids
    FROM attributes a
"#;

const VARIANT_SELECT: &str = r#"
    SELECT v.id, v.product_id, v.stock, v.price_delta, v.image,
           ARRAY(SELECT va.attribute_value_id FROM variant_attribute_values va
                 WHERE va.variant_id = v.id ORDER BY va.attribute_value_id) AS attribute_value_ids
    FROM product_variants v
"#;

const PRODUCT_COLUMNS: &str = "id, category_id, vendor_id, brand_id, name, slug, description, image, \
     price, discount_rate, stock, is_active, created_at, updated_at";

/// Is `candidate` (the proposed parent) `id` itself or below it?
/// `UNION` drops repeated rows, so the walk ends even on a corrupt loop.
const CATEGORY_CYCLE_SQL: &str = r#"
    WITH RECURSIVE chain (id, parent_id) AS (
        SELECT id, parent_id FROM categories WHERE id = $1
        UNION
        SELECT c.id, c.parent_id FROM categories c JOIN chain ON c.id = chain.parent_id
    )
    SELECT EXISTS (SELECT 1 FROM chain WHERE id = $2)
"#;

/// Postgres-backed catalog store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; the store itself is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("migration failed: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), fields(slug = %form.slug), err)]
    async fn create_category(&self, form: Cleaned<CategoryForm>) -> StoreResult<Category> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (parent_id, name, slug, icon_class)
            VALUES ($1, $2, $3, $4)
            RETURNING id, parent_id, name, slug, icon_class
            "#,
        )
        .bind(form.parent_id.map(CategoryId::get))
        .bind(&form.name)
        .bind(&form.slug)
        .bind(form.icon_class.as_deref())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_category", e))?;

        category_from_row(&row).map_err(|e| map_sqlx_error("create_category", e))
    }

    #[instrument(skip(self, form), fields(category_id = %id), err)]
    async fn update_category(&self, id: CategoryId, form: Cleaned<CategoryForm>) -> StoreResult<Category> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_category", e))?;

        if let Some(parent) = form.parent_id {
            // Two concurrent re-parents could each pass the check and close a
            // loop together; serialize them.
            sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_category", e))?;

            let cycle: bool = sqlx::query_scalar(CATEGORY_CYCLE_SQL)
                .bind(parent.get())
                .bind(id.get())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_category", e))?;
            if cycle {
                return Err(StoreError::integrity(format!(
                    "category {parent} is {id} or one of its descendants"
                )));
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, slug = $4, icon_class = $5
            WHERE id = $1
            RETURNING id, parent_id, name, slug, icon_class
            "#,
        )
        .bind(id.get())
        .bind(form.parent_id.map(CategoryId::get))
        .bind(&form.name)
        .bind(&form.slug)
        .bind(form.icon_class.as_deref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?
        .ok_or_else(|| StoreError::not_found(Category::MODEL, id))?;

        let category = category_from_row(&row).map_err(|e| map_sqlx_error("update_category", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_category", e))?;
        Ok(category)
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Category> {
        let row = sqlx::query("SELECT id, parent_id, name, slug, icon_class FROM categories WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?
            .ok_or_else(|| StoreError::not_found(Category::MODEL, id))?;
        category_from_row(&row).map_err(|e| map_sqlx_error("get_category", e))
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, parent_id, name, slug, icon_class FROM categories ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        rows.iter()
            .map(category_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_categories", e))
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        delete_by_id(&self.pool, "categories", Category::MODEL, id.get()).await
    }

    // ---------------------------------------------------------------------
    // Vendors
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), fields(user_id = %form.user_id), err)]
    async fn create_vendor(&self, form: Cleaned<VendorForm>) -> StoreResult<Vendor> {
        let row = sqlx::query(
            r#"
            INSERT INTO vendors (user_id, name, is_active, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, is_active, created_at
            "#,
        )
        .bind(form.user_id.get())
        .bind(&form.name)
        .bind(form.is_active)
        .bind(Utc::now())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_vendor", e))?;

        vendor_from_row(&row).map_err(|e| map_sqlx_error("create_vendor", e))
    }

    #[instrument(skip(self, form), fields(vendor_id = %id), err)]
    async fn update_vendor(&self, id: VendorId, form: Cleaned<VendorForm>) -> StoreResult<Vendor> {
        let row = sqlx::query(
            r#"
            UPDATE vendors SET user_id = $2, name = $3, is_active = $4
            WHERE id = $1
            RETURNING id, user_id, name, is_active, created_at
            "#,
        )
        .bind(id.get())
        .bind(form.user_id.get())
        .bind(&form.name)
        .bind(form.is_active)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_vendor", e))?
        .ok_or_else(|| StoreError::not_found(Vendor::MODEL, id))?;

        vendor_from_row(&row).map_err(|e| map_sqlx_error("update_vendor", e))
    }

    async fn get_vendor(&self, id: VendorId) -> StoreResult<Vendor> {
        let row = sqlx::query("SELECT id, user_id, name, is_active, created_at FROM vendors WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_vendor", e))?
            .ok_or_else(|| StoreError::not_found(Vendor::MODEL, id))?;
        vendor_from_row(&row).map_err(|e| map_sqlx_error("get_vendor", e))
    }

    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        let rows = sqlx::query("SELECT id, user_id, name, is_active, created_at FROM vendors ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_vendors", e))?;
        rows.iter()
            .map(vendor_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_vendors", e))
    }

    #[instrument(skip(self), fields(vendor_id = %id), err)]
    async fn delete_vendor(&self, id: VendorId) -> StoreResult<()> {
        delete_by_id(&self.pool, "vendors", Vendor::MODEL, id.get()).await
    }

    // ---------------------------------------------------------------------
    // Brands
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), fields(slug = %form.slug), err)]
    async fn create_brand(&self, form: Cleaned<BrandForm>) -> StoreResult<Brand> {
        let row = sqlx::query(
            r#"
            INSERT INTO brands (name, slug, is_active, logo)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, is_active, logo
            "#,
        )
        .bind(&form.name)
        .bind(&form.slug)
        .bind(form.is_active)
        .bind(form.logo.as_ref().map(ImageRef::as_str))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_brand", e))?;

        brand_from_row(&row).map_err(|e| map_sqlx_error("create_brand", e))
    }

    #[instrument(skip(self, form), fields(brand_id = %id), err)]
    async fn update_brand(&self, id: BrandId, form: Cleaned<BrandForm>) -> StoreResult<Brand> {
        let row = sqlx::query(
            r#"
            UPDATE brands SET name = $2, slug = $3, is_active = $4, logo = $5
            WHERE id = $1
            RETURNING id, name, slug, is_active, logo
            "#,
        )
        .bind(id.get())
        .bind(&form.name)
        .bind(&form.slug)
        .bind(form.is_active)
        .bind(form.logo.as_ref().map(ImageRef::as_str))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_brand", e))?
        .ok_or_else(|| StoreError::not_found(Brand::MODEL, id))?;

        brand_from_row(&row).map_err(|e| map_sqlx_error("update_brand", e))
    }

    async fn get_brand(&self, id: BrandId) -> StoreResult<Brand> {
        let row = sqlx::query("SELECT id, name, slug, is_active, logo FROM brands WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_brand", e))?
            .ok_or_else(|| StoreError::not_found(Brand::MODEL, id))?;
        brand_from_row(&row).map_err(|e| map_sqlx_error("get_brand", e))
    }

    async fn list_brands(&self) -> StoreResult<Vec<Brand>> {
        let rows = sqlx::query("SELECT id, name, slug, is_active, logo FROM brands ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_brands", e))?;
        rows.iter()
            .map(brand_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_brands", e))
    }

    #[instrument(skip(self), fields(brand_id = %id), err)]
    async fn delete_brand(&self, id: BrandId) -> StoreResult<()> {
        delete_by_id(&self.pool, "brands", Brand::MODEL, id.get()).await
    }

    // ---------------------------------------------------------------------
    // Attributes and values
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), err)]
    async fn create_attribute(&self, form: Cleaned<AttributeForm>) -> StoreResult<Attribute> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_attribute", e))?;

        let id: i64 = sqlx::query_scalar("INSERT INTO attributes (name) VALUES ($1) RETURNING id")
            .bind(&form.name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_attribute", e))?;
        replace_attribute_categories(&mut tx, id, &form.category_ids)
            .await
            .map_err(|e| map_sqlx_error("create_attribute", e))?;
        let attribute = fetch_attribute(&mut tx, id)
            .await
            .map_err(|e| map_sqlx_error("create_attribute", e))?
            .ok_or_else(|| StoreError::not_found(Attribute::MODEL, id))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_attribute", e))?;
        Ok(attribute)
    }

    #[instrument(skip(self, form), fields(attribute_id = %id), err)]
    async fn update_attribute(&self, id: AttributeId, form: Cleaned<AttributeForm>) -> StoreResult<Attribute> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_attribute", e))?;

        let updated = sqlx::query("UPDATE attributes SET name = $2 WHERE id = $1")
            .bind(id.get())
            .bind(&form.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_attribute", e))?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::not_found(Attribute::MODEL, id));
        }
        replace_attribute_categories(&mut tx, id.get(), &form.category_ids)
            .await
            .map_err(|e| map_sqlx_error("update_attribute", e))?;
        let attribute = fetch_attribute(&mut tx, id.get())
            .await
            .map_err(|e| map_sqlx_error("update_attribute", e))?
            .ok_or_else(|| StoreError::not_found(Attribute::MODEL, id))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_attribute", e))?;
        Ok(attribute)
    }

    async fn get_attribute(&self, id: AttributeId) -> StoreResult<Attribute> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("get_attribute", e))?;
        fetch_attribute(&mut conn, id.get())
            .await
            .map_err(|e| map_sqlx_error("get_attribute", e))?
            .ok_or_else(|| StoreError::not_found(Attribute::MODEL, id))
    }

    async fn list_attributes(&self) -> StoreResult<Vec<Attribute>> {
        let rows = sqlx::query(&format!("{ATTRIBUTE_SELECT} ORDER BY a.id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_attributes", e))?;
        rows.iter()
            .map(attribute_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_attributes", e))
    }

    #[instrument(skip(self), fields(attribute_id = %id), err)]
    async fn delete_attribute(&self, id: AttributeId) -> StoreResult<()> {
        delete_by_id(&self.pool, "attributes", Attribute::MODEL, id.get()).await
    }

    #[instrument(skip(self, form), fields(attribute_id = %attribute_id), err)]
    async fn create_attribute_value(
        &self,
        attribute_id: AttributeId,
        form: Cleaned<AttributeValueForm>,
    ) -> StoreResult<AttributeValue> {
        let row = sqlx::query(
            r#"
            INSERT INTO attribute_values (attribute_id, value)
            SELECT id, $2 FROM attributes WHERE id = $1
            RETURNING id, attribute_id, value
            "#,
        )
        .bind(attribute_id.get())
        .bind(&form.value)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_attribute_value", e))?
        .ok_or_else(|| StoreError::not_found(Attribute::MODEL, attribute_id))?;

        attribute_value_from_row(&row).map_err(|e| map_sqlx_error("create_attribute_value", e))
    }

    #[instrument(skip(self, form), fields(attribute_id = %attribute_id, value_id = %id), err)]
    async fn update_attribute_value(
        &self,
        attribute_id: AttributeId,
        id: AttributeValueId,
        form: Cleaned<AttributeValueForm>,
    ) -> StoreResult<AttributeValue> {
        let row = sqlx::query(
            r#"
            UPDATE attribute_values SET value = $3
            WHERE id = $1 AND attribute_id = $2
            RETURNING id, attribute_id, value
            "#,
        )
        .bind(id.get())
        .bind(attribute_id.get())
        .bind(&form.value)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_attribute_value", e))?
        .ok_or_else(|| StoreError::not_found(AttributeValue::MODEL, id))?;

        attribute_value_from_row(&row).map_err(|e| map_sqlx_error("update_attribute_value", e))
    }

    async fn list_attribute_values(&self, attribute_id: Option<AttributeId>) -> StoreResult<Vec<AttributeValue>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("list_attribute_values", e))?;

        if let Some(attribute_id) = attribute_id {
            let found = row_exists(&mut conn, "attributes", attribute_id.get())
                .await
                .map_err(|e| map_sqlx_error("list_attribute_values", e))?;
            if !found {
                return Err(StoreError::not_found(Attribute::MODEL, attribute_id));
            }
        }

        let rows = sqlx::query(
            r#"
            SELECT id, attribute_id, value FROM attribute_values
            WHERE $1::BIGINT IS NULL OR attribute_id = $1
            ORDER BY id
            "#,
        )
        .bind(attribute_id.map(AttributeId::get))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list_attribute_values", e))?;

        rows.iter()
            .map(attribute_value_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_attribute_values", e))
    }

    #[instrument(skip(self), fields(attribute_id = %attribute_id, value_id = %id), err)]
    async fn delete_attribute_value(&self, attribute_id: AttributeId, id: AttributeValueId) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM attribute_values WHERE id = $1 AND attribute_id = $2")
            .bind(id.get())
            .bind(attribute_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_attribute_value", e))?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::not_found(AttributeValue::MODEL, id));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Products
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), fields(slug = %form.slug), err)]
    async fn create_product(&self, form: Cleaned<ProductForm>) -> StoreResult<Product> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (category_id, vendor_id, brand_id, name, slug, description, image,
                                  price, discount_rate, stock, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(form.category_id.get())
        .bind(form.vendor_id.get())
        .bind(form.brand_id.map(BrandId::get))
        .bind(&form.name)
        .bind(&form.slug)
        .bind(form.description.as_deref())
        .bind(form.image.as_ref().map(ImageRef::as_str))
        .bind(form.price)
        .bind(form.discount_rate)
        .bind(form.stock)
        .bind(form.is_active)
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;

        product_from_row(&row).map_err(|e| map_sqlx_error("create_product", e))
    }

    #[instrument(skip(self, form), fields(product_id = %id), err)]
    async fn update_product(&self, id: ProductId, form: Cleaned<ProductForm>) -> StoreResult<Product> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET category_id = $2, vendor_id = $3, brand_id = $4, name = $5, slug = $6,
                description = $7, image = $8, price = $9, discount_rate = $10, stock = $11,
                is_active = $12, updated_at = $13
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(form.category_id.get())
        .bind(form.vendor_id.get())
        .bind(form.brand_id.map(BrandId::get))
        .bind(&form.name)
        .bind(&form.slug)
        .bind(form.description.as_deref())
        .bind(form.image.as_ref().map(ImageRef::as_str))
        .bind(form.price)
        .bind(form.discount_rate)
        .bind(form.stock)
        .bind(form.is_active)
        .bind(Utc::now())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?
        .ok_or_else(|| StoreError::not_found(Product::MODEL, id))?;

        product_from_row(&row).map_err(|e| map_sqlx_error("update_product", e))
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?
            .ok_or_else(|| StoreError::not_found(Product::MODEL, id))?;
        product_from_row(&row).map_err(|e| map_sqlx_error("get_product", e))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter()
            .map(product_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_products", e))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        delete_by_id(&self.pool, "products", Product::MODEL, id.get()).await
    }

    // ---------------------------------------------------------------------
    // Variants
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), fields(product_id = %product_id), err)]
    async fn create_variant(&self, product_id: ProductId, form: Cleaned<VariantForm>) -> StoreResult<ProductVariant> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_variant", e))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO product_variants (product_id, stock, price_delta, image)
            SELECT id, $2, $3, $4 FROM products WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(product_id.get())
        .bind(form.stock)
        .bind(form.price_delta)
        .bind(form.image.as_ref().map(ImageRef::as_str))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_variant", e))?
        .ok_or_else(|| StoreError::not_found(Product::MODEL, product_id))?;

        replace_variant_values(&mut tx, id, &form.attribute_value_ids)
            .await
            .map_err(|e| map_sqlx_error("create_variant", e))?;
        let variant = fetch_variant(&mut tx, id)
            .await
            .map_err(|e| map_sqlx_error("create_variant", e))?
            .ok_or_else(|| StoreError::not_found(ProductVariant::MODEL, id))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_variant", e))?;
        Ok(variant)
    }

    #[instrument(skip(self, form), fields(product_id = %product_id, variant_id = %id), err)]
    async fn update_variant(
        &self,
        product_id: ProductId,
        id: VariantId,
        form: Cleaned<VariantForm>,
    ) -> StoreResult<ProductVariant> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_variant", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE product_variants SET stock = $3, price_delta = $4, image = $5
            WHERE id = $1 AND product_id = $2
            "#,
        )
        .bind(id.get())
        .bind(product_id.get())
        .bind(form.stock)
        .bind(form.price_delta)
        .bind(form.image.as_ref().map(ImageRef::as_str))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_variant", e))?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::not_found(ProductVariant::MODEL, id));
        }

        replace_variant_values(&mut tx, id.get(), &form.attribute_value_ids)
            .await
            .map_err(|e| map_sqlx_error("update_variant", e))?;
        let variant = fetch_variant(&mut tx, id.get())
            .await
            .map_err(|e| map_sqlx_error("update_variant", e))?
            .ok_or_else(|| StoreError::not_found(ProductVariant::MODEL, id))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_variant", e))?;
        Ok(variant)
    }

    async fn list_variants(&self, product_id: ProductId) -> StoreResult<Vec<ProductVariant>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("list_variants", e))?;
        let found = row_exists(&mut conn, "products", product_id.get())
            .await
            .map_err(|e| map_sqlx_error("list_variants", e))?;
        if !found {
            return Err(StoreError::not_found(Product::MODEL, product_id));
        }

        let rows = sqlx::query(&format!("{VARIANT_SELECT} WHERE v.product_id = $1 ORDER BY v.id"))
            .bind(product_id.get())
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("list_variants", e))?;
        rows.iter()
            .map(variant_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_variants", e))
    }

    #[instrument(skip(self), fields(product_id = %product_id, variant_id = %id), err)]
    async fn delete_variant(&self, product_id: ProductId, id: VariantId) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM product_variants WHERE id = $1 AND product_id = $2")
            .bind(id.get())
            .bind(product_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_variant", e))?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::not_found(ProductVariant::MODEL, id));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Gallery images
    // ---------------------------------------------------------------------

    #[instrument(skip(self, form), fields(product_id = %product_id), err)]
    async fn create_image(&self, product_id: ProductId, form: Cleaned<ImageForm>) -> StoreResult<ProductImage> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_image", e))?;

        let found = row_exists(&mut tx, "products", product_id.get())
            .await
            .map_err(|e| map_sqlx_error("create_image", e))?;
        if !found {
            return Err(StoreError::not_found(Product::MODEL, product_id));
        }
        check_image_variant(&mut tx, product_id, form.variant_id).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO product_images (product_id, variant_id, image)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, variant_id, image
            "#,
        )
        .bind(product_id.get())
        .bind(form.variant_id.map(VariantId::get))
        .bind(form.image.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_image", e))?;

        let image = image_from_row(&row).map_err(|e| map_sqlx_error("create_image", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_image", e))?;
        Ok(image)
    }

    #[instrument(skip(self, form), fields(product_id = %product_id, image_id = %id), err)]
    async fn update_image(
        &self,
        product_id: ProductId,
        id: ImageId,
        form: Cleaned<ImageForm>,
    ) -> StoreResult<ProductImage> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_image", e))?;

        check_image_variant(&mut tx, product_id, form.variant_id).await?;

        let row = sqlx::query(
            r#"
            UPDATE product_images SET variant_id = $3, image = $4
            WHERE id = $1 AND product_id = $2
            RETURNING id, product_id, variant_id, image
            "#,
        )
        .bind(id.get())
        .bind(product_id.get())
        .bind(form.variant_id.map(VariantId::get))
        .bind(form.image.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_image", e))?
        .ok_or_else(|| StoreError::not_found(ProductImage::MODEL, id))?;

        let image = image_from_row(&row).map_err(|e| map_sqlx_error("update_image", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_image", e))?;
        Ok(image)
    }

    async fn list_images(&self, product_id: ProductId) -> StoreResult<Vec<ProductImage>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("list_images", e))?;
        let found = row_exists(&mut conn, "products", product_id.get())
            .await
            .map_err(|e| map_sqlx_error("list_images", e))?;
        if !found {
            return Err(StoreError::not_found(Product::MODEL, product_id));
        }

        let rows = sqlx::query(
            "SELECT id, product_id, variant_id, image FROM product_images WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id.get())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list_images", e))?;
        rows.iter()
            .map(image_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_images", e))
    }

    #[instrument(skip(self), fields(product_id = %product_id, image_id = %id), err)]
    async fn delete_image(&self, product_id: ProductId, id: ImageId) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM product_images WHERE id = $1 AND product_id = $2")
            .bind(id.get())
            .bind(product_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_image", e))?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::not_found(ProductImage::MODEL, id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Shared statements
// ---------------------------------------------------------------------

/// `table` is always one of our own constants, never user input.
async fn delete_by_id(pool: &PgPool, table: &'static str, entity: &'static str, id: i64) -> StoreResult<()> {
    let deleted = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("delete", e))?;
    if deleted.rows_affected() == 0 {
        return Err(StoreError::not_found(entity, id));
    }
    Ok(())
}

async fn row_exists(conn: &mut PgConnection, table: &'static str, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)"))
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

async fn replace_attribute_categories(
    conn: &mut PgConnection,
    attribute_id: i64,
    category_ids: &[CategoryId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM attribute_categories WHERE attribute_id = $1")
        .bind(attribute_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO attribute_categories (attribute_id, category_id) SELECT $1, UNNEST($2::BIGINT[])",
    )
    .bind(attribute_id)
    .bind(raw_ids(category_ids))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn replace_variant_values(
    conn: &mut PgConnection,
    variant_id: i64,
    value_ids: &[AttributeValueId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM variant_attribute_values WHERE variant_id = $1")
        .bind(variant_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO variant_attribute_values (variant_id, attribute_value_id) SELECT $1, UNNEST($2::BIGINT[])",
    )
    .bind(variant_id)
    .bind(raw_ids(value_ids))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn fetch_attribute(conn: &mut PgConnection, id: i64) -> Result<Option<Attribute>, sqlx::Error> {
    let row = sqlx::query(&format!("{ATTRIBUTE_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(attribute_from_row).transpose()
}

async fn fetch_variant(conn: &mut PgConnection, id: i64) -> Result<Option<ProductVariant>, sqlx::Error> {
    let row = sqlx::query(&format!("{VARIANT_SELECT} WHERE v.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(variant_from_row).transpose()
}

/// A gallery image may only point at a variant of its own product.
async fn check_image_variant(
    conn: &mut PgConnection,
    product_id: ProductId,
    variant_id: Option<VariantId>,
) -> StoreResult<()> {
    let Some(variant_id) = variant_id else {
        return Ok(());
    };
    let owner: Option<i64> = sqlx::query_scalar("SELECT product_id FROM product_variants WHERE id = $1")
        .bind(variant_id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("check_image_variant", e))?;
    match owner {
        Some(owner) if owner == product_id.get() => Ok(()),
        Some(_) => Err(StoreError::integrity(format!(
            "variant {variant_id} belongs to another product"
        ))),
        None => Err(StoreError::integrity(format!("variant {variant_id} does not exist"))),
    }
}

fn raw_ids<T: Copy + Into<i64>>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|&id| id.into()).collect()
}

/// Map SQLx errors to store errors by SQLSTATE.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} in {}", db_err.message(), operation);
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::Integrity(msg),
                Some("23514") => StoreError::Validation(DomainError::validation(msg)),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Storage(format!("connection pool closed in {operation}")),
        other => StoreError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

// ---------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        parent_id: row.try_get::<Option<i64>, _>("parent_id")?.map(CategoryId::new),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        icon_class: row.try_get("icon_class")?,
    })
}

fn vendor_from_row(row: &PgRow) -> Result<Vendor, sqlx::Error> {
    Ok(Vendor {
        id: VendorId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        name: row.try_get("name")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn brand_from_row(row: &PgRow) -> Result<Brand, sqlx::Error> {
    Ok(Brand {
        id: BrandId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        is_active: row.try_get("is_active")?,
        logo: row.try_get::<Option<String>, _>("logo")?.map(ImageRef::new),
    })
}

fn attribute_from_row(row: &PgRow) -> Result<Attribute, sqlx::Error> {
    let category_ids: Vec<i64> = row.try_get("category_ids")?;
    Ok(Attribute {
        id: AttributeId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        category_ids: category_ids.into_iter().map(CategoryId::new).collect(),
    })
}

fn attribute_value_from_row(row: &PgRow) -> Result<AttributeValue, sqlx::Error> {
    Ok(AttributeValue {
        id: AttributeValueId::new(row.try_get("id")?),
        attribute_id: AttributeId::new(row.try_get("attribute_id")?),
        value: row.try_get("value")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        category_id: CategoryId::new(row.try_get("category_id")?),
        vendor_id: VendorId::new(row.try_get("vendor_id")?),
        brand_id: row.try_get::<Option<i64>, _>("brand_id")?.map(BrandId::new),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        image: row.try_get::<Option<String>, _>("image")?.map(ImageRef::new),
        price: row.try_get("price")?,
        discount_rate: row.try_get("discount_rate")?,
        stock: row.try_get("stock")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn variant_from_row(row: &PgRow) -> Result<ProductVariant, sqlx::Error> {
    let value_ids: Vec<i64> = row.try_get("attribute_value_ids")?;
    Ok(ProductVariant {
        id: VariantId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        attribute_value_ids: value_ids.into_iter().map(AttributeValueId::new).collect(),
        stock: row.try_get("stock")?,
        price_delta: row.try_get("price_delta")?,
        image: row.try_get::<Option<String>, _>("image")?.map(ImageRef::new),
    })
}

fn image_from_row(row: &PgRow) -> Result<ProductImage, sqlx::Error> {
    Ok(ProductImage {
        id: ImageId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        variant_id: row.try_get::<Option<i64>, _>("variant_id")?.map(VariantId::new),
        image: ImageRef::new(row.try_get::<String, _>("image")?),
    })
}
