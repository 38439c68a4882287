use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use storefront_catalog::{
    Attribute, AttributeForm, AttributeValue, AttributeValueForm, Brand, BrandForm, Category,
    CategoryForm, CategoryTree, Cleaned, ImageForm, Product, ProductForm, ProductImage,
    ProductVariant, VariantForm, Vendor, VendorForm,
};
use storefront_core::{
    AttributeId, AttributeValueId, BrandId, CategoryId, Entity, ImageId, ProductId, VariantId,
    VendorId,
};

use super::r#trait::{CatalogStore, StoreError, StoreResult};

/// In-memory catalog store for tests/dev.
///
/// One `RwLock` guards the whole catalog, so every operation (cascades
/// included) is applied atomically.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    categories: BTreeMap<CategoryId, Category>,
    vendors: BTreeMap<VendorId, Vendor>,
    brands: BTreeMap<BrandId, Brand>,
    attributes: BTreeMap<AttributeId, Attribute>,
    attribute_values: BTreeMap<AttributeValueId, AttributeValue>,
    products: BTreeMap<ProductId, Product>,
    variants: BTreeMap<VariantId, ProductVariant>,
    images: BTreeMap<ImageId, ProductImage>,
    sequences: HashMap<&'static str, i64>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("catalog lock poisoned".to_string()))
    }
}

impl State {
    /// Ids are never reused, mirroring `BIGSERIAL`.
    fn next_id(&mut self, model: &'static str) -> i64 {
        let seq = self.sequences.entry(model).or_insert(0);
        *seq += 1;
        *seq
    }

    fn category(&self, id: CategoryId) -> StoreResult<&Category> {
        self.categories
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Category::MODEL, id))
    }

    fn vendor(&self, id: VendorId) -> StoreResult<&Vendor> {
        self.vendors
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Vendor::MODEL, id))
    }

    fn brand(&self, id: BrandId) -> StoreResult<&Brand> {
        self.brands
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Brand::MODEL, id))
    }

    fn attribute(&self, id: AttributeId) -> StoreResult<&Attribute> {
        self.attributes
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Attribute::MODEL, id))
    }

    fn product(&self, id: ProductId) -> StoreResult<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Product::MODEL, id))
    }

    /// The value, if it exists and belongs to `attribute_id`.
    fn attribute_value_of(&self, attribute_id: AttributeId, id: AttributeValueId) -> StoreResult<&AttributeValue> {
        self.attribute_values
            .get(&id)
            .filter(|v| v.attribute_id == attribute_id)
            .ok_or_else(|| StoreError::not_found(AttributeValue::MODEL, id))
    }

    fn variant_of(&self, product_id: ProductId, id: VariantId) -> StoreResult<&ProductVariant> {
        self.variants
            .get(&id)
            .filter(|v| v.product_id == product_id)
            .ok_or_else(|| StoreError::not_found(ProductVariant::MODEL, id))
    }

    fn image_of(&self, product_id: ProductId, id: ImageId) -> StoreResult<&ProductImage> {
        self.images
            .get(&id)
            .filter(|i| i.product_id == product_id)
            .ok_or_else(|| StoreError::not_found(ProductImage::MODEL, id))
    }

    /// Parent must exist, must not close a loop, and `(slug, parent)` must be free.
    fn check_category(&self, id: Option<CategoryId>, form: &CategoryForm) -> StoreResult<()> {
        if let Some(parent) = form.parent_id {
            if !self.categories.contains_key(&parent) {
                return Err(StoreError::integrity(format!("parent category {parent} does not exist")));
            }
            if let Some(id) = id {
                if CategoryTree::new(self.categories.values()).would_create_cycle(id, Some(parent)) {
                    return Err(StoreError::integrity(format!(
                        "category {parent} is {id} or one of its descendants"
                    )));
                }
            }
        }

        let taken = self
            .categories
            .values()
            .any(|c| Some(c.id) != id && c.slug == form.slug && c.parent_id == form.parent_id);
        if taken {
            return Err(StoreError::conflict(format!(
                "category slug `{}` already used under this parent",
                form.slug
            )));
        }
        Ok(())
    }

    fn check_vendor(&self, id: Option<VendorId>, form: &VendorForm) -> StoreResult<()> {
        if self.vendors.values().any(|v| Some(v.id) != id && v.user_id == form.user_id) {
            return Err(StoreError::conflict(format!("user {} already has a vendor", form.user_id)));
        }
        Ok(())
    }

    fn check_brand(&self, id: Option<BrandId>, form: &BrandForm) -> StoreResult<()> {
        if self.brands.values().any(|b| Some(b.id) != id && b.slug == form.slug) {
            return Err(StoreError::conflict(format!("brand slug `{}` already exists", form.slug)));
        }
        Ok(())
    }

    fn check_attribute(&self, form: &AttributeForm) -> StoreResult<()> {
        match form.category_ids.iter().find(|c| !self.categories.contains_key(*c)) {
            Some(missing) => Err(StoreError::integrity(format!("category {missing} does not exist"))),
            None => Ok(()),
        }
    }

    fn check_product(&self, form: &ProductForm) -> StoreResult<()> {
        if !self.categories.contains_key(&form.category_id) {
            return Err(StoreError::integrity(format!("category {} does not exist", form.category_id)));
        }
        if !self.vendors.contains_key(&form.vendor_id) {
            return Err(StoreError::integrity(format!("vendor {} does not exist", form.vendor_id)));
        }
        if let Some(brand) = form.brand_id {
            if !self.brands.contains_key(&brand) {
                return Err(StoreError::integrity(format!("brand {brand} does not exist")));
            }
        }
        Ok(())
    }

    fn check_variant(&self, form: &VariantForm) -> StoreResult<()> {
        match form
            .attribute_value_ids
            .iter()
            .find(|v| !self.attribute_values.contains_key(*v))
        {
            Some(missing) => Err(StoreError::integrity(format!("attribute value {missing} does not exist"))),
            None => Ok(()),
        }
    }

    /// A gallery image may only point at a variant of its own product.
    fn check_image(&self, product_id: ProductId, form: &ImageForm) -> StoreResult<()> {
        if let Some(variant_id) = form.variant_id {
            match self.variants.get(&variant_id) {
                Some(v) if v.product_id == product_id => {}
                Some(_) => {
                    return Err(StoreError::integrity(format!(
                        "variant {variant_id} belongs to another product"
                    )));
                }
                None => {
                    return Err(StoreError::integrity(format!("variant {variant_id} does not exist")));
                }
            }
        }
        Ok(())
    }

    fn remove_product(&mut self, id: ProductId) {
        self.products.remove(&id);
        self.variants.retain(|_, v| v.product_id != id);
        self.images.retain(|_, i| i.product_id != id);
    }

    fn remove_products_where(&mut self, doomed: impl Fn(&Product) -> bool) -> usize {
        let ids: Vec<ProductId> = self
            .products
            .values()
            .filter(|p| doomed(p))
            .map(|p| p.id)
            .collect();
        for id in &ids {
            self.remove_product(*id);
        }
        ids.len()
    }

    fn unlink_attribute_values(&mut self, removed: &[AttributeValueId]) {
        for variant in self.variants.values_mut() {
            variant.attribute_value_ids.retain(|v| !removed.contains(v));
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn create_category(&self, form: Cleaned<CategoryForm>) -> StoreResult<Category> {
        let mut state = self.write()?;
        state.check_category(None, &form)?;
        let id = CategoryId::new(state.next_id(Category::MODEL));
        let category = Category::new(id, form);
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, form: Cleaned<CategoryForm>) -> StoreResult<Category> {
        let mut state = self.write()?;
        state.category(id)?;
        state.check_category(Some(id), &form)?;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Category::MODEL, id))?;
        category.apply(form);
        Ok(category.clone())
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Category> {
        self.read()?.category(id).cloned()
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.category(id)?;

        let mut subtree = CategoryTree::new(state.categories.values()).descendants(id);
        subtree.push(id);

        let products = state.remove_products_where(|p| subtree.contains(&p.category_id));
        for category in &subtree {
            state.categories.remove(category);
        }
        for attribute in state.attributes.values_mut() {
            attribute.category_ids.retain(|c| !subtree.contains(c));
        }
        tracing::debug!(category_id = %id, categories = subtree.len(), products, "category subtree deleted");
        Ok(())
    }

    async fn create_vendor(&self, form: Cleaned<VendorForm>) -> StoreResult<Vendor> {
        let mut state = self.write()?;
        state.check_vendor(None, &form)?;
        let id = VendorId::new(state.next_id(Vendor::MODEL));
        let vendor = Vendor::new(id, form, Utc::now());
        state.vendors.insert(id, vendor.clone());
        Ok(vendor)
    }

    async fn update_vendor(&self, id: VendorId, form: Cleaned<VendorForm>) -> StoreResult<Vendor> {
        let mut state = self.write()?;
        state.vendor(id)?;
        state.check_vendor(Some(id), &form)?;
        let vendor = state
            .vendors
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Vendor::MODEL, id))?;
        vendor.apply(form);
        Ok(vendor.clone())
    }

    async fn get_vendor(&self, id: VendorId) -> StoreResult<Vendor> {
        self.read()?.vendor(id).cloned()
    }

    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        Ok(self.read()?.vendors.values().cloned().collect())
    }

    async fn delete_vendor(&self, id: VendorId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.vendor(id)?;
        let products = state.remove_products_where(|p| p.vendor_id == id);
        state.vendors.remove(&id);
        tracing::debug!(vendor_id = %id, products, "vendor deleted");
        Ok(())
    }

    async fn create_brand(&self, form: Cleaned<BrandForm>) -> StoreResult<Brand> {
        let mut state = self.write()?;
        state.check_brand(None, &form)?;
        let id = BrandId::new(state.next_id(Brand::MODEL));
        let brand = Brand::new(id, form);
        state.brands.insert(id, brand.clone());
        Ok(brand)
    }

    async fn update_brand(&self, id: BrandId, form: Cleaned<BrandForm>) -> StoreResult<Brand> {
        let mut state = self.write()?;
        state.brand(id)?;
        state.check_brand(Some(id), &form)?;
        let brand = state
            .brands
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Brand::MODEL, id))?;
        brand.apply(form);
        Ok(brand.clone())
    }

    async fn get_brand(&self, id: BrandId) -> StoreResult<Brand> {
        self.read()?.brand(id).cloned()
    }

    async fn list_brands(&self) -> StoreResult<Vec<Brand>> {
        Ok(self.read()?.brands.values().cloned().collect())
    }

    async fn delete_brand(&self, id: BrandId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.brand(id)?;
        state.brands.remove(&id);
        for product in state.products.values_mut() {
            if product.brand_id == Some(id) {
                product.brand_id = None;
            }
        }
        Ok(())
    }

    async fn create_attribute(&self, form: Cleaned<AttributeForm>) -> StoreResult<Attribute> {
        let mut state = self.write()?;
        state.check_attribute(&form)?;
        let id = AttributeId::new(state.next_id(Attribute::MODEL));
        let attribute = Attribute::new(id, form);
        state.attributes.insert(id, attribute.clone());
        Ok(attribute)
    }

    async fn update_attribute(&self, id: AttributeId, form: Cleaned<AttributeForm>) -> StoreResult<Attribute> {
        let mut state = self.write()?;
        state.attribute(id)?;
        state.check_attribute(&form)?;
        let attribute = state
            .attributes
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Attribute::MODEL, id))?;
        attribute.apply(form);
        Ok(attribute.clone())
    }

    async fn get_attribute(&self, id: AttributeId) -> StoreResult<Attribute> {
        self.read()?.attribute(id).cloned()
    }

    async fn list_attributes(&self) -> StoreResult<Vec<Attribute>> {
        Ok(self.read()?.attributes.values().cloned().collect())
    }

    async fn delete_attribute(&self, id: AttributeId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.attribute(id)?;
        let removed: Vec<AttributeValueId> = state
            .attribute_values
            .values()
            .filter(|v| v.attribute_id == id)
            .map(|v| v.id)
            .collect();
        state.attribute_values.retain(|_, v| v.attribute_id != id);
        state.unlink_attribute_values(&removed);
        state.attributes.remove(&id);
        Ok(())
    }

    async fn create_attribute_value(
        &self,
        attribute_id: AttributeId,
        form: Cleaned<AttributeValueForm>,
    ) -> StoreResult<AttributeValue> {
        let mut state = self.write()?;
        state.attribute(attribute_id)?;
        let id = AttributeValueId::new(state.next_id(AttributeValue::MODEL));
        let value = AttributeValue::new(id, attribute_id, form);
        state.attribute_values.insert(id, value.clone());
        Ok(value)
    }

    async fn update_attribute_value(
        &self,
        attribute_id: AttributeId,
        id: AttributeValueId,
        form: Cleaned<AttributeValueForm>,
    ) -> StoreResult<AttributeValue> {
        let mut state = self.write()?;
        state.attribute_value_of(attribute_id, id)?;
        let value = state
            .attribute_values
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(AttributeValue::MODEL, id))?;
        value.apply(form);
        Ok(value.clone())
    }

    async fn list_attribute_values(&self, attribute_id: Option<AttributeId>) -> StoreResult<Vec<AttributeValue>> {
        let state = self.read()?;
        if let Some(attribute_id) = attribute_id {
            state.attribute(attribute_id)?;
        }
        Ok(state
            .attribute_values
            .values()
            .filter(|v| attribute_id.is_none_or(|a| v.attribute_id == a))
            .cloned()
            .collect())
    }

    async fn delete_attribute_value(&self, attribute_id: AttributeId, id: AttributeValueId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.attribute_value_of(attribute_id, id)?;
        state.attribute_values.remove(&id);
        state.unlink_attribute_values(&[id]);
        Ok(())
    }

    async fn create_product(&self, form: Cleaned<ProductForm>) -> StoreResult<Product> {
        let mut state = self.write()?;
        state.check_product(&form)?;
        let id = ProductId::new(state.next_id(Product::MODEL));
        let product = Product::new(id, form, Utc::now());
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, form: Cleaned<ProductForm>) -> StoreResult<Product> {
        let mut state = self.write()?;
        state.product(id)?;
        state.check_product(&form)?;
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Product::MODEL, id))?;
        product.apply(form, Utc::now());
        Ok(product.clone())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        self.read()?.product(id).cloned()
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self.read()?.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(products)
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.product(id)?;
        state.remove_product(id);
        Ok(())
    }

    async fn create_variant(&self, product_id: ProductId, form: Cleaned<VariantForm>) -> StoreResult<ProductVariant> {
        let mut state = self.write()?;
        state.product(product_id)?;
        state.check_variant(&form)?;
        let id = VariantId::new(state.next_id(ProductVariant::MODEL));
        let variant = ProductVariant::new(id, product_id, form);
        state.variants.insert(id, variant.clone());
        Ok(variant)
    }

    async fn update_variant(
        &self,
        product_id: ProductId,
        id: VariantId,
        form: Cleaned<VariantForm>,
    ) -> StoreResult<ProductVariant> {
        let mut state = self.write()?;
        state.variant_of(product_id, id)?;
        state.check_variant(&form)?;
        let variant = state
            .variants
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(ProductVariant::MODEL, id))?;
        variant.apply(form);
        Ok(variant.clone())
    }

    async fn list_variants(&self, product_id: ProductId) -> StoreResult<Vec<ProductVariant>> {
        let state = self.read()?;
        state.product(product_id)?;
        Ok(state
            .variants
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn delete_variant(&self, product_id: ProductId, id: VariantId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.variant_of(product_id, id)?;
        state.variants.remove(&id);
        for image in state.images.values_mut() {
            if image.variant_id == Some(id) {
                image.variant_id = None;
            }
        }
        Ok(())
    }

    async fn create_image(&self, product_id: ProductId, form: Cleaned<ImageForm>) -> StoreResult<ProductImage> {
        let mut state = self.write()?;
        state.product(product_id)?;
        state.check_image(product_id, &form)?;
        let id = ImageId::new(state.next_id(ProductImage::MODEL));
        let image = ProductImage::new(id, product_id, form);
        state.images.insert(id, image.clone());
        Ok(image)
    }

    async fn update_image(
        &self,
        product_id: ProductId,
        id: ImageId,
        form: Cleaned<ImageForm>,
    ) -> StoreResult<ProductImage> {
        let mut state = self.write()?;
        state.image_of(product_id, id)?;
        state.check_image(product_id, &form)?;
        let image = state
            .images
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(ProductImage::MODEL, id))?;
        image.apply(form);
        Ok(image.clone())
    }

    async fn list_images(&self, product_id: ProductId) -> StoreResult<Vec<ProductImage>> {
        let state = self.read()?;
        state.product(product_id)?;
        Ok(state
            .images
            .values()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn delete_image(&self, product_id: ProductId, id: ImageId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.image_of(product_id, id)?;
        state.images.remove(&id);
        Ok(())
    }
}
