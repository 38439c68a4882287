//! Store integration tests: the catalog rules every `CatalogStore` must honor.
//!
//! Each scenario runs against a fresh in-memory store. Set
//! `STOREFRONT_TEST_DATABASE_URL` to replay the same scenarios against
//! Postgres (tables are truncated between scenarios).

use crate::store::{InMemoryCatalogStore, PostgresCatalogStore};

async fn reset(store: &PostgresCatalogStore) {
    sqlx::query("TRUNCATE categories, vendors, brands, attributes, products RESTART IDENTITY CASCADE")
        .execute(store.pool())
        .await
        .expect("truncate catalog tables");
}

macro_rules! catalog_scenarios {
    ($($name:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $name() {
                scenarios::$name(&InMemoryCatalogStore::new()).await;
            }
        )*

        #[tokio::test]
        async fn postgres_store_passes_every_scenario() {
            let Ok(url) = std::env::var("STOREFRONT_TEST_DATABASE_URL") else {
                return;
            };
            let store = PostgresCatalogStore::connect(&url, 2).await.expect("connect");
            store.migrate().await.expect("migrate");
            $(
                reset(&store).await;
                scenarios::$name(&store).await;
            )*
        }
    };
}

catalog_scenarios!(
    blank_category_slug_is_derived_from_name,
    supplied_category_slug_is_kept_exactly,
    category_slug_is_unique_per_parent,
    category_path_walks_to_the_root,
    reparenting_under_a_descendant_is_rejected,
    deleting_a_category_removes_its_subtree_and_products,
    sell_price_follows_the_discount,
    deleting_a_vendor_cascades_to_variants_and_images,
    deleting_a_variant_clears_the_image_link,
    deleting_a_brand_keeps_its_products,
    one_vendor_per_user,
    brand_slug_is_globally_unique,
    products_are_listed_newest_first,
    image_variant_must_belong_to_the_product,
    missing_references_are_integrity_errors,
    inline_children_are_scoped_to_their_parent,
    deleting_an_attribute_value_unlinks_variants,
    variant_price_and_label_are_derived,
);

mod scenarios {
    use rust_decimal::Decimal;

    use storefront_catalog::{
        AttributeForm, AttributeValueForm, BrandForm, Category, CategoryForm, CategoryTree, ImageForm,
        Product, ProductForm, VariantForm, Vendor, VendorForm,
    };
    use storefront_core::{CategoryId, ProductId, UserId, VendorId};

    use crate::store::{CatalogStore, StoreError};

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    async fn category(store: &dyn CatalogStore, name: &str, parent: Option<CategoryId>) -> Category {
        let mut form = CategoryForm::new(name);
        if let Some(parent) = parent {
            form = form.with_parent(parent);
        }
        store.create_category(form.clean().unwrap()).await.unwrap()
    }

    async fn vendor(store: &dyn CatalogStore, user: i64) -> Vendor {
        let form = VendorForm::new(UserId::new(user), format!("Vendor {user}")).active();
        store.create_vendor(form.clean().unwrap()).await.unwrap()
    }

    fn product_form(category: CategoryId, vendor: VendorId, name: &str, price: &str) -> ProductForm {
        ProductForm::new(category, vendor, name, dec(price))
    }

    async fn product(store: &dyn CatalogStore, category: CategoryId, vendor: VendorId, name: &str) -> Product {
        let form = product_form(category, vendor, name, "10.00");
        store.create_product(form.clean().unwrap()).await.unwrap()
    }

    pub async fn blank_category_slug_is_derived_from_name(store: &dyn CatalogStore) {
        let created = category(store, "Home & Garden", None).await;
        assert_eq!(created.slug, "home-garden");

        let renamed = store
            .update_category(created.id, CategoryForm::new("Outdoor Living").with_slug("  ").clean().unwrap())
            .await
            .unwrap();
        assert_eq!(renamed.slug, "outdoor-living");
        assert_eq!(store.get_category(created.id).await.unwrap().slug, "outdoor-living");
    }

    pub async fn supplied_category_slug_is_kept_exactly(store: &dyn CatalogStore) {
        let form = CategoryForm::new("Laptops").with_slug("Custom_Slug-1");
        let created = store.create_category(form.clean().unwrap()).await.unwrap();
        assert_eq!(created.slug, "Custom_Slug-1");

        let edited = store
            .update_category(
                created.id,
                CategoryForm::new("Notebooks").with_slug("Custom_Slug-1").clean().unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(edited.slug, "Custom_Slug-1");
        assert_eq!(edited.name, "Notebooks");
    }

    pub async fn category_slug_is_unique_per_parent(store: &dyn CatalogStore) {
        let electronics = category(store, "Electronics", None).await;
        let toys = category(store, "Toys", None).await;
        category(store, "Accessories", Some(electronics.id)).await;
        // Same name under another parent is fine.
        category(store, "Accessories", Some(toys.id)).await;

        let dup_child = CategoryForm::new("Accessories").with_parent(electronics.id);
        let err = store.create_category(dup_child.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");

        let dup_root = CategoryForm::new("Toys");
        let err = store.create_category(dup_root.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");
    }

    pub async fn category_path_walks_to_the_root(store: &dyn CatalogStore) {
        let root = category(store, "root", None).await;
        let a = category(store, "A", Some(root.id)).await;
        let b = category(store, "B", Some(a.id)).await;
        let c = category(store, "C", Some(b.id)).await;

        let all = store.list_categories().await.unwrap();
        let tree = CategoryTree::new(&all);
        assert_eq!(tree.display_path(c.id).unwrap(), "root > A > B > C");
        assert_eq!(tree.display_path(root.id).unwrap(), "root");
    }

    pub async fn reparenting_under_a_descendant_is_rejected(store: &dyn CatalogStore) {
        let root = category(store, "Root", None).await;
        let child = category(store, "Child", Some(root.id)).await;
        let grandchild = category(store, "Grandchild", Some(child.id)).await;

        let form = CategoryForm::new("Root").with_parent(grandchild.id);
        let err = store.update_category(root.id, form.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

        let form = CategoryForm::new("Child").with_parent(child.id);
        let err = store.update_category(child.id, form.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

        // Nothing moved.
        assert_eq!(store.get_category(root.id).await.unwrap().parent_id, None);
    }

    pub async fn deleting_a_category_removes_its_subtree_and_products(store: &dyn CatalogStore) {
        let root = category(store, "Electronics", None).await;
        let child = category(store, "Phones", Some(root.id)).await;
        let other = category(store, "Books", None).await;
        let seller = vendor(store, 1).await;
        product(store, child.id, seller.id, "Phone X").await;
        let kept = product(store, other.id, seller.id, "Novel").await;

        let attribute = store
            .create_attribute(AttributeForm::new("Color").with_categories([child.id, other.id]).clean().unwrap())
            .await
            .unwrap();

        store.delete_category(root.id).await.unwrap();

        let remaining: Vec<CategoryId> = store.list_categories().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(remaining, vec![other.id]);
        let products: Vec<ProductId> = store.list_products().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(products, vec![kept.id]);
        assert_eq!(store.get_attribute(attribute.id).await.unwrap().category_ids, vec![other.id]);

        assert!(matches!(
            store.delete_category(root.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    pub async fn sell_price_follows_the_discount(store: &dyn CatalogStore) {
        let cat = category(store, "Audio", None).await;
        let seller = vendor(store, 1).await;

        let full = store
            .create_product(product_form(cat.id, seller.id, "Speaker", "49.99").clean().unwrap())
            .await
            .unwrap();
        assert_eq!(full.sell_price(), full.price);

        let discounted = store
            .create_product(
                product_form(cat.id, seller.id, "Headphones", "100.00")
                    .with_discount(20)
                    .clean()
                    .unwrap(),
            )
            .await
            .unwrap();
        let stored = store.get_product(discounted.id).await.unwrap();
        assert_eq!(stored.price, dec("100.00"));
        assert_eq!(stored.sell_price(), dec("80.00"));
    }

    pub async fn deleting_a_vendor_cascades_to_variants_and_images(store: &dyn CatalogStore) {
        let cat = category(store, "Shoes", None).await;
        let doomed = vendor(store, 1).await;
        let survivor = vendor(store, 2).await;
        let gone = product(store, cat.id, doomed.id, "Runner").await;
        let kept = product(store, cat.id, survivor.id, "Boot").await;

        let variant = store
            .create_variant(gone.id, VariantForm::default().with_stock(3).clean().unwrap())
            .await
            .unwrap();
        store
            .create_image(gone.id, ImageForm::new("side.jpg").for_variant(variant.id).clean().unwrap())
            .await
            .unwrap();
        store
            .create_image(kept.id, ImageForm::new("boot.jpg").clean().unwrap())
            .await
            .unwrap();

        store.delete_vendor(doomed.id).await.unwrap();

        assert!(matches!(store.get_vendor(doomed.id).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.get_product(gone.id).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.list_variants(gone.id).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.list_images(gone.id).await, Err(StoreError::NotFound { .. })));
        assert_eq!(store.list_images(kept.id).await.unwrap().len(), 1);
        assert_eq!(store.list_products().await.unwrap().len(), 1);
    }

    pub async fn deleting_a_variant_clears_the_image_link(store: &dyn CatalogStore) {
        let cat = category(store, "Shirts", None).await;
        let seller = vendor(store, 1).await;
        let shirt = product(store, cat.id, seller.id, "Tee").await;
        let variant = store
            .create_variant(shirt.id, VariantForm::default().clean().unwrap())
            .await
            .unwrap();
        let image = store
            .create_image(shirt.id, ImageForm::new("red.jpg").for_variant(variant.id).clean().unwrap())
            .await
            .unwrap();
        assert_eq!(image.variant_id, Some(variant.id));
        assert_eq!(image.image.as_str(), "products/gallery/red.jpg");

        store.delete_variant(shirt.id, variant.id).await.unwrap();

        let images = store.list_images(shirt.id).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, image.id);
        assert_eq!(images[0].variant_id, None);
    }

    pub async fn deleting_a_brand_keeps_its_products(store: &dyn CatalogStore) {
        let cat = category(store, "Cameras", None).await;
        let seller = vendor(store, 1).await;
        let brand = store
            .create_brand(BrandForm::new("Good Optics").clean().unwrap())
            .await
            .unwrap();
        let camera = store
            .create_product(
                product_form(cat.id, seller.id, "Mirrorless", "899.00")
                    .with_brand(brand.id)
                    .clean()
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(camera.brand_id, Some(brand.id));

        store.delete_brand(brand.id).await.unwrap();

        let camera = store.get_product(camera.id).await.unwrap();
        assert_eq!(camera.brand_id, None);
        assert!(store.list_brands().await.unwrap().is_empty());
    }

    pub async fn one_vendor_per_user(store: &dyn CatalogStore) {
        let first = vendor(store, 7).await;
        let again = VendorForm::new(UserId::new(7), "Second Shop");
        let err = store.create_vendor(again.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");

        // Re-saving the same vendor is not a conflict with itself.
        let renamed = store
            .update_vendor(first.id, VendorForm::new(UserId::new(7), "Renamed").clean().unwrap())
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.created_at, first.created_at);
    }

    pub async fn brand_slug_is_globally_unique(store: &dyn CatalogStore) {
        let brand = store.create_brand(BrandForm::new("Acme").clean().unwrap()).await.unwrap();
        assert_eq!(brand.slug, "acme");
        assert!(brand.is_active);

        let err = store
            .create_brand(BrandForm::new("ACME").clean().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");
    }

    pub async fn products_are_listed_newest_first(store: &dyn CatalogStore) {
        let cat = category(store, "Games", None).await;
        let seller = vendor(store, 1).await;
        let first = product(store, cat.id, seller.id, "Chess").await;
        let second = product(store, cat.id, seller.id, "Go").await;
        let third = product(store, cat.id, seller.id, "Shogi").await;

        let ids: Vec<ProductId> = store.list_products().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    pub async fn image_variant_must_belong_to_the_product(store: &dyn CatalogStore) {
        let cat = category(store, "Bags", None).await;
        let seller = vendor(store, 1).await;
        let tote = product(store, cat.id, seller.id, "Tote").await;
        let pack = product(store, cat.id, seller.id, "Backpack").await;
        let pack_variant = store
            .create_variant(pack.id, VariantForm::default().clean().unwrap())
            .await
            .unwrap();

        let err = store
            .create_image(tote.id, ImageForm::new("x.jpg").for_variant(pack_variant.id).clean().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");
    }

    pub async fn missing_references_are_integrity_errors(store: &dyn CatalogStore) {
        let seller = vendor(store, 1).await;
        let form = product_form(CategoryId::new(999), seller.id, "Ghost", "1.00");
        let err = store.create_product(form.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

        let orphan = CategoryForm::new("Orphan").with_parent(CategoryId::new(999));
        let err = store.create_category(orphan.clean().unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

        let err = store
            .create_attribute(AttributeForm::new("Size").with_categories([CategoryId::new(999)]).clean().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

        let err = store
            .create_variant(ProductId::new(999), VariantForm::default().clean().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "product", id: 999 }), "{err:?}");
    }

    pub async fn inline_children_are_scoped_to_their_parent(store: &dyn CatalogStore) {
        let color = store.create_attribute(AttributeForm::new("Color").clean().unwrap()).await.unwrap();
        let size = store.create_attribute(AttributeForm::new("Size").clean().unwrap()).await.unwrap();
        let red = store
            .create_attribute_value(color.id, AttributeValueForm::new("Red").clean().unwrap())
            .await
            .unwrap();

        let err = store
            .update_attribute_value(size.id, red.id, AttributeValueForm::new("Blue").clean().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
        assert!(matches!(
            store.delete_attribute_value(size.id, red.id).await,
            Err(StoreError::NotFound { .. })
        ));

        assert_eq!(store.list_attribute_values(Some(color.id)).await.unwrap().len(), 1);
        assert!(store.list_attribute_values(Some(size.id)).await.unwrap().is_empty());

        store.delete_attribute(color.id).await.unwrap();
        assert!(store.list_attribute_values(None).await.unwrap().is_empty());
    }

    pub async fn deleting_an_attribute_value_unlinks_variants(store: &dyn CatalogStore) {
        let cat = category(store, "Shirts", None).await;
        let seller = vendor(store, 1).await;
        let shirt = product(store, cat.id, seller.id, "Polo").await;
        let color = store.create_attribute(AttributeForm::new("Color").clean().unwrap()).await.unwrap();
        let red = store
            .create_attribute_value(color.id, AttributeValueForm::new("Red").clean().unwrap())
            .await
            .unwrap();
        let blue = store
            .create_attribute_value(color.id, AttributeValueForm::new("Blue").clean().unwrap())
            .await
            .unwrap();
        let variant = store
            .create_variant(shirt.id, VariantForm::new([blue.id, red.id]).clean().unwrap())
            .await
            .unwrap();
        assert_eq!(variant.attribute_value_ids, vec![red.id, blue.id]);

        store.delete_attribute_value(color.id, red.id).await.unwrap();

        let variants = store.list_variants(shirt.id).await.unwrap();
        assert_eq!(variants[0].attribute_value_ids, vec![blue.id]);
    }

    pub async fn variant_price_and_label_are_derived(store: &dyn CatalogStore) {
        let cat = category(store, "Shirts", None).await;
        let seller = vendor(store, 1).await;
        let shirt = store
            .create_product(
                product_form(cat.id, seller.id, "Oxford", "50.00")
                    .with_discount(10)
                    .clean()
                    .unwrap(),
            )
            .await
            .unwrap();
        let color = store.create_attribute(AttributeForm::new("Color").clean().unwrap()).await.unwrap();
        let size = store.create_attribute(AttributeForm::new("Size").clean().unwrap()).await.unwrap();
        let white = store
            .create_attribute_value(color.id, AttributeValueForm::new("White").clean().unwrap())
            .await
            .unwrap();
        let large = store
            .create_attribute_value(size.id, AttributeValueForm::new("L").clean().unwrap())
            .await
            .unwrap();

        let variant = store
            .create_variant(
                shirt.id,
                VariantForm::new([white.id, large.id])
                    .with_price_delta(dec("2.50"))
                    .clean()
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(variant.effective_price(&shirt), dec("47.50"));

        let attributes = store.list_attributes().await.unwrap();
        let values = store.list_attribute_values(None).await.unwrap();
        let label = variant.label(|id| {
            let value = values.iter().find(|v| v.id == id)?;
            let attribute = attributes.iter().find(|a| a.id == value.attribute_id)?;
            Some(value.display_with(attribute))
        });
        assert_eq!(label, "Color: White, Size: L");
    }
}
