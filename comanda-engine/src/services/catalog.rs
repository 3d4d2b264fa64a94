//! Catalog management: products and categories

use crate::repository::{CategoryRepository, ProductRepository};
use crate::tenancy::LocalContext;
use crate::utils::validation::{normalize_hex_color, validate_name, validate_positive_amount};
use shared::error::{DomainError, DomainResult};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};
use shared::util::new_id;
use std::sync::Arc;
use uuid::Uuid;

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    local: Arc<dyn LocalContext>,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        local: Arc<dyn LocalContext>,
    ) -> Self {
        Self {
            products,
            categories,
            local,
        }
    }

    async fn ensure_category_exists(&self, id: Uuid, local_id: Uuid) -> DomainResult<()> {
        self.categories
            .find_by_id(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))?;
        Ok(())
    }

    pub async fn create_product(&self, payload: ProductCreate) -> DomainResult<Product> {
        let local_id = self.local.current_local_id();
        validate_name("name", &payload.name)?;
        validate_positive_amount("price", payload.price)?;
        if let Some(count) = payload.structural_modifier_count {
            if count < 1 {
                return Err(DomainError::validation(
                    "structural_modifier_count",
                    "must be at least 1",
                ));
            }
        }
        if self
            .products
            .exists_by_name_and_local(&payload.name, local_id)
            .await?
        {
            return Err(DomainError::conflicting_name("product", payload.name));
        }
        if let Some(category_id) = payload.category_id {
            self.ensure_category_exists(category_id, local_id).await?;
        }

        let color = normalize_hex_color("color", payload.color)?;
        let stock_tracked = payload.stock_tracked.unwrap_or(false);
        let product = Product {
            id: new_id(),
            local_id,
            name: payload.name.trim().to_string(),
            price: payload.price,
            is_active: true,
            color,
            category_id: payload.category_id,
            variant_group_id: payload.variant_group_id,
            structural_modifier_count: payload.structural_modifier_count,
            is_extra: payload.is_extra.unwrap_or(false),
            is_structural_modifier: payload.is_structural_modifier.unwrap_or(false),
            admits_extras: payload.admits_extras.unwrap_or(false),
            requires_configuration: payload.requires_configuration.unwrap_or(false),
            stock_tracked,
            current_stock: if stock_tracked {
                payload.initial_stock.unwrap_or(0)
            } else {
                0
            },
        };

        let saved = self.products.save(product).await?;
        tracing::info!(product = %saved.name, "product created");
        Ok(saved)
    }

    pub async fn update_product(&self, id: Uuid, payload: ProductUpdate) -> DomainResult<Product> {
        let local_id = self.local.current_local_id();
        let mut product = self
            .products
            .find_by_id_and_local(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;

        if let Some(name) = payload.name {
            validate_name("name", &name)?;
            let renamed = name.trim().to_lowercase() != product.name.trim().to_lowercase();
            if renamed
                && self
                    .products
                    .exists_by_name_and_local(&name, local_id)
                    .await?
            {
                return Err(DomainError::conflicting_name("product", name));
            }
            product.name = name.trim().to_string();
        }
        if let Some(price) = payload.price {
            validate_positive_amount("price", price)?;
            product.price = price;
        }
        if let Some(color) = payload.color {
            product.color = normalize_hex_color("color", Some(color))?;
        }
        if let Some(count) = payload.structural_modifier_count {
            if count < 1 {
                return Err(DomainError::validation(
                    "structural_modifier_count",
                    "must be at least 1",
                ));
            }
            product.structural_modifier_count = Some(count);
        }
        if let Some(category_id) = payload.category_id {
            self.ensure_category_exists(category_id, local_id).await?;
            product.category_id = Some(category_id);
        }
        if let Some(group_id) = payload.variant_group_id {
            product.variant_group_id = Some(group_id);
        }
        if let Some(active) = payload.is_active {
            product.is_active = active;
        }
        if let Some(flag) = payload.is_extra {
            product.is_extra = flag;
        }
        if let Some(flag) = payload.is_structural_modifier {
            product.is_structural_modifier = flag;
        }
        if let Some(flag) = payload.admits_extras {
            product.admits_extras = flag;
        }
        if let Some(flag) = payload.requires_configuration {
            product.requires_configuration = flag;
        }

        Ok(self.products.save(product).await?)
    }

    /// Delete a product. Historical order lines are unaffected: they hold
    /// name and price snapshots and reference the product by id only.
    pub async fn delete_product(&self, id: Uuid) -> DomainResult<()> {
        let local_id = self.local.current_local_id();
        self.products
            .find_by_id_and_local(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        self.products.delete(id, local_id).await?;
        Ok(())
    }

    pub async fn list_products(&self) -> DomainResult<Vec<Product>> {
        let local_id = self.local.current_local_id();
        Ok(self.products.list_by_local(local_id).await?)
    }

    pub async fn structural_modifier_ids(&self) -> DomainResult<Vec<Uuid>> {
        let local_id = self.local.current_local_id();
        Ok(self.products.list_structural_modifier_ids(local_id).await?)
    }

    pub async fn create_category(&self, payload: CategoryCreate) -> DomainResult<Category> {
        let local_id = self.local.current_local_id();
        validate_name("name", &payload.name)?;
        if self
            .categories
            .exists_by_name_and_local(&payload.name, local_id)
            .await?
        {
            return Err(DomainError::conflicting_name("category", payload.name));
        }
        if let Some(modifier_category_id) = payload.modifier_category_id {
            self.ensure_category_exists(modifier_category_id, local_id)
                .await?;
        }

        let category = Category {
            id: new_id(),
            local_id,
            name: payload.name.trim().to_string(),
            color: normalize_hex_color("color", payload.color)?,
            admits_variants: payload.admits_variants.unwrap_or(false),
            is_extra_category: payload.is_extra_category.unwrap_or(false),
            sort_order: payload.sort_order.unwrap_or(0),
            modifier_category_id: payload.modifier_category_id,
        };
        Ok(self.categories.save(category).await?)
    }

    pub async fn update_category(&self, id: Uuid, payload: CategoryUpdate) -> DomainResult<Category> {
        let local_id = self.local.current_local_id();
        let mut category = self
            .categories
            .find_by_id(id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))?;

        if let Some(name) = payload.name {
            validate_name("name", &name)?;
            let renamed = name.trim().to_lowercase() != category.name.trim().to_lowercase();
            if renamed
                && self
                    .categories
                    .exists_by_name_and_local(&name, local_id)
                    .await?
            {
                return Err(DomainError::conflicting_name("category", name));
            }
            category.name = name.trim().to_string();
        }
        if let Some(color) = payload.color {
            category.color = normalize_hex_color("color", Some(color))?;
        }
        if let Some(flag) = payload.admits_variants {
            category.admits_variants = flag;
        }
        if let Some(flag) = payload.is_extra_category {
            category.is_extra_category = flag;
        }
        if let Some(sort_order) = payload.sort_order {
            category.sort_order = sort_order;
        }
        if let Some(modifier_category_id) = payload.modifier_category_id {
            self.ensure_category_exists(modifier_category_id, local_id)
                .await?;
            category.modifier_category_id = Some(modifier_category_id);
        }

        Ok(self.categories.save(category).await?)
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        let local_id = self.local.current_local_id();
        Ok(self.categories.list_by_local(local_id).await?)
    }
}
