//! Manual stock operations

use crate::clock::Clock;
use crate::repository::{ProductRepository, StockMovementRepository};
use crate::stock::ledger;
use crate::tenancy::LocalContext;
use crate::utils::validation::{MAX_REASON_LEN, validate_optional_text};
use shared::error::{DomainError, DomainResult};
use shared::models::{Product, StockMovement, StockMovementKind};
use std::sync::Arc;
use uuid::Uuid;

pub struct StockService {
    products: Arc<dyn ProductRepository>,
    stock_movements: Arc<dyn StockMovementRepository>,
    clock: Arc<dyn Clock>,
    local: Arc<dyn LocalContext>,
}

impl StockService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        stock_movements: Arc<dyn StockMovementRepository>,
        clock: Arc<dyn Clock>,
        local: Arc<dyn LocalContext>,
    ) -> Self {
        Self {
            products,
            stock_movements,
            clock,
            local,
        }
    }

    /// Manual adjustment or goods receipt. Adjusting an untracked product
    /// activates tracking in the same write.
    pub async fn adjust(
        &self,
        product_id: Uuid,
        quantity: i64,
        kind: StockMovementKind,
        reason: Option<String>,
    ) -> DomainResult<Product> {
        let local_id = self.local.current_local_id();
        validate_optional_text("reason", &reason, MAX_REASON_LEN)?;

        let product = self
            .products
            .find_by_id_and_local(product_id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", product_id))?;

        let outcome = ledger::manual_adjust(product, quantity, kind, reason, self.clock.now())?;
        self.products.save_all(outcome.products.clone()).await?;
        self.stock_movements.save_all(outcome.movements).await?;

        let updated = outcome.products.into_iter().next().ok_or_else(|| {
            DomainError::internal("stock adjustment produced no product update")
        })?;
        tracing::info!(
            product = %updated.name,
            stock = updated.current_stock,
            "stock adjusted"
        );
        Ok(updated)
    }

    /// Movement history of a product, newest first
    pub async fn movements(&self, product_id: Uuid) -> DomainResult<Vec<StockMovement>> {
        let local_id = self.local.current_local_id();
        self.products
            .find_by_id_and_local(product_id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", product_id))?;
        Ok(self
            .stock_movements
            .list_by_product_and_local_desc(product_id, local_id)
            .await?)
    }
}
