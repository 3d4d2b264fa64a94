//! Stock ledger operations
//!
//! Each operation returns the updated products together with the movement
//! records; the caller persists both atomically. Stock may go negative:
//! the ledger never rejects overdraft, it only logs it.

use chrono::NaiveDateTime;
use shared::error::{DomainError, DomainResult};
use shared::models::{Order, Product, StockMovement, StockMovementKind};
use shared::util::new_id;
use std::collections::HashMap;
use uuid::Uuid;

/// Updated products plus the movements describing the change, persisted
/// together
#[derive(Debug, Clone, Default)]
pub struct LedgerOutcome {
    pub products: Vec<Product>,
    pub movements: Vec<StockMovement>,
}

fn movement(
    product: &Product,
    quantity: i64,
    kind: StockMovementKind,
    at: NaiveDateTime,
    reason: Option<String>,
) -> StockMovement {
    StockMovement {
        id: new_id(),
        product_id: product.id,
        local_id: product.local_id,
        quantity,
        kind,
        at,
        reason,
    }
}

fn apply_order(
    order: &Order,
    products_by_id: &HashMap<Uuid, Product>,
    kind: StockMovementKind,
    sign: i64,
    at: NaiveDateTime,
) -> LedgerOutcome {
    let mut updated: HashMap<Uuid, Product> = HashMap::new();
    let mut movements = Vec::new();

    for item in &order.items {
        // Deleted products are skipped; historical lines keep snapshots
        let Some(product) = updated
            .get(&item.product_id)
            .or_else(|| products_by_id.get(&item.product_id))
        else {
            continue;
        };
        if !product.stock_tracked {
            continue;
        }

        let mut product = product.clone();
        let signed_qty = sign * item.quantity as i64;
        product.current_stock += signed_qty;

        if product.current_stock < 0 {
            tracing::warn!(
                product = %product.name,
                stock = product.current_stock,
                "stock overdraft"
            );
        }

        movements.push(movement(&product, signed_qty, kind, at, None));
        updated.insert(product.id, product);
    }

    LedgerOutcome {
        products: updated.into_values().collect(),
        movements,
    }
}

/// Decrement stock for every tracked product sold on the order, emitting
/// SALE movements. Products missing from the map are skipped.
pub fn record_sale(
    order: &Order,
    products_by_id: &HashMap<Uuid, Product>,
    at: NaiveDateTime,
) -> LedgerOutcome {
    apply_order(order, products_by_id, StockMovementKind::Sale, -1, at)
}

/// Inverse of [`record_sale`], emitting REOPEN_ORDER movements.
pub fn revert_sale(
    order: &Order,
    products_by_id: &HashMap<Uuid, Product>,
    at: NaiveDateTime,
) -> LedgerOutcome {
    apply_order(order, products_by_id, StockMovementKind::ReopenOrder, 1, at)
}

/// Manual stock adjustment or goods receipt. Adjusting an untracked product
/// activates tracking as part of the same write.
pub fn manual_adjust(
    mut product: Product,
    quantity: i64,
    kind: StockMovementKind,
    reason: Option<String>,
    at: NaiveDateTime,
) -> DomainResult<LedgerOutcome> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity", "must be non-zero"));
    }
    if !matches!(
        kind,
        StockMovementKind::ManualAdjustment | StockMovementKind::GoodsReceipt
    ) {
        return Err(DomainError::validation(
            "kind",
            "must be MANUAL_ADJUSTMENT or GOODS_RECEIPT",
        ));
    }

    if !product.stock_tracked {
        product.stock_tracked = true;
    }
    product.current_stock += quantity;

    let record = movement(&product, quantity, kind, at, reason);
    Ok(LedgerOutcome {
        products: vec![product],
        movements: vec![record],
    })
}
