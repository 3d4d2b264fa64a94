//! Order lifecycle use cases
//!
//! Open table, add/modify/remove items, manual discounts, close with a
//! payment split, reopen, and correction of a closed order. Concurrent
//! operations against the same order serialize through a per-order lock;
//! distinct orders proceed in parallel.

use crate::clock::Clock;
use crate::orders::aggregate::{self, AddOutcome};
use crate::orders::ticket::{self, CustomerReceipt, KitchenSlip};
use crate::orders::totals;
use crate::pricing::{self, ActivePromotion, EvaluationContext};
use crate::repository::{
    OrderRepository, ProductRepository, PromotionRepository, StockMovementRepository,
    TableRepository,
};
use crate::stock::ledger;
use crate::tenancy::LocalContext;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_REASON_LEN, validate_optional_text};
use crate::variants::{NormalizeError, normalize};
use crate::money::round_money;
use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::error::{DomainError, DomainResult};
use shared::models::{
    DiningTable, DiscountMode, ExtraLine, ManualDiscount, Order, OrderItem, OrderState, Payment,
    PaymentMedium, Product, PromotionSnapshot, StockMovement, StockMovementKind, TableState,
};
use shared::util::new_id;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Add-item request
#[derive(Debug, Clone)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    pub observation: Option<String>,
    /// Extra product ids; duplicates allowed (e.g. two meat patties)
    pub extras: Vec<Uuid>,
}

/// One payment of a close split
#[derive(Debug, Clone)]
pub struct PaymentSplit {
    pub medium: PaymentMedium,
    pub amount: Decimal,
}

/// Manual discount request, at line or order level
#[derive(Debug, Clone)]
pub struct DiscountRequest {
    pub mode: DiscountMode,
    pub value: Decimal,
    pub reason: String,
    pub user_id: Uuid,
}

/// Quantity change inside a closed-order correction
#[derive(Debug, Clone)]
pub struct QuantityCorrection {
    pub item_id: Uuid,
    pub quantity: u32,
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    tables: Arc<dyn TableRepository>,
    products: Arc<dyn ProductRepository>,
    promotions: Arc<dyn PromotionRepository>,
    stock_movements: Arc<dyn StockMovementRepository>,
    clock: Arc<dyn Clock>,
    local: Arc<dyn LocalContext>,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        tables: Arc<dyn TableRepository>,
        products: Arc<dyn ProductRepository>,
        promotions: Arc<dyn PromotionRepository>,
        stock_movements: Arc<dyn StockMovementRepository>,
        clock: Arc<dyn Clock>,
        local: Arc<dyn LocalContext>,
    ) -> Self {
        Self {
            orders,
            tables,
            products,
            promotions,
            stock_movements,
            clock,
            local,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, order_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_order(&self, order_id: Uuid, local_id: Uuid) -> DomainResult<Order> {
        self.orders
            .find_by_id(order_id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("order", order_id))
    }

    async fn load_table(&self, table_id: Uuid, local_id: Uuid) -> DomainResult<DiningTable> {
        self.tables
            .find_by_id(table_id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("table", table_id))
    }

    /// Active promotions with their scopes resolved against the catalog
    async fn active_promotions(&self, local_id: Uuid) -> DomainResult<Vec<ActivePromotion>> {
        let catalog = self.products.list_by_local(local_id).await?;
        let promotions = self.promotions.list_active_by_local(local_id).await?;
        Ok(pricing::build_active(promotions, &catalog))
    }

    /// Products referenced by the order's items, for the stock ledger
    async fn products_for_order(
        &self,
        order: &Order,
        local_id: Uuid,
    ) -> DomainResult<HashMap<Uuid, Product>> {
        let mut map = HashMap::new();
        for item in &order.items {
            if map.contains_key(&item.product_id) {
                continue;
            }
            if let Some(product) = self
                .products
                .find_by_id_and_local(item.product_id, local_id)
                .await?
            {
                map.insert(product.id, product);
            }
        }
        Ok(map)
    }

    /// Orders of a table in a given state, e.g. the closed orders an
    /// operator picks from when reopening or correcting one
    pub async fn orders_for_table(
        &self,
        table_id: Uuid,
        state: OrderState,
    ) -> DomainResult<Vec<Order>> {
        let local_id = self.local.current_local_id();
        self.load_table(table_id, local_id).await?;
        Ok(self
            .orders
            .find_by_table_and_state(table_id, state, local_id)
            .await?)
    }

    /// Open a table: a fresh OPEN order with the next per-local number
    pub async fn open_table(&self, table_id: Uuid) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let mut table = self.load_table(table_id, local_id).await?;

        if self
            .orders
            .find_open_by_table(table_id, local_id)
            .await?
            .is_some()
        {
            return Err(DomainError::validation(
                "table",
                "table already has an open order",
            ));
        }

        let number = self.orders.next_order_number(local_id).await?;
        let order = Order::open(new_id(), local_id, table_id, number, self.clock.now());
        let saved = self.orders.save(order).await?;

        table.state = TableState::Open;
        self.tables.save(table).await?;

        tracing::info!(order = %saved.id, number = saved.number, "table opened");
        Ok(saved)
    }

    /// Add an item: variant normalization, promotion evaluation, then
    /// merge-or-append on the aggregate.
    pub async fn add_item(&self, order_id: Uuid, request: AddItemRequest) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        aggregate::ensure_open(&order)?;

        if request.quantity == 0 {
            return Err(DomainError::validation("quantity", "must be at least 1"));
        }
        validate_optional_text("observation", &request.observation, MAX_NOTE_LEN)?;

        let product = self
            .products
            .find_by_id_and_local(request.product_id, local_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", request.product_id))?;
        if !product.is_active {
            return Err(DomainError::validation("product", "product is not active"));
        }
        if product.is_extra {
            return Err(DomainError::validation(
                "product",
                "an extra cannot be sold on its own",
            ));
        }
        if !request.extras.is_empty() && !product.admits_extras {
            return Err(DomainError::validation(
                "extras",
                "product does not admit extras",
            ));
        }

        // Variant normalization: structural modifiers among the extras may
        // upgrade the selected variant
        let structural: HashSet<Uuid> = self
            .products
            .list_structural_modifier_ids(local_id)
            .await?
            .into_iter()
            .collect();
        let siblings = match product.variant_group_id {
            Some(group_id) => self.products.list_by_group(group_id, local_id).await?,
            None => Vec::new(),
        };
        let normalized = normalize(product, request.extras, &siblings, &structural)
            .map_err(|NormalizeError::NoUpgradePath(name)| {
                DomainError::StructuralExtraNotAllowed(name)
            })?;
        if normalized.converted {
            tracing::info!(variant = %normalized.product.name, "variant upgraded by structural extras");
        }

        // Snapshot the surviving extras
        let mut extras = Vec::with_capacity(normalized.extras.len());
        for extra_id in &normalized.extras {
            let extra = self
                .products
                .find_by_id_and_local(*extra_id, local_id)
                .await?
                .ok_or_else(|| DomainError::not_found("product", *extra_id))?;
            if !extra.is_extra {
                return Err(DomainError::validation(
                    "extras",
                    format!("'{}' is not an extra", extra.name),
                ));
            }
            extras.push(ExtraLine {
                product_id: extra.id,
                name: extra.name,
                price: extra.price,
            });
        }

        let mut candidate = OrderItem {
            id: new_id(),
            product_id: normalized.product.id,
            product_name: normalized.product.name.clone(),
            quantity: request.quantity,
            unit_price: normalized.product.price,
            observation: request.observation,
            extras,
            promotion: PromotionSnapshot::none(),
            line_discount: None,
        };

        // Add-time promotion evaluation over the order as it will stand
        let now = self.clock.now();
        let active = self.active_promotions(local_id).await?;
        let ctx = EvaluationContext::from_order_with_candidate(&order, &candidate, now);
        let view: Vec<&OrderItem> = order
            .items
            .iter()
            .chain(std::iter::once(&candidate))
            .collect();
        let snapshot = pricing::evaluate_line(
            &view,
            candidate.product_id,
            candidate.unit_price,
            candidate.quantity,
            candidate.has_extras(),
            &active,
            &ctx,
        );
        drop(view);
        candidate.promotion = snapshot;

        let outcome = aggregate::add_item(&mut order, candidate)?;
        if matches!(outcome, AddOutcome::Merged(_)) {
            // Merged quantities can change bundle cycles; redistribute
            let ctx = EvaluationContext::from_order(&order, now);
            pricing::recompute_order(&mut order, &active, &ctx);
        }

        Ok(self.orders.save(order).await?)
    }

    /// Change a line's quantity and recompute every promotion snapshot
    pub async fn modify_quantity(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        quantity: u32,
    ) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        aggregate::modify_quantity(&mut order, item_id, quantity)?;

        let active = self.active_promotions(local_id).await?;
        let ctx = EvaluationContext::from_order(&order, self.clock.now());
        pricing::recompute_order(&mut order, &active, &ctx);

        Ok(self.orders.save(order).await?)
    }

    /// Remove a line and recompute every promotion snapshot
    pub async fn remove_item(&self, order_id: Uuid, item_id: Uuid) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        aggregate::remove_item(&mut order, item_id)?;

        let active = self.active_promotions(local_id).await?;
        let ctx = EvaluationContext::from_order(&order, self.clock.now());
        pricing::recompute_order(&mut order, &active, &ctx);

        Ok(self.orders.save(order).await?)
    }

    fn manual_discount(&self, request: DiscountRequest) -> DomainResult<ManualDiscount> {
        validate_optional_text("reason", &Some(request.reason.clone()), MAX_REASON_LEN)?;
        Ok(ManualDiscount {
            mode: request.mode,
            value: request.value,
            reason: request.reason,
            user_id: request.user_id,
            applied_at: self.clock.now(),
        })
    }

    pub async fn apply_line_discount(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        request: DiscountRequest,
    ) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        let discount = self.manual_discount(request)?;
        aggregate::apply_line_discount(&mut order, item_id, discount)?;

        Ok(self.orders.save(order).await?)
    }

    pub async fn apply_global_discount(
        &self,
        order_id: Uuid,
        request: DiscountRequest,
    ) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        let discount = self.manual_discount(request)?;
        aggregate::apply_global_discount(&mut order, discount)?;

        Ok(self.orders.save(order).await?)
    }

    /// Close the order: exact payment split, frozen snapshot, stock
    /// decrements, table freed.
    pub async fn close_table(
        &self,
        order_id: Uuid,
        payments: Vec<PaymentSplit>,
    ) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        let now = self.clock.now();
        let payments: Vec<Payment> = payments
            .into_iter()
            .map(|split| Payment {
                medium: split.medium,
                amount: split.amount,
                paid_at: now,
            })
            .collect();
        aggregate::close(&mut order, payments, now)?;

        let products = self.products_for_order(&order, local_id).await?;
        let outcome = ledger::record_sale(&order, &products, now);
        self.products.save_all(outcome.products).await?;
        self.stock_movements.save_all(outcome.movements).await?;

        let mut table = self.load_table(order.table_id, local_id).await?;
        table.state = TableState::Free;
        self.tables.save(table).await?;

        let saved = self.orders.save(order).await?;
        tracing::info!(
            order = %saved.id,
            total = %saved.totals.as_ref().map(|t| t.final_total).unwrap_or_default(),
            "order closed"
        );
        Ok(saved)
    }

    /// Reopen a closed order: payments and snapshot cleared, stock
    /// restored, table re-occupied.
    pub async fn reopen(&self, order_id: Uuid) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        if order.state != OrderState::Closed {
            return Err(DomainError::validation("state", "order is not closed"));
        }
        if self
            .orders
            .find_open_by_table(order.table_id, local_id)
            .await?
            .is_some()
        {
            return Err(DomainError::validation(
                "table",
                "table already has an open order",
            ));
        }

        aggregate::reopen(&mut order)?;

        let now = self.clock.now();
        let products = self.products_for_order(&order, local_id).await?;
        let outcome = ledger::revert_sale(&order, &products, now);
        self.products.save_all(outcome.products).await?;
        self.stock_movements.save_all(outcome.movements).await?;

        let mut table = self.load_table(order.table_id, local_id).await?;
        table.state = TableState::Open;
        self.tables.save(table).await?;

        let saved = self.orders.save(order).await?;
        tracing::info!(order = %saved.id, "order reopened");
        Ok(saved)
    }

    /// Correct a CLOSED order without reopening it: adjust quantities,
    /// re-run promotions pinned at the original closing time, replace the
    /// payment split, re-freeze the snapshot, and record the stock delta.
    pub async fn correct_closed(
        &self,
        order_id: Uuid,
        corrections: Vec<QuantityCorrection>,
        payments: Vec<PaymentSplit>,
    ) -> DomainResult<Order> {
        let local_id = self.local.current_local_id();
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self.load_order(order_id, local_id).await?;
        if order.state != OrderState::Closed {
            return Err(DomainError::validation("state", "order is not closed"));
        }
        let closed_at = order
            .closed_at
            .ok_or_else(|| DomainError::internal("closed order without closing time"))?;

        let before: HashMap<Uuid, u32> =
            order.items.iter().map(|i| (i.id, i.quantity)).collect();

        for correction in &corrections {
            if correction.quantity == 0 {
                return Err(DomainError::validation("quantity", "must be at least 1"));
            }
            let item = order
                .item_mut(correction.item_id)
                .ok_or_else(|| DomainError::not_found("order item", correction.item_id))?;
            item.quantity = correction.quantity;
        }

        // Promotions re-evaluate as of the original close, not of today
        let active = self.active_promotions(local_id).await?;
        let ctx = EvaluationContext::from_order(&order, closed_at);
        pricing::recompute_order(&mut order, &active, &ctx);

        if payments.is_empty() {
            return Err(DomainError::validation("payments", "must not be empty"));
        }
        for split in &payments {
            if split.amount <= Decimal::ZERO {
                return Err(DomainError::validation(
                    "payments",
                    "every amount must be positive",
                ));
            }
        }
        let computed = totals::compute_totals(&order);
        let given = round_money(payments.iter().map(|p| p.amount).sum());
        if given != computed.final_total {
            return Err(DomainError::PaymentMismatch {
                expected: computed.final_total,
                given,
            });
        }
        order.payments = payments
            .into_iter()
            .map(|split| Payment {
                medium: split.medium,
                amount: split.amount,
                paid_at: closed_at,
            })
            .collect();
        order.totals = Some(totals::freeze(&order));

        // Stock delta: extra units sold leave as SALE, returned units come
        // back as REOPEN_ORDER
        let now = self.clock.now();
        let mut changed_products = Vec::new();
        let mut movements = Vec::new();
        let mut working: HashMap<Uuid, Product> =
            self.products_for_order(&order, local_id).await?;
        for item in &order.items {
            let Some(old_qty) = before.get(&item.id) else {
                continue;
            };
            let delta = item.quantity as i64 - *old_qty as i64;
            if delta == 0 {
                continue;
            }
            let Some(product) = working.get_mut(&item.product_id) else {
                continue;
            };
            if !product.stock_tracked {
                continue;
            }
            product.current_stock -= delta;
            let (kind, signed) = if delta > 0 {
                (StockMovementKind::Sale, -delta)
            } else {
                (StockMovementKind::ReopenOrder, -delta)
            };
            movements.push(StockMovement {
                id: new_id(),
                product_id: product.id,
                local_id,
                quantity: signed,
                kind,
                at: now,
                reason: Some("order correction".to_string()),
            });
            changed_products.push(product.clone());
        }
        self.products.save_all(changed_products).await?;
        self.stock_movements.save_all(movements).await?;

        let saved = self.orders.save(order).await?;
        tracing::info!(order = %saved.id, "closed order corrected");
        Ok(saved)
    }

    pub async fn kitchen_slip(&self, order_id: Uuid) -> DomainResult<KitchenSlip> {
        let local_id = self.local.current_local_id();
        let order = self.load_order(order_id, local_id).await?;
        let table = self.load_table(order.table_id, local_id).await?;
        Ok(ticket::kitchen_slip(&order, &table))
    }

    pub async fn customer_receipt(&self, order_id: Uuid) -> DomainResult<CustomerReceipt> {
        let local_id = self.local.current_local_id();
        let order = self.load_order(order_id, local_id).await?;
        let table = self.load_table(order.table_id, local_id).await?;
        Ok(ticket::customer_receipt(&order, &table))
    }
}
