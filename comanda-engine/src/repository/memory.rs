//! In-memory reference implementations of the repository contracts
//!
//! Backed by `DashMap`, tenancy-enforcing, with atomic per-local counters
//! for order and receipt numbers. They serve the test suite and
//! single-process deployments; a database-backed implementation replaces
//! them without touching the engine.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use shared::models::{
    CashJournal, CashMovement, Category, DiningTable, Order, OrderState, Product, Promotion,
    PromotionState, StockMovement,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    CashJournalRepository, CashMovementRepository, CategoryRepository, OrderRepository,
    ProductRepository, PromotionRepository, RepoError, RepoResult, StockMovementRepository,
    TableRepository,
};

/// Dining tables, keyed by id
#[derive(Clone, Default)]
pub struct InMemoryTableRepository {
    tables: Arc<DashMap<Uuid, DiningTable>>,
}

impl InMemoryTableRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableRepository for InMemoryTableRepository {
    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<DiningTable>> {
        let mut tables: Vec<DiningTable> = self
            .tables
            .iter()
            .filter(|e| e.value().local_id == local_id)
            .map(|e| e.value().clone())
            .collect();
        tables.sort_by_key(|t| t.number);
        Ok(tables)
    }

    async fn find_by_id(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<DiningTable>> {
        Ok(self
            .tables
            .get(&id)
            .filter(|t| t.local_id == local_id)
            .map(|t| t.clone()))
    }

    async fn exists_by_number_and_local(&self, number: i32, local_id: Uuid) -> RepoResult<bool> {
        Ok(self
            .tables
            .iter()
            .any(|e| e.value().local_id == local_id && e.value().number == number))
    }

    async fn save(&self, table: DiningTable) -> RepoResult<DiningTable> {
        self.tables.insert(table.id, table.clone());
        Ok(table)
    }

    async fn delete(&self, id: Uuid, local_id: Uuid) -> RepoResult<()> {
        let existed = self
            .tables
            .remove_if(&id, |_, t| t.local_id == local_id)
            .is_some();
        if existed {
            Ok(())
        } else {
            Err(RepoError::not_found("table", id))
        }
    }
}

/// Products, keyed by id
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<DashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Product>> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn find_by_id_and_local(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<Product>> {
        Ok(self
            .products
            .get(&id)
            .filter(|p| p.local_id == local_id)
            .map(|p| p.clone()))
    }

    async fn exists_by_name_and_local(&self, name: &str, local_id: Uuid) -> RepoResult<bool> {
        let lowered = name.trim().to_lowercase();
        Ok(self.products.iter().any(|e| {
            e.value().local_id == local_id && e.value().name.trim().to_lowercase() == lowered
        }))
    }

    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|e| e.value().local_id == local_id)
            .map(|e| e.value().clone())
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn list_by_group(&self, group_id: Uuid, local_id: Uuid) -> RepoResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|e| {
                e.value().local_id == local_id && e.value().variant_group_id == Some(group_id)
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_structural_modifier_ids(&self, local_id: Uuid) -> RepoResult<Vec<Uuid>> {
        Ok(self
            .products
            .iter()
            .filter(|e| e.value().local_id == local_id && e.value().is_structural_modifier)
            .map(|e| e.value().id)
            .collect())
    }

    async fn save(&self, product: Product) -> RepoResult<Product> {
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn save_all(&self, products: Vec<Product>) -> RepoResult<()> {
        for product in products {
            self.products.insert(product.id, product);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, local_id: Uuid) -> RepoResult<()> {
        let existed = self
            .products
            .remove_if(&id, |_, p| p.local_id == local_id)
            .is_some();
        if existed {
            Ok(())
        } else {
            Err(RepoError::not_found("product", id))
        }
    }
}

/// Categories, keyed by id
#[derive(Clone, Default)]
pub struct InMemoryCategoryRepository {
    categories: Arc<DashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<Category>> {
        Ok(self
            .categories
            .get(&id)
            .filter(|c| c.local_id == local_id)
            .map(|c| c.clone()))
    }

    async fn exists_by_name_and_local(&self, name: &str, local_id: Uuid) -> RepoResult<bool> {
        let lowered = name.trim().to_lowercase();
        Ok(self.categories.iter().any(|e| {
            e.value().local_id == local_id && e.value().name.trim().to_lowercase() == lowered
        }))
    }

    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .categories
            .iter()
            .filter(|e| e.value().local_id == local_id)
            .map(|e| e.value().clone())
            .collect();
        categories.sort_by_key(|c| c.sort_order);
        Ok(categories)
    }

    async fn save(&self, category: Category) -> RepoResult<Category> {
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid, local_id: Uuid) -> RepoResult<()> {
        let existed = self
            .categories
            .remove_if(&id, |_, c| c.local_id == local_id)
            .is_some();
        if existed {
            Ok(())
        } else {
            Err(RepoError::not_found("category", id))
        }
    }
}

/// Promotions, keyed by id
#[derive(Clone, Default)]
pub struct InMemoryPromotionRepository {
    promotions: Arc<DashMap<Uuid, Promotion>>,
}

impl InMemoryPromotionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PromotionRepository for InMemoryPromotionRepository {
    async fn find_by_id_and_local(
        &self,
        id: Uuid,
        local_id: Uuid,
    ) -> RepoResult<Option<Promotion>> {
        Ok(self
            .promotions
            .get(&id)
            .filter(|p| p.local_id == local_id)
            .map(|p| p.clone()))
    }

    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Promotion>> {
        let mut promotions: Vec<Promotion> = self
            .promotions
            .iter()
            .filter(|e| e.value().local_id == local_id)
            .map(|e| e.value().clone())
            .collect();
        promotions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(promotions)
    }

    async fn list_active_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Promotion>> {
        Ok(self
            .promotions
            .iter()
            .filter(|e| {
                e.value().local_id == local_id && e.value().state == PromotionState::Active
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn exists_by_name_and_local(&self, name: &str, local_id: Uuid) -> RepoResult<bool> {
        let lowered = name.trim().to_lowercase();
        Ok(self.promotions.iter().any(|e| {
            e.value().local_id == local_id && e.value().name.trim().to_lowercase() == lowered
        }))
    }

    async fn save(&self, promotion: Promotion) -> RepoResult<Promotion> {
        self.promotions.insert(promotion.id, promotion.clone());
        Ok(promotion)
    }
}

/// Orders, keyed by id, with per-local number sequences
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<DashMap<Uuid, Order>>,
    sequences: Arc<DashMap<Uuid, i64>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> RepoResult<Order> {
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<Order>> {
        Ok(self
            .orders
            .get(&id)
            .filter(|o| o.local_id == local_id)
            .map(|o| o.clone()))
    }

    async fn find_open_by_table(
        &self,
        table_id: Uuid,
        local_id: Uuid,
    ) -> RepoResult<Option<Order>> {
        Ok(self
            .orders
            .iter()
            .find(|e| {
                let o = e.value();
                o.local_id == local_id && o.table_id == table_id && o.state == OrderState::Open
            })
            .map(|e| e.value().clone()))
    }

    async fn find_by_table_and_state(
        &self,
        table_id: Uuid,
        state: OrderState,
        local_id: Uuid,
    ) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|e| {
                let o = e.value();
                o.local_id == local_id && o.table_id == table_id && o.state == state
            })
            .map(|e| e.value().clone())
            .collect();
        orders.sort_by_key(|o| o.number);
        Ok(orders)
    }

    async fn next_order_number(&self, local_id: Uuid) -> RepoResult<i64> {
        // DashMap entry holds the shard lock, making max+1 atomic per local
        let mut entry = self.sequences.entry(local_id).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn list_closed_in_window(
        &self,
        local_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|e| {
                let o = e.value();
                o.local_id == local_id
                    && o.state == OrderState::Closed
                    && o.closed_at.is_some_and(|at| at >= from && at < to)
            })
            .map(|e| e.value().clone())
            .collect();
        orders.sort_by_key(|o| o.closed_at);
        Ok(orders)
    }

    async fn list_open_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Order>> {
        Ok(self
            .orders
            .iter()
            .filter(|e| e.value().local_id == local_id && e.value().state == OrderState::Open)
            .map(|e| e.value().clone())
            .collect())
    }
}

/// Cash movements, append-only, with per-local receipt sequences
#[derive(Clone, Default)]
pub struct InMemoryCashMovementRepository {
    movements: Arc<DashMap<Uuid, CashMovement>>,
    sequences: Arc<DashMap<Uuid, i64>>,
}

impl InMemoryCashMovementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CashMovementRepository for InMemoryCashMovementRepository {
    async fn save(&self, movement: CashMovement) -> RepoResult<CashMovement> {
        self.movements.insert(movement.id, movement.clone());
        Ok(movement)
    }

    async fn list_by_local_in_window(
        &self,
        local_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<Vec<CashMovement>> {
        let mut movements: Vec<CashMovement> = self
            .movements
            .iter()
            .filter(|e| {
                let m = e.value();
                m.local_id == local_id && m.at >= from && m.at < to
            })
            .map(|e| e.value().clone())
            .collect();
        movements.sort_by_key(|m| m.at);
        Ok(movements)
    }

    async fn next_receipt_number(&self, local_id: Uuid) -> RepoResult<i64> {
        let mut entry = self.sequences.entry(local_id).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }
}

/// Stock movements, append-only
#[derive(Clone, Default)]
pub struct InMemoryStockMovementRepository {
    movements: Arc<DashMap<Uuid, StockMovement>>,
}

impl InMemoryStockMovementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockMovementRepository for InMemoryStockMovementRepository {
    async fn save(&self, movement: StockMovement) -> RepoResult<StockMovement> {
        self.movements.insert(movement.id, movement.clone());
        Ok(movement)
    }

    async fn save_all(&self, movements: Vec<StockMovement>) -> RepoResult<()> {
        for movement in movements {
            self.movements.insert(movement.id, movement);
        }
        Ok(())
    }

    async fn list_by_product_and_local_desc(
        &self,
        product_id: Uuid,
        local_id: Uuid,
    ) -> RepoResult<Vec<StockMovement>> {
        let mut movements: Vec<StockMovement> = self
            .movements
            .iter()
            .filter(|e| e.value().product_id == product_id && e.value().local_id == local_id)
            .map(|e| e.value().clone())
            .collect();
        movements.sort_by(|a, b| b.at.cmp(&a.at));
        Ok(movements)
    }
}

/// Cash journals; insertion enforces the one-per-(local, date) constraint
#[derive(Clone, Default)]
pub struct InMemoryCashJournalRepository {
    journals: Arc<DashMap<Uuid, CashJournal>>,
    // Serializes the exists-then-insert window
    write_lock: Arc<parking_lot::Mutex<()>>,
}

impl InMemoryCashJournalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CashJournalRepository for InMemoryCashJournalRepository {
    async fn save(&self, journal: CashJournal) -> RepoResult<CashJournal> {
        let _guard = self.write_lock.lock();
        let duplicate = self.journals.iter().any(|e| {
            e.value().local_id == journal.local_id
                && e.value().operative_date == journal.operative_date
        });
        if duplicate {
            return Err(RepoError::Duplicate(format!(
                "cash journal for {} already exists",
                journal.operative_date
            )));
        }
        self.journals.insert(journal.id, journal.clone());
        Ok(journal)
    }

    async fn exists_for_local_and_date(
        &self,
        local_id: Uuid,
        operative_date: NaiveDate,
    ) -> RepoResult<bool> {
        Ok(self
            .journals
            .iter()
            .any(|e| e.value().local_id == local_id && e.value().operative_date == operative_date))
    }

    async fn list_by_local_in_date_range(
        &self,
        local_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<CashJournal>> {
        let mut journals: Vec<CashJournal> = self
            .journals
            .iter()
            .filter(|e| {
                let j = e.value();
                j.local_id == local_id && j.operative_date >= from && j.operative_date <= to
            })
            .map(|e| e.value().clone())
            .collect();
        journals.sort_by_key(|j| j.operative_date);
        Ok(journals)
    }
}
