//! Repository contracts
//!
//! Abstract persistent lookup and storage of aggregates. The engine only
//! ever talks to these traits; the persistence technology behind them is a
//! deployment choice. Every operation is scoped by `local_id` and
//! implementations must not leak data across locals.
//!
//! Implementations are expected to execute each engine use case within one
//! serializable (or at minimum repeatable-read) transaction; on conflict or
//! deadline expiry they return [`RepoError::Storage`], surfaced upward as
//! `Transient`.

pub mod memory;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use shared::error::DomainError;
use shared::models::{
    CashJournal, CashMovement, Category, DiningTable, Order, OrderState, Product, Promotion,
    StockMovement,
};
use thiserror::Error;
use uuid::Uuid;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RepoError {
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { kind, id } => DomainError::NotFound { kind, id },
            // Constraint races; the services check uniqueness up front, so
            // a duplicate here means a concurrent writer won.
            RepoError::Duplicate(msg) => DomainError::Internal(msg),
            RepoError::Storage(msg) => DomainError::Internal(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Dining tables
#[async_trait]
pub trait TableRepository: Send + Sync {
    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<DiningTable>>;
    async fn find_by_id(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<DiningTable>>;
    async fn exists_by_number_and_local(&self, number: i32, local_id: Uuid) -> RepoResult<bool>;
    async fn save(&self, table: DiningTable) -> RepoResult<DiningTable>;
    async fn delete(&self, id: Uuid, local_id: Uuid) -> RepoResult<()>;
}

/// Products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Product>>;
    async fn find_by_id_and_local(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<Product>>;
    /// Case-insensitive name uniqueness check
    async fn exists_by_name_and_local(&self, name: &str, local_id: Uuid) -> RepoResult<bool>;
    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Product>>;
    /// All variants sharing a variant group
    async fn list_by_group(&self, group_id: Uuid, local_id: Uuid) -> RepoResult<Vec<Product>>;
    /// Ids of products flagged as structural modifiers
    async fn list_structural_modifier_ids(&self, local_id: Uuid) -> RepoResult<Vec<Uuid>>;
    async fn save(&self, product: Product) -> RepoResult<Product>;
    /// Persist several products atomically (stock ledger output)
    async fn save_all(&self, products: Vec<Product>) -> RepoResult<()>;
    async fn delete(&self, id: Uuid, local_id: Uuid) -> RepoResult<()>;
}

/// Categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<Category>>;
    async fn exists_by_name_and_local(&self, name: &str, local_id: Uuid) -> RepoResult<bool>;
    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Category>>;
    async fn save(&self, category: Category) -> RepoResult<Category>;
    async fn delete(&self, id: Uuid, local_id: Uuid) -> RepoResult<()>;
}

/// Promotions
#[async_trait]
pub trait PromotionRepository: Send + Sync {
    async fn find_by_id_and_local(&self, id: Uuid, local_id: Uuid)
    -> RepoResult<Option<Promotion>>;
    async fn list_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Promotion>>;
    async fn list_active_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Promotion>>;
    async fn exists_by_name_and_local(&self, name: &str, local_id: Uuid) -> RepoResult<bool>;
    async fn save(&self, promotion: Promotion) -> RepoResult<Promotion>;
}

/// Orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order: Order) -> RepoResult<Order>;
    async fn find_by_id(&self, id: Uuid, local_id: Uuid) -> RepoResult<Option<Order>>;
    async fn find_open_by_table(&self, table_id: Uuid, local_id: Uuid)
    -> RepoResult<Option<Order>>;
    async fn find_by_table_and_state(
        &self,
        table_id: Uuid,
        state: OrderState,
        local_id: Uuid,
    ) -> RepoResult<Vec<Order>>;
    /// Monotonic per-local order number; atomic under concurrency
    async fn next_order_number(&self, local_id: Uuid) -> RepoResult<i64>;
    /// Orders with `closed_at` in `[from, to)`
    async fn list_closed_in_window(
        &self,
        local_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<Vec<Order>>;
    async fn list_open_by_local(&self, local_id: Uuid) -> RepoResult<Vec<Order>>;
}

/// Cash movements
#[async_trait]
pub trait CashMovementRepository: Send + Sync {
    async fn save(&self, movement: CashMovement) -> RepoResult<CashMovement>;
    /// Movements with `at` in `[from, to)`
    async fn list_by_local_in_window(
        &self,
        local_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<Vec<CashMovement>>;
    /// Sequential per-local receipt counter; atomic under concurrency
    async fn next_receipt_number(&self, local_id: Uuid) -> RepoResult<i64>;
}

/// Stock movements
#[async_trait]
pub trait StockMovementRepository: Send + Sync {
    async fn save(&self, movement: StockMovement) -> RepoResult<StockMovement>;
    /// Persist several movements atomically (stock ledger output)
    async fn save_all(&self, movements: Vec<StockMovement>) -> RepoResult<()>;
    /// Newest first
    async fn list_by_product_and_local_desc(
        &self,
        product_id: Uuid,
        local_id: Uuid,
    ) -> RepoResult<Vec<StockMovement>>;
}

/// Cash journals
#[async_trait]
pub trait CashJournalRepository: Send + Sync {
    async fn save(&self, journal: CashJournal) -> RepoResult<CashJournal>;
    async fn exists_for_local_and_date(
        &self,
        local_id: Uuid,
        operative_date: NaiveDate,
    ) -> RepoResult<bool>;
    async fn list_by_local_in_date_range(
        &self,
        local_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<CashJournal>>;
}
