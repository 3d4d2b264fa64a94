//! Cash operations: egresses, daily reports, day close

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::journal::closer;
use crate::repository::{
    CashJournalRepository, CashMovementRepository, OrderRepository, RepoError,
};
use crate::tenancy::LocalContext;
use crate::utils::validation::{MAX_NOTE_LEN, validate_positive_amount};
use chrono::NaiveDate;
use shared::error::{DomainError, DomainResult};
use shared::models::{
    CashJournal, CashJournalState, CashMovement, CashMovementCreate, CashMovementKind,
    DailyCashReport,
};
use shared::util::new_id;
use std::sync::Arc;
use uuid::Uuid;

pub struct CashService {
    orders: Arc<dyn OrderRepository>,
    cash_movements: Arc<dyn CashMovementRepository>,
    journals: Arc<dyn CashJournalRepository>,
    clock: Arc<dyn Clock>,
    local: Arc<dyn LocalContext>,
    config: EngineConfig,
}

impl CashService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        cash_movements: Arc<dyn CashMovementRepository>,
        journals: Arc<dyn CashJournalRepository>,
        clock: Arc<dyn Clock>,
        local: Arc<dyn LocalContext>,
        config: EngineConfig,
    ) -> Self {
        Self {
            orders,
            cash_movements,
            journals,
            clock,
            local,
            config,
        }
    }

    /// Register a cash egress with a sequential prefixed receipt number
    pub async fn register_egress(
        &self,
        payload: CashMovementCreate,
    ) -> DomainResult<CashMovement> {
        let local_id = self.local.current_local_id();
        validate_positive_amount("amount", payload.amount)?;
        let description = payload.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("description", "must not be empty"));
        }
        if description.len() > MAX_NOTE_LEN {
            return Err(DomainError::validation(
                "description",
                format!("must not exceed {} characters", MAX_NOTE_LEN),
            ));
        }

        let sequence = self.cash_movements.next_receipt_number(local_id).await?;
        let movement = CashMovement {
            id: new_id(),
            local_id,
            amount: payload.amount,
            description,
            at: self.clock.now(),
            kind: CashMovementKind::Egress,
            receipt_number: format!("{}-{:06}", self.config.receipt_prefix, sequence),
        };
        let saved = self.cash_movements.save(movement).await?;
        tracing::info!(
            receipt = %saved.receipt_number,
            amount = %saved.amount,
            "cash egress registered"
        );
        Ok(saved)
    }

    async fn window_aggregates(
        &self,
        local_id: Uuid,
        date: NaiveDate,
    ) -> DomainResult<closer::JournalAggregates> {
        let (from, to) = closer::operative_window(date, self.config.day_cutoff);
        let orders = self.orders.list_closed_in_window(local_id, from, to).await?;
        let movements = self
            .cash_movements
            .list_by_local_in_window(local_id, from, to)
            .await?;
        Ok(closer::aggregate_window(&orders, &movements))
    }

    /// Read-only preview of a day's aggregates, without closing it
    pub async fn daily_report(&self, date: NaiveDate) -> DomainResult<DailyCashReport> {
        let local_id = self.local.current_local_id();
        let aggregates = self.window_aggregates(local_id, date).await?;
        Ok(DailyCashReport {
            operative_date: date,
            total_real_sales: aggregates.total_real_sales,
            total_internal_consumption: aggregates.total_internal_consumption,
            total_egresses: aggregates.total_egresses,
            cash_balance: aggregates.cash_balance,
            closed_orders_count: aggregates.closed_orders_count,
            payment_breakdowns: aggregates.payment_breakdowns,
        })
    }

    /// Close the operative day: no open tables, single close per date,
    /// then the immutable journal.
    pub async fn close_day(&self, closed_by: Option<Uuid>) -> DomainResult<CashJournal> {
        let local_id = self.local.current_local_id();
        let now = self.clock.now();

        let open = self.orders.list_open_by_local(local_id).await?;
        if !open.is_empty() {
            return Err(DomainError::TablesStillOpen(open.len() as u32));
        }

        let operative_date = closer::operative_date(now, self.config.day_cutoff);
        if self
            .journals
            .exists_for_local_and_date(local_id, operative_date)
            .await?
        {
            return Err(DomainError::DayAlreadyClosed(operative_date));
        }

        let aggregates = self.window_aggregates(local_id, operative_date).await?;
        let journal = CashJournal {
            id: new_id(),
            local_id,
            operative_date,
            closed_at: now,
            total_real_sales: aggregates.total_real_sales,
            total_internal_consumption: aggregates.total_internal_consumption,
            total_egresses: aggregates.total_egresses,
            cash_balance: aggregates.cash_balance,
            closed_orders_count: aggregates.closed_orders_count,
            closed_by,
            state: CashJournalState::Closed,
        };

        let saved = self.journals.save(journal).await.map_err(|err| match err {
            // A concurrent closer won the race on the uniqueness constraint
            RepoError::Duplicate(_) => DomainError::DayAlreadyClosed(operative_date),
            other => other.into(),
        })?;
        tracing::info!(
            date = %saved.operative_date,
            sales = %saved.total_real_sales,
            orders = saved.closed_orders_count,
            "operative day closed"
        );
        Ok(saved)
    }

    pub async fn list_journals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<CashJournal>> {
        let local_id = self.local.current_local_id();
        Ok(self
            .journals
            .list_by_local_in_date_range(local_id, from, to)
            .await?)
    }
}
