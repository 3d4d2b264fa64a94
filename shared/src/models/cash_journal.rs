//! Cash Journal Model
//!
//! The immutable record of a closed operative day. At most one journal
//! exists per (local, operative date); once created it never mutates.

use super::order::PaymentMedium;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cash journal state enum (terminal by construction)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashJournalState {
    Closed,
}

/// Cash journal entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashJournal {
    pub id: Uuid,
    pub local_id: Uuid,
    /// Business day the closing is attributed to, after the shift cutoff
    pub operative_date: NaiveDate,
    pub closed_at: NaiveDateTime,
    /// Payments with any medium except ON_ACCOUNT
    pub total_real_sales: Decimal,
    /// ON_ACCOUNT payments
    pub total_internal_consumption: Decimal,
    pub total_egresses: Decimal,
    /// CASH payments minus egresses; may be negative
    pub cash_balance: Decimal,
    pub closed_orders_count: u32,
    pub closed_by: Option<Uuid>,
    pub state: CashJournalState,
}

/// Payment medium breakdown row in a daily report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMediumBreakdown {
    pub medium: PaymentMedium,
    pub amount: Decimal,
    pub count: u32,
}

/// Daily cash report - read-only preview of the day's aggregates,
/// computed with the same window as a journal close but never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCashReport {
    pub operative_date: NaiveDate,
    pub total_real_sales: Decimal,
    pub total_internal_consumption: Decimal,
    pub total_egresses: Decimal,
    pub cash_balance: Decimal,
    pub closed_orders_count: u32,
    pub payment_breakdowns: Vec<PaymentMediumBreakdown>,
}
