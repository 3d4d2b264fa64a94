//! Promotion evaluation context
//!
//! Built fresh per operation from the order and a supplied timestamp; the
//! engine never reads the wall clock itself.

use crate::orders::totals;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use shared::models::{Order, OrderItem};
use std::collections::HashSet;
use uuid::Uuid;

/// Snapshot of the facts activation criteria are checked against
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    /// Product ids present in the order
    pub product_ids: HashSet<Uuid>,
    /// Order subtotal, pre-discount
    pub subtotal: Decimal,
}

impl EvaluationContext {
    fn from_parts(at: NaiveDateTime, items: &[&OrderItem]) -> Self {
        let product_ids = items.iter().map(|i| i.product_id).collect();
        let subtotal = items.iter().map(|i| totals::line_subtotal(i)).sum();
        Self {
            date: at.date(),
            time: at.time(),
            weekday: at.weekday().num_days_from_sunday() as u8,
            product_ids,
            subtotal,
        }
    }

    /// Context for bulk recomputation over the order as it stands
    pub fn from_order(order: &Order, at: NaiveDateTime) -> Self {
        let items: Vec<&OrderItem> = order.items.iter().collect();
        Self::from_parts(at, &items)
    }

    /// Add-time context: the order as it will stand once the candidate
    /// line lands, so add-time and a later recomputation agree
    pub fn from_order_with_candidate(
        order: &Order,
        candidate: &OrderItem,
        at: NaiveDateTime,
    ) -> Self {
        let mut items: Vec<&OrderItem> = order.items.iter().collect();
        items.push(candidate);
        Self::from_parts(at, &items)
    }
}
