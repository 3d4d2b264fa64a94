//! Operative-day computation
//!
//! A closing at 03:30 belongs to the previous business day: timestamps
//! before the cutoff (06:00 by default) attribute to `date - 1`. The
//! operative window of a date runs from its cutoff to the next day's
//! cutoff, half-open.

use crate::money::round_money;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use shared::models::{CashMovement, Order, PaymentMedium, PaymentMediumBreakdown};
use std::collections::HashMap;

/// Business day a closing timestamp is attributed to
pub fn operative_date(at: NaiveDateTime, cutoff: NaiveTime) -> NaiveDate {
    if at.time() < cutoff {
        at.date() - Days::new(1)
    } else {
        at.date()
    }
}

/// Half-open window `[date cutoff, date+1 cutoff)` of an operative date
pub fn operative_window(date: NaiveDate, cutoff: NaiveTime) -> (NaiveDateTime, NaiveDateTime) {
    let from = date.and_time(cutoff);
    let to = (date + Days::new(1)).and_time(cutoff);
    (from, to)
}

/// Totals of one operative window
#[derive(Debug, Clone, PartialEq)]
pub struct JournalAggregates {
    pub total_real_sales: Decimal,
    pub total_internal_consumption: Decimal,
    pub total_egresses: Decimal,
    /// CASH payments minus egresses; may be negative
    pub cash_balance: Decimal,
    pub closed_orders_count: u32,
    pub payment_breakdowns: Vec<PaymentMediumBreakdown>,
}

/// Aggregate the orders closed in the window and the window's cash
/// movements. ON_ACCOUNT denotes internal consumption and is excluded from
/// real sales.
pub fn aggregate_window(orders: &[Order], movements: &[CashMovement]) -> JournalAggregates {
    let mut total_real_sales = Decimal::ZERO;
    let mut total_internal_consumption = Decimal::ZERO;
    let mut cash_payments = Decimal::ZERO;
    let mut by_medium: HashMap<PaymentMedium, (Decimal, u32)> = HashMap::new();

    for order in orders {
        for payment in &order.payments {
            match payment.medium {
                PaymentMedium::OnAccount => total_internal_consumption += payment.amount,
                medium => {
                    total_real_sales += payment.amount;
                    if medium == PaymentMedium::Cash {
                        cash_payments += payment.amount;
                    }
                }
            }
            let entry = by_medium
                .entry(payment.medium)
                .or_insert((Decimal::ZERO, 0));
            entry.0 += payment.amount;
            entry.1 += 1;
        }
    }

    let total_egresses: Decimal = movements.iter().map(|m| m.amount).sum();

    let mut payment_breakdowns: Vec<PaymentMediumBreakdown> = by_medium
        .into_iter()
        .map(|(medium, (amount, count))| PaymentMediumBreakdown {
            medium,
            amount: round_money(amount),
            count,
        })
        .collect();
    payment_breakdowns.sort_by(|a, b| b.amount.cmp(&a.amount));

    JournalAggregates {
        total_real_sales: round_money(total_real_sales),
        total_internal_consumption: round_money(total_internal_consumption),
        total_egresses: round_money(total_egresses),
        cash_balance: round_money(cash_payments - total_egresses),
        closed_orders_count: orders.len() as u32,
        payment_breakdowns,
    }
}
