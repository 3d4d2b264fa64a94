//! Kitchen slip and customer receipt views
//!
//! Data-only projections of an order; rendering and ESC-POS live in the
//! printing adapters.

use super::totals;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{DiningTable, Order, Payment};

/// One line of the kitchen slip
#[derive(Debug, Clone, Serialize)]
pub struct KitchenSlipLine {
    pub product_name: String,
    pub quantity: u32,
    pub observation: Option<String>,
    pub extras: Vec<String>,
}

/// What the kitchen needs to prepare
#[derive(Debug, Clone, Serialize)]
pub struct KitchenSlip {
    pub order_number: i64,
    pub table_name: String,
    pub opened_at: chrono::NaiveDateTime,
    pub lines: Vec<KitchenSlipLine>,
}

pub fn kitchen_slip(order: &Order, table: &DiningTable) -> KitchenSlip {
    KitchenSlip {
        order_number: order.number,
        table_name: table.name.clone(),
        opened_at: order.opened_at,
        lines: order
            .items
            .iter()
            .map(|item| KitchenSlipLine {
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                observation: item.observation.clone(),
                extras: item.extras.iter().map(|e| e.name.clone()).collect(),
            })
            .collect(),
    }
}

/// One priced line of the customer receipt
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_subtotal: Decimal,
    pub promotion_name: Option<String>,
    pub promotion_discount: Decimal,
    pub line_total: Decimal,
}

/// What the customer pays
#[derive(Debug, Clone, Serialize)]
pub struct CustomerReceipt {
    pub order_number: i64,
    pub table_name: String,
    pub closed_at: Option<chrono::NaiveDateTime>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub final_total: Decimal,
    pub payments: Vec<Payment>,
}

/// Build the receipt. A CLOSED order uses its frozen snapshot; an OPEN one
/// gets live-computed totals.
pub fn customer_receipt(order: &Order, table: &DiningTable) -> CustomerReceipt {
    let lines: Vec<ReceiptLine> = order
        .items
        .iter()
        .map(|item| ReceiptLine {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_subtotal: totals::line_subtotal(item),
            promotion_name: item.promotion.promotion_name.clone(),
            promotion_discount: item.promotion.discount_amount,
            line_total: totals::line_after_manual(item),
        })
        .collect();

    let (subtotal, discount_total, final_total) = match &order.totals {
        Some(frozen) => (frozen.subtotal, frozen.discount_total, frozen.final_total),
        None => {
            let computed = totals::compute_totals(order);
            (
                computed.subtotal,
                computed.discount_total,
                computed.final_total,
            )
        }
    };

    CustomerReceipt {
        order_number: order.number,
        table_name: table.name.clone(),
        closed_at: order.closed_at,
        lines,
        subtotal,
        discount_total,
        final_total,
        payments: order.payments.clone(),
    }
}
