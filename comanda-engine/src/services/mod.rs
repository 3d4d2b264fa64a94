//! Use cases
//!
//! Each service wires repositories, the injected clock and tenant context,
//! and the engine components into the semantic operations the transport
//! layer exposes. The pattern per operation: load, validate state, mutate
//! through the owning aggregate, persist, log.

pub mod cash;
pub mod catalog;
pub mod orders;
pub mod promotions;
pub mod stock;
pub mod tables;

pub use cash::CashService;
pub use catalog::CatalogService;
pub use orders::{AddItemRequest, DiscountRequest, OrderService, PaymentSplit, QuantityCorrection};
pub use promotions::PromotionService;
pub use stock::StockService;
pub use tables::TableService;
