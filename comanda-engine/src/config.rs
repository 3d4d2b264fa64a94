//! Engine configuration
//!
//! Read once at startup from the environment (`.env` supported). Values
//! that shape business behavior live here rather than as scattered
//! constants so deployments can adjust them per local.

use chrono::NaiveTime;

/// Default prefix for cash-egress receipt numbers
const DEFAULT_RECEIPT_PREFIX: &str = "EGR";

/// Default night-shift cutoff hour: closings before 06:00 belong to the
/// previous operative date
const DEFAULT_DAY_CUTOFF_HOUR: u32 = 6;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Textual prefix for sequential egress receipt numbers
    pub receipt_prefix: String,
    /// Operative-day cutoff; no gastronomic local is assumed to operate
    /// at this hour
    pub day_cutoff: NaiveTime,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            receipt_prefix: DEFAULT_RECEIPT_PREFIX.to_string(),
            day_cutoff: NaiveTime::from_hms_opt(DEFAULT_DAY_CUTOFF_HOUR, 0, 0).unwrap(),
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults
    ///
    /// * `COMANDA_RECEIPT_PREFIX` - egress receipt prefix
    /// * `COMANDA_DAY_CUTOFF_HOUR` - cutoff hour (0-23)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let receipt_prefix = std::env::var("COMANDA_RECEIPT_PREFIX")
            .unwrap_or_else(|_| DEFAULT_RECEIPT_PREFIX.to_string());

        let cutoff_hour = std::env::var("COMANDA_DAY_CUTOFF_HOUR")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|h| *h < 24)
            .unwrap_or(DEFAULT_DAY_CUTOFF_HOUR);

        Self {
            receipt_prefix,
            day_cutoff: NaiveTime::from_hms_opt(cutoff_hour, 0, 0).unwrap(),
        }
    }
}
