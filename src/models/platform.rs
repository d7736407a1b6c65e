use serde::{Deserialize, Serialize};

/// One row of the static platform catalog. Color is presentation-only
/// and never read by the planning logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRecord {
    pub id: String,
    pub name: String,
    pub monthly_price: f64,
    pub color: String,
}
