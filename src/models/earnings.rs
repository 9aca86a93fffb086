use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Gross, fee and net earnings of one creator for one calendar month.
/// All amounts are minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyEarnings {
    pub total_earnings: i64,
    pub gift_earnings: i64,
    pub subscription_earnings: i64,
    pub platform_fee: i64,
    pub net_earnings: i64,
    pub gift_count: u64,
    pub subscription_count: u64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct EarningsQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PayoutDigestRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PayoutDigestResponse {
    /// `false` when there was no recipient or email is disabled.
    pub queued: bool,
    pub recipient: Option<String>,
    pub earnings: MonthlyEarnings,
}
