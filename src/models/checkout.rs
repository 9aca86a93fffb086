use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

pub const META_KIND: &str = "kind";
pub const META_CREATOR_ID: &str = "creator_id";
pub const META_GIFT_ID: &str = "gift_id";
pub const META_TIER_ID: &str = "tier_id";
pub const META_SPOIL_ITEM_ID: &str = "spoil_item_id";
pub const META_FAN_NAME: &str = "fan_name";
pub const META_FAN_ID: &str = "fan_id";
pub const META_QUANTITY: &str = "quantity";

pub const ANONYMOUS_FAN: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GiftCheckoutRequest {
    pub handle: String,
    pub gift_id: i64,
    pub quantity: Option<i32>,
    pub fan_name: Option<String>,
    pub fan_email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TierCheckoutRequest {
    pub handle: String,
    pub tier_id: i64,
    pub fan_name: Option<String>,
    pub fan_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContributionCheckoutRequest {
    pub handle: String,
    pub spoil_item_id: i64,
    /// Defaults to the item's share amount.
    pub amount: Option<i64>,
    pub fan_name: Option<String>,
    pub fan_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    Gift,
    Tier,
    Contribution,
}

impl CheckoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutKind::Gift => "gift",
            CheckoutKind::Tier => "tier",
            CheckoutKind::Contribution => "contribution",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gift" => Some(CheckoutKind::Gift),
            "tier" => Some(CheckoutKind::Tier),
            "contribution" => Some(CheckoutKind::Contribution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    Payment,
    /// Monthly recurring price.
    Subscription,
}

/// Gateway-independent description of a checkout session to open.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub kind: CheckoutKind,
    pub mode: CheckoutMode,
    pub creator_id: i64,
    pub product_name: String,
    pub description: Option<String>,
    pub unit_amount: i64,
    pub quantity: u64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
    pub pending: Option<PendingPayment>,
}

/// Row data recorded as `pending` once the gateway returns a session id.
#[derive(Debug, Clone)]
pub enum PendingPayment {
    Order {
        gift_id: i64,
        fan_id: Option<String>,
        fan_name: Option<String>,
        fan_email: Option<String>,
        quantity: i32,
        unit_price: i64,
        total_amount: i64,
        message: Option<String>,
    },
    Contribution {
        spoil_item_id: i64,
        fan_id: Option<String>,
        fan_name: Option<String>,
        amount: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub id: String,
    pub customer_id: Option<String>,
    /// Raw gateway status, e.g. `active`, `past_due`.
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub payment_intent_id: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
    pub subscription: Option<SubscriptionSnapshot>,
}

impl CompletedCheckout {
    pub fn kind(&self) -> Option<CheckoutKind> {
        self.metadata
            .get(META_KIND)
            .and_then(|k| CheckoutKind::parse(k))
    }

    pub fn metadata_id(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(|v| v.parse().ok())
    }
}

/// Webhook events this backend reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    CheckoutCompleted(CompletedCheckout),
    CheckoutExpired { session_id: String },
    SubscriptionUpdated(SubscriptionSnapshot),
    SubscriptionDeleted { subscription_id: String },
    ChargeRefunded { payment_intent_id: String },
}

/// What applying a payment event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    OrderCompleted(i64),
    ContributionCompleted(i64),
    SubscriptionCreated(i64),
    SubscriptionUpdated(i64),
    Expired(u64),
    Refunded(u64),
    /// Already applied or nothing matched.
    Unchanged,
}
