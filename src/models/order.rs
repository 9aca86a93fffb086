use crate::entities::{PaymentStatus, order_entity};
use crate::utils::PaginatedResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub gift_id: i64,
    pub fan_name: Option<String>,
    pub fan_email: Option<String>,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_amount: i64,
    pub currency: String,
    pub message: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<PaymentStatus>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            gift_id: m.gift_id,
            fan_name: m.fan_name,
            fan_email: m.fan_email,
            quantity: m.quantity,
            unit_price: m.unit_price,
            total_amount: m.total_amount,
            currency: m.currency,
            message: m.message,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

/// Shown on the public profile; no contact details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentPurchase {
    pub fan_name: String,
    pub total_amount: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<order_entity::Model> for RecentPurchase {
    fn from(m: order_entity::Model) -> Self {
        Self {
            fan_name: m
                .fan_name
                .unwrap_or_else(|| crate::models::ANONYMOUS_FAN.to_string()),
            total_amount: m.total_amount,
            currency: m.currency,
            created_at: m.created_at,
        }
    }
}

pub type PaginatedOrderResponse = PaginatedResponse<OrderResponse>;
