//! Row builders shared by the service tests.

use crate::database::DbPool;
use crate::entities::{
    GiftType, PaymentStatus, SubscriptionStatus, contribution_entity as contributions,
    creator_entity as creators, gift_entity as gifts, order_entity as orders,
    spoil_item_entity as spoil_items, tier_entity as tiers,
    tier_subscription_entity as tier_subscriptions,
};
use crate::utils::Identity;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn identity(subject: &str) -> Identity {
    Identity {
        subject: subject.to_string(),
        email: Some(format!("{subject}@example.com")),
        name: None,
    }
}

pub async fn insert_creator(db: &DbPool, user_id: &str, handle: &str) -> creators::Model {
    let now = Utc::now();
    creators::ActiveModel {
        user_id: Set(user_id.to_string()),
        email: Set(Some(format!("{user_id}@example.com"))),
        handle: Set(handle.to_string()),
        name: Set(format!("Creator {handle}")),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_gift(db: &DbPool, creator_id: i64, price: i64) -> gifts::Model {
    gifts::ActiveModel {
        creator_id: Set(creator_id),
        gift_type: Set(GiftType::Item),
        title: Set("Pint".to_string()),
        description: Set("A cold one".to_string()),
        media: Set(String::new()),
        price: Set(price),
        currency: Set("USD".to_string()),
        active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_tier(db: &DbPool, creator_id: i64, price: i64) -> tiers::Model {
    let now = Utc::now();
    tiers::ActiveModel {
        creator_id: Set(creator_id),
        name: Set("Gold".to_string()),
        description: Set(None),
        price: Set(price),
        currency: Set("USD".to_string()),
        perks: Set(json!(["Shoutout"])),
        highlighted: Set(false),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_spoil_item(
    db: &DbPool,
    creator_id: i64,
    target_amount: i64,
    share_amount: i64,
) -> spoil_items::Model {
    spoil_items::ActiveModel {
        creator_id: Set(creator_id),
        title: Set("New headphones".to_string()),
        description: Set(String::new()),
        image: Set(String::new()),
        target_amount: Set(target_amount),
        current_amount: Set(0),
        share_amount: Set(share_amount),
        currency: Set("USD".to_string()),
        active: Set(true),
        completed: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub struct OrderSeed<'a> {
    pub creator_id: i64,
    pub gift_id: i64,
    pub fan_name: Option<&'a str>,
    pub total_amount: i64,
    pub currency: &'a str,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_order(db: &DbPool, seed: OrderSeed<'_>) -> orders::Model {
    orders::ActiveModel {
        creator_id: Set(seed.creator_id),
        gift_id: Set(seed.gift_id),
        fan_id: Set(None),
        fan_name: Set(seed.fan_name.map(str::to_string)),
        fan_email: Set(None),
        quantity: Set(1),
        unit_price: Set(seed.total_amount),
        total_amount: Set(seed.total_amount),
        currency: Set(seed.currency.to_string()),
        message: Set(None),
        stripe_checkout_session_id: Set(None),
        stripe_payment_intent_id: Set(None),
        status: Set(seed.status),
        created_at: Set(seed.created_at),
        updated_at: Set(seed.created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_contribution(
    db: &DbPool,
    creator_id: i64,
    spoil_item_id: i64,
    fan_name: Option<&str>,
    amount: i64,
    created_at: DateTime<Utc>,
) -> contributions::Model {
    contributions::ActiveModel {
        creator_id: Set(creator_id),
        spoil_item_id: Set(spoil_item_id),
        fan_id: Set(None),
        fan_name: Set(fan_name.map(str::to_string)),
        amount: Set(amount),
        currency: Set("USD".to_string()),
        stripe_checkout_session_id: Set(None),
        stripe_payment_intent_id: Set(None),
        status: Set(PaymentStatus::Completed),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_subscription(
    db: &DbPool,
    creator_id: i64,
    tier_id: i64,
    stripe_id: &str,
    period: (DateTime<Utc>, DateTime<Utc>),
    status: SubscriptionStatus,
) -> tier_subscriptions::Model {
    let now = Utc::now();
    tier_subscriptions::ActiveModel {
        creator_id: Set(creator_id),
        tier_id: Set(tier_id),
        fan_id: Set(None),
        fan_name: Set(Some("Sub".to_string())),
        fan_email: Set(None),
        stripe_subscription_id: Set(stripe_id.to_string()),
        stripe_customer_id: Set(None),
        status: Set(status),
        current_period_start: Set(period.0),
        current_period_end: Set(period.1),
        cancel_at_period_end: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
