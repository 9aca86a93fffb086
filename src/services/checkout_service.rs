use crate::database::DbPool;
use crate::entities::{
    PaymentStatus, SubscriptionStatus, contribution_entity as contributions,
    creator_entity as creators, gift_entity as gifts, order_entity as orders,
    spoil_item_entity as spoil_items, tier_entity as tiers,
    tier_subscription_entity as tier_subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::NotificationService;
use crate::services::creator_service::find_active_by_handle;
use crate::utils::{Identity, MAX_PRICE, validate_price};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait,
};
use std::collections::HashMap;

const MAX_GIFT_QUANTITY: i32 = 100;

/// Who is paying. Explicit request values win over the caller's identity.
struct Fan {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

impl Fan {
    fn resolve(identity: Option<&Identity>, name: Option<&str>, email: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            id: identity.map(|i| i.subject.clone()),
            name: clean(name).or_else(|| identity.and_then(|i| i.name.clone())),
            email: clean(email).or_else(|| identity.and_then(|i| i.email.clone())),
        }
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| ANONYMOUS_FAN.to_string())
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    pool: DbPool,
    notifications: NotificationService,
    frontend_url: String,
}

impl CheckoutService {
    pub fn new(pool: DbPool, notifications: NotificationService, frontend_url: String) -> Self {
        Self {
            pool,
            notifications,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    fn return_urls(&self, handle: &str) -> (String, String) {
        let base = format!("{}/profile/{handle}", self.frontend_url);
        (
            format!("{base}?success=true&session_id={{CHECKOUT_SESSION_ID}}"),
            format!("{base}?canceled=true"),
        )
    }

    fn base_metadata(kind: CheckoutKind, creator_id: i64, fan: &Fan) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert(META_KIND.to_string(), kind.as_str().to_string());
        metadata.insert(META_CREATOR_ID.to_string(), creator_id.to_string());
        metadata.insert(META_FAN_NAME.to_string(), fan.display_name());
        if let Some(id) = fan.id.as_ref() {
            metadata.insert(META_FAN_ID.to_string(), id.clone());
        }
        metadata
    }

    pub async fn prepare_gift(
        &self,
        identity: Option<&Identity>,
        req: GiftCheckoutRequest,
    ) -> AppResult<CheckoutDraft> {
        let quantity = req.quantity.unwrap_or(1);
        if !(1..=MAX_GIFT_QUANTITY).contains(&quantity) {
            return Err(AppError::ValidationError(format!(
                "Quantity must be between 1 and {MAX_GIFT_QUANTITY}"
            )));
        }

        let creator = find_active_by_handle(&self.pool, &req.handle).await?;
        let gift = gifts::Entity::find_by_id(req.gift_id)
            .one(&self.pool)
            .await?
            .filter(|g| g.creator_id == creator.id)
            .ok_or_else(|| AppError::NotFound("Gift not found".to_string()))?;
        if !gift.active {
            return Err(AppError::ValidationError(
                "This gift is no longer available".to_string(),
            ));
        }

        let total_amount = gift
            .price
            .checked_mul(i64::from(quantity))
            .filter(|total| *total <= MAX_PRICE)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Order total cannot exceed {MAX_PRICE} minor units"
                ))
            })?;

        let fan = Fan::resolve(identity, req.fan_name.as_deref(), req.fan_email.as_deref());
        let mut metadata = Self::base_metadata(CheckoutKind::Gift, creator.id, &fan);
        metadata.insert(META_GIFT_ID.to_string(), gift.id.to_string());
        metadata.insert(META_QUANTITY.to_string(), quantity.to_string());

        let (success_url, cancel_url) = self.return_urls(&creator.handle);
        let message = req
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Ok(CheckoutDraft {
            kind: CheckoutKind::Gift,
            mode: CheckoutMode::Payment,
            creator_id: creator.id,
            product_name: format!("{} for {}", gift.title, creator.name),
            description: Some(gift.description.clone()).filter(|d| !d.is_empty()),
            unit_amount: gift.price,
            quantity: quantity as u64,
            currency: gift.currency.clone(),
            success_url,
            cancel_url,
            customer_email: fan.email.clone(),
            metadata,
            pending: Some(PendingPayment::Order {
                gift_id: gift.id,
                fan_id: fan.id,
                fan_name: fan.name,
                fan_email: fan.email,
                quantity,
                unit_price: gift.price,
                total_amount,
                message,
            }),
        })
    }

    pub async fn prepare_tier(
        &self,
        identity: Option<&Identity>,
        req: TierCheckoutRequest,
    ) -> AppResult<CheckoutDraft> {
        let creator = find_active_by_handle(&self.pool, &req.handle).await?;
        let tier = tiers::Entity::find_by_id(req.tier_id)
            .one(&self.pool)
            .await?
            .filter(|t| t.creator_id == creator.id)
            .ok_or_else(|| AppError::NotFound("Tier not found".to_string()))?;
        if !tier.active {
            return Err(AppError::ValidationError(
                "This tier is no longer available".to_string(),
            ));
        }

        let fan = Fan::resolve(identity, req.fan_name.as_deref(), req.fan_email.as_deref());
        let mut metadata = Self::base_metadata(CheckoutKind::Tier, creator.id, &fan);
        metadata.insert(META_TIER_ID.to_string(), tier.id.to_string());

        let (success_url, cancel_url) = self.return_urls(&creator.handle);
        Ok(CheckoutDraft {
            kind: CheckoutKind::Tier,
            mode: CheckoutMode::Subscription,
            creator_id: creator.id,
            product_name: format!("{} for {}", tier.name, creator.name),
            description: tier.description.clone().filter(|d| !d.is_empty()),
            unit_amount: tier.price,
            quantity: 1,
            currency: tier.currency.clone(),
            success_url,
            cancel_url,
            customer_email: fan.email,
            metadata,
            pending: None,
        })
    }

    pub async fn prepare_contribution(
        &self,
        identity: Option<&Identity>,
        req: ContributionCheckoutRequest,
    ) -> AppResult<CheckoutDraft> {
        let creator = find_active_by_handle(&self.pool, &req.handle).await?;
        let item = spoil_items::Entity::find_by_id(req.spoil_item_id)
            .one(&self.pool)
            .await?
            .filter(|i| i.creator_id == creator.id)
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
        if !item.active || item.completed {
            return Err(AppError::ValidationError(
                "This item is no longer accepting contributions".to_string(),
            ));
        }
        let amount = req.amount.unwrap_or(item.share_amount);
        validate_price(amount)?;

        let fan = Fan::resolve(identity, req.fan_name.as_deref(), req.fan_email.as_deref());
        let mut metadata = Self::base_metadata(CheckoutKind::Contribution, creator.id, &fan);
        metadata.insert(META_SPOIL_ITEM_ID.to_string(), item.id.to_string());

        let (success_url, cancel_url) = self.return_urls(&creator.handle);
        Ok(CheckoutDraft {
            kind: CheckoutKind::Contribution,
            mode: CheckoutMode::Payment,
            creator_id: creator.id,
            product_name: format!("Contribution to {} for {}", item.title, creator.name),
            description: None,
            unit_amount: amount,
            quantity: 1,
            currency: item.currency.clone(),
            success_url,
            cancel_url,
            customer_email: fan.email,
            metadata,
            pending: Some(PendingPayment::Contribution {
                spoil_item_id: item.id,
                fan_id: fan.id,
                fan_name: fan.name,
                amount,
            }),
        })
    }

    /// Stores the `pending` row for a session the gateway just opened.
    pub async fn record_pending(
        &self,
        draft: &CheckoutDraft,
        session: &GatewaySession,
    ) -> AppResult<()> {
        let now = Utc::now();
        match draft.pending.clone() {
            Some(PendingPayment::Order {
                gift_id,
                fan_id,
                fan_name,
                fan_email,
                quantity,
                unit_price,
                total_amount,
                message,
            }) => {
                let order = orders::ActiveModel {
                    creator_id: Set(draft.creator_id),
                    gift_id: Set(gift_id),
                    fan_id: Set(fan_id),
                    fan_name: Set(fan_name),
                    fan_email: Set(fan_email),
                    quantity: Set(quantity),
                    unit_price: Set(unit_price),
                    total_amount: Set(total_amount),
                    currency: Set(draft.currency.clone()),
                    message: Set(message),
                    stripe_checkout_session_id: Set(Some(session.id.clone())),
                    stripe_payment_intent_id: Set(None),
                    status: Set(PaymentStatus::Pending),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?;
                log::info!("Pending order {} for session {}", order.id, session.id);
            }
            Some(PendingPayment::Contribution {
                spoil_item_id,
                fan_id,
                fan_name,
                amount,
            }) => {
                let contribution = contributions::ActiveModel {
                    creator_id: Set(draft.creator_id),
                    spoil_item_id: Set(spoil_item_id),
                    fan_id: Set(fan_id),
                    fan_name: Set(fan_name),
                    amount: Set(amount),
                    currency: Set(draft.currency.clone()),
                    stripe_checkout_session_id: Set(Some(session.id.clone())),
                    stripe_payment_intent_id: Set(None),
                    status: Set(PaymentStatus::Pending),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?;
                log::info!(
                    "Pending contribution {} for session {}",
                    contribution.id,
                    session.id
                );
            }
            None => {}
        }
        Ok(())
    }

    /// Applies a verified gateway event. Safe to call more than once per event.
    pub async fn apply_payment_event(&self, event: PaymentEvent) -> AppResult<PaymentOutcome> {
        match event {
            PaymentEvent::CheckoutCompleted(checkout) => match checkout.kind() {
                Some(CheckoutKind::Gift) => self.complete_order(&checkout).await,
                Some(CheckoutKind::Contribution) => self.complete_contribution(&checkout).await,
                Some(CheckoutKind::Tier) => self.create_subscription(&checkout).await,
                None => {
                    log::warn!(
                        "Checkout session {} has no recognised kind, ignoring",
                        checkout.session_id
                    );
                    Ok(PaymentOutcome::Unchanged)
                }
            },
            PaymentEvent::CheckoutExpired { session_id } => self.expire_session(&session_id).await,
            PaymentEvent::SubscriptionUpdated(snapshot) => self.refresh_subscription(&snapshot).await,
            PaymentEvent::SubscriptionDeleted { subscription_id } => {
                self.cancel_subscription(&subscription_id).await
            }
            PaymentEvent::ChargeRefunded { payment_intent_id } => {
                self.refund_payment(&payment_intent_id).await
            }
        }
    }

    async fn complete_order(&self, checkout: &CompletedCheckout) -> AppResult<PaymentOutcome> {
        let txn = self.pool.begin().await?;
        let Some(order) = orders::Entity::find()
            .filter(orders::Column::StripeCheckoutSessionId.eq(checkout.session_id.as_str()))
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            log::warn!("No order for checkout session {}", checkout.session_id);
            return Ok(PaymentOutcome::Unchanged);
        };
        if order.status != PaymentStatus::Pending {
            txn.rollback().await?;
            return Ok(PaymentOutcome::Unchanged);
        }

        let fan_email = order.fan_email.clone().or(checkout.customer_email.clone());
        let mut am = order.into_active_model();
        am.status = Set(PaymentStatus::Completed);
        am.stripe_payment_intent_id = Set(checkout.payment_intent_id.clone());
        am.fan_email = Set(fan_email);
        am.updated_at = Set(Utc::now());
        let order = am.update(&txn).await?;
        txn.commit().await?;
        log::info!("Order {} completed", order.id);

        let gift = gifts::Entity::find_by_id(order.gift_id).one(&self.pool).await?;
        let creator = creators::Entity::find_by_id(order.creator_id)
            .one(&self.pool)
            .await?;
        if let (Some(gift), Some(creator)) = (gift, creator) {
            self.notifications
                .gift_completed(&order, &gift.title, &creator);
        }
        Ok(PaymentOutcome::OrderCompleted(order.id))
    }

    async fn complete_contribution(
        &self,
        checkout: &CompletedCheckout,
    ) -> AppResult<PaymentOutcome> {
        let txn = self.pool.begin().await?;
        let Some(contribution) = contributions::Entity::find()
            .filter(
                contributions::Column::StripeCheckoutSessionId.eq(checkout.session_id.as_str()),
            )
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            log::warn!("No contribution for checkout session {}", checkout.session_id);
            return Ok(PaymentOutcome::Unchanged);
        };
        if contribution.status != PaymentStatus::Pending {
            txn.rollback().await?;
            return Ok(PaymentOutcome::Unchanged);
        }

        let amount = contribution.amount;
        let item_id = contribution.spoil_item_id;
        let mut am = contribution.into_active_model();
        am.status = Set(PaymentStatus::Completed);
        am.stripe_payment_intent_id = Set(checkout.payment_intent_id.clone());
        am.updated_at = Set(Utc::now());
        let contribution = am.update(&txn).await?;

        if let Some(item) = spoil_items::Entity::find_by_id(item_id).one(&txn).await? {
            let current = item.current_amount.saturating_add(amount);
            let reached = current >= item.target_amount;
            let mut item_am = item.into_active_model();
            item_am.current_amount = Set(current);
            if reached {
                item_am.completed = Set(true);
            }
            item_am.update(&txn).await?;
            if reached {
                log::info!("Spoil item {item_id} reached its target");
            }
        }
        txn.commit().await?;
        log::info!("Contribution {} completed", contribution.id);
        Ok(PaymentOutcome::ContributionCompleted(contribution.id))
    }

    async fn create_subscription(&self, checkout: &CompletedCheckout) -> AppResult<PaymentOutcome> {
        let snapshot = checkout.subscription.as_ref().ok_or_else(|| {
            AppError::ValidationError(format!(
                "Checkout session {} has no subscription",
                checkout.session_id
            ))
        })?;
        let (Some(creator_id), Some(tier_id)) = (
            checkout.metadata_id(META_CREATOR_ID),
            checkout.metadata_id(META_TIER_ID),
        ) else {
            return Err(AppError::ValidationError(format!(
                "Checkout session {} is missing tier metadata",
                checkout.session_id
            )));
        };

        let existing = tier_subscriptions::Entity::find()
            .filter(tier_subscriptions::Column::StripeSubscriptionId.eq(snapshot.id.as_str()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Ok(PaymentOutcome::Unchanged);
        }

        let tier = tiers::Entity::find_by_id(tier_id)
            .one(&self.pool)
            .await?
            .filter(|t| t.creator_id == creator_id)
            .ok_or_else(|| AppError::NotFound("Tier not found".to_string()))?;

        let fan_name = checkout
            .metadata
            .get(META_FAN_NAME)
            .filter(|n| n.as_str() != ANONYMOUS_FAN)
            .cloned();
        let now = Utc::now();
        let subscription = tier_subscriptions::ActiveModel {
            creator_id: Set(creator_id),
            tier_id: Set(tier.id),
            fan_id: Set(checkout.metadata.get(META_FAN_ID).cloned()),
            fan_name: Set(fan_name.clone()),
            fan_email: Set(checkout.customer_email.clone()),
            stripe_subscription_id: Set(snapshot.id.clone()),
            stripe_customer_id: Set(snapshot.customer_id.clone()),
            status: Set(SubscriptionStatus::from_gateway(&snapshot.status)),
            current_period_start: Set(snapshot.current_period_start),
            current_period_end: Set(snapshot.current_period_end),
            cancel_at_period_end: Set(snapshot.cancel_at_period_end),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        log::info!(
            "Subscription {} created for tier {}",
            subscription.id,
            tier.id
        );

        if let Some(creator) = creators::Entity::find_by_id(creator_id)
            .one(&self.pool)
            .await?
        {
            self.notifications.tier_signup(
                checkout.customer_email.clone(),
                fan_name.as_deref(),
                &tier,
                &creator,
            );
        }
        Ok(PaymentOutcome::SubscriptionCreated(subscription.id))
    }

    async fn expire_session(&self, session_id: &str) -> AppResult<PaymentOutcome> {
        let now = Utc::now();
        let expired_orders = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(PaymentStatus::Expired))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::StripeCheckoutSessionId.eq(session_id))
            .filter(orders::Column::Status.eq(PaymentStatus::Pending))
            .exec(&self.pool)
            .await?
            .rows_affected;
        let expired_contributions = contributions::Entity::update_many()
            .col_expr(contributions::Column::Status, Expr::value(PaymentStatus::Expired))
            .col_expr(contributions::Column::UpdatedAt, Expr::value(now))
            .filter(contributions::Column::StripeCheckoutSessionId.eq(session_id))
            .filter(contributions::Column::Status.eq(PaymentStatus::Pending))
            .exec(&self.pool)
            .await?
            .rows_affected;

        let total = expired_orders + expired_contributions;
        if total == 0 {
            return Ok(PaymentOutcome::Unchanged);
        }
        log::info!("Checkout session {session_id} expired");
        Ok(PaymentOutcome::Expired(total))
    }

    async fn refresh_subscription(&self, snapshot: &SubscriptionSnapshot) -> AppResult<PaymentOutcome> {
        let Some(subscription) = tier_subscriptions::Entity::find()
            .filter(tier_subscriptions::Column::StripeSubscriptionId.eq(snapshot.id.as_str()))
            .one(&self.pool)
            .await?
        else {
            log::warn!("Update for unknown subscription {}", snapshot.id);
            return Ok(PaymentOutcome::Unchanged);
        };

        let mut am = subscription.into_active_model();
        am.status = Set(SubscriptionStatus::from_gateway(&snapshot.status));
        am.current_period_start = Set(snapshot.current_period_start);
        am.current_period_end = Set(snapshot.current_period_end);
        am.cancel_at_period_end = Set(snapshot.cancel_at_period_end);
        if snapshot.customer_id.is_some() {
            am.stripe_customer_id = Set(snapshot.customer_id.clone());
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        log::info!(
            "Subscription {} is now {:?}",
            updated.id,
            updated.status
        );
        Ok(PaymentOutcome::SubscriptionUpdated(updated.id))
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<PaymentOutcome> {
        let Some(subscription) = tier_subscriptions::Entity::find()
            .filter(tier_subscriptions::Column::StripeSubscriptionId.eq(subscription_id))
            .one(&self.pool)
            .await?
        else {
            log::warn!("Deletion of unknown subscription {subscription_id}");
            return Ok(PaymentOutcome::Unchanged);
        };
        if subscription.status == SubscriptionStatus::Canceled {
            return Ok(PaymentOutcome::Unchanged);
        }

        let mut am = subscription.into_active_model();
        am.status = Set(SubscriptionStatus::Canceled);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        log::info!("Subscription {} canceled", updated.id);
        Ok(PaymentOutcome::SubscriptionUpdated(updated.id))
    }

    /// Refunded contributions are taken back out of their item's total.
    async fn refund_payment(&self, payment_intent_id: &str) -> AppResult<PaymentOutcome> {
        let txn = self.pool.begin().await?;
        let now = Utc::now();

        let refunded_orders = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(PaymentStatus::Refunded))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::StripePaymentIntentId.eq(payment_intent_id))
            .filter(orders::Column::Status.eq(PaymentStatus::Completed))
            .exec(&txn)
            .await?
            .rows_affected;

        let refunded_contributions = contributions::Entity::find()
            .filter(contributions::Column::StripePaymentIntentId.eq(payment_intent_id))
            .filter(contributions::Column::Status.eq(PaymentStatus::Completed))
            .all(&txn)
            .await?;
        let contribution_count = refunded_contributions.len() as u64;
        for contribution in refunded_contributions {
            let amount = contribution.amount;
            let item_id = contribution.spoil_item_id;
            let mut am = contribution.into_active_model();
            am.status = Set(PaymentStatus::Refunded);
            am.updated_at = Set(now);
            am.update(&txn).await?;

            if let Some(item) = spoil_items::Entity::find_by_id(item_id).one(&txn).await? {
                let current = (item.current_amount - amount).max(0);
                let mut item_am = item.into_active_model();
                item_am.current_amount = Set(current);
                item_am.update(&txn).await?;
            }
        }
        txn.commit().await?;

        let total = refunded_orders + contribution_count;
        if total == 0 {
            log::warn!("Refund for unknown payment intent {payment_intent_id}");
            return Ok(PaymentOutcome::Unchanged);
        }
        log::info!("Payment intent {payment_intent_id} refunded ({total} rows)");
        Ok(PaymentOutcome::Refunded(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, EmailConfig};
    use crate::database::test_pool;
    use crate::external::EmailService;
    use crate::services::test_support::*;

    fn service(pool: DbPool) -> CheckoutService {
        let notifications = NotificationService::new(
            EmailService::new(EmailConfig::default()),
            AppConfig::default(),
        );
        CheckoutService::new(pool, notifications, "https://app.example.com/".to_string())
    }

    fn gift_request(gift_id: i64, quantity: Option<i32>) -> GiftCheckoutRequest {
        GiftCheckoutRequest {
            handle: "conor".to_string(),
            gift_id,
            quantity,
            fan_name: Some(" Sam ".to_string()),
            fan_email: None,
            message: Some("Cheers!".to_string()),
        }
    }

    fn completed(session_id: &str, metadata: HashMap<String, String>) -> PaymentEvent {
        PaymentEvent::CheckoutCompleted(CompletedCheckout {
            session_id: session_id.to_string(),
            payment_intent_id: Some("pi_1".to_string()),
            customer_email: Some("sam@example.com".to_string()),
            metadata,
            subscription: None,
        })
    }

    fn snapshot(id: &str, status: &str) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            id: id.to_string(),
            customer_id: Some("cus_1".to_string()),
            status: status.to_string(),
            current_period_start: utc(2025, 3, 1, 0),
            current_period_end: utc(2025, 4, 1, 0),
            cancel_at_period_end: false,
        }
    }

    async fn open_gift_session(service: &CheckoutService, gift_id: i64, session_id: &str) -> CheckoutDraft {
        let draft = service
            .prepare_gift(None, gift_request(gift_id, Some(2)))
            .await
            .unwrap();
        let session = GatewaySession {
            id: session_id.to_string(),
            url: Some("https://checkout.stripe.com/c/pay".to_string()),
        };
        service.record_pending(&draft, &session).await.unwrap();
        draft
    }

    #[tokio::test]
    async fn test_prepare_gift_draft() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let service = service(db);

        let fan = identity("fan_1");
        let draft = service
            .prepare_gift(Some(&fan), gift_request(gift.id, Some(3)))
            .await
            .unwrap();
        assert_eq!(draft.mode, CheckoutMode::Payment);
        assert_eq!(draft.unit_amount, 700);
        assert_eq!(draft.quantity, 3);
        assert_eq!(draft.product_name, "Pint for Creator conor");
        assert_eq!(
            draft.success_url,
            "https://app.example.com/profile/conor?success=true&session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            draft.cancel_url,
            "https://app.example.com/profile/conor?canceled=true"
        );
        assert_eq!(draft.customer_email.as_deref(), Some("fan_1@example.com"));
        assert_eq!(draft.metadata[META_KIND], "gift");
        assert_eq!(draft.metadata[META_FAN_NAME], "Sam");
        assert_eq!(draft.metadata[META_QUANTITY], "3");
        assert_eq!(draft.metadata[META_FAN_ID], "fan_1");
        match draft.pending {
            Some(PendingPayment::Order { total_amount, .. }) => assert_eq!(total_amount, 2100),
            other => panic!("unexpected pending payment: {other:?}"),
        }

        let anonymous = service
            .prepare_gift(
                None,
                GiftCheckoutRequest {
                    fan_name: None,
                    ..gift_request(gift.id, None)
                },
            )
            .await
            .unwrap();
        assert_eq!(anonymous.metadata[META_FAN_NAME], "Anonymous");
        assert_eq!(anonymous.quantity, 1);
    }

    #[tokio::test]
    async fn test_prepare_gift_validation() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let other = insert_creator(&db, "user_2", "other").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let foreign = insert_gift(&db, other.id, 700).await;
        let service = service(db);

        for quantity in [0, 101] {
            assert!(matches!(
                service.prepare_gift(None, gift_request(gift.id, Some(quantity))).await,
                Err(AppError::ValidationError(_))
            ));
        }
        assert!(matches!(
            service.prepare_gift(None, gift_request(foreign.id, None)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.prepare_gift(None, gift_request(9999, None)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_gift_total_is_capped() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, MAX_PRICE).await;
        let huge = insert_gift(&db, creator.id, i64::MAX / 2).await;
        let service = service(db);

        assert!(service.prepare_gift(None, gift_request(gift.id, Some(1))).await.is_ok());
        assert!(matches!(
            service.prepare_gift(None, gift_request(gift.id, Some(2))).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.prepare_gift(None, gift_request(huge.id, Some(3))).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_gift_completion_is_idempotent() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let service = service(db.clone());
        let draft = open_gift_session(&service, gift.id, "cs_gift").await;

        let first = service
            .apply_payment_event(completed("cs_gift", draft.metadata.clone()))
            .await
            .unwrap();
        assert!(matches!(first, PaymentOutcome::OrderCompleted(_)));
        let second = service
            .apply_payment_event(completed("cs_gift", draft.metadata.clone()))
            .await
            .unwrap();
        assert_eq!(second, PaymentOutcome::Unchanged);

        let rows = orders::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, PaymentStatus::Completed);
        assert_eq!(rows[0].total_amount, 1400);
        assert_eq!(rows[0].fan_name.as_deref(), Some("Sam"));
        assert_eq!(rows[0].fan_email.as_deref(), Some("sam@example.com"));
        assert_eq!(rows[0].stripe_payment_intent_id.as_deref(), Some("pi_1"));
    }

    #[tokio::test]
    async fn test_expired_and_refunded_orders() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let service = service(db.clone());

        open_gift_session(&service, gift.id, "cs_expire").await;
        let outcome = service
            .apply_payment_event(PaymentEvent::CheckoutExpired {
                session_id: "cs_expire".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, PaymentOutcome::Expired(1));

        let draft = open_gift_session(&service, gift.id, "cs_paid").await;
        service
            .apply_payment_event(completed("cs_paid", draft.metadata))
            .await
            .unwrap();
        // completed orders are not expired by a late event
        let late = service
            .apply_payment_event(PaymentEvent::CheckoutExpired {
                session_id: "cs_paid".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(late, PaymentOutcome::Unchanged);

        let refund = service
            .apply_payment_event(PaymentEvent::ChargeRefunded {
                payment_intent_id: "pi_1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(refund, PaymentOutcome::Refunded(1));

        let paid = orders::Entity::find()
            .filter(orders::Column::StripeCheckoutSessionId.eq("cs_paid"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, PaymentStatus::Refunded);
        let expired = orders::Entity::find()
            .filter(orders::Column::StripeCheckoutSessionId.eq("cs_expire"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(expired.status, PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn test_refunded_payments_ignore_redelivered_completion() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let item = insert_spoil_item(&db, creator.id, 5000, 1000).await;
        let service = service(db.clone());

        let draft = open_gift_session(&service, gift.id, "cs_gift").await;
        let contribution = service
            .prepare_contribution(
                None,
                ContributionCheckoutRequest {
                    handle: "conor".to_string(),
                    spoil_item_id: item.id,
                    amount: None,
                    fan_name: None,
                    fan_email: None,
                },
            )
            .await
            .unwrap();
        let session = GatewaySession {
            id: "cs_item".to_string(),
            url: None,
        };
        service.record_pending(&contribution, &session).await.unwrap();

        let gift_paid = completed("cs_gift", draft.metadata);
        let item_paid = completed("cs_item", contribution.metadata);
        service.apply_payment_event(gift_paid.clone()).await.unwrap();
        service.apply_payment_event(item_paid.clone()).await.unwrap();
        let refund = service
            .apply_payment_event(PaymentEvent::ChargeRefunded {
                payment_intent_id: "pi_1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(refund, PaymentOutcome::Refunded(2));

        assert_eq!(
            service.apply_payment_event(gift_paid).await.unwrap(),
            PaymentOutcome::Unchanged
        );
        assert_eq!(
            service.apply_payment_event(item_paid).await.unwrap(),
            PaymentOutcome::Unchanged
        );

        let order = orders::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(order.status, PaymentStatus::Refunded);
        let row = contributions::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.status, PaymentStatus::Refunded);
        let item_now = spoil_items::Entity::find_by_id(item.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item_now.current_amount, 0);
        assert!(!item_now.completed);
    }

    #[tokio::test]
    async fn test_contribution_completion_updates_item() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let item = insert_spoil_item(&db, creator.id, 1500, 1000).await;
        let service = service(db.clone());

        let mut metadata = HashMap::new();
        for (session_id, amount) in [("cs_c1", None), ("cs_c2", Some(500))] {
            let draft = service
                .prepare_contribution(
                    None,
                    ContributionCheckoutRequest {
                        handle: "conor".to_string(),
                        spoil_item_id: item.id,
                        amount,
                        fan_name: None,
                        fan_email: None,
                    },
                )
                .await
                .unwrap();
            metadata = draft.metadata.clone();
            let session = GatewaySession {
                id: session_id.to_string(),
                url: None,
            };
            service.record_pending(&draft, &session).await.unwrap();
        }

        service
            .apply_payment_event(completed("cs_c1", metadata.clone()))
            .await
            .unwrap();
        service
            .apply_payment_event(completed("cs_c1", metadata.clone()))
            .await
            .unwrap();
        let item_now = spoil_items::Entity::find_by_id(item.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item_now.current_amount, 1000);
        assert!(!item_now.completed);

        service
            .apply_payment_event(completed("cs_c2", metadata))
            .await
            .unwrap();
        let item_now = spoil_items::Entity::find_by_id(item.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item_now.current_amount, 1500);
        assert!(item_now.completed);

        // completed items stop taking contributions
        let closed = service
            .prepare_contribution(
                None,
                ContributionCheckoutRequest {
                    handle: "conor".to_string(),
                    spoil_item_id: item.id,
                    amount: None,
                    fan_name: None,
                    fan_email: None,
                },
            )
            .await;
        assert!(matches!(closed, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_tier_subscription_lifecycle() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let tier = insert_tier(&db, creator.id, 2000).await;
        let service = service(db.clone());

        let draft = service
            .prepare_tier(
                None,
                TierCheckoutRequest {
                    handle: "conor".to_string(),
                    tier_id: tier.id,
                    fan_name: Some("Sam".to_string()),
                    fan_email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(draft.mode, CheckoutMode::Subscription);
        assert!(draft.pending.is_none());

        let event = PaymentEvent::CheckoutCompleted(CompletedCheckout {
            session_id: "cs_tier".to_string(),
            payment_intent_id: None,
            customer_email: Some("sam@example.com".to_string()),
            metadata: draft.metadata.clone(),
            subscription: Some(snapshot("sub_1", "active")),
        });
        let created = service.apply_payment_event(event.clone()).await.unwrap();
        assert!(matches!(created, PaymentOutcome::SubscriptionCreated(_)));
        let again = service.apply_payment_event(event).await.unwrap();
        assert_eq!(again, PaymentOutcome::Unchanged);

        let rows = tier_subscriptions::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, SubscriptionStatus::Active);
        assert_eq!(rows[0].fan_name.as_deref(), Some("Sam"));
        assert_eq!(rows[0].current_period_end, utc(2025, 4, 1, 0));

        let mut past_due = snapshot("sub_1", "past_due");
        past_due.cancel_at_period_end = true;
        service
            .apply_payment_event(PaymentEvent::SubscriptionUpdated(past_due))
            .await
            .unwrap();
        let row = tier_subscriptions::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.status, SubscriptionStatus::PastDue);
        assert!(row.cancel_at_period_end);

        service
            .apply_payment_event(PaymentEvent::SubscriptionDeleted {
                subscription_id: "sub_1".to_string(),
            })
            .await
            .unwrap();
        let row = tier_subscriptions::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.status, SubscriptionStatus::Canceled);

        let unknown = service
            .apply_payment_event(PaymentEvent::SubscriptionDeleted {
                subscription_id: "sub_missing".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(unknown, PaymentOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_unknown_session_is_ignored() {
        let db = test_pool().await;
        let service = service(db);
        let mut metadata = HashMap::new();
        metadata.insert(META_KIND.to_string(), "gift".to_string());
        let outcome = service
            .apply_payment_event(completed("cs_missing", metadata))
            .await
            .unwrap();
        assert_eq!(outcome, PaymentOutcome::Unchanged);
        let outcome = service
            .apply_payment_event(completed("cs_missing", HashMap::new()))
            .await
            .unwrap();
        assert_eq!(outcome, PaymentOutcome::Unchanged);
    }
}
