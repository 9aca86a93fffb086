use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    CheckoutDraft, CheckoutMode, CompletedCheckout, GatewaySession, PaymentEvent,
    SubscriptionSnapshot,
};
use chrono::{DateTime, Utc};
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionLineItemsPriceDataRecurring,
    CreateCheckoutSessionLineItemsPriceDataRecurringInterval, Currency, Event, EventObject,
    EventType, Expandable, Subscription, SubscriptionId, Webhook,
};

#[derive(Clone)]
pub struct StripeService {
    client: Client,
    config: StripeConfig,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }

    pub async fn create_checkout_session(&self, draft: &CheckoutDraft) -> AppResult<GatewaySession> {
        let currency = currency_from_code(&draft.currency)?;
        let (mode, recurring) = match draft.mode {
            CheckoutMode::Payment => (CheckoutSessionMode::Payment, None),
            CheckoutMode::Subscription => (
                CheckoutSessionMode::Subscription,
                Some(CreateCheckoutSessionLineItemsPriceDataRecurring {
                    interval: CreateCheckoutSessionLineItemsPriceDataRecurringInterval::Month,
                    interval_count: None,
                }),
            ),
        };

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(mode);
        params.success_url = Some(&draft.success_url);
        params.cancel_url = Some(&draft.cancel_url);
        params.customer_email = draft.customer_email.as_deref();
        params.metadata = Some(draft.metadata.clone());
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(draft.quantity),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                unit_amount: Some(draft.unit_amount),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: draft.product_name.clone(),
                    description: draft.description.clone(),
                    ..Default::default()
                }),
                recurring,
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = CheckoutSession::create(&self.client, params).await?;
        log::info!(
            "Created {} checkout session {} for creator {}",
            draft.kind.as_str(),
            session.id,
            draft.creator_id
        );

        Ok(GatewaySession {
            id: session.id.to_string(),
            url: session.url,
        })
    }

    /// Verifies the `Stripe-Signature` header against the webhook secret.
    pub fn construct_event(&self, payload: &str, signature: &str) -> AppResult<Event> {
        Webhook::construct_event(payload, signature, &self.config.webhook_secret)
            .map_err(|e| AppError::AuthError(format!("Invalid webhook signature: {e}")))
    }

    pub async fn retrieve_subscription(&self, id: &str) -> AppResult<SubscriptionSnapshot> {
        let sub_id: SubscriptionId = id
            .parse()
            .map_err(|_| AppError::ValidationError(format!("Invalid subscription id: {id}")))?;
        let subscription = Subscription::retrieve(&self.client, &sub_id, &[]).await?;
        Ok(snapshot_from_subscription(&subscription))
    }

    /// Maps a verified gateway event onto a [`PaymentEvent`]. Event types this
    /// backend does not track yield `None`.
    pub async fn payment_event(&self, event: Event) -> AppResult<Option<PaymentEvent>> {
        let mapped = match (event.type_, event.data.object) {
            (EventType::CheckoutSessionCompleted, EventObject::CheckoutSession(session)) => {
                let subscription = match session.subscription.as_ref() {
                    Some(Expandable::Object(sub)) => Some(snapshot_from_subscription(sub)),
                    Some(Expandable::Id(id)) => Some(self.retrieve_subscription(id.as_str()).await?),
                    None => None,
                };
                let customer_email = session
                    .customer_details
                    .and_then(|d| d.email)
                    .or(session.customer_email);
                Some(PaymentEvent::CheckoutCompleted(CompletedCheckout {
                    session_id: session.id.to_string(),
                    payment_intent_id: session.payment_intent.as_ref().map(|pi| pi.id().to_string()),
                    customer_email,
                    metadata: session.metadata.unwrap_or_default(),
                    subscription,
                }))
            }
            (EventType::CheckoutSessionExpired, EventObject::CheckoutSession(session)) => {
                Some(PaymentEvent::CheckoutExpired {
                    session_id: session.id.to_string(),
                })
            }
            (EventType::CustomerSubscriptionUpdated, EventObject::Subscription(sub)) => {
                Some(PaymentEvent::SubscriptionUpdated(snapshot_from_subscription(&sub)))
            }
            (EventType::CustomerSubscriptionDeleted, EventObject::Subscription(sub)) => {
                Some(PaymentEvent::SubscriptionDeleted {
                    subscription_id: sub.id.to_string(),
                })
            }
            (EventType::ChargeRefunded, EventObject::Charge(charge)) => charge
                .payment_intent
                .as_ref()
                .map(|pi| PaymentEvent::ChargeRefunded {
                    payment_intent_id: pi.id().to_string(),
                }),
            (other, _) => {
                log::info!("Ignoring Stripe event type {other}");
                None
            }
        };
        Ok(mapped)
    }
}

fn snapshot_from_subscription(sub: &Subscription) -> SubscriptionSnapshot {
    SubscriptionSnapshot {
        id: sub.id.to_string(),
        customer_id: Some(sub.customer.id().to_string()),
        status: sub.status.as_str().to_string(),
        current_period_start: timestamp_to_utc(sub.current_period_start),
        current_period_end: timestamp_to_utc(sub.current_period_end),
        cancel_at_period_end: sub.cancel_at_period_end,
    }
}

fn timestamp_to_utc(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

pub fn currency_from_code(code: &str) -> AppResult<Currency> {
    match code.to_ascii_uppercase().as_str() {
        "USD" => Ok(Currency::USD),
        "EUR" => Ok(Currency::EUR),
        "GBP" => Ok(Currency::GBP),
        "CAD" => Ok(Currency::CAD),
        "AUD" => Ok(Currency::AUD),
        other => Err(AppError::ValidationError(format!(
            "Unsupported currency: {other}"
        ))),
    }
}
