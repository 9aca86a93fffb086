use crate::error::AppResult;
use crate::external::StripeService;
use crate::models::PaymentOutcome;
use crate::services::CheckoutService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use log::{error, info, warn};
use stripe::Event;

/// Stripe webhook. Signature failures are rejected; processing failures are
/// logged and acknowledged so the gateway stops retrying.
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    stripe_service: web::Data<StripeService>,
    checkout_service: web::Data<CheckoutService>,
) -> Result<HttpResponse> {
    let signature = match req
        .headers()
        .get("stripe-signature")
        .and_then(|sig| sig.to_str().ok())
    {
        Some(sig) => sig,
        None => {
            warn!("Missing Stripe-Signature header");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing Stripe-Signature header"
            })));
        }
    };

    let payload = match std::str::from_utf8(&body) {
        Ok(payload) => payload,
        Err(_) => {
            error!("Invalid UTF-8 in webhook payload");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid payload encoding"
            })));
        }
    };

    let event = match stripe_service.construct_event(payload, signature) {
        Ok(event) => event,
        Err(e) => {
            error!("Webhook signature verification failed: {e}");
            return Ok(e.error_response());
        }
    };

    info!("Received Stripe webhook event: {} ({})", event.type_, event.id);

    match handle_event(event, &stripe_service, &checkout_service).await {
        Ok(outcome) => {
            info!("Webhook processed: {outcome:?}");
            Ok(HttpResponse::Ok().json(serde_json::json!({ "received": true })))
        }
        Err(e) => {
            error!("Failed to process webhook event: {e}");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "received": true,
                "error": format!("Processing failed: {e}")
            })))
        }
    }
}

async fn handle_event(
    event: Event,
    stripe_service: &StripeService,
    checkout_service: &CheckoutService,
) -> AppResult<PaymentOutcome> {
    let event_type = event.type_.to_string();
    match stripe_service.payment_event(event).await? {
        Some(payment_event) => checkout_service.apply_payment_event(payment_event).await,
        None => {
            info!("Unhandled event type: {event_type}");
            Ok(PaymentOutcome::Unchanged)
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/stripe", web::post().to(stripe_webhook)));
}
