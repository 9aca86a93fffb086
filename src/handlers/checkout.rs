use crate::error::AppResult;
use crate::external::StripeService;
use crate::middlewares::optional_identity;
use crate::models::*;
use crate::services::CheckoutService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Opens the gateway session for a prepared draft and records the pending row.
async fn open_session(
    stripe_service: &StripeService,
    checkout_service: &CheckoutService,
    draft: AppResult<CheckoutDraft>,
) -> AppResult<CheckoutSessionResponse> {
    let draft = draft?;
    let session = stripe_service.create_checkout_session(&draft).await?;
    checkout_service.record_pending(&draft, &session).await?;
    log::info!(
        "Checkout session {} opened for creator {} ({})",
        session.id,
        draft.creator_id,
        draft.kind.as_str()
    );
    Ok(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
    })
}

fn session_response(result: AppResult<CheckoutSessionResponse>) -> Result<HttpResponse> {
    match result {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/checkout/gift",
    tag = "checkout",
    request_body = GiftCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session opened", body = CheckoutSessionResponse),
        (status = 400, description = "Invalid quantity or unavailable gift"),
        (status = 404, description = "Creator or gift not found"),
        (status = 502, description = "Payment gateway error")
    )
)]
pub async fn gift_checkout(
    stripe_service: web::Data<StripeService>,
    checkout_service: web::Data<CheckoutService>,
    req: HttpRequest,
    request: web::Json<GiftCheckoutRequest>,
) -> Result<HttpResponse> {
    let identity = optional_identity(&req);
    let draft = checkout_service
        .prepare_gift(identity.as_ref(), request.into_inner())
        .await;
    session_response(open_session(&stripe_service, &checkout_service, draft).await)
}

#[utoipa::path(
    post,
    path = "/checkout/tier",
    tag = "checkout",
    request_body = TierCheckoutRequest,
    responses(
        (status = 200, description = "Subscription checkout session opened", body = CheckoutSessionResponse),
        (status = 400, description = "Tier unavailable"),
        (status = 404, description = "Creator or tier not found"),
        (status = 502, description = "Payment gateway error")
    )
)]
pub async fn tier_checkout(
    stripe_service: web::Data<StripeService>,
    checkout_service: web::Data<CheckoutService>,
    req: HttpRequest,
    request: web::Json<TierCheckoutRequest>,
) -> Result<HttpResponse> {
    let identity = optional_identity(&req);
    let draft = checkout_service
        .prepare_tier(identity.as_ref(), request.into_inner())
        .await;
    session_response(open_session(&stripe_service, &checkout_service, draft).await)
}

#[utoipa::path(
    post,
    path = "/checkout/contribution",
    tag = "checkout",
    request_body = ContributionCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session opened", body = CheckoutSessionResponse),
        (status = 400, description = "Item closed or invalid amount"),
        (status = 404, description = "Creator or item not found"),
        (status = 502, description = "Payment gateway error")
    )
)]
pub async fn contribution_checkout(
    stripe_service: web::Data<StripeService>,
    checkout_service: web::Data<CheckoutService>,
    req: HttpRequest,
    request: web::Json<ContributionCheckoutRequest>,
) -> Result<HttpResponse> {
    let identity = optional_identity(&req);
    let draft = checkout_service
        .prepare_contribution(identity.as_ref(), request.into_inner())
        .await;
    session_response(open_session(&stripe_service, &checkout_service, draft).await)
}

pub fn checkout_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("/gift", web::post().to(gift_checkout))
            .route("/tier", web::post().to(tier_checkout))
            .route("/contribution", web::post().to(contribution_checkout)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, EmailConfig, StripeConfig};
    use crate::database::test_pool;
    use crate::external::EmailService;
    use crate::services::NotificationService;
    use crate::services::test_support::*;
    use actix_web::{App, test};

    // Requests rejected during preparation never reach the gateway.
    #[actix_web::test]
    async fn test_invalid_checkout_fails_before_gateway() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let notifications = NotificationService::new(
            EmailService::new(EmailConfig::default()),
            AppConfig::default(),
        );

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(StripeService::new(StripeConfig::default())))
                .app_data(web::Data::new(CheckoutService::new(
                    db,
                    notifications,
                    "https://buymeadrink.app".to_string(),
                )))
                .configure(checkout_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/checkout/gift")
            .set_json(json!({"handle": "conor", "gift_id": gift.id, "quantity": 0}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/checkout/tier")
            .set_json(json!({"handle": "nobody", "tier_id": 1}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
