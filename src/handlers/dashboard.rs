use crate::middlewares::identity_from_request;
use crate::models::*;
use crate::services::{CreatorService, EarningsService, OrderService, PayoutService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Creator dashboard", body = DashboardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No creator profile")
    )
)]
pub async fn get_dashboard(
    creator_service: web::Data<CreatorService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match creator_service.dashboard(&identity).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dashboard
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/dashboard/profile",
    tag = "dashboard",
    request_body = UpdateProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile updated", body = CreatorResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    creator_service: web::Data<CreatorService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match creator_service
        .update_profile(&identity, request.into_inner())
        .await
    {
        Ok(creator) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": creator
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/earnings",
    tag = "dashboard",
    params(
        ("year" = i32, Query, description = "Calendar year"),
        ("month" = u32, Query, description = "Month, 1-12")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Monthly earnings", body = MonthlyEarnings),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_earnings(
    earnings_service: web::Data<EarningsService>,
    req: HttpRequest,
    query: web::Query<EarningsQuery>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match earnings_service
        .earnings_for(&identity, query.year, query.month)
        .await
    {
        Ok(earnings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": earnings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/orders",
    tag = "dashboard",
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u64>, Query, description = "Page size"),
        ("status" = Option<crate::entities::PaymentStatus>, Query, description = "Filter by status")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Gift orders, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.orders_for(&identity, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/dashboard/payout-digest",
    tag = "dashboard",
    request_body = PayoutDigestRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Digest computed and queued", body = PayoutDigestResponse),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn send_payout_digest(
    payout_service: web::Data<PayoutService>,
    req: HttpRequest,
    request: web::Json<PayoutDigestRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match payout_service
        .send_digest(&identity, request.year, request.month)
        .await
    {
        Ok(digest) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": digest
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(get_dashboard))
        .route("/dashboard/profile", web::put().to(update_profile))
        .route("/dashboard/earnings", web::get().to(get_earnings))
        .route("/dashboard/orders", web::get().to(get_orders))
        .route("/dashboard/payout-digest", web::post().to(send_payout_digest));
}
