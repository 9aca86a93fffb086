use crate::middlewares::identity_from_request;
use crate::models::*;
use crate::services::CreatorService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/creators",
    tag = "creator",
    request_body = CreateCreatorRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Creator profile created", body = CreatorResponse),
        (status = 400, description = "Invalid input or handle taken"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_creator(
    creator_service: web::Data<CreatorService>,
    req: HttpRequest,
    request: web::Json<CreateCreatorRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match creator_service
        .create_creator(&identity, request.into_inner())
        .await
    {
        Ok(creator) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": creator
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Creates the profile, first gift, tiers and social links in one go.
#[utoipa::path(
    post,
    path = "/onboarding",
    tag = "creator",
    request_body = OnboardingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Onboarding completed", body = OnboardingResponse),
        (status = 400, description = "Invalid input or handle taken"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn complete_onboarding(
    creator_service: web::Data<CreatorService>,
    req: HttpRequest,
    request: web::Json<OnboardingRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match creator_service
        .complete_onboarding(&identity, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn creator_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/creators", web::post().to(create_creator))
        .route("/onboarding", web::post().to(complete_onboarding));
}
