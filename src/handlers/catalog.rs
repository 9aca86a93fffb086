use crate::middlewares::identity_from_request;
use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

// Every catalog endpoint acts on the caller's own creator profile.

#[utoipa::path(
    post,
    path = "/dashboard/gifts",
    tag = "catalog",
    request_body = CreateGiftRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Gift created", body = GiftResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_gift(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    request: web::Json<CreateGiftRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .create_gift(&identity, request.into_inner())
        .await
    {
        Ok(gift) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": gift
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/gifts",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All gifts, including disabled ones", body = [GiftResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_gifts(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service.list_gifts(&identity).await {
        Ok(gifts) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": gifts
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/dashboard/gifts/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Gift id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Gift disabled", body = DeletedResponse),
        (status = 403, description = "Gift belongs to another creator"),
        (status = 404, description = "Gift not found")
    )
)]
pub async fn delete_gift(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .disable_gift(&identity, path.into_inner())
        .await
    {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deleted
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/dashboard/tiers",
    tag = "catalog",
    request_body = CreateTierRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Tier created", body = TierResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_tier(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    request: web::Json<CreateTierRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .create_tier(&identity, request.into_inner())
        .await
    {
        Ok(tier) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": tier
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/tiers",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All tiers by price", body = [TierResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_tiers(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service.list_tiers(&identity).await {
        Ok(tiers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tiers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/dashboard/tiers/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tier id")),
    request_body = UpdateTierRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tier updated", body = TierResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Tier belongs to another creator"),
        (status = 404, description = "Tier not found")
    )
)]
pub async fn update_tier(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateTierRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .update_tier(&identity, path.into_inner(), request.into_inner())
        .await
    {
        Ok(tier) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tier
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Tiers with subscribers are deactivated instead of removed.
#[utoipa::path(
    delete,
    path = "/dashboard/tiers/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tier id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tier deleted or deactivated", body = DeletedResponse),
        (status = 403, description = "Tier belongs to another creator"),
        (status = 404, description = "Tier not found")
    )
)]
pub async fn delete_tier(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service.delete_tier(&identity, path.into_inner()).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deleted
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/dashboard/social-links",
    tag = "catalog",
    request_body = CreateSocialLinkRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Link added", body = SocialLinkResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_social_link(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    request: web::Json<CreateSocialLinkRequest>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .create_social_link(&identity, request.into_inner())
        .await
    {
        Ok(link) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": link
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/social-links",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Social links in display order", body = [SocialLinkResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_social_links(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service.list_social_links(&identity).await {
        Ok(links) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": links
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/dashboard/social-links/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Social link id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Link removed", body = DeletedResponse),
        (status = 403, description = "Link belongs to another creator"),
        (status = 404, description = "Link not found")
    )
)]
pub async fn delete_social_link(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match identity_from_request(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .delete_social_link(&identity, path.into_inner())
        .await
    {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deleted
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard/gifts", web::post().to(create_gift))
        .route("/dashboard/gifts", web::get().to(list_gifts))
        .route("/dashboard/gifts/{id}", web::delete().to(delete_gift))
        .route("/dashboard/tiers", web::post().to(create_tier))
        .route("/dashboard/tiers", web::get().to(list_tiers))
        .route("/dashboard/tiers/{id}", web::put().to(update_tier))
        .route("/dashboard/tiers/{id}", web::delete().to(delete_tier))
        .route("/dashboard/social-links", web::post().to(create_social_link))
        .route("/dashboard/social-links", web::get().to(list_social_links))
        .route(
            "/dashboard/social-links/{id}",
            web::delete().to(delete_social_link),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::middlewares::AuthMiddleware;
    use crate::services::test_support::*;
    use crate::utils::jwt::tests::{sign, test_service};
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_gift_and_tier_management() {
        let db = test_pool().await;
        insert_creator(&db, "user_1", "conor").await;
        let foreign = insert_creator(&db, "user_2", "other").await;
        let foreign_gift = insert_gift(&db, foreign.id, 500).await;

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(test_service()))
                .app_data(web::Data::new(CatalogService::new(db)))
                .service(web::scope("/api/v1").configure(catalog_config)),
        )
        .await;
        let token = format!("Bearer {}", sign("user_1", 3600));

        let req = test::TestRequest::post()
            .uri("/api/v1/dashboard/gifts")
            .insert_header(("Authorization", token.clone()))
            .set_json(json!({"gift_type": "item", "title": "Pint", "price": 700}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["currency"], "USD");

        let req = test::TestRequest::post()
            .uri("/api/v1/dashboard/tiers")
            .insert_header(("Authorization", token.clone()))
            .set_json(json!({"name": "Gold", "price": 0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/dashboard/gifts/{}", foreign_gift.id))
            .insert_header(("Authorization", token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard/gifts")
            .insert_header(("Authorization", token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let gifts = body["data"].as_array().cloned().unwrap_or_default();
        assert_eq!(gifts.len(), 1);
        assert_eq!(body["data"][0]["title"], "Pint");
    }
}
