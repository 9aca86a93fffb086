use crate::models::*;
use crate::services::{CreatorService, LeaderboardService, ProfileService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/handles/{handle}/availability",
    tag = "profile",
    params(("handle" = String, Path, description = "Handle to check")),
    responses(
        (status = 200, description = "Availability of the handle", body = HandleAvailabilityResponse)
    )
)]
pub async fn check_handle(
    creator_service: web::Data<CreatorService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match creator_service.check_handle_availability(&path).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/profiles/{handle}",
    tag = "profile",
    params(("handle" = String, Path, description = "Creator handle")),
    responses(
        (status = 200, description = "Public creator profile", body = ProfileResponse),
        (status = 404, description = "Creator not found")
    )
)]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match profile_service.get_profile(&path).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/profiles/{handle}/leaderboard",
    tag = "profile",
    params(
        ("handle" = String, Path, description = "Creator handle"),
        ("timeframe" = Option<Timeframe>, Query, description = "week, month or allTime")
    ),
    responses(
        (status = 200, description = "Top supporters", body = [LeaderboardEntry]),
        (status = 404, description = "Creator not found")
    )
)]
pub async fn get_leaderboard(
    leaderboard_service: web::Data<LeaderboardService>,
    path: web::Path<String>,
    query: web::Query<LeaderboardQuery>,
) -> Result<HttpResponse> {
    match leaderboard_service
        .leaderboard(&path, query.timeframe, Utc::now())
        .await
    {
        Ok(entries) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entries
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn profile_config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/handles/{handle}/availability",
        web::get().to(check_handle),
    )
    .service(
        web::scope("/profiles")
            .route("/{handle}", web::get().to(get_profile))
            .route("/{handle}/leaderboard", web::get().to(get_leaderboard)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, EmailConfig};
    use crate::database::test_pool;
    use crate::external::EmailService;
    use crate::services::NotificationService;
    use crate::services::test_support::*;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_public_profile_routes() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        insert_gift(&db, creator.id, 700).await;
        let notifications = NotificationService::new(
            EmailService::new(EmailConfig::default()),
            AppConfig::default(),
        );

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(CreatorService::new(db.clone(), notifications)))
                .app_data(web::Data::new(ProfileService::new(db.clone())))
                .app_data(web::Data::new(LeaderboardService::new(db)))
                .configure(profile_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/handles/conor/availability")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["available"], false);

        let req = test::TestRequest::get().uri("/profiles/conor").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["creator"]["handle"], "conor");
        assert_eq!(body["data"]["gifts"].as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::get()
            .uri("/profiles/conor/leaderboard?timeframe=week")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([]));

        let req = test::TestRequest::get().uri("/profiles/nobody").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
