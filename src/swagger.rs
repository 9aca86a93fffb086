use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{GiftType, PaymentStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::profile::check_handle,
        handlers::profile::get_profile,
        handlers::profile::get_leaderboard,
        handlers::creator::create_creator,
        handlers::creator::complete_onboarding,
        handlers::dashboard::get_dashboard,
        handlers::dashboard::update_profile,
        handlers::dashboard::get_earnings,
        handlers::dashboard::get_orders,
        handlers::dashboard::send_payout_digest,
        handlers::catalog::create_gift,
        handlers::catalog::list_gifts,
        handlers::catalog::delete_gift,
        handlers::catalog::create_tier,
        handlers::catalog::list_tiers,
        handlers::catalog::update_tier,
        handlers::catalog::delete_tier,
        handlers::catalog::create_social_link,
        handlers::catalog::list_social_links,
        handlers::catalog::delete_social_link,
        handlers::checkout::gift_checkout,
        handlers::checkout::tier_checkout,
        handlers::checkout::contribution_checkout,
    ),
    components(
        schemas(
            GiftType,
            PaymentStatus,
            CreatorResponse,
            CreateCreatorRequest,
            UpdateProfileRequest,
            OnboardingRequest,
            OnboardingResponse,
            HandleAvailabilityResponse,
            CompletionStatus,
            DashboardResponse,
            GiftResponse,
            CreateGiftRequest,
            TierResponse,
            CreateTierRequest,
            UpdateTierRequest,
            SocialLinkResponse,
            CreateSocialLinkRequest,
            SponsorResponse,
            CalloutResponse,
            SpoilItemResponse,
            PostResponse,
            ProfileResponse,
            RecentPurchase,
            OrderResponse,
            Timeframe,
            LeaderboardEntry,
            MonthlyEarnings,
            PayoutDigestRequest,
            PayoutDigestResponse,
            GiftCheckoutRequest,
            TierCheckoutRequest,
            ContributionCheckoutRequest,
            CheckoutSessionResponse,
            DeletedResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "profile", description = "Public creator pages"),
        (name = "creator", description = "Creator signup and onboarding"),
        (name = "dashboard", description = "Creator dashboard, earnings and orders"),
        (name = "catalog", description = "Gifts, tiers and social links"),
        (name = "checkout", description = "Fan checkout sessions"),
    ),
    info(
        title = "BuyMeADrink Backend API",
        version = "1.0.0",
        description = "BuyMeADrink creator monetization REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
