use crate::entities::creator_entity;
use crate::models::{CreateGiftRequest, CreateSocialLinkRequest, CreateTierRequest};
use crate::models::{GiftResponse, SocialLinkResponse, TierResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatorResponse {
    pub id: i64,
    pub handle: String,
    pub name: String,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<creator_entity::Model> for CreatorResponse {
    fn from(m: creator_entity::Model) -> Self {
        Self {
            id: m.id,
            handle: m.handle,
            name: m.name,
            tagline: m.tagline,
            bio: m.bio,
            avatar: m.avatar,
            banner: m.banner,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCreatorRequest {
    pub handle: String,
    pub name: String,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
}

/// Everything the setup wizard collects, applied in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OnboardingRequest {
    pub creator: CreateCreatorRequest,
    pub first_gift: Option<CreateGiftRequest>,
    #[serde(default)]
    pub tiers: Vec<CreateTierRequest>,
    #[serde(default)]
    pub social_links: Vec<CreateSocialLinkRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OnboardingResponse {
    pub creator: CreatorResponse,
    pub gifts: Vec<GiftResponse>,
    pub tiers: Vec<TierResponse>,
    pub social_links: Vec<SocialLinkResponse>,
    pub profile_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HandleAvailabilityResponse {
    pub handle: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompletionStatus {
    pub profile_setup: bool,
    pub first_gift: bool,
    pub social_links: bool,
    pub support_tiers: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub creator: CreatorResponse,
    pub gifts: Vec<GiftResponse>,
    pub tiers: Vec<TierResponse>,
    pub social_links: Vec<SocialLinkResponse>,
    pub completion: CompletionStatus,
}
