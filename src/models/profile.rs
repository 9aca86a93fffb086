use crate::entities::post_entity;
use crate::models::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub platform: String,
    pub thumbnail: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl From<post_entity::Model> for PostResponse {
    fn from(m: post_entity::Model) -> Self {
        Self {
            id: m.id,
            platform: m.platform,
            thumbnail: m.thumbnail,
            url: m.url,
            published_at: m.published_at,
        }
    }
}

/// Public creator page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub creator: CreatorResponse,
    pub sponsors: Vec<SponsorResponse>,
    pub social_links: Vec<SocialLinkResponse>,
    pub posts: Vec<PostResponse>,
    pub gifts: Vec<GiftResponse>,
    pub tiers: Vec<TierResponse>,
    pub callouts: Vec<CalloutResponse>,
    pub spoil_items: Vec<SpoilItemResponse>,
    pub recent_purchases: Vec<RecentPurchase>,
}
