use crate::entities::{
    GiftType, callout_entity, gift_entity, social_link_entity, spoil_item_entity, sponsor_entity,
    tier_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GiftResponse {
    pub id: i64,
    pub gift_type: GiftType,
    pub title: String,
    pub description: String,
    pub media: String,
    pub price: i64,
    pub currency: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<gift_entity::Model> for GiftResponse {
    fn from(m: gift_entity::Model) -> Self {
        Self {
            id: m.id,
            gift_type: m.gift_type,
            title: m.title,
            description: m.description,
            media: m.media,
            price: m.price,
            currency: m.currency,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGiftRequest {
    pub gift_type: GiftType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub media: String,
    pub price: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TierResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub perks: Vec<String>,
    pub highlighted: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tier_entity::Model> for TierResponse {
    fn from(m: tier_entity::Model) -> Self {
        Self {
            id: m.id,
            perks: perks_from_json(&m.perks),
            name: m.name,
            description: m.description,
            price: m.price,
            currency: m.currency,
            highlighted: m.highlighted,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Perks are stored as a JSON array; anything that is not a string is skipped.
pub fn perks_from_json(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn perks_to_json(perks: &[String]) -> serde_json::Value {
    serde_json::Value::from(perks.to_vec())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTierRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: Option<String>,
    #[serde(default)]
    pub perks: Vec<String>,
    #[serde(default)]
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTierRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub perks: Option<Vec<String>>,
    pub highlighted: Option<bool>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialLinkResponse {
    pub id: i64,
    pub platform: String,
    pub url: String,
    pub position: i32,
}

impl From<social_link_entity::Model> for SocialLinkResponse {
    fn from(m: social_link_entity::Model) -> Self {
        Self {
            id: m.id,
            platform: m.platform,
            url: m.url,
            position: m.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSocialLinkRequest {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SponsorResponse {
    pub id: i64,
    pub name: String,
    pub logo: String,
    pub url: String,
}

impl From<sponsor_entity::Model> for SponsorResponse {
    fn from(m: sponsor_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            logo: m.logo,
            url: m.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalloutResponse {
    pub id: i64,
    pub callout_type: String,
    pub price: i64,
    pub currency: String,
    pub duration: String,
    pub description: String,
    pub featured: bool,
}

impl From<callout_entity::Model> for CalloutResponse {
    fn from(m: callout_entity::Model) -> Self {
        Self {
            id: m.id,
            callout_type: m.callout_type,
            price: m.price,
            currency: m.currency,
            duration: m.duration,
            description: m.description,
            featured: m.featured,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpoilItemResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub target_amount: i64,
    pub current_amount: i64,
    pub share_amount: i64,
    pub currency: String,
    pub completed: bool,
}

impl From<spoil_item_entity::Model> for SpoilItemResponse {
    fn from(m: spoil_item_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            image: m.image,
            target_amount: m.target_amount,
            current_amount: m.current_amount,
            share_amount: m.share_amount,
            currency: m.currency,
            completed: m.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_perks_json_conversion() {
        let perks = vec!["Shoutout".to_string(), "Discord".to_string()];
        let value = perks_to_json(&perks);
        assert_eq!(value, json!(["Shoutout", "Discord"]));
        assert_eq!(perks_from_json(&value), perks);
    }

    #[test]
    fn test_perks_from_unexpected_json() {
        assert!(perks_from_json(&json!(null)).is_empty());
        assert_eq!(perks_from_json(&json!(["a", 1, "b"])), vec!["a", "b"]);
    }
}
