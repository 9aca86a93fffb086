use crate::database::DbPool;
use crate::entities::{
    gift_entity as gifts, social_link_entity as social_links, tier_entity as tiers,
    tier_subscription_entity as tier_subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::creator_service::owned_creator;
use crate::utils::{
    DEFAULT_CURRENCY, Identity, normalize_currency, require_non_empty, validate_price,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

fn currency_or_default(currency: Option<&str>) -> AppResult<String> {
    normalize_currency(currency.unwrap_or(DEFAULT_CURRENCY))
}

pub(crate) async fn new_gift<C: ConnectionTrait>(
    db: &C,
    creator_id: i64,
    req: &CreateGiftRequest,
) -> AppResult<gifts::Model> {
    let title = require_non_empty(&req.title, "Title")?;
    validate_price(req.price)?;
    let currency = currency_or_default(req.currency.as_deref())?;

    let gift = gifts::ActiveModel {
        creator_id: Set(creator_id),
        gift_type: Set(req.gift_type.clone()),
        title: Set(title),
        description: Set(req.description.trim().to_string()),
        media: Set(req.media.trim().to_string()),
        price: Set(req.price),
        currency: Set(currency),
        active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(gift)
}

pub(crate) async fn new_tier<C: ConnectionTrait>(
    db: &C,
    creator_id: i64,
    req: &CreateTierRequest,
) -> AppResult<tiers::Model> {
    let name = require_non_empty(&req.name, "Tier name")?;
    validate_price(req.price)?;
    let currency = currency_or_default(req.currency.as_deref())?;
    let perks = clean_perks(&req.perks);
    let now = Utc::now();

    let tier = tiers::ActiveModel {
        creator_id: Set(creator_id),
        name: Set(name),
        description: Set(req.description.clone()),
        price: Set(req.price),
        currency: Set(currency),
        perks: Set(perks_to_json(&perks)),
        highlighted: Set(req.highlighted),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(tier)
}

pub(crate) async fn new_social_link<C: ConnectionTrait>(
    db: &C,
    creator_id: i64,
    req: &CreateSocialLinkRequest,
) -> AppResult<social_links::Model> {
    let platform = require_non_empty(&req.platform, "Platform")?.to_lowercase();
    let url = require_non_empty(&req.url, "URL")?;

    let existing = social_links::Entity::find()
        .filter(social_links::Column::CreatorId.eq(creator_id))
        .all(db)
        .await?;
    if existing.iter().any(|l| l.platform == platform) {
        return Err(AppError::ValidationError(format!(
            "A {platform} link already exists for this creator"
        )));
    }

    let link = social_links::ActiveModel {
        creator_id: Set(creator_id),
        platform: Set(platform),
        url: Set(url),
        position: Set(existing.len() as i32 + 1),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(link)
}

fn clean_perks(perks: &[String]) -> Vec<String> {
    perks
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_owner(row_creator_id: i64, creator_id: i64) -> AppResult<()> {
    if row_creator_id != creator_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[derive(Clone)]
pub struct CatalogService {
    pool: DbPool,
}

impl CatalogService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_gift(
        &self,
        identity: &Identity,
        req: CreateGiftRequest,
    ) -> AppResult<GiftResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let gift = new_gift(&self.pool, creator.id, &req).await?;
        log::info!("Creator {} added gift {}", creator.id, gift.id);
        Ok(gift.into())
    }

    pub async fn list_gifts(&self, identity: &Identity) -> AppResult<Vec<GiftResponse>> {
        let creator = owned_creator(&self.pool, identity).await?;
        let rows = gifts::Entity::find()
            .filter(gifts::Column::CreatorId.eq(creator.id))
            .order_by_asc(gifts::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GiftResponse::from).collect())
    }

    /// Gifts are referenced by orders, so they are only ever deactivated.
    pub async fn disable_gift(&self, identity: &Identity, gift_id: i64) -> AppResult<DeletedResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let gift = gifts::Entity::find_by_id(gift_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gift not found".to_string()))?;
        check_owner(gift.creator_id, creator.id)?;

        let mut am = gift.into_active_model();
        am.active = Set(false);
        am.update(&self.pool).await?;
        Ok(DeletedResponse {
            id: gift_id,
            soft_deleted: true,
        })
    }

    pub async fn create_tier(
        &self,
        identity: &Identity,
        req: CreateTierRequest,
    ) -> AppResult<TierResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let tier = new_tier(&self.pool, creator.id, &req).await?;
        log::info!("Creator {} added tier {}", creator.id, tier.id);
        Ok(tier.into())
    }

    pub async fn list_tiers(&self, identity: &Identity) -> AppResult<Vec<TierResponse>> {
        let creator = owned_creator(&self.pool, identity).await?;
        let rows = tiers::Entity::find()
            .filter(tiers::Column::CreatorId.eq(creator.id))
            .order_by_asc(tiers::Column::Price)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TierResponse::from).collect())
    }

    pub async fn update_tier(
        &self,
        identity: &Identity,
        tier_id: i64,
        req: UpdateTierRequest,
    ) -> AppResult<TierResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let tier = self.find_tier(tier_id).await?;
        check_owner(tier.creator_id, creator.id)?;

        let mut am = tier.into_active_model();
        if let Some(name) = req.name.as_deref() {
            am.name = Set(require_non_empty(name, "Tier name")?);
        }
        if let Some(description) = req.description {
            am.description = Set(Some(description));
        }
        if let Some(price) = req.price {
            validate_price(price)?;
            am.price = Set(price);
        }
        if let Some(currency) = req.currency.as_deref() {
            am.currency = Set(normalize_currency(currency)?);
        }
        if let Some(perks) = req.perks.as_deref() {
            am.perks = Set(perks_to_json(&clean_perks(perks)));
        }
        if let Some(highlighted) = req.highlighted {
            am.highlighted = Set(highlighted);
        }
        if let Some(active) = req.active {
            am.active = Set(active);
        }
        am.updated_at = Set(Utc::now());

        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Tiers with subscription history are deactivated instead of removed.
    pub async fn delete_tier(&self, identity: &Identity, tier_id: i64) -> AppResult<DeletedResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let tier = self.find_tier(tier_id).await?;
        check_owner(tier.creator_id, creator.id)?;

        let subscriptions = tier_subscriptions::Entity::find()
            .filter(tier_subscriptions::Column::TierId.eq(tier_id))
            .count(&self.pool)
            .await?;

        if subscriptions > 0 {
            let mut am = tier.into_active_model();
            am.active = Set(false);
            am.updated_at = Set(Utc::now());
            am.update(&self.pool).await?;
            log::info!("Tier {tier_id} has {subscriptions} subscriptions, deactivated");
            Ok(DeletedResponse {
                id: tier_id,
                soft_deleted: true,
            })
        } else {
            tier.delete(&self.pool).await?;
            Ok(DeletedResponse {
                id: tier_id,
                soft_deleted: false,
            })
        }
    }

    pub async fn create_social_link(
        &self,
        identity: &Identity,
        req: CreateSocialLinkRequest,
    ) -> AppResult<SocialLinkResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let link = new_social_link(&self.pool, creator.id, &req).await?;
        Ok(link.into())
    }

    pub async fn list_social_links(&self, identity: &Identity) -> AppResult<Vec<SocialLinkResponse>> {
        let creator = owned_creator(&self.pool, identity).await?;
        let rows = social_links::Entity::find()
            .filter(social_links::Column::CreatorId.eq(creator.id))
            .order_by_asc(social_links::Column::Position)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SocialLinkResponse::from).collect())
    }

    pub async fn delete_social_link(
        &self,
        identity: &Identity,
        link_id: i64,
    ) -> AppResult<DeletedResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let link = social_links::Entity::find_by_id(link_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Social link not found".to_string()))?;
        check_owner(link.creator_id, creator.id)?;
        link.delete(&self.pool).await?;
        Ok(DeletedResponse {
            id: link_id,
            soft_deleted: false,
        })
    }

    async fn find_tier(&self, tier_id: i64) -> AppResult<tiers::Model> {
        tiers::Entity::find_by_id(tier_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Tier not found".to_string()))
    }
}
