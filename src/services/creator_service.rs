use crate::database::DbPool;
use crate::entities::{
    creator_entity as creators, gift_entity as gifts, social_link_entity as social_links,
    tier_entity as tiers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::NotificationService;
use crate::services::catalog_service::{new_gift, new_social_link, new_tier};
use crate::utils::{Identity, validate_display_name, validate_handle};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

pub async fn find_active_by_handle<C: ConnectionTrait>(
    db: &C,
    handle: &str,
) -> AppResult<creators::Model> {
    creators::Entity::find()
        .filter(creators::Column::Handle.eq(handle))
        .filter(creators::Column::Active.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))
}

/// The creator profile belonging to the authenticated caller.
pub async fn owned_creator<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
) -> AppResult<creators::Model> {
    creators::Entity::find()
        .filter(creators::Column::UserId.eq(identity.subject.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator profile not found".to_string()))
}

fn handle_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::ValidationError("Handle is already taken".to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn ensure_no_profile(existing: AppResult<creators::Model>) -> AppResult<()> {
    match existing {
        Ok(_) => Err(AppError::ValidationError(
            "You already have a creator profile".to_string(),
        )),
        Err(AppError::NotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

async fn insert_creator<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    req: &CreateCreatorRequest,
) -> AppResult<creators::Model> {
    validate_handle(&req.handle)?;
    let name = validate_display_name(&req.name)?;

    ensure_no_profile(owned_creator(db, identity).await)?;

    let now = Utc::now();
    creators::ActiveModel {
        user_id: Set(identity.subject.clone()),
        email: Set(identity.email.clone()),
        handle: Set(req.handle.clone()),
        name: Set(name),
        tagline: Set(trimmed(req.tagline.as_deref())),
        bio: Set(trimmed(req.bio.as_deref())),
        avatar: Set(trimmed(req.avatar.as_deref())),
        banner: Set(trimmed(req.banner.as_deref())),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(handle_conflict)
}

#[derive(Clone)]
pub struct CreatorService {
    pool: DbPool,
    notifications: NotificationService,
}

impl CreatorService {
    pub fn new(pool: DbPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Malformed handles are reported as unavailable.
    pub async fn check_handle_availability(
        &self,
        handle: &str,
    ) -> AppResult<HandleAvailabilityResponse> {
        let available = if validate_handle(handle).is_err() {
            false
        } else {
            creators::Entity::find()
                .filter(creators::Column::Handle.eq(handle))
                .one(&self.pool)
                .await?
                .is_none()
        };
        Ok(HandleAvailabilityResponse {
            handle: handle.to_string(),
            available,
        })
    }

    pub async fn create_creator(
        &self,
        identity: &Identity,
        req: CreateCreatorRequest,
    ) -> AppResult<CreatorResponse> {
        let creator = insert_creator(&self.pool, identity, &req).await?;
        log::info!("Creator {} created with handle {}", creator.id, creator.handle);
        self.notifications.creator_welcome(&creator);
        Ok(creator.into())
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        req: UpdateProfileRequest,
    ) -> AppResult<CreatorResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let mut am = creator.into_active_model();

        if let Some(name) = req.name.as_deref() {
            am.name = Set(validate_display_name(name)?);
        }
        if req.tagline.is_some() {
            am.tagline = Set(trimmed(req.tagline.as_deref()));
        }
        if req.bio.is_some() {
            am.bio = Set(trimmed(req.bio.as_deref()));
        }
        if req.avatar.is_some() {
            am.avatar = Set(trimmed(req.avatar.as_deref()));
        }
        if req.banner.is_some() {
            am.banner = Set(trimmed(req.banner.as_deref()));
        }
        am.updated_at = Set(Utc::now());

        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Creates the creator and the wizard's optional catalog rows atomically.
    pub async fn complete_onboarding(
        &self,
        identity: &Identity,
        req: OnboardingRequest,
    ) -> AppResult<OnboardingResponse> {
        let txn = self.pool.begin().await?;

        let creator = insert_creator(&txn, identity, &req.creator).await?;
        let mut created_gifts = Vec::new();
        if let Some(gift) = req.first_gift.as_ref() {
            created_gifts.push(new_gift(&txn, creator.id, gift).await?);
        }
        let mut created_tiers = Vec::with_capacity(req.tiers.len());
        for tier in &req.tiers {
            created_tiers.push(new_tier(&txn, creator.id, tier).await?);
        }
        let mut created_links = Vec::with_capacity(req.social_links.len());
        for link in &req.social_links {
            created_links.push(new_social_link(&txn, creator.id, link).await?);
        }

        txn.commit().await?;
        log::info!(
            "Onboarding complete for creator {} ({} gifts, {} tiers, {} links)",
            creator.id,
            created_gifts.len(),
            created_tiers.len(),
            created_links.len()
        );
        self.notifications.creator_welcome(&creator);

        Ok(OnboardingResponse {
            profile_url: self.notifications.profile_url(&creator.handle),
            creator: creator.into(),
            gifts: created_gifts.into_iter().map(GiftResponse::from).collect(),
            tiers: created_tiers.into_iter().map(TierResponse::from).collect(),
            social_links: created_links
                .into_iter()
                .map(SocialLinkResponse::from)
                .collect(),
        })
    }

    pub async fn dashboard(&self, identity: &Identity) -> AppResult<DashboardResponse> {
        let creator = owned_creator(&self.pool, identity).await?;

        let gift_rows = gifts::Entity::find()
            .filter(gifts::Column::CreatorId.eq(creator.id))
            .order_by_asc(gifts::Column::Id)
            .all(&self.pool)
            .await?;
        let tier_rows = tiers::Entity::find()
            .filter(tiers::Column::CreatorId.eq(creator.id))
            .order_by_asc(tiers::Column::Price)
            .all(&self.pool)
            .await?;
        let link_rows = social_links::Entity::find()
            .filter(social_links::Column::CreatorId.eq(creator.id))
            .order_by_asc(social_links::Column::Position)
            .all(&self.pool)
            .await?;

        let completion = CompletionStatus {
            profile_setup: !creator.name.trim().is_empty() && !creator.handle.is_empty(),
            first_gift: gift_rows.iter().any(|g| g.active),
            social_links: !link_rows.is_empty(),
            support_tiers: tier_rows.iter().any(|t| t.active),
        };

        Ok(DashboardResponse {
            creator: creator.into(),
            gifts: gift_rows.into_iter().map(GiftResponse::from).collect(),
            tiers: tier_rows.into_iter().map(TierResponse::from).collect(),
            social_links: link_rows.into_iter().map(SocialLinkResponse::from).collect(),
            completion,
        })
    }
}
