use crate::database::DbPool;
use crate::entities::{
    PaymentStatus, callout_entity as callouts, gift_entity as gifts, order_entity as orders,
    post_entity as posts, social_link_entity as social_links, spoil_item_entity as spoil_items,
    sponsor_entity as sponsors, tier_entity as tiers,
};
use crate::error::AppResult;
use crate::models::*;
use crate::services::creator_service::find_active_by_handle;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

const LATEST_POSTS: u64 = 7;
const RECENT_PURCHASES: u64 = 3;

#[derive(Clone)]
pub struct ProfileService {
    pool: DbPool,
}

impl ProfileService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, handle: &str) -> AppResult<ProfileResponse> {
        let creator = find_active_by_handle(&self.pool, handle).await?;
        let id = creator.id;

        let sponsor_rows = sponsors::Entity::find()
            .filter(sponsors::Column::CreatorId.eq(id))
            .filter(sponsors::Column::Active.eq(true))
            .order_by_asc(sponsors::Column::Position)
            .all(&self.pool)
            .await?;
        let link_rows = social_links::Entity::find()
            .filter(social_links::Column::CreatorId.eq(id))
            .order_by_asc(social_links::Column::Position)
            .all(&self.pool)
            .await?;
        let post_rows = posts::Entity::find()
            .filter(posts::Column::CreatorId.eq(id))
            .order_by_desc(posts::Column::PublishedAt)
            .limit(LATEST_POSTS)
            .all(&self.pool)
            .await?;
        let gift_rows = gifts::Entity::find()
            .filter(gifts::Column::CreatorId.eq(id))
            .filter(gifts::Column::Active.eq(true))
            .order_by_asc(gifts::Column::Price)
            .all(&self.pool)
            .await?;
        let tier_rows = tiers::Entity::find()
            .filter(tiers::Column::CreatorId.eq(id))
            .filter(tiers::Column::Active.eq(true))
            .order_by_asc(tiers::Column::Price)
            .all(&self.pool)
            .await?;
        let callout_rows = callouts::Entity::find()
            .filter(callouts::Column::CreatorId.eq(id))
            .filter(callouts::Column::Active.eq(true))
            .order_by_desc(callouts::Column::Featured)
            .order_by_asc(callouts::Column::Price)
            .all(&self.pool)
            .await?;
        let spoil_rows = spoil_items::Entity::find()
            .filter(spoil_items::Column::CreatorId.eq(id))
            .filter(spoil_items::Column::Active.eq(true))
            .order_by_asc(spoil_items::Column::Id)
            .all(&self.pool)
            .await?;
        let purchase_rows = orders::Entity::find()
            .filter(orders::Column::CreatorId.eq(id))
            .filter(orders::Column::Status.eq(PaymentStatus::Completed))
            .order_by_desc(orders::Column::CreatedAt)
            .limit(RECENT_PURCHASES)
            .all(&self.pool)
            .await?;

        Ok(ProfileResponse {
            creator: creator.into(),
            sponsors: sponsor_rows.into_iter().map(SponsorResponse::from).collect(),
            social_links: link_rows.into_iter().map(SocialLinkResponse::from).collect(),
            posts: post_rows.into_iter().map(PostResponse::from).collect(),
            gifts: gift_rows.into_iter().map(GiftResponse::from).collect(),
            tiers: tier_rows.into_iter().map(TierResponse::from).collect(),
            callouts: callout_rows.into_iter().map(CalloutResponse::from).collect(),
            spoil_items: spoil_rows.into_iter().map(SpoilItemResponse::from).collect(),
            recent_purchases: purchase_rows.into_iter().map(RecentPurchase::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::entities::creator_entity as creators;
    use crate::error::AppError;
    use crate::services::test_support::*;
    use chrono::Duration;
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    #[tokio::test]
    async fn test_profile_collections() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let hidden = insert_gift(&db, creator.id, 900).await;
        let mut am = hidden.into_active_model();
        am.active = Set(false);
        am.update(&db).await.unwrap();

        let base = utc(2025, 3, 1, 0);
        for i in 0..9 {
            posts::ActiveModel {
                creator_id: Set(creator.id),
                platform: Set("youtube".to_string()),
                thumbnail: Set(String::new()),
                url: Set(format!("https://youtube.com/watch?v={i}")),
                published_at: Set(base + Duration::days(i)),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }
        for (i, name) in ["Ann", "Ben", "Cy", "Di"].iter().enumerate() {
            insert_order(
                &db,
                OrderSeed {
                    creator_id: creator.id,
                    gift_id: gift.id,
                    fan_name: Some(*name),
                    total_amount: 700,
                    currency: "USD",
                    status: PaymentStatus::Completed,
                    created_at: base + Duration::hours(i as i64),
                },
            )
            .await;
        }

        let profile = ProfileService::new(db).get_profile("conor").await.unwrap();
        assert_eq!(profile.creator.handle, "conor");
        assert_eq!(profile.gifts.len(), 1);
        assert_eq!(profile.posts.len(), 7);
        assert_eq!(profile.posts[0].url, "https://youtube.com/watch?v=8");
        let fans: Vec<&str> = profile
            .recent_purchases
            .iter()
            .map(|p| p.fan_name.as_str())
            .collect();
        assert_eq!(fans, vec!["Di", "Cy", "Ben"]);
    }

    #[tokio::test]
    async fn test_inactive_creator_is_not_found() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let mut am: creators::ActiveModel = creator.into_active_model();
        am.active = Set(false);
        am.update(&db).await.unwrap();

        let service = ProfileService::new(db);
        assert!(matches!(
            service.get_profile("conor").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get_profile("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
