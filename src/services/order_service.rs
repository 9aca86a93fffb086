use crate::database::DbPool;
use crate::entities::order_entity as orders;
use crate::error::AppResult;
use crate::models::*;
use crate::services::creator_service::owned_creator;
use crate::utils::{Identity, PaginatedResponse, PaginationParams};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

#[derive(Clone)]
pub struct OrderService {
    pool: DbPool,
}

impl OrderService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn orders_for(
        &self,
        identity: &Identity,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let creator = owned_creator(&self.pool, identity).await?;
        self.creator_orders(creator.id, query).await
    }

    /// Newest first, optionally filtered by status.
    pub async fn creator_orders(
        &self,
        creator_id: i64,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut select = orders::Entity::find().filter(orders::Column::CreatorId.eq(creator_id));
        if let Some(status) = query.status.clone() {
            select = select.filter(orders::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .offset(params.offset())
            .limit(params.per_page())
            .all(&self.pool)
            .await?;

        let items: Vec<OrderResponse> = rows.into_iter().map(OrderResponse::from).collect();
        Ok(PaginatedResponse::new(items, &params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::entities::PaymentStatus;
    use crate::services::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_creator_orders_paginated_and_filtered() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let other = insert_creator(&db, "user_2", "other").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let other_gift = insert_gift(&db, other.id, 700).await;
        let base = utc(2025, 3, 1, 0);

        for i in 0..5 {
            insert_order(
                &db,
                OrderSeed {
                    creator_id: creator.id,
                    gift_id: gift.id,
                    fan_name: None,
                    total_amount: 700 + i,
                    currency: "USD",
                    status: if i == 4 {
                        PaymentStatus::Pending
                    } else {
                        PaymentStatus::Completed
                    },
                    created_at: base + Duration::hours(i),
                },
            )
            .await;
        }
        insert_order(
            &db,
            OrderSeed {
                creator_id: other.id,
                gift_id: other_gift.id,
                fan_name: None,
                total_amount: 100,
                currency: "USD",
                status: PaymentStatus::Completed,
                created_at: base,
            },
        )
        .await;

        let service = OrderService::new(db);
        let page = service
            .creator_orders(
                creator.id,
                &OrderQuery {
                    page: Some(1),
                    per_page: Some(2),
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].total_amount, 704);

        let completed = service
            .creator_orders(
                creator.id,
                &OrderQuery {
                    status: Some(PaymentStatus::Completed),
                    ..OrderQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(completed.pagination.total, 4);
        assert!(completed
            .items
            .iter()
            .all(|o| o.status == PaymentStatus::Completed));

        let own = service
            .orders_for(&identity("user_2"), &OrderQuery::default())
            .await
            .unwrap();
        assert_eq!(own.pagination.total, 1);
        assert_eq!(own.items[0].total_amount, 100);
    }
}
