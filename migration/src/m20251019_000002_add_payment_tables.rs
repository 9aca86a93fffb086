use sea_orm_migration::prelude::*;

use crate::m20251019_000001_initial::{Creators, Gifts, SpoilItems, Tiers};

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CreatorId,
    GiftId,
    FanId,
    FanName,
    FanEmail,
    Quantity,
    UnitPrice,
    TotalAmount,
    Currency,
    Message,
    StripeCheckoutSessionId,
    StripePaymentIntentId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TierSubscriptions {
    Table,
    Id,
    CreatorId,
    TierId,
    FanId,
    FanName,
    FanEmail,
    StripeSubscriptionId,
    StripeCustomerId,
    Status,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contributions {
    Table,
    Id,
    CreatorId,
    SpoilItemId,
    FanId,
    FanName,
    Amount,
    Currency,
    StripeCheckoutSessionId,
    StripePaymentIntentId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::GiftId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::FanId).string_len(255).null())
                    .col(ColumnDef::new(Orders::FanName).string_len(100).null())
                    .col(ColumnDef::new(Orders::FanEmail).string_len(255).null())
                    .col(ColumnDef::new(Orders::Quantity).integer().not_null())
                    .col(ColumnDef::new(Orders::UnitPrice).big_integer().not_null())
                    .col(ColumnDef::new(Orders::TotalAmount).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Orders::Message).text().null())
                    .col(
                        ColumnDef::new(Orders::StripeCheckoutSessionId)
                            .string_len(255)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::StripePaymentIntentId).string_len(255).null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_creator")
                            .from(Orders::Table, Orders::CreatorId)
                            .to(Creators::Table, Creators::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_gift")
                            .from(Orders::Table, Orders::GiftId)
                            .to(Gifts::Table, Gifts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_creator_status")
                    .table(Orders::Table)
                    .col(Orders::CreatorId)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_payment_intent")
                    .table(Orders::Table)
                    .col(Orders::StripePaymentIntentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TierSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TierSubscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TierSubscriptions::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(TierSubscriptions::TierId).big_integer().not_null())
                    .col(ColumnDef::new(TierSubscriptions::FanId).string_len(255).null())
                    .col(ColumnDef::new(TierSubscriptions::FanName).string_len(100).null())
                    .col(ColumnDef::new(TierSubscriptions::FanEmail).string_len(255).null())
                    .col(
                        ColumnDef::new(TierSubscriptions::StripeSubscriptionId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::StripeCustomerId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::CancelAtPeriodEnd)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TierSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tier_subscriptions_creator")
                            .from(TierSubscriptions::Table, TierSubscriptions::CreatorId)
                            .to(Creators::Table, Creators::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tier_subscriptions_tier")
                            .from(TierSubscriptions::Table, TierSubscriptions::TierId)
                            .to(Tiers::Table, Tiers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tier_subscriptions_creator_status")
                    .table(TierSubscriptions::Table)
                    .col(TierSubscriptions::CreatorId)
                    .col(TierSubscriptions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contributions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contributions::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Contributions::SpoilItemId).big_integer().not_null())
                    .col(ColumnDef::new(Contributions::FanId).string_len(255).null())
                    .col(ColumnDef::new(Contributions::FanName).string_len(100).null())
                    .col(ColumnDef::new(Contributions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Contributions::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Contributions::StripeCheckoutSessionId)
                            .string_len(255)
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Contributions::StripePaymentIntentId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Contributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributions_creator")
                            .from(Contributions::Table, Contributions::CreatorId)
                            .to(Creators::Table, Creators::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributions_spoil_item")
                            .from(Contributions::Table, Contributions::SpoilItemId)
                            .to(SpoilItems::Table, SpoilItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contributions_creator")
                    .table(Contributions::Table)
                    .col(Contributions::CreatorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contributions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TierSubscriptions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
