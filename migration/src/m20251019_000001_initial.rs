use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum Creators {
    Table,
    Id,
    UserId,
    Email,
    Handle,
    Name,
    Tagline,
    Bio,
    Avatar,
    Banner,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Gifts {
    Table,
    Id,
    CreatorId,
    GiftType,
    Title,
    Description,
    Media,
    Price,
    Currency,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Tiers {
    Table,
    Id,
    CreatorId,
    Name,
    Description,
    Price,
    Currency,
    Perks,
    Highlighted,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SocialLinks {
    Table,
    Id,
    CreatorId,
    Platform,
    Url,
    Position,
}

#[derive(DeriveIden)]
enum Sponsors {
    Table,
    Id,
    CreatorId,
    Name,
    Logo,
    Url,
    Position,
    Active,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    CreatorId,
    Platform,
    Thumbnail,
    Url,
    PublishedAt,
}

#[derive(DeriveIden)]
enum Callouts {
    Table,
    Id,
    CreatorId,
    CalloutType,
    Price,
    Currency,
    Duration,
    Description,
    Featured,
    Active,
}

#[derive(DeriveIden)]
pub(crate) enum SpoilItems {
    Table,
    Id,
    CreatorId,
    Title,
    Description,
    Image,
    TargetAmount,
    CurrentAmount,
    ShareAmount,
    Currency,
    Active,
    Completed,
}

fn creator_fk(
    name: &str,
    table: impl IntoIden + 'static,
    col: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Creators::Table, Creators::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Creators::Table)
                    .if_not_exists()
                    .col(&mut id_col(Creators::Id))
                    .col(ColumnDef::new(Creators::UserId).string_len(255).not_null())
                    .col(ColumnDef::new(Creators::Email).string_len(255).null())
                    .col(ColumnDef::new(Creators::Handle).string_len(30).not_null())
                    .col(ColumnDef::new(Creators::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Creators::Tagline).string().null())
                    .col(ColumnDef::new(Creators::Bio).text().null())
                    .col(ColumnDef::new(Creators::Avatar).string().null())
                    .col(ColumnDef::new(Creators::Banner).string().null())
                    .col(
                        ColumnDef::new(Creators::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Creators::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Creators::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // handle uniqueness lives in storage, not in a pre-check
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_creators_handle")
                    .table(Creators::Table)
                    .col(Creators::Handle)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_creators_user_id")
                    .table(Creators::Table)
                    .col(Creators::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Gifts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Gifts::Id))
                    .col(ColumnDef::new(Gifts::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Gifts::GiftType).string_len(16).not_null())
                    .col(ColumnDef::new(Gifts::Title).string().not_null())
                    .col(ColumnDef::new(Gifts::Description).text().not_null())
                    .col(ColumnDef::new(Gifts::Media).string().not_null())
                    .col(ColumnDef::new(Gifts::Price).big_integer().not_null())
                    .col(ColumnDef::new(Gifts::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Gifts::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Gifts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut creator_fk(
                        "fk_gifts_creator",
                        Gifts::Table,
                        Gifts::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tiers::Table)
                    .if_not_exists()
                    .col(&mut id_col(Tiers::Id))
                    .col(ColumnDef::new(Tiers::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Tiers::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Tiers::Description).text().null())
                    .col(ColumnDef::new(Tiers::Price).big_integer().not_null())
                    .col(ColumnDef::new(Tiers::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Tiers::Perks).json().not_null())
                    .col(
                        ColumnDef::new(Tiers::Highlighted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tiers::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Tiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tiers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut creator_fk(
                        "fk_tiers_creator",
                        Tiers::Table,
                        Tiers::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SocialLinks::Table)
                    .if_not_exists()
                    .col(&mut id_col(SocialLinks::Id))
                    .col(ColumnDef::new(SocialLinks::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(SocialLinks::Platform).string_len(50).not_null())
                    .col(ColumnDef::new(SocialLinks::Url).string().not_null())
                    .col(ColumnDef::new(SocialLinks::Position).integer().not_null())
                    .foreign_key(&mut creator_fk(
                        "fk_social_links_creator",
                        SocialLinks::Table,
                        SocialLinks::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sponsors::Table)
                    .if_not_exists()
                    .col(&mut id_col(Sponsors::Id))
                    .col(ColumnDef::new(Sponsors::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Sponsors::Name).string().not_null())
                    .col(ColumnDef::new(Sponsors::Logo).string().not_null())
                    .col(ColumnDef::new(Sponsors::Url).string().not_null())
                    .col(ColumnDef::new(Sponsors::Position).integer().not_null())
                    .col(ColumnDef::new(Sponsors::Active).boolean().not_null().default(true))
                    .foreign_key(&mut creator_fk(
                        "fk_sponsors_creator",
                        Sponsors::Table,
                        Sponsors::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Posts::Id))
                    .col(ColumnDef::new(Posts::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Posts::Platform).string_len(50).not_null())
                    .col(ColumnDef::new(Posts::Thumbnail).string().not_null())
                    .col(ColumnDef::new(Posts::Url).string().not_null())
                    .col(
                        ColumnDef::new(Posts::PublishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut creator_fk(
                        "fk_posts_creator",
                        Posts::Table,
                        Posts::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Callouts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Callouts::Id))
                    .col(ColumnDef::new(Callouts::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Callouts::CalloutType).string_len(50).not_null())
                    .col(ColumnDef::new(Callouts::Price).big_integer().not_null())
                    .col(ColumnDef::new(Callouts::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Callouts::Duration).string_len(50).not_null())
                    .col(ColumnDef::new(Callouts::Description).text().not_null())
                    .col(ColumnDef::new(Callouts::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Callouts::Active).boolean().not_null().default(true))
                    .foreign_key(&mut creator_fk(
                        "fk_callouts_creator",
                        Callouts::Table,
                        Callouts::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SpoilItems::Table)
                    .if_not_exists()
                    .col(&mut id_col(SpoilItems::Id))
                    .col(ColumnDef::new(SpoilItems::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(SpoilItems::Title).string().not_null())
                    .col(ColumnDef::new(SpoilItems::Description).text().not_null())
                    .col(ColumnDef::new(SpoilItems::Image).string().not_null())
                    .col(ColumnDef::new(SpoilItems::TargetAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(SpoilItems::CurrentAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SpoilItems::ShareAmount).big_integer().not_null())
                    .col(ColumnDef::new(SpoilItems::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(SpoilItems::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(SpoilItems::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(&mut creator_fk(
                        "fk_spoil_items_creator",
                        SpoilItems::Table,
                        SpoilItems::CreatorId,
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SpoilItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Callouts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sponsors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SocialLinks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tiers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Gifts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Creators::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
