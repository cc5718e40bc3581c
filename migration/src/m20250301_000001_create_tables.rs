use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create chats table
        manager
            .create_table(
                Table::create()
                    .table(Chats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chats::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chats::Type).string().not_null())
                    .col(ColumnDef::new(Chats::Title).string())
                    .col(
                        ColumnDef::new(Chats::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create chat_settings table (one row per chat)
        manager
            .create_table(
                Table::create()
                    .table(ChatSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatSettings::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChatSettings::LanguageCode)
                            .string()
                            .not_null()
                            .default("en"),
                    )
                    .col(ColumnDef::new(ChatSettings::Timezone).string())
                    .col(
                        ColumnDef::new(ChatSettings::AdminToolsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChatSettings::ReportsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChatSettings::ReportsPolicy)
                            .string()
                            .not_null()
                            .default("main_chat"),
                    )
                    .col(ColumnDef::new(ChatSettings::ReportsSpecialChatId).big_integer())
                    .col(
                        ColumnDef::new(ChatSettings::GreetingEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChatSettings::GreetingKind)
                            .string()
                            .not_null()
                            .default("photo"),
                    )
                    .col(ColumnDef::new(ChatSettings::GreetingText).string())
                    .col(ColumnDef::new(ChatSettings::GreetingPhotoId).string())
                    .col(ColumnDef::new(ChatSettings::GreetingVideoId).string())
                    .col(ColumnDef::new(ChatSettings::GreetingGifId).string())
                    .col(ColumnDef::new(ChatSettings::GreetingStickerId).string())
                    .col(ColumnDef::new(ChatSettings::GreetingTopicId).big_integer())
                    .col(
                        ColumnDef::new(ChatSettings::FarewellEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChatSettings::FarewellKind)
                            .string()
                            .not_null()
                            .default("photo"),
                    )
                    .col(ColumnDef::new(ChatSettings::FarewellText).string())
                    .col(ColumnDef::new(ChatSettings::FarewellPhotoId).string())
                    .col(ColumnDef::new(ChatSettings::FarewellVideoId).string())
                    .col(ColumnDef::new(ChatSettings::FarewellGifId).string())
                    .col(ColumnDef::new(ChatSettings::FarewellStickerId).string())
                    .col(ColumnDef::new(ChatSettings::FarewellTopicId).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_settings_chat")
                            .from(ChatSettings::Table, ChatSettings::Id)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chats::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Chats {
    Table,
    Id,
    Type,
    Title,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatSettings {
    Table,
    Id,
    LanguageCode,
    Timezone,
    AdminToolsEnabled,
    ReportsEnabled,
    ReportsPolicy,
    ReportsSpecialChatId,
    GreetingEnabled,
    GreetingKind,
    GreetingText,
    GreetingPhotoId,
    GreetingVideoId,
    GreetingGifId,
    GreetingStickerId,
    GreetingTopicId,
    FarewellEnabled,
    FarewellKind,
    FarewellText,
    FarewellPhotoId,
    FarewellVideoId,
    FarewellGifId,
    FarewellStickerId,
    FarewellTopicId,
}
