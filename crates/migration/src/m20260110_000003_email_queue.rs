use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum EmailQueue {
    Table,
    Id,
    RecipientEmail,
    Subject,
    Body,
    SentAt,
    IsSent,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailQueue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailQueue::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmailQueue::RecipientEmail)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailQueue::Subject).string().not_null())
                    .col(ColumnDef::new(EmailQueue::Body).string().not_null())
                    .col(ColumnDef::new(EmailQueue::SentAt).timestamp())
                    .col(
                        ColumnDef::new(EmailQueue::IsSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailQueue::Table).to_owned())
            .await
    }
}
