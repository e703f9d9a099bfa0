use sea_orm_migration::prelude::*;

use crate::m20260110_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Expenses {
    Table,
    ExpenseId,
    Name,
    UserId,
    AmountCents,
    SplitKind,
    TotalShares,
    CreatedAt,
    Notes,
}

#[derive(Iden)]
enum ExpenseParticipants {
    Table,
    ParticipantId,
    ExpenseId,
    UserId,
    ShareCents,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::ExpenseId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::SplitKind).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::TotalShares)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseParticipants::ParticipantId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::ExpenseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseParticipants::ShareCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_participants-expense_id")
                            .from(ExpenseParticipants::Table, ExpenseParticipants::ExpenseId)
                            .to(Expenses::Table, Expenses::ExpenseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_participants-user_id")
                            .from(ExpenseParticipants::Table, ExpenseParticipants::UserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_participants-expense_id")
                    .table(ExpenseParticipants::Table)
                    .col(ExpenseParticipants::ExpenseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_participants-user_id")
                    .table(ExpenseParticipants::Table)
                    .col(ExpenseParticipants::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await
    }
}
