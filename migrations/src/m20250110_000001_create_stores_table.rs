use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250110_000001_create_stores_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stores::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Stores::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Stores::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Stores::City).string_len(100).not_null())
                    .col(ColumnDef::new(Stores::State).string_len(50).not_null())
                    .col(ColumnDef::new(Stores::Zip).string_len(20).not_null())
                    .col(ColumnDef::new(Stores::Phone).string_len(30).null())
                    .col(ColumnDef::new(Stores::Email).string_len(255).null())
                    .col(
                        ColumnDef::new(Stores::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Stores::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Stores::UpdatedAt)
                            .timestamp()
                            .null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stores_is_active")
                    .table(Stores::Table)
                    .col(Stores::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stores::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Stores {
    Table,
    Id,
    Name,
    Address,
    City,
    State,
    Zip,
    Phone,
    Email,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
