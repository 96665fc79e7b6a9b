use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // All columns but the key are nullable; constraints live in the source store.
        manager
            .create_table(
                Table::create()
                    .table(Source::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Source::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Source::Name).string().null())
                    .col(ColumnDef::new(Source::Config).text().null())
                    .col(ColumnDef::new(Source::Type).string().null())
                    .col(ColumnDef::new(Source::OrgId).string().null())
                    .col(ColumnDef::new(Source::Status).tiny_integer().null())
                    .col(ColumnDef::new(Source::CreateBy).string().null())
                    .col(ColumnDef::new(Source::CreateTime).timestamp().null())
                    .col(ColumnDef::new(Source::UpdateBy).string().null())
                    .col(ColumnDef::new(Source::UpdateTime).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("uq_source_org_name")
                    .table(Source::Table)
                    .col(Source::OrgId)
                    .col(Source::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Source::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Source {
    Table,
    Id,
    Name,
    Config,
    Type,
    OrgId,
    Status,
    CreateBy,
    CreateTime,
    UpdateBy,
    UpdateTime,
}
