use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MacroData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacroData::Date)
                            .date()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MacroData::UsdKrw).double().not_null())
                    .col(ColumnDef::new(MacroData::WtiPrice).double().not_null())
                    .col(ColumnDef::new(MacroData::Sp500Index).double().not_null())
                    .col(ColumnDef::new(MacroData::KospiIndex).double().not_null())
                    .col(
                        ColumnDef::new(MacroData::KospiVolatility)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MacroData::UsdJpy).double().not_null())
                    .col(ColumnDef::new(MacroData::UsdCny).double().not_null())
                    .col(ColumnDef::new(MacroData::EurUsd).double().not_null())
                    .col(ColumnDef::new(MacroData::Vix).double().not_null())
                    .col(ColumnDef::new(MacroData::Gold).double().not_null())
                    .col(ColumnDef::new(MacroData::Dxy).double().not_null())
                    .col(ColumnDef::new(MacroData::UsRate).double().not_null())
                    .col(ColumnDef::new(MacroData::KrRate).double().not_null())
                    .col(ColumnDef::new(MacroData::Ird).double().not_null())
                    .col(ColumnDef::new(MacroData::UstSpread).double().not_null())
                    .col(
                        ColumnDef::new(MacroData::CreatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(MacroData::UpdatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MacroData::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MacroData {
    Table,
    Date,
    UsdKrw,
    WtiPrice,
    Sp500Index,
    KospiIndex,
    KospiVolatility,
    UsdJpy,
    UsdCny,
    EurUsd,
    Vix,
    Gold,
    Dxy,
    UsRate,
    KrRate,
    Ird,
    UstSpread,
    CreatedAt,
    UpdatedAt,
}
