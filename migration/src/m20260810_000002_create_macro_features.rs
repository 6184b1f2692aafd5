use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MacroFeatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacroFeatures::Date)
                            .date()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MacroFeatures::UsdKrw).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::WtiPrice).double().not_null())
                    .col(
                        ColumnDef::new(MacroFeatures::Sp500Index)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MacroFeatures::KospiIndex)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MacroFeatures::KospiVolatility)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MacroFeatures::UsdJpy).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::UsdCny).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::EurUsd).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Vix).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Gold).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Dxy).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::UsRate).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::KrRate).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Ird).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::UstSpread).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Ma7).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Ma60).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Macd).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::Rsi).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::BbMid).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::BbStd).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::BbUpper).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::BbLower).double().not_null())
                    .col(
                        ColumnDef::new(MacroFeatures::WtiPriceChg)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MacroFeatures::Sp500IndexChg)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MacroFeatures::KospiIndexChg)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MacroFeatures::GoldChg).double().not_null())
                    .col(ColumnDef::new(MacroFeatures::DxyChg).double().not_null())
                    .col(
                        ColumnDef::new(MacroFeatures::TargetReturn)
                            .double()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MacroFeatures::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MacroFeatures {
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
    Ma7,
    Ma60,
    Macd,
    Rsi,
    BbMid,
    BbStd,
    BbUpper,
    BbLower,
    WtiPriceChg,
    Sp500IndexChg,
    KospiIndexChg,
    GoldChg,
    DxyChg,
    TargetReturn,
}
