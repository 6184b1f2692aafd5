//! `SeaORM` Entity for the macro_features derived table (rebuilt wholesale each run)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "macro_features")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    pub usd_krw: f64,
    pub wti_price: f64,
    pub sp500_index: f64,
    pub kospi_index: f64,
    pub kospi_volatility: f64,
    pub usd_jpy: f64,
    pub usd_cny: f64,
    pub eur_usd: f64,
    pub vix: f64,
    pub gold: f64,
    pub dxy: f64,
    pub us_rate: f64,
    pub kr_rate: f64,
    pub ird: f64,
    pub ust_spread: f64,
    /// 7-day simple moving average of usd_krw
    pub ma7: f64,
    /// 60-day simple moving average of usd_krw
    pub ma60: f64,
    /// EWMA(12) - EWMA(26) of usd_krw
    pub macd: f64,
    /// 14-day relative strength index, 0-100
    pub rsi: f64,
    pub bb_mid: f64,
    pub bb_std: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub wti_price_chg: f64,
    pub sp500_index_chg: f64,
    pub kospi_index_chg: f64,
    pub gold_chg: f64,
    pub dxy_chg: f64,
    /// Label: ln(usd_krw(t + horizon) / usd_krw(t))
    pub target_return: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
