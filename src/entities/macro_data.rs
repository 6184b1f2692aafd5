//! `SeaORM` Entity for the macro_data primary store (one row per calendar date)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "macro_data")]
pub struct Model {
    /// Calendar day the observations belong to
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    /// KRW per USD spot rate (forecast target)
    pub usd_krw: f64,
    pub wti_price: f64,
    pub sp500_index: f64,
    pub kospi_index: f64,
    /// Absolute day-over-day percent change of the KOSPI level
    pub kospi_volatility: f64,
    pub usd_jpy: f64,
    pub usd_cny: f64,
    pub eur_usd: f64,
    pub vix: f64,
    pub gold: f64,
    pub dxy: f64,
    pub us_rate: f64,
    pub kr_rate: f64,
    /// Interest-rate differential: us_rate - kr_rate
    pub ird: f64,
    /// US 10Y-2Y treasury spread
    pub ust_spread: f64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
