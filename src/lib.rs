// src/lib.rs

pub mod config;
pub mod error;

pub mod entities {
    pub mod prelude;
    pub mod macro_data;
    pub mod macro_features;
}

pub mod services {
    pub mod series;
    pub mod indicators;
    pub mod market_data;
    pub mod fred;
    pub mod integrator;
    pub mod ingest;
    pub mod features;
    pub mod observations;
    pub mod forecast;
}
