// src/lib.rs

//! quotegrab: quote page scraper with a durable dedup store

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
