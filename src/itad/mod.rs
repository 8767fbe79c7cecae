//! IsThereAnyDeal API client and response models.

pub mod client;
pub mod models;

pub use client::{DealsApi, ItadClient};
pub use models::{Deal, GameCandidate, GameInfo, PriceRecord, Shop, ShopDirectory};
