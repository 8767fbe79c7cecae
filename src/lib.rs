//! itad-compare - Game price comparison CLI
//!
//! Searches IsThereAnyDeal for a title, fetches game info and current
//! shop prices concurrently, and renders the best deals per game.

pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod filters;
pub mod format;
pub mod itad;
pub mod steam;

pub use config::Config;
pub use display::{GameCard, ReviewColor};
pub use error::Error;
pub use itad::models::{Deal, GameCandidate, GameInfo, PriceRecord, Shop};
