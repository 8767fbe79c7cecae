//! Steam Web API access, used only to seed example titles.

mod client;

pub use client::{MostPlayed, SteamClient};
