//! CLI command implementations.

pub mod random;
pub mod search;
pub mod shops;

pub use random::RandomCommand;
pub use search::SearchCommand;
pub use shops::ShopsCommand;
