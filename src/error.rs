//! Fatal error conditions surfaced to the user.

use thiserror::Error;

/// Errors that stop a command instead of degrading to empty output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No API key configured. Set ITAD_API_KEY, pass --api-key, or add api_key to config.toml")]
    MissingApiKey,

    #[error("You need to enter a game title")]
    EmptyTitle,

    #[error("The Steam most played chart returned no games")]
    EmptyChart,

    #[error("Could not find an example title after {attempts} attempts")]
    NoExampleTitle { attempts: u32 },
}
