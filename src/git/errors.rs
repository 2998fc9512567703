//! Error types for the git provider domain

use thiserror::Error;

/// Errors from git provider operations
#[derive(Error, Debug)]
pub enum GitError {
    /// The host did not match a known provider and no kind was given
    #[error("Cannot determine git provider for host '{host}'; specify the kind explicitly")]
    UnknownProvider {
        /// Host that could not be matched.
        host: String,
    },

    /// A git URL could not be parsed
    #[error("Invalid git URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Authentication was rejected by the provider
    #[error("Authentication failed for {server}; check the configured API token")]
    Auth {
        /// Server that rejected the credentials.
        server: String,
    },

    /// The requested entity does not exist
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// The provider returned a non-success status
    #[error("Provider API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The HTTP request itself failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Auth configuration is missing or incomplete
    #[error("Git auth configuration error: {0}")]
    Config(String),
}
