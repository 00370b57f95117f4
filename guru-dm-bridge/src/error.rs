//! Error types for the Guru Digital Manager bridge.
//!
//! All errors implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Setup Errors** ([`BridgeError::MissingCredentials`], [`BridgeError::ConfigError`],
//!   [`BridgeError::InvalidBaseUrl`]): raised before any item is processed
//! - **Dispatch Errors** ([`BridgeError::UnsupportedOperation`],
//!   [`BridgeError::UnknownResource`], [`BridgeError::InvalidParameter`]): fatal for the
//!   current item only
//! - **Network Errors** ([`BridgeError::HttpError`], [`BridgeError::ApiError`],
//!   [`BridgeError::TransportError`], [`BridgeError::InvalidResponse`]): transport or
//!   server-side failures for the current item
//!
//! # Examples
//!
//! ```
//! use guru_dm_bridge::error::{BridgeError, Result};
//!
//! fn require_id(id: &str) -> Result<&str> {
//!     if id.is_empty() {
//!         return Err(BridgeError::InvalidParameter("contactId is required".to_owned()));
//!     }
//!     Ok(id)
//! }
//!
//! assert!(require_id("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while dispatching Guru Digital Manager operations.
///
/// The `Display` output of every variant is user-facing: it is what ends up in
/// the `{"error": ...}` record when an execution tolerates failures.
///
/// # Error Recovery
///
/// - **Setup errors**: fix the configuration or credentials and rerun
/// - **Dispatch errors**: fix the item parameters; other items are unaffected
/// - **Network errors**: inspect the status and message returned by the API
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BridgeError {
    /// HTTP request failed before a response was received.
    ///
    /// Wraps [`reqwest::Error`]. Common causes include connection refused,
    /// DNS failures, TLS errors and timeouts configured on the transport.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    ///
    /// `message` carries the response body (truncated) so the host can show
    /// the server's own explanation.
    #[error("Guru API returned status {status}: {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The requested operation is not part of the active dispatch table.
    ///
    /// # Examples
    ///
    /// ```
    /// use guru_dm_bridge::error::BridgeError;
    ///
    /// let err = BridgeError::UnsupportedOperation {
    ///     operation: "create".to_owned(),
    ///     resource: "subscription".to_owned(),
    /// };
    /// assert_eq!(err.to_string(), "Operation create not supported for subscriptions");
    /// ```
    #[error("Operation {operation} not supported for {resource}s")]
    UnsupportedOperation {
        /// Operation name as requested by the host.
        operation: String,
        /// Resource name as requested by the host.
        resource: String,
    },

    /// The requested resource does not exist in this API.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Credentials are absent or empty.
    ///
    /// This is a setup error: it is raised before any item is processed and is
    /// never converted into an `{"error": ...}` record.
    #[error("Credentials are required: {0}")]
    MissingCredentials(String),

    /// An item parameter is missing or out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration failed to parse or validate.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Base URL is malformed or rejected by validation.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Transport rejected the request before sending it.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The API answered with a body that is neither JSON nor UTF-8 text.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl BridgeError {
    /// Returns true for errors that must abort the whole execution even when
    /// failures are tolerated per item.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials(_) | Self::ConfigError(_) | Self::InvalidBaseUrl(_)
        )
    }
}
