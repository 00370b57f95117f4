//! HTTP capability used by the dispatcher.
//!
//! The dispatcher never talks to the network directly: it builds an
//! [`ApiRequest`] and hands it to a [`Transport`]. [`HttpTransport`] is the
//! production implementation; tests and embedding hosts can supply their own.
//!
//! # Examples
//!
//! ```rust,no_run
//! use guru_dm_bridge::{
//!     request::{ApiRequest, HttpMethod},
//!     transport::{HttpTransport, Transport},
//! };
//! use url::Url;
//!
//! # async fn example() -> guru_dm_bridge::error::Result<()> {
//! let transport = HttpTransport::new();
//! let base_url = Url::parse("https://api.guru.com.br").unwrap();
//! let request = ApiRequest::new(HttpMethod::Get, "/contacts/c-1")
//!     .with_header("Authorization", "Bearer token");
//!
//! let body = transport.execute(&base_url, &request).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use serde_json::Value;
use url::Url;

use crate::{error::Result, request::ApiRequest};

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Executes one API request and returns the parsed JSON body.
///
/// Implementations must:
/// - send exactly one request per call (no retries)
/// - map non-2xx responses to [`BridgeError::ApiError`](crate::error::BridgeError::ApiError)
/// - return [`Value::Null`] for an empty body
/// - return a 2xx body that is not JSON as [`Value::String`]
pub trait Transport: Send + Sync {
    /// Sends `request` against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent, the API answers with a
    /// non-2xx status, or the body is not valid JSON.
    fn execute<'a>(
        &'a self,
        base_url: &'a Url,
        request: &'a ApiRequest,
    ) -> impl Future<Output = Result<Value>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}
