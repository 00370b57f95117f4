//! Authentication strategies.
//!
//! The API has been deployed with two credential shapes: a raw API key and a
//! bearer user token. Both are handled through [`AuthStrategy`], chosen once
//! when the dispatcher is built.

use std::fmt;

use crate::error::{BridgeError, Result};

/// Header name used when none is configured.
pub const DEFAULT_API_KEY_HEADER: &str = "Authorization";

/// Produces the authentication headers attached to every request.
pub trait AuthStrategy: Send + Sync + fmt::Debug {
    /// Returns `(name, value)` header pairs.
    fn headers(&self) -> Vec<(String, String)>;

    /// Short scheme name for logs (never the secret).
    fn scheme(&self) -> &'static str;
}

/// `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    /// Creates a bearer strategy.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(BridgeError::MissingCredentials("user token is empty".to_owned()));
        }
        Ok(Self { token })
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"[REDACTED]").finish()
    }
}

impl AuthStrategy for BearerAuth {
    fn headers(&self) -> Vec<(String, String)> {
        vec![("Authorization".to_owned(), format!("Bearer {}", self.token))]
    }

    fn scheme(&self) -> &'static str {
        "bearer"
    }
}

/// Raw API key sent as-is in a single header.
#[derive(Clone)]
pub struct ApiKeyAuth {
    header: String,
    key: String,
}

impl ApiKeyAuth {
    /// Creates an API-key strategy sending the key in [`DEFAULT_API_KEY_HEADER`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the key is blank.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        Self::with_header(DEFAULT_API_KEY_HEADER, key)
    }

    /// Creates an API-key strategy sending the key in `header`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the key is blank and
    /// [`BridgeError::ConfigError`] if the header name is blank.
    pub fn with_header(header: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let header = header.into();
        let key = key.into();
        if header.trim().is_empty() {
            return Err(BridgeError::ConfigError("API key header name is empty".to_owned()));
        }
        if key.trim().is_empty() {
            return Err(BridgeError::MissingCredentials("API key is empty".to_owned()));
        }
        Ok(Self { header, key })
    }

    /// Header the key is sent in.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("header", &self.header)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl AuthStrategy for ApiKeyAuth {
    fn headers(&self) -> Vec<(String, String)> {
        vec![(self.header.clone(), self.key.clone())]
    }

    fn scheme(&self) -> &'static str {
        "api_key"
    }
}

/// Credential object handed over by the host.
#[derive(Clone)]
pub enum Credentials {
    /// Raw API key, optionally in a custom header.
    ApiKey {
        /// The key.
        api_key: String,
        /// Header override.
        header: Option<String>,
    },
    /// Bearer user token.
    UserToken {
        /// The token.
        user_token: String,
    },
}

impl Credentials {
    /// Builds the strategy for these credentials.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the secret is blank.
    pub fn into_strategy(self) -> Result<Box<dyn AuthStrategy>> {
        match self {
            Self::ApiKey { api_key, header: Some(header) } => {
                Ok(Box::new(ApiKeyAuth::with_header(header, api_key)?))
            }
            Self::ApiKey { api_key, header: None } => Ok(Box::new(ApiKeyAuth::new(api_key)?)),
            Self::UserToken { user_token } => Ok(Box::new(BearerAuth::new(user_token)?)),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &"[REDACTED]")
                .field("header", header)
                .finish(),
            Self::UserToken { .. } => {
                f.debug_struct("UserToken").field("user_token", &"[REDACTED]").finish()
            }
        }
    }
}
