//! Bridge configuration types.
//!
//! This module defines TOML-deserializable configuration for the dispatcher:
//! base URL, dispatch table profile, credentials source, endpoint overrides
//! and HTTP transport settings.

use std::path::Path;

use serde::Deserialize;
use url::{Host, Url};

use crate::{
    auth::Credentials,
    error::{BridgeError, Result},
    resource::ApiProfile,
    transport::HttpConfig,
};

/// Base URL of the public Guru Digital Manager API.
pub const DEFAULT_BASE_URL: &str = "https://api.guru.com.br";

/// Root bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Dispatch table variant.
    #[serde(default)]
    pub profile: ApiProfile,

    /// Where credentials come from.
    pub auth: AuthConfig,

    /// Endpoint path overrides.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Accept `http://` and loopback base URLs (local mocks only).
    #[serde(default)]
    pub allow_insecure_base_url: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

impl BridgeConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if parsing or validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use guru_dm_bridge::config::BridgeConfig;
    ///
    /// let config = BridgeConfig::from_toml(
    ///     r#"
    ///     [auth]
    ///     type = "bearer"
    ///     env_var = "GURU_USER_TOKEN"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.base_url, "https://api.guru.com.br");
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| BridgeError::ConfigError(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if the file cannot be read or is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BridgeError::ConfigError(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - the base URL parses, uses HTTPS and is not a loopback address
    ///   (skipped when `allow_insecure_base_url` is set)
    /// - endpoint templates are relative and free of traversal sequences
    /// - auth env var and header names are well formed
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidBaseUrl`] or [`BridgeError::ConfigError`].
    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.base_url, self.allow_insecure_base_url)?;
        self.endpoints.validate()?;
        self.auth.validate()?;
        self.http.validate()?;
        Ok(())
    }
}

/// Parses a base URL and applies the transport safety rules.
///
/// With `allow_insecure` only "parses and has a host" is enforced.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidBaseUrl`] if the URL is malformed, not HTTPS
/// or points at a loopback host while `allow_insecure` is false.
pub fn validate_base_url(base_url: &str, allow_insecure: bool) -> Result<Url> {
    let invalid = |reason: String| BridgeError::InvalidBaseUrl(format!("'{base_url}': {reason}"));

    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if url.host().is_none() {
        return Err(invalid("no host".to_owned()));
    }

    if !allow_insecure {
        if url.scheme() != "https" {
            return Err(invalid(format!("scheme {} is not https", url.scheme())));
        }
        if is_loopback_host(&url) {
            return Err(invalid("loopback hosts are only allowed for local testing".to_owned()));
        }
    }

    Ok(url)
}

/// Whether the URL points at this machine (`localhost`, `127.0.0.0/8`, `::1`).
pub(crate) fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

/// Whether a request path or template is absolute and cannot escape its
/// prefix.
pub(crate) fn is_safe_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains("..") && !path.contains("//")
}

/// Endpoint path overrides.
///
/// Entity templates use `{id}` as placeholder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointConfig {
    /// Contacts collection (default: "/contacts").
    pub contacts: Option<String>,
    /// Single contact template (default: "/contacts/{id}").
    pub contact: Option<String>,
    /// Transactions collection (default: "/transactions").
    pub transactions: Option<String>,
    /// Single transaction template (default: "/transactions/{id}").
    pub transaction: Option<String>,
    /// Subscriptions collection (default: "/subscriptions").
    pub subscriptions: Option<String>,
    /// Single subscription template (default: "/subscriptions/{id}").
    pub subscription: Option<String>,
}

impl EndpointConfig {
    /// Validates endpoint templates.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if any template is invalid.
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("contacts", &self.contacts),
            ("contact", &self.contact),
            ("transactions", &self.transactions),
            ("transaction", &self.transaction),
            ("subscriptions", &self.subscriptions),
            ("subscription", &self.subscription),
        ];

        for (name, endpoint) in endpoints {
            if let Some(path) = endpoint {
                validate_endpoint_path(name, path)?;
            }
        }

        Ok(())
    }
}

fn validate_endpoint_path(name: &str, path: &str) -> Result<()> {
    if is_safe_path(path) {
        Ok(())
    } else {
        Err(BridgeError::ConfigError(format!(
            "endpoints.{name} = {path:?} must start with '/' and contain no '..' or '//'"
        )))
    }
}

/// Credentials source.
///
/// Secrets are never stored in the configuration file, only the name of the
/// environment variable holding them.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Raw API key sent in a header.
    ApiKey {
        /// Header name (default: `Authorization`).
        #[serde(default)]
        header: Option<String>,
        /// Environment variable containing the key.
        env_var: String,
    },
    /// Bearer user token.
    Bearer {
        /// Environment variable containing the token.
        env_var: String,
    },
}

impl AuthConfig {
    /// Validates env var and header names.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if a name is malformed.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::ApiKey { header, env_var } => {
                validate_env_var_name(env_var)?;
                if let Some(header) = header {
                    validate_header_name(header)?;
                }
            }
            Self::Bearer { env_var } => validate_env_var_name(env_var)?,
        }
        Ok(())
    }

    /// Name of the environment variable holding the secret.
    #[must_use]
    pub fn env_var(&self) -> &str {
        match self {
            Self::ApiKey { env_var, .. } | Self::Bearer { env_var } => env_var,
        }
    }

    /// Resolves credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the variable is unset or empty.
    pub fn resolve(&self) -> Result<Credentials> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolves credentials through a custom lookup.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the lookup yields nothing
    /// or an empty value.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_var = self.env_var();
        let secret = lookup(env_var).filter(|value| !value.trim().is_empty()).ok_or_else(|| {
            BridgeError::MissingCredentials(format!("environment variable {env_var} is not set"))
        })?;

        Ok(match self {
            Self::ApiKey { header, .. } => {
                Credentials::ApiKey { api_key: secret, header: header.clone() }
            }
            Self::Bearer { .. } => Credentials::UserToken { user_token: secret },
        })
    }
}

/// POSIX-style names: a letter or `_`, then letters, digits or `_`.
fn validate_env_var_name(name: &str) -> Result<()> {
    let well_formed = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(BridgeError::ConfigError(format!(
            "auth.env_var {name:?} is not a valid variable name"
        )))
    }
}

/// Header names are restricted to ASCII letters, digits, `-` and `_`.
fn validate_header_name(name: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_');
    let well_formed = !name.is_empty() && name.chars().all(allowed);

    if well_formed {
        Ok(())
    } else {
        Err(BridgeError::ConfigError(format!(
            "auth.header {name:?} is not a valid header name"
        )))
    }
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "tests use unreachable! for exhaustive pattern matching"
)]
mod tests {
    use super::*;

    const BEARER_AUTH: &str = r#"
        [auth]
        type = "bearer"
        env_var = "GURU_USER_TOKEN"
    "#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = BridgeConfig::from_toml(BEARER_AUTH).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.profile, ApiProfile::Extended);
        assert!(config.endpoints.contacts.is_none());
        assert!(!config.allow_insecure_base_url);
        assert_eq!(config.auth.env_var(), "GURU_USER_TOKEN");
    }

    #[test]
    fn test_full_config_from_toml() {
        let toml = r#"
            base_url = "https://sandbox.guru.com.br/api/v2"
            profile = "classic"

            [auth]
            type = "api_key"
            header = "X-API-Key"
            env_var = "GURU_API_KEY"

            [endpoints]
            contacts = "/v2/contacts"
            contact = "/v2/contacts/{id}"

            [http]
            timeout_secs = 45
        "#;

        let config = BridgeConfig::from_toml(toml).unwrap();
        assert_eq!(config.base_url, "https://sandbox.guru.com.br/api/v2");
        assert_eq!(config.profile, ApiProfile::Classic);
        assert_eq!(config.endpoints.contacts.as_deref(), Some("/v2/contacts"));
        assert_eq!(config.http.timeout_secs, 45);
        let AuthConfig::ApiKey { header, env_var } = &config.auth else {
            unreachable!("expected api_key auth")
        };
        assert_eq!(header.as_deref(), Some("X-API-Key"));
        assert_eq!(env_var, "GURU_API_KEY");
    }

    #[test]
    fn test_missing_auth_section_is_rejected() {
        let result = BridgeConfig::from_toml("base_url = \"https://api.guru.com.br\"");
        assert!(matches!(result, Err(BridgeError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(BridgeConfig::from_toml("invalid toml {{{").is_err());
    }

    #[test]
    fn test_http_base_url_rejected() {
        let toml = format!("base_url = \"http://api.guru.com.br\"\n{BEARER_AUTH}");
        let result = BridgeConfig::from_toml(&toml);
        assert!(matches!(result, Err(BridgeError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_loopback_base_url_rejected_unless_allowed() {
        let toml = format!("base_url = \"https://127.0.0.1:8443\"\n{BEARER_AUTH}");
        assert!(matches!(BridgeConfig::from_toml(&toml), Err(BridgeError::InvalidBaseUrl(_))));

        let toml = format!(
            "base_url = \"http://localhost:8080\"\nallow_insecure_base_url = true\n{BEARER_AUTH}"
        );
        assert!(BridgeConfig::from_toml(&toml).is_ok());
    }

    #[test]
    fn test_validate_base_url_requires_host() {
        assert!(validate_base_url("not a url", false).is_err());
        assert!(validate_base_url("https://api.guru.com.br", false).is_ok());
    }

    #[test]
    fn test_loopback_detection() {
        for base in ["https://LocalHost", "https://127.10.0.1", "https://[::1]:8443"] {
            assert!(is_loopback_host(&Url::parse(base).unwrap()), "{base}");
        }
        assert!(!is_loopback_host(&Url::parse("https://api.guru.com.br").unwrap()));
        assert!(!is_loopback_host(&Url::parse("https://10.0.0.1").unwrap()));
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(validate_endpoint_path("contacts", "/contacts").is_ok());
        assert!(validate_endpoint_path("contacts", "/../etc").is_err());
        assert!(validate_endpoint_path("contacts", "/api//contacts").is_err());
        assert!(validate_endpoint_path("contacts", "contacts").is_err());
    }

    #[test]
    fn test_env_var_validation() {
        assert!(validate_env_var_name("GURU_TOKEN").is_ok());
        assert!(validate_env_var_name("_TOKEN").is_ok());
        assert!(validate_env_var_name("").is_err());
        assert!(validate_env_var_name("1TOKEN").is_err());
        assert!(validate_env_var_name("GURU-TOKEN").is_err());
    }

    #[test]
    fn test_header_name_validation() {
        assert!(validate_header_name("X-API-Key").is_ok());
        assert!(validate_header_name("").is_err());
        assert!(validate_header_name("X-Evil\r\n").is_err());
    }

    #[test]
    fn test_resolve_with_lookup() {
        let auth = AuthConfig::Bearer { env_var: "GURU_USER_TOKEN".to_owned() };
        let credentials = auth
            .resolve_with(|name| (name == "GURU_USER_TOKEN").then(|| "tok".to_owned()))
            .unwrap();
        let Credentials::UserToken { user_token } = credentials else {
            unreachable!("expected user token")
        };
        assert_eq!(user_token, "tok");
    }

    #[test]
    fn test_resolve_missing_or_empty_secret() {
        let auth = AuthConfig::ApiKey { header: None, env_var: "GURU_API_KEY".to_owned() };
        assert!(matches!(auth.resolve_with(|_| None), Err(BridgeError::MissingCredentials(_))));
        assert!(matches!(
            auth.resolve_with(|_| Some("  ".to_owned())),
            Err(BridgeError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_from_file_not_found() {
        let result = BridgeConfig::from_file("/nonexistent/path/guru.toml");
        let Err(BridgeError::ConfigError(msg)) = result else {
            unreachable!("expected ConfigError")
        };
        assert!(msg.contains("cannot read config file"));
    }
}
