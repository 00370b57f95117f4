//! Request descriptors.
//!
//! An [`ApiRequest`] is built fresh for every item and handed to a
//! [`Transport`](crate::transport::Transport). It holds a path relative to the
//! base URL; [`ApiRequest::url`] joins the two and encodes the query.

use std::fmt;

use serde_json::Value;
use url::Url;

use crate::error::{BridgeError, Result};

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    /// Headers, auth included.
    pub headers: Vec<(String, String)>,
    /// JSON body for create and update.
    pub body: Option<Value>,
    /// Query parameters, in sending order.
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a request without headers, body or query.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), body: None, query: Vec::new() }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Value of a header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Joins the path onto `base_url` and appends the encoded query.
    ///
    /// A path prefix on the base URL (`https://host/api/v2`) is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidBaseUrl`] if the joined URL does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use guru_dm_bridge::request::{ApiRequest, HttpMethod};
    /// use url::Url;
    ///
    /// let base = Url::parse("https://api.guru.com.br").unwrap();
    /// let request = ApiRequest::new(HttpMethod::Get, "/contacts")
    ///     .with_query(vec![("limit".to_owned(), "10".to_owned())]);
    /// let url = request.url(&base).unwrap();
    /// assert_eq!(url.as_str(), "https://api.guru.com.br/contacts?limit=10");
    /// ```
    pub fn url(&self, base_url: &Url) -> Result<Url> {
        let joined = format!("{}{}", base_url.as_str().trim_end_matches('/'), self.path);
        let mut url =
            Url::parse(&joined).map_err(|e| BridgeError::InvalidBaseUrl(format!("{joined}: {e}")))?;

        if !self.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_url_without_query() {
        let request = ApiRequest::new(HttpMethod::Delete, "/contacts/c-1");
        let url = request.url(&base("https://api.guru.com.br/")).unwrap();
        assert_eq!(url.as_str(), "https://api.guru.com.br/contacts/c-1");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let request = ApiRequest::new(HttpMethod::Get, "/transactions/t-1");
        let url = request.url(&base("https://sandbox.guru.com.br/api/v2")).unwrap();
        assert_eq!(url.as_str(), "https://sandbox.guru.com.br/api/v2/transactions/t-1");
    }

    #[test]
    fn test_url_encodes_query_in_order() {
        let request = ApiRequest::new(HttpMethod::Get, "/contacts").with_query(vec![
            ("email".to_owned(), "a+b@example.com".to_owned()),
            ("name".to_owned(), "Ana Maria".to_owned()),
            ("limit".to_owned(), "5".to_owned()),
        ]);
        let url = request.url(&base("https://api.guru.com.br")).unwrap();
        assert_eq!(url.query(), Some("email=a%2Bb%40example.com&name=Ana+Maria&limit=5"));
    }

    #[test]
    fn test_builders_and_lookups() {
        let request = ApiRequest::new(HttpMethod::Post, "/contacts")
            .with_header("Content-Type", "application/json")
            .with_body(json!({"name": "Ana"}));

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("Accept"), None);
        assert_eq!(request.body, Some(json!({"name": "Ana"})));
        assert_eq!(request.query_param("limit"), None);
        assert_eq!(request.method.to_string(), "POST");
    }
}
