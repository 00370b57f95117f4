//! Resource operation dispatcher.
//!
//! For every input item the dispatcher resolves a [`Command`], builds exactly
//! one [`ApiRequest`], sends it through the [`Transport`] and appends the
//! normalized records to the output. Items are processed strictly one after
//! the other, in input order.
//!
//! # Failure handling
//!
//! A failing item aborts the execution unless `continue_on_fail` is set, in
//! which case an `{"error": "<message>"}` record takes its place. Setup errors
//! (see [`BridgeError::is_setup_error`]) are never turned into records.
//!
//! # Examples
//!
//! ```rust,no_run
//! use guru_dm_bridge::{
//!     auth::Credentials,
//!     dispatcher::Dispatcher,
//!     params::ExecutionInput,
//!     transport::HttpTransport,
//! };
//!
//! # async fn example() -> guru_dm_bridge::error::Result<()> {
//! let credentials = Credentials::UserToken { user_token: "token".to_owned() };
//! let dispatcher = Dispatcher::new(HttpTransport::new(), "https://api.guru.com.br", credentials)?;
//!
//! let input = ExecutionInput::from_json(
//!     r#"{"resource":"contact","operation":"getAll","items":[{"limit":10}]}"#,
//! )?;
//! let records = dispatcher.execute(&input).await?;
//! println!("{} contacts", records.len());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    auth::{AuthStrategy, Credentials},
    command::{Action, Command, EntityId},
    config::{BridgeConfig, validate_base_url},
    endpoint::{ConfigurableEndpointResolver, DefaultEndpointResolver, EndpointResolver},
    error::{BridgeError, Result},
    filters::build_query,
    output::{delete_acknowledgment, error_record, flatten_response},
    params::{ExecutionInput, ItemParameters},
    request::{ApiRequest, HttpMethod},
    resource::{ApiProfile, Operation, Resource},
    transport::Transport,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Result of a whole execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOutcome {
    /// Flat output sequence, in input order.
    pub records: Vec<Value>,
    /// Items that failed and were replaced by an error record.
    pub failed: usize,
}

impl ExecutionOutcome {
    /// Records that do not stand in for a failed item.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.records.len().saturating_sub(self.failed)
    }
}

/// Dispatches Guru Digital Manager operations over a [`Transport`].
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: T,
    base_url: Url,
    auth: Box<dyn AuthStrategy>,
    resolver: Box<dyn EndpointResolver>,
    profile: ApiProfile,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher with the default endpoints and the extended
    /// dispatch table.
    ///
    /// The base URL must be HTTPS and must not point at a loopback host.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the credentials are
    /// blank, or [`BridgeError::InvalidBaseUrl`] if the base URL is rejected.
    pub fn new(transport: T, base_url: &str, credentials: Credentials) -> Result<Self> {
        let auth = credentials.into_strategy()?;
        let base_url = validate_base_url(base_url, false)?;

        Ok(Self {
            transport,
            base_url,
            auth,
            resolver: Box::new(DefaultEndpointResolver::new()),
            profile: ApiProfile::default(),
        })
    }

    /// Creates a dispatcher from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingCredentials`] if the credentials are
    /// blank, or [`BridgeError::InvalidBaseUrl`] if the base URL is rejected.
    pub fn from_config(
        transport: T,
        config: &BridgeConfig,
        credentials: Credentials,
    ) -> Result<Self> {
        let auth = credentials.into_strategy()?;
        let base_url = validate_base_url(&config.base_url, config.allow_insecure_base_url)?;

        Ok(Self {
            transport,
            base_url,
            auth,
            resolver: Box::new(ConfigurableEndpointResolver::new(&config.endpoints)),
            profile: config.profile,
        })
    }

    /// Replaces the dispatch table variant.
    #[must_use]
    pub fn with_profile(mut self, profile: ApiProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Replaces the endpoint resolver.
    #[must_use]
    pub fn with_resolver<R: EndpointResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Active dispatch table variant.
    #[must_use]
    pub const fn profile(&self) -> ApiProfile {
        self.profile
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the request descriptor of a command.
    ///
    /// Every request carries the auth headers plus `Content-Type` and `Accept`
    /// set to `application/json`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if the body cannot be
    /// serialized.
    pub fn build_request(&self, command: &Command) -> Result<ApiRequest> {
        let request = match command {
            Command::Contact(action) => self.action_request(Resource::Contact, action)?,
            Command::Transaction(action) => self.action_request(Resource::Transaction, action)?,
            Command::Subscription(action) => self.action_request(Resource::Subscription, action)?,
        };

        let request = self
            .auth
            .headers()
            .into_iter()
            .fold(request, |request, (name, value)| request.with_header(name, value))
            .with_header("Content-Type", JSON_CONTENT_TYPE)
            .with_header("Accept", JSON_CONTENT_TYPE);

        Ok(request)
    }

    fn action_request<F: Serialize>(
        &self,
        resource: Resource,
        action: &Action<F>,
    ) -> Result<ApiRequest> {
        let collection = || self.resolver.collection_endpoint(resource);
        let entity = |id: &EntityId| self.resolver.entity_endpoint(resource, id.as_str());

        Ok(match action {
            Action::Create { fields } => {
                ApiRequest::new(HttpMethod::Post, collection()).with_body(to_body(fields)?)
            }
            Action::Get { id } => ApiRequest::new(HttpMethod::Get, entity(id)),
            Action::GetAll { filters, pagination } => ApiRequest::new(HttpMethod::Get, collection())
                .with_query(build_query(filters, *pagination)),
            Action::Update { id, fields } => {
                ApiRequest::new(HttpMethod::Put, entity(id)).with_body(to_body(fields)?)
            }
            Action::Delete { id } => ApiRequest::new(HttpMethod::Delete, entity(id)),
        })
    }

    /// Runs one typed item and returns its records.
    ///
    /// # Errors
    ///
    /// Returns error if the pair is unsupported, a parameter is invalid, or the
    /// request fails.
    pub async fn dispatch(
        &self,
        resource: Resource,
        operation: Operation,
        params: &ItemParameters,
    ) -> Result<Vec<Value>> {
        let command = Command::from_params(self.profile, resource, operation, params)?;
        self.send(&command).await
    }

    async fn send(&self, command: &Command) -> Result<Vec<Value>> {
        let request = self.build_request(command)?;

        debug!(
            method = %request.method,
            path = %request.path,
            query_params = request.query.len(),
            auth = self.auth.scheme(),
            "request built"
        );

        let body = self.transport.execute(&self.base_url, &request).await?;

        Ok(match command.operation() {
            Operation::Delete => vec![delete_acknowledgment(command.resource())],
            _ => flatten_response(body),
        })
    }

    #[instrument(skip_all, fields(item = index))]
    async fn dispatch_item(
        &self,
        index: usize,
        resource: &str,
        operation: &str,
        item: &Value,
    ) -> Result<Vec<Value>> {
        let resource: Resource = resource.parse()?;
        let operation = Operation::parse_for(operation, resource)?;
        self.profile.ensure_supported(resource, operation)?;
        let params = ItemParameters::from_value(item.clone())?;

        self.send(&Command::resolve(resource, operation, &params)?).await
    }

    /// Runs an execution and returns the flat output sequence.
    ///
    /// # Errors
    ///
    /// Returns the first item error when `continue_on_fail` is off, and any
    /// setup error regardless of it.
    pub async fn execute(&self, input: &ExecutionInput) -> Result<Vec<Value>> {
        Ok(self.run(input).await?.records)
    }

    /// Runs an execution and reports how many items failed alongside the
    /// records.
    ///
    /// Error records are counted as they are produced, so an API record that
    /// happens to look like `{"error": ...}` is not mistaken for a failure.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    #[instrument(
        skip(self, input),
        fields(
            execution_id = %Uuid::new_v4(),
            resource = %input.resource,
            operation = %input.operation,
            items = input.items.len(),
            protocol = self.transport.protocol_name()
        )
    )]
    pub async fn run(&self, input: &ExecutionInput) -> Result<ExecutionOutcome> {
        info!(continue_on_fail = input.continue_on_fail, "execution started");

        let mut output = Vec::with_capacity(input.items.len());
        let mut failed = 0_usize;

        for (index, item) in input.items.iter().enumerate() {
            match self.dispatch_item(index, &input.resource, &input.operation, item).await {
                Ok(records) => output.extend(records),
                Err(error) if input.continue_on_fail && !error.is_setup_error() => {
                    warn!(item = index, error = %error, "item failed, recording error");
                    failed += 1;
                    output.push(error_record(&error));
                }
                Err(error) => {
                    warn!(item = index, error = %error, "item failed, aborting execution");
                    return Err(error);
                }
            }
        }

        info!(records = output.len(), failed, "execution finished");
        Ok(ExecutionOutcome { records: output, failed })
    }
}

fn to_body<F: Serialize>(fields: &F) -> Result<Value> {
    serde_json::to_value(fields)
        .map_err(|e| BridgeError::InvalidParameter(format!("cannot serialize request body: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{auth::DEFAULT_API_KEY_HEADER, config::EndpointConfig, transport::HttpTransport};

    fn dispatcher() -> Dispatcher<HttpTransport> {
        let credentials = Credentials::UserToken { user_token: "tok".to_owned() };
        Dispatcher::new(HttpTransport::new(), "https://api.guru.com.br", credentials).unwrap()
    }

    fn command(resource: Resource, operation: Operation, item: Value) -> Command {
        let params = ItemParameters::from_value(item).unwrap();
        Command::from_params(ApiProfile::Extended, resource, operation, &params).unwrap()
    }

    #[test]
    fn test_new_rejects_blank_credentials() {
        let credentials = Credentials::UserToken { user_token: "  ".to_owned() };
        let result = Dispatcher::new(HttpTransport::new(), "https://api.guru.com.br", credentials);
        assert!(matches!(result, Err(BridgeError::MissingCredentials(_))));
    }

    #[test]
    fn test_new_rejects_insecure_base_url() {
        let credentials = Credentials::UserToken { user_token: "tok".to_owned() };
        let result = Dispatcher::new(HttpTransport::new(), "http://api.guru.com.br", credentials);
        assert!(matches!(result, Err(BridgeError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_build_request_sets_common_headers() {
        let request = dispatcher()
            .build_request(&command(Resource::Contact, Operation::Get, json!({"contactId": "c-1"})))
            .unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path, "/contacts/c-1");
        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_build_request_with_api_key() {
        let credentials = Credentials::ApiKey { api_key: "raw-key".to_owned(), header: None };
        let dispatcher =
            Dispatcher::new(HttpTransport::new(), "https://api.guru.com.br", credentials).unwrap();

        let request = dispatcher
            .build_request(&command(Resource::Subscription, Operation::GetAll, json!({})))
            .unwrap();
        assert_eq!(request.header(DEFAULT_API_KEY_HEADER), Some("raw-key"));
        assert_eq!(request.query_param("limit"), Some("50"));
    }

    #[test]
    fn test_build_request_create_body() {
        let fields = json!({"amount": 10, "status": "approved"});
        let item = json!({"transactionData": {"transactionFields": fields}});
        let request = dispatcher()
            .build_request(&command(Resource::Transaction, Operation::Create, item))
            .unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/transactions");
        let body = request.body.unwrap();
        assert_eq!(body["status"], "approved");
        assert!(body["amount"].is_number());
        assert!(body.get("description").is_none());
    }

    #[test]
    fn test_build_request_update_without_fields_sends_empty_object() {
        let request = dispatcher()
            .build_request(&command(
                Resource::Subscription,
                Operation::Update,
                json!({"subscriptionId": "s-1"}),
            ))
            .unwrap();

        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path, "/subscriptions/s-1");
        assert_eq!(request.body, Some(json!({})));
    }

    #[test]
    fn test_build_request_uses_configured_endpoints() {
        let endpoints = EndpointConfig {
            transaction: Some("/v2/transactions/{id}".to_owned()),
            ..Default::default()
        };
        let dispatcher = dispatcher().with_resolver(ConfigurableEndpointResolver::new(&endpoints));

        let request = dispatcher
            .build_request(&command(
                Resource::Transaction,
                Operation::Delete,
                json!({"transactionId": "t-1"}),
            ))
            .unwrap();
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.path, "/v2/transactions/t-1");
    }

    #[test]
    fn test_with_profile() {
        let dispatcher = dispatcher().with_profile(ApiProfile::Classic);
        assert_eq!(dispatcher.profile(), ApiProfile::Classic);
        assert_eq!(dispatcher.base_url().as_str(), "https://api.guru.com.br/");
    }
}
