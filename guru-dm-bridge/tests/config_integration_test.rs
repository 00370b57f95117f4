//! Integration tests for configuration-driven dispatchers.
//!
//! Tests the flow from a TOML file to the requests a dispatcher builds.

use guru_dm_bridge::{
    BridgeConfig, BridgeError, Dispatcher, Result,
    auth::Credentials,
    command::Command,
    config::AuthConfig,
    params::ItemParameters,
    request::{ApiRequest, HttpMethod},
    resource::{ApiProfile, Operation, Resource},
    transport::Transport,
};
use serde_json::{Value, json};
use url::Url;

struct NullTransport;

impl Transport for NullTransport {
    async fn execute<'a>(&'a self, _base_url: &'a Url, _request: &'a ApiRequest) -> Result<Value> {
        Ok(Value::Null)
    }

    fn protocol_name(&self) -> &'static str {
        "null"
    }
}

const FULL_CONFIG: &str = r#"
    base_url = "https://sandbox.guru.com.br/api/v2"
    profile = "classic"

    [auth]
    type = "api_key"
    header = "X-Guru-Key"
    env_var = "GURU_API_KEY"

    [endpoints]
    contacts = "/crm/contacts"
    contact = "/crm/contacts/{id}"
    subscriptions = "/billing/subscriptions"

    [http]
    timeout_secs = 20
    connect_timeout_secs = 5
"#;

fn lookup(name: &str) -> Option<String> {
    (name == "GURU_API_KEY").then(|| "key-from-env".to_owned())
}

fn request_for(
    dispatcher: &Dispatcher<NullTransport>,
    resource: Resource,
    operation: Operation,
    item: Value,
) -> ApiRequest {
    let params = ItemParameters::from_value(item).unwrap();
    let command = Command::from_params(dispatcher.profile(), resource, operation, &params).unwrap();
    dispatcher.build_request(&command).unwrap()
}

#[test]
fn test_full_configuration_flow() {
    let config = BridgeConfig::from_toml(FULL_CONFIG).expect("should parse valid TOML");
    assert_eq!(config.profile, ApiProfile::Classic);
    assert_eq!(config.http.timeout_secs, 20);

    let credentials = config.auth.resolve_with(lookup).unwrap();
    let dispatcher = Dispatcher::from_config(NullTransport, &config, credentials).unwrap();
    assert_eq!(dispatcher.base_url().as_str(), "https://sandbox.guru.com.br/api/v2");

    let item = json!({"contactId": "c-7"});
    let request = request_for(&dispatcher, Resource::Contact, Operation::Get, item);
    assert_eq!(request.path, "/crm/contacts/c-7");
    assert_eq!(request.header("X-Guru-Key"), Some("key-from-env"));
    assert_eq!(request.header("Authorization"), None);
    assert_eq!(
        request.url(dispatcher.base_url()).unwrap().as_str(),
        "https://sandbox.guru.com.br/api/v2/crm/contacts/c-7"
    );

    let request = request_for(&dispatcher, Resource::Subscription, Operation::GetAll, json!({}));
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.path, "/billing/subscriptions");

    let request = request_for(
        &dispatcher,
        Resource::Transaction,
        Operation::Delete,
        json!({"transactionId": "t-1"}),
    );
    assert_eq!(request.path, "/transactions/t-1");
}

#[test]
fn test_classic_profile_from_config_rejects_transaction_create() {
    let config = BridgeConfig::from_toml(FULL_CONFIG).unwrap();
    let credentials = config.auth.resolve_with(lookup).unwrap();
    let dispatcher = Dispatcher::from_config(NullTransport, &config, credentials).unwrap();

    let result = Command::from_params(
        dispatcher.profile(),
        Resource::Transaction,
        Operation::Create,
        &ItemParameters::default(),
    );
    assert!(matches!(result, Err(BridgeError::UnsupportedOperation { .. })));
}

#[test]
fn test_minimal_bearer_configuration() {
    let config = BridgeConfig::from_toml(
        r#"
        [auth]
        type = "bearer"
        env_var = "GURU_USER_TOKEN"
        "#,
    )
    .unwrap();

    let credentials = config
        .auth
        .resolve_with(|name| (name == "GURU_USER_TOKEN").then(|| "user-token".to_owned()))
        .unwrap();
    let dispatcher = Dispatcher::from_config(NullTransport, &config, credentials).unwrap();

    assert_eq!(dispatcher.profile(), ApiProfile::Extended);
    let request = request_for(&dispatcher, Resource::Contact, Operation::GetAll, json!({}));
    assert_eq!(request.path, "/contacts");
    assert_eq!(request.header("Authorization"), Some("Bearer user-token"));
}

#[test]
fn test_missing_secret_is_setup_error() {
    let config = BridgeConfig::from_toml(FULL_CONFIG).unwrap();
    let error = config.auth.resolve_with(|_| None).unwrap_err();

    assert!(error.is_setup_error());
    assert!(error.to_string().contains("GURU_API_KEY"));
}

#[test]
fn test_insecure_base_url_requires_opt_in() {
    let auth = r#"
        [auth]
        type = "bearer"
        env_var = "GURU_USER_TOKEN"
    "#;

    let rejected =
        BridgeConfig::from_toml(&format!("base_url = \"http://localhost:8080\"\n{auth}"));
    assert!(matches!(rejected, Err(BridgeError::InvalidBaseUrl(_))));

    let config = BridgeConfig::from_toml(&format!(
        "base_url = \"http://localhost:8080\"\nallow_insecure_base_url = true\n{auth}"
    ))
    .unwrap();
    let credentials = Credentials::UserToken { user_token: "t".to_owned() };
    let dispatcher = Dispatcher::from_config(NullTransport, &config, credentials).unwrap();
    assert_eq!(dispatcher.base_url().as_str(), "http://localhost:8080/");
}

#[test]
fn test_invalid_endpoint_template_rejected() {
    let toml = r#"
        [auth]
        type = "bearer"
        env_var = "GURU_USER_TOKEN"

        [endpoints]
        contact = "/contacts/../{id}"
    "#;

    assert!(matches!(BridgeConfig::from_toml(toml), Err(BridgeError::ConfigError(_))));
}

#[test]
fn test_auth_config_variants() {
    let config = BridgeConfig::from_toml(FULL_CONFIG).unwrap();
    assert!(matches!(config.auth, AuthConfig::ApiKey { .. }));
    assert_eq!(config.auth.env_var(), "GURU_API_KEY");
}
