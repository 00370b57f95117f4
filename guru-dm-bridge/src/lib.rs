//! Guru DM Bridge: CRUD dispatch for the Guru Digital Manager REST API
//!
//! A Rust library that exposes the contacts, transactions and subscriptions
//! of [Guru Digital Manager](https://docs.guru.com.br) as typed CRUD
//! operations for a workflow-automation host.
//!
//! # What does it do?
//!
//! The host hands over an ordered list of items, a resource and an
//! operation. For every item the bridge:
//!
//! - **Resolves** a typed [`Command`](command::Command) from the item's parameters
//! - **Builds** exactly one [`ApiRequest`](request::ApiRequest) (method, path,
//!   auth headers, JSON body, query)
//! - **Sends** it through a [`Transport`](transport::Transport)
//! - **Flattens** the JSON response into output records
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Workflow host  │  items + resource + operation + credentials
//! └────────┬────────┘
//!          │ ExecutionInput (JSON)
//!          │
//! ┌────────▼────────────────────────────────────────┐
//! │            Guru DM Bridge (this crate)          │
//! │  ┌──────────────┐      ┌──────────────────┐    │
//! │  │  Dispatcher  │──────│  AuthStrategy    │    │
//! │  │  (Command →  │      │  (bearer or raw  │    │
//! │  │  ApiRequest) │      │   API key)       │    │
//! │  └──────────────┘      └──────────────────┘    │
//! └────────┬───────────────────────────────────────┘
//!          │ HTTPS + JSON
//!          │
//! ┌────────▼────────┐
//! │  Guru DM API    │  /contacts /transactions /subscriptions
//! └─────────────────┘
//! ```
//!
//! # Dispatch table
//!
//! | Resource | create | get | getAll | update | delete |
//! |---|---|---|---|---|---|
//! | contact | `POST /contacts` | `GET /contacts/{id}` | `GET /contacts` | `PUT /contacts/{id}` | `DELETE /contacts/{id}` |
//! | transaction | `POST /transactions` | `GET /transactions/{id}` | `GET /transactions` | `PUT /transactions/{id}` | `DELETE /transactions/{id}` |
//! | subscription | `POST /subscriptions` | `GET /subscriptions/{id}` | `GET /subscriptions` | `PUT /subscriptions/{id}` | `DELETE /subscriptions/{id}` |
//!
//! The [`Classic`](resource::ApiProfile::Classic) profile drops `create` for
//! transactions and subscriptions.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use guru_dm_bridge::{
//!     auth::Credentials,
//!     dispatcher::Dispatcher,
//!     params::ItemParameters,
//!     resource::{Operation, Resource},
//!     transport::HttpTransport,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> guru_dm_bridge::error::Result<()> {
//! let credentials = Credentials::UserToken { user_token: "my-token".to_owned() };
//! let dispatcher = Dispatcher::new(HttpTransport::new(), "https://api.guru.com.br", credentials)?;
//!
//! let params = ItemParameters::from_value(json!({
//!     "contactData": {"contactFields": {"name": "Ana", "email": "ana@example.com"}}
//! }))?;
//! let records = dispatcher.dispatch(Resource::Contact, Operation::Create, &params).await?;
//! println!("created: {}", records[0]);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BridgeError>`](error::Result).
//! Setup errors (missing credentials, bad configuration) abort an execution
//! before any item is sent; item errors can be recorded as `{"error": ...}`
//! with `continue_on_fail`.
//!
//! ```rust,no_run
//! use guru_dm_bridge::{BridgeError, auth::Credentials};
//!
//! match (Credentials::UserToken { user_token: String::new() }).into_strategy() {
//!     Ok(_) => println!("ready"),
//!     Err(BridgeError::MissingCredentials(msg)) => eprintln!("configure a token: {msg}"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions, reason = "transitive dependencies from reqwest")]

pub mod auth;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod fields;
pub mod filters;
pub mod output;
pub mod params;
pub mod request;
pub mod resource;
pub mod transport;

pub use config::BridgeConfig;
pub use dispatcher::Dispatcher;
pub use error::{BridgeError, Result};
pub use resource::{ApiProfile, Operation, Resource};
