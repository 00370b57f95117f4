//! Lists contacts filtered by email.
//!
//! # Running this example
//!
//! ```bash
//! export GURU_USER_TOKEN=<token>
//! cargo run --example list_contacts -- ana@example.com
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "examples are allowed to use println"
)]

use std::env;

use guru_dm_bridge::{
    BridgeError, Dispatcher,
    auth::Credentials,
    config::DEFAULT_BASE_URL,
    params::ItemParameters,
    resource::{Operation, Resource},
    transport::HttpTransport,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let user_token = env::var("GURU_USER_TOKEN").map_err(|_| {
        "GURU_USER_TOKEN environment variable not set.\nSet it with: export GURU_USER_TOKEN=<token>"
    })?;
    let email = env::args().nth(1).unwrap_or_default();

    let dispatcher = Dispatcher::new(
        HttpTransport::new(),
        DEFAULT_BASE_URL,
        Credentials::UserToken { user_token },
    )?;

    let params = ItemParameters::from_value(json!({
        "returnAll": false,
        "limit": 20,
        "additionalFields": {"email": email}
    }))?;

    match dispatcher.dispatch(Resource::Contact, Operation::GetAll, &params).await {
        Ok(records) => {
            println!("{} record(s)", records.len());
            for record in records {
                println!("{record}");
            }
        }
        Err(BridgeError::ApiError { status, message }) => {
            eprintln!("Guru API rejected the request ({status}): {message}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
