//! Host-facing parameter shapes.
//!
//! The host hands over one JSON object per input item, using the same
//! camelCase names it shows to users (`contactId`, `contactData`,
//! `additionalFields`, `returnAll`, `limit`, ...). Each object is deserialized
//! once into [`ItemParameters`]; a malformed item is an error for that item
//! only.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Number, Value};

use crate::{
    error::{BridgeError, Result},
    fields::{ContactFields, SubscriptionFields, TransactionFields},
    resource::Resource,
};

/// Per-item parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemParameters {
    /// Contact ID for get/update/delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,

    /// Transaction ID for get/update/delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Subscription ID for get/update/delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    /// Contact field collection for create/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_data: Option<ContactData>,

    /// Transaction field collection for create/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_data: Option<TransactionData>,

    /// Subscription field collection for create/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_data: Option<SubscriptionData>,

    /// Optional `getAll` filters, keyed by API filter name.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_fields: Map<String, Value>,

    /// Fetch without a page size.
    #[serde(default)]
    pub return_all: bool,

    /// Page size when `return_all` is false.
    ///
    /// Hosts may send it as a float (`10.0`); any fractional part is rejected.
    #[serde(default, deserialize_with = "whole_number", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Reads an optional integer that may arrive as a whole float.
///
/// Floats beyond the `i64` range saturate so the range check downstream
/// reports them.
#[allow(
    clippy::cast_possible_truncation,
    clippy::float_cmp,
    reason = "the value is checked to be whole before the saturating cast"
)]
fn whole_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(value) = number.as_i64() {
        return Ok(Some(value));
    }

    number
        .as_f64()
        .filter(|value| value.is_finite() && value.trunc() == *value)
        .map(|value| Some(value as i64))
        .ok_or_else(|| D::Error::custom(format!("expected a whole number, got {number}")))
}

/// `contactData` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactData {
    /// Fields to send.
    #[serde(default)]
    pub contact_fields: Option<ContactFields>,
}

/// `transactionData` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// Fields to send.
    #[serde(default)]
    pub transaction_fields: Option<TransactionFields>,
}

/// `subscriptionData` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    /// Fields to send.
    #[serde(default)]
    pub subscription_fields: Option<SubscriptionFields>,
}

impl ItemParameters {
    /// Deserializes one host item.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if the item does not match the
    /// parameter schema.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| BridgeError::InvalidParameter(format!("malformed item parameters: {e}")))
    }

    /// Raw entity ID parameter of `resource`, if provided.
    #[must_use]
    pub fn entity_id(&self, resource: Resource) -> Option<&str> {
        match resource {
            Resource::Contact => self.contact_id.as_deref(),
            Resource::Transaction => self.transaction_id.as_deref(),
            Resource::Subscription => self.subscription_id.as_deref(),
        }
    }

    /// Contact fields, empty if the collection was not filled.
    #[must_use]
    pub fn contact_fields(&self) -> ContactFields {
        self.contact_data.as_ref().and_then(|data| data.contact_fields.clone()).unwrap_or_default()
    }

    /// Transaction fields, empty if the collection was not filled.
    #[must_use]
    pub fn transaction_fields(&self) -> TransactionFields {
        self.transaction_data
            .as_ref()
            .and_then(|data| data.transaction_fields.clone())
            .unwrap_or_default()
    }

    /// Subscription fields, empty if the collection was not filled.
    #[must_use]
    pub fn subscription_fields(&self) -> SubscriptionFields {
        self.subscription_data
            .as_ref()
            .and_then(|data| data.subscription_fields.clone())
            .unwrap_or_default()
    }
}

/// One execution as handed over by the host.
///
/// `resource` and `operation` are kept as strings: they are parsed for every
/// item so an unknown name fails that item and is subject to
/// `continue_on_fail` like any other item error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInput {
    /// Resource name (`contact`, `transaction`, `subscription`).
    pub resource: String,

    /// Operation name (`create`, `get`, `getAll`, `update`, `delete`).
    pub operation: String,

    /// Record per-item failures as `{"error": ...}` instead of aborting.
    #[serde(default)]
    pub continue_on_fail: bool,

    /// Raw item parameters, in input order.
    #[serde(default)]
    pub items: Vec<Value>,
}

impl ExecutionInput {
    /// Parses an execution from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if the document is not a valid
    /// execution.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BridgeError::InvalidParameter(format!("malformed execution input: {e}")))
    }
}
