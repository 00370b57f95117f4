//! Resources, operations and the dispatch table variants.
//!
//! A [`Resource`] selects the endpoint family and field schema, an
//! [`Operation`] selects the HTTP verb and request shape. Which pairs are
//! available depends on the [`ApiProfile`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Entity family exposed by the Guru Digital Manager API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    /// Customer contacts.
    Contact,
    /// Sales transactions.
    Transaction,
    /// Recurring subscriptions.
    Subscription,
}

impl Resource {
    /// All resources, in display order.
    pub const ALL: [Self; 3] = [Self::Contact, Self::Transaction, Self::Subscription];

    /// Host-facing identifier (`contact`, `transaction`, `subscription`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Transaction => "transaction",
            Self::Subscription => "subscription",
        }
    }

    /// Capitalized name used in acknowledgment messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Contact => "Contact",
            Self::Transaction => "Transaction",
            Self::Subscription => "Subscription",
        }
    }

    /// Collection path segment (`contacts`, `transactions`, `subscriptions`).
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Transaction => "transactions",
            Self::Subscription => "subscriptions",
        }
    }

    /// Name of the per-item parameter carrying the entity ID.
    #[must_use]
    pub const fn id_parameter(self) -> &'static str {
        match self {
            Self::Contact => "contactId",
            Self::Transaction => "transactionId",
            Self::Subscription => "subscriptionId",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contact" => Ok(Self::Contact),
            "transaction" => Ok(Self::Transaction),
            "subscription" => Ok(Self::Subscription),
            other => Err(BridgeError::UnknownResource(other.to_owned())),
        }
    }
}

/// CRUD operation requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Create an entity.
    Create,
    /// Fetch one entity by ID.
    Get,
    /// List entities with optional filters and pagination.
    GetAll,
    /// Replace fields of an entity by ID.
    Update,
    /// Delete an entity by ID.
    Delete,
}

impl Operation {
    /// All operations, in table order.
    pub const ALL: [Self; 5] = [Self::Create, Self::Get, Self::GetAll, Self::Update, Self::Delete];

    /// Host-facing identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::GetAll => "getAll",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns true if the operation addresses a single entity by ID.
    #[must_use]
    pub const fn requires_id(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }

    /// Parses an operation name in the context of a resource.
    ///
    /// Unknown names are reported as unsupported for that resource, the same
    /// way a known operation missing from the dispatch table is.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedOperation`] if the name is unknown.
    pub fn parse_for(name: &str, resource: Resource) -> Result<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name).ok_or_else(|| {
            BridgeError::UnsupportedOperation {
                operation: name.to_owned(),
                resource: resource.as_str().to_owned(),
            }
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch table variant.
///
/// Two feature sets exist for the same API: the extended one supports every
/// pair, the classic one has no `create` for transactions and subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiProfile {
    /// All resources support all five operations.
    #[default]
    Extended,
    /// Only contacts can be created.
    Classic,
}

impl ApiProfile {
    /// Returns true if the pair is part of this dispatch table.
    #[must_use]
    pub const fn supports(self, resource: Resource, operation: Operation) -> bool {
        match (self, resource, operation) {
            (Self::Classic, Resource::Transaction | Resource::Subscription, Operation::Create) => {
                false
            }
            _ => true,
        }
    }

    /// Checks a pair against the table.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedOperation`] naming both parts if the
    /// pair is not part of this table.
    pub fn ensure_supported(self, resource: Resource, operation: Operation) -> Result<()> {
        if self.supports(resource, operation) {
            Ok(())
        } else {
            Err(BridgeError::UnsupportedOperation {
                operation: operation.as_str().to_owned(),
                resource: resource.as_str().to_owned(),
            })
        }
    }
}
