//! Typed commands.
//!
//! A [`Command`] is one (resource, operation) pair with everything the
//! request builder needs, resolved from [`ItemParameters`] once per item.

use std::fmt;

use crate::{
    error::{BridgeError, Result},
    fields::{ContactFields, SubscriptionFields, TransactionFields},
    filters::{FilterSet, Pagination},
    params::ItemParameters,
    resource::{ApiProfile, Operation, Resource},
};

/// Validated entity ID, safe to embed as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(String);

impl EntityId {
    /// Validates an entity ID.
    ///
    /// `parameter` names the host parameter in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if the ID is absent, empty,
    /// or contains `/`, `?`, `#` or control characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use guru_dm_bridge::command::EntityId;
    ///
    /// assert!(EntityId::parse("contactId", Some("c-123")).is_ok());
    /// assert!(EntityId::parse("contactId", Some("../admin")).is_err());
    /// assert!(EntityId::parse("contactId", None).is_err());
    /// ```
    pub fn parse(parameter: &str, value: Option<&str>) -> Result<Self> {
        let value = value.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            return Err(BridgeError::InvalidParameter(format!("{parameter} is required")));
        }

        if let Some(ch) = value.chars().find(|ch| matches!(ch, '/' | '?' | '#') || ch.is_control())
        {
            return Err(BridgeError::InvalidParameter(format!(
                "{parameter} contains invalid character {ch:?}"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// The ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operation on one resource, generic over the resource's field type.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<F> {
    /// `POST /<collection>` with the fields as body.
    Create {
        /// Body.
        fields: F,
    },
    /// `GET /<collection>/{id}`.
    Get {
        /// Target entity.
        id: EntityId,
    },
    /// `GET /<collection>` with filters and pagination.
    GetAll {
        /// Active filters.
        filters: FilterSet,
        /// Page size policy.
        pagination: Pagination,
    },
    /// `PUT /<collection>/{id}` with the field subset as body.
    Update {
        /// Target entity.
        id: EntityId,
        /// Body.
        fields: F,
    },
    /// `DELETE /<collection>/{id}`.
    Delete {
        /// Target entity.
        id: EntityId,
    },
}

impl<F> Action<F> {
    /// Operation this action performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Get { .. } => Operation::Get,
            Self::GetAll { .. } => Operation::GetAll,
            Self::Update { .. } => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
        }
    }

    /// Target entity, for operations addressing one.
    #[must_use]
    pub const fn id(&self) -> Option<&EntityId> {
        match self {
            Self::Get { id } | Self::Update { id, .. } | Self::Delete { id } => Some(id),
            Self::Create { .. } | Self::GetAll { .. } => None,
        }
    }

    fn build(
        resource: Resource,
        operation: Operation,
        params: &ItemParameters,
        fields: impl FnOnce(&ItemParameters) -> F,
    ) -> Result<Self> {
        let id = || EntityId::parse(resource.id_parameter(), params.entity_id(resource));

        Ok(match operation {
            Operation::Create => Self::Create { fields: fields(params) },
            Operation::Get => Self::Get { id: id()? },
            Operation::GetAll => Self::GetAll {
                filters: FilterSet::from_fields(resource, &params.additional_fields)?,
                pagination: Pagination::from_params(params.return_all, params.limit)?,
            },
            Operation::Update => Self::Update { id: id()?, fields: fields(params) },
            Operation::Delete => Self::Delete { id: id()? },
        })
    }
}

/// One dispatchable (resource, operation) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Contact operation.
    Contact(Action<ContactFields>),
    /// Transaction operation.
    Transaction(Action<TransactionFields>),
    /// Subscription operation.
    Subscription(Action<SubscriptionFields>),
}

impl Command {
    /// Resolves a command from an item's parameters.
    ///
    /// The pair is checked against `profile` before any parameter is read, so
    /// an unsupported pair fails the same way whatever the item contains.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedOperation`] if the pair is not in the
    /// profile's table, or [`BridgeError::InvalidParameter`] if an ID, filter
    /// or limit is invalid.
    pub fn from_params(
        profile: ApiProfile,
        resource: Resource,
        operation: Operation,
        params: &ItemParameters,
    ) -> Result<Self> {
        profile.ensure_supported(resource, operation)?;
        Self::resolve(resource, operation, params)
    }

    /// [`from_params`](Self::from_params) for a pair already checked against
    /// the profile.
    pub(crate) fn resolve(
        resource: Resource,
        operation: Operation,
        params: &ItemParameters,
    ) -> Result<Self> {
        Ok(match resource {
            Resource::Contact => Self::Contact(Action::build(
                resource,
                operation,
                params,
                ItemParameters::contact_fields,
            )?),
            Resource::Transaction => Self::Transaction(Action::build(
                resource,
                operation,
                params,
                ItemParameters::transaction_fields,
            )?),
            Resource::Subscription => Self::Subscription(Action::build(
                resource,
                operation,
                params,
                ItemParameters::subscription_fields,
            )?),
        })
    }

    /// Resource this command targets.
    #[must_use]
    pub const fn resource(&self) -> Resource {
        match self {
            Self::Contact(_) => Resource::Contact,
            Self::Transaction(_) => Resource::Transaction,
            Self::Subscription(_) => Resource::Subscription,
        }
    }

    /// Operation this command performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Contact(action) => action.operation(),
            Self::Transaction(action) => action.operation(),
            Self::Subscription(action) => action.operation(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "tests use unreachable! for exhaustive pattern matching"
)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(value: serde_json::Value) -> ItemParameters {
        ItemParameters::from_value(value).unwrap()
    }

    #[test]
    fn test_entity_id_validation() {
        assert_eq!(EntityId::parse("contactId", Some(" c-1 ")).unwrap().as_str(), "c-1");
        assert!(EntityId::parse("contactId", Some("")).is_err());
        assert!(EntityId::parse("contactId", Some("a/b")).is_err());
        assert!(EntityId::parse("contactId", Some("a?x=1")).is_err());
        assert!(EntityId::parse("contactId", Some("a#frag")).is_err());
        assert!(EntityId::parse("contactId", Some("a\nb")).is_err());

        let err = EntityId::parse("transactionId", None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: transactionId is required");
    }

    #[test]
    fn test_contact_create_carries_fields() {
        let command = Command::from_params(
            ApiProfile::Extended,
            Resource::Contact,
            Operation::Create,
            &params(json!({"contactData": {"contactFields": {"name": "Ana"}}})),
        )
        .unwrap();

        assert_eq!(command.resource(), Resource::Contact);
        assert_eq!(command.operation(), Operation::Create);
        let Command::Contact(Action::Create { fields }) = command else {
            unreachable!("expected contact create")
        };
        assert_eq!(fields.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_id_read_from_resource_parameter() {
        let item = params(json!({"contactId": "c-1", "subscriptionId": "s-1"}));
        let command = Command::from_params(
            ApiProfile::Extended,
            Resource::Subscription,
            Operation::Delete,
            &item,
        )
        .unwrap();
        let Command::Subscription(action) = command else { unreachable!("expected subscription") };
        assert_eq!(action.id().map(EntityId::as_str), Some("s-1"));
    }

    #[test]
    fn test_missing_id_fails() {
        let result = Command::from_params(
            ApiProfile::Extended,
            Resource::Transaction,
            Operation::Get,
            &params(json!({"contactId": "c-1"})),
        );
        assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
    }

    #[test]
    fn test_get_all_resolves_filters_and_pagination() {
        let command = Command::from_params(
            ApiProfile::Extended,
            Resource::Contact,
            Operation::GetAll,
            &params(json!({"additionalFields": {"email": "a@b.c"}, "limit": 7})),
        )
        .unwrap();

        let Command::Contact(Action::GetAll { filters, pagination }) = command else {
            unreachable!("expected contact getAll")
        };
        assert_eq!(filters.get("email"), Some("a@b.c"));
        assert_eq!(pagination, Pagination::Limit(7));
    }

    #[test]
    fn test_classic_profile_rejects_before_reading_params() {
        let result = Command::from_params(
            ApiProfile::Classic,
            Resource::Subscription,
            Operation::Create,
            &ItemParameters::default(),
        );
        let Err(err) = result else { unreachable!("expected error") };
        assert_eq!(err.to_string(), "Operation create not supported for subscriptions");
    }
}
