//! Query construction for `getAll`: filter allow-lists and pagination.
//!
//! Filters come from the host's `additionalFields` collection. Only names on
//! the resource's allow-list are forwarded, in allow-list order, and a value
//! that is null or the empty string never reaches the query. The `limit`
//! parameter, when present, is appended after the filters.

use serde_json::{Map, Value};

use crate::{
    error::{BridgeError, Result},
    fields::TransactionStatus,
    resource::Resource,
};

/// Page size used when the host does not provide one.
pub const DEFAULT_LIMIT: u32 = 50;

/// Smallest accepted page size.
pub const MIN_LIMIT: u32 = 1;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Filters accepted by `GET /contacts`.
pub const CONTACT_FILTERS: &[&str] =
    &["name", "email", "doc", "created_at_ini", "created_at_end", "cursor"];

/// Filters accepted by `GET /transactions`.
pub const TRANSACTION_FILTERS: &[&str] = &[
    "contact_id",
    "contact_doc",
    "contact_email",
    "contact_name",
    "product_id",
    "subscription_id",
    "invoice_id",
    "marketplace_id",
    "marketplaces",
    "payment_types",
    "transaction_status",
    "ordered_at_ini",
    "ordered_at_end",
    "confirmed_at_ini",
    "confirmed_at_end",
    "cancelled_at_ini",
    "cancelled_at_end",
    "cursor",
];

/// Filters accepted by `GET /subscriptions`.
pub const SUBSCRIPTION_FILTERS: &[&str] = &["cursor"];

/// Returns the filter allow-list of a resource.
#[must_use]
pub const fn allowed_filters(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Contact => CONTACT_FILTERS,
        Resource::Transaction => TRANSACTION_FILTERS,
        Resource::Subscription => SUBSCRIPTION_FILTERS,
    }
}

/// Filter values that survived the allow-list and emptiness checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(&'static str, String)>,
}

impl FilterSet {
    /// Builds the filter set of `resource` from the host's field collection.
    ///
    /// Names outside the allow-list are ignored. Strings, numbers and booleans
    /// are forwarded as text.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if an allowed field holds an
    /// array or object, or if `transaction_status` is not a known status.
    pub fn from_fields(resource: Resource, fields: &Map<String, Value>) -> Result<Self> {
        let mut entries = Vec::new();

        for &name in allowed_filters(resource) {
            let Some(value) = fields.get(name) else {
                continue;
            };
            let Some(text) = scalar_to_query(name, value)? else {
                continue;
            };
            if name == "transaction_status" {
                text.parse::<TransactionStatus>()?;
            }
            entries.push((name, text));
        }

        Ok(Self { entries })
    }

    /// Returns true if no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of active filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Value of a filter, if active.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }

    /// Active filters in allow-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

fn scalar_to_query(name: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => Err(BridgeError::InvalidParameter(format!(
            "filter {name} must be a string, number or boolean"
        ))),
    }
}

/// Pagination mode of a `getAll` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `returnAll = true`: no `limit` is sent.
    All,
    /// `returnAll = false`: `limit=<n>` is sent.
    Limit(u32),
}

impl Pagination {
    /// Resolves the host's `returnAll` / `limit` pair.
    ///
    /// `limit` is ignored when `return_all` is set and defaults to
    /// [`DEFAULT_LIMIT`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] if the limit is outside
    /// [`MIN_LIMIT`]..=[`MAX_LIMIT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use guru_dm_bridge::filters::Pagination;
    ///
    /// assert_eq!(Pagination::from_params(false, None).unwrap(), Pagination::Limit(50));
    /// assert_eq!(Pagination::from_params(true, Some(500)).unwrap(), Pagination::All);
    /// assert!(Pagination::from_params(false, Some(0)).is_err());
    /// ```
    pub fn from_params(return_all: bool, limit: Option<i64>) -> Result<Self> {
        if return_all {
            return Ok(Self::All);
        }

        let Some(limit) = limit else {
            return Ok(Self::Limit(DEFAULT_LIMIT));
        };

        u32::try_from(limit)
            .ok()
            .filter(|limit| (MIN_LIMIT..=MAX_LIMIT).contains(limit))
            .map(Self::Limit)
            .ok_or_else(|| {
                BridgeError::InvalidParameter(format!(
                    "limit must be between {MIN_LIMIT} and {MAX_LIMIT}, got {limit}"
                ))
            })
    }

    /// Page size to send, if any.
    #[must_use]
    pub const fn limit(self) -> Option<u32> {
        match self {
            Self::All => None,
            Self::Limit(limit) => Some(limit),
        }
    }
}

/// Merges filters and pagination into the outgoing query.
#[must_use]
pub fn build_query(filters: &FilterSet, pagination: Pagination) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> =
        filters.iter().map(|(key, value)| (key.to_owned(), value.to_owned())).collect();

    if let Some(limit) = pagination.limit() {
        query.push(("limit".to_owned(), limit.to_string()));
    }

    query
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_contact_filters_skip_empty_and_null() {
        let filters = FilterSet::from_fields(
            Resource::Contact,
            &fields(json!({"email": "a@b.c", "name": "", "doc": null, "cursor": "abc"})),
        )
        .unwrap();

        assert_eq!(filters.len(), 2);
        assert_eq!(filters.get("email"), Some("a@b.c"));
        assert_eq!(filters.get("name"), None);
        assert_eq!(filters.get("doc"), None);
    }

    #[test]
    fn test_unknown_filters_are_dropped() {
        let filters = FilterSet::from_fields(
            Resource::Subscription,
            &fields(json!({"cursor": "c1", "plan": "gold", "limit": 5})),
        )
        .unwrap();

        assert_eq!(filters.iter().collect::<Vec<_>>(), vec![("cursor", "c1")]);
    }

    #[test]
    fn test_filters_follow_allow_list_order() {
        let filters = FilterSet::from_fields(
            Resource::Transaction,
            &fields(json!({"cursor": "c", "product_id": 42, "contact_id": "ct-1"})),
        )
        .unwrap();

        let names: Vec<_> = filters.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["contact_id", "product_id", "cursor"]);
        assert_eq!(filters.get("product_id"), Some("42"));
    }

    #[test]
    fn test_transaction_status_filter_is_validated() {
        let ok = FilterSet::from_fields(
            Resource::Transaction,
            &fields(json!({"transaction_status": "approved"})),
        );
        assert!(ok.is_ok());

        let err = FilterSet::from_fields(
            Resource::Transaction,
            &fields(json!({"transaction_status": "lost"})),
        );
        assert!(matches!(err, Err(BridgeError::InvalidParameter(_))));
    }

    #[test]
    fn test_structured_filter_value_rejected() {
        let result =
            FilterSet::from_fields(Resource::Contact, &fields(json!({"email": ["a", "b"]})));
        assert!(matches!(result, Err(BridgeError::InvalidParameter(_))));
    }

    #[test]
    fn test_pagination_defaults_and_bounds() {
        assert_eq!(Pagination::from_params(false, None).unwrap(), Pagination::Limit(DEFAULT_LIMIT));
        assert_eq!(Pagination::from_params(false, Some(1)).unwrap(), Pagination::Limit(1));
        assert_eq!(Pagination::from_params(false, Some(100)).unwrap(), Pagination::Limit(100));
        assert!(Pagination::from_params(false, Some(101)).is_err());
        assert!(Pagination::from_params(false, Some(-3)).is_err());
        assert_eq!(Pagination::from_params(true, Some(0)).unwrap(), Pagination::All);
    }

    #[test]
    fn test_build_query_appends_limit_after_filters() {
        let filters =
            FilterSet::from_fields(Resource::Contact, &fields(json!({"email": "x@y.z"}))).unwrap();

        let query = build_query(&filters, Pagination::Limit(10));
        assert_eq!(query, vec![
            ("email".to_owned(), "x@y.z".to_owned()),
            ("limit".to_owned(), "10".to_owned()),
        ]);

        let query = build_query(&filters, Pagination::All);
        assert!(query.iter().all(|(key, _)| key != "limit"));
    }

    fn filter_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            Just(Value::String(String::new())),
            "[a-z0-9@._-]{0,12}".prop_map(Value::String),
            any::<u32>().prop_map(|n| json!(n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_empty_filters_never_reach_query(
            values in proptest::collection::vec(filter_value(), TRANSACTION_FILTERS.len())
        ) {
            let mut map = Map::new();
            for (name, value) in TRANSACTION_FILTERS.iter().zip(values) {
                if *name != "transaction_status" {
                    map.insert((*name).to_owned(), value);
                }
            }

            let filters = FilterSet::from_fields(Resource::Transaction, &map).unwrap();
            for (name, value) in build_query(&filters, Pagination::All) {
                prop_assert!(!value.is_empty());
                prop_assert!(TRANSACTION_FILTERS.contains(&name.as_str()));
                prop_assert!(!map[&name].is_null());
            }
        }

        #[test]
        fn prop_limit_accepted_only_within_bounds(limit in -1000_i64..1000) {
            let result = Pagination::from_params(false, Some(limit));
            if (1..=100).contains(&limit) {
                let pagination = result.unwrap();
                prop_assert_eq!(pagination.limit(), u32::try_from(limit).ok());
            } else {
                prop_assert!(result.is_err());
            }
        }

        #[test]
        fn prop_return_all_never_sends_limit(limit in proptest::option::of(any::<i64>())) {
            let pagination = Pagination::from_params(true, limit).unwrap();
            let query = build_query(&FilterSet::default(), pagination);
            prop_assert!(query.is_empty());
        }
    }
}
