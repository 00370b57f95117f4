//! Typed request bodies for `create` and `update`.
//!
//! Every field is optional so the same struct carries a full create payload
//! or the subset sent by an update. Absent fields are left out of the JSON.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Contact payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Tax document (CPF/CNPJ).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Transaction payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFields {
    /// Amount, sent as a JSON number.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
}

/// Subscription payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFields {
    /// Plan identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Subscription status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    /// Start date as an ISO 8601 string, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

/// Transaction status values accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs, reason = "variant names are the API status names")]
pub enum TransactionStatus {
    Abandoned,
    Analysis,
    Approved,
    BilletPrinted,
    Blocked,
    Canceled,
    Chargeback,
    Completed,
    Delayed,
    Dispute,
    Expired,
    InRecovery,
    Refunded,
    Rejected,
    Scheduled,
    Started,
    Trial,
    WaitingPayment,
}

impl TransactionStatus {
    /// All statuses, alphabetically.
    pub const ALL: [Self; 18] = [
        Self::Abandoned,
        Self::Analysis,
        Self::Approved,
        Self::BilletPrinted,
        Self::Blocked,
        Self::Canceled,
        Self::Chargeback,
        Self::Completed,
        Self::Delayed,
        Self::Dispute,
        Self::Expired,
        Self::InRecovery,
        Self::Refunded,
        Self::Rejected,
        Self::Scheduled,
        Self::Started,
        Self::Trial,
        Self::WaitingPayment,
    ];

    /// Wire name (`billet_printed`, `waiting_payment`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abandoned => "abandoned",
            Self::Analysis => "analysis",
            Self::Approved => "approved",
            Self::BilletPrinted => "billet_printed",
            Self::Blocked => "blocked",
            Self::Canceled => "canceled",
            Self::Chargeback => "chargeback",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
            Self::Dispute => "dispute",
            Self::Expired => "expired",
            Self::InRecovery => "in_recovery",
            Self::Refunded => "refunded",
            Self::Rejected => "rejected",
            Self::Scheduled => "scheduled",
            Self::Started => "started",
            Self::Trial => "trial",
            Self::WaitingPayment => "waiting_payment",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                BridgeError::InvalidParameter(format!("unknown transaction status: {s}"))
            })
    }
}

/// Subscription status values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Billing normally.
    #[default]
    Active,
    /// Paused.
    Inactive,
    /// Terminated.
    Cancelled,
}
