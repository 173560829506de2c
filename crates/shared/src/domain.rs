use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identity of a ledger participant, usually an X.500 name such as
/// `O=BankA,L=London,C=GB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Party(pub String);

impl Party {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Party {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Structured identities are kept as their compact JSON text.
        Ok(match Value::deserialize(deserializer)? {
            Value::String(name) => Party(name),
            other => Party(other.to_string()),
        })
    }
}

/// Obligation state as returned by the ledger. The client does not enforce
/// a schema on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObligationRecord(pub Value);

const SUMMARY_FIELDS: &[&str] = &["type", "status", "requester", "owner"];

impl ObligationRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.as_object().and_then(|object| object.get(name))
    }

    pub fn external_id(&self) -> Option<&str> {
        self.field("externalId").and_then(Value::as_str)
    }

    /// One-line rendering built from the well-known ledger fields, falling
    /// back to compact JSON when none of them are present.
    pub fn summary(&self) -> String {
        if let Value::String(text) = &self.0 {
            return text.clone();
        }

        let mut parts = Vec::new();
        if let Some(id) = self.external_id() {
            parts.push(id.to_string());
        }
        for name in SUMMARY_FIELDS {
            if let Some(value) = self.field(name) {
                parts.push(format!("{name}={}", scalar_text(value)));
            }
        }
        if let Some(amount) = self.field("amount") {
            let currency = self
                .field("currency")
                .map(scalar_text)
                .unwrap_or_default();
            parts.push(format!("amount={} {currency}", scalar_text(amount)).trim_end().to_string());
        }

        if parts.is_empty() {
            self.0.to_string()
        } else {
            parts.join(" ")
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is required")]
    Missing,
    #[error("amount `{0}` is not a number")]
    NotANumber(String),
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Strictly positive, finite amount accepted by the obligation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotANumber(value.to_string()));
        }
        if value <= 0.0 {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AmountError::Missing);
        }
        let value = raw
            .parse::<f64>()
            .map_err(|_| AmountError::NotANumber(raw.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    // f64's Display already omits the fractional part of integral values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
