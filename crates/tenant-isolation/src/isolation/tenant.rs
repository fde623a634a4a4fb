use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an organization, the unit of data isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Wrap a UUID, rejecting the nil UUID which no organization may own.
    pub fn from_uuid(value: Uuid) -> Result<Self, AuthError> {
        if value.is_nil() {
            return Err(AuthError::MalformedTenant {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Stable identifier for a named organization. Version 5 UUIDs are never nil.
    pub fn derived(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();
        let value = Uuid::parse_str(trimmed).map_err(|_| AuthError::MalformedTenant {
            value: trimmed.to_string(),
        })?;
        Self::from_uuid(value)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for TenantId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Primary key of a tenant-scoped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Stable identifier derived from a namespace and a natural key, used by seeding.
    pub fn derived(namespace: &Uuid, natural_key: &str) -> Self {
        Self(Uuid::new_v5(namespace, natural_key.as_bytes()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Failures resolving the tenant of the calling session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required: no tenant set on this session")]
    AuthenticationRequired,
    #[error("malformed tenant identifier '{value}'")]
    MalformedTenant { value: String },
}
