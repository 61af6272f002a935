//! Identifiers for the things a dashboard page is about: a city or a coin.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("entity identifier cannot be empty")]
pub struct EntityError;

/// Normalized (trimmed, lowercase) entity identifier, e.g. `bangalore` or `bitcoin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EntityError> {
        let id = raw.as_ref().trim().to_lowercase();
        if id.is_empty() {
            return Err(EntityError);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EntityId::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl FromStr for EntityId {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::new(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One item of the `/cities` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let id = EntityId::new("  Bangalore ").unwrap();
        assert_eq!(id.as_str(), "bangalore");
        assert_eq!(EntityId::new("\t").unwrap_err(), EntityError);
    }

    #[test]
    fn listing_item_tolerates_missing_country() {
        let e: Entity = serde_json::from_str(r#"{"id":"Delhi","name":"Delhi"}"#).unwrap();
        assert_eq!(e.id.as_str(), "delhi");
        assert!(e.country.is_none());
    }
}
