//! Entities that impression metrics are computed for
//!
//! Any type can take part in analytics by implementing
//! [`HasImpressionMetrics`]: it tells the engine which events belong to it
//! and hands out a version token that changes whenever the entity's own
//! persisted state changes, so cached values keyed on the token are never
//! served for a newer version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Kind of subject an impression can be attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Advertiser paying for impressions
    Advertiser,
    /// Campaign the ad belongs to
    Campaign,
    /// Publisher property the ad is rendered on
    Property,
}

impl EntityKind {
    /// Collection name used in version tokens
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Advertiser => "advertisers",
            EntityKind::Campaign => "campaigns",
            EntityKind::Property => "properties",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Advertiser => "advertiser",
            EntityKind::Campaign => "campaign",
            EntityKind::Property => "property",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "advertiser" | "advertisers" => Ok(EntityKind::Advertiser),
            "campaign" | "campaigns" => Ok(EntityKind::Campaign),
            "property" | "properties" => Ok(EntityKind::Property),
            other => Err(Error::Configuration(format!("unknown entity kind: {}", other))),
        }
    }
}

/// Identity of the subject whose events are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    /// Subject kind
    pub kind: EntityKind,
    /// Subject identifier within its kind
    pub id: i64,
}

impl EntityKey {
    /// Create a new entity key
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Capability of exposing impression metrics
pub trait HasImpressionMetrics: Send + Sync {
    /// Which events belong to this entity
    fn entity_key(&self) -> EntityKey;

    /// Token that changes whenever the entity's persisted state changes
    fn version_token(&self) -> String;
}

/// Plain entity reference carrying its last update time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    key: EntityKey,
    updated_at: DateTime<Utc>,
}

impl EntityRef {
    /// Create a reference to an entity as of `updated_at`
    pub fn new(kind: EntityKind, id: i64, updated_at: DateTime<Utc>) -> Self {
        Self {
            key: EntityKey::new(kind, id),
            updated_at,
        }
    }

    /// Same entity at a newer version
    pub fn touched(&self, updated_at: DateTime<Utc>) -> Self {
        Self {
            key: self.key,
            updated_at,
        }
    }

    /// Last update time
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl HasImpressionMetrics for EntityRef {
    fn entity_key(&self) -> EntityKey {
        self.key
    }

    fn version_token(&self) -> String {
        format!(
            "{}/{}-{}",
            self.key.kind.plural(),
            self.key.id,
            self.updated_at.format("%Y%m%d%H%M%S%6f")
        )
    }
}
