//! External identifiers and the identity allocator.
//!
//! Every node carries an `id` property that is its public primary key. It is
//! assigned exactly once, when the node is created, and is never derived from
//! store-internal identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public identifier of a Recipe, Ingredient, Category, or User node.
///
/// Identifiers supplied by callers are opaque strings: an id that was never
/// allocated simply matches nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// A fresh random (v4) identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of identifiers for newly created nodes.
///
/// Called once per created node. Nodes resolved by name reuse must not
/// consume an identifier.
pub trait IdAllocator: Send + Sync {
    fn new_id(&self) -> EntityId;
}

/// Allocates random v4 UUIDs; needs no coordination between processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn new_id(&self) -> EntityId {
        EntityId::random()
    }
}
