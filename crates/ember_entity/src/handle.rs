//! Entity handle type.
//!
//! An [`EntityHandle`] is an opaque 128-bit identifier (UUID v4). Handles
//! are globally unique and never reused: once an entity is destroyed its
//! handle is permanently retired. The handle is distinct from the internal
//! slot index — slots are recycled, handles are not.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique, never-reused entity identifier.
///
/// Equality is by value. The nil UUID is the canonical invalid handle,
/// [`EntityHandle::INVALID`], returned by lookups that found nothing.
///
/// Serialises as the canonical UUID string
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`), which is also the textual
/// form used by the scene persistence format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHandle(Uuid);

impl EntityHandle {
    /// The nil / invalid handle sentinel.
    pub const INVALID: EntityHandle = EntityHandle(Uuid::nil());

    /// Generate a fresh, globally unique handle.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID as a handle.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a handle from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn uuid(self) -> Uuid {
        self.0
    }

    /// Returns `true` if this is a valid (non-nil) handle.
    #[must_use]
    pub fn is_valid(self) -> bool {
        !self.0.is_nil()
    }
}

impl Default for EntityHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
