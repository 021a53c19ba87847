use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! rowid_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
            ) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

rowid_type!(
    /// Strongly typed ID for platform rows.
    PlatformId
);
rowid_type!(
    /// Strongly typed ID for game rows.
    GameId
);
rowid_type!(
    /// Strongly typed ID for collection rows.
    CollectionId
);
rowid_type!(
    /// Strongly typed ID for user rows.
    UserId
);
rowid_type!(
    /// Strongly typed ID for stored API key rows.
    ApiKeyId
);

/// Opaque identity of one in-flight scan. Never persisted, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScanTaskId(pub Uuid);

impl Default for ScanTaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanTaskId {
    pub fn new() -> Self {
        ScanTaskId(Uuid::new_v4())
    }
}

impl std::fmt::Display for ScanTaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
