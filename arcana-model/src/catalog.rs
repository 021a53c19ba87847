use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ApiKeyId, CollectionId, GameId, PlatformId, UserId};

/// A named external game source (storefront, launcher, emulator frontend).
///
/// Name equality is the sole identity key: a platform is created on first
/// reference by name and never duplicated or silently renamed while games,
/// API keys, or live scans still point at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalogued game, owned by exactly one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appid: Option<i64>,
    pub title: String,
    pub platform: Platform,
    pub genre: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playtime_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertion payload for a game. The platform is referenced by name and
/// resolved (or created) at insert time; a missing genre defaults to
/// `"Unknown"` in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewGame {
    pub appid: Option<i64>,
    pub title: String,
    pub platform: String,
    pub genre: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub release_date: Option<String>,
    pub playtime_minutes: Option<i64>,
    pub installed_path: Option<String>,
    pub application_file: Option<String>,
}

impl NewGame {
    pub fn new(title: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            platform: platform.into(),
            ..Default::default()
        }
    }
}

/// Partial update for a game; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamePatch {
    pub appid: Option<i64>,
    pub title: Option<String>,
    pub platform: Option<String>,
    pub genre: Option<String>,
    pub tags: Option<Vec<String>>,
    pub release_date: Option<String>,
    pub playtime_minutes: Option<i64>,
    pub installed_path: Option<String>,
    pub application_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionWithGames {
    #[serde(flatten)]
    pub collection: Collection,
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored credential for one platform integration, owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub user_id: UserId,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for an API key. User and platform are referenced by name
/// and created on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApiKey {
    pub user: String,
    pub platform: String,
    pub client_id: Option<String>,
    pub key: String,
}
