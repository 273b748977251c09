//! `profiles://users`: user profiles and preferences.

use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::{FileBacked, JSON_MIME_TYPE};
use crate::capability::{CapabilityDescriptor, ResourceHandler};
use crate::error::HandlerError;

pub const URI: &str = "profiles://users";

/// User profiles resource.
#[derive(Debug)]
pub struct ProfilesResource {
    source: FileBacked,
}

impl ProfilesResource {
    /// Creates the resource backed by the JSON file at `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            source: FileBacked::new(URI, path, built_in_profiles),
        }
    }
}

#[async_trait]
impl ResourceHandler for ProfilesResource {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(URI, "Access user profile data and preferences")
            .with_title("User Profiles")
            .with_mime_type(JSON_MIME_TYPE)
    }

    async fn read(&self) -> Result<Value, HandlerError> {
        tracing::debug!(uri = URI, "Reading user profiles resource");
        Ok(self.source.load().await)
    }
}

fn built_in_profiles() -> Value {
    let now = Utc::now();
    let stamp = |t: chrono::DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Millis, true);

    json!({
        "profiles": [
            {
                "id": 1,
                "username": "john_doe",
                "email": "john@example.com",
                "preferences": { "theme": "dark", "notifications": true, "language": "en" },
                "stats": {
                    "loginCount": 45,
                    "lastLogin": stamp(now),
                    "accountCreated": "2024-01-01T00:00:00Z"
                }
            },
            {
                "id": 2,
                "username": "jane_smith",
                "email": "jane@example.com",
                "preferences": { "theme": "light", "notifications": false, "language": "en" },
                "stats": {
                    "loginCount": 23,
                    "lastLogin": stamp(now - Duration::days(1)),
                    "accountCreated": "2024-01-15T00:00:00Z"
                }
            }
        ],
        "metadata": {
            "totalUsers": 2,
            "activeUsers": 2,
            "lastUpdated": stamp(now)
        }
    })
}
