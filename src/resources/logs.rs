//! `logs://system`: recent system log entries.

use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::{FileBacked, JSON_MIME_TYPE};
use crate::capability::{CapabilityDescriptor, ResourceHandler};
use crate::error::HandlerError;

pub const URI: &str = "logs://system";

/// System logs resource.
#[derive(Debug)]
pub struct LogsResource {
    source: FileBacked,
}

impl LogsResource {
    /// Creates the resource backed by the JSON file at `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            source: FileBacked::new(URI, path, built_in_logs),
        }
    }
}

#[async_trait]
impl ResourceHandler for LogsResource {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(URI, "Access system logs and error reports")
            .with_title("System Logs")
            .with_mime_type(JSON_MIME_TYPE)
    }

    async fn read(&self) -> Result<Value, HandlerError> {
        tracing::debug!(uri = URI, "Reading system logs resource");
        Ok(self.source.load().await)
    }
}

fn built_in_logs() -> Value {
    let now = Utc::now();
    let at = |minutes_ago: i64| {
        (now - Duration::minutes(minutes_ago)).to_rfc3339_opts(SecondsFormat::Millis, true)
    };

    json!({
        "logs": [
            {
                "id": 1,
                "timestamp": at(60),
                "level": "info",
                "service": "api",
                "message": "Server started successfully",
                "metadata": { "port": 3000 }
            },
            {
                "id": 2,
                "timestamp": at(30),
                "level": "warn",
                "service": "database",
                "message": "Connection pool running low",
                "metadata": { "available": 2, "total": 10 }
            },
            {
                "id": 3,
                "timestamp": at(15),
                "level": "error",
                "service": "auth",
                "message": "Failed login attempt",
                "metadata": { "ip": "192.168.1.100", "attempts": 3 }
            }
        ],
        "summary": {
            "total": 3,
            "levels": { "info": 1, "warn": 1, "error": 1 }
        },
        "lastUpdated": at(0)
    })
}
