//! `fetch_api_data`: mock external API fetches.
//!
//! No network access happens. Each endpoint returns canned data shaped like
//! a real API response, after an optional simulated latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::capability::{CapabilityDescriptor, CapabilityResult, ToolHandler};
use crate::config::ApiConfig;
use crate::error::HandlerError;

const DEFAULT_CITY: &str = "London";

const CONDITIONS: [&str; 4] = ["Sunny", "Cloudy", "Rainy", "Snowy"];

const QUOTES: [(&str, &str); 3] = [
    (
        "The only way to do great work is to love what you do.",
        "Steve Jobs",
    ),
    (
        "Innovation distinguishes between a leader and a follower.",
        "Steve Jobs",
    ),
    ("Stay hungry, stay foolish.", "Steve Jobs"),
];

/// The mock API tool.
#[derive(Debug, Default)]
pub struct ApiTool {
    latency: Duration,
    next_quote: AtomicUsize,
}

impl ApiTool {
    /// Creates the tool with the configured simulated latency.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.simulated_latency_ms),
            next_quote: AtomicUsize::new(0),
        }
    }

    fn weather(city: &str) -> CapabilityResult {
        let seed = fnv1a(city.to_lowercase().as_bytes());
        CapabilityResult::success(
            json!({
                "city": city,
                "temperature": 5 + seed % 30,
                "condition": CONDITIONS[(seed / 31) as usize % CONDITIONS.len()],
                "humidity": (seed / 127) % 100,
                "windSpeed": (seed / 8191) % 20,
            }),
            format!("Weather data for {city}"),
        )
    }

    fn quote(&self) -> CapabilityResult {
        let index = self.next_quote.fetch_add(1, Ordering::Relaxed) % QUOTES.len();
        let (text, author) = QUOTES[index];
        CapabilityResult::success(
            json!({ "text": text, "author": author }),
            "Random inspirational quote",
        )
    }

    fn news() -> CapabilityResult {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        CapabilityResult::success(
            json!([
                {
                    "title": "Tech Industry Continues to Grow",
                    "summary": "Latest developments in AI and machine learning",
                    "publishedAt": now,
                },
                {
                    "title": "Climate Change Updates",
                    "summary": "New research on renewable energy solutions",
                    "publishedAt": now,
                }
            ]),
            "Latest news headlines",
        )
    }
}

#[async_trait]
impl ToolHandler for ApiTool {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "fetch_api_data",
            "Fetch data from external APIs (weather, news, etc.)",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "endpoint": {
                    "type": "string",
                    "description": "API endpoint type (weather, news, quote)"
                },
                "params": {
                    "type": "object",
                    "description": "Parameters for the API call",
                    "properties": {
                        "city": { "type": "string" },
                        "country": { "type": "string" }
                    }
                }
            },
            "required": ["endpoint"]
        }))
    }

    async fn invoke(&self, arguments: Value) -> Result<CapabilityResult, HandlerError> {
        let endpoint = arguments
            .get("endpoint")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::new("Missing required parameter: endpoint"))?;

        tracing::debug!(endpoint, "Executing API tool");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match endpoint {
            "weather" => {
                let city = arguments
                    .pointer("/params/city")
                    .and_then(Value::as_str)
                    .filter(|city| !city.is_empty())
                    .unwrap_or(DEFAULT_CITY);
                Ok(Self::weather(city))
            }
            "quote" => Ok(self.quote()),
            "news" => Ok(Self::news()),
            other => Err(HandlerError::new(format!("Unknown endpoint: {other}"))),
        }
    }
}

/// 64-bit FNV-1a, used to derive stable mock readings from a city name.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}
