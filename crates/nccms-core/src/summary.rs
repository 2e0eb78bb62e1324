//! Collection summaries derived from raw CMS list responses

use crate::time::{Clock, format_relative, latest_timestamp};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Count and freshness of one CMS collection, recomputed on every fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Number of records the server reports
    pub count: Option<u64>,
    /// Most recent timestamp across the returned records
    pub most_recent: Option<DateTime<Utc>>,
}

/// Records carried by a list response
///
/// A bare array is returned as is, an envelope yields its `results`, and any
/// other object is treated as a single record.
#[must_use]
pub fn collection_records(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(results)) => results.clone(),
            _ => vec![data.clone()],
        },
        _ => Vec::new(),
    }
}

impl CollectionSummary {
    /// Derive the summary for a list response
    ///
    /// Envelope counts prefer `count`, then `total`, then the length of
    /// `results`. An object carrying only `count` has no timestamp, and any
    /// other object counts as one record.
    #[must_use]
    pub fn from_payload(data: &Value) -> Self {
        match data {
            Value::Array(items) => Self {
                count: Some(items.len() as u64),
                most_recent: latest_timestamp(items),
            },
            Value::Object(map) => {
                if let Some(Value::Array(results)) = map.get("results") {
                    let count = map
                        .get("count")
                        .and_then(Value::as_u64)
                        .or_else(|| map.get("total").and_then(Value::as_u64))
                        .unwrap_or(results.len() as u64);
                    return Self {
                        count: Some(count),
                        most_recent: latest_timestamp(results),
                    };
                }

                if let Some(count) = map.get("count").and_then(Value::as_u64) {
                    return Self {
                        count: Some(count),
                        most_recent: None,
                    };
                }

                Self {
                    count: Some(1),
                    most_recent: latest_timestamp(std::slice::from_ref(data)),
                }
            }
            _ => Self::default(),
        }
    }

    /// Relative "last updated" label
    #[must_use]
    pub fn updated_label(&self, clock: &dyn Clock) -> Option<String> {
        self.most_recent
            .map(|latest| format_relative(latest, clock.now()))
    }
}
