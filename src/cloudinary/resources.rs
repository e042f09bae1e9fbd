//! Stored image listings and the pure helpers built on them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored image as reported by the admin API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub public_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Everything else the API returned, kept for dumps
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of a listing; `next_cursor` is set when more pages follow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePage {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub public_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secure_url: Option<String>,
}

/// Result of a bulk delete, keyed by public id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted: serde_json::Map<String, serde_json::Value>,
}

/// Stock image names: the prefix stripped, sorted
pub fn stock_image_ids(resources: &[Resource], prefix: &str) -> Vec<String> {
    let mut ids: Vec<String> = resources
        .iter()
        .map(|r| {
            r.public_id
                .strip_prefix(prefix)
                .unwrap_or(&r.public_id)
                .to_string()
        })
        .collect();
    ids.sort();
    ids
}

/// The message listing stock images a user can choose from
pub fn format_stock_choices(ids: &[String]) -> String {
    let mut output = String::from("Choose from:\n");
    for id in ids {
        output.push('\n');
        output.push_str(id);
    }
    output
}

/// Age of a resource in fractional days, if it reports a creation time
pub fn age_days(resource: &Resource, now: DateTime<Utc>) -> Option<f64> {
    let created_at = resource.created_at?;
    Some((now - created_at).num_milliseconds() as f64 / 1000.0 / 60.0 / 60.0 / 24.0)
}

/// Public ids of resources strictly older than `max_age_days`.
///
/// Resources without a creation time are kept.
pub fn expired_public_ids(
    resources: &[Resource],
    now: DateTime<Utc>,
    max_age_days: f64,
) -> Vec<String> {
    resources
        .iter()
        .filter(|r| age_days(r, now).is_some_and(|age| age > max_age_days))
        .map(|r| r.public_id.clone())
        .collect()
}
