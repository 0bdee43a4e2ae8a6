//! Job listings: the customer-posted requests professionals bid on. A job
//! moves from `open` through `in-progress` (bid accepted) to `completed`;
//! the lifecycle itself lives on the backend, this module only mirrors it.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ApiClient;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub budget: String,
    pub timeline: String,
    #[serde(default)]
    pub attachments: Option<String>,
    pub status: String,
    #[serde(default)]
    pub assigned_pro_id: Option<u64>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub budget: String,
    pub timeline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<String>,
}

/// Partial update; only the provided fields are sent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<String>,
}

/// Jobs posted by the signed-in customer.
/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn my_jobs(api: &ApiClient) -> Result<Vec<Job>> {
    api.get_json("jobs/my-jobs").await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn fetch_job(api: &ApiClient, id: u64) -> Result<Job> {
    api.get_json(&format!("jobs/{id}")).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn create_job(api: &ApiClient, job: &CreateJobRequest) -> Result<Job> {
    api.post_json("jobs", job).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn update_job(api: &ApiClient, id: u64, update: &UpdateJobRequest) -> Result<Job> {
    api.put_json(&format!("jobs/{id}"), update).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn delete_job(api: &ApiClient, id: u64) -> Result<()> {
    api.delete(&format!("jobs/{id}")).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn jobs_by_category(api: &ApiClient, category: &str) -> Result<Vec<Job>> {
    api.get_json(&format!("jobs/category/{category}")).await
}
