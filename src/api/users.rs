//! Profile operations for the signed-in account.

use anyhow::Result;

use super::types::{ApiResponse, UpdateUserRequest, UserProfile};
use super::ApiClient;

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn fetch_user(api: &ApiClient, id: u64) -> Result<UserProfile> {
    api.get_json(&format!("users/{id}")).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn update_user(
    api: &ApiClient,
    update: &UpdateUserRequest,
) -> Result<ApiResponse<UserProfile>> {
    api.put_json(&format!("users/{}", update.id), update).await
}
