//! Session store for the signed-in account.
//!
//! A session is four independent string entries in [`Storage`], not one
//! serialized record; the token write is the commit point, and
//! [`SessionStore::is_authenticated`] keys on the token alone. Login
//! delegates authentication to the backend for either audience and writes
//! the four keys from the response; logout removes them all. Storage
//! failures never surface here (the storage layer is fail-silent), so
//! every query fails closed instead of panicking.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::api::types::{ApiResponse, LoginRequest, LoginResponse, RegisterProRequest, RegisterUserRequest};
use crate::api::ApiClient;
use crate::storage::Storage;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_TYPE_KEY: &str = "user_type";
pub const USER_NAME_KEY: &str = "user_name";
pub const USER_ID_KEY: &str = "user_id";

pub const USER_LOGIN_PATH: &str = "auth/user/login";
pub const PRO_LOGIN_PATH: &str = "auth/pro/login";
pub const USER_REGISTER_PATH: &str = "auth/user/register";
pub const PRO_REGISTER_PATH: &str = "auth/pro/register";

#[derive(Clone, Debug)]
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<Storage>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<Storage>) -> Self {
        Self { api, storage }
    }

    /// Authenticates a customer account and stores the session.
    /// # Errors
    /// Returns an error if the backend rejects the credentials or the
    /// request fails; nothing is stored in that case.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let response = self.api.login_user(USER_LOGIN_PATH, credentials).await?;
        self.store_session(&response);

        Ok(response)
    }

    /// Authenticates a professional account and stores the session.
    /// # Errors
    /// Returns an error if the backend rejects the credentials or the
    /// request fails; nothing is stored in that case.
    pub async fn login_pro(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let response = self.api.login_user(PRO_LOGIN_PATH, credentials).await?;
        self.store_session(&response);

        Ok(response)
    }

    /// # Errors
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn register_user(&self, request: &RegisterUserRequest) -> Result<ApiResponse<()>> {
        self.api.post_json(USER_REGISTER_PATH, request).await
    }

    /// # Errors
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn register_pro(&self, request: &RegisterProRequest) -> Result<ApiResponse<()>> {
        self.api.post_json(PRO_REGISTER_PATH, request).await
    }

    // Four independent writes; a failure between them can leave a partial
    // session, but the token is written first and is the only key
    // authentication checks.
    fn store_session(&self, response: &LoginResponse) {
        self.storage.set(AUTH_TOKEN_KEY, &response.token);
        self.storage.set(USER_TYPE_KEY, &response.role);
        self.storage.set(USER_NAME_KEY, &response.first_name);

        let id = response.id.map(|id| id.to_string()).unwrap_or_default();
        self.storage.set(USER_ID_KEY, &id);

        debug!("session stored for {} ({})", response.first_name, response.role);
    }

    /// Removes all four session keys; removing an absent key is a no-op.
    pub fn logout(&self) {
        for key in [AUTH_TOKEN_KEY, USER_TYPE_KEY, USER_NAME_KEY, USER_ID_KEY] {
            self.storage.remove(key);
        }
    }

    /// True iff a non-empty token is currently stored. Never panics; a
    /// missing or unreadable token reads as signed out.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.storage
            .get(AUTH_TOKEN_KEY)
            .is_some_and(|token| !token.is_empty())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get(AUTH_TOKEN_KEY)
    }

    #[must_use]
    pub fn user_type(&self) -> Option<String> {
        self.storage.get(USER_TYPE_KEY)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.storage.get(USER_ID_KEY)
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.storage.get(USER_NAME_KEY)
    }
}
