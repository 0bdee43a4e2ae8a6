//! Email and phone verification codes for either account type.

use anyhow::Result;

use super::types::{ApiResponse, SendVerificationCodeRequest, VerifyCodeRequest};
use super::ApiClient;

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn send_email_code(
    api: &ApiClient,
    request: &SendVerificationCodeRequest,
) -> Result<ApiResponse<()>> {
    api.post_json("verification/send-email-code", request).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn send_phone_code(
    api: &ApiClient,
    request: &SendVerificationCodeRequest,
) -> Result<ApiResponse<()>> {
    api.post_json("verification/send-phone-code", request).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn verify_email_code(
    api: &ApiClient,
    request: &VerifyCodeRequest,
) -> Result<ApiResponse<()>> {
    api.post_json("verification/verify-email", request).await
}

/// # Errors
/// Returns an error if the request fails or the backend rejects it.
pub async fn verify_phone_code(
    api: &ApiClient,
    request: &VerifyCodeRequest,
) -> Result<ApiResponse<()>> {
    api.post_json("verification/verify-phone", request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use anyhow::Result;
    use serde_json::json;
    use std::net::TcpListener;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn verify_email_posts_contact_and_code() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/verification/verify-email"))
            .and(body_json(json!({
                "contact": "ada@example.com",
                "code": "424242",
                "userType": "User"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "verified"
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Arc::new(Storage::in_memory()))?;
        let request = VerifyCodeRequest {
            contact: "ada@example.com".to_string(),
            code: "424242".to_string(),
            user_type: "User".to_string(),
        };

        let response = verify_email_code(&api, &request).await?;
        assert_eq!(response.message.as_deref(), Some("verified"));
        Ok(())
    }
}
