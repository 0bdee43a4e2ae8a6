//! Backend HTTP client. Every outgoing request passes through
//! [`ApiClient`], which re-reads the session token from storage at send
//! time and attaches `Authorization: Bearer <token>` when one is present.
//! It is also the single place that notices an unauthorized response: the
//! 401 is logged and then propagated unchanged, because session state is
//! only ever changed by explicit user action or the idle monitor.

pub mod jobs;
pub mod types;
pub mod users;
pub mod verification;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info_span, Instrument};
use url::Url;

use crate::session::AUTH_TOKEN_KEY;
use crate::storage::Storage;

use self::types::{LoginRequest, LoginResponse};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Joins the configured base URL and an endpoint path.
/// # Errors
/// Returns an error if the base URL cannot be parsed, has no host, or uses
/// a scheme other than http/https.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<String> {
    let url = Url::parse(base_url)?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(anyhow!("Error parsing API URL: unsupported scheme {scheme}"));
    }

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Error parsing API URL: no host specified"))?;

    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let base_path = url.path().trim_end_matches('/');
    let endpoint = format!(
        "{scheme}://{authority}{base_path}/{}",
        path.trim_start_matches('/')
    );

    debug!("endpoint URL: {}", endpoint);

    Ok(endpoint)
}

fn api_error_message(json_response: &Value) -> &str {
    json_response
        .get("error")
        .or_else(|| json_response.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: Arc<Storage>,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, storage: Arc<Storage>) -> Result<Self> {
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            storage,
        })
    }

    /// Attaches the bearer token when a session token is currently stored.
    ///
    /// The token is read from storage for every request rather than cached,
    /// so a login or logout between two requests is honored by the very
    /// next one.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            error!("unauthorized response from {url}: invalid or expired token");
        }

        if !status.is_success() {
            let json_response: Value = response.json().await.unwrap_or_default();

            return Err(anyhow!(
                "{} - {}, {}",
                url,
                status,
                api_error_message(&json_response)
            ));
        }

        Ok(response)
    }

    /// # Errors
    /// Returns an error if the request fails, the backend returns a
    /// non-success status, or the response body does not decode.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = endpoint_url(&self.base_url, path)?;

        let span = info_span!("api.get", http.method = "GET", url = %url);
        let response = self
            .send(self.authorize(self.http.get(&url)), &url)
            .instrument(span)
            .await?;

        Ok(response.json().await?)
    }

    /// # Errors
    /// Returns an error if the request fails, the backend returns a
    /// non-success status, or the response body does not decode.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = endpoint_url(&self.base_url, path)?;

        let span = info_span!("api.post", http.method = "POST", url = %url);
        let response = self
            .send(self.authorize(self.http.post(&url).json(body)), &url)
            .instrument(span)
            .await?;

        Ok(response.json().await?)
    }

    /// # Errors
    /// Returns an error if the request fails, the backend returns a
    /// non-success status, or the response body does not decode.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = endpoint_url(&self.base_url, path)?;

        let span = info_span!("api.put", http.method = "PUT", url = %url);
        let response = self
            .send(self.authorize(self.http.put(&url).json(body)), &url)
            .instrument(span)
            .await?;

        Ok(response.json().await?)
    }

    /// # Errors
    /// Returns an error if the request fails or the backend returns a
    /// non-success status.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = endpoint_url(&self.base_url, path)?;

        let span = info_span!("api.delete", http.method = "DELETE", url = %url);
        self.send(self.authorize(self.http.delete(&url)), &url)
            .instrument(span)
            .await?;

        Ok(())
    }

    /// Authenticates against the given login endpoint; the caller picks the
    /// audience path (`auth/user/login` or `auth/pro/login`).
    /// # Errors
    /// Returns an error if the request fails, credentials are rejected, or
    /// the response is missing expected fields.
    pub async fn login_user(
        &self,
        path: &str,
        credentials: &LoginRequest,
    ) -> Result<LoginResponse> {
        let payload = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });

        debug!("login URL: {}, email: {}", self.base_url, credentials.email);

        self.post_json(path, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Arc::new(Storage::in_memory())).expect("client")
    }

    #[test]
    fn endpoint_url_joins_path() -> Result<()> {
        let url = endpoint_url("http://example.com:3000", "jobs/my-jobs")?;
        assert_eq!(url, "http://example.com:3000/jobs/my-jobs");
        Ok(())
    }

    #[test]
    fn endpoint_url_keeps_base_path() -> Result<()> {
        let url = endpoint_url("https://example.com/api/", "/auth/user/login")?;
        assert_eq!(url, "https://example.com/api/auth/user/login");
        Ok(())
    }

    #[test]
    fn endpoint_url_rejects_unsupported_scheme() -> Result<()> {
        let err = endpoint_url("ftp://example.com", "jobs")
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("unsupported scheme"));
        Ok(())
    }

    #[tokio::test]
    async fn bearer_header_tracks_stored_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/jobs/my-jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let api = client_for(&server);

        let _: Value = api.get_json("jobs/my-jobs").await?;

        api.storage.set(AUTH_TOKEN_KEY, "tok-1");
        let _: Value = api.get_json("jobs/my-jobs").await?;

        api.storage.remove(AUTH_TOKEN_KEY);
        let _: Value = api.get_json("jobs/my-jobs").await?;

        let requests = server
            .received_requests()
            .await
            .ok_or_else(|| anyhow!("request recording disabled"))?;
        let auth_headers: Vec<Option<&str>> = requests
            .iter()
            .map(|request| {
                request
                    .headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
            })
            .collect();

        assert_eq!(auth_headers, vec![None, Some("Bearer tok-1"), None]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_token_sends_no_header() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/jobs/my-jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let api = client_for(&server);
        api.storage.set(AUTH_TOKEN_KEY, "");

        let _: Value = api.get_json("jobs/my-jobs").await?;

        let requests = server
            .received_requests()
            .await
            .ok_or_else(|| anyhow!("request recording disabled"))?;
        assert!(requests[0].headers.get("authorization").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_response_propagates_without_logout() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/7"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "token expired"
            })))
            .mount(&server)
            .await;

        let api = client_for(&server);
        api.storage.set(AUTH_TOKEN_KEY, "stale-token");

        let result: Result<Value> = api.get_json("users/7").await;
        let err = result.err().ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("token expired"));

        // observing a 401 never clears the session
        assert_eq!(api.storage.get(AUTH_TOKEN_KEY), Some("stale-token".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn error_detail_falls_back_to_message_field() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/jobs/9"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "job already assigned"
            })))
            .mount(&server)
            .await;

        let api = client_for(&server);

        let err = api
            .delete("jobs/9")
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("job already assigned"));
        Ok(())
    }

    #[tokio::test]
    async fn login_posts_credentials_payload() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/user/login"))
            .and(body_json(json!({
                "email": "ada@example.com",
                "password": "analytical"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "abc123",
                "email": "ada@example.com",
                "id": 7,
                "firstName": "Ada",
                "lastName": "Lovelace",
                "userType": "User",
                "role": "User"
            })))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let credentials = LoginRequest {
            email: "ada@example.com".to_string(),
            password: SecretString::from("analytical".to_string()),
        };

        let response = api.login_user("auth/user/login", &credentials).await?;
        assert_eq!(response.token, "abc123");
        assert_eq!(response.id, Some(7));
        Ok(())
    }
}
