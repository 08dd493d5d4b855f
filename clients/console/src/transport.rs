//! Transport to the auth endpoints
//!
//! [`AuthTransport`] is the seam between the auth store and the network, so
//! the state machine can be driven by a scripted transport in tests. The real
//! implementation rides on `reqwest` with its cookie store enabled, which
//! plays the browser's role of carrying the session cookie; API clients can
//! opt into the bearer-header fallback instead.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use common::envelope::ErrorBody;
use common::identity::Identity;

/// Client-side failure.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The server rejected the request with the uniform envelope.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),
}

/// Successful login response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginReply {
    pub access_token: String,
    pub user: Identity,
}

/// Successful logout response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutReply {
    pub message: String,
}

/// Successful verification response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReply {
    pub valid: bool,
    pub user: Identity,
}

/// Successful profile response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReply {
    pub user: Identity,
}

/// Async transport over the four auth endpoints.
#[allow(async_fn_in_trait)]
pub trait AuthTransport {
    async fn login(&self, username: &str, password: &str) -> Result<LoginReply, ClientError>;
    async fn logout(&self) -> Result<LogoutReply, ClientError>;
    async fn verify(&self) -> Result<VerifyReply, ClientError>;
    async fn profile(&self) -> Result<ProfileReply, ClientError>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url` (e.g. `http://host:3000/api/v1`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let base_url: String = base_url.into();

        Ok(HttpTransport {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Send the token in the `Authorization` header instead of relying on the
    /// cookie store. Meant for non-browser API clients.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Network(e.to_string()));
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl AuthTransport for HttpTransport {
    async fn login(&self, username: &str, password: &str) -> Result<LoginReply, ClientError> {
        let builder = self
            .request(reqwest::Method::POST, "/auth/login")
            .json(&json!({ "username": username, "password": password }));
        Self::execute(builder).await
    }

    async fn logout(&self) -> Result<LogoutReply, ClientError> {
        Self::execute(self.request(reqwest::Method::POST, "/auth/logout")).await
    }

    async fn verify(&self) -> Result<VerifyReply, ClientError> {
        Self::execute(self.request(reqwest::Method::GET, "/auth/verify")).await
    }

    async fn profile(&self) -> Result<ProfileReply, ClientError> {
        Self::execute(self.request(reqwest::Method::GET, "/auth/profile")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://localhost:3000/api/v1/").unwrap();
        assert_eq!(transport.base_url, "http://localhost:3000/api/v1");
    }

    #[test]
    fn login_reply_parses_wire_shape() {
        let json = serde_json::json!({
            "access_token": "tok",
            "user": {
                "id": uuid::Uuid::new_v4(),
                "username": "admin",
                "role": "admin",
                "permission": ["user.read", "user.write"],
            },
        });
        let reply: LoginReply = serde_json::from_value(json).unwrap();
        assert_eq!(reply.user.permissions.len(), 2);
    }
}
