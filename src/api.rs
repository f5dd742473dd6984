//! VNTANA platform API surface exercised by the verification run.
//!
//! Every endpoint wrapper returns the raw blocking [`Response`] so the
//! verification steps can inspect status codes, headers, and bodies exactly
//! as the documentation describes them.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::http::create_http_client;

/// Production API host. Overridable for staging environments.
pub const DEFAULT_BASE_URL: &str = "https://api-platform.vntana.com";

/// Header carrying session and refresh tokens, on requests and responses.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Header selecting the tenant when issuing a refresh token.
pub const ORGANIZATION_UUID_HEADER: &str = "organizationUuid";

/// Envelope the platform wraps every JSON response body in.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
}

impl Envelope {
    /// Parse a response body. Non-JSON bodies yield `None`.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Joined error messages, if the envelope carries any.
    pub fn error_messages(&self) -> Option<String> {
        join_messages(&self.errors)
    }
}

fn join_messages(errors: &[ApiError]) -> Option<String> {
    let messages: Vec<&str> = errors.iter().filter_map(|e| e.message.as_deref()).collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

/// Envelope for listing endpoints: `{success, errors, response: {grid: [..]}}`.
#[derive(Debug, Deserialize)]
pub struct GridEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    pub response: Option<GridBody>,
}

#[derive(Debug, Deserialize)]
pub struct GridBody {
    #[serde(default)]
    pub grid: Vec<TenantRecord>,
}

/// One organization or workspace row from a listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantRecord {
    pub name: String,
    pub uuid: Uuid,
}

impl GridEnvelope {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn records(&self) -> &[TenantRecord] {
        self.response.as_ref().map(|b| b.grid.as_slice()).unwrap_or(&[])
    }

    /// Joined error messages, if the envelope carries any.
    pub fn error_messages(&self) -> Option<String> {
        join_messages(&self.errors)
    }
}

/// Client for the authentication endpoints, bound to one base URL.
pub struct AuthApi {
    client: Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: create_http_client()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /v1/auth/login/token` with a personal access token.
    pub fn login_with_token(&self, personal_access_token: &str) -> Result<Response> {
        let url = self.url("/v1/auth/login/token");
        debug!(%url, "POST login with personal access token");
        let response = self
            .client
            .post(&url)
            .json(&json!({ "personal-access-token": personal_access_token }))
            .send()
            .context("Login-by-token request failed")?;
        debug!(status = %response.status(), "login/token response");
        Ok(response)
    }

    /// `POST /v1/auth/login` with email and password.
    pub fn login_with_email(&self, email: &str, password: &str) -> Result<Response> {
        let url = self.url("/v1/auth/login");
        debug!(%url, "POST login with email/password");
        let response = self
            .client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .context("Login-by-credentials request failed")?;
        debug!(status = %response.status(), "login response");
        Ok(response)
    }

    /// `GET /v1/organizations` with a session token.
    pub fn list_organizations(&self, session_token: &str) -> Result<Response> {
        let url = self.url("/v1/organizations");
        debug!(%url, "GET organizations");
        let response = self
            .client
            .get(&url)
            .header(AUTH_TOKEN_HEADER, bearer(session_token))
            .send()
            .context("Organization listing request failed")?;
        debug!(status = %response.status(), "organizations response");
        Ok(response)
    }

    /// `POST /v1/auth/refresh-token`, exchanging a session token for an
    /// organization-scoped token.
    pub fn refresh_token(&self, session_token: &str, organization_uuid: &Uuid) -> Result<Response> {
        let url = self.url("/v1/auth/refresh-token");
        debug!(%url, organization = %organization_uuid, "POST refresh token");
        let response = self
            .client
            .post(&url)
            .header(AUTH_TOKEN_HEADER, bearer(session_token))
            .header(ORGANIZATION_UUID_HEADER, organization_uuid.to_string())
            .send()
            .context("Refresh-token request failed")?;
        debug!(status = %response.status(), "refresh-token response");
        Ok(response)
    }

    /// `GET /v1/clients/client-organizations` with a refresh token.
    pub fn list_client_organizations(&self, refresh_token: &str) -> Result<Response> {
        let url = self.url("/v1/clients/client-organizations");
        debug!(%url, "GET client organizations");
        let response = self
            .client
            .get(&url)
            .header(AUTH_TOKEN_HEADER, bearer(refresh_token))
            .send()
            .context("Workspace listing request failed")?;
        debug!(status = %response.status(), "client-organizations response");
        Ok(response)
    }
}

/// Bearer credential form the platform expects in `x-auth-token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Extract the token header from a response, if present.
pub fn auth_token_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Masked preview of a token: first 20 and last 10 characters. Tokens too
/// short to survive masking are shown as-is.
pub fn masked_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 30 {
        return token.to_string();
    }
    let head: String = chars[..20].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{head}...{tail}")
}

/// Truncated UUID preview for listing output.
pub fn short_uuid(uuid: &Uuid) -> String {
    let full = uuid.to_string();
    format!("{}...", &full[..8])
}
