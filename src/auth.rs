use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{Credentials, Endpoints};
use crate::error::ScrapeError;
use crate::http::RateLimitedClient;

static CLIENT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"OAUTH_CLIENT_ID\\?"\s*:\s*\\?"\s*([^"\\]+?)\s*\\?""#)
        .expect("client id pattern is valid")
});

/// Bearer credentials for the rest of the run.
#[derive(Clone)]
pub struct AuthContext {
    token: String,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext").finish_non_exhaustive()
    }
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.token)
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
    grant_type: &'static str,
    client_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: AccessToken,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

/// Pulls the OAuth client id out of the sign-in page's embedded settings.
pub fn extract_client_id(page: &str) -> Result<String, ScrapeError> {
    CLIENT_ID_PATTERN
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| {
            ScrapeError::Authentication("OAuth client id not found on sign-in page".to_owned())
        })
}

pub async fn login(
    client: &RateLimitedClient,
    endpoints: &Endpoints,
    creds: &Credentials,
) -> anyhow::Result<AuthContext> {
    tracing::info!(username = %creds.username, "login");

    let sign_in = endpoints.sign_in();
    let page = client
        .send(client.get(&sign_in))
        .await
        .with_context(|| format!("GET {sign_in}"))?
        .text()
        .await
        .context("read sign-in page")?;
    let client_id = extract_client_id(&page)?;

    let token_url = endpoints.access_token();
    let body = TokenRequest {
        username: &creds.username,
        password: &creds.pw,
        grant_type: "password",
        client_id: &client_id,
    };
    let response = client
        .send(client.post(&token_url).json(&body))
        .await
        .with_context(|| format!("POST {token_url}"))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        tracing::error!(status = status.as_u16(), "login rejected");
        return Err(ScrapeError::Authentication(format!("token endpoint returned {status}")).into());
    }

    let raw = response.text().await.context("read token response")?;
    let token: TokenResponse = serde_json::from_str(&raw)
        .map_err(|err| ScrapeError::Authentication(format!("malformed token response: {err}")))?;

    tracing::info!("login ok");
    Ok(AuthContext::new(token.access_token.access_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_client_id_in_embedded_settings() -> anyhow::Result<()> {
        let page = r#"<script>window.__CONFIG__ = {"API_HOST":"x","OAUTH_CLIENT_ID":"1e739f5e7ed8","SENTRY":""};</script>"#;
        assert_eq!(extract_client_id(page)?, "1e739f5e7ed8");
        Ok(())
    }

    #[test]
    fn finds_client_id_in_escaped_json() -> anyhow::Result<()> {
        let page = r#"<script>JSON.parse("{\"OAUTH_CLIENT_ID\":\"abc123\",\"X\":1}")</script>"#;
        assert_eq!(extract_client_id(page)?, "abc123");
        Ok(())
    }

    #[test]
    fn missing_client_id_is_an_authentication_error() {
        let err = extract_client_id("<html></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::Authentication(_)));
    }

    #[test]
    fn authorized_requests_carry_the_bearer_token() -> anyhow::Result<()> {
        let client = reqwest::Client::new();
        let request = AuthContext::new("tok")
            .authorize(client.get("http://127.0.0.1/course/1/"))
            .build()?;
        let header = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .map(|value| value.to_str())
            .transpose()?;
        assert_eq!(header, Some("Bearer tok"));
        Ok(())
    }

    #[test]
    fn debug_output_hides_the_token() {
        let shown = format!("{:?}", AuthContext::new("secret-token"));
        assert!(!shown.contains("secret-token"));
    }
}
