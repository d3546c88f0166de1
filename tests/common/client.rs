//! Test HTTP client for the `/auth/*` endpoints.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;

/// A thin form-posting client.
pub struct AuthClient {
    base: String,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(base: String) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    /// POST a form and return HTTP status plus raw body.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> anyhow::Result<(u16, String)> {
        let resp = self
            .http
            .post(format!("{}{}", self.base, path))
            .form(fields)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }

    /// POST a form and parse the JSON reply, requiring HTTP 200.
    pub async fn post_json(&self, path: &str, fields: &[(&str, &str)]) -> anyhow::Result<Value> {
        let (status, body) = self.post_form(path, fields).await?;
        anyhow::ensure!(status == 200, "unexpected HTTP {status}: {body}");
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn register(&self, email: &str, password: &str) -> anyhow::Result<Value> {
        let email = STANDARD.encode(email);
        let password = STANDARD.encode(password);
        self.post_json(
            "/auth/register",
            &[("email_base64", email.as_str()), ("password_base64", password.as_str())],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<Value> {
        let email = STANDARD.encode(email);
        let password = STANDARD.encode(password);
        self.post_json(
            "/auth/login",
            &[("email_base64", email.as_str()), ("password_base64", password.as_str())],
        )
        .await
    }

    pub async fn session(&self, session_id: &str) -> anyhow::Result<Value> {
        self.post_json("/auth/session", &[("session_id", session_id)])
            .await
    }

    pub async fn logout(&self, session_id: &str) -> anyhow::Result<Value> {
        self.post_json("/auth/logout", &[("session_id", session_id)])
            .await
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<(u16, String)> {
        let resp = self.http.get(format!("{}{}", self.base, path)).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }
}
