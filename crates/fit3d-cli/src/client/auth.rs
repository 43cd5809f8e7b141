//! Fit3D dashboard authentication
//!
//! Drives the hosted login flow and plucks the session token the dashboard
//! seeds into page storage. The dashboard serves the login form and the
//! post-login landing page from the same host, so after every page load we
//! probe the document for a token and otherwise decide whether we are still
//! on the login form or stranded on the landing page without one.

use log::debug;
use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;

use crate::client::token::SessionToken;
use crate::error::{Fit3dError, Result};

/// Hosted dashboard URL, which doubles as the login page until a session
/// exists and as the landing page afterwards.
const DASHBOARD_URL: &str = "https://dashboard.fit3d.com";

/// User agent for dashboard requests
const DASHBOARD_USER_AGENT: &str = "fit3d-cli";

/// Outcome of probing one loaded page for a session token.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The page carries a token; capture is complete.
    TokenFound(String),
    /// No token, but we are still on the login form. Keep waiting.
    AwaitingLogin,
    /// No token and we reached the landing page, or navigation failed.
    Failed(String),
}

/// Client for the hosted login flow
pub struct AuthSession {
    client: Client,
    dashboard_url: String,
}

impl AuthSession {
    /// Create a new session against the production dashboard
    pub fn new() -> Result<Self> {
        Self::new_with_dashboard_url(DASHBOARD_URL)
    }

    /// Create a session against a custom dashboard URL (for testing)
    #[doc(hidden)]
    pub fn new_with_dashboard_url(dashboard_url: &str) -> Result<Self> {
        let cookie_jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(cookie_jar)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(Fit3dError::Http)?;

        Ok(Self {
            client,
            dashboard_url: dashboard_url.trim_end_matches('/').to_string(),
        })
    }

    /// Perform the full login flow and capture a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionToken> {
        // Step 1: load the dashboard. An existing session cookie may land us
        // straight on the landing page with a token already present.
        let (url, html) = self.load(&self.dashboard_url).await?;

        match probe_page(&self.dashboard_url, &url, &html) {
            ProbeOutcome::TokenFound(token) => return Ok(SessionToken::new(token)),
            ProbeOutcome::Failed(message) => return Err(Fit3dError::auth(message)),
            ProbeOutcome::AwaitingLogin => {}
        }

        // Step 2: we are on the login form. Submit credentials.
        let csrf_token = extract_csrf_token(&html)?;
        let (url, html) = self.submit_login(email, password, &csrf_token).await?;

        // Step 3: probe whatever page the login landed us on.
        match probe_page(&self.dashboard_url, &url, &html) {
            ProbeOutcome::TokenFound(token) => Ok(SessionToken::new(token)),
            ProbeOutcome::AwaitingLogin => {
                Err(Fit3dError::auth("Login not accepted"))
            }
            ProbeOutcome::Failed(message) => Err(Fit3dError::auth(message)),
        }
    }

    /// Load a page and return its final URL and body
    async fn load(&self, url: &str) -> Result<(String, String)> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, DASHBOARD_USER_AGENT)
            .send()
            .await
            .map_err(Fit3dError::Http)?;

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(Fit3dError::Http)?;
        Ok((final_url, html))
    }

    /// Submit the login form, following the redirect to the landing page
    async fn submit_login(
        &self,
        email: &str,
        password: &str,
        csrf_token: &str,
    ) -> Result<(String, String)> {
        let login_url = format!("{}/login", self.dashboard_url);
        let form = [
            ("email", email),
            ("password", password),
            ("_csrf", csrf_token),
        ];

        let response = self
            .client
            .post(&login_url)
            .header(USER_AGENT, DASHBOARD_USER_AGENT)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .form(&form)
            .send()
            .await
            .map_err(Fit3dError::Http)?;

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(Fit3dError::Http)?;
        Ok((final_url, html))
    }
}

/// Decide what one loaded page means for the capture flow.
///
/// A token buried in the page wins outright. Otherwise a page that still
/// shows the login form means "keep waiting", and reaching the landing page
/// without a token means the capture failed.
pub fn probe_page(dashboard_url: &str, page_url: &str, html: &str) -> ProbeOutcome {
    if let Some(token) = extract_token(html) {
        return ProbeOutcome::TokenFound(token);
    }

    if is_login_page(html) || page_url.trim_end_matches('/') != dashboard_url.trim_end_matches('/')
    {
        return ProbeOutcome::AwaitingLogin;
    }

    ProbeOutcome::Failed("No token found".to_string())
}

/// Extract the session token the dashboard seeds into page storage.
fn extract_token(html: &str) -> Option<String> {
    // Inline bootstrap script: localStorage.setItem("token", "...")
    let setitem = Regex::new(
        r#"localStorage\.setItem\(\s*['"]token['"]\s*,\s*['"]([^'"]+)['"]\s*\)"#,
    )
    .expect("invalid token regex");
    if let Some(captures) = setitem.captures(html) {
        return Some(captures[1].to_string());
    }

    // Bootstrap state blob: "token":"..."
    let state = Regex::new(r#""token"\s*:\s*"([^"]+)""#).expect("invalid token regex");
    state.captures(html).map(|captures| captures[1].to_string())
}

/// The login form is recognizable by its password field.
fn is_login_page(html: &str) -> bool {
    html.contains("type=\"password\"") || html.contains("type='password'")
}

/// Extract the CSRF token from the login form
fn extract_csrf_token(html: &str) -> Result<String> {
    let re = Regex::new(r#"name="_csrf"[^>]*value="([^"]+)""#).expect("invalid csrf regex");
    re.captures(html)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| Fit3dError::auth("Could not find CSRF token on login page"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASHBOARD: &str = "https://dashboard.fit3d.com";

    #[test]
    fn test_probe_finds_setitem_token() {
        let html = r#"<script>localStorage.setItem("token", "tok_abc123");</script>"#;
        let outcome = probe_page(DASHBOARD, DASHBOARD, html);
        assert_eq!(outcome, ProbeOutcome::TokenFound("tok_abc123".to_string()));
    }

    #[test]
    fn test_probe_finds_bootstrap_token() {
        let html = r#"<script>window.__STATE__ = {"token":"tok_xyz"};</script>"#;
        let outcome = probe_page(DASHBOARD, DASHBOARD, html);
        assert_eq!(outcome, ProbeOutcome::TokenFound("tok_xyz".to_string()));
    }

    #[test]
    fn test_probe_waits_on_login_form() {
        let html = r#"<form><input type="password" name="password"></form>"#;
        let outcome = probe_page(DASHBOARD, DASHBOARD, html);
        assert_eq!(outcome, ProbeOutcome::AwaitingLogin);
    }

    #[test]
    fn test_probe_waits_off_dashboard() {
        let outcome = probe_page(DASHBOARD, "https://sso.fit3d.com/start", "<html></html>");
        assert_eq!(outcome, ProbeOutcome::AwaitingLogin);
    }

    #[test]
    fn test_probe_fails_on_landing_page_without_token() {
        let outcome = probe_page(DASHBOARD, DASHBOARD, "<html><body>Welcome</body></html>");
        assert_eq!(
            outcome,
            ProbeOutcome::Failed("No token found".to_string())
        );
    }

    #[test]
    fn test_trailing_slash_still_counts_as_landing_page() {
        let outcome = probe_page(DASHBOARD, "https://dashboard.fit3d.com/", "<html></html>");
        assert!(matches!(outcome, ProbeOutcome::Failed(_)));
    }

    #[test]
    fn test_extract_csrf_token() {
        let html = r#"<input type="hidden" name="_csrf" value="csrf-token-value">"#;
        assert_eq!(extract_csrf_token(html).unwrap(), "csrf-token-value");
    }

    #[test]
    fn test_extract_csrf_token_missing() {
        assert!(extract_csrf_token("<html></html>").is_err());
    }
}
