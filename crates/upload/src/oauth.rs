//! Interactive Google sign-in for installed apps.
//!
//! Opens the consent page in the user's browser, catches the redirect on a
//! loopback listener, and exchanges the authorization code for an access
//! token carrying the Slides scope. Nothing is persisted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use deck_core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use tiny_http::{Response, Server, StatusCode};
use url::Url;
use uuid::Uuid;

use crate::auth::TokenProvider;

/// Scope needed to create and edit presentations.
pub const PRESENTATIONS_SCOPE: &str = "https://www.googleapis.com/auth/presentations";
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How long to wait for the user to finish signing in.
pub const DEFAULT_SIGN_IN_TIMEOUT: Duration = Duration::from_secs(300);

/// Authorization-code grant against the configured OAuth client.
pub struct InstalledAppFlow {
    client_id: String,
    client_secret: Option<String>,
    scope: String,
    auth_uri: String,
    token_uri: String,
    timeout: Duration,
    open_browser: bool,
    http: Client,
}

impl InstalledAppFlow {
    pub fn new(client_id: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into().trim().to_string();
        if client_id.is_empty() {
            return Err(Error::AuthError("No OAuth client ID configured".to_string()));
        }

        let http = Client::builder()
            .build()
            .map_err(|e| Error::HttpError(e.to_string()))?;

        Ok(Self {
            client_id,
            client_secret: None,
            scope: PRESENTATIONS_SCOPE.to_string(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            timeout: DEFAULT_SIGN_IN_TIMEOUT,
            open_browser: true,
            http,
        })
    }

    /// Desktop OAuth clients are issued a secret that the token endpoint expects.
    pub fn with_client_secret(mut self, client_secret: Option<String>) -> Self {
        self.client_secret = client_secret.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_endpoints(mut self, auth_uri: impl Into<String>, token_uri: impl Into<String>) -> Self {
        self.auth_uri = auth_uri.into();
        self.token_uri = token_uri.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only log the consent URL instead of launching a browser.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// Consent page URL for a given redirect and anti-forgery state.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::AuthError(format!("Invalid authorization endpoint: {}", e)))
    }

    fn present(&self, url: &Url) {
        if self.open_browser {
            match webbrowser::open(url.as_str()) {
                Ok(()) => {
                    log::info!("Opened Google sign-in in the browser");
                    return;
                }
                Err(e) => log::debug!("Could not launch a browser: {}", e),
            }
        }
        log::warn!("Open this URL to sign in to Google: {}", url);
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<String> {
        let mut form = vec![
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(&self.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;

        token_from_response(&body)
    }
}

impl std::fmt::Debug for InstalledAppFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledAppFlow")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}

#[async_trait]
impl TokenProvider for InstalledAppFlow {
    async fn access_token(&self) -> Result<String> {
        let server = Server::http("127.0.0.1:0").map_err(|e| {
            Error::AuthError(format!("Failed to start the sign-in listener: {}", e))
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| Error::AuthError("Sign-in listener has no TCP address".to_string()))?;

        let redirect_uri = format!("http://127.0.0.1:{}", port);
        let state = Uuid::new_v4().to_string();
        let url = self.authorization_url(&redirect_uri, &state)?;
        log::debug!("Waiting for the sign-in redirect on {}", redirect_uri);
        self.present(&url);

        let timeout = self.timeout;
        let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state, timeout))
            .await
            .map_err(|e| Error::AuthError(format!("Sign-in listener stopped: {}", e)))??;

        log::debug!("Authorization code received");
        self.exchange(&code, &redirect_uri).await
    }
}

/// Serve the loopback redirect until the authorization response arrives.
fn wait_for_code(server: &Server, state: &str, timeout: Duration) -> Result<String> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::AuthError("Timed out waiting for Google sign-in".to_string()));
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => return Err(Error::AuthError(format!("Sign-in listener failed: {}", e))),
        };

        match callback_result(request.url(), state) {
            None => {
                let _ = request.respond(Response::empty(StatusCode(404)));
            }
            Some(result) => {
                let page = match &result {
                    Ok(_) => "Signed in. You can close this window.",
                    Err(_) => "Sign-in failed. You can close this window.",
                };
                let _ = request.respond(Response::from_string(page));
                return result;
            }
        }
    }
}

/// Interpret a redirect target. `None` for requests that are not the
/// authorization response (a favicon fetch, say).
fn callback_result(target: &str, state: &str) -> Option<Result<String>> {
    let url = Url::parse("http://127.0.0.1/").ok()?.join(target).ok()?;
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if !params.contains_key("code") && !params.contains_key("error") {
        return None;
    }
    if params.get("state").map(String::as_str) != Some(state) {
        return Some(Err(Error::AuthError(
            "Sign-in response did not match this request".to_string(),
        )));
    }
    if let Some(error) = params.get("error") {
        return Some(Err(Error::AuthError(error.clone())));
    }
    params.get("code").cloned().map(Ok)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn token_from_response(body: &str) -> Result<String> {
    let response: TokenResponse = serde_json::from_str(body)?;

    match response.access_token.filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => Err(Error::AuthError(
            response
                .error_description
                .or(response.error)
                .unwrap_or_else(|| "No access token in the sign-in response".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn flow() -> InstalledAppFlow {
        InstalledAppFlow::new("123.apps.googleusercontent.com")
            .unwrap()
            .without_browser()
    }

    fn local_server() -> (Server, u16) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        (server, port)
    }

    fn http() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_blank_client_id_is_rejected() {
        assert!(matches!(InstalledAppFlow::new("  "), Err(Error::AuthError(_))));
    }

    #[test]
    fn test_authorization_url_requests_slides_scope() {
        let url = flow()
            .authorization_url("http://127.0.0.1:4567", "state-1")
            .unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with(GOOGLE_AUTH_URI));
        assert_eq!(params["client_id"], "123.apps.googleusercontent.com");
        assert_eq!(params["scope"], PRESENTATIONS_SCOPE);
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:4567");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "state-1");
    }

    #[test]
    fn test_callback_result() {
        assert!(callback_result("/favicon.ico", "s").is_none());
        assert_eq!(
            callback_result("/?state=s&code=4%2Fabc", "s").unwrap().unwrap(),
            "4/abc"
        );

        let denied = callback_result("/?state=s&error=access_denied", "s").unwrap();
        assert_eq!(denied.unwrap_err().to_string(), "access_denied");

        let forged = callback_result("/?state=other&code=x", "s").unwrap();
        assert!(matches!(forged, Err(Error::AuthError(_))));
    }

    #[test]
    fn test_token_from_response() {
        let token =
            token_from_response(r#"{ "access_token": "ya29.a", "expires_in": 3599 }"#).unwrap();
        assert_eq!(token, "ya29.a");

        let err = token_from_response(
            r#"{ "error": "invalid_client", "error_description": "The OAuth client was not found." }"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "The OAuth client was not found.");
    }

    #[tokio::test]
    async fn test_wait_for_code_skips_unrelated_requests() {
        let (server, port) = local_server();
        let waiter = tokio::task::spawn_blocking(move || {
            wait_for_code(&server, "s1", Duration::from_secs(10))
        });

        let client = http();
        let favicon = client
            .get(format!("http://127.0.0.1:{}/favicon.ico", port))
            .send()
            .await
            .unwrap();
        assert_eq!(favicon.status().as_u16(), 404);

        let page = client
            .get(format!("http://127.0.0.1:{}/?state=s1&code=4%2Fabc", port))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.starts_with("Signed in"));

        assert_eq!(waiter.await.unwrap().unwrap(), "4/abc");
    }

    #[test]
    fn test_wait_for_code_times_out() {
        let (server, _) = local_server();
        let result = wait_for_code(&server, "s1", Duration::from_millis(50));
        assert!(matches!(result, Err(Error::AuthError(_))));
    }

    #[tokio::test]
    async fn test_exchange_sends_client_and_code() {
        let (server, port) = local_server();
        let endpoint = tokio::task::spawn_blocking(move || {
            let mut request = server.recv().unwrap();
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            request
                .respond(Response::from_string(r#"{ "access_token": "ya29.granted" }"#))
                .unwrap();
            body
        });

        let mut flow = flow()
            .with_client_secret(Some("shh".to_string()))
            .with_endpoints(GOOGLE_AUTH_URI, format!("http://127.0.0.1:{}/token", port));
        flow.http = http();

        let token = flow.exchange("4/abc", "http://127.0.0.1:9").await.unwrap();
        assert_eq!(token, "ya29.granted");

        let body = endpoint.await.unwrap();
        assert!(body.contains("code=4%2Fabc"));
        assert!(body.contains("client_id=123.apps.googleusercontent.com"));
        assert!(body.contains("client_secret=shh"));
        assert!(body.contains("grant_type=authorization_code"));
    }
}
