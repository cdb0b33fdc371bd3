//! Configuration loaded from the environment (and `.env`, if present).

use std::env;
use std::fmt;

use deck_upload::api::DEFAULT_API_BASE;
use deck_upload::auth::DEFAULT_TOKEN_COMMAND;

/// OAuth client metadata supplied by the user's Google Cloud project.
///
/// Only reported back to the user; never validated here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OAuthClient {
    pub client_id: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub project_number: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub oauth: OAuthClient,
    /// Secret issued with a desktop OAuth client.
    pub client_secret: Option<String>,
    /// Ready-made bearer token; skips the token command when set.
    pub access_token: Option<String>,
    /// Command printing an access token on stdout.
    pub token_command: String,
    pub api_base: String,
}

/// Where the Slides access token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A ready-made bearer token.
    Token(String),
    /// Interactive Google sign-in with the configured OAuth client.
    SignIn {
        client_id: String,
        client_secret: Option<String>,
    },
    /// An external command printing a token.
    Command(String),
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Pick the credential source: an explicit token wins, then sign-in
    /// with `CLIENT_ID`, then the token command.
    pub fn credentials(&self, token_override: Option<String>) -> Credentials {
        let token = token_override
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.access_token.clone());
        if let Some(token) = token {
            return Credentials::Token(token);
        }

        match &self.oauth.client_id {
            Some(client_id) => Credentials::SignIn {
                client_id: client_id.clone(),
                client_secret: self.client_secret.clone(),
            },
            None => Credentials::Command(self.token_command.clone()),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Config {
            oauth: OAuthClient {
                client_id: get("CLIENT_ID"),
                project_name: get("PROJECT_NAME"),
                project_id: get("PROJECT_ID"),
                project_number: get("PROJECT_NUMBER"),
            },
            client_secret: get("CLIENT_SECRET"),
            access_token: get("GOOGLE_ACCESS_TOKEN"),
            token_command: get("DECK2SLIDES_TOKEN_COMMAND")
                .unwrap_or_else(|| DEFAULT_TOKEN_COMMAND.to_string()),
            api_base: get("SLIDES_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("oauth", &self.oauth)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("token_command", &self.token_command)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.oauth, OAuthClient::default());
        assert!(config.access_token.is_none());
        assert_eq!(config.token_command, DEFAULT_TOKEN_COMMAND);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_reads_values() {
        let config = config(&[
            ("CLIENT_ID", "123.apps.googleusercontent.com"),
            ("PROJECT_ID", "my-project"),
            ("GOOGLE_ACCESS_TOKEN", "ya29.secret"),
            ("SLIDES_API_BASE", "http://localhost:9000/v1"),
        ]);
        assert_eq!(
            config.oauth.client_id.as_deref(),
            Some("123.apps.googleusercontent.com")
        );
        assert_eq!(config.oauth.project_id.as_deref(), Some("my-project"));
        assert_eq!(config.access_token.as_deref(), Some("ya29.secret"));
        assert_eq!(config.api_base, "http://localhost:9000/v1");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config(&[("GOOGLE_ACCESS_TOKEN", "  "), ("CLIENT_ID", "")]);
        assert!(config.access_token.is_none());
        assert!(config.oauth.client_id.is_none());
    }

    #[test]
    fn test_credentials_precedence() {
        let signed_in = config(&[("CLIENT_ID", "123.apps"), ("CLIENT_SECRET", "s")]);
        assert_eq!(
            signed_in.credentials(None),
            Credentials::SignIn {
                client_id: "123.apps".to_string(),
                client_secret: Some("s".to_string()),
            }
        );
        assert_eq!(
            signed_in.credentials(Some("ya29.flag".to_string())),
            Credentials::Token("ya29.flag".to_string())
        );

        let with_token = config(&[
            ("CLIENT_ID", "123.apps"),
            ("GOOGLE_ACCESS_TOKEN", "ya29.env"),
        ]);
        assert_eq!(
            with_token.credentials(Some(" ".to_string())),
            Credentials::Token("ya29.env".to_string())
        );

        assert_eq!(
            config(&[]).credentials(None),
            Credentials::Command(DEFAULT_TOKEN_COMMAND.to_string())
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = config(&[
            ("GOOGLE_ACCESS_TOKEN", "ya29.secret"),
            ("CLIENT_SECRET", "GOCSPX-shh"),
        ]);
        assert_eq!(config.client_secret.as_deref(), Some("GOCSPX-shh"));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ya29.secret"));
        assert!(!debug.contains("GOCSPX-shh"));
    }
}
