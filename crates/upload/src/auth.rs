//! Bearer credential acquisition.

use async_trait::async_trait;
use deck_core::{Error, Result};
use tokio::process::Command;

/// Default command used to mint an access token.
pub const DEFAULT_TOKEN_COMMAND: &str = "gcloud auth print-access-token";

/// Source of the bearer token for Slides API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain an access token.
    ///
    /// Failures carry the provider's own message as [`Error::AuthError`].
    async fn access_token(&self) -> Result<String>;
}

/// A token obtained elsewhere and passed in as-is.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(Error::AuthError("The access token is empty".to_string()));
        }
        Ok(token.to_string())
    }
}

/// Delegates the grant to an external command and reads the token from its stdout.
///
/// On a non-zero exit its stderr becomes the error message, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandToken {
    program: String,
    args: Vec<String>,
}

impl CommandToken {
    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        Self::split(command_line)
            .ok_or_else(|| Error::AuthError("No token command configured".to_string()))
    }

    fn split(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Default for CommandToken {
    /// Runs [`DEFAULT_TOKEN_COMMAND`].
    fn default() -> Self {
        Self::split(DEFAULT_TOKEN_COMMAND).unwrap_or_else(|| Self {
            program: DEFAULT_TOKEN_COMMAND.to_string(),
            args: Vec::new(),
        })
    }
}

#[async_trait]
impl TokenProvider for CommandToken {
    async fn access_token(&self) -> Result<String> {
        log::debug!("Requesting access token via {}", self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| Error::AuthError(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(Error::AuthError(message));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(Error::AuthError(format!(
                "{} printed no access token",
                self.program
            )));
        }

        Ok(token)
    }
}
