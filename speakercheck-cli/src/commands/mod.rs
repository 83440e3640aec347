pub mod auth;
pub mod pages;
pub mod speakers;

use anyhow::{anyhow, Context};
use dialoguer::Confirm;

use speakercheck_cli::client::ClientError;
use speakercheck_cli::{ApiClient, TokenStore};

/// Everything a command needs: the API client, token storage and prompt policy.
pub struct Session {
    pub client: ApiClient,
    pub tokens: TokenStore,
    assume_yes: bool,
}

impl Session {
    pub fn new(client: ApiClient, tokens: TokenStore, assume_yes: bool) -> Self {
        Self {
            client,
            tokens,
            assume_yes,
        }
    }

    /// Ask a yes/no question, defaulting to no. `--yes` answers for the user.
    pub fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Collapse a client error into the single line shown to the user.
pub trait OrFallback<T> {
    fn or_fallback(self, fallback: &str) -> anyhow::Result<T>;
}

impl<T> OrFallback<T> for Result<T, ClientError> {
    fn or_fallback(self, fallback: &str) -> anyhow::Result<T> {
        self.map_err(|err| {
            tracing::debug!(error = ?err, "api call failed");
            anyhow!(err.user_message(fallback))
        })
    }
}
