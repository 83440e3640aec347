use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use speakercheck_data::{
    AuthResponse, AvailabilityRequest, Credentials, NewPage, NewSpeaker, Page, PageUpdate,
    Speaker, SpeakerUpdate, User,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed with status {status}")]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Not logged in. Run `speakercheck login` first")]
    NotLoggedIn,

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// The text to show a user: the server's message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::NotLoggedIn => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            ClientError::NotLoggedIn => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Typed wrapper over the REST endpoints mounted under `api_url`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        if self.token.is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        Ok(self.request(method, path))
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<MessageBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        tracing::debug!(%status, ?message, "request rejected");
        Err(ClientError::Api { status, message })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        Ok(Self::send(builder).await?.json().await?)
    }

    async fn send_message(builder: RequestBuilder) -> Result<String> {
        let body: MessageBody = Self::send_json(builder).await?;
        Ok(body.message.unwrap_or_default())
    }

    pub async fn health(&self) -> Result<()> {
        Self::send(self.request(Method::GET, "/health")).await?;
        Ok(())
    }

    // Auth

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = credentials(username, password);
        Self::send_json(self.request(Method::POST, "/auth/login").json(&body)).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = credentials(username, password);
        Self::send_json(self.request(Method::POST, "/auth/register").json(&body)).await
    }

    pub async fn me(&self) -> Result<User> {
        Self::send_json(self.authed(Method::GET, "/auth/me")?).await
    }

    pub async fn logout(&self) -> Result<()> {
        Self::send(self.authed(Method::POST, "/auth/logout")?).await?;
        Ok(())
    }

    // Pages

    pub async fn list_pages(&self) -> Result<Vec<Page>> {
        Self::send_json(self.authed(Method::GET, "/pages")?).await
    }

    pub async fn create_page(&self, page: &NewPage) -> Result<Page> {
        Self::send_json(self.authed(Method::POST, "/pages")?.json(page)).await
    }

    pub async fn update_page(&self, id: &str, update: &PageUpdate) -> Result<Page> {
        let path = format!("/pages/{}", id);
        Self::send_json(self.authed(Method::PUT, &path)?.json(update)).await
    }

    pub async fn delete_page(&self, id: &str) -> Result<String> {
        let path = format!("/pages/{}", id);
        Self::send_message(self.authed(Method::DELETE, &path)?).await
    }

    // Speakers

    pub async fn list_speakers(&self, page_id: Option<&str>) -> Result<Vec<Speaker>> {
        let mut builder = self.authed(Method::GET, "/speakers")?;
        if let Some(page_id) = page_id {
            builder = builder.query(&[("pageId", page_id)]);
        }
        Self::send_json(builder).await
    }

    pub async fn get_speaker(&self, id: &str) -> Result<Speaker> {
        let path = format!("/speakers/{}", id);
        Self::send_json(self.authed(Method::GET, &path)?).await
    }

    pub async fn create_speaker(&self, speaker: &NewSpeaker) -> Result<Speaker> {
        Self::send_json(self.authed(Method::POST, "/speakers")?.json(speaker)).await
    }

    pub async fn update_speaker(&self, id: &str, update: &SpeakerUpdate) -> Result<Speaker> {
        let path = format!("/speakers/{}", id);
        Self::send_json(self.authed(Method::PUT, &path)?.json(update)).await
    }

    pub async fn update_availability(
        &self,
        id: &str,
        request: &AvailabilityRequest,
    ) -> Result<Speaker> {
        let path = format!("/speakers/{}/availability", id);
        Self::send_json(self.authed(Method::PATCH, &path)?.json(request)).await
    }

    pub async fn delete_speaker(&self, id: &str) -> Result<String> {
        let path = format!("/speakers/{}", id);
        Self::send_message(self.authed(Method::DELETE, &path)?).await
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
    }
}
