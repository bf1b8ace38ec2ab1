//! HTTP client for the relationship API

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, RoostError};

use super::{ListKind, RawProfile, RelationshipApi, UserPage};

/// Used when a 429 carries no usable Retry-After header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Bearer-token client for the relationship API
pub struct HttpRelationshipApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRelationshipApi {
    /// Create a client; `timeout` bounds both connecting and receiving
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("roost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/v1/users{}", self.base_url, endpoint)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(RoostError::Unauthenticated)?;
        Ok(request.header("Authorization", format!("Bearer {token}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.authorized(self.client.get(url))?.send().await?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| RoostError::Remote {
            status_code: None,
            message: format!("Failed to parse response from {url}: {e}"),
        })
    }

    async fn list_page(
        &self,
        kind: ListKind,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<UserPage> {
        let mut url = self.api_url(&format!("/me/{}?limit={limit}", kind.path()));
        if let Some(cursor) = cursor {
            url.push_str("&cursor=");
            url.push_str(&urlencoding::encode(cursor));
        }
        self.get_json(&url).await
    }
}

impl RelationshipApi for HttpRelationshipApi {
    fn has_credentials(&self) -> bool {
        self.token.is_some()
    }

    async fn followers_page(&self, cursor: Option<&str>, limit: usize) -> Result<UserPage> {
        self.list_page(ListKind::Followers, cursor, limit).await
    }

    async fn following_page(&self, cursor: Option<&str>, limit: usize) -> Result<UserPage> {
        self.list_page(ListKind::Following, cursor, limit).await
    }

    async fn profile(&self) -> Result<RawProfile> {
        self.get_json(&self.api_url("/me")).await
    }

    async fn remove_follower(&self, user_id: &str) -> Result<()> {
        let url = self.api_url(&format!("/me/followers/{}", urlencoding::encode(user_id)));
        let response = self.authorized(self.client.delete(&url))?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn block_user(&self, user_id: &str) -> Result<()> {
        #[derive(Serialize)]
        struct BlockRequest<'a> {
            user_id: &'a str,
        }

        let url = self.api_url("/me/blocks");
        let response = self
            .authorized(self.client.post(&url))?
            .json(&BlockRequest { user_id })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Map non-success statuses onto the error taxonomy
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs);
            Err(RoostError::RateLimitExceeded { retry_after })
        }
        StatusCode::FORBIDDEN => Err(RoostError::InsufficientPermission),
        StatusCode::UNAUTHORIZED => Err(RoostError::Unauthenticated),
        _ => {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.chars().take(300).collect()
            };
            Err(RoostError::Remote {
                status_code: Some(status.as_u16()),
                message,
            })
        }
    }
}
