use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::api::models::{NewPost, Post, PostPage, PostPatch};

/// Failure of one remote operation. The message wraps the underlying
/// transport or decoding error with an operation-specific prefix.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to fetch posts: {0}")]
    List(#[source] reqwest::Error),
    #[error("Failed to create post: {0}")]
    Create(#[source] reqwest::Error),
    #[error("Failed to delete post: {0}")]
    Delete(#[source] reqwest::Error),
    #[error("Failed to update post: {0}")]
    Update(#[source] reqwest::Error),
}

/// Client for the remote post storage service.
///
/// Each operation issues exactly one call and is all-or-nothing: no retries,
/// no partial-failure handling. Non-success statuses are failures.
#[derive(Debug, Clone)]
pub struct PostStoreClient {
    client: Client,
    base_url: Url,
}

impl PostStoreClient {
    /// Create a client for the service at `base_url` (must end with `/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, url::ParseError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Fetch the full post list, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::List`] on any transport or decoding failure.
    pub async fn list(&self) -> Result<PostPage, ApiError> {
        debug!(url = %self.base_url, "Fetching posts");
        let page = self
            .client
            .get(self.base_url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(ApiError::List)?
            .json::<PostPage>()
            .await
            .map_err(ApiError::List)?;
        debug!(count = page.results.len(), "Fetched posts");
        Ok(page)
    }

    /// Create a post. The server assigns `id` and `created_datetime`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Create`] on any transport or decoding failure.
    pub async fn create(&self, post: &NewPost) -> Result<Post, ApiError> {
        debug!(username = %post.username, title = %post.title, "Creating post");
        self.client
            .post(self.base_url.clone())
            .json(post)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(ApiError::Create)?
            .json()
            .await
            .map_err(ApiError::Create)
    }

    /// Delete the post with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Delete`] on any transport failure.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        debug!(id, "Deleting post");
        self.client
            .delete(self.item_url(id))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(ApiError::Delete)?;
        Ok(())
    }

    /// Update title and content of the post with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Update`] on any transport or decoding failure.
    pub async fn update(&self, id: i64, patch: &PostPatch) -> Result<Post, ApiError> {
        debug!(id, "Updating post");
        self.client
            .patch(self.item_url(id))
            .json(patch)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(ApiError::Update)?
            .json()
            .await
            .map_err(ApiError::Update)
    }

    fn item_url(&self, id: i64) -> Url {
        // The base URL is validated to end with '/' so the join keeps its path.
        self.base_url
            .join(&format!("{id}/"))
            .expect("item path is always a valid URL segment")
    }
}
