use serde::{Deserialize, Serialize};

/// A feed post as stored by the remote service.
///
/// `id` and `created_datetime` are assigned by the server; both are `None`
/// on a post that has never round-tripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_datetime: Option<String>,
}

impl Post {
    /// Whether the given session username owns this post.
    ///
    /// Client-side gate only; the server is assumed to authorize mutations
    /// independently.
    #[must_use]
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.username == username
    }
}

/// Request body for creating a post. The server assigns `id` and
/// `created_datetime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub username: String,
    pub title: String,
    pub content: String,
}

/// Request body for updating a post. Username and id are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: String,
    pub content: String,
}

/// One page of posts as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<Post>,
}
