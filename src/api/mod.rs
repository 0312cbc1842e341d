//! Wire types and HTTP client for the remote post storage service.

mod client;
mod models;

pub use client::{ApiError, PostStoreClient};
pub use models::{NewPost, Post, PostPage, PostPatch};
