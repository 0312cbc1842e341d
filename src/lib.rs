//! CodeLeap Network feed client library.
//!
//! A headless client for the CodeLeap Network social feed: posts are created,
//! edited and deleted through a remote REST service, while likes, comments
//! and dialog state live only in the local session. The
//! [`feed::FeedController`] owns the mutate-then-refetch workflow; the binary
//! wraps it in an interactive command loop.

pub mod api;
pub mod config;
pub mod feed;
pub mod session;
pub mod timefmt;
