use chrono::{DateTime, Utc};

use crate::api::Post;
use crate::timefmt;

/// A session-local comment. Never sent to the post storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub username: String,
    pub content: String,
}

/// Per-post presentation state: the ownership gate, the like counter, and
/// the inline comment list with its composer.
///
/// Likes and comments are decorative relative to the server model; they live
/// only as long as the card does. Across a feed refresh the controller keys
/// cards by post id, so a surviving id keeps this state and a new id starts
/// fresh.
#[derive(Debug, Clone)]
pub struct PostCard {
    post: Post,
    session_username: String,
    likes: u32,
    comments: Vec<Comment>,
    /// Comment draft; `None` while the composer is closed.
    draft: Option<String>,
}

impl PostCard {
    #[must_use]
    pub fn new(post: Post, session_username: impl Into<String>) -> Self {
        Self {
            post,
            session_username: session_username.into(),
            likes: 0,
            comments: Vec::new(),
            draft: None,
        }
    }

    #[must_use]
    pub fn post(&self) -> &Post {
        &self.post
    }

    /// Replace the post snapshot after a refresh, keeping engagement state.
    pub(crate) fn adopt(&mut self, post: Post) {
        self.post = post;
    }

    /// Whether edit/delete controls are exposed for this card.
    #[must_use]
    pub fn can_modify(&self) -> bool {
        self.post.is_owned_by(&self.session_username)
    }

    /// Relative-age label for the post. Posts that never round-tripped (or
    /// carry an unparseable timestamp) read "Just now".
    #[must_use]
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        self.post
            .created_datetime
            .as_deref()
            .and_then(timefmt::parse_timestamp)
            .map_or_else(|| "Just now".to_string(), |t| timefmt::format_age(t, now))
    }

    /// Monotonic like counter. No decrement, no persistence.
    pub fn like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }

    #[must_use]
    pub fn likes(&self) -> u32 {
        self.likes
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn is_composing(&self) -> bool {
        self.draft.is_some()
    }

    /// Open the composer, or close it if already open (the toggle on the
    /// card's comment button).
    pub fn toggle_composer(&mut self) {
        if self.draft.is_some() {
            self.draft = None;
        } else {
            self.draft = Some(String::new());
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = Some(text.into());
    }

    /// Discard the draft and close the composer.
    pub fn cancel_comment(&mut self) {
        self.draft = None;
    }

    /// Append the draft as a comment and close the composer. A draft that is
    /// empty after trimming is rejected and the composer stays open. The
    /// comment is attributed to the session name, or "Anonymous" when that
    /// name is empty.
    ///
    /// Returns whether a comment was added.
    pub fn submit_comment(&mut self) -> bool {
        let Some(draft) = self.draft.as_deref() else {
            return false;
        };
        if draft.trim().is_empty() {
            return false;
        }
        let username = if self.session_username.is_empty() {
            "Anonymous".to_string()
        } else {
            self.session_username.clone()
        };
        self.comments.push(Comment {
            username,
            content: draft.to_string(),
        });
        self.draft = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(username: &str, created: Option<&str>) -> Post {
        Post {
            id: Some(1),
            username: username.to_string(),
            title: "T".to_string(),
            content: "C".to_string(),
            created_datetime: created.map(ToString::to_string),
        }
    }

    #[test]
    fn test_ownership_gates_controls() {
        assert!(PostCard::new(post("alice", None), "alice").can_modify());
        assert!(!PostCard::new(post("bob", None), "alice").can_modify());
    }

    #[test]
    fn test_age_label_fallbacks() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap();
        let card = PostCard::new(post("alice", Some("2024-01-01T12:30:00Z")), "alice");
        assert_eq!(card.age_label(now), "30 minutes ago");

        let fresh = PostCard::new(post("alice", None), "alice");
        assert_eq!(fresh.age_label(now), "Just now");

        let garbled = PostCard::new(post("alice", Some("not-a-timestamp")), "alice");
        assert_eq!(garbled.age_label(now), "Just now");
    }

    #[test]
    fn test_likes_are_monotonic() {
        let mut card = PostCard::new(post("alice", None), "alice");
        assert_eq!(card.likes(), 0);
        card.like();
        card.like();
        assert_eq!(card.likes(), 2);
    }

    #[test]
    fn test_comment_submission() {
        let mut card = PostCard::new(post("bob", None), "alice");
        assert!(!card.submit_comment(), "composer closed");

        card.toggle_composer();
        assert!(card.is_composing());
        assert!(!card.submit_comment(), "empty draft");
        assert!(card.is_composing(), "composer stays open on rejection");

        card.set_draft("  \t ");
        assert!(!card.submit_comment(), "whitespace-only draft");

        card.set_draft("nice post");
        assert!(card.submit_comment());
        assert!(!card.is_composing());
        assert_eq!(
            card.comments(),
            &[Comment {
                username: "alice".to_string(),
                content: "nice post".to_string()
            }]
        );
    }

    #[test]
    fn test_anonymous_comment_attribution() {
        let mut card = PostCard::new(post("bob", None), "");
        card.set_draft("hello");
        assert!(card.submit_comment());
        assert_eq!(card.comments()[0].username, "Anonymous");
    }

    #[test]
    fn test_toggle_discards_draft() {
        let mut card = PostCard::new(post("bob", None), "alice");
        card.toggle_composer();
        card.set_draft("half-written");
        card.toggle_composer();
        assert!(!card.is_composing());
        card.toggle_composer();
        assert!(!card.submit_comment(), "draft did not survive the toggle");
    }
}
