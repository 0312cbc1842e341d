use crate::api::Post;

/// Delete confirmation dialog.
///
/// `Open(None)` is the defined case of a card whose post never received a
/// server id; confirming it closes the dialog without a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteDialog {
    #[default]
    Closed,
    Open(Option<i64>),
}

impl DeleteDialog {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Edit dialog. The open variant carries the form, so an open dialog without
/// a target post cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditDialog {
    #[default]
    Closed,
    Open(EditForm),
}

impl EditDialog {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    #[must_use]
    pub fn form(&self) -> Option<&EditForm> {
        match self {
            Self::Closed => None,
            Self::Open(form) => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut EditForm> {
        match self {
            Self::Closed => None,
            Self::Open(form) => Some(form),
        }
    }
}

/// Editable title/content pre-filled from the target post's snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    post: Post,
    title: String,
    content: String,
}

impl EditForm {
    #[must_use]
    pub fn new(post: Post) -> Self {
        let title = post.title.clone();
        let content = post.content.clone();
        Self {
            post,
            title,
            content,
        }
    }

    /// The snapshot the form was opened on.
    #[must_use]
    pub fn post(&self) -> &Post {
        &self.post
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Save is available only when both fields are non-empty after trimming.
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    /// Revert both fields to the snapshot values, as cancel does.
    pub fn revert(&mut self) {
        self.title = self.post.title.clone();
        self.content = self.post.content.clone();
    }
}
