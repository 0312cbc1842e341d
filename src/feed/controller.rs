use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{ApiError, NewPost, Post, PostPatch, PostStoreClient};
use crate::feed::card::PostCard;
use crate::feed::dialog::{DeleteDialog, EditDialog, EditForm};
use crate::session::Session;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("title and content are required")]
    EmptyFields,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("feed controller is shut down")]
    TornDown,
}

/// Owner of all mutable feed state: the materialized post list, the two
/// dialogs, the keyed card list, and the clock used for age labels.
///
/// Consistency policy is full refetch reconciliation: every successful
/// mutation is followed by one `list` call whose result replaces the local
/// list wholesale. Within one operation the mutation completes (or fails)
/// before the refresh begins; no operation issues parallel calls. Remote
/// failures raise a transient banner and leave the current list untouched.
///
/// Every remote await races the cancellation token, so once the token is
/// cancelled no in-flight response can land on torn-down state.
pub struct FeedController {
    store: PostStoreClient,
    session: Session,
    shutdown: CancellationToken,
    posts: Vec<Post>,
    cards: Vec<PostCard>,
    loaded: bool,
    delete_dialog: DeleteDialog,
    edit_dialog: EditDialog,
    current_time: DateTime<Utc>,
    banner: Option<String>,
}

impl FeedController {
    #[must_use]
    pub fn new(store: PostStoreClient, session: Session, shutdown: CancellationToken) -> Self {
        Self {
            store,
            session,
            shutdown,
            posts: Vec::new(),
            cards: Vec::new(),
            loaded: false,
            delete_dialog: DeleteDialog::Closed,
            edit_dialog: EditDialog::Closed,
            current_time: Utc::now(),
            banner: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The post list as last returned by the server, in server order.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn cards(&self) -> &[PostCard] {
        &self.cards
    }

    /// Card for the post with the given server id, for likes and comments.
    pub fn card_mut(&mut self, id: i64) -> Option<&mut PostCard> {
        self.cards.iter_mut().find(|c| c.post().id == Some(id))
    }

    /// False until the first list call has resolved successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The transient error banner, if a remote operation failed.
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    #[must_use]
    pub fn current_time(&self) -> DateTime<Utc> {
        self.current_time
    }

    /// Advance the clock used by age labels. Never triggers a refetch.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.current_time = now;
    }

    /// Initial load. A failure leaves the list empty, the state `Loading`,
    /// and the banner raised.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure, or [`FeedError::TornDown`] after shutdown.
    pub async fn load(&mut self) -> Result<(), FeedError> {
        self.refresh().await
    }

    /// Compose-form submission: create the post as the session user, then
    /// refetch. The caller's draft should be reset only on success.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EmptyFields`] without any remote call when either
    /// field is empty after trimming, otherwise any remote failure.
    pub async fn submit_new_post(&mut self, title: &str, content: &str) -> Result<(), FeedError> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(FeedError::EmptyFields);
        }
        let new_post = NewPost {
            username: self.session.username.clone(),
            title: title.to_string(),
            content: content.to_string(),
        };
        let result = self.guarded(self.store.create(&new_post)).await;
        let created = match result {
            Ok(post) => post,
            Err(e) => return Err(self.raise(e)),
        };
        info!(id = ?created.id, "Created post");
        self.refresh().await
    }

    /// Open the delete confirmation for the given post id. `None` models a
    /// post that never received a server id; confirming it closes silently.
    pub fn request_delete(&mut self, id: Option<i64>) {
        debug!(id = ?id, "Delete requested");
        self.delete_dialog = DeleteDialog::Open(id);
    }

    #[must_use]
    pub fn delete_dialog(&self) -> &DeleteDialog {
        &self.delete_dialog
    }

    /// Close the delete confirmation without any remote call. Backdrop click
    /// maps here too. No-op when nothing is pending.
    pub fn cancel_delete(&mut self) {
        self.delete_dialog = DeleteDialog::Closed;
    }

    /// Confirm the pending delete: one `delete` call, then one `list` call,
    /// strictly in that order. With no pending id this closes silently.
    ///
    /// # Errors
    ///
    /// Returns any remote failure; the selection is cleared either way.
    pub async fn confirm_delete(&mut self) -> Result<(), FeedError> {
        match std::mem::take(&mut self.delete_dialog) {
            DeleteDialog::Closed | DeleteDialog::Open(None) => Ok(()),
            DeleteDialog::Open(Some(id)) => {
                let result = self.guarded(self.store.delete(id)).await;
                if let Err(e) = result {
                    return Err(self.raise(e));
                }
                info!(id, "Deleted post");
                self.refresh().await
            }
        }
    }

    /// Open the edit dialog pre-filled from the given post snapshot.
    pub fn request_edit(&mut self, post: Post) {
        debug!(id = ?post.id, "Edit requested");
        self.edit_dialog = EditDialog::Open(EditForm::new(post));
    }

    #[must_use]
    pub fn edit_dialog(&self) -> &EditDialog {
        &self.edit_dialog
    }

    /// The open edit form, for title/content input.
    pub fn edit_form_mut(&mut self) -> Option<&mut EditForm> {
        self.edit_dialog.form_mut()
    }

    /// Close the edit dialog, discarding any edits. Backdrop click maps here,
    /// mirroring the delete dialog. No-op when nothing is pending.
    pub fn cancel_edit(&mut self) {
        self.edit_dialog = EditDialog::Closed;
    }

    /// Confirm the pending edit: one `update` call, then one `list` call. A
    /// pending post without a server id skips the remote call but still
    /// closes the dialog and clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EmptyFields`] with the dialog left open when the
    /// form cannot be saved, otherwise any remote failure.
    pub async fn confirm_edit(&mut self) -> Result<(), FeedError> {
        let EditDialog::Open(form) = std::mem::take(&mut self.edit_dialog) else {
            return Ok(());
        };
        if !form.can_save() {
            // Save stays unavailable; keep the dialog open with the edits.
            self.edit_dialog = EditDialog::Open(form);
            return Err(FeedError::EmptyFields);
        }
        let Some(id) = form.post().id else {
            debug!("Edit confirmed on a post without a server id; closing");
            return Ok(());
        };
        let patch = PostPatch {
            title: form.title().to_string(),
            content: form.content().to_string(),
        };
        let result = self.guarded(self.store.update(id, &patch)).await;
        if let Err(e) = result {
            return Err(self.raise(e));
        }
        info!(id, "Updated post");
        self.refresh().await
    }

    /// Replace the local list with the server's, reconciling cards by id so
    /// a surviving post keeps its likes and comments.
    async fn refresh(&mut self) -> Result<(), FeedError> {
        let result = self.guarded(self.store.list()).await;
        let page = match result {
            Ok(page) => page,
            Err(e) => return Err(self.raise(e)),
        };
        self.adopt_posts(page.results);
        self.banner = None;
        Ok(())
    }

    fn adopt_posts(&mut self, posts: Vec<Post>) {
        let mut kept: HashMap<i64, PostCard> = self
            .cards
            .drain(..)
            .filter_map(|card| card.post().id.map(|id| (id, card)))
            .collect();
        self.cards = posts
            .iter()
            .map(|post| {
                post.id.and_then(|id| kept.remove(&id)).map_or_else(
                    || PostCard::new(post.clone(), self.session.username.clone()),
                    |mut card| {
                        card.adopt(post.clone());
                        card
                    },
                )
            })
            .collect();
        self.posts = posts;
        self.loaded = true;
        debug!(count = self.posts.len(), "Feed state replaced");
    }

    /// Race a remote call against shutdown, so a torn-down controller never
    /// sees the response.
    async fn guarded<T>(
        &self,
        call: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, FeedError> {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(FeedError::TornDown),
            result = call => Ok(result?),
        }
    }

    fn raise(&mut self, err: FeedError) -> FeedError {
        if let FeedError::Api(api) = &err {
            self.banner = Some(api.to_string());
        }
        err
    }
}
