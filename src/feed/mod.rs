//! Feed state: the post list, dialogs, and per-post presentation state.

mod card;
mod controller;
mod dialog;

pub use card::{Comment, PostCard};
pub use controller::{FeedController, FeedError};
pub use dialog::{DeleteDialog, EditDialog, EditForm};
