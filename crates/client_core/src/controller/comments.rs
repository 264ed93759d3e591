//! Comment moderation screen: load (optionally by publication title),
//! re-sort locally, edit in place, delete behind a confirmation.

use std::sync::Arc;

use shared::{
    domain::{Comment, CommentId},
    error::ApiError,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use super::{
    view_status, ControllerEvent, ErrorReporter, FetchTicket, Generation, LoadError, Mutation,
    MutationFailure, MutationOutcome, Resource, SilentReporter, ViewStatus,
    EVENT_CHANNEL_CAPACITY,
};
use crate::{
    listing::{normalize_query, sort_comments, unique_publication_titles, SortCriterion},
    ApiResult, BlogApi,
};

/// Edit and delete confirmation are mutually exclusive; at most one comment
/// is ever being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Interaction {
    #[default]
    Idle,
    Editing {
        comment_id: CommentId,
        text: String,
    },
    ConfirmingDelete {
        comment_id: CommentId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CommentState {
    pub comments: Vec<Comment>,
    pub original_comments: Vec<Comment>,
    pub search_title: String,
    pub filter: SortCriterion,
    pub loading: bool,
    pub error: Option<LoadError>,
    pub interaction: Interaction,
    generation: Generation,
}

impl CommentState {
    pub fn status(&self) -> ViewStatus<'_, Comment> {
        view_status(self.loading, self.error.as_ref(), &self.comments)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_ref().map(LoadError::message)
    }

    pub fn editing_id(&self) -> Option<&CommentId> {
        match &self.interaction {
            Interaction::Editing { comment_id, .. } => Some(comment_id),
            _ => None,
        }
    }

    pub fn edit_text(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::Editing { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn pending_delete_id(&self) -> Option<&CommentId> {
        match &self.interaction {
            Interaction::ConfirmingDelete { comment_id } => Some(comment_id),
            _ => None,
        }
    }

    /// Titles offered by the search picker, taken from what is loaded.
    pub fn publication_titles(&self) -> Vec<String> {
        unique_publication_titles(&self.original_comments)
    }
}

pub struct CommentController {
    api: Arc<dyn BlogApi>,
    reporter: Arc<dyn ErrorReporter>,
    inner: Mutex<CommentState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl CommentController {
    pub fn new(api: Arc<dyn BlogApi>) -> Self {
        Self::new_with_reporter(api, Arc::new(SilentReporter))
    }

    pub fn new_with_reporter(api: Arc<dyn BlogApi>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            reporter,
            inner: Mutex::new(CommentState::default()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> CommentState {
        self.inner.lock().await.clone()
    }

    /// Loads all comments, or only those of the publication with the given
    /// title. A blank title is the same as no title.
    pub async fn fetch(&self, title_query: Option<&str>) {
        let query = normalize_query(title_query);
        let ticket = self.begin_fetch().await;
        debug!(query = query.as_deref().unwrap_or(""), "fetching comments");

        let result = match &query {
            Some(title) => self.api.comments_by_publication_title(title).await,
            None => self.api.list_comments().await,
        };
        self.finish_fetch(ticket, result).await;
    }

    pub async fn search(&self) {
        let title = self.inner.lock().await.search_title.clone();
        self.fetch(Some(title.as_str())).await;
    }

    pub async fn show_all(&self) {
        self.inner.lock().await.search_title.clear();
        self.fetch(None).await;
    }

    /// Re-runs the active query; used after a successful edit or delete.
    pub async fn refresh(&self) {
        self.search().await;
    }

    pub async fn set_search_title(&self, title: impl Into<String>) {
        self.inner.lock().await.search_title = title.into();
    }

    pub async fn set_filter(&self, criterion: SortCriterion) {
        let mut guard = self.inner.lock().await;
        guard.filter = criterion;
        guard.comments = sort_comments(&guard.original_comments, criterion);
    }

    pub async fn begin_edit(&self, comment_id: CommentId, current_text: impl Into<String>) {
        self.inner.lock().await.interaction = Interaction::Editing {
            comment_id,
            text: current_text.into(),
        };
    }

    pub async fn set_edit_text(&self, text: impl Into<String>) {
        if let Interaction::Editing { text: draft, .. } = &mut self.inner.lock().await.interaction {
            *draft = text.into();
        }
    }

    pub async fn cancel_edit(&self) {
        let mut guard = self.inner.lock().await;
        if matches!(guard.interaction, Interaction::Editing { .. }) {
            guard.interaction = Interaction::Idle;
        }
    }

    /// Commits the edit draft of `comment_id`. A blank draft, or a comment that
    /// is not the one being edited, is ignored without a request.
    pub async fn save_edit(&self, comment_id: &CommentId) -> MutationOutcome {
        let text = {
            let guard = self.inner.lock().await;
            match &guard.interaction {
                Interaction::Editing {
                    comment_id: editing,
                    text,
                } if editing == comment_id => text.trim().to_string(),
                _ => return MutationOutcome::Skipped,
            }
        };
        if text.is_empty() {
            return MutationOutcome::Skipped;
        }

        match self.api.update_comment(comment_id, &text).await {
            Ok(()) => {
                {
                    let mut guard = self.inner.lock().await;
                    if guard.editing_id() == Some(comment_id) {
                        guard.interaction = Interaction::Idle;
                    }
                }
                info!(%comment_id, "comment updated");
                self.refresh().await;
                MutationOutcome::Committed
            }
            Err(detail) => {
                // edit mode stays open so the draft is not lost
                self.report(Mutation::UpdateComment(comment_id.clone()), detail);
                MutationOutcome::Failed
            }
        }
    }

    pub async fn confirm_delete(&self, comment_id: CommentId) {
        self.inner.lock().await.interaction = Interaction::ConfirmingDelete {
            comment_id: comment_id.clone(),
        };
        let _ = self
            .events
            .send(ControllerEvent::ConfirmDeleteRequested(comment_id));
    }

    pub async fn cancel_delete(&self) {
        let mut guard = self.inner.lock().await;
        if matches!(guard.interaction, Interaction::ConfirmingDelete { .. }) {
            guard.interaction = Interaction::Idle;
            let _ = self.events.send(ControllerEvent::ConfirmDeleteDismissed);
        }
    }

    /// Deletes the comment awaiting confirmation. Its prompt is dismissed
    /// whatever the server answers.
    pub async fn commit_delete(&self) -> MutationOutcome {
        let Some(comment_id) = self.inner.lock().await.pending_delete_id().cloned() else {
            return MutationOutcome::Skipped;
        };

        let result = self.api.delete_comment(&comment_id).await;

        {
            // a newer prompt opened while the request was in flight stays up
            let mut guard = self.inner.lock().await;
            if guard.pending_delete_id() == Some(&comment_id) {
                guard.interaction = Interaction::Idle;
                let _ = self.events.send(ControllerEvent::ConfirmDeleteDismissed);
            }
        }

        match result {
            Ok(()) => {
                info!(%comment_id, "comment deleted");
                self.refresh().await;
                MutationOutcome::Committed
            }
            Err(detail) => {
                self.report(Mutation::DeleteComment(comment_id), detail);
                MutationOutcome::Failed
            }
        }
    }

    async fn begin_fetch(&self) -> FetchTicket {
        let mut guard = self.inner.lock().await;
        guard.loading = true;
        guard.error = None;
        guard.generation.next()
    }

    async fn finish_fetch(&self, ticket: FetchTicket, result: ApiResult<Vec<Comment>>) {
        let mut guard = self.inner.lock().await;
        if !guard.generation.is_current(ticket) {
            debug!(?ticket, "discarding stale comments response");
            return;
        }

        match result {
            Err(detail) => {
                warn!(error = %detail, "failed to load comments");
                guard.error = Some(LoadError::Transport {
                    resource: Resource::Comments,
                    detail,
                });
                guard.original_comments.clear();
                guard.comments.clear();
            }
            Ok(comments) if comments.is_empty() => {
                guard.error = Some(LoadError::Empty {
                    resource: Resource::Comments,
                });
                guard.original_comments.clear();
                guard.comments.clear();
            }
            Ok(comments) => {
                guard.comments = sort_comments(&comments, guard.filter);
                guard.original_comments = comments;
            }
        }
        guard.loading = false;
    }

    fn report(&self, mutation: Mutation, detail: ApiError) {
        let failure = MutationFailure { mutation, detail };
        warn!(error = %failure, "comment mutation failed");
        self.reporter.report(&failure);
    }
}

#[cfg(test)]
#[path = "../tests/comment_controller_tests.rs"]
mod tests;
