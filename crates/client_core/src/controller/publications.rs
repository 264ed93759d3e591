//! Publication browsing screen and the comment composer attached to it.

use std::sync::Arc;

use shared::{
    domain::{Publication, PublicationId},
    error::ApiError,
    protocol::PostCommentRequest,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use super::{
    view_status, ControllerEvent, ErrorReporter, FetchTicket, Generation, LoadError, Mutation,
    MutationFailure, MutationOutcome, Resource, SilentReporter, ViewStatus,
    EVENT_CHANNEL_CAPACITY,
};
use crate::{listing::normalize_query, ApiResult, BlogApi};

#[derive(Debug, Clone, Default)]
pub struct PublicationState {
    pub publications: Vec<Publication>,
    pub selected_publication: Option<Publication>,
    pub comment: String,
    pub author: String,
    pub search_course: String,
    pub loading: bool,
    pub error: Option<LoadError>,
    pub comment_success: bool,
    generation: Generation,
}

impl PublicationState {
    pub fn status(&self) -> ViewStatus<'_, Publication> {
        view_status(self.loading, self.error.as_ref(), &self.publications)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_ref().map(LoadError::message)
    }

    pub fn find(&self, publication_id: &PublicationId) -> Option<&Publication> {
        self.publications
            .iter()
            .find(|publication| &publication.publication_id == publication_id)
    }
}

/// Whether a fetch came from the user (new query) or from the controller
/// itself after a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOrigin {
    Explicit,
    AfterSubmit,
}

pub struct PublicationController {
    api: Arc<dyn BlogApi>,
    reporter: Arc<dyn ErrorReporter>,
    inner: Mutex<PublicationState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl PublicationController {
    pub fn new(api: Arc<dyn BlogApi>) -> Self {
        Self::new_with_reporter(api, Arc::new(SilentReporter))
    }

    pub fn new_with_reporter(api: Arc<dyn BlogApi>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            reporter,
            inner: Mutex::new(PublicationState::default()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PublicationState {
        self.inner.lock().await.clone()
    }

    /// Loads all publications, or those of one course. Starting a new query
    /// drops the selection and any success banner from a previous submit.
    pub async fn fetch(&self, course_query: Option<&str>) {
        self.fetch_with_origin(course_query, FetchOrigin::Explicit)
            .await;
    }

    pub async fn search(&self) {
        let course = self.inner.lock().await.search_course.clone();
        self.fetch(Some(course.as_str())).await;
    }

    pub async fn show_all(&self) {
        self.inner.lock().await.search_course.clear();
        self.fetch(None).await;
    }

    pub async fn refresh(&self) {
        self.search().await;
    }

    pub async fn set_search_course(&self, course: impl Into<String>) {
        self.inner.lock().await.search_course = course.into();
    }

    pub async fn set_comment(&self, comment: impl Into<String>) {
        self.inner.lock().await.comment = comment.into();
    }

    pub async fn set_author(&self, author: impl Into<String>) {
        self.inner.lock().await.author = author.into();
    }

    pub async fn select_for_comment(&self, publication: Publication) {
        let publication_id = publication.publication_id.clone();
        self.inner.lock().await.selected_publication = Some(publication);
        let _ = self
            .events
            .send(ControllerEvent::ComposerOpened(publication_id));
    }

    pub async fn close_composer(&self) {
        self.inner.lock().await.selected_publication = None;
        let _ = self.events.send(ControllerEvent::ComposerClosed);
    }

    /// Posts the draft against the selected publication. A blank draft or a
    /// missing selection is ignored without a request.
    pub async fn submit_comment(&self) -> MutationOutcome {
        let request = {
            let guard = self.inner.lock().await;
            let comment = guard.comment.trim();
            let Some(selected) = guard.selected_publication.as_ref() else {
                return MutationOutcome::Skipped;
            };
            if comment.is_empty() {
                return MutationOutcome::Skipped;
            }
            PostCommentRequest {
                author: guard.author.trim().to_string(),
                comment: comment.to_string(),
                publication: selected.publication_id.clone(),
            }
        };
        let publication_id = request.publication.clone();

        match self.api.post_comment(request).await {
            Ok(()) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.comment.clear();
                    guard.author.clear();
                    guard.comment_success = true;
                    guard.selected_publication = None;
                }
                info!(%publication_id, "comment posted");
                let _ = self.events.send(ControllerEvent::ComposerClosed);

                let course = self.inner.lock().await.search_course.clone();
                self.fetch_with_origin(Some(course.as_str()), FetchOrigin::AfterSubmit)
                    .await;
                MutationOutcome::Committed
            }
            Err(detail) => {
                self.report(Mutation::PostComment(publication_id), detail);
                MutationOutcome::Failed
            }
        }
    }

    async fn fetch_with_origin(&self, course_query: Option<&str>, origin: FetchOrigin) {
        let query = normalize_query(course_query);
        let ticket = self.begin_fetch(origin).await;
        debug!(
            query = query.as_deref().unwrap_or(""),
            ?origin,
            "fetching publications"
        );

        let result = match &query {
            Some(course) => self.api.publications_by_course_name(course).await,
            None => self.api.list_publications().await,
        };
        self.finish_fetch(ticket, result).await;
    }

    async fn begin_fetch(&self, origin: FetchOrigin) -> FetchTicket {
        let mut guard = self.inner.lock().await;
        guard.loading = true;
        guard.error = None;
        guard.selected_publication = None;
        if origin == FetchOrigin::Explicit {
            guard.comment_success = false;
        }
        guard.generation.next()
    }

    async fn finish_fetch(&self, ticket: FetchTicket, result: ApiResult<Vec<Publication>>) {
        let mut guard = self.inner.lock().await;
        if !guard.generation.is_current(ticket) {
            debug!(?ticket, "discarding stale publications response");
            return;
        }

        match result {
            Err(detail) => {
                warn!(error = %detail, "failed to load publications");
                guard.error = Some(LoadError::Transport {
                    resource: Resource::Publications,
                    detail,
                });
                guard.publications.clear();
            }
            Ok(publications) if publications.is_empty() => {
                guard.error = Some(LoadError::Empty {
                    resource: Resource::Publications,
                });
                guard.publications.clear();
            }
            Ok(publications) => guard.publications = publications,
        }
        guard.loading = false;
    }

    fn report(&self, mutation: Mutation, detail: ApiError) {
        let failure = MutationFailure { mutation, detail };
        warn!(error = %failure, "publication comment submit failed");
        self.reporter.report(&failure);
    }
}

#[cfg(test)]
#[path = "../tests/publication_controller_tests.rs"]
mod tests;
