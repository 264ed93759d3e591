//! Screen controllers: fetch/mutate orchestration and the view state a
//! rendering surface draws from.

use shared::{
    domain::{CommentId, PublicationId},
    error::ApiError,
};
use thiserror::Error;

pub mod comments;
pub mod publications;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Which collection a controller loads; decides the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Comments,
    Publications,
}

impl Resource {
    fn failure_message(self) -> &'static str {
        match self {
            Self::Comments => "failed to load comments",
            Self::Publications => "failed to load publications",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            Self::Comments => "no comments found for this publication",
            Self::Publications => "no publications found",
        }
    }
}

/// Both variants land in the same error slot of the screen but stay
/// distinguishable for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("{}", .resource.failure_message())]
    Transport { resource: Resource, detail: ApiError },
    #[error("{}", .resource.empty_message())]
    Empty { resource: Resource },
}

impl LoadError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Transport { resource, .. } => resource.failure_message(),
            Self::Empty { resource } => resource.empty_message(),
        }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// The single thing a screen should show. Loading wins over everything so a
/// new query never renders stale rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus<'a, T> {
    Loading,
    Failed(&'a LoadError),
    Ready(&'a [T]),
    Empty,
}

pub(crate) fn view_status<'a, T>(
    loading: bool,
    error: Option<&'a LoadError>,
    items: &'a [T],
) -> ViewStatus<'a, T> {
    if loading {
        ViewStatus::Loading
    } else if let Some(error) = error {
        ViewStatus::Failed(error)
    } else if items.is_empty() {
        ViewStatus::Empty
    } else {
        ViewStatus::Ready(items)
    }
}

/// Signals for collaborators the controller does not own: the delete
/// confirmation dialog and the comment composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    ConfirmDeleteRequested(CommentId),
    ConfirmDeleteDismissed,
    ComposerOpened(PublicationId),
    ComposerClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    UpdateComment(CommentId),
    DeleteComment(CommentId),
    PostComment(PublicationId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{mutation:?} failed: {detail}")]
pub struct MutationFailure {
    pub mutation: Mutation,
    pub detail: ApiError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Rejected locally (blank draft, nothing selected) without a request.
    Skipped,
    Committed,
    Failed,
}

/// Decides whether a failed edit, delete or submit reaches the user. The
/// controller has already logged the failure when this is called.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &MutationFailure);
}

pub struct SilentReporter;

impl ErrorReporter for SilentReporter {
    fn report(&self, _failure: &MutationFailure) {}
}

impl<F> ErrorReporter for F
where
    F: Fn(&MutationFailure) + Send + Sync,
{
    fn report(&self, failure: &MutationFailure) {
        self(failure)
    }
}

/// Ticket handed out when a fetch starts; a response is applied only while
/// its ticket is still the newest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchTicket(u64);

#[derive(Debug, Clone, Default)]
pub(crate) struct Generation(u64);

impl Generation {
    pub(crate) fn next(&mut self) -> FetchTicket {
        self.0 += 1;
        FetchTicket(self.0)
    }

    pub(crate) fn is_current(&self, ticket: FetchTicket) -> bool {
        self.0 == ticket.0
    }
}
