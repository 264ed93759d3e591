use async_trait::async_trait;
use shared::{
    domain::{Comment, CommentId, Publication},
    error::ApiError,
    protocol::PostCommentRequest,
};

pub mod config;
pub mod controller;
pub mod listing;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use controller::{
    comments::{CommentController, CommentState, Interaction},
    publications::{PublicationController, PublicationState},
    ControllerEvent, ErrorReporter, LoadError, Mutation, MutationFailure, MutationOutcome,
    SilentReporter, ViewStatus,
};
pub use listing::SortCriterion;
pub use transport::HttpBlogClient;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The remote blog API as seen by the controllers. Every call resolves to the
/// decoded payload or an [`ApiError`]; an empty collection is a success.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn list_comments(&self) -> ApiResult<Vec<Comment>>;
    async fn comments_by_publication_title(&self, title: &str) -> ApiResult<Vec<Comment>>;
    async fn post_comment(&self, request: PostCommentRequest) -> ApiResult<()>;
    async fn update_comment(&self, comment_id: &CommentId, comment: &str) -> ApiResult<()>;
    async fn delete_comment(&self, comment_id: &CommentId) -> ApiResult<()>;
    async fn list_publications(&self) -> ApiResult<Vec<Publication>>;
    async fn publications_by_course_name(&self, name: &str) -> ApiResult<Vec<Publication>>;
}

#[cfg(test)]
#[path = "tests/fake_api.rs"]
mod fake_api;
