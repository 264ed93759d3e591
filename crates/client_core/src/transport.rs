//! reqwest-backed implementation of [`BlogApi`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Comment, CommentId, Publication},
    error::{ApiError, ErrorCode},
    protocol::{CommentsEnvelope, PostCommentRequest, PublicationsEnvelope, UpdateCommentRequest},
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, ApiResult, BlogApi};

pub struct HttpBlogClient {
    http: Client,
    base_url: Url,
}

impl HttpBlogClient {
    pub fn new(settings: &ClientSettings) -> ApiResult<Self> {
        let base_url = Url::parse(&settings.api_base_url).map_err(|err| {
            ApiError::new(
                ErrorCode::Validation,
                format!("invalid api base url '{}': {err}", settings.api_base_url),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("api base url '{base_url}' cannot carry a path"),
            ));
        }

        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends each segment to the base path, percent-encoding as needed, so a
    /// title such as `"C/C++ basics"` stays a single path segment.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::new(
                    ErrorCode::Validation,
                    format!("api base url '{}' cannot carry a path", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!(%url, "GET");
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?
            .error_for_status()
            .map_err(map_reqwest_error)?;
        res.json().await.map_err(map_reqwest_error)
    }

    async fn send_expect_ok(&self, request: RequestBuilder) -> ApiResult<()> {
        request
            .send()
            .await
            .map_err(map_reqwest_error)?
            .error_for_status()
            .map_err(map_reqwest_error)?;
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    let code = if err.is_timeout() {
        ErrorCode::Timeout
    } else if let Some(status) = err.status() {
        ErrorCode::from_status(status.as_u16())
    } else if err.is_decode() {
        ErrorCode::Decode
    } else {
        ErrorCode::Unreachable
    };
    debug!(?code, error = %err, "blog api request failed");
    ApiError::new(code, err.to_string())
}

#[async_trait]
impl BlogApi for HttpBlogClient {
    async fn list_comments(&self) -> ApiResult<Vec<Comment>> {
        let url = self.endpoint(&["comments", "getComments"])?;
        let envelope: CommentsEnvelope = self.get_json(url).await?;
        Ok(envelope.into_comments())
    }

    async fn comments_by_publication_title(&self, title: &str) -> ApiResult<Vec<Comment>> {
        let url = self.endpoint(&["comments", "getCommentByPublication", title])?;
        let envelope: CommentsEnvelope = self.get_json(url).await?;
        Ok(envelope.into_comments())
    }

    async fn post_comment(&self, request: PostCommentRequest) -> ApiResult<()> {
        let url = self.endpoint(&["comments", "postComment"])?;
        debug!(%url, publication = %request.publication, "POST");
        self.send_expect_ok(self.http.post(url).json(&request)).await
    }

    async fn update_comment(&self, comment_id: &CommentId, comment: &str) -> ApiResult<()> {
        let url = self.endpoint(&["comments", "putComment", comment_id.as_str()])?;
        debug!(%url, "PUT");
        let body = UpdateCommentRequest {
            comment: comment.to_string(),
        };
        self.send_expect_ok(self.http.put(url).json(&body)).await
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> ApiResult<()> {
        let url = self.endpoint(&["comments", "deleteComment", comment_id.as_str()])?;
        debug!(%url, "DELETE");
        self.send_expect_ok(self.http.delete(url)).await
    }

    async fn list_publications(&self) -> ApiResult<Vec<Publication>> {
        let url = self.endpoint(&["publications", "getPublications"])?;
        let envelope: PublicationsEnvelope = self.get_json(url).await?;
        Ok(envelope.into_publications())
    }

    async fn publications_by_course_name(&self, name: &str) -> ApiResult<Vec<Publication>> {
        let url = self.endpoint(&["publications", "getPublicationsByCourseName", name])?;
        let envelope: PublicationsEnvelope = self.get_json(url).await?;
        Ok(envelope.into_publications())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
