//! In-memory [`BlogApi`] used by the controller tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{Comment, CommentId, Course, Publication, PublicationId, PublicationRef},
    error::{ApiError, ErrorCode},
    protocol::PostCommentRequest,
};

use crate::{ApiResult, BlogApi};

#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub list: bool,
    pub update: bool,
    pub delete: bool,
    pub post: bool,
}

#[derive(Default)]
pub struct FakeBlogApi {
    pub comments: Mutex<Vec<Comment>>,
    pub publications: Mutex<Vec<Publication>>,
    pub failures: Mutex<Failures>,
    pub calls: Mutex<Vec<String>>,
    pub posted: Mutex<Vec<PostCommentRequest>>,
    /// Artificial latency per query string ("" for unfiltered listings,
    /// "delete:<id>" for deletes).
    pub delays: Mutex<HashMap<String, Duration>>,
}

impl FakeBlogApi {
    pub fn with_comments(comments: Vec<Comment>) -> Arc<Self> {
        let api = Self::default();
        *api.comments.lock().unwrap() = comments;
        Arc::new(api)
    }

    pub fn with_publications(publications: Vec<Publication>) -> Arc<Self> {
        let api = Self::default();
        *api.publications.lock().unwrap() = publications;
        Arc::new(api)
    }

    pub fn fail(&self, configure: impl FnOnce(&mut Failures)) {
        configure(&mut self.failures.lock().unwrap());
    }

    pub fn delay(&self, query: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    async fn simulate_latency(&self, query: &str) {
        let delay = self.delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn unreachable() -> ApiError {
        ApiError::new(ErrorCode::Unreachable, "connection refused")
    }
}

#[async_trait]
impl BlogApi for FakeBlogApi {
    async fn list_comments(&self) -> ApiResult<Vec<Comment>> {
        self.record("list_comments");
        self.simulate_latency("").await;
        if self.failures.lock().unwrap().list {
            return Err(Self::unreachable());
        }
        Ok(self.comments.lock().unwrap().clone())
    }

    async fn comments_by_publication_title(&self, title: &str) -> ApiResult<Vec<Comment>> {
        self.record(format!("comments_by_publication_title:{title}"));
        self.simulate_latency(title).await;
        if self.failures.lock().unwrap().list {
            return Err(Self::unreachable());
        }
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|comment| comment.publication.title.as_deref() == Some(title))
            .cloned()
            .collect())
    }

    async fn post_comment(&self, request: PostCommentRequest) -> ApiResult<()> {
        self.record(format!("post_comment:{}", request.publication));
        if self.failures.lock().unwrap().post {
            return Err(Self::unreachable());
        }
        self.posted.lock().unwrap().push(request);
        Ok(())
    }

    async fn update_comment(&self, comment_id: &CommentId, comment: &str) -> ApiResult<()> {
        self.record(format!("update_comment:{comment_id}:{comment}"));
        if self.failures.lock().unwrap().update {
            return Err(Self::unreachable());
        }
        let mut comments = self.comments.lock().unwrap();
        match comments.iter_mut().find(|c| &c.comment_id == comment_id) {
            Some(existing) => {
                existing.body = comment.to_string();
                Ok(())
            }
            None => Err(ApiError::new(ErrorCode::NotFound, "comment not found")),
        }
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> ApiResult<()> {
        self.record(format!("delete_comment:{comment_id}"));
        self.simulate_latency(&format!("delete:{comment_id}")).await;
        if self.failures.lock().unwrap().delete {
            return Err(Self::unreachable());
        }
        self.comments
            .lock()
            .unwrap()
            .retain(|c| &c.comment_id != comment_id);
        Ok(())
    }

    async fn list_publications(&self) -> ApiResult<Vec<Publication>> {
        self.record("list_publications");
        self.simulate_latency("").await;
        if self.failures.lock().unwrap().list {
            return Err(Self::unreachable());
        }
        Ok(self.publications.lock().unwrap().clone())
    }

    async fn publications_by_course_name(&self, name: &str) -> ApiResult<Vec<Publication>> {
        self.record(format!("publications_by_course_name:{name}"));
        self.simulate_latency(name).await;
        if self.failures.lock().unwrap().list {
            return Err(Self::unreachable());
        }
        Ok(self
            .publications
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.course.as_ref().map(|c| c.name.as_str()) == Some(name))
            .cloned()
            .collect())
    }
}

pub fn comment(id: &str, author: &str, title: &str, course: &str, day: u32) -> Comment {
    Comment {
        comment_id: CommentId::new(id),
        author: author.into(),
        body: format!("comment {id}"),
        created_at: Some(Utc.with_ymd_and_hms(2024, 6, day, 9, 30, 0).unwrap()),
        publication: PublicationRef {
            publication_id: Some(PublicationId::new(format!("pub-{title}"))),
            title: Some(title.into()),
        },
        course_name: Some(course.into()),
    }
}

pub fn publication(id: &str, title: &str, course: Option<&str>) -> Publication {
    Publication {
        publication_id: PublicationId::new(id),
        title: title.into(),
        description: format!("about {title}"),
        image_url: None,
        avatar_url: None,
        course: course.map(|name| Course {
            course_id: None,
            name: name.into(),
        }),
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()),
    }
}
