//! JSON shapes spoken by the blog API and their normalization into domain
//! values. Nothing outside this module sees the raw wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Comment, CommentId, Course, CourseId, Publication, PublicationId, PublicationRef,
};

pub const API_BASE_PATH: &str = "/blog/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCommentRequest {
    pub author: String,
    pub comment: String,
    pub publication: PublicationId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub comment: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentsEnvelope {
    #[serde(default)]
    pub comments: Vec<WireComment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationsEnvelope {
    #[serde(default)]
    pub publications: Vec<WirePublication>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCourse {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Older API revisions populate `course` as a single document, newer ones as
/// an array, and unpopulated references arrive as a bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CourseShape {
    Many(Vec<WireCourse>),
    One(WireCourse),
    Id(String),
}

impl CourseShape {
    fn into_course(self) -> Option<Course> {
        match self {
            Self::Many(courses) => courses.into_iter().next().map(Course::from),
            Self::One(course) => Some(course.into()),
            Self::Id(id) => Some(Course {
                course_id: Some(CourseId(id)),
                name: String::new(),
            }),
        }
    }
}

impl From<WireCourse> for Course {
    fn from(value: WireCourse) -> Self {
        Self {
            course_id: value.id.map(CourseId),
            name: value.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePublication {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub course: Option<CourseShape>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<WirePublication> for Publication {
    fn from(value: WirePublication) -> Self {
        Self {
            publication_id: PublicationId(value.id),
            title: value.title,
            description: value.description,
            image_url: value.image_url.filter(|url| !url.is_empty()),
            avatar_url: value.avatar_url.filter(|url| !url.is_empty()),
            course: value.course.and_then(CourseShape::into_course),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireEmbeddedPublication {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub course: Option<CourseShape>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PublicationShape {
    Embedded(WireEmbeddedPublication),
    Id(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireComment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publication: Option<PublicationShape>,
    #[serde(default)]
    pub course: Option<CourseShape>,
}

impl From<WireComment> for Comment {
    fn from(value: WireComment) -> Self {
        let mut course_name = value
            .course
            .and_then(CourseShape::into_course)
            .map(|course| course.name);

        let publication = match value.publication {
            Some(PublicationShape::Id(id)) => PublicationRef {
                publication_id: Some(PublicationId(id)),
                title: None,
            },
            Some(PublicationShape::Embedded(embedded)) => {
                if course_name.is_none() {
                    course_name = embedded
                        .course
                        .and_then(CourseShape::into_course)
                        .map(|course| course.name);
                }
                PublicationRef {
                    publication_id: embedded.id.map(PublicationId),
                    title: embedded.title,
                }
            }
            None => PublicationRef::default(),
        };

        Self {
            comment_id: CommentId(value.id),
            author: value.author.unwrap_or_default(),
            body: value.comment,
            created_at: value.created_at,
            publication,
            course_name: course_name.filter(|name| !name.is_empty()),
        }
    }
}

impl CommentsEnvelope {
    pub fn into_comments(self) -> Vec<Comment> {
        self.comments.into_iter().map(Comment::from).collect()
    }
}

impl PublicationsEnvelope {
    pub fn into_publications(self) -> Vec<Publication> {
        self.publications
            .into_iter()
            .map(Publication::from)
            .collect()
    }
}
