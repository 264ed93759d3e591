use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(PublicationId);
id_newtype!(CommentId);
id_newtype!(CourseId);

pub const ANONYMOUS_AUTHOR: &str = "anonymous";
pub const NO_COURSE: &str = "no course";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: Option<CourseId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub publication_id: PublicationId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Publication {
    pub fn display_course(&self) -> &str {
        self.course
            .as_ref()
            .map(|course| course.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_COURSE)
    }
}

/// What a comment knows about the publication it belongs to. The id is the
/// identity; the title only exists for display and title-based search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_id: Option<PublicationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: CommentId,
    pub author: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub publication: PublicationRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
}

impl Comment {
    pub fn display_author(&self) -> &str {
        if !self.author.trim().is_empty() {
            return &self.author;
        }
        self.publication
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR)
    }

    pub fn display_course(&self) -> &str {
        self.course_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_COURSE)
    }
}
