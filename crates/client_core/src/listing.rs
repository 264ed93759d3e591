//! Client-side ordering and query helpers shared by the controllers.

use std::{cmp::Ordering, collections::HashSet, fmt, str::FromStr};

use shared::domain::Comment;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortCriterion {
    #[default]
    None,
    Course,
    Date,
    Author,
}

impl SortCriterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Course => "course",
            Self::Date => "date",
            Self::Author => "author",
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized keys fall back to [`SortCriterion::None`], which keeps server
/// order.
impl FromStr for SortCriterion {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim().to_ascii_lowercase().as_str() {
            "course" => Self::Course,
            "date" => Self::Date,
            "author" => Self::Author,
            _ => Self::None,
        })
    }
}

/// Accent- and case-insensitive key, so "Álvaro" files under A.
fn collation_key(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Returns a re-ordered copy of `items`. The sort is stable, so ties keep
/// server order and applying the same criterion twice changes nothing.
pub fn sort_comments(items: &[Comment], criterion: SortCriterion) -> Vec<Comment> {
    let mut sorted = items.to_vec();
    match criterion {
        SortCriterion::None => {}
        SortCriterion::Course => sorted.sort_by(|a, b| {
            locale_cmp(
                a.course_name.as_deref().unwrap_or_default(),
                b.course_name.as_deref().unwrap_or_default(),
            )
        }),
        // newest first, undated last
        SortCriterion::Date => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortCriterion::Author => sorted.sort_by(|a, b| locale_cmp(&a.author, &b.author)),
    }
    sorted
}

/// Blank queries mean "no filter".
pub fn normalize_query(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_string)
}

pub fn unique_publication_titles(comments: &[Comment]) -> Vec<String> {
    let mut seen = HashSet::new();
    comments
        .iter()
        .filter_map(|comment| comment.publication.title.as_deref())
        .filter(|title| !title.is_empty())
        .filter(|title| seen.insert(*title))
        .map(str::to_string)
        .collect()
}
