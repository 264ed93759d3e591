//! Plain-text rendering of controller snapshots.

use std::fmt::Write as _;

use client_core::{CommentState, PublicationState, ViewStatus};
use shared::domain::{Comment, Publication};

fn date_label(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".to_string())
}

fn comment_line(out: &mut String, comment: &Comment) {
    let _ = writeln!(
        out,
        "[{}] {} | {} | {}",
        comment.comment_id,
        comment.display_author(),
        comment.display_course(),
        date_label(comment.created_at),
    );
    if let Some(title) = &comment.publication.title {
        let _ = writeln!(out, "    on: {title}");
    }
    let _ = writeln!(out, "    {}", comment.body);
}

fn publication_line(out: &mut String, publication: &Publication) {
    let _ = writeln!(
        out,
        "[{}] {} | {} | {}",
        publication.publication_id,
        publication.title,
        publication.display_course(),
        date_label(publication.created_at),
    );
    if !publication.description.is_empty() {
        let _ = writeln!(out, "    {}", publication.description);
    }
    if let Some(image_url) = &publication.image_url {
        let _ = writeln!(out, "    image: {image_url}");
    }
}

pub fn comments(state: &CommentState) -> String {
    let mut out = String::new();
    match state.status() {
        ViewStatus::Loading => out.push_str("loading...\n"),
        ViewStatus::Failed(error) => {
            let _ = writeln!(out, "error: {error}");
        }
        ViewStatus::Empty => out.push_str("nothing to show\n"),
        ViewStatus::Ready(rows) => {
            let _ = writeln!(out, "{} comment(s), sorted by {}", rows.len(), state.filter);
            for comment in rows {
                comment_line(&mut out, comment);
            }
        }
    }
    out
}

pub fn titles(state: &CommentState) -> String {
    let mut out = String::new();
    for title in state.publication_titles() {
        let _ = writeln!(out, "{title}");
    }
    out
}

pub fn publications(state: &PublicationState) -> String {
    let mut out = String::new();
    if state.comment_success {
        out.push_str("comment posted\n");
    }
    match state.status() {
        ViewStatus::Loading => out.push_str("loading...\n"),
        ViewStatus::Failed(error) => {
            let _ = writeln!(out, "error: {error}");
        }
        ViewStatus::Empty => out.push_str("nothing to show\n"),
        ViewStatus::Ready(rows) => {
            for publication in rows {
                publication_line(&mut out, publication);
            }
        }
    }
    out
}
