use std::sync::{Arc, Mutex as StdMutex};

use super::*;
use crate::fake_api::{publication, FakeBlogApi};

fn catalog() -> Vec<Publication> {
    vec![
        publication("p1", "Ownership", Some("Rust")),
        publication("p2", "Normal forms", Some("Databases")),
        publication("p3", "Unassigned notes", None),
    ]
}

fn titles(publications: &[Publication]) -> Vec<&str> {
    publications.iter().map(|p| p.title.as_str()).collect()
}

#[tokio::test]
async fn unfiltered_fetch_lists_everything() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api.clone());

    controller.fetch(None).await;

    let state = controller.snapshot().await;
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(
        titles(&state.publications),
        ["Ownership", "Normal forms", "Unassigned notes"]
    );
    assert_eq!(api.calls(), ["list_publications"]);
}

#[tokio::test]
async fn course_search_uses_trimmed_draft() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api.clone());

    controller.set_search_course("  Databases ").await;
    controller.search().await;

    let state = controller.snapshot().await;
    assert_eq!(titles(&state.publications), ["Normal forms"]);
    assert_eq!(api.calls(), ["publications_by_course_name:Databases"]);
}

#[tokio::test]
async fn unknown_course_is_an_empty_result() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api);

    controller.fetch(Some("Astronomy")).await;

    let state = controller.snapshot().await;
    assert!(!state.loading);
    assert!(state.publications.is_empty());
    assert_eq!(state.error_message(), Some("no publications found"));
    assert!(state.error.as_ref().is_some_and(LoadError::is_empty_result));
}

#[tokio::test]
async fn transport_failure_sets_failure_message() {
    let api = FakeBlogApi::with_publications(catalog());
    api.fail(|f| f.list = true);
    let controller = PublicationController::new(api);

    controller.fetch(None).await;

    let state = controller.snapshot().await;
    assert!(!state.loading);
    assert!(state.publications.is_empty());
    assert_eq!(state.error_message(), Some("failed to load publications"));
    assert!(matches!(state.status(), ViewStatus::Failed(_)));
}

#[tokio::test]
async fn show_all_clears_the_course_draft() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api.clone());

    controller.set_search_course("Rust").await;
    controller.search().await;
    controller.show_all().await;

    let state = controller.snapshot().await;
    assert_eq!(state.search_course, "");
    assert_eq!(state.publications.len(), 3);
    assert_eq!(
        api.calls(),
        ["publications_by_course_name:Rust", "list_publications"]
    );
}

#[tokio::test]
async fn selecting_opens_the_composer() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api);
    let mut events = controller.subscribe_events();
    controller.fetch(None).await;

    let target = controller.snapshot().await.publications[1].clone();
    controller.select_for_comment(target.clone()).await;

    assert_eq!(
        controller.snapshot().await.selected_publication,
        Some(target.clone())
    );
    assert_eq!(
        events.try_recv().expect("composer opened"),
        ControllerEvent::ComposerOpened(target.publication_id)
    );

    controller.close_composer().await;
    assert!(controller.snapshot().await.selected_publication.is_none());
    assert_eq!(
        events.try_recv().expect("composer closed"),
        ControllerEvent::ComposerClosed
    );
}

#[tokio::test]
async fn explicit_fetch_resets_selection_and_success_banner() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api);
    controller.fetch(None).await;

    controller.select_for_comment(catalog().remove(0)).await;
    controller.set_comment("first!").await;
    assert_eq!(controller.submit_comment().await, MutationOutcome::Committed);
    assert!(controller.snapshot().await.comment_success);

    controller.fetch(Some("Rust")).await;

    let state = controller.snapshot().await;
    assert!(state.selected_publication.is_none());
    assert!(!state.comment_success);
}

#[tokio::test]
async fn empty_comment_submit_is_a_no_op() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api.clone());
    controller.select_for_comment(catalog().remove(0)).await;
    controller.set_author("ana").await;
    controller.set_comment("   ").await;

    assert_eq!(controller.submit_comment().await, MutationOutcome::Skipped);

    let state = controller.snapshot().await;
    assert!(api.calls().is_empty());
    assert_eq!(state.author, "ana");
    assert_eq!(state.comment, "   ");
    assert!(state.selected_publication.is_some());
    assert!(!state.comment_success);
}

#[tokio::test]
async fn submit_without_selection_is_a_no_op() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api.clone());
    controller.set_comment("orphan comment").await;

    assert_eq!(controller.submit_comment().await, MutationOutcome::Skipped);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn successful_submit_posts_by_id_and_refreshes_active_course() {
    let api = FakeBlogApi::with_publications(catalog());
    let controller = PublicationController::new(api.clone());
    let mut events = controller.subscribe_events();
    controller.set_search_course("Rust").await;
    controller.search().await;

    let target = controller.snapshot().await.publications[0].clone();
    controller.select_for_comment(target).await;
    let _ = events.try_recv();
    controller.set_comment("  very clear, thanks  ").await;

    assert_eq!(controller.submit_comment().await, MutationOutcome::Committed);

    let posted = api.posted.lock().unwrap().clone();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].publication, PublicationId::new("p1"));
    assert_eq!(posted[0].comment, "very clear, thanks");
    assert_eq!(posted[0].author, "");

    let state = controller.snapshot().await;
    assert!(state.comment_success);
    assert!(state.comment.is_empty());
    assert!(state.author.is_empty());
    assert!(!state.loading);
    assert_eq!(titles(&state.publications), ["Ownership"]);
    assert_eq!(
        events.try_recv().expect("composer closed"),
        ControllerEvent::ComposerClosed
    );
    assert_eq!(
        api.calls(),
        [
            "publications_by_course_name:Rust",
            "post_comment:p1",
            "publications_by_course_name:Rust",
        ]
    );
}

#[tokio::test]
async fn failed_submit_keeps_drafts_and_reports() {
    let api = FakeBlogApi::with_publications(catalog());
    api.fail(|f| f.post = true);
    let reported = Arc::new(StdMutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let controller = PublicationController::new_with_reporter(
        api.clone(),
        Arc::new(move |failure: &MutationFailure| {
            sink.lock().unwrap().push(failure.mutation.clone());
        }),
    );

    controller.select_for_comment(catalog().remove(1)).await;
    controller.set_author("luis").await;
    controller.set_comment("draft to keep").await;

    assert_eq!(controller.submit_comment().await, MutationOutcome::Failed);

    let state = controller.snapshot().await;
    assert_eq!(state.author, "luis");
    assert_eq!(state.comment, "draft to keep");
    assert!(!state.comment_success);
    assert!(state.selected_publication.is_some());
    assert_eq!(
        *reported.lock().unwrap(),
        [Mutation::PostComment(PublicationId::new("p2"))]
    );
    assert_eq!(api.calls(), ["post_comment:p2"]);
}
