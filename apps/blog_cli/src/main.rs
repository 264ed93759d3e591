use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, BlogApi, CommentController, ErrorReporter, HttpBlogClient, MutationFailure,
    MutationOutcome, PublicationController, SortCriterion,
};
use shared::domain::{CommentId, PublicationId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "blog", about = "Browse publications and moderate comments")]
struct Args {
    /// Overrides the configured API base url (e.g. http://127.0.0.1:3006/blog/v1).
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List publications, optionally only those of one course.
    Publications {
        #[arg(long)]
        course: Option<String>,
    },
    /// List comments, optionally for one publication title.
    Comments {
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "none")]
        sort: SortCriterion,
        /// Print the publication titles found in the listing instead.
        #[arg(long)]
        titles: bool,
    },
    /// Comment on a publication.
    Comment {
        #[arg(long)]
        publication: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long)]
        text: String,
        /// Course filter used to look the publication up and to refresh after posting.
        #[arg(long)]
        course: Option<String>,
    },
    /// Replace the text of a comment.
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a comment.
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Answer the confirmation prompt with yes.
        #[arg(long)]
        yes: bool,
    },
}

fn surface_reporter() -> Arc<dyn ErrorReporter> {
    Arc::new(|failure: &MutationFailure| eprintln!("error: {failure}"))
}

fn ensure_committed(outcome: MutationOutcome, what: &str) -> Result<()> {
    match outcome {
        MutationOutcome::Committed => Ok(()),
        MutationOutcome::Skipped => bail!("{what} skipped: nothing to send"),
        MutationOutcome::Failed => bail!("{what} failed"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings()?
        .with_overrides(args.api_url, args.timeout_ms)
        .context("invalid command-line settings")?;
    debug!(
        api_url = %settings.api_base_url,
        timeout_ms = settings.request_timeout_ms,
        "resolved client settings"
    );
    let api: Arc<dyn BlogApi> =
        Arc::new(HttpBlogClient::new(&settings).context("failed to build api client")?);

    match args.command {
        Command::Publications { course } => {
            let controller = PublicationController::new(api);
            controller.set_search_course(course.unwrap_or_default()).await;
            controller.search().await;
            print!("{}", render::publications(&controller.snapshot().await));
        }
        Command::Comments {
            title,
            sort,
            titles,
        } => {
            let controller = CommentController::new(api);
            controller.set_search_title(title.unwrap_or_default()).await;
            controller.search().await;
            controller.set_filter(sort).await;
            let state = controller.snapshot().await;
            if titles {
                print!("{}", render::titles(&state));
            } else {
                print!("{}", render::comments(&state));
            }
        }
        Command::Comment {
            publication,
            author,
            text,
            course,
        } => {
            let controller = PublicationController::new_with_reporter(api, surface_reporter());
            controller.set_search_course(course.unwrap_or_default()).await;
            controller.search().await;

            let publication_id = PublicationId::new(publication);
            let target = controller
                .snapshot()
                .await
                .find(&publication_id)
                .cloned()
                .ok_or_else(|| anyhow!("publication {publication_id} is not in the listing"))?;

            controller.select_for_comment(target).await;
            controller.set_author(author).await;
            controller.set_comment(text).await;
            ensure_committed(controller.submit_comment().await, "comment")?;
            print!("{}", render::publications(&controller.snapshot().await));
        }
        Command::Edit { id, text, title } => {
            let controller = CommentController::new_with_reporter(api, surface_reporter());
            controller.set_search_title(title.unwrap_or_default()).await;
            controller.search().await;

            let comment_id = CommentId::new(id);
            let current = controller
                .snapshot()
                .await
                .original_comments
                .iter()
                .find(|comment| comment.comment_id == comment_id)
                .map(|comment| comment.body.clone())
                .ok_or_else(|| anyhow!("comment {comment_id} is not in the listing"))?;

            controller.begin_edit(comment_id.clone(), current).await;
            controller.set_edit_text(text).await;
            ensure_committed(controller.save_edit(&comment_id).await, "edit")?;
            print!("{}", render::comments(&controller.snapshot().await));
        }
        Command::Delete { id, title, yes } => {
            let controller = CommentController::new_with_reporter(api, surface_reporter());
            controller.set_search_title(title.unwrap_or_default()).await;
            controller.search().await;

            controller.confirm_delete(CommentId::new(id)).await;
            if !yes {
                controller.cancel_delete().await;
                bail!("delete not confirmed; pass --yes to delete");
            }
            ensure_committed(controller.commit_delete().await, "delete")?;
            print!("{}", render::comments(&controller.snapshot().await));
        }
    }

    Ok(())
}
