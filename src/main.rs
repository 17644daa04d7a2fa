//! tack - a reconciling task/project store over a remote document store.
//!
//! This binary wires the whole stack together against the in-memory
//! backend: it seeds a sample board, exercises a handful of store
//! operations, and logs the resulting state. The real application embeds
//! [`TaskStore`] and [`SyncDriver`] behind a UI instead.

use std::sync::Arc;

use tack_config::{Config, Role, Session};
use tack_protocol::{priority_score, sample};
use tack_remote::{codec, MemoryRemote, RemoteStore};
use tack_store::{SyncDriver, TaskStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::load()?;

    // Seed the in-memory backend with the sample board, standing in for
    // data other clients have already written.
    let remote = Arc::new(MemoryRemote::new());
    let board = sample::sample_board("demo-admin");
    for project in &board.projects {
        remote
            .create(
                &config.collections.projects,
                &project.id.to_string(),
                codec::project_to_fields(project),
            )
            .await?;
    }
    for task in &board.tasks {
        remote
            .create(
                &config.collections.tasks,
                &task.id.to_string(),
                codec::task_to_fields(task),
            )
            .await?;
    }

    let session = Session::authenticated("demo-admin", Role::Admin);
    let mut store = TaskStore::new(&config, session);
    let mut driver = SyncDriver::new(Arc::clone(&remote));

    // First tick subscribes and pulls the seeded board in.
    driver.tick(&mut store).await;
    info!(
        tasks = store.tasks().count(),
        projects = store.projects().count(),
        "board loaded"
    );

    // Walk one task through the workflow.
    let first_id = store.tasks().next().map(|task| task.id);
    if let Some(id) = first_id {
        store.update_task_status(id, tack_protocol::TaskStatus::InProgress);
        driver.tick(&mut store).await;
    }

    let now = chrono::Utc::now();
    for task in store.tasks() {
        info!(
            title = %task.title,
            status = task.status.display_name(),
            score = priority_score(task, now),
            pending = store.is_pending(task.id),
            "task"
        );
    }

    Ok(())
}
