//! Write-then-relist cycle that drives the board. Every stage is handed to
//! the caller as a [`BoardEvent`].

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::store::{TaskStore, TaskSync};
use crate::task::{NewTask, TaskEdit};
use crate::view::BoardEvent;

/// One user-initiated write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(NewTask),
    SetCompleted { id: Uuid, completed: bool },
    Update { id: Uuid, edit: TaskEdit },
    Delete(Uuid),
}

impl Mutation {
    /// Prefix of the notice shown when the write itself fails.
    pub fn failure_context(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "Could not add task",
            Mutation::SetCompleted { .. } => "Could not update task",
            Mutation::Update { .. } => "Could not save task",
            Mutation::Delete(_) => "Could not delete task",
        }
    }

    async fn write<S: TaskStore>(self, sync: &TaskSync<S>) -> StoreResult<()> {
        match self {
            Mutation::Create(task) => sync.create(task).await.map(|_| ()),
            Mutation::SetCompleted { id, completed } => sync.set_completed(id, completed).await,
            Mutation::Update { id, edit } => sync.update(id, edit).await,
            Mutation::Delete(id) => sync.delete(id).await,
        }
    }
}

/// Full reload. Without a session there is nothing to load.
#[instrument(skip_all)]
pub async fn refresh<S, F>(sync: &TaskSync<S>, mut emit: F)
where
    S: TaskStore,
    F: FnMut(BoardEvent),
{
    if sync.session().is_none() {
        debug!("no session; skipping refresh");
        return;
    }
    emit(BoardEvent::BeginRefresh);
    emit(BoardEvent::Refreshed(sync.fetch().await));
}

/// Runs the write, then re-lists only if it was saved. A failed re-list is
/// reported as a load failure, never as a failed write.
#[instrument(skip_all, fields(context = mutation.failure_context()))]
pub async fn mutate<S, F>(sync: &TaskSync<S>, mutation: Mutation, mut emit: F)
where
    S: TaskStore,
    F: FnMut(BoardEvent),
{
    let context = mutation.failure_context();
    let result = mutation.write(sync).await;
    let saved = result.is_ok();
    emit(BoardEvent::Written { context, result });
    if saved {
        emit(BoardEvent::Refreshed(sync.fetch().await));
    }
}
