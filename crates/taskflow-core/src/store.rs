use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::task::{CompletionPatch, NewTask, Task, TaskEdit, validate_title};

/// Signed-in user as handed out by the backend's auth service.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Row-level access to the `tasks` table. Every call is scoped to the
/// session's user.
#[allow(async_fn_in_trait)]
pub trait TaskStore {
    /// All of the user's tasks, newest `created_at` first.
    async fn list(&self, session: &Session) -> StoreResult<Vec<Task>>;

    async fn insert(&self, session: &Session, task: &NewTask) -> StoreResult<Task>;

    async fn set_completed(
        &self,
        session: &Session,
        id: Uuid,
        patch: &CompletionPatch,
    ) -> StoreResult<()>;

    async fn update(&self, session: &Session, id: Uuid, edit: &TaskEdit) -> StoreResult<()>;

    async fn delete(&self, session: &Session, id: Uuid) -> StoreResult<()>;
}

/// What happens to `completed_at` when a task is reopened.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletedAtPolicy {
    /// Write null alongside `completed = false`.
    #[default]
    Clear,
    /// Only write the `completed` flag; the old stamp stays in the row.
    Keep,
}

/// Session-gated facade over a [`TaskStore`]. Writes return only their own
/// outcome; the follow-up re-list is driven by [`crate::flow`].
#[derive(Clone)]
pub struct TaskSync<S> {
    store: S,
    session: Option<Session>,
    completed_at_policy: CompletedAtPolicy,
    clock: fn() -> DateTime<Utc>,
}

impl<S: TaskStore> TaskSync<S> {
    pub fn new(store: S, session: Option<Session>) -> Self {
        Self {
            store,
            session,
            completed_at_policy: CompletedAtPolicy::default(),
            clock: Utc::now,
        }
    }

    pub fn with_completed_at_policy(mut self, policy: CompletedAtPolicy) -> Self {
        self.completed_at_policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn require_session(&self) -> StoreResult<&Session> {
        self.session.as_ref().ok_or(StoreError::NotAuthenticated)
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> StoreResult<Vec<Task>> {
        let session = self.require_session()?;
        let tasks = self.store.list(session).await?;
        debug!(total = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    #[instrument(skip(self, task), fields(title_len = task.title.len(), priority = %task.priority))]
    pub async fn create(&self, task: NewTask) -> StoreResult<Task> {
        let session = self.require_session()?;
        validate_title(&task.title)?;
        let created = self.store.insert(session, &task).await.inspect_err(|err| {
            warn!(error = %err, "task insert failed");
        })?;
        info!(id = %created.id, "task created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn set_completed(&self, id: Uuid, completed: bool) -> StoreResult<()> {
        let session = self.require_session()?;
        let completed_at = if completed {
            Some(Some((self.clock)()))
        } else {
            match self.completed_at_policy {
                CompletedAtPolicy::Clear => Some(None),
                CompletedAtPolicy::Keep => None,
            }
        };
        let patch = CompletionPatch {
            completed,
            completed_at,
        };
        self.store
            .set_completed(session, id, &patch)
            .await
            .inspect_err(|err| warn!(error = %err, "completion update failed"))?;
        info!(%id, completed, "task completion updated");
        Ok(())
    }

    #[instrument(skip(self, edit), fields(title_len = edit.title.len(), priority = %edit.priority))]
    pub async fn update(&self, id: Uuid, edit: TaskEdit) -> StoreResult<()> {
        let session = self.require_session()?;
        validate_title(&edit.title)?;
        self.store
            .update(session, id, &edit)
            .await
            .inspect_err(|err| warn!(error = %err, "task update failed"))?;
        info!(%id, "task updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let session = self.require_session()?;
        self.store
            .delete(session, id)
            .await
            .inspect_err(|err| warn!(error = %err, "task delete failed"))?;
        info!(%id, "task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::task::Priority;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn signed_out_sync_issues_no_requests() {
        let store = MemoryStore::new();
        let sync = TaskSync::new(store.clone(), None);

        let task = NewTask::new("Buy milk", "", Priority::Medium).unwrap();
        assert_eq!(sync.create(task).await, Err(StoreError::NotAuthenticated));
        assert_eq!(sync.fetch().await, Err(StoreError::NotAuthenticated));
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn completing_stamps_clock_time() {
        let store = MemoryStore::new();
        let sync = TaskSync::new(store, Some(session())).with_clock(fixed_now);

        let id = sync
            .create(NewTask::new("Ship it", "", Priority::High).unwrap())
            .await
            .unwrap()
            .id;

        sync.set_completed(id, true).await.unwrap();
        let tasks = sync.fetch().await.unwrap();
        assert!(tasks[0].completed);
        assert_eq!(tasks[0].completed_at, Some(fixed_now()));
    }

    #[tokio::test]
    async fn reopen_clears_stamp_by_default() {
        let sync = TaskSync::new(MemoryStore::new(), Some(session())).with_clock(fixed_now);
        let id = sync
            .create(NewTask::new("Ship it", "", Priority::High).unwrap())
            .await
            .unwrap()
            .id;

        sync.set_completed(id, true).await.unwrap();
        sync.set_completed(id, false).await.unwrap();
        let tasks = sync.fetch().await.unwrap();
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].completed_at, None);
    }

    #[tokio::test]
    async fn reopen_keeps_stale_stamp_under_keep_policy() {
        let sync = TaskSync::new(MemoryStore::new(), Some(session()))
            .with_clock(fixed_now)
            .with_completed_at_policy(CompletedAtPolicy::Keep);
        let id = sync
            .create(NewTask::new("Ship it", "", Priority::High).unwrap())
            .await
            .unwrap()
            .id;

        sync.set_completed(id, true).await.unwrap();
        sync.set_completed(id, false).await.unwrap();
        let tasks = sync.fetch().await.unwrap();
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].completed_at, Some(fixed_now()));
        assert_eq!(tasks[0].completion_stamp(), None);
    }

    #[tokio::test]
    async fn writes_do_not_list_on_their_own() {
        let store = MemoryStore::new();
        let sync = TaskSync::new(store.clone(), Some(session()));

        let id = sync
            .create(NewTask::new("Quiet", "", Priority::Low).unwrap())
            .await
            .unwrap()
            .id;
        sync.set_completed(id, true).await.unwrap();
        sync.delete(id).await.unwrap();
        assert_eq!(store.operations(), vec!["insert", "set_completed", "delete"]);
    }

    #[tokio::test]
    async fn failed_write_reports_its_own_error() {
        let store = MemoryStore::new();
        let sync = TaskSync::new(store.clone(), Some(session()));
        store.fail_next(StoreError::Transport("connection reset".to_string()));

        let result = sync
            .create(NewTask::new("Flaky", "", Priority::Low).unwrap())
            .await;
        assert_eq!(
            result,
            Err(StoreError::Transport("connection reset".to_string()))
        );
        assert_eq!(store.operations(), vec!["insert"]);
    }

    #[test]
    fn session_debug_hides_tokens() {
        let rendered = format!("{:?}", session());
        assert!(rendered.contains("ada@example.com"));
        assert!(!rendered.contains("token\""));
    }
}
